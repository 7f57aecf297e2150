//! Tally CLI - Personal finance tracker
//!
//! Usage:
//!   tally init                                  Initialize database
//!   tally expenses add -d "Lunch" -a 250        Record an expense
//!   tally budgets set --total 20000             Budget for this month
//!   tally predict                               Month-end projection
//!   tally ask "How much did I spend on food?"   Ask about your spending
//!   tally serve --port 3000                     Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let owner = cli.owner.as_str();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Expenses { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_expenses_list(&db, owner, 20),
                Some(ExpensesAction::List { limit }) => {
                    commands::cmd_expenses_list(&db, owner, limit)
                }
                Some(ExpensesAction::Add {
                    description,
                    amount,
                    category,
                    payment,
                    date,
                }) => {
                    let ai = commands::load_ai(cli.ai_config.as_deref())?;
                    let categorizer = commands::categorizer(&ai);
                    commands::cmd_expenses_add(
                        &db,
                        &categorizer,
                        owner,
                        &description,
                        amount,
                        category.as_deref(),
                        payment.as_deref(),
                        date.as_deref(),
                    )
                    .await
                }
                Some(ExpensesAction::Delete { id }) => {
                    commands::cmd_expenses_delete(&db, owner, id)
                }
            }
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(BudgetsAction::List) => commands::cmd_budgets_list(&db, owner),
                Some(BudgetsAction::Set {
                    total,
                    month,
                    year,
                    limits,
                }) => commands::cmd_budgets_set(&db, owner, total, month, year, &limits),
                Some(BudgetsAction::Delete { id }) => commands::cmd_budgets_delete(&db, owner, id),
                Some(BudgetsAction::Status { period }) => {
                    commands::cmd_budgets_status(&db, owner, period.as_deref())
                }
            }
        }
        Commands::Report { period, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_report(&db, owner, period.as_deref(), json)
        }
        Commands::Trend { months } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_trend(&db, owner, months)
        }
        Commands::Predict { as_of, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let ai = commands::load_ai(cli.ai_config.as_deref())?;
            let service = commands::insight_service(&db, &ai);
            commands::cmd_predict(&db, &service, owner, as_of.as_deref(), json)
        }
        Commands::Insights { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(InsightsAction::List) => commands::cmd_insights_list(&db, owner),
                Some(InsightsAction::Generate { as_of }) => {
                    let ai = commands::load_ai(cli.ai_config.as_deref())?;
                    let service = commands::insight_service(&db, &ai);
                    commands::cmd_insights_generate(&service, owner, as_of.as_deref()).await
                }
            }
        }
        Commands::Ask { question } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let ai = commands::load_ai(cli.ai_config.as_deref())?;
            let service = commands::insight_service(&db, &ai);
            commands::cmd_ask(&service, owner, &question).await
        }
        Commands::Categorize {
            description,
            amount,
        } => {
            let ai = commands::load_ai(cli.ai_config.as_deref())?;
            let categorizer = commands::categorizer(&ai);
            commands::cmd_categorize(&categorizer, &description, amount).await
        }
        Commands::Currency { code } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_currency(&db, owner, code.as_deref())
        }
        Commands::Serve {
            port,
            host,
            no_auth,
            allowed_origins,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                cli.ai_config.as_deref(),
                allowed_origins,
            )
            .await
        }
    }
}
