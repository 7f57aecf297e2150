//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track spending, budgets and where the month is heading
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted personal finance tracker with AI insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TALLY_DB_KEY environment variable with your passphrase.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// AI backend config file (TOML)
    ///
    /// Defaults to ~/.local/share/tally/config/ai.toml when present.
    /// TALLY_AI_* environment variables override file values.
    #[arg(long, global = true)]
    pub ai_config: Option<PathBuf>,

    /// Owner whose records are read and written
    #[arg(long, default_value = "local", global = true)]
    pub owner: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage expenses (list, add, delete)
    Expenses {
        #[command(subcommand)]
        action: Option<ExpensesAction>,
    },

    /// Manage monthly budgets (list, set, delete, status)
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Spending summary for a month
    Report {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        period: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Monthly spending trend
    Trend {
        /// Number of most recent months with spending to show
        #[arg(short, long, default_value = "6")]
        months: usize,
    },

    /// Project month-end spending against the budget
    Predict {
        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Spending insights (list, generate)
    Insights {
        #[command(subcommand)]
        action: Option<InsightsAction>,
    },

    /// Ask a question about your spending
    Ask {
        /// The question, e.g. "How much did I spend on food?"
        question: String,
    },

    /// Suggest a category for an expense description
    Categorize {
        /// Expense description
        description: String,

        /// Expense amount (gives the AI backend more context)
        #[arg(short, long)]
        amount: Option<f64>,
    },

    /// Show or set the display currency (ISO code, e.g. INR, USD)
    Currency {
        /// New currency code; omit to show the current one
        code: Option<String>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, requests need `Authorization: Bearer <key>` with a key
        /// from TALLY_API_KEYS.
        #[arg(long)]
        no_auth: bool,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allowed_origins: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List recent expenses
    List {
        /// Maximum number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Record an expense
    Add {
        /// What the money was spent on
        #[arg(short, long)]
        description: String,

        /// Amount spent (positive)
        #[arg(short, long)]
        amount: f64,

        /// Category (Food, Transport, Shopping, Bills, Entertainment,
        /// Health, Education, Others); suggested automatically when omitted
        #[arg(short, long)]
        category: Option<String>,

        /// Payment method (Cash, UPI, Card, NetBanking, Other)
        #[arg(short, long)]
        payment: Option<String>,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budgets
    List,

    /// Create or replace the budget for a month
    Set {
        /// Total monthly limit
        #[arg(short, long)]
        total: f64,

        /// Month (1-12, defaults to the current month)
        #[arg(short, long)]
        month: Option<u32>,

        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Per-category limit as CATEGORY=AMOUNT (repeatable)
        #[arg(short, long = "limit")]
        limits: Vec<String>,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: i64,
    },

    /// Spent vs. limit for a month
    Status {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        period: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum InsightsAction {
    /// List stored insights
    List,

    /// Generate and store a spending summary for a month
    Generate {
        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,
    },
}
