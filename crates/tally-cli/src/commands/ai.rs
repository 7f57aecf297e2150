//! AI-backed commands: predictions, insights, questions, categorization
//!
//! All of these work without an AI backend; the rule-based paths answer.

use anyhow::{bail, Result};
use tally_core::models::ForecastStatus;
use tally_core::money::MoneyFormatter;
use tally_core::{Categorizer, Database, InsightService};

use super::{parse_date_arg, today};

pub fn cmd_predict(
    db: &Database,
    service: &InsightService,
    owner: &str,
    as_of: Option<&str>,
    json: bool,
) -> Result<()> {
    let as_of = parse_date_arg(as_of)?;
    let (prediction, _) = service.generate_prediction(owner, as_of)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
        return Ok(());
    }

    let fmt = MoneyFormatter::new(&db.get_currency(owner)?);
    let icon = match prediction.status {
        ForecastStatus::Safe => "✅",
        ForecastStatus::Warning => "⚠️ ",
        ForecastStatus::OverBudget => "🚨",
    };

    println!();
    println!("🔮 Month-end Projection (as of {})", as_of);
    println!("   ─────────────────────────────────────────");
    println!(
        "   Day {} of {} ({} remaining)",
        prediction.days_elapsed, prediction.days_in_month, prediction.days_remaining
    );
    println!("   Spent so far:     {}", fmt.format(prediction.total_spent));
    println!("   Daily average:    {}", fmt.format(prediction.daily_average));
    println!("   Predicted total:  {}", fmt.format(prediction.predicted_total));
    if prediction.total_budget > 0.0 {
        println!("   Budget:           {}", fmt.format(prediction.total_budget));
    }
    println!();
    println!("{} {}", icon, prediction.message);

    Ok(())
}

pub fn cmd_insights_list(db: &Database, owner: &str) -> Result<()> {
    let insights = db.list_insights(owner)?;

    if insights.is_empty() {
        println!("No insights yet. Generate one with:");
        println!("  tally insights generate");
        return Ok(());
    }

    for insight in insights {
        println!();
        println!(
            "💡 [{}] {} ({})",
            insight.kind,
            insight.period,
            insight.created_at.format("%Y-%m-%d %H:%M")
        );
        println!("   {}", insight.ai_text);
    }

    Ok(())
}

pub async fn cmd_insights_generate(
    service: &InsightService,
    owner: &str,
    as_of: Option<&str>,
) -> Result<()> {
    let as_of = parse_date_arg(as_of)?;
    let insight = service.generate_summary(owner, as_of).await?;

    println!();
    println!("💡 Spending summary for {}", insight.period);
    println!();
    println!("{}", insight.ai_text);

    Ok(())
}

pub async fn cmd_ask(service: &InsightService, owner: &str, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        bail!("Question is required");
    }

    let answer = service.ask(owner, question, today()).await?;
    println!("{}", answer);

    Ok(())
}

pub async fn cmd_categorize(
    categorizer: &Categorizer,
    description: &str,
    amount: Option<f64>,
) -> Result<()> {
    let description = description.trim();
    if description.is_empty() {
        bail!("Description is required");
    }

    let suggestion = categorizer
        .categorize(description, amount.unwrap_or(0.0))
        .await;

    let source = if suggestion.ai_categorized {
        "🤖 AI"
    } else {
        "📋 keywords"
    };
    println!("{} → {}", description, suggestion.category);
    println!("   {} ({})", source, suggestion.notes);

    Ok(())
}
