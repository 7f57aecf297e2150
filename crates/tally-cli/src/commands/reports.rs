//! Report command implementations

use anyhow::{bail, Result};
use tally_core::aggregate::month_bounds;
use tally_core::money::MoneyFormatter;
use tally_core::{aggregate_month, monthly_series, Database};

use super::resolve_period;

/// Upper bound for `tally trend --months`
pub const MAX_TREND_MONTHS: usize = 120;

pub fn cmd_report(db: &Database, owner: &str, period: Option<&str>, json: bool) -> Result<()> {
    let (year, month) = resolve_period(period)?;
    let expenses = db.find_expenses(owner, Some(month_bounds(year, month)?))?;
    let summary = aggregate_month(&expenses, year, month)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let fmt = MoneyFormatter::new(&db.get_currency(owner)?);

    println!();
    println!("📊 Spending Report: {}", summary.period);
    println!("   ─────────────────────────────────────────");

    if summary.transaction_count == 0 {
        println!("   No expenses recorded for this month.");
        return Ok(());
    }

    for (category, amount) in summary.ranked_categories() {
        let pct = amount / summary.total * 100.0;
        println!(
            "   {:<13} {:>12}  {:>5.1}%",
            category.as_str(),
            fmt.format(amount),
            pct
        );
    }
    println!("   ─────────────────────────────────────────");
    println!(
        "   {:<13} {:>12}  ({} transactions)",
        "Total",
        fmt.format(summary.total),
        summary.transaction_count
    );

    Ok(())
}

pub fn cmd_trend(db: &Database, owner: &str, months: usize) -> Result<()> {
    if months == 0 || months > MAX_TREND_MONTHS {
        bail!("--months must be between 1 and {}", MAX_TREND_MONTHS);
    }

    let expenses = db.find_expenses(owner, None)?;
    let series = monthly_series(&expenses, months);

    if series.is_empty() {
        println!("No expenses recorded yet.");
        return Ok(());
    }

    let fmt = MoneyFormatter::new(&db.get_currency(owner)?);
    let peak = series.iter().map(|m| m.amount).fold(0.0_f64, f64::max);

    println!();
    println!("📈 Monthly Trend");
    println!("   ─────────────────────────────────────────────────────");

    for point in &series {
        let width = if peak > 0.0 {
            (point.amount / peak * 30.0).round() as usize
        } else {
            0
        };
        println!(
            "   {:<8} {:>12}  {}",
            point.label,
            fmt.format(point.amount),
            "█".repeat(width)
        );
    }

    Ok(())
}
