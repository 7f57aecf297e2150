//! Budget command implementations

use anyhow::{anyhow, bail, Context, Result};
use chrono::Datelike;
use tally_core::aggregate::month_bounds;
use tally_core::models::{BudgetUpdate, Category, CategoryLimit, NewBudget};
use tally_core::money::MoneyFormatter;
use tally_core::{budget_status, Database};

use super::{resolve_period, today};

/// Parse a `CATEGORY=AMOUNT` limit argument
pub fn parse_category_limit(arg: &str) -> Result<CategoryLimit> {
    let (category, amount) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid limit '{}' (use CATEGORY=AMOUNT)", arg))?;
    let category = category.parse::<Category>().map_err(|e| anyhow!(e))?;
    let limit = amount
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid amount in limit '{}'", arg))?;
    Ok(CategoryLimit { category, limit })
}

pub fn cmd_budgets_list(db: &Database, owner: &str) -> Result<()> {
    let budgets = db.find_budgets(owner)?;

    if budgets.is_empty() {
        println!("No budgets set. Create one with:");
        println!("  tally budgets set --total 20000");
        return Ok(());
    }

    let fmt = MoneyFormatter::new(&db.get_currency(owner)?);

    println!();
    println!("💰 Budgets");
    println!("   ─────────────────────────────────────────");

    for budget in budgets {
        println!(
            "   [{:>3}] {} │ {:>12}",
            budget.id,
            budget.period(),
            fmt.format(budget.total_limit)
        );
        for limit in &budget.category_limits {
            println!(
                "                 {:<13} {:>12}",
                limit.category.as_str(),
                fmt.format(limit.limit)
            );
        }
    }

    Ok(())
}

/// Create the budget for a month, or replace the one already there
pub fn cmd_budgets_set(
    db: &Database,
    owner: &str,
    total: f64,
    month: Option<u32>,
    year: Option<i32>,
    limits: &[String],
) -> Result<()> {
    let today = today();
    let month = month.unwrap_or(today.month());
    let year = year.unwrap_or(today.year());
    let category_limits = limits
        .iter()
        .map(|l| parse_category_limit(l))
        .collect::<Result<Vec<_>>>()?;

    let budget = match db.find_budget(owner, month, year)? {
        Some(existing) => {
            let update = BudgetUpdate {
                total_limit: Some(total),
                category_limits: Some(category_limits),
                ..Default::default()
            };
            let budget = db.update_budget(owner, existing.id, &update)?;
            println!("✅ Updated budget for {}", budget.period());
            budget
        }
        None => {
            let budget = db.create_budget(
                owner,
                &NewBudget {
                    month,
                    year,
                    total_limit: total,
                    category_limits,
                },
            )?;
            println!("✅ Created budget for {}", budget.period());
            budget
        }
    };

    let fmt = MoneyFormatter::new(&db.get_currency(owner)?);
    println!("   Total limit: {}", fmt.format(budget.total_limit));
    for limit in &budget.category_limits {
        println!("   {}: {}", limit.category, fmt.format(limit.limit));
    }

    Ok(())
}

pub fn cmd_budgets_delete(db: &Database, owner: &str, id: i64) -> Result<()> {
    let budget = db.get_budget(owner, id)?;
    db.delete_budget(owner, id)?;
    println!("🗑️  Deleted budget #{} ({})", id, budget.period());
    Ok(())
}

pub fn cmd_budgets_status(db: &Database, owner: &str, period: Option<&str>) -> Result<()> {
    let (year, month) = resolve_period(period)?;

    let Some(budget) = db.find_budget(owner, month, year)? else {
        bail!(
            "No budget set for {:04}-{:02}. Create one with: tally budgets set --total <amount>",
            year,
            month
        );
    };

    let expenses = db.find_expenses(owner, Some(month_bounds(year, month)?))?;
    let status = budget_status(&budget, &expenses)?;
    let fmt = MoneyFormatter::new(&db.get_currency(owner)?);

    println!();
    println!("📊 Budget Status: {}", status.period);
    println!("   ─────────────────────────────────────────────────────────");
    println!(
        "   Total      {:>12} of {:>12}  ({:.1}%){}",
        fmt.format(status.spent),
        fmt.format(status.total_limit),
        status.percent_used,
        if status.over_limit { "  ⚠️ over" } else { "" }
    );
    println!("   Remaining  {:>12}", fmt.format(status.remaining));

    if !status.categories.is_empty() {
        println!();
        for category in &status.categories {
            println!(
                "   {:<13} {:>12} of {:>12}  ({:.1}%){}",
                category.category.as_str(),
                fmt.format(category.spent),
                fmt.format(category.limit),
                category.percent_used,
                if category.over_limit { "  ⚠️ over" } else { "" }
            );
        }
    }

    Ok(())
}
