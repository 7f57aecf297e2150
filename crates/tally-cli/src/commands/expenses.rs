//! Expense command implementations

use anyhow::{anyhow, Result};
use tally_core::models::{Category, NewExpense, PaymentMethod};
use tally_core::money::MoneyFormatter;
use tally_core::{Categorizer, Database};

use super::{parse_date_arg, truncate};

pub fn cmd_expenses_list(db: &Database, owner: &str, limit: usize) -> Result<()> {
    let expenses = db.recent_expenses(owner, limit)?;

    if expenses.is_empty() {
        println!("No expenses recorded yet. Add one with:");
        println!("  tally expenses add -d \"Lunch\" -a 250");
        return Ok(());
    }

    let fmt = MoneyFormatter::new(&db.get_currency(owner)?);

    println!();
    println!("📝 Recent Expenses");
    println!("   ─────────────────────────────────────────────────────────────");

    for expense in expenses {
        let marker = if expense.ai_categorized { "*" } else { " " };
        println!(
            "   [{:>4}] {} │ {:>12} │ {:<13}{} │ {}",
            expense.id,
            expense.date,
            fmt.format(expense.amount),
            expense.category.as_str(),
            marker,
            truncate(&expense.description, 32)
        );
    }

    println!();
    println!("   * category suggested automatically");

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn cmd_expenses_add(
    db: &Database,
    categorizer: &Categorizer,
    owner: &str,
    description: &str,
    amount: f64,
    category: Option<&str>,
    payment: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let category = category
        .map(|c| c.parse::<Category>().map_err(|e| anyhow!(e)))
        .transpose()?;
    let payment_method = payment
        .map(|p| p.parse::<PaymentMethod>().map_err(|e| anyhow!(e)))
        .transpose()?
        .unwrap_or_default();

    let new_expense = NewExpense {
        description: description.trim().to_string(),
        amount,
        category,
        payment_method,
        date: parse_date_arg(date)?,
        ai_categorized: false,
        ai_notes: None,
    };
    new_expense.validate()?;

    let new_expense = categorizer.fill_category(new_expense).await;
    let expense = db.create_expense(owner, &new_expense)?;

    let fmt = MoneyFormatter::new(&db.get_currency(owner)?);
    println!(
        "✅ Recorded expense #{}: {} for \"{}\" on {}",
        expense.id,
        fmt.format(expense.amount),
        expense.description,
        expense.date
    );
    match expense.ai_notes {
        Some(ref notes) => println!("   Category: {} ({})", expense.category, notes),
        None => println!("   Category: {}", expense.category),
    }

    Ok(())
}

pub fn cmd_expenses_delete(db: &Database, owner: &str, id: i64) -> Result<()> {
    let expense = db.get_expense(owner, id)?;
    db.delete_expense(owner, id)?;
    println!(
        "🗑️  Deleted expense #{} (\"{}\", {})",
        id, expense.description, expense.date
    );
    Ok(())
}
