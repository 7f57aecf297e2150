//! Month-end forecasting and budget-vs-actual status
//!
//! The forecast is a straight run-rate projection: spending so far divided by
//! the days elapsed, extended over the rest of the month. It is then tiered
//! against the month's budget:
//!
//! | Condition                         | Status       |
//! |-----------------------------------|--------------|
//! | no budget (`budget_total == 0`)   | `warning`    |
//! | predicted > budget                | `overbudget` |
//! | predicted > 80% of budget         | `warning`    |
//! | otherwise                         | `safe`       |

use chrono::{Datelike, NaiveDate};

use crate::aggregate::{aggregate_month, days_in_month, month_bounds};
use crate::error::{Error, Result};
use crate::models::{Budget, BudgetStatus, CategoryBudgetStatus, Expense, ForecastStatus, Prediction};
use crate::money::MoneyFormatter;

/// Share of the budget above which a projection is flagged as a warning
pub const WARNING_THRESHOLD: f64 = 0.8;

/// Project month-end spending as of `as_of`
///
/// Only expenses dated from the first of `as_of`'s month up to and including
/// `as_of` count toward `total_spent`, so callers may pass a wider list.
/// A `budget_total` of 0 means "no budget set".
pub fn predict(
    expenses: &[Expense],
    budget_total: f64,
    as_of: NaiveDate,
    fmt: &MoneyFormatter,
) -> Result<Prediction> {
    if !budget_total.is_finite() || budget_total < 0.0 {
        return Err(Error::validation(format!(
            "Budget total must be zero or a positive number (got {})",
            budget_total
        )));
    }

    let (month_start, _) = month_bounds(as_of.year(), as_of.month())?;
    let days_in_month = days_in_month(as_of.year(), as_of.month())?;
    let days_elapsed = as_of.day();
    let days_remaining = days_in_month - days_elapsed;

    let total_spent: f64 = expenses
        .iter()
        .filter(|e| e.date >= month_start && e.date <= as_of)
        .map(|e| e.amount)
        .sum();

    let daily_average = if days_elapsed > 0 {
        total_spent / days_elapsed as f64
    } else {
        0.0
    };
    let predicted_total = total_spent + daily_average * days_remaining as f64;

    let (status, difference, message) = if budget_total == 0.0 {
        (
            ForecastStatus::Warning,
            0.0,
            "Set a budget to track your spending predictions!".to_string(),
        )
    } else if predicted_total > budget_total {
        let overage = predicted_total - budget_total;
        (
            ForecastStatus::OverBudget,
            overage,
            format!(
                "You are likely to exceed your budget by {} this month!",
                fmt.format(overage)
            ),
        )
    } else if predicted_total > budget_total * WARNING_THRESHOLD {
        (
            ForecastStatus::Warning,
            budget_total - predicted_total,
            format!(
                "You're on track to spend {} out of {}. Watch your spending!",
                fmt.format(predicted_total),
                fmt.format(budget_total)
            ),
        )
    } else {
        (
            ForecastStatus::Safe,
            budget_total - predicted_total,
            format!(
                "You're doing great! Predicted spending: {} out of {}",
                fmt.format(predicted_total),
                fmt.format(budget_total)
            ),
        )
    };

    Ok(Prediction {
        total_spent,
        daily_average,
        days_elapsed,
        days_in_month,
        days_remaining,
        predicted_total,
        total_budget: budget_total,
        difference,
        status,
        message,
    })
}

fn percent(spent: f64, limit: f64) -> f64 {
    if limit > 0.0 {
        spent / limit * 100.0
    } else {
        0.0
    }
}

/// Spent vs. limit for a budget's month, overall and per category limit
pub fn budget_status(budget: &Budget, expenses: &[Expense]) -> Result<BudgetStatus> {
    let summary = aggregate_month(expenses, budget.year, budget.month)?;

    let categories = budget
        .category_limits
        .iter()
        .map(|limit| {
            let spent = summary
                .by_category
                .get(&limit.category)
                .copied()
                .unwrap_or(0.0);
            CategoryBudgetStatus {
                category: limit.category,
                limit: limit.limit,
                spent,
                remaining: limit.limit - spent,
                percent_used: percent(spent, limit.limit),
                over_limit: spent > limit.limit,
            }
        })
        .collect();

    Ok(BudgetStatus {
        budget_id: budget.id,
        period: budget.period(),
        total_limit: budget.total_limit,
        spent: summary.total,
        remaining: budget.total_limit - summary.total,
        percent_used: percent(summary.total, budget.total_limit),
        over_limit: summary.total > budget.total_limit,
        categories,
    })
}
