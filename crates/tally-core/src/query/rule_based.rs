//! Keyword intent matching for questions the AI could not answer
//!
//! Intents are checked in precedence order on the lower-cased question:
//! budget, category, total, recent, and finally a general overview.

use chrono::{Datelike, NaiveDate};

use crate::aggregate::{aggregate_all, month_bounds};
use crate::ai::parsing::find_category;
use crate::models::{Budget, Category, Expense};
use crate::money::MoneyFormatter;

/// Answer when the owner has not recorded anything
pub const NO_EXPENSES_ANSWER: &str =
    "You don't have any expenses recorded yet. Start adding expenses to get insights!";

const BUDGET_KEYWORDS: &[&str] = &[
    "budget",
    "remaining",
    "left",
    "over",
    "still spend",
    "can spend",
    "can i spend",
];
const TOTAL_KEYWORDS: &[&str] = &["total", "how much", "spent"];
const RECENT_KEYWORDS: &[&str] = &["recent", "last"];

/// How many transactions the "recent" intent reports on
const RECENT_COUNT: usize = 5;

/// Budget usage above which the answer carries a warning
const WARNING_PERCENT: f64 = 80.0;

fn mentions(question: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| question.contains(k))
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Rule-based answer over the given expenses and budgets
///
/// `today` selects the month used by budget questions.
pub fn answer(
    question: &str,
    expenses: &[Expense],
    budgets: &[Budget],
    today: NaiveDate,
    fmt: &MoneyFormatter,
) -> String {
    if expenses.is_empty() {
        return NO_EXPENSES_ANSWER.to_string();
    }

    // Newest first regardless of how the caller ordered them
    let mut newest_first: Vec<&Expense> = expenses.iter().collect();
    newest_first.sort_by(|a, b| b.date.cmp(&a.date));

    let question = question.to_lowercase();

    if mentions(&question, BUDGET_KEYWORDS) {
        return budget_answer(expenses, budgets, today, fmt);
    }
    if let Some(category) = find_category(&question) {
        return category_answer(&newest_first, category, fmt);
    }
    if mentions(&question, TOTAL_KEYWORDS) {
        return total_answer(expenses, fmt);
    }
    if mentions(&question, RECENT_KEYWORDS) {
        return recent_answer(&newest_first, fmt);
    }
    overview_answer(expenses, fmt)
}

fn budget_answer(
    expenses: &[Expense],
    budgets: &[Budget],
    today: NaiveDate,
    fmt: &MoneyFormatter,
) -> String {
    let spent: f64 = match month_bounds(today.year(), today.month()) {
        Ok((start, end)) => expenses
            .iter()
            .filter(|e| e.date >= start && e.date < end)
            .map(|e| e.amount)
            .sum(),
        Err(_) => 0.0,
    };

    // A zero limit counts as no budget
    let budget = budgets
        .iter()
        .find(|b| b.month == today.month() && b.year == today.year())
        .filter(|b| b.total_limit > 0.0);

    let Some(budget) = budget else {
        return format!(
            "You haven't set a budget for this month yet. You've spent {} so far. \
             Consider setting a budget to track your spending better!",
            fmt.format(spent)
        );
    };

    let limit = budget.total_limit;
    let remaining = limit - spent;
    let percent_used = spent / limit * 100.0;

    if remaining < 0.0 {
        format!(
            "You've exceeded your budget! You've spent {} out of {} budget ({:.1}% used). \
             You're over budget by {}.",
            fmt.format(spent),
            fmt.format(limit),
            percent_used,
            fmt.format(-remaining)
        )
    } else if percent_used > WARNING_PERCENT {
        format!(
            "Warning: You've used {:.1}% of your budget! Spent {} out of {}. \
             You have {} remaining for this month.",
            percent_used,
            fmt.format(spent),
            fmt.format(limit),
            fmt.format(remaining)
        )
    } else {
        format!(
            "You're on track! You've spent {} out of {} budget ({:.1}% used). \
             You have {} remaining for this month.",
            fmt.format(spent),
            fmt.format(limit),
            percent_used,
            fmt.format(remaining)
        )
    }
}

fn category_answer(newest_first: &[&Expense], category: Category, fmt: &MoneyFormatter) -> String {
    let matching: Vec<&Expense> = newest_first
        .iter()
        .copied()
        .filter(|e| e.category == category)
        .collect();

    let Some(latest) = matching.first() else {
        return format!("You haven't recorded any {} expenses yet.", category);
    };

    let total: f64 = matching.iter().map(|e| e.amount).sum();
    format!(
        "You spent {} on {} across {} transaction{}. \
         Your most recent {} expense was {} for \"{}\".",
        fmt.format(total),
        category,
        matching.len(),
        plural(matching.len()),
        category,
        fmt.format(latest.amount),
        latest.description
    )
}

fn total_answer(expenses: &[Expense], fmt: &MoneyFormatter) -> String {
    let summary = aggregate_all(expenses, "all");
    let mut text = format!(
        "You've spent a total of {} across {} transaction{}.",
        fmt.format(summary.total),
        summary.transaction_count,
        plural(summary.transaction_count)
    );
    if let Some((top, amount)) = summary.ranked_categories().first() {
        text.push_str(&format!(
            " Your highest spending category is {} with {}.",
            top,
            fmt.format(*amount)
        ));
    }
    text
}

fn recent_answer(newest_first: &[&Expense], fmt: &MoneyFormatter) -> String {
    let recent = &newest_first[..newest_first.len().min(RECENT_COUNT)];
    let total: f64 = recent.iter().map(|e| e.amount).sum();

    let mut text = format!(
        "Your {} most recent expense{} total {}.",
        recent.len(),
        plural(recent.len()),
        fmt.format(total)
    );
    if let Some(latest) = recent.first() {
        text.push_str(&format!(
            " The latest was {} for \"{}\" in {}.",
            fmt.format(latest.amount),
            latest.description,
            latest.category
        ));
    }
    text
}

fn overview_answer(expenses: &[Expense], fmt: &MoneyFormatter) -> String {
    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    let average = total / expenses.len() as f64;
    format!(
        "Based on your {} transaction{}, you've spent {} in total, with an average expense of {}. \
         Try asking about specific categories like \"How much did I spend on food?\" \
         or \"What's my remaining budget?\".",
        expenses.len(),
        plural(expenses.len()),
        fmt.format(total),
        fmt.format(average)
    )
}
