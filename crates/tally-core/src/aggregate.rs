//! Spending aggregation
//!
//! Pure functions that turn expense records into period totals, category
//! breakdowns and a month-over-month series. Nothing here touches the
//! database; callers load the expenses and pass them in.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};
use crate::models::{format_period, Category, Expense, MonthlyTotal, SpendingSummary};

/// First day of the month and first day of the following month (half-open)
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::validation(format!("Invalid month: {}", format_period(year, month))))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| Error::validation(format!("Invalid month: {}", format_period(year, month))))?;
    Ok((start, end))
}

/// Number of calendar days in a month (handles leap years)
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let (start, end) = month_bounds(year, month)?;
    Ok((end - start).num_days() as u32)
}

/// Label for a half-open range: `YYYY-MM` when it covers exactly one month
fn period_label(start: NaiveDate, end: NaiveDate) -> String {
    if start.day() == 1 {
        if let Ok((_, month_end)) = month_bounds(start.year(), start.month()) {
            if month_end == end {
                return format_period(start.year(), start.month());
            }
        }
    }
    format!("{}..{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
}

/// Aggregate expenses dated in `[start, end)`
///
/// Categories without expenses are absent from `by_category`. The total is
/// the sum of the category totals, so the two always agree exactly.
pub fn aggregate(expenses: &[Expense], start: NaiveDate, end: NaiveDate) -> Result<SpendingSummary> {
    if end < start {
        return Err(Error::validation(format!(
            "Period end {} is before start {}",
            end, start
        )));
    }

    let in_range = expenses.iter().filter(|e| e.date >= start && e.date < end);
    Ok(aggregate_all(in_range, period_label(start, end)))
}

/// Aggregate every expense given, regardless of date
pub fn aggregate_all<'a>(
    expenses: impl IntoIterator<Item = &'a Expense>,
    period: impl Into<String>,
) -> SpendingSummary {
    let mut by_category: BTreeMap<Category, f64> = BTreeMap::new();
    let mut transaction_count = 0;

    for expense in expenses {
        *by_category.entry(expense.category).or_insert(0.0) += expense.amount;
        transaction_count += 1;
    }

    let total = by_category.values().sum();

    SpendingSummary {
        period: period.into(),
        total,
        by_category,
        transaction_count,
    }
}

/// Aggregate one calendar month
pub fn aggregate_month(expenses: &[Expense], year: i32, month: u32) -> Result<SpendingSummary> {
    let (start, end) = month_bounds(year, month)?;
    aggregate(expenses, start, end)
}

/// Monthly totals, oldest first, limited to the `months_back` most recent
/// months that have at least one expense. Months without expenses are
/// skipped rather than zero-filled.
pub fn monthly_series(expenses: &[Expense], months_back: usize) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();

    for expense in expenses {
        let entry = months
            .entry((expense.date.year(), expense.date.month()))
            .or_insert((0.0, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let skip = months.len().saturating_sub(months_back);

    months
        .into_iter()
        .skip(skip)
        .map(|((year, month), (amount, count))| MonthlyTotal {
            period: format_period(year, month),
            label: NaiveDate::from_ymd_opt(year, month, 1)
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_else(|| format_period(year, month)),
            amount,
            transaction_count: count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use chrono::Utc;

    fn expense(category: Category, amount: f64, date: &str) -> Expense {
        Expense {
            id: 0,
            owner: "test".to_string(),
            description: format!("{} purchase", category),
            amount,
            category,
            payment_method: PaymentMethod::Card,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            ai_categorized: false,
            ai_notes: None,
            created_at: Utc::now(),
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_aggregate_groups_by_category() {
        let expenses = vec![
            expense(Category::Food, 100.0, "2025-06-01"),
            expense(Category::Food, 50.0, "2025-06-15"),
            expense(Category::Transport, 30.0, "2025-06-20"),
        ];

        let summary = aggregate_month(&expenses, 2025, 6).unwrap();
        assert_eq!(summary.period, "2025-06");
        assert_eq!(summary.total, 180.0);
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.by_category.get(&Category::Food), Some(&150.0));
        assert_eq!(summary.by_category.get(&Category::Transport), Some(&30.0));
        assert!(!summary.by_category.contains_key(&Category::Bills));
    }

    #[test]
    fn test_aggregate_range_is_half_open() {
        let expenses = vec![
            expense(Category::Food, 10.0, "2025-05-31"),
            expense(Category::Food, 20.0, "2025-06-01"),
            expense(Category::Food, 40.0, "2025-06-30"),
            expense(Category::Food, 80.0, "2025-07-01"),
        ];

        let summary = aggregate(&expenses, d("2025-06-01"), d("2025-07-01")).unwrap();
        assert_eq!(summary.total, 60.0);
        assert_eq!(summary.transaction_count, 2);
    }

    #[test]
    fn test_aggregate_empty_period_is_not_an_error() {
        let expenses = vec![expense(Category::Food, 10.0, "2025-01-10")];

        let summary = aggregate_month(&expenses, 2025, 6).unwrap();
        assert_eq!(summary.total, 0.0);
        assert!(summary.by_category.is_empty());
        assert_eq!(summary.transaction_count, 0);

        let summary = aggregate_month(&[], 2025, 6).unwrap();
        assert_eq!(summary, SpendingSummary::empty("2025-06"));
    }

    #[test]
    fn test_aggregate_rejects_inverted_range() {
        let result = aggregate(&[], d("2025-07-01"), d("2025-06-01"));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_aggregate_total_equals_category_sum() {
        // Awkward fractions that would drift if summed in a different order
        let amounts = [0.1, 0.2, 0.3, 19.99, 4.45, 1e-3, 333.33, 7.07, 0.7];
        let expenses: Vec<Expense> = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| {
                expense(
                    Category::ALL[i % Category::ALL.len()],
                    *a,
                    &format!("2025-03-{:02}", i + 1),
                )
            })
            .collect();

        let summary = aggregate_month(&expenses, 2025, 3).unwrap();
        let category_sum: f64 = summary.by_category.values().sum();
        assert_eq!(category_sum, summary.total);
    }

    #[test]
    fn test_summary_json_rounds_category_totals() {
        let expenses = vec![
            expense(Category::Food, 0.1, "2025-06-01"),
            expense(Category::Food, 0.2, "2025-06-02"),
            expense(Category::Bills, 0.333, "2025-06-03"),
            expense(Category::Bills, 0.334, "2025-06-04"),
        ];

        let summary = aggregate_month(&expenses, 2025, 6).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total"], 0.97);
        assert_eq!(json["by_category"]["Food"], 0.3);
        assert_eq!(json["by_category"]["Bills"], 0.67);
    }

    #[test]
    fn test_custom_range_label() {
        let summary = aggregate(&[], d("2025-06-05"), d("2025-06-12")).unwrap();
        assert_eq!(summary.period, "2025-06-05..2025-06-12");
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2023, 2).unwrap(), 28);
        assert_eq!(days_in_month(1900, 2).unwrap(), 28);
        assert_eq!(days_in_month(2000, 2).unwrap(), 29);
        assert_eq!(days_in_month(2025, 4).unwrap(), 30);
        assert_eq!(days_in_month(2025, 12).unwrap(), 31);
        assert!(days_in_month(2025, 13).is_err());
    }

    #[test]
    fn test_monthly_series_keeps_most_recent_months() {
        let dates = [
            "2024-09-03",
            "2024-10-03",
            "2024-12-03",
            "2025-01-03",
            "2025-01-20",
            "2025-03-03",
            "2025-04-03",
            "2025-06-03",
            "2025-07-03",
        ];
        // Deliberately unsorted input
        let mut expenses: Vec<Expense> = dates
            .iter()
            .map(|date| expense(Category::Food, 10.0, date))
            .collect();
        expenses.reverse();

        let series = monthly_series(&expenses, 6);
        let periods: Vec<&str> = series.iter().map(|m| m.period.as_str()).collect();
        assert_eq!(
            periods,
            vec!["2024-12", "2025-01", "2025-03", "2025-04", "2025-06", "2025-07"]
        );

        let january = &series[1];
        assert_eq!(january.amount, 20.0);
        assert_eq!(january.transaction_count, 2);
        assert_eq!(january.label, "Jan 2025");
    }

    #[test]
    fn test_monthly_series_fewer_months_than_requested() {
        let expenses = vec![
            expense(Category::Bills, 5.0, "2025-01-01"),
            expense(Category::Bills, 5.0, "2025-02-01"),
        ];
        assert_eq!(monthly_series(&expenses, 12).len(), 2);
        assert!(monthly_series(&expenses, 0).is_empty());
        assert!(monthly_series(&[], 6).is_empty());
    }
}
