//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `ai` - Predictions, insights, questions and categorization
//! - `budgets` - Budget commands (list, set, delete, status)
//! - `core` - Core commands (init, currency) and shared utilities (open_db, load_ai)
//! - `expenses` - Expense commands (list, add, delete)
//! - `reports` - Monthly report and trend commands
//! - `serve` - Web server command

pub mod ai;
pub mod budgets;
pub mod core;
pub mod expenses;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use ai::*;
pub use budgets::*;
pub use core::*;
pub use expenses::*;
pub use reports::*;
pub use serve::*;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use tally_core::models::parse_period;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse an optional `YYYY-MM-DD` argument, defaulting to today
pub fn parse_date_arg(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", d)),
        None => Ok(today()),
    }
}

/// Resolve an optional `YYYY-MM` argument to (year, month), defaulting to this month
pub fn resolve_period(period: Option<&str>) -> Result<(i32, u32)> {
    match period {
        Some(p) => Ok(parse_period(p)?),
        None => {
            let today = today();
            Ok((today.year(), today.month()))
        }
    }
}
