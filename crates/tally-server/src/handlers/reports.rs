//! Spending reports

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use chrono::{Datelike, Local};
use serde::Deserialize;

use crate::{get_owner, AppError, AppState};
use tally_core::aggregate::{aggregate_month, month_bounds, monthly_series};
use tally_core::models::{parse_period, MonthlyTotal, SpendingSummary};

/// Longest trend the monthly report will return
pub const MAX_TREND_MONTHS: usize = 120;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// `YYYY-MM`, defaults to the current month
    pub period: Option<String>,
}

/// GET /api/reports/summary - Category breakdown for one month
pub async fn report_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryQuery>,
    request: Request,
) -> Result<Json<SpendingSummary>, AppError> {
    let owner = get_owner(request.headers());

    let (year, month) = match params.period {
        Some(ref period) => parse_period(period)?,
        None => {
            let today = Local::now().date_naive();
            (today.year(), today.month())
        }
    };

    let expenses = state
        .db
        .find_expenses(&owner, Some(month_bounds(year, month)?))?;
    Ok(Json(aggregate_month(&expenses, year, month)?))
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    #[serde(default = "default_months")]
    pub months: usize,
}

fn default_months() -> usize {
    6
}

/// GET /api/reports/monthly - Month-over-month totals, oldest first
pub async fn report_monthly(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthlyQuery>,
    request: Request,
) -> Result<Json<Vec<MonthlyTotal>>, AppError> {
    let owner = get_owner(request.headers());

    if params.months == 0 || params.months > MAX_TREND_MONTHS {
        return Err(AppError::bad_request(&format!(
            "months must be between 1 and {}",
            MAX_TREND_MONTHS
        )));
    }

    let expenses = state.db.find_expenses(&owner, None)?;
    Ok(Json(monthly_series(&expenses, params.months)))
}
