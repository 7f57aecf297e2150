//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::{get_owner, read_json, AppError, AppState, SuccessResponse};
use tally_core::models::{Expense, ExpenseUpdate, NewExpense};

/// Query parameters for listing expenses
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// Inclusive start date
    pub from: Option<NaiveDate>,
    /// Exclusive end date
    pub to: Option<NaiveDate>,
}

/// GET /api/expenses - List expenses, newest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListExpensesQuery>,
    request: Request,
) -> Result<Json<Vec<Expense>>, AppError> {
    let owner = get_owner(request.headers());

    let expenses = match (params.from, params.to) {
        (Some(from), Some(to)) => {
            if to < from {
                return Err(AppError::bad_request("'to' must not be before 'from'"));
            }
            state.db.find_expenses(&owner, Some((from, to)))?
        }
        (from, to) => {
            let mut all = state.db.find_expenses(&owner, None)?;
            all.retain(|e| from.map_or(true, |f| e.date >= f) && to.map_or(true, |t| e.date < t));
            all
        }
    };

    Ok(Json(expenses))
}

/// POST /api/expenses - Record an expense
///
/// Without a category the categorizer picks one.
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let owner = get_owner(request.headers());
    let mut req: NewExpense = read_json(request).await?;

    // Categorizer flags are set server-side only
    req.ai_categorized = false;
    req.ai_notes = None;
    req.validate()?;

    let req = state.categorizer.fill_category(req).await;
    let expense = state.db.create_expense(&owner, &req)?;

    info!(
        owner = %owner,
        id = expense.id,
        category = %expense.category,
        ai_categorized = expense.ai_categorized,
        "Created expense"
    );
    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /api/expenses/:id - Get a single expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let owner = get_owner(request.headers());
    Ok(Json(state.db.get_expense(&owner, id)?))
}

/// PUT /api/expenses/:id - Update an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let owner = get_owner(request.headers());
    let update: ExpenseUpdate = read_json(request).await?;

    let expense = state.db.update_expense(&owner, id, &update)?;
    Ok(Json(expense))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let owner = get_owner(request.headers());
    state.db.delete_expense(&owner, id)?;

    info!(owner = %owner, id, "Deleted expense");
    Ok(Json(SuccessResponse { success: true }))
}
