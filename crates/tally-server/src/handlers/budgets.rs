//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Local};
use tracing::info;

use crate::{get_owner, read_json, AppError, AppState, SuccessResponse};
use tally_core::aggregate::month_bounds;
use tally_core::forecast::budget_status;
use tally_core::models::{Budget, BudgetStatus, BudgetUpdate, NewBudget};

/// GET /api/budgets - List budgets, newest period first
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Budget>>, AppError> {
    let owner = get_owner(request.headers());
    Ok(Json(state.db.find_budgets(&owner)?))
}

/// POST /api/budgets - Create a budget (one per month)
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Budget>), AppError> {
    let owner = get_owner(request.headers());
    let req: NewBudget = read_json(request).await?;

    let budget = state.db.create_budget(&owner, &req)?;

    info!(owner = %owner, id = budget.id, period = %budget.period(), "Created budget");
    Ok((StatusCode::CREATED, Json(budget)))
}

/// GET /api/budgets/current - Budget for the current month
pub async fn get_current_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let owner = get_owner(request.headers());
    let today = Local::now().date_naive();

    let budget = state
        .db
        .find_budget(&owner, today.month(), today.year())?
        .ok_or_else(|| AppError::not_found("No budget set for the current month"))?;

    Ok(Json(budget))
}

/// GET /api/budgets/:id - Get a single budget
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let owner = get_owner(request.headers());
    Ok(Json(state.db.get_budget(&owner, id)?))
}

/// PUT /api/budgets/:id - Update a budget
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let owner = get_owner(request.headers());
    let update: BudgetUpdate = read_json(request).await?;

    Ok(Json(state.db.update_budget(&owner, id, &update)?))
}

/// DELETE /api/budgets/:id - Delete a budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let owner = get_owner(request.headers());
    state.db.delete_budget(&owner, id)?;

    info!(owner = %owner, id, "Deleted budget");
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/budgets/:id/status - Spent vs. limits for the budget's month
pub async fn get_budget_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<BudgetStatus>, AppError> {
    let owner = get_owner(request.headers());
    let budget = state.db.get_budget(&owner, id)?;

    let range = month_bounds(budget.year, budget.month)?;
    let expenses = state.db.find_expenses(&owner, Some(range))?;

    Ok(Json(budget_status(&budget, &expenses)?))
}
