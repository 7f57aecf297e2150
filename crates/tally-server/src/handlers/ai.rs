//! AI handlers: categorization, insights, questions and predictions
//!
//! Every endpoint here answers even when the AI backend is down; the core
//! substitutes its rule-based output.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{get_owner, read_json, read_json_or_default, AppError, AppState};
use tally_core::models::{CategorySuggestion, Insight, Prediction};

/// Request body for categorizing a description
#[derive(Debug, Deserialize)]
pub struct CategorizeRequest {
    pub description: String,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// POST /api/ai/categorize - Suggest a category
pub async fn categorize_expense(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<CategorySuggestion>, AppError> {
    let req: CategorizeRequest = read_json(request).await?;

    let description = req.description.trim();
    if description.is_empty() {
        return Err(AppError::bad_request("Description is required"));
    }

    let suggestion = state
        .categorizer
        .categorize(description, req.amount.unwrap_or(0.0))
        .await;
    Ok(Json(suggestion))
}

/// Optional reference date for generated insights (defaults to today)
#[derive(Debug, Default, Deserialize)]
pub struct AsOfRequest {
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl AsOfRequest {
    fn date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// GET /api/ai/insights - All stored insights, newest first
pub async fn list_insights(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Insight>>, AppError> {
    let owner = get_owner(request.headers());
    Ok(Json(state.db.list_insights(&owner)?))
}

/// POST /api/ai/insights - Generate and store a spending summary
pub async fn generate_insight(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Insight>), AppError> {
    let owner = get_owner(request.headers());
    let req: AsOfRequest = read_json_or_default(request).await?;

    let insight = state.insights.generate_summary(&owner, req.date()).await?;
    Ok((StatusCode::CREATED, Json(insight)))
}

/// Request body for a question
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
}

/// POST /api/ai/ask - Answer a question about spending
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AskResponse>, AppError> {
    let owner = get_owner(request.headers());
    let req: AskRequest = read_json(request).await?;

    if req.question.trim().is_empty() {
        return Err(AppError::bad_request("Question is required"));
    }

    let today = req.today.unwrap_or_else(|| Local::now().date_naive());
    let answer = state.insights.ask(&owner, &req.question, today).await?;

    Ok(Json(AskResponse {
        question: req.question,
        answer,
    }))
}

/// POST /api/ai/predict - Month-end projection (stored as a prediction insight)
pub async fn predict_spending(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Prediction>, AppError> {
    let owner = get_owner(request.headers());
    let req: AsOfRequest = read_json_or_default(request).await?;

    let (prediction, _) = state.insights.generate_prediction(&owner, req.date())?;
    Ok(Json(prediction))
}
