//! Owner preferences

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{get_owner, read_json, AppError, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrencySetting {
    pub currency: String,
}

/// GET /api/settings/currency - Stored currency preference (default INR)
pub async fn get_currency(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<CurrencySetting>, AppError> {
    let owner = get_owner(request.headers());
    Ok(Json(CurrencySetting {
        currency: state.db.get_currency(&owner)?,
    }))
}

/// PUT /api/settings/currency - Change the currency used for formatting
pub async fn set_currency(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<CurrencySetting>, AppError> {
    let owner = get_owner(request.headers());
    let req: CurrencySetting = read_json(request).await?;

    Ok(Json(CurrencySetting {
        currency: state.db.set_currency(&owner, &req.currency)?,
    }))
}
