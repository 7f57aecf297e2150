//! Health check

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use tally_core::ai::AIBackend;

#[derive(Debug, Serialize)]
pub struct AiHealth {
    pub configured: bool,
    pub healthy: bool,
    pub model: Option<String>,
    pub host: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub ai: AiHealth,
}

/// GET /api/health - Database and AI backend status
///
/// An unreachable AI backend does not make the service unhealthy; the
/// rule-based fallbacks keep every endpoint answering.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = state.db.ping().is_ok();

    let ai = match state.ai {
        Some(ref client) => AiHealth {
            configured: true,
            healthy: client.health_check().await,
            model: Some(client.model().to_string()),
            host: Some(client.host().to_string()),
        },
        None => AiHealth {
            configured: false,
            healthy: false,
            model: None,
            host: None,
        },
    };

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
        ai,
    })
}
