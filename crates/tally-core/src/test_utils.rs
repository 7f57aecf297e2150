//! Test utilities for tally-core
//!
//! A mock model server speaking both the Ollama and the OpenAI chat
//! completions protocols, for integration tests of the HTTP backends and of
//! the fallback paths.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::categorize::keyword_category;

/// How the mock server behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// Answer every request
    Healthy,
    /// Return 500 for every request
    Failing,
    /// Answer after sleeping
    Slow(Duration),
}

/// Mock AI server for testing and development
pub struct MockAiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAiServer {
    /// Start a healthy mock server on an available port
    pub async fn start() -> Self {
        Self::start_with_mode(MockMode::Healthy).await
    }

    pub async fn start_with_mode(mode: MockMode) -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .route("/health", get(handle_health))
            .with_state(Arc::new(mode));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

type Mode = Arc<MockMode>;

/// Apply the configured failure or delay; `Some` short-circuits the handler
async fn misbehave(mode: &MockMode) -> Option<Response> {
    match *mode {
        MockMode::Healthy => None,
        MockMode::Failing => {
            Some((StatusCode::INTERNAL_SERVER_ERROR, "mock failure").into_response())
        }
        MockMode::Slow(delay) => {
            tokio::time::sleep(delay).await;
            None
        }
    }
}

/// Canned reply chosen from the prompt text (see prompts/*.md)
fn reply_for(prompt: &str) -> String {
    if let Some(rest) = prompt.split("Description: \"").nth(1) {
        let description = rest.split('"').next().unwrap_or_default();
        // Quoted and padded, as real models tend to answer
        return format!(" \"{}\"\n", keyword_category(description).unwrap_or_default());
    }
    if let Some(rest) = prompt.split("User question: \"").nth(1) {
        let question = rest.split('"').next().unwrap_or_default();
        return format!("Mock answer to: {}", question);
    }
    if let Some(rest) = prompt.split("spending summary for ").nth(1) {
        let period = rest.split_whitespace().next().unwrap_or_default();
        return format!("Mock summary for {}", period);
    }
    "Mock response".to_string()
}

async fn handle_tags(State(mode): State<Mode>) -> Response {
    if let Some(resp) = misbehave(&mode).await {
        return resp;
    }
    Json(serde_json::json!({ "models": [{ "name": "llama3.2:latest" }] })).into_response()
}

async fn handle_models(State(mode): State<Mode>) -> Response {
    if let Some(resp) = misbehave(&mode).await {
        return resp;
    }
    Json(serde_json::json!({ "data": [{ "id": "mock-model" }] })).into_response()
}

async fn handle_health(State(mode): State<Mode>) -> Response {
    if let Some(resp) = misbehave(&mode).await {
        return resp;
    }
    StatusCode::OK.into_response()
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

async fn handle_generate(
    State(mode): State<Mode>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if let Some(resp) = misbehave(&mode).await {
        return resp;
    }
    Json(GenerateResponse {
        response: reply_for(&request.prompt),
        model: request.model,
        done: true,
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

async fn handle_chat(State(mode): State<Mode>, Json(request): Json<ChatRequest>) -> Response {
    if let Some(resp) = misbehave(&mode).await {
        return resp;
    }
    let prompt = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .unwrap_or_default();

    Json(serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": reply_for(prompt) } }]
    }))
    .into_response()
}
