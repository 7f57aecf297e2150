//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance tracker:
//! - Database access and migrations (expenses, budgets, insights, settings)
//! - Spending aggregation and month-over-month series
//! - Month-end forecasting and budget status
//! - Pluggable AI backends (Ollama, OpenAI-compatible) with rule-based fallbacks
//! - Insight composer, query answerer and expense categorizer
//! - Prompt library for customizable AI prompts

pub mod aggregate;
pub mod ai;
pub mod categorize;
pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod insights;
pub mod models;
pub mod money;
pub mod prompts;
pub mod query;

/// Test utilities including a mock AI server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{aggregate, aggregate_month, monthly_series};
pub use ai::{AIBackend, AIClient, MockBackend, OllamaBackend, OpenAICompatibleBackend};
pub use categorize::Categorizer;
pub use config::{AiConfig, AiProvider};
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{budget_status, predict};
pub use insights::{InsightComposer, InsightService};
pub use models::*;
pub use money::MoneyFormatter;
pub use prompts::{PromptId, PromptLibrary};
pub use query::QueryAnswerer;
