//! Pluggable AI backend abstraction
//!
//! The AI layer only turns numbers the core already computed into prose
//! (summaries, answers) or picks a category for a description. Every call is
//! fallible and is always wrapped by [`with_fallback`], so a missing, slow or
//! broken backend degrades to the rule-based paths instead of failing.
//!
//! # Architecture
//!
//! - `AIBackend` trait: the operations every backend provides
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = AiConfig::load(None)?;
//! let ai = AIClient::from_config(&config)?;
//!
//! if let Some(ref client) = ai {
//!     let category = client.categorize_expense("Uber to airport", 540.0).await?;
//! }
//! ```

mod fallback;
mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use fallback::{bounded, with_fallback};
pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;

use crate::config::{AiConfig, AiProvider};
use crate::error::{Error, Result};
use crate::models::{Category, SpendingSummary};
use crate::prompts::{PromptId, PromptLibrary, RenderedPrompt};

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Narrate a period's aggregated spending
    async fn summarize_spending(&self, summary: &SpendingSummary, currency: &str)
        -> Result<String>;

    /// Answer a free-text question from transaction and budget context
    async fn answer_question(&self, question: &str, context: &QuestionContext) -> Result<String>;

    /// Pick a category for an expense description
    async fn categorize_expense(&self, description: &str, amount: f64) -> Result<Category>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name (for logging)
    fn model(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, hosted APIs)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Build a client from resolved configuration
    ///
    /// Returns `Ok(None)` when AI is not configured; callers then use the
    /// rule-based paths exclusively.
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>> {
        if !config.is_enabled() {
            info!("No AI backend configured, using rule-based responses");
            return Ok(None);
        }

        let client = match config.provider {
            AiProvider::Mock => AIClient::Mock(MockBackend::new()),
            AiProvider::Ollama | AiProvider::OpenAICompatible => {
                let host = config
                    .host
                    .as_deref()
                    .ok_or_else(|| Error::Config("AI host is required".into()))?;
                let http_client = reqwest::Client::builder()
                    .timeout(config.timeout)
                    .build()?;

                if config.provider == AiProvider::Ollama {
                    AIClient::Ollama(OllamaBackend::with_client(
                        http_client,
                        host,
                        config.model_name(),
                    ))
                } else {
                    AIClient::OpenAICompatible(OpenAICompatibleBackend::with_client(
                        http_client,
                        host,
                        config.model_name(),
                        config.api_key.as_deref(),
                    ))
                }
            }
        };

        info!(
            provider = config.provider.as_str(),
            host = client.host(),
            model = client.model(),
            "AI backend configured"
        );
        Ok(Some(client))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn summarize_spending(
        &self,
        summary: &SpendingSummary,
        currency: &str,
    ) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.summarize_spending(summary, currency).await,
            AIClient::OpenAICompatible(b) => b.summarize_spending(summary, currency).await,
            AIClient::Mock(b) => b.summarize_spending(summary, currency).await,
        }
    }

    async fn answer_question(&self, question: &str, context: &QuestionContext) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.answer_question(question, context).await,
            AIClient::OpenAICompatible(b) => b.answer_question(question, context).await,
            AIClient::Mock(b) => b.answer_question(question, context).await,
        }
    }

    async fn categorize_expense(&self, description: &str, amount: f64) -> Result<Category> {
        match self {
            AIClient::Ollama(b) => b.categorize_expense(description, amount).await,
            AIClient::OpenAICompatible(b) => b.categorize_expense(description, amount).await,
            AIClient::Mock(b) => b.categorize_expense(description, amount).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

// Prompt assembly shared by the HTTP backends

fn render(prompts: &RwLock<PromptLibrary>, id: PromptId, vars: &HashMap<&str, &str>) -> Result<RenderedPrompt> {
    let mut prompts = prompts
        .write()
        .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
    prompts.render(id, vars)
}

pub(crate) fn summary_prompt(
    prompts: &RwLock<PromptLibrary>,
    summary: &SpendingSummary,
    currency: &str,
) -> Result<RenderedPrompt> {
    let summary_json = serde_json::to_string(summary)?;
    let vars = HashMap::from([
        ("period", summary.period.as_str()),
        ("summary", summary_json.as_str()),
        ("currency", currency),
    ]);
    render(prompts, PromptId::SummarizeSpending, &vars)
}

pub(crate) fn question_prompt(
    prompts: &RwLock<PromptLibrary>,
    question: &str,
    context: &QuestionContext,
) -> Result<RenderedPrompt> {
    let transactions = serde_json::to_string(&context.transactions)?;
    let budgets = serde_json::to_string(&context.budgets)?;
    let today = context.today.format("%Y-%m-%d").to_string();
    let vars = HashMap::from([
        ("question", question),
        ("transactions", transactions.as_str()),
        ("budgets", budgets.as_str()),
        ("today", today.as_str()),
        ("currency", context.currency.as_str()),
    ]);
    render(prompts, PromptId::AnswerQuestion, &vars)
}

pub(crate) fn category_prompt(
    prompts: &RwLock<PromptLibrary>,
    description: &str,
    amount: f64,
) -> Result<RenderedPrompt> {
    let amount = format!("{:.2}", amount);
    let vars = HashMap::from([("description", description), ("amount", amount.as_str())]);
    render(prompts, PromptId::CategorizeExpense, &vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ai_client_mock() {
        let client = AIClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        assert!(AIClient::mock().health_check().await);
    }

    #[test]
    fn test_from_config_disabled() {
        assert!(AIClient::from_config(&AiConfig::disabled())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_from_config_selects_backend() {
        let config = AiConfig {
            provider: AiProvider::OpenAICompatible,
            host: Some("http://localhost:8080".to_string()),
            model: None,
            api_key: Some("key".to_string()),
            timeout: Duration::from_secs(5),
        };
        let client = AIClient::from_config(&config).unwrap().unwrap();
        assert!(matches!(client, AIClient::OpenAICompatible(_)));
        assert_eq!(client.host(), "http://localhost:8080");
        assert_eq!(client.model(), "gpt-3.5-turbo");

        let client = AIClient::from_config(&AiConfig::mock()).unwrap().unwrap();
        assert!(matches!(client, AIClient::Mock(_)));
    }

    #[test]
    fn test_summary_prompt_embeds_data() {
        let prompts = RwLock::new(PromptLibrary::embedded_only());
        let mut summary = SpendingSummary::empty("2025-06");
        summary.total = 180.0;
        summary.transaction_count = 3;
        summary.by_category.insert(Category::Food, 180.0);

        let rendered = summary_prompt(&prompts, &summary, "INR").unwrap();
        assert!(rendered.user.contains("2025-06"));
        assert!(rendered.user.contains("\"Food\":180.0"));
        assert!(rendered.system.unwrap().contains("INR"));
    }
}
