//! Mock backend for testing
//!
//! Returns predictable responses without a running model server. It can also
//! be told to fail or to respond slowly, which exercises the fallback paths.

use std::time::Duration;

use async_trait::async_trait;

use crate::categorize::keyword_category;
use crate::error::{Error, Result};
use crate::models::{Category, SpendingSummary};
use crate::money::MoneyFormatter;

use super::types::QuestionContext;
use super::AIBackend;

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Every operation returns `AiUnavailable`
    pub failing: bool,
    /// Sleep before answering
    pub delay: Option<Duration>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Self::default()
        }
    }

    /// A backend whose every call fails
    pub fn failing() -> Self {
        Self {
            healthy: false,
            failing: true,
            delay: None,
        }
    }

    /// A healthy backend that takes `delay` to answer
    pub fn slow(delay: Duration) -> Self {
        Self {
            healthy: true,
            failing: false,
            delay: Some(delay),
        }
    }

    async fn simulate(&self) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(Error::AiUnavailable("mock backend configured to fail".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn summarize_spending(
        &self,
        summary: &SpendingSummary,
        currency: &str,
    ) -> Result<String> {
        self.simulate().await?;
        let fmt = MoneyFormatter::new(currency);
        Ok(format!(
            "AI summary for {}: {} across {} transactions.",
            summary.period,
            fmt.format(summary.total),
            summary.transaction_count
        ))
    }

    async fn answer_question(&self, question: &str, context: &QuestionContext) -> Result<String> {
        self.simulate().await?;
        Ok(format!(
            "AI answer to \"{}\" using {} transactions and {} budgets.",
            question,
            context.transactions.len(),
            context.budgets.len()
        ))
    }

    async fn categorize_expense(&self, description: &str, _amount: f64) -> Result<Category> {
        self.simulate().await?;
        Ok(keyword_category(description).unwrap_or_default())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_summary() {
        let mut summary = SpendingSummary::empty("2025-06");
        summary.total = 180.0;
        summary.transaction_count = 3;

        let text = MockBackend::new()
            .summarize_spending(&summary, "INR")
            .await
            .unwrap();
        assert_eq!(text, "AI summary for 2025-06: ₹180.00 across 3 transactions.");
    }

    #[tokio::test]
    async fn test_failing_backend() {
        let backend = MockBackend::failing();
        assert!(!backend.health_check().await);
        assert!(matches!(
            backend.categorize_expense("Pizza", 10.0).await,
            Err(Error::AiUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_categorize_uses_keywords() {
        let backend = MockBackend::new();
        assert_eq!(
            backend.categorize_expense("Uber to office", 10.0).await.unwrap(),
            Category::Transport
        );
        assert_eq!(
            backend.categorize_expense("???", 10.0).await.unwrap(),
            Category::Others
        );
    }
}
