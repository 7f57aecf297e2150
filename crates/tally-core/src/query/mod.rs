//! Free-text questions about spending
//!
//! The AI backend gets the question together with the owner's recent
//! transactions and budgets. When it cannot answer, [`rule_based::answer`]
//! matches the question against a few fixed intents instead.

pub mod rule_based;

use std::time::Duration;

use chrono::NaiveDate;

use crate::ai::{with_fallback, AIBackend, AIClient, QuestionContext};
use crate::config::DEFAULT_AI_TIMEOUT;
use crate::models::{Budget, Expense};
use crate::money::MoneyFormatter;

#[derive(Clone)]
pub struct QueryAnswerer {
    ai: Option<AIClient>,
    timeout: Duration,
}

impl QueryAnswerer {
    pub fn new(ai: Option<AIClient>, timeout: Duration) -> Self {
        Self { ai, timeout }
    }

    /// Intent matching only
    pub fn rule_based() -> Self {
        Self::new(None, DEFAULT_AI_TIMEOUT)
    }

    /// Answer `question`; never fails
    pub async fn answer(
        &self,
        question: &str,
        recent: &[Expense],
        budgets: &[Budget],
        today: NaiveDate,
        currency: &str,
    ) -> String {
        let fmt = MoneyFormatter::new(currency);
        let fallback = || rule_based::answer(question, recent, budgets, today, &fmt);

        let Some(ref ai) = self.ai else {
            return fallback();
        };

        let context = QuestionContext::new(recent, budgets, today, currency);
        with_fallback(
            "answer_question",
            self.timeout,
            ai.answer_question(question, &context),
            fallback,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::models::{Category, PaymentMethod};
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn expenses() -> Vec<Expense> {
        vec![Expense {
            id: 1,
            owner: "test".to_string(),
            description: "Dinner".to_string(),
            amount: 42.0,
            category: Category::Food,
            payment_method: PaymentMethod::Card,
            date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            ai_categorized: false,
            ai_notes: None,
            created_at: Utc::now(),
        }]
    }

    #[tokio::test]
    async fn test_ai_answer() {
        let answerer = QueryAnswerer::new(Some(AIClient::mock()), Duration::from_secs(1));
        let text = answerer
            .answer("How am I doing?", &expenses(), &[], today(), "INR")
            .await;
        assert_eq!(
            text,
            "AI answer to \"How am I doing?\" using 1 transactions and 0 budgets."
        );
    }

    #[tokio::test]
    async fn test_failing_ai_uses_intents() {
        let answerer = QueryAnswerer::new(
            Some(AIClient::Mock(MockBackend::failing())),
            Duration::from_secs(1),
        );
        let text = answerer
            .answer("How much on food?", &expenses(), &[], today(), "USD")
            .await;
        assert!(text.starts_with("You spent $42.00 on Food across 1 transaction."));
    }

    #[tokio::test]
    async fn test_slow_ai_uses_intents() {
        let answerer = QueryAnswerer::new(
            Some(AIClient::Mock(MockBackend::slow(Duration::from_secs(5)))),
            Duration::from_millis(20),
        );
        let text = answerer.answer("anything", &[], &[], today(), "INR").await;
        assert_eq!(text, rule_based::NO_EXPENSES_ANSWER);
    }
}
