//! AI narration with template fallback

use std::time::Duration;

use crate::ai::{with_fallback, AIBackend, AIClient};
use crate::config::DEFAULT_AI_TIMEOUT;
use crate::models::SpendingSummary;
use crate::money::MoneyFormatter;

use super::rule_based::narrate;

/// Turns aggregated spending into prose
///
/// The AI backend is tried first. Any failure, including a timeout, yields
/// the template narrative instead, so `compose` always returns text.
#[derive(Clone)]
pub struct InsightComposer {
    ai: Option<AIClient>,
    timeout: Duration,
}

impl InsightComposer {
    pub fn new(ai: Option<AIClient>, timeout: Duration) -> Self {
        Self { ai, timeout }
    }

    /// Template narration only
    pub fn rule_based() -> Self {
        Self::new(None, DEFAULT_AI_TIMEOUT)
    }

    pub async fn compose(&self, summary: &SpendingSummary, currency: &str) -> String {
        let fmt = MoneyFormatter::new(currency);
        let fallback = || narrate(summary, &fmt);

        match self.ai {
            Some(ref ai) => {
                with_fallback(
                    "summarize_spending",
                    self.timeout,
                    ai.summarize_spending(summary, currency),
                    fallback,
                )
                .await
            }
            None => fallback(),
        }
    }
}
