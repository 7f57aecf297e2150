//! Insight generation over the record store
//!
//! Loads an owner's data, runs the engine, and appends the result to the
//! insight log. Shared by the REST API and the CLI.

use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use tracing::info;

use crate::aggregate::{aggregate_month, month_bounds};
use crate::ai::AIClient;
use crate::db::Database;
use crate::error::Result;
use crate::forecast::predict;
use crate::models::{format_period, Insight, InsightKind, NewInsight, Prediction};
use crate::money::MoneyFormatter;
use crate::query::QueryAnswerer;

use super::composer::InsightComposer;

/// Number of most recent expenses handed to the query answerer
pub const QUESTION_CONTEXT_LIMIT: usize = 100;

#[derive(Clone)]
pub struct InsightService {
    db: Database,
    composer: InsightComposer,
    answerer: QueryAnswerer,
}

impl InsightService {
    pub fn new(db: Database, ai: Option<AIClient>, timeout: Duration) -> Self {
        Self {
            db,
            composer: InsightComposer::new(ai.clone(), timeout),
            answerer: QueryAnswerer::new(ai, timeout),
        }
    }

    /// Narrate the month containing `as_of` and store it as a summary insight
    pub async fn generate_summary(&self, owner: &str, as_of: NaiveDate) -> Result<Insight> {
        let (year, month) = (as_of.year(), as_of.month());
        let range = month_bounds(year, month)?;
        let expenses = self.db.find_expenses(owner, Some(range))?;
        let summary = aggregate_month(&expenses, year, month)?;
        let currency = self.db.get_currency(owner)?;

        let ai_text = self.composer.compose(&summary, &currency).await;

        let insight = self.db.insert_insight(
            owner,
            &NewInsight {
                period: summary.period.clone(),
                kind: InsightKind::Summary,
                data: serde_json::to_value(&summary)?,
                ai_text,
            },
        )?;

        info!(owner = %owner, period = %insight.period, "Generated spending summary");
        Ok(insight)
    }

    /// Month-end projection against the budget for `as_of`'s month (0 when none)
    pub fn prediction(&self, owner: &str, as_of: NaiveDate) -> Result<Prediction> {
        let range = month_bounds(as_of.year(), as_of.month())?;
        let expenses = self.db.find_expenses(owner, Some(range))?;
        let budget_total = self
            .db
            .find_budget(owner, as_of.month(), as_of.year())?
            .map(|b| b.total_limit)
            .unwrap_or(0.0);
        let currency = self.db.get_currency(owner)?;

        predict(&expenses, budget_total, as_of, &MoneyFormatter::new(&currency))
    }

    /// Compute the projection and record it as a prediction insight
    pub fn generate_prediction(&self, owner: &str, as_of: NaiveDate) -> Result<(Prediction, Insight)> {
        let prediction = self.prediction(owner, as_of)?;

        let insight = self.db.insert_insight(
            owner,
            &NewInsight {
                period: format_period(as_of.year(), as_of.month()),
                kind: InsightKind::Prediction,
                data: serde_json::to_value(&prediction)?,
                ai_text: prediction.message.clone(),
            },
        )?;

        info!(
            owner = %owner,
            status = prediction.status.as_str(),
            "Generated spending prediction"
        );
        Ok((prediction, insight))
    }

    /// Answer a free-text question from the owner's recent expenses and budgets
    pub async fn ask(&self, owner: &str, question: &str, today: NaiveDate) -> Result<String> {
        let recent = self.db.recent_expenses(owner, QUESTION_CONTEXT_LIMIT)?;
        let budgets = self.db.find_budgets(owner)?;
        let currency = self.db.get_currency(owner)?;

        Ok(self
            .answerer
            .answer(question, &recent, &budgets, today, &currency)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::models::{Category, ForecastStatus, NewBudget, NewExpense, PaymentMethod};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn add(db: &Database, category: Category, amount: f64, date: NaiveDate) {
        db.create_expense(
            "alice",
            &NewExpense {
                description: format!("{} purchase", category),
                amount,
                category: Some(category),
                payment_method: PaymentMethod::Card,
                date,
                ai_categorized: false,
                ai_notes: None,
            },
        )
        .unwrap();
    }

    fn offline(db: &Database) -> InsightService {
        InsightService::new(
            db.clone(),
            Some(AIClient::Mock(MockBackend::failing())),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_summary_is_persisted_with_snapshot() {
        let db = Database::in_memory().unwrap();
        add(&db, Category::Food, 100.0, d(2025, 6, 2));
        add(&db, Category::Food, 50.0, d(2025, 6, 5));
        add(&db, Category::Transport, 30.0, d(2025, 6, 9));
        add(&db, Category::Bills, 999.0, d(2025, 5, 30));

        let insight = offline(&db)
            .generate_summary("alice", d(2025, 6, 10))
            .await
            .unwrap();

        assert_eq!(insight.period, "2025-06");
        assert_eq!(insight.kind, InsightKind::Summary);
        assert_eq!(insight.data["total"], 180.0);
        assert_eq!(insight.data["transaction_count"], 3);
        assert!(insight.ai_text.contains("Your biggest expense was Food"));

        assert_eq!(db.list_insights("alice").unwrap().len(), 1);
        assert!(db.list_insights("bob").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_uses_ai_text_when_available() {
        let db = Database::in_memory().unwrap();
        add(&db, Category::Food, 10.0, d(2025, 6, 2));

        let service = InsightService::new(db, Some(AIClient::mock()), Duration::from_secs(1));
        let insight = service.generate_summary("alice", d(2025, 6, 3)).await.unwrap();
        assert!(insight.ai_text.starts_with("AI summary for 2025-06"));
    }

    #[test]
    fn test_prediction_against_current_budget() {
        let db = Database::in_memory().unwrap();
        add(&db, Category::Food, 100.0, d(2025, 6, 2));
        add(&db, Category::Food, 50.0, d(2025, 6, 5));
        add(&db, Category::Transport, 30.0, d(2025, 6, 9));
        db.create_budget(
            "alice",
            &NewBudget {
                month: 6,
                year: 2025,
                total_limit: 200.0,
                category_limits: vec![],
            },
        )
        .unwrap();

        let (prediction, insight) = offline(&db)
            .generate_prediction("alice", d(2025, 6, 10))
            .unwrap();

        assert_eq!(prediction.predicted_total, 540.0);
        assert_eq!(prediction.status, ForecastStatus::OverBudget);
        assert_eq!(insight.kind, InsightKind::Prediction);
        assert_eq!(insight.ai_text, prediction.message);
    }

    #[test]
    fn test_prediction_without_budget() {
        let db = Database::in_memory().unwrap();
        add(&db, Category::Food, 100.0, d(2025, 6, 2));

        let prediction = offline(&db).prediction("alice", d(2025, 6, 10)).unwrap();
        assert_eq!(prediction.total_budget, 0.0);
        assert_eq!(prediction.status, ForecastStatus::Warning);
    }

    #[tokio::test]
    async fn test_ask_falls_back() {
        let db = Database::in_memory().unwrap();
        let answer = offline(&db)
            .ask("alice", "How much did I spend?", d(2025, 6, 10))
            .await
            .unwrap();
        assert!(answer.starts_with("You don't have any expenses recorded yet."));
    }
}
