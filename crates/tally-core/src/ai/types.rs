//! Data handed to the AI backends

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Budget, Category, CategoryLimit, Expense};

/// A transaction as shown to the model
#[derive(Debug, Clone, Serialize)]
pub struct ContextTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: Category,
}

/// A budget as shown to the model
#[derive(Debug, Clone, Serialize)]
pub struct ContextBudget {
    pub month: u32,
    pub year: i32,
    pub total_limit: f64,
    pub category_limits: Vec<CategoryLimit>,
}

/// Everything the model may use to answer a question
#[derive(Debug, Clone, Serialize)]
pub struct QuestionContext {
    pub today: NaiveDate,
    pub currency: String,
    pub transactions: Vec<ContextTransaction>,
    pub budgets: Vec<ContextBudget>,
}

impl QuestionContext {
    pub fn new(expenses: &[Expense], budgets: &[Budget], today: NaiveDate, currency: &str) -> Self {
        Self {
            today,
            currency: currency.to_string(),
            transactions: expenses
                .iter()
                .map(|e| ContextTransaction {
                    date: e.date,
                    description: e.description.clone(),
                    amount: e.amount,
                    category: e.category,
                })
                .collect(),
            budgets: budgets
                .iter()
                .map(|b| ContextBudget {
                    month: b.month,
                    year: b.year,
                    total_limit: b.total_limit,
                    category_limits: b.category_limits.clone(),
                })
                .collect(),
        }
    }
}
