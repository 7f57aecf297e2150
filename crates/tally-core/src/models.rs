//! Domain models for Tally

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::money::{serialize_money, serialize_money_map};

/// Expense category
///
/// Declaration order is the stable category ordering used for tie-breaking
/// and for iteration over per-category totals.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    Entertainment,
    Health,
    Education,
    #[default]
    Others,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Self::Food,
        Self::Transport,
        Self::Shopping,
        Self::Bills,
        Self::Entertainment,
        Self::Health,
        Self::Education,
        Self::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Shopping => "Shopping",
            Self::Bills => "Bills",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
            Self::Education => "Education",
            Self::Others => "Others",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "shopping" => Ok(Self::Shopping),
            "bills" => Ok(Self::Bills),
            "entertainment" => Ok(Self::Entertainment),
            "health" => Ok(Self::Health),
            "education" => Ok(Self::Education),
            "others" | "other" => Ok(Self::Others),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How an expense was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "UPI")]
    Upi,
    Card,
    NetBanking,
    #[default]
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Upi => "UPI",
            Self::Card => "Card",
            Self::NetBanking => "NetBanking",
            Self::Other => "Other",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "upi" => Ok(Self::Upi),
            "card" => Ok(Self::Card),
            "netbanking" | "net_banking" => Ok(Self::NetBanking),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded expense, owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub owner: String,
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub date: NaiveDate,
    /// Category was chosen by the categorizer rather than the user
    pub ai_categorized: bool,
    pub ai_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    /// None means "let the categorizer decide"
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub date: NaiveDate,
    #[serde(default)]
    pub ai_categorized: bool,
    #[serde(default)]
    pub ai_notes: Option<String>,
}

impl NewExpense {
    pub fn validate(&self) -> Result<()> {
        validate_description(&self.description)?;
        validate_amount(self.amount)?;
        validate_date(self.date)
    }
}

/// Partial update for an expense; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseUpdate {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub payment_method: Option<PaymentMethod>,
    pub date: Option<NaiveDate>,
}

impl ExpenseUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(date) = self.date {
            validate_date(date)?;
        }
        Ok(())
    }
}

fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(Error::validation("Description is required"));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation(format!(
            "Amount must be a positive number (got {})",
            amount
        )));
    }
    Ok(())
}

fn validate_date(date: NaiveDate) -> Result<()> {
    validate_year(date.year())
}

fn validate_year(year: i32) -> Result<()> {
    if !(1970..=9999).contains(&year) {
        return Err(Error::validation(format!("Year out of range: {}", year)));
    }
    Ok(())
}

/// Spending limit for one category inside a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLimit {
    pub category: Category,
    pub limit: f64,
}

/// Monthly budget; at most one per (owner, month, year)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub owner: String,
    pub month: u32,
    pub year: i32,
    pub total_limit: f64,
    pub category_limits: Vec<CategoryLimit>,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    /// The budget's period as a `YYYY-MM` string
    pub fn period(&self) -> String {
        format_period(self.year, self.month)
    }

    pub fn limit_for(&self, category: Category) -> Option<f64> {
        self.category_limits
            .iter()
            .find(|l| l.category == category)
            .map(|l| l.limit)
    }
}

/// Input for creating a budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudget {
    pub month: u32,
    pub year: i32,
    pub total_limit: f64,
    #[serde(default)]
    pub category_limits: Vec<CategoryLimit>,
}

impl NewBudget {
    pub fn validate(&self) -> Result<()> {
        validate_month(self.month)?;
        validate_year(self.year)?;
        validate_limit("Total limit", self.total_limit)?;
        validate_category_limits(&self.category_limits)
    }
}

/// Partial update for a budget
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetUpdate {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub total_limit: Option<f64>,
    /// Replaces the whole list when present
    pub category_limits: Option<Vec<CategoryLimit>>,
}

impl BudgetUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(month) = self.month {
            validate_month(month)?;
        }
        if let Some(year) = self.year {
            validate_year(year)?;
        }
        if let Some(limit) = self.total_limit {
            validate_limit("Total limit", limit)?;
        }
        if let Some(ref limits) = self.category_limits {
            validate_category_limits(limits)?;
        }
        Ok(())
    }
}

fn validate_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(Error::validation(format!(
            "Month must be between 1 and 12 (got {})",
            month
        )));
    }
    Ok(())
}

fn validate_limit(what: &str, limit: f64) -> Result<()> {
    if !limit.is_finite() || limit <= 0.0 {
        return Err(Error::validation(format!(
            "{} must be a positive number (got {})",
            what, limit
        )));
    }
    Ok(())
}

fn validate_category_limits(limits: &[CategoryLimit]) -> Result<()> {
    let mut seen = Vec::with_capacity(limits.len());
    for limit in limits {
        if seen.contains(&limit.category) {
            return Err(Error::validation(format!(
                "Duplicate category limit for {}",
                limit.category
            )));
        }
        seen.push(limit.category);
        validate_limit(&format!("{} limit", limit.category), limit.limit)?;
    }
    Ok(())
}

/// Format a (year, month) pair as `YYYY-MM`
pub fn format_period(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Parse a `YYYY-MM` period string into (year, month)
pub fn parse_period(period: &str) -> Result<(i32, u32)> {
    let invalid = || Error::validation(format!("Invalid period '{}' (expected YYYY-MM)", period));

    let (year, month) = period.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    validate_month(month)?;
    validate_year(year)?;
    Ok((year, month))
}

/// Kind of stored insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Summary,
    OverspendingAlert,
    SavingTips,
    Prediction,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Summary => "summary",
            InsightKind::OverspendingAlert => "overspending_alert",
            InsightKind::SavingTips => "saving_tips",
            InsightKind::Prediction => "prediction",
        }
    }
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "summary" => Ok(InsightKind::Summary),
            "overspending_alert" => Ok(InsightKind::OverspendingAlert),
            "saving_tips" => Ok(InsightKind::SavingTips),
            "prediction" => Ok(InsightKind::Prediction),
            _ => Err(format!("Unknown insight type: {}", s)),
        }
    }
}

/// A generated insight (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: i64,
    pub owner: String,
    /// `YYYY-MM`
    pub period: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    /// Snapshot of the numbers the text was generated from
    pub data: serde_json::Value,
    pub ai_text: String,
    pub created_at: DateTime<Utc>,
}

/// Input for storing an insight
#[derive(Debug, Clone)]
pub struct NewInsight {
    pub period: String,
    pub kind: InsightKind,
    pub data: serde_json::Value,
    pub ai_text: String,
}

/// Aggregated spending for a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSummary {
    /// Human-readable period identifier (`YYYY-MM` for a month)
    pub period: String,
    #[serde(serialize_with = "serialize_money")]
    pub total: f64,
    /// Only categories with at least one expense appear
    #[serde(serialize_with = "serialize_money_map")]
    pub by_category: BTreeMap<Category, f64>,
    pub transaction_count: usize,
}

impl SpendingSummary {
    pub fn empty(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            total: 0.0,
            by_category: BTreeMap::new(),
            transaction_count: 0,
        }
    }

    /// Categories ordered by amount (largest first); ties keep category order
    pub fn ranked_categories(&self) -> Vec<(Category, f64)> {
        let mut ranked: Vec<(Category, f64)> =
            self.by_category.iter().map(|(c, a)| (*c, *a)).collect();
        // sort_by is stable, so equal amounts stay in category order
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

/// One point of the monthly trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub period: String,
    /// Short display label, e.g. "Mar 2025"
    pub label: String,
    #[serde(serialize_with = "serialize_money")]
    pub amount: f64,
    pub transaction_count: usize,
}

/// Risk tier of a month-end projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastStatus {
    Safe,
    Warning,
    #[serde(rename = "overbudget")]
    OverBudget,
}

impl ForecastStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastStatus::Safe => "safe",
            ForecastStatus::Warning => "warning",
            ForecastStatus::OverBudget => "overbudget",
        }
    }
}

impl std::fmt::Display for ForecastStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Month-end spending projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(serialize_with = "serialize_money")]
    pub total_spent: f64,
    #[serde(serialize_with = "serialize_money")]
    pub daily_average: f64,
    pub days_elapsed: u32,
    pub days_in_month: u32,
    pub days_remaining: u32,
    #[serde(serialize_with = "serialize_money")]
    pub predicted_total: f64,
    #[serde(serialize_with = "serialize_money")]
    pub total_budget: f64,
    /// Projected overage when over budget, headroom otherwise, 0 without a budget
    #[serde(serialize_with = "serialize_money")]
    pub difference: f64,
    pub status: ForecastStatus,
    pub message: String,
}

/// Spent vs. limit for one category of a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudgetStatus {
    pub category: Category,
    #[serde(serialize_with = "serialize_money")]
    pub limit: f64,
    #[serde(serialize_with = "serialize_money")]
    pub spent: f64,
    #[serde(serialize_with = "serialize_money")]
    pub remaining: f64,
    #[serde(serialize_with = "serialize_money")]
    pub percent_used: f64,
    pub over_limit: bool,
}

/// Budget-vs-actual for a budget's month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget_id: i64,
    pub period: String,
    #[serde(serialize_with = "serialize_money")]
    pub total_limit: f64,
    #[serde(serialize_with = "serialize_money")]
    pub spent: f64,
    #[serde(serialize_with = "serialize_money")]
    pub remaining: f64,
    #[serde(serialize_with = "serialize_money")]
    pub percent_used: f64,
    pub over_limit: bool,
    pub categories: Vec<CategoryBudgetStatus>,
}

/// Result of categorizing an expense description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub category: Category,
    /// True when the AI backend produced the category
    pub ai_categorized: bool,
    pub notes: String,
}
