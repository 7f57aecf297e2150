//! Expense categorization
//!
//! The AI backend is asked first. When it is unavailable, slow, or answers
//! with something that is not a category, a keyword table decides instead.
//! Keywords are matched as lower-cased substrings and the first category in
//! table order wins, so "dinner at the mall" is Food, not Shopping.

use std::time::Duration;

use crate::ai::{with_fallback, AIBackend, AIClient};
use crate::config::DEFAULT_AI_TIMEOUT;
use crate::models::{Category, CategorySuggestion, NewExpense};

const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &[
            "food", "restaurant", "lunch", "dinner", "breakfast", "cafe", "coffee", "pizza",
            "burger", "meal", "grocery", "snack", "dominos", "mcdonalds", "kfc", "subway",
            "starbucks", "swiggy", "zomato", "delivery", "kitchen", "bakery",
        ],
    ),
    (
        Category::Transport,
        &[
            "uber", "ola", "taxi", "bus", "train", "metro", "fuel", "gas", "petrol", "diesel",
            "parking", "toll", "flight", "ticket", "cab", "auto", "rickshaw", "bike", "car",
        ],
    ),
    (
        Category::Shopping,
        &[
            "amazon", "flipkart", "shop", "clothing", "clothes", "shoes", "mall", "store",
            "purchase", "buy", "online", "myntra", "ajio",
        ],
    ),
    (
        Category::Bills,
        &[
            "bill", "electricity", "water", "internet", "phone", "mobile", "rent", "utility",
            "subscription", "recharge", "broadband", "wifi",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "movie", "cinema", "game", "concert", "netflix", "spotify", "amazon prime",
            "hotstar", "music", "show", "theatre", "youtube",
        ],
    ),
    (
        Category::Health,
        &[
            "medicine", "doctor", "hospital", "pharmacy", "medical", "health", "clinic",
            "therapy", "dental", "apollo", "gym", "fitness",
        ],
    ),
    (
        Category::Education,
        &[
            "book", "course", "tuition", "school", "college", "class", "education", "learning",
            "udemy", "coursera", "training",
        ],
    ),
];

const AI_NOTE: &str = "AI suggested category based on description";

/// First matching (category, keyword) from the keyword table
fn keyword_match(description: &str) -> Option<(Category, &'static str)> {
    let lower = description.to_lowercase();
    KEYWORDS.iter().find_map(|(category, words)| {
        words
            .iter()
            .find(|word| lower.contains(**word))
            .map(|word| (*category, *word))
    })
}

/// Category implied by the description's keywords, if any
pub fn keyword_category(description: &str) -> Option<Category> {
    keyword_match(description).map(|(category, _)| category)
}

fn keyword_suggestion(description: &str) -> CategorySuggestion {
    match keyword_match(description) {
        Some((category, word)) => CategorySuggestion {
            category,
            ai_categorized: false,
            notes: format!("Matched keyword \"{}\"", word),
        },
        None => CategorySuggestion {
            category: Category::Others,
            ai_categorized: false,
            notes: "No keyword matched; filed under Others".to_string(),
        },
    }
}

/// Suggests categories for expense descriptions
#[derive(Clone)]
pub struct Categorizer {
    ai: Option<AIClient>,
    timeout: Duration,
}

impl Categorizer {
    pub fn new(ai: Option<AIClient>, timeout: Duration) -> Self {
        Self { ai, timeout }
    }

    /// Keyword table only
    pub fn rule_based() -> Self {
        Self::new(None, DEFAULT_AI_TIMEOUT)
    }

    pub async fn categorize(&self, description: &str, amount: f64) -> CategorySuggestion {
        let fallback = || keyword_suggestion(description);

        let Some(ref ai) = self.ai else {
            return fallback();
        };

        let primary = async {
            let category = ai.categorize_expense(description, amount).await?;
            Ok(CategorySuggestion {
                category,
                ai_categorized: true,
                notes: AI_NOTE.to_string(),
            })
        };

        with_fallback("categorize_expense", self.timeout, primary, fallback).await
    }

    /// Fill in the category of an expense that was submitted without one
    ///
    /// An expense that already has a category is returned unchanged.
    pub async fn fill_category(&self, mut expense: NewExpense) -> NewExpense {
        if expense.category.is_none() {
            let suggestion = self.categorize(&expense.description, expense.amount).await;
            expense.category = Some(suggestion.category);
            expense.ai_categorized = suggestion.ai_categorized;
            expense.ai_notes = Some(suggestion.notes);
        }
        expense
    }
}
