//! Parsing helpers for AI backend responses
//!
//! Models pad their answers with quotes, markdown and trailing chatter.
//! These functions pull out the part we use or reject the response as
//! malformed so the caller can fall back.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::models::Category;

fn truncate(response: &str) -> String {
    if response.chars().count() > 200 {
        format!("{}...", response.chars().take(200).collect::<String>())
    } else {
        response.to_string()
    }
}

/// Clean a free-text response; an empty response is malformed
pub fn parse_text(response: &str) -> Result<String> {
    let text = response
        .trim()
        .trim_matches(|c| c == '"' || c == '`')
        .trim();

    if text.is_empty() {
        return Err(Error::InvalidData("Empty response from AI".into()));
    }
    Ok(text.to_string())
}

fn category_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(food|transport|shopping|bills|entertainment|health|education|others?)\b",
        )
        .expect("valid regex")
    })
}

/// Find the first category name mentioned in `text`
pub fn find_category(text: &str) -> Option<Category> {
    category_regex()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse a one-word category answer
///
/// The first category named anywhere in the response wins, so answers like
/// "Category: **Food**." still parse. A response naming no known category
/// is malformed.
pub fn parse_category(response: &str) -> Result<Category> {
    find_category(response).ok_or_else(|| {
        Error::InvalidData(format!(
            "No known category in AI response | Raw: {}",
            truncate(response.trim())
        ))
    })
}
