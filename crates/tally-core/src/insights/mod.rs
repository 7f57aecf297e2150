//! Spending narratives and stored insights

mod composer;
pub mod rule_based;
mod service;

pub use composer::InsightComposer;
pub use service::{InsightService, QUESTION_CONTEXT_LIMIT};
