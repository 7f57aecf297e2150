//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod ai;
pub mod budgets;
pub mod expenses;
pub mod health;
pub mod reports;
pub mod settings;

// Re-export all handlers for use in router
pub use ai::*;
pub use budgets::*;
pub use expenses::*;
pub use health::*;
pub use reports::*;
pub use settings::*;
