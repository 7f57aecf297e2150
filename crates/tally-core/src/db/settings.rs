//! Per-owner settings

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::{Error, Result};
use crate::money::{normalize_currency, DEFAULT_CURRENCY};

impl Database {
    /// The owner's display currency (defaults to INR)
    pub fn get_currency(&self, owner: &str) -> Result<String> {
        let conn = self.conn()?;
        let currency: Option<String> = conn
            .query_row(
                "SELECT currency FROM user_settings WHERE owner = ?",
                params![owner],
                |row| row.get(0),
            )
            .optional()?;
        Ok(currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
    }

    /// Store the owner's display currency; returns the normalized code
    pub fn set_currency(&self, owner: &str, code: &str) -> Result<String> {
        let currency = normalize_currency(code).ok_or_else(|| {
            Error::validation(format!(
                "Invalid currency code '{}' (expected three letters, e.g. INR)",
                code
            ))
        })?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO user_settings (owner, currency) VALUES (?, ?)
            ON CONFLICT(owner) DO UPDATE SET currency = excluded.currency,
                                             updated_at = CURRENT_TIMESTAMP
            "#,
            params![owner, currency],
        )?;
        Ok(currency)
    }
}
