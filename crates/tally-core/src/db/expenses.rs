//! Expense database operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{format_date, parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, Expense, ExpenseUpdate, NewExpense};

const EXPENSE_COLUMNS: &str = "id, owner, description, amount, category, payment_method, date, \
                               ai_categorized, ai_notes, created_at";

impl Database {
    /// Insert a new expense
    ///
    /// An expense without a category is stored as `Others`; callers that want
    /// a suggested category run the categorizer first.
    pub fn create_expense(&self, owner: &str, expense: &NewExpense) -> Result<Expense> {
        expense.validate()?;

        let id = {
            let conn = self.conn()?;
            conn.execute(
                r#"
                INSERT INTO expenses (owner, description, amount, category, payment_method,
                                      date, ai_categorized, ai_notes)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    owner,
                    expense.description.trim(),
                    expense.amount,
                    expense.category.unwrap_or_default().as_str(),
                    expense.payment_method.as_str(),
                    format_date(expense.date),
                    expense.ai_categorized,
                    expense.ai_notes,
                ],
            )?;
            conn.last_insert_rowid()
        };

        self.get_expense(owner, id)
    }

    /// Get a single expense by ID
    pub fn get_expense(&self, owner: &str, id: i64) -> Result<Expense> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM expenses WHERE id = ? AND owner = ?",
            EXPENSE_COLUMNS
        );

        conn.query_row(&sql, params![id, owner], Self::row_to_expense)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))
    }

    /// Apply a partial update; absent fields keep their current values
    ///
    /// Setting a category by hand clears the AI-categorized flag.
    pub fn update_expense(&self, owner: &str, id: i64, update: &ExpenseUpdate) -> Result<Expense> {
        update.validate()?;

        let current = self.get_expense(owner, id)?;
        let (category, ai_categorized) = match update.category {
            Some(category) => (category, false),
            None => (current.category, current.ai_categorized),
        };

        {
            let conn = self.conn()?;
            conn.execute(
                r#"
                UPDATE expenses
                SET description = ?, amount = ?, category = ?, payment_method = ?,
                    date = ?, ai_categorized = ?
                WHERE id = ? AND owner = ?
                "#,
                params![
                    update
                        .description
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or(&current.description),
                    update.amount.unwrap_or(current.amount),
                    category.as_str(),
                    update
                        .payment_method
                        .unwrap_or(current.payment_method)
                        .as_str(),
                    format_date(update.date.unwrap_or(current.date)),
                    ai_categorized,
                    id,
                    owner,
                ],
            )?;
        }

        self.get_expense(owner, id)
    }

    /// Delete an expense
    pub fn delete_expense(&self, owner: &str, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM expenses WHERE id = ? AND owner = ?",
            params![id, owner],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Expense {}", id)));
        }
        Ok(())
    }

    /// Expenses for an owner, newest first, optionally limited to `[start, end)`
    pub fn find_expenses(
        &self,
        owner: &str,
        date_range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        let expenses = match date_range {
            Some((start, end)) => {
                let sql = format!(
                    "SELECT {} FROM expenses
                     WHERE owner = ? AND date >= ? AND date < ?
                     ORDER BY date DESC, id DESC",
                    EXPENSE_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(
                    params![owner, format_date(start), format_date(end)],
                    Self::row_to_expense,
                )?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM expenses WHERE owner = ? ORDER BY date DESC, id DESC",
                    EXPENSE_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![owner], Self::row_to_expense)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        Ok(expenses)
    }

    /// The `limit` most recent expenses by date
    pub fn recent_expenses(&self, owner: &str, limit: usize) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM expenses WHERE owner = ? ORDER BY date DESC, id DESC LIMIT ?",
            EXPENSE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner, limit as i64], Self::row_to_expense)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Column order: see `EXPENSE_COLUMNS`
    fn row_to_expense(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
        let category: String = row.get(4)?;
        let payment_method: String = row.get(5)?;
        let date: String = row.get(6)?;
        let created_at: String = row.get(9)?;

        Ok(Expense {
            id: row.get(0)?,
            owner: row.get(1)?,
            description: row.get(2)?,
            amount: row.get(3)?,
            category: category.parse::<Category>().unwrap_or_default(),
            payment_method: payment_method.parse().unwrap_or_default(),
            date: parse_date(&date),
            ai_categorized: row.get(7)?,
            ai_notes: row.get(8)?,
            created_at: parse_datetime(&created_at),
        })
    }
}
