//! Budget database operations
//!
//! At most one budget may exist per (owner, month, year). Creation checks
//! for an existing budget first so the common case yields a clear message,
//! and the UNIQUE constraint settles races between concurrent writers.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{is_constraint_violation, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{format_period, Budget, BudgetUpdate, Category, CategoryLimit, NewBudget};

fn conflict(owner: &str, year: i32, month: u32) -> Error {
    Error::Conflict(format!(
        "A budget for {} already exists for {}",
        format_period(year, month),
        owner
    ))
}

fn insert_limits(conn: &Connection, budget_id: i64, limits: &[CategoryLimit]) -> Result<()> {
    for limit in limits {
        conn.execute(
            "INSERT INTO budget_category_limits (budget_id, category, limit_amount) VALUES (?, ?, ?)",
            params![budget_id, limit.category.as_str(), limit.limit],
        )?;
    }
    Ok(())
}

fn load_limits(conn: &Connection, budget_id: i64) -> Result<Vec<CategoryLimit>> {
    let mut stmt = conn.prepare(
        "SELECT category, limit_amount FROM budget_category_limits WHERE budget_id = ? ORDER BY id",
    )?;
    let rows = stmt.query_map(params![budget_id], |row| {
        let category: String = row.get(0)?;
        Ok(CategoryLimit {
            category: category.parse::<Category>().unwrap_or_default(),
            limit: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn find_budget_id(conn: &Connection, owner: &str, month: u32, year: i32) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM budgets WHERE owner = ? AND month = ? AND year = ?",
            params![owner, month, year],
            |row| row.get(0),
        )
        .optional()?)
}

/// Column order: id, owner, month, year, total_limit, created_at
fn row_to_budget(row: &rusqlite::Row) -> rusqlite::Result<Budget> {
    let created_at: String = row.get(5)?;
    Ok(Budget {
        id: row.get(0)?,
        owner: row.get(1)?,
        month: row.get(2)?,
        year: row.get(3)?,
        total_limit: row.get(4)?,
        category_limits: Vec::new(),
        created_at: parse_datetime(&created_at),
    })
}

fn with_limits(conn: &Connection, mut budget: Budget) -> Result<Budget> {
    budget.category_limits = load_limits(conn, budget.id)?;
    Ok(budget)
}

impl Database {
    /// Create a budget; a second budget for the same period is a conflict
    pub fn create_budget(&self, owner: &str, budget: &NewBudget) -> Result<Budget> {
        budget.validate()?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if find_budget_id(&tx, owner, budget.month, budget.year)?.is_some() {
            return Err(conflict(owner, budget.year, budget.month));
        }

        let inserted = tx.execute(
            "INSERT INTO budgets (owner, month, year, total_limit) VALUES (?, ?, ?, ?)",
            params![owner, budget.month, budget.year, budget.total_limit],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(conflict(owner, budget.year, budget.month));
            }
            Err(e) => return Err(e.into()),
        }
        let id = tx.last_insert_rowid();

        insert_limits(&tx, id, &budget.category_limits)?;
        tx.commit()?;

        debug!(owner = %owner, budget_id = id, period = %format_period(budget.year, budget.month), "Created budget");
        drop(conn);
        self.get_budget(owner, id)
    }

    /// Get a budget by ID
    pub fn get_budget(&self, owner: &str, id: i64) -> Result<Budget> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                "SELECT id, owner, month, year, total_limit, created_at
                 FROM budgets WHERE id = ? AND owner = ?",
                params![id, owner],
                row_to_budget,
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Budget {}", id)))?;
        with_limits(&conn, budget)
    }

    /// The owner's budget for a calendar month, if one is set
    pub fn find_budget(&self, owner: &str, month: u32, year: i32) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                "SELECT id, owner, month, year, total_limit, created_at
                 FROM budgets WHERE owner = ? AND month = ? AND year = ?",
                params![owner, month, year],
                row_to_budget,
            )
            .optional()?;

        budget.map(|b| with_limits(&conn, b)).transpose()
    }

    /// All of the owner's budgets, newest period first
    pub fn find_budgets(&self, owner: &str) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner, month, year, total_limit, created_at
             FROM budgets WHERE owner = ? ORDER BY year DESC, month DESC",
        )?;
        let budgets = stmt
            .query_map(params![owner], row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        budgets
            .into_iter()
            .map(|b| with_limits(&conn, b))
            .collect()
    }

    /// Apply a partial update
    ///
    /// Moving a budget onto a period that already has one is a conflict.
    /// `category_limits`, when present, replaces the whole list.
    pub fn update_budget(&self, owner: &str, id: i64, update: &BudgetUpdate) -> Result<Budget> {
        update.validate()?;

        let current = self.get_budget(owner, id)?;
        let month = update.month.unwrap_or(current.month);
        let year = update.year.unwrap_or(current.year);
        let total_limit = update.total_limit.unwrap_or(current.total_limit);

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if (month, year) != (current.month, current.year) {
            if let Some(other) = find_budget_id(&tx, owner, month, year)? {
                if other != id {
                    return Err(conflict(owner, year, month));
                }
            }
        }

        let updated = tx.execute(
            "UPDATE budgets SET month = ?, year = ?, total_limit = ? WHERE id = ? AND owner = ?",
            params![month, year, total_limit, id, owner],
        );
        match updated {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => return Err(conflict(owner, year, month)),
            Err(e) => return Err(e.into()),
        }

        if let Some(ref limits) = update.category_limits {
            tx.execute(
                "DELETE FROM budget_category_limits WHERE budget_id = ?",
                params![id],
            )?;
            insert_limits(&tx, id, limits)?;
        }

        tx.commit()?;
        drop(conn);
        self.get_budget(owner, id)
    }

    /// Delete a budget and its category limits
    pub fn delete_budget(&self, owner: &str, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let deleted = tx.execute(
            "DELETE FROM budgets WHERE id = ? AND owner = ?",
            params![id, owner],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Budget {}", id)));
        }
        tx.execute(
            "DELETE FROM budget_category_limits WHERE budget_id = ?",
            params![id],
        )?;

        tx.commit()?;
        Ok(())
    }
}
