//! Insight database operations (append-only)

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Insight, InsightKind, NewInsight};

impl Database {
    /// Store a generated insight
    pub fn insert_insight(&self, owner: &str, insight: &NewInsight) -> Result<Insight> {
        let conn = self.conn()?;
        let data = serde_json::to_string(&insight.data)?;

        conn.execute(
            "INSERT INTO insights (owner, period, insight_type, data, ai_text) VALUES (?, ?, ?, ?, ?)",
            params![
                owner,
                insight.period,
                insight.kind.as_str(),
                data,
                insight.ai_text
            ],
        )?;
        let id = conn.last_insert_rowid();

        conn.query_row(
            "SELECT id, owner, period, insight_type, data, ai_text, created_at
             FROM insights WHERE id = ?",
            params![id],
            Self::row_to_insight,
        )?
    }

    /// All of the owner's insights, newest first
    pub fn list_insights(&self, owner: &str) -> Result<Vec<Insight>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner, period, insight_type, data, ai_text, created_at
             FROM insights WHERE owner = ?
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![owner], Self::row_to_insight)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .collect()
    }

    /// Rows are decoded in two steps so a corrupt `data` column surfaces
    /// as `InvalidData` instead of a SQLite conversion error.
    fn row_to_insight(row: &rusqlite::Row) -> rusqlite::Result<Result<Insight>> {
        let kind: String = row.get(3)?;
        let data: String = row.get(4)?;
        let created_at: String = row.get(6)?;

        let kind = match kind.parse::<InsightKind>() {
            Ok(kind) => kind,
            Err(e) => return Ok(Err(Error::InvalidData(e))),
        };
        let data = match serde_json::from_str(&data) {
            Ok(data) => data,
            Err(e) => return Ok(Err(Error::Json(e))),
        };

        Ok(Ok(Insight {
            id: row.get(0)?,
            owner: row.get(1)?,
            period: row.get(2)?,
            kind,
            data,
            ai_text: row.get(5)?,
            created_at: parse_datetime(&created_at),
        }))
    }
}
