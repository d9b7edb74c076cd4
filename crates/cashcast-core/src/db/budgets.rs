//! Saved budget operations
//!
//! The budget document is stored whole as JSON; `horizon` and
//! `generated_at` are duplicated into columns for listing and debugging.

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::forecast::Budget;
use crate::models::OwnerId;
use crate::store::BudgetStore;

impl BudgetStore for Database {
    fn get_budget(&self, owner: &OwnerId) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM budgets WHERE owner_id = ?",
                params![owner.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put_budget(&self, owner: &OwnerId, budget: &Budget) -> Result<()> {
        let payload = serde_json::to_string(budget)?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budgets (owner_id, horizon, payload, generated_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
            ON CONFLICT(owner_id) DO UPDATE SET
                horizon = excluded.horizon,
                payload = excluded.payload,
                generated_at = excluded.generated_at,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                owner.as_str(),
                budget.horizon.as_str(),
                payload,
                budget.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    fn delete_budget(&self, owner: &OwnerId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM budgets WHERE owner_id = ?",
            params![owner.as_str()],
        )?;
        Ok(deleted > 0)
    }
}
