//! Account operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Account, OwnerId};

impl Database {
    /// Create or get an account by name
    pub fn upsert_account(&self, owner: &OwnerId, name: &str) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Account name is required".to_string()));
        }

        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM accounts WHERE owner_id = ? AND name = ?",
                params![owner.as_str(), name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO accounts (owner_id, name) VALUES (?, ?)",
            params![owner.as_str(), name],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List an owner's accounts
    pub fn list_accounts(&self, owner: &OwnerId) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, created_at FROM accounts WHERE owner_id = ? ORDER BY name",
        )?;

        let accounts = stmt
            .query_map(params![owner.as_str()], |row| row_to_account(row, owner))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Get an account by ID, scoped to its owner
    pub fn get_account(&self, owner: &OwnerId, id: i64) -> Result<Option<Account>> {
        let conn = self.conn()?;
        let account = conn
            .query_row(
                "SELECT id, name, created_at FROM accounts WHERE id = ? AND owner_id = ?",
                params![id, owner.as_str()],
                |row| row_to_account(row, owner),
            )
            .optional()?;

        Ok(account)
    }
}

fn row_to_account(row: &rusqlite::Row, owner: &OwnerId) -> rusqlite::Result<Account> {
    let created_at_str: String = row.get(2)?;
    Ok(Account {
        id: row.get(0)?,
        owner_id: owner.clone(),
        name: row.get(1)?,
        created_at: parse_datetime(&created_at_str),
    })
}
