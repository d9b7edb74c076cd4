//! Planned item operations

use rusqlite::params;

use super::{date_column, parsed_column, Database};
use crate::error::{Error, Result};
use crate::models::{NewPlannedItem, OwnerId, PlannedItem};
use crate::store::PlannedItemSource;

impl Database {
    pub fn insert_planned_item(&self, owner: &OwnerId, item: &NewPlannedItem) -> Result<i64> {
        item.validate()?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO planned_items (owner_id, name, kind, amount, expected_date, recurrence)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                owner.as_str(),
                item.name.trim(),
                item.kind.as_str(),
                item.amount,
                item.expected_date.format("%Y-%m-%d").to_string(),
                item.recurrence.as_str(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List an owner's planned items by expected date
    pub fn list_planned_items(&self, owner: &OwnerId) -> Result<Vec<PlannedItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, kind, amount, expected_date, recurrence
            FROM planned_items
            WHERE owner_id = ?
            ORDER BY expected_date, id
            "#,
        )?;

        let items = stmt
            .query_map(params![owner.as_str()], |row| {
                Ok(PlannedItem {
                    id: row.get(0)?,
                    owner_id: owner.clone(),
                    name: row.get(1)?,
                    kind: parsed_column(row, 2)?,
                    amount: row.get(3)?,
                    expected_date: date_column(row, 4)?,
                    recurrence: parsed_column(row, 5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    pub fn delete_planned_item(&self, owner: &OwnerId, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM planned_items WHERE id = ? AND owner_id = ?",
            params![id, owner.as_str()],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Planned item {}", id)));
        }
        Ok(())
    }
}

impl PlannedItemSource for Database {
    fn planned_items(&self, owner: &OwnerId) -> Result<Vec<PlannedItem>> {
        self.list_planned_items(owner)
    }
}
