//! Transaction operations

use chrono::NaiveDate;
use rusqlite::params;

use super::{date_column, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, OwnerId, Transaction};
use crate::store::TransactionLedger;

impl Database {
    /// Book a transaction into one of the owner's accounts
    pub fn insert_transaction(&self, owner: &OwnerId, tx: &NewTransaction) -> Result<i64> {
        if !tx.amount.is_finite() {
            return Err(Error::Validation(format!(
                "Transaction amount must be a finite number, got {}",
                tx.amount
            )));
        }
        let currency = tx.currency.trim().to_uppercase();
        if currency.is_empty() {
            return Err(Error::Validation("Transaction currency is required".to_string()));
        }
        if self.get_account(owner, tx.account_id)?.is_none() {
            return Err(Error::NotFound(format!("Account {}", tx.account_id)));
        }

        let category = tx
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (owner_id, account_id, amount, currency, description, booked_at, category)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                owner.as_str(),
                tx.account_id,
                tx.amount,
                currency,
                tx.description,
                tx.booked_at.format("%Y-%m-%d").to_string(),
                category,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Set or clear (`None`) a transaction's category
    pub fn set_transaction_category(
        &self,
        owner: &OwnerId,
        id: i64,
        category: Option<&str>,
    ) -> Result<()> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE transactions SET category = ? WHERE id = ? AND owner_id = ?",
            params![category, id, owner.as_str()],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Transaction {}", id)));
        }
        Ok(())
    }

    /// Transactions in an inclusive date range, oldest first
    pub fn list_transactions(
        &self,
        owner: &OwnerId,
        date_range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut sql = String::from(
            r#"
            SELECT id, account_id, amount, currency, description, booked_at, category
            FROM transactions
            WHERE owner_id = ?1
            "#,
        );
        let (from, to) = match date_range {
            Some((from, to)) => {
                sql.push_str(" AND booked_at >= ?2 AND booked_at <= ?3");
                (
                    from.format("%Y-%m-%d").to_string(),
                    to.format("%Y-%m-%d").to_string(),
                )
            }
            None => (String::new(), String::new()),
        };
        sql.push_str(" ORDER BY booked_at, id");

        let mut stmt = conn.prepare(&sql)?;
        let map_row = |row: &rusqlite::Row| row_to_transaction(row, owner);
        let rows = if date_range.is_some() {
            stmt.query_map(params![owner.as_str(), from, to], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![owner.as_str()], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(rows)
    }

    /// Signed sum of every transaction in `currency`
    pub fn balance(&self, owner: &OwnerId, currency: &str) -> Result<f64> {
        let conn = self.conn()?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM transactions WHERE owner_id = ? AND currency = ?",
            params![owner.as_str(), currency.trim().to_uppercase()],
            |row| row.get(0),
        )?;
        Ok(total)
    }
}

/// Column order: id, account_id, amount, currency, description, booked_at, category
fn row_to_transaction(row: &rusqlite::Row, owner: &OwnerId) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        amount: row.get(2)?,
        currency: row.get(3)?,
        description: row.get(4)?,
        booked_at: date_column(row, 5)?,
        category: row.get(6)?,
        owner_id: owner.clone(),
    })
}

impl TransactionLedger for Database {
    fn transactions(
        &self,
        owner: &OwnerId,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Transaction>> {
        self.list_transactions(owner, range)
    }

    fn current_balance(&self, owner: &OwnerId, currency: &str) -> Result<f64> {
        self.balance(owner, currency)
    }
}
