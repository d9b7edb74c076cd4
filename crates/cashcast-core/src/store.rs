//! Collaborator stores the forecast service reads from and writes to
//!
//! Every method is scoped to one owner. [`crate::db::Database`] implements
//! all three on SQLite.

use chrono::NaiveDate;

use crate::error::Result;
use crate::forecast::Budget;
use crate::models::{OwnerId, PlannedItem, Transaction};

/// Read access to booked transactions
pub trait TransactionLedger {
    /// Transactions booked within `range` (inclusive), or all when `None`,
    /// ordered by booking date
    fn transactions(
        &self,
        owner: &OwnerId,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Transaction>>;

    /// Signed sum of every transaction in `currency`
    fn current_balance(&self, owner: &OwnerId, currency: &str) -> Result<f64>;
}

/// Read access to manually entered expectations
pub trait PlannedItemSource {
    fn planned_items(&self, owner: &OwnerId) -> Result<Vec<PlannedItem>>;
}

/// One saved budget per owner; writes replace (last write wins)
pub trait BudgetStore {
    fn get_budget(&self, owner: &OwnerId) -> Result<Option<Budget>>;

    fn put_budget(&self, owner: &OwnerId, budget: &Budget) -> Result<()>;

    /// Returns whether a budget existed
    fn delete_budget(&self, owner: &OwnerId) -> Result<bool>;
}
