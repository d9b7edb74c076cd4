//! Historical Aggregator
//!
//! Groups raw transactions into month × category totals. Positive amounts
//! count as income, negative amounts as expenses (by absolute value).
//! Uncategorized transactions stay out of the category map but are kept in
//! the overall monthly totals so those always reconcile with the ledger.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::months::YearMonth;
use super::types::Flow;
use crate::models::Transaction;

/// Month × category totals derived from a ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyHistory {
    pub by_category: BTreeMap<YearMonth, BTreeMap<String, Flow>>,
    /// Every transaction, categorized or not
    pub totals: BTreeMap<YearMonth, Flow>,
}

impl MonthlyHistory {
    /// Months with at least one transaction, in order
    pub fn months(&self) -> Vec<YearMonth> {
        self.totals.keys().copied().collect()
    }

    pub fn last_month(&self) -> Option<YearMonth> {
        self.totals.keys().next_back().copied()
    }

    pub fn first_month(&self) -> Option<YearMonth> {
        self.totals.keys().next().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn total(&self, month: YearMonth) -> Flow {
        self.totals.get(&month).copied().unwrap_or_default()
    }

    pub fn categories_for(&self, month: YearMonth) -> BTreeMap<String, Flow> {
        self.by_category.get(&month).cloned().unwrap_or_default()
    }

    /// Every category seen anywhere in the history
    pub fn categories(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .by_category
            .values()
            .flat_map(|cats| cats.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Aggregate transactions, optionally keeping only those booked within `window`
pub fn aggregate(
    transactions: &[Transaction],
    window: Option<(NaiveDate, NaiveDate)>,
) -> MonthlyHistory {
    let mut history = MonthlyHistory::default();

    for tx in transactions {
        if let Some((from, to)) = window {
            if tx.booked_at < from || tx.booked_at > to {
                continue;
            }
        }

        let month = YearMonth::of(tx.booked_at);
        let flow = if tx.amount >= 0.0 {
            Flow::new(tx.amount, 0.0)
        } else {
            Flow::new(0.0, tx.amount.abs())
        };

        let total = history.totals.entry(month).or_default();
        *total = total.add(flow);

        if let Some(category) = tx.category_name() {
            let cell = history
                .by_category
                .entry(month)
                .or_default()
                .entry(category.to_string())
                .or_default();
            *cell = cell.add(flow);
        }
    }

    for flow in history.totals.values_mut() {
        *flow = flow.rounded();
    }
    for cats in history.by_category.values_mut() {
        for flow in cats.values_mut() {
            *flow = flow.rounded();
        }
    }

    history
}
