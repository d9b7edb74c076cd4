//! Rolling Forecast Merger
//!
//! Stitches realized months and projected months into one timeline. The
//! current calendar month is the last actual month and anchors the running
//! balance: its balance equals the live ledger balance exactly, and every
//! other month's balance is derived by walking outward from it.

use std::collections::BTreeMap;

use super::aggregator::MonthlyHistory;
use super::months::YearMonth;
use super::types::{round_cents, Budget, EntryType, Flow, RollingForecastEntry};

/// Merge actual history and a budget into a balance-consistent timeline
///
/// Months up to and including `current_month` always use the history, even
/// if the budget still holds plan values for them.
pub fn merge_timeline(
    budget: &Budget,
    history: &MonthlyHistory,
    current_balance: f64,
    current_month: YearMonth,
) -> Vec<RollingForecastEntry> {
    let first_actual = [
        history.first_month(),
        budget.forecast_months.first().copied(),
    ]
    .into_iter()
    .flatten()
    .filter(|m| *m <= current_month)
    .min()
    .unwrap_or(current_month);

    let mut entries: Vec<RollingForecastEntry> =
        YearMonth::range_inclusive(first_actual, current_month)
            .into_iter()
            .map(|month| {
                entry(
                    month,
                    EntryType::Actual,
                    history.total(month),
                    history.categories_for(month),
                )
            })
            .collect();
    let anchor = entries.len() - 1;

    for month in budget.forecast_months.iter().filter(|m| **m > current_month) {
        let by_category: BTreeMap<String, Flow> = budget
            .budget
            .get(month)
            .map(|cells| {
                cells
                    .iter()
                    .map(|(category, cell)| (category.clone(), cell.flow()))
                    .collect()
            })
            .unwrap_or_default();
        let total = budget.month_total(*month).unwrap_or_default().rounded();
        entries.push(entry(*month, EntryType::Forecast, total, by_category));
    }

    entries[anchor].balance = current_balance;
    for i in (0..anchor).rev() {
        entries[i].balance = round_cents(entries[i + 1].balance - entries[i + 1].net);
    }
    for i in anchor + 1..entries.len() {
        entries[i].balance = round_cents(entries[i - 1].balance + entries[i].net);
    }

    entries
}

fn entry(
    month: YearMonth,
    entry_type: EntryType,
    total: Flow,
    by_category: BTreeMap<String, Flow>,
) -> RollingForecastEntry {
    RollingForecastEntry {
        month,
        entry_type,
        income: total.income,
        expenses: total.expenses,
        net: round_cents(total.net()),
        balance: 0.0,
        by_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::types::{BudgetCell, BudgetGrid, Horizon};
    use chrono::Utc;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn flat_budget(current: YearMonth, income: f64, expenses: f64) -> Budget {
        let months = Horizon::SixMonths.forecast_months(current);
        let mut grid = BudgetGrid::new();
        for m in &months {
            grid.entry(*m)
                .or_default()
                .insert("Ops".into(), BudgetCell::computed(Flow::new(income, expenses)));
        }
        Budget {
            horizon: Horizon::SixMonths,
            forecast_months: months,
            category_growth_rates: BTreeMap::new(),
            budget: grid,
            historical_months: vec![],
            generated_at: Utc::now(),
        }
    }

    fn history(rows: &[(&str, f64, f64)]) -> MonthlyHistory {
        let mut h = MonthlyHistory::default();
        for (month, income, expenses) in rows {
            let month = ym(month);
            h.totals.insert(month, Flow::new(*income, *expenses));
            h.by_category
                .entry(month)
                .or_default()
                .insert("Ops".into(), Flow::new(*income, *expenses));
        }
        h
    }

    #[test]
    fn test_anchor_equals_current_balance() {
        let current = ym("2026-03");
        let hist = history(&[("2026-01", 500.0, 200.0), ("2026-03", 100.0, 50.0)]);
        let entries = merge_timeline(&flat_budget(current, 0.0, 100.0), &hist, 1234.56, current);

        let anchor = entries
            .iter()
            .rposition(|e| e.entry_type == EntryType::Actual)
            .unwrap();
        assert_eq!(entries[anchor].month, current);
        assert_eq!(entries[anchor].balance, 1234.56);
    }

    #[test]
    fn test_backward_and_forward_walk() {
        let current = ym("2026-03");
        let hist = history(&[
            ("2026-01", 500.0, 200.0),
            ("2026-02", 0.0, 0.0),
            ("2026-03", 100.0, 50.0),
        ]);
        let entries = merge_timeline(&flat_budget(current, 0.0, 100.0), &hist, 1000.0, current);

        assert_eq!(entries.len(), 9);
        // Feb balance = Mar balance - Mar net
        assert_eq!(entries[1].balance, 950.0);
        // Jan balance = Feb balance - Feb net
        assert_eq!(entries[0].balance, 950.0);
        // First forecast month: anchor + net
        assert_eq!(entries[3].entry_type, EntryType::Forecast);
        assert_eq!(entries[3].balance, 900.0);
        assert_eq!(entries[8].balance, 400.0);
    }

    #[test]
    fn test_gap_months_are_zero_actuals() {
        let current = ym("2026-04");
        let hist = history(&[("2026-01", 10.0, 0.0)]);
        let entries = merge_timeline(&flat_budget(current, 0.0, 0.0), &hist, 10.0, current);

        let actual: Vec<&RollingForecastEntry> = entries
            .iter()
            .filter(|e| e.entry_type == EntryType::Actual)
            .collect();
        assert_eq!(actual.len(), 4);
        assert_eq!(actual[1].net, 0.0);
        assert!(actual[1].by_category.is_empty());
    }

    #[test]
    fn test_elapsed_budget_months_use_actuals() {
        // Budget generated in January, viewed in March
        let budget = flat_budget(ym("2026-01"), 9999.0, 0.0);
        let hist = history(&[("2026-02", 300.0, 100.0), ("2026-03", 0.0, 0.0)]);
        let entries = merge_timeline(&budget, &hist, 0.0, ym("2026-03"));

        let feb = entries.iter().find(|e| e.month == ym("2026-02")).unwrap();
        assert_eq!(feb.entry_type, EntryType::Actual);
        assert_eq!(feb.income, 300.0);

        let forecasts = entries
            .iter()
            .filter(|e| e.entry_type == EntryType::Forecast)
            .count();
        assert_eq!(forecasts, 4);
    }

    #[test]
    fn test_empty_history_still_anchors() {
        let current = ym("2026-05");
        let entries = merge_timeline(
            &flat_budget(current, 0.0, 0.0),
            &MonthlyHistory::default(),
            0.0,
            current,
        );
        assert_eq!(entries[0].month, current);
        assert_eq!(entries[0].entry_type, EntryType::Actual);
        assert_eq!(entries.len(), 7);
    }
}
