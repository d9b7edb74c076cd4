//! Variance Analyzer
//!
//! Compares a saved budget with what actually happened in the months that
//! have since elapsed. Expenses are positive magnitudes on both sides, so
//! `net = income - expenses` and `variance.net = variance.income - variance.expenses`.

use std::collections::BTreeSet;

use super::aggregator::MonthlyHistory;
use super::months::YearMonth;
use super::types::{
    round_cents, Budget, EntryType, Flow, NetFlow, VarianceDetail, VarianceRecord,
};

/// Variance records for every budget month at or before `current_month`
pub fn analyze_variance(
    budget: &Budget,
    history: &MonthlyHistory,
    current_month: YearMonth,
) -> Vec<VarianceRecord> {
    budget
        .forecast_months
        .iter()
        .filter(|month| **month <= current_month)
        .map(|month| month_record(budget, history, *month))
        .collect()
}

fn month_record(budget: &Budget, history: &MonthlyHistory, month: YearMonth) -> VarianceRecord {
    let plan_cells = budget.budget.get(&month);
    let actual_cells = history.categories_for(month);

    let categories: BTreeSet<&String> = plan_cells
        .into_iter()
        .flat_map(|cells| cells.keys())
        .chain(actual_cells.keys())
        .collect();

    let by_category = categories
        .into_iter()
        .map(|category| {
            let plan = plan_cells
                .and_then(|cells| cells.get(category))
                .map(|cell| cell.flow())
                .unwrap_or_default();
            let actual = actual_cells.get(category).copied().unwrap_or_default();
            (category.clone(), compare(plan, actual))
        })
        .collect();

    let plan = budget.month_total(month).unwrap_or_default().rounded();
    let detail = compare(plan, history.total(month));

    VarianceRecord {
        month,
        entry_type: EntryType::Actual,
        plan: detail.plan,
        actual: detail.actual,
        variance: detail.variance,
        variance_percent: detail.variance_percent,
        by_category,
    }
}

/// Plan versus actual for one flow
pub fn compare(plan: Flow, actual: Flow) -> VarianceDetail {
    let plan = plan.rounded();
    let actual = actual.rounded();
    let income = round_cents(actual.income - plan.income);
    let expenses = round_cents(actual.expenses - plan.expenses);
    let variance = NetFlow {
        income,
        expenses,
        net: income - expenses,
    };

    let plan = NetFlow::from(plan);
    let actual = NetFlow::from(actual);

    VarianceDetail {
        plan,
        actual,
        variance,
        variance_percent: NetFlow {
            income: percent(variance.income, plan.income),
            expenses: percent(variance.expenses, plan.expenses),
            net: percent(variance.net, plan.net),
        },
    }
}

/// `variance / |plan| × 100` to the cent, or 0 when nothing was planned
fn percent(variance: f64, plan: f64) -> f64 {
    if plan == 0.0 {
        0.0
    } else {
        round_cents(variance / plan.abs() * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::types::{BudgetCell, BudgetGrid, Horizon};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn budget_from(current: YearMonth, cells: &[(&str, &str, Flow)]) -> Budget {
        let months = Horizon::SixMonths.forecast_months(current);
        let mut grid: BudgetGrid = months.iter().map(|m| (*m, BTreeMap::new())).collect();
        for (month, category, flow) in cells {
            grid.get_mut(&ym(month))
                .unwrap()
                .insert(category.to_string(), BudgetCell::computed(*flow));
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

    fn history(rows: &[(&str, Option<&str>, Flow)]) -> MonthlyHistory {
        let mut h = MonthlyHistory::default();
        for (month, category, flow) in rows {
            let month = ym(month);
            let total = h.totals.entry(month).or_default();
            *total = total.add(*flow);
            if let Some(category) = category {
                h.by_category
                    .entry(month)
                    .or_default()
                    .insert(category.to_string(), *flow);
            }
        }
        h
    }

    #[test]
    fn test_variance_scenario_income_over_plan() {
        let budget = budget_from(ym("2025-12"), &[("2026-01", "Sales", Flow::new(2000.0, 0.0))]);
        let hist = history(&[("2026-01", Some("Sales"), Flow::new(2500.0, 0.0))]);

        let records = analyze_variance(&budget, &hist, ym("2026-01"));
        assert_eq!(records.len(), 1);
        let sales = records[0].by_category["Sales"];
        assert_eq!(sales.variance.income, 500.0);
        assert_eq!(sales.variance_percent.income, 25.0);
        assert_eq!(records[0].variance.income, 500.0);
        assert_eq!(records[0].variance_percent.income, 25.0);
    }

    #[test]
    fn test_variance_net_is_income_minus_expenses() {
        let budget = budget_from(
            ym("2025-12"),
            &[
                ("2026-01", "Sales", Flow::new(1000.1, 0.0)),
                ("2026-01", "Rent", Flow::new(0.0, 700.7)),
                ("2026-02", "Rent", Flow::new(0.0, 700.7)),
            ],
        );
        let hist = history(&[
            ("2026-01", Some("Sales"), Flow::new(1200.35, 10.2)),
            ("2026-01", Some("Rent"), Flow::new(0.0, 650.45)),
            ("2026-01", None, Flow::new(3.3, 44.4)),
            ("2026-02", Some("Travel"), Flow::new(0.0, 99.99)),
        ]);

        let records = analyze_variance(&budget, &hist, ym("2026-02"));
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.variance.net, record.variance.income - record.variance.expenses);
            for detail in record.by_category.values() {
                assert_eq!(detail.variance.net, detail.variance.income - detail.variance.expenses);
                assert_eq!(detail.plan.net, detail.plan.income - detail.plan.expenses);
            }
        }
    }

    #[test]
    fn test_unplanned_category_has_zero_percent() {
        let budget = budget_from(ym("2025-12"), &[]);
        let hist = history(&[("2026-01", Some("Travel"), Flow::new(0.0, 120.0))]);

        let records = analyze_variance(&budget, &hist, ym("2026-01"));
        let travel = records[0].by_category["Travel"];
        assert_eq!(travel.variance.expenses, 120.0);
        assert_eq!(travel.variance_percent.expenses, 0.0);
    }

    #[test]
    fn test_planned_category_without_actuals() {
        let budget = budget_from(ym("2025-12"), &[("2026-01", "Rent", Flow::new(0.0, 800.0))]);
        let records = analyze_variance(&budget, &MonthlyHistory::default(), ym("2026-01"));
        let rent = records[0].by_category["Rent"];
        assert_eq!(rent.actual.expenses, 0.0);
        assert_eq!(rent.variance.expenses, -800.0);
        assert_eq!(rent.variance_percent.expenses, -100.0);
    }

    #[test]
    fn test_aggregate_actual_includes_uncategorized() {
        let budget = budget_from(ym("2025-12"), &[]);
        let hist = history(&[
            ("2026-01", Some("Sales"), Flow::new(100.0, 0.0)),
            ("2026-01", None, Flow::new(0.0, 30.0)),
        ]);
        let records = analyze_variance(&budget, &hist, ym("2026-01"));
        assert_eq!(records[0].actual.expenses, 30.0);
        assert!(!records[0].by_category.contains_key("Uncategorized"));
    }

    #[test]
    fn test_future_months_are_not_reported() {
        let budget = budget_from(ym("2026-01"), &[]);
        assert!(analyze_variance(&budget, &MonthlyHistory::default(), ym("2026-01")).is_empty());
    }

    #[test]
    fn test_fractional_amounts_round_to_cents() {
        let detail = compare(Flow::new(800.10, 0.0), Flow::new(1000.35, 0.0));
        assert_eq!(detail.variance.income, 200.25);
        assert_eq!(detail.variance.expenses, 0.0);
        assert_eq!(detail.variance.net, 200.25);
        assert_eq!(detail.variance_percent.income, 25.03);
        assert_eq!(detail.variance_percent.net, 25.03);

        let detail = compare(Flow::new(0.0, 300.0), Flow::new(0.0, 400.0));
        assert_eq!(detail.variance.expenses, 100.0);
        assert_eq!(detail.variance_percent.expenses, 33.33);
        assert_eq!(detail.variance.net, -100.0);
    }

    #[test]
    fn test_percent_uses_plan_magnitude() {
        // Planned net -100, actual net -50: variance +50 is +50% of |plan|
        let detail = compare(Flow::new(0.0, 100.0), Flow::new(0.0, 50.0));
        assert_eq!(detail.variance.net, 50.0);
        assert_eq!(detail.variance_percent.net, 50.0);
    }
}
