//! Budget Projector
//!
//! Compounds each category's baseline forward over the forecast months:
//!
//! ```text
//! income(i)   = max(0, baseline.income   * (1 + incomeRate/100)^(i+1))
//! expenses(i) = max(0, baseline.expenses * (1 + expenseRate/100)^(i+1))
//! ```
//!
//! then folds planned items into the synthetic "Planned Items" category.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::months::YearMonth;
use super::types::{
    Budget, BudgetCell, BudgetGrid, CategoryGrowthRate, Flow, Horizon, PLANNED_ITEMS_CATEGORY,
};
use crate::models::{PlannedItem, PlannedItemKind, Recurrence};

/// Trend projection of one category for the forecast month at `index`
pub fn projected_flow(rate: &CategoryGrowthRate, index: usize) -> Flow {
    let periods = (index + 1) as i32;
    let grow = |base: f64, pct: f64| (base * (1.0 + pct / 100.0).powi(periods)).max(0.0);
    Flow::new(
        grow(rate.baseline_value.income, rate.income_rate_pct),
        grow(rate.baseline_value.expenses, rate.expense_rate_pct),
    )
    .rounded()
}

/// What planned items contribute to `month`
pub fn planned_contribution(planned: &[PlannedItem], month: YearMonth) -> Flow {
    planned
        .iter()
        .filter(|item| {
            let start = YearMonth::of(item.expected_date);
            match item.recurrence {
                Recurrence::OneOff => start == month,
                Recurrence::Monthly => start <= month,
            }
        })
        .fold(Flow::ZERO, |acc, item| {
            let amount = item.amount.abs();
            match item.kind {
                PlannedItemKind::Income => acc.add(Flow::new(amount, 0.0)),
                PlannedItemKind::Expense => acc.add(Flow::new(0.0, amount)),
            }
        })
        .rounded()
}

/// The engine's value for one cell, or `None` when the category has neither a
/// rate nor planned items
pub fn computed_flow(
    rates: &BTreeMap<String, CategoryGrowthRate>,
    planned: &[PlannedItem],
    category: &str,
    month: YearMonth,
    index: usize,
) -> Option<Flow> {
    let trend = rates.get(category).map(|rate| projected_flow(rate, index));
    let planned_part = (category == PLANNED_ITEMS_CATEGORY && !planned.is_empty())
        .then(|| planned_contribution(planned, month));

    match (trend, planned_part) {
        (None, None) => None,
        (trend, planned_part) => Some(
            trend
                .unwrap_or_default()
                .add(planned_part.unwrap_or_default())
                .rounded(),
        ),
    }
}

/// Project every category over `months`
///
/// Every forecast month is present in the result, even when there are no
/// categories at all.
pub fn project(
    rates: &BTreeMap<String, CategoryGrowthRate>,
    months: &[YearMonth],
    planned: &[PlannedItem],
) -> BudgetGrid {
    let mut categories: Vec<&str> = rates.keys().map(String::as_str).collect();
    if !planned.is_empty() && !rates.contains_key(PLANNED_ITEMS_CATEGORY) {
        categories.push(PLANNED_ITEMS_CATEGORY);
    }

    let mut grid = BudgetGrid::new();
    for (index, month) in months.iter().enumerate() {
        let cells = grid.entry(*month).or_default();
        for category in &categories {
            if let Some(flow) = computed_flow(rates, planned, category, *month, index) {
                cells.insert(category.to_string(), BudgetCell::computed(flow));
            }
        }
    }

    debug!(
        months = months.len(),
        categories = categories.len(),
        planned_items = planned.len(),
        "Projected budget"
    );
    grid
}

/// Assemble a complete budget from estimated rates
pub fn build_budget(
    horizon: Horizon,
    current_month: YearMonth,
    rates: BTreeMap<String, CategoryGrowthRate>,
    historical_months: Vec<YearMonth>,
    planned: &[PlannedItem],
    generated_at: DateTime<Utc>,
) -> Budget {
    let forecast_months = horizon.forecast_months(current_month);
    let budget = project(&rates, &forecast_months, planned);
    Budget {
        horizon,
        forecast_months,
        category_growth_rates: rates,
        budget,
        historical_months,
        generated_at,
    }
}
