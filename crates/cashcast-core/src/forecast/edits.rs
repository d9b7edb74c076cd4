//! Budget editing
//!
//! Edits are applied by a pure function that returns a new budget; the
//! input is never mutated. Cells set by the user become `Override` cells,
//! which later growth-rate edits leave untouched.

use serde::{Deserialize, Serialize};

use super::months::YearMonth;
use super::projector::computed_flow;
use super::trend::override_rate;
use super::types::{Budget, BudgetCell, Flow};
use crate::error::{Error, Result};
use crate::models::PlannedItem;

/// A single user edit to a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum BudgetEdit {
    /// Pin a cell to user-entered values
    #[serde(rename_all = "camelCase")]
    SetCell {
        month: YearMonth,
        category: String,
        income: f64,
        expenses: f64,
    },
    /// Drop a pinned cell and go back to the computed value
    #[serde(rename_all = "camelCase")]
    ClearCell { month: YearMonth, category: String },
    /// Replace a category's growth rate and re-project its remaining months
    #[serde(rename_all = "camelCase")]
    SetGrowthRate {
        category: String,
        income_rate_pct: Option<f64>,
        expense_rate_pct: Option<f64>,
    },
}

/// Inputs an edit needs besides the budget itself
#[derive(Debug, Clone, Copy)]
pub struct EditContext<'a> {
    /// Months up to and including this one are no longer re-projected
    pub current_month: YearMonth,
    pub planned_items: &'a [PlannedItem],
    pub flat_threshold_pct: f64,
}

/// Apply one edit, returning the edited copy
pub fn apply_edit(budget: &Budget, edit: &BudgetEdit, ctx: &EditContext<'_>) -> Result<Budget> {
    let mut next = budget.clone();

    match edit {
        BudgetEdit::SetCell {
            month,
            category,
            income,
            expenses,
        } => {
            require_forecast_month(budget, *month)?;
            require_category_name(category)?;
            for (label, value) in [("income", *income), ("expenses", *expenses)] {
                if !value.is_finite() || value < 0.0 {
                    return Err(Error::Validation(format!(
                        "{} for {} / {} must be a non-negative number, got {}",
                        label, month, category, value
                    )));
                }
            }
            next.budget
                .entry(*month)
                .or_default()
                .insert(category.clone(), BudgetCell::manual(Flow::new(*income, *expenses)));
        }

        BudgetEdit::ClearCell { month, category } => {
            let index = require_forecast_month(budget, *month)?;
            let cells = next.budget.entry(*month).or_default();
            match computed_flow(
                &budget.category_growth_rates,
                ctx.planned_items,
                category,
                *month,
                index,
            ) {
                Some(flow) => {
                    cells.insert(category.clone(), BudgetCell::computed(flow));
                }
                None => {
                    cells.remove(category);
                }
            }
        }

        BudgetEdit::SetGrowthRate {
            category,
            income_rate_pct,
            expense_rate_pct,
        } => {
            if income_rate_pct.is_none() && expense_rate_pct.is_none() {
                return Err(Error::Validation(
                    "A growth rate edit needs an income or expense rate".to_string(),
                ));
            }
            for value in income_rate_pct.iter().chain(expense_rate_pct.iter()) {
                if !value.is_finite() || *value < -100.0 {
                    return Err(Error::Validation(format!(
                        "Growth rate must be a number of at least -100%, got {}",
                        value
                    )));
                }
            }
            let current = budget.category_growth_rates.get(category).ok_or_else(|| {
                Error::Validation(format!("No growth rate for category '{}'", category))
            })?;

            let updated = override_rate(
                current,
                *income_rate_pct,
                *expense_rate_pct,
                ctx.flat_threshold_pct,
            );
            next.category_growth_rates.insert(category.clone(), updated);

            for (index, month) in budget.forecast_months.iter().enumerate() {
                if *month <= ctx.current_month {
                    continue;
                }
                let cells = next.budget.entry(*month).or_default();
                if cells.get(category).is_some_and(BudgetCell::is_override) {
                    continue;
                }
                if let Some(flow) = computed_flow(
                    &next.category_growth_rates,
                    ctx.planned_items,
                    category,
                    *month,
                    index,
                ) {
                    cells.insert(category.clone(), BudgetCell::computed(flow));
                }
            }
        }
    }

    Ok(next)
}

/// Apply edits in order; the first invalid edit aborts the whole batch
pub fn apply_edits(budget: &Budget, edits: &[BudgetEdit], ctx: &EditContext<'_>) -> Result<Budget> {
    edits
        .iter()
        .try_fold(budget.clone(), |acc, edit| apply_edit(&acc, edit, ctx))
}

fn require_forecast_month(budget: &Budget, month: YearMonth) -> Result<usize> {
    budget
        .forecast_months
        .iter()
        .position(|m| *m == month)
        .ok_or_else(|| Error::Validation(format!("{} is not a forecast month of this budget", month)))
}

fn require_category_name(category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(Error::Validation("Category name is required".to_string()));
    }
    Ok(())
}
