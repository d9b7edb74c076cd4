//! Budget command implementations

use anyhow::{Context, Result};
use cashcast_core::forecast::{Budget, BudgetEdit, Horizon, TrendMethod, YearMonth};
use cashcast_core::models::OwnerId;

use super::{truncate, Service};

pub fn cmd_budget_generate(
    service: &Service<'_>,
    owner: &OwnerId,
    horizon: &str,
    save: bool,
    json: bool,
) -> Result<Budget> {
    let horizon: Horizon = horizon.parse()?;
    let budget = service
        .generate(owner, horizon)
        .context("Failed to generate budget")?;

    if save {
        service.save(owner, &budget).context("Failed to save budget")?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&budget)?);
    } else {
        print_budget(&budget);
        println!();
        if save {
            println!("✅ Budget saved (replaces any previous budget)");
        } else {
            println!("   Not saved. Re-run with --save to keep it.");
        }
    }

    Ok(budget)
}

pub fn cmd_budget_show(service: &Service<'_>, owner: &OwnerId, json: bool) -> Result<()> {
    let Some(budget) = service.load(owner)? else {
        println!("No saved budget. Create one with:");
        println!("  cashcast budget generate --save");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&budget)?);
    } else {
        print_budget(&budget);
    }
    Ok(())
}

pub fn cmd_budget_delete(service: &Service<'_>, owner: &OwnerId) -> Result<bool> {
    let deleted = service.delete(owner)?;
    if deleted {
        println!("✅ Saved budget deleted");
    } else {
        println!("No saved budget to delete");
    }
    Ok(deleted)
}

pub fn cmd_budget_set_rate(
    service: &Service<'_>,
    owner: &OwnerId,
    category: &str,
    income_rate_pct: Option<f64>,
    expense_rate_pct: Option<f64>,
) -> Result<Budget> {
    apply_saved_edit(
        service,
        owner,
        BudgetEdit::SetGrowthRate {
            category: category.to_string(),
            income_rate_pct,
            expense_rate_pct,
        },
    )
}

pub fn cmd_budget_set_cell(
    service: &Service<'_>,
    owner: &OwnerId,
    month: &str,
    category: &str,
    income: f64,
    expenses: f64,
) -> Result<Budget> {
    let month: YearMonth = month.parse()?;
    apply_saved_edit(
        service,
        owner,
        BudgetEdit::SetCell {
            month,
            category: category.to_string(),
            income,
            expenses,
        },
    )
}

pub fn cmd_budget_clear_cell(
    service: &Service<'_>,
    owner: &OwnerId,
    month: &str,
    category: &str,
) -> Result<Budget> {
    let month: YearMonth = month.parse()?;
    apply_saved_edit(
        service,
        owner,
        BudgetEdit::ClearCell {
            month,
            category: category.to_string(),
        },
    )
}

/// Edit the saved budget and store the result
fn apply_saved_edit(service: &Service<'_>, owner: &OwnerId, edit: BudgetEdit) -> Result<Budget> {
    let saved = service.load(owner)?.context(
        "No saved budget to edit. Run 'cashcast budget generate --save' first",
    )?;

    let edited = service.apply_edits(owner, &saved, std::slice::from_ref(&edit))?;
    service.save(owner, &edited).context("Failed to save edited budget")?;

    print_budget(&edited);
    println!();
    println!("✅ Budget updated");
    Ok(edited)
}

fn print_budget(budget: &Budget) {
    println!();
    println!(
        "📒 Budget ({}, {} months, generated {})",
        budget.horizon,
        budget.forecast_months.len(),
        budget.generated_at.format("%Y-%m-%d %H:%M")
    );
    if let (Some(first), Some(last)) = (
        budget.historical_months.first(),
        budget.historical_months.last(),
    ) {
        println!("   History: {} to {}", first, last);
    } else {
        println!("   History: none");
    }

    if !budget.category_growth_rates.is_empty() {
        println!();
        println!("   Growth rates (% / month)");
        println!("   ─────────────────────────────────────────────────────────────");
        for (category, rate) in &budget.category_growth_rates {
            let method = match rate.trend.method {
                TrendMethod::LinearRegression => "trend",
                TrendMethod::InsufficientData => "too little data",
                TrendMethod::Manual => "manual",
            };
            println!(
                "   {:<20} income {:>7.2}  expenses {:>7.2}  ({})",
                truncate(category, 20),
                rate.income_rate_pct,
                rate.expense_rate_pct,
                method
            );
        }
    }

    for month in &budget.forecast_months {
        println!();
        let total = budget.month_total(*month).unwrap_or_default();
        println!(
            "   {}   in ${:.2}   out ${:.2}   net ${:.2}",
            month,
            total.income,
            total.expenses,
            total.net()
        );
        if let Some(cells) = budget.budget.get(month) {
            for (category, cell) in cells {
                let flow = cell.flow();
                let marker = if cell.is_override() { "*" } else { " " };
                println!(
                    "    {} {:<20} {:>12.2} {:>12.2}",
                    marker,
                    truncate(category, 20),
                    flow.income,
                    flow.expenses
                );
            }
        }
    }
    println!();
    println!("   * pinned by hand");
}
