//! Rolling forecast and variance command implementations

use anyhow::{Context, Result};
use cashcast_core::forecast::{
    BudgetSource, EntryType, Horizon, RollingForecast, RunwaySeverity, VarianceReport,
};
use cashcast_core::models::OwnerId;

use super::{format_signed, Service};

pub fn cmd_forecast(
    service: &Service<'_>,
    owner: &OwnerId,
    horizon: &str,
    json: bool,
) -> Result<RollingForecast> {
    let horizon: Horizon = horizon.parse()?;
    let forecast = service
        .rolling_forecast(owner, horizon)
        .context("Failed to build rolling forecast")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(forecast);
    }

    let summary = &forecast.summary;
    println!();
    println!("📈 Rolling Forecast ({})", horizon);
    println!("   ─────────────────────────────────────────────────────────────");
    for entry in &forecast.entries {
        let label = match entry.entry_type {
            EntryType::Actual => "actual  ",
            EntryType::Forecast => "forecast",
        };
        let warning = if entry.balance <= 0.0 { " ⚠️" } else { "" };
        println!(
            "   {} {} │ in {:>11.2} │ out {:>11.2} │ balance {:>12.2}{}",
            entry.month, label, entry.income, entry.expenses, entry.balance, warning
        );
    }

    println!();
    println!("   Current balance: ${:.2}", summary.current_balance);
    println!(
        "   Forecast net:    {} (in ${:.2}, out ${:.2})",
        format_signed(summary.forecast_net),
        summary.forecast_income,
        summary.forecast_expenses
    );
    println!("   Ending balance:  ${:.2}", summary.ending_balance);
    println!(
        "   Budget:          {}",
        match summary.budget_source {
            BudgetSource::Saved => "saved",
            BudgetSource::Generated => "generated (unsaved)",
        }
    );

    let runway = &summary.runway;
    let icon = match runway.severity {
        RunwaySeverity::Critical => "🔴",
        RunwaySeverity::MediumRisk => "🟠",
        RunwaySeverity::LowRisk => "🟡",
        RunwaySeverity::Healthy => "🟢",
    };
    match runway.runway {
        None => println!("   Runway:          {} cash does not run out on this trajectory", icon),
        Some(months) => {
            let when = match runway.negative_month {
                Some(month) => format!(", reaches zero in {}", month),
                None if runway.extrapolated => " (extrapolated past the horizon)".to_string(),
                None => String::new(),
            };
            println!(
                "   Runway:          {} {} month(s){} [{}]",
                icon,
                months,
                when,
                runway.severity.as_str()
            );
        }
    }

    Ok(forecast)
}

pub fn cmd_variance(service: &Service<'_>, owner: &OwnerId, json: bool) -> Result<VarianceReport> {
    let report = service.variance(owner).context("Failed to compute variance")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }

    if !report.has_budget {
        println!("No saved budget to compare against. Create one with:");
        println!("  cashcast budget generate --save");
        return Ok(report);
    }
    if report.records.is_empty() {
        println!("No budget months have elapsed yet. Check back next month.");
        return Ok(report);
    }

    println!();
    println!("📊 Budget vs Actual");
    println!("   ─────────────────────────────────────────────────────────────");
    for record in &report.records {
        println!(
            "   {} │ plan net {:>11.2} │ actual net {:>11.2} │ variance {} ({:.1}%)",
            record.month,
            record.plan.net,
            record.actual.net,
            format_signed(record.variance.net),
            record.variance_percent.net
        );
        for (category, detail) in &record.by_category {
            println!(
                "      {:<20} plan out {:>10.2} │ actual out {:>10.2} │ {:>7.1}%",
                super::truncate(category, 20),
                detail.plan.expenses,
                detail.actual.expenses,
                detail.variance_percent.expenses
            );
        }
    }

    Ok(report)
}
