//! Runway Calculator
//!
//! Walks forward from the balance anchor. The first losing forecast month
//! that leaves the running balance at or below zero fixes the runway.
//! Otherwise a negative mean forecast net is extrapolated past the horizon,
//! and a trajectory with no losing month never runs out.

use super::months::YearMonth;
use super::types::{round_cents, EntryType, RollingForecastEntry, RunwayEstimate, RunwaySeverity};

/// Runway from a merged timeline
pub fn estimate_runway(entries: &[RollingForecastEntry], current_balance: f64) -> RunwayEstimate {
    let forecast: Vec<(YearMonth, f64)> = entries
        .iter()
        .filter(|e| e.entry_type == EntryType::Forecast)
        .map(|e| (e.month, e.net))
        .collect();
    runway_from_nets(&forecast, current_balance)
}

/// Core scan over `(month, net)` pairs in chronological order
pub fn runway_from_nets(forecast: &[(YearMonth, f64)], current_balance: f64) -> RunwayEstimate {
    // Cash cannot run out on a trajectory that never loses money
    if forecast.iter().all(|(_, net)| *net >= 0.0) {
        return healthy();
    }

    let mut balance = current_balance;
    for (index, (month, net)) in forecast.iter().enumerate() {
        balance = round_cents(balance + net);
        if *net < 0.0 && balance <= 0.0 {
            let runway = Some(index as u32 + 1);
            return RunwayEstimate {
                runway,
                negative_month: Some(*month),
                extrapolated: false,
                severity: RunwaySeverity::from_runway(runway),
            };
        }
    }

    let mean_net = forecast.iter().map(|(_, net)| net).sum::<f64>() / forecast.len() as f64;
    if mean_net >= 0.0 {
        return healthy();
    }

    let months = (current_balance / mean_net.abs()).floor().max(0.0) as u32;
    let runway = Some(months);
    RunwayEstimate {
        runway,
        negative_month: None,
        extrapolated: true,
        severity: RunwaySeverity::from_runway(runway),
    }
}

fn healthy() -> RunwayEstimate {
    RunwayEstimate {
        runway: None,
        negative_month: None,
        extrapolated: false,
        severity: RunwaySeverity::Healthy,
    }
}
