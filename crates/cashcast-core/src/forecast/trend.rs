//! Trend Estimator
//!
//! Derives a per-category monthly growth rate from aggregated history:
//!
//! - **Baseline**: trailing moving average (default 3 months), or the last
//!   value when the series is shorter than the average window
//! - **Rate**: ordinary least-squares slope over the trailing window (default
//!   6 months) divided by the window mean, as a percentage per month
//! - **Clamp**: rates are bounded to ±`max_rate_pct` (default 50%)
//!
//! A category's series runs from the first month it appears to the last
//! month of the history; months without activity count as zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregator::MonthlyHistory;
use super::months::YearMonth;
use super::types::{
    round_cents, CategoryGrowthRate, Flow, TrendDirection, TrendInfo, TrendMethod,
};

/// Tuning for the trend estimation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct TrendSettings {
    pub window_months: usize,
    pub moving_average_months: usize,
    pub max_rate_pct: f64,
    pub flat_threshold_pct: f64,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            window_months: 6,
            moving_average_months: 3,
            max_rate_pct: 50.0,
            flat_threshold_pct: 1.0,
        }
    }
}

/// Estimate growth rates for every category in the history
///
/// An empty history yields an empty map.
pub fn estimate_trends(
    history: &MonthlyHistory,
    settings: &TrendSettings,
) -> BTreeMap<String, CategoryGrowthRate> {
    let Some(last_month) = history.last_month() else {
        return BTreeMap::new();
    };

    let mut rates = BTreeMap::new();
    for category in history.categories() {
        let series = category_series(history, &category, last_month);
        if series.is_empty() {
            continue;
        }
        let rate = estimate_category(&series, settings);
        debug!(
            category = %category,
            points = series.len(),
            income_rate = rate.income_rate_pct,
            expense_rate = rate.expense_rate_pct,
            "Estimated category trend"
        );
        rates.insert(category, rate);
    }
    rates
}

/// Monthly values for one category, zero-filled, ending at `last_month`
fn category_series(history: &MonthlyHistory, category: &str, last_month: YearMonth) -> Vec<Flow> {
    let first = history
        .by_category
        .iter()
        .find(|(_, cats)| cats.contains_key(category))
        .map(|(month, _)| *month);

    let Some(first) = first else {
        return Vec::new();
    };

    YearMonth::range_inclusive(first, last_month)
        .into_iter()
        .map(|month| {
            history
                .by_category
                .get(&month)
                .and_then(|cats| cats.get(category))
                .copied()
                .unwrap_or_default()
        })
        .collect()
}

/// Estimate one category from its chronological series (oldest first)
pub fn estimate_category(series: &[Flow], settings: &TrendSettings) -> CategoryGrowthRate {
    let last_value = series.last().copied().unwrap_or_default();
    let baseline_value = baseline(series, settings.moving_average_months, last_value);

    let window_len = settings.window_months.max(1).min(series.len());
    let window = &series[series.len() - window_len..];

    let incomes: Vec<f64> = window.iter().map(|f| f.income).collect();
    let expenses: Vec<f64> = window.iter().map(|f| f.expenses).collect();

    let income_fit = fit_rate(&incomes, settings.max_rate_pct);
    let expense_fit = fit_rate(&expenses, settings.max_rate_pct);

    let expense_dominant = baseline_value.expenses > baseline_value.income;
    let (dominant_fit, dominant_values) = if expense_dominant {
        (expense_fit, &expenses)
    } else {
        (income_fit, &incomes)
    };

    let method = if window.len() < 2 {
        TrendMethod::InsufficientData
    } else {
        TrendMethod::LinearRegression
    };

    CategoryGrowthRate {
        income_rate_pct: income_fit.rate_pct,
        expense_rate_pct: expense_fit.rate_pct,
        last_value,
        baseline_value,
        trend: TrendInfo {
            direction: direction(dominant_fit.rate_pct, settings.flat_threshold_pct),
            strength_pct: round_pct(dominant_fit.r_squared * 100.0),
            volatility_pct: round_pct(coefficient_of_variation(dominant_values) * 100.0),
            window_months: window.len(),
            method,
        },
    }
}

/// Replace a category's rates with user-entered ones
///
/// The baseline is left as it was; only the rates and trend labelling change.
pub fn override_rate(
    rate: &CategoryGrowthRate,
    income_rate_pct: Option<f64>,
    expense_rate_pct: Option<f64>,
    flat_threshold_pct: f64,
) -> CategoryGrowthRate {
    let income_rate_pct = income_rate_pct.unwrap_or(rate.income_rate_pct);
    let expense_rate_pct = expense_rate_pct.unwrap_or(rate.expense_rate_pct);
    let dominant = if rate.baseline_value.expenses > rate.baseline_value.income {
        expense_rate_pct
    } else {
        income_rate_pct
    };

    CategoryGrowthRate {
        income_rate_pct,
        expense_rate_pct,
        trend: TrendInfo {
            direction: direction(dominant, flat_threshold_pct),
            method: TrendMethod::Manual,
            ..rate.trend
        },
        ..*rate
    }
}

fn baseline(series: &[Flow], months: usize, last_value: Flow) -> Flow {
    if months == 0 || series.len() < months {
        return last_value;
    }
    let tail = &series[series.len() - months..];
    let n = tail.len() as f64;
    let sum = tail.iter().fold(Flow::ZERO, |acc, f| acc.add(*f));
    Flow::new(round_cents(sum.income / n), round_cents(sum.expenses / n))
}

#[derive(Debug, Clone, Copy)]
struct Fit {
    rate_pct: f64,
    r_squared: f64,
}

/// Least-squares slope relative to the mean, clamped
fn fit_rate(values: &[f64], max_rate_pct: f64) -> Fit {
    let none = Fit {
        rate_pct: 0.0,
        r_squared: 0.0,
    };
    if values.len() < 2 {
        return none;
    }

    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;
    if mean_y == 0.0 {
        return none;
    }

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let slope = sxy / sxx;
    let rate = (slope / mean_y * 100.0).clamp(-max_rate_pct, max_rate_pct);
    let r_squared = if syy == 0.0 {
        0.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };

    Fit {
        rate_pct: round_pct(rate),
        r_squared,
    }
}

fn direction(rate_pct: f64, flat_threshold_pct: f64) -> TrendDirection {
    if rate_pct.abs() < flat_threshold_pct {
        TrendDirection::Flat
    } else if rate_pct > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    }
}

/// Population standard deviation over mean; 0 when the mean is 0
fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean.abs()
}

fn round_pct(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
