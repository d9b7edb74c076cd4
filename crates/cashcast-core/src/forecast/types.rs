//! Core types for the forecasting engine

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::months::{is_contiguous, YearMonth};
use crate::error::{Error, Result};

/// Synthetic category that carries planned one-off and recurring items
pub const PLANNED_ITEMS_CATEGORY: &str = "Planned Items";

/// Round a money amount to cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Income and expenses for one month (and optionally one category)
///
/// Both fields are non-negative magnitudes for projected values; expenses
/// are never stored as negative numbers, so `net = income - expenses`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Flow {
    pub income: f64,
    pub expenses: f64,
}

impl Flow {
    pub const ZERO: Flow = Flow {
        income: 0.0,
        expenses: 0.0,
    };

    pub fn new(income: f64, expenses: f64) -> Self {
        Self { income, expenses }
    }

    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }

    pub fn add(&self, other: Flow) -> Flow {
        Flow {
            income: self.income + other.income,
            expenses: self.expenses + other.expenses,
        }
    }

    pub fn rounded(&self) -> Flow {
        Flow {
            income: round_cents(self.income),
            expenses: round_cents(self.expenses),
        }
    }
}

/// Income, expenses, and their net
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NetFlow {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

impl From<Flow> for NetFlow {
    fn from(flow: Flow) -> Self {
        Self {
            income: flow.income,
            expenses: flow.expenses,
            net: flow.net(),
        }
    }
}

/// Forecast length selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Horizon {
    /// The next six calendar months
    SixMonths,
    /// The months remaining in the current calendar year (at least one)
    YearEnd,
}

impl Horizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SixMonths => "sixMonths",
            Self::YearEnd => "yearEnd",
        }
    }

    /// Number of forecast months when the current month is `current`
    pub fn len_from(&self, current: YearMonth) -> usize {
        match self {
            Self::SixMonths => 6,
            Self::YearEnd => (12 - current.month() as usize).max(1),
        }
    }

    /// Forecast months following `current`, in order
    pub fn forecast_months(&self, current: YearMonth) -> Vec<YearMonth> {
        (1..=self.len_from(current) as i32)
            .map(|i| current.plus_months(i))
            .collect()
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sixmonths" | "six-months" | "six_months" | "6m" => Ok(Self::SixMonths),
            "yearend" | "year-end" | "year_end" => Ok(Self::YearEnd),
            _ => Err(Error::Validation(format!(
                "Invalid horizon '{}'. Valid values: sixMonths, yearEnd",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// How a category's growth rates were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendMethod {
    /// Least-squares fit over the trailing window
    LinearRegression,
    /// Fewer than two data points; rates are zero
    InsufficientData,
    /// Rates entered by the user
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendInfo {
    pub direction: TrendDirection,
    /// Goodness of fit (R² × 100) of the dominant series
    pub strength_pct: f64,
    /// Coefficient of variation × 100 of the dominant series, 0 when its mean is 0
    pub volatility_pct: f64,
    pub window_months: usize,
    pub method: TrendMethod,
}

/// Per-category growth estimate and the values it compounds from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGrowthRate {
    pub income_rate_pct: f64,
    pub expense_rate_pct: f64,
    pub last_value: Flow,
    pub baseline_value: Flow,
    pub trend: TrendInfo,
}

/// One budget cell: either engine-computed or entered by the user
///
/// Override cells are never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum BudgetCell {
    Computed { income: f64, expenses: f64 },
    Override { income: f64, expenses: f64 },
}

impl BudgetCell {
    pub fn computed(flow: Flow) -> Self {
        Self::Computed {
            income: flow.income,
            expenses: flow.expenses,
        }
    }

    pub fn manual(flow: Flow) -> Self {
        Self::Override {
            income: flow.income,
            expenses: flow.expenses,
        }
    }

    pub fn flow(&self) -> Flow {
        match *self {
            Self::Computed { income, expenses } | Self::Override { income, expenses } => {
                Flow { income, expenses }
            }
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, Self::Override { .. })
    }
}

pub type BudgetGrid = BTreeMap<YearMonth, BTreeMap<String, BudgetCell>>;

/// A projected budget, the unit of persistence (one live budget per owner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub horizon: Horizon,
    pub forecast_months: Vec<YearMonth>,
    pub category_growth_rates: BTreeMap<String, CategoryGrowthRate>,
    pub budget: BudgetGrid,
    pub historical_months: Vec<YearMonth>,
    pub generated_at: DateTime<Utc>,
}

impl Budget {
    /// Totals for one month across every category, if the month is planned
    pub fn month_total(&self, month: YearMonth) -> Option<Flow> {
        self.budget.get(&month).map(|cells| {
            cells
                .values()
                .fold(Flow::ZERO, |acc, cell| acc.add(cell.flow()))
        })
    }

    /// Check the structural invariants a budget must hold before it is stored
    pub fn validate(&self) -> Result<()> {
        if self.forecast_months.is_empty() {
            return Err(Error::Validation(
                "Budget has no forecast months".to_string(),
            ));
        }
        if !is_contiguous(&self.forecast_months) {
            return Err(Error::Validation(
                "Budget forecast months must be strictly increasing with no gaps".to_string(),
            ));
        }
        let len = self.forecast_months.len();
        match self.horizon {
            Horizon::SixMonths if len != 6 => {
                return Err(Error::Validation(format!(
                    "A sixMonths budget must have 6 forecast months, found {}",
                    len
                )));
            }
            Horizon::YearEnd if !(1..=11).contains(&len) => {
                return Err(Error::Validation(format!(
                    "A yearEnd budget must have between 1 and 11 forecast months, found {}",
                    len
                )));
            }
            _ => {}
        }

        for (month, cells) in &self.budget {
            if !self.forecast_months.contains(month) {
                return Err(Error::Validation(format!(
                    "Budget has values for {} which is not a forecast month",
                    month
                )));
            }
            for (category, cell) in cells {
                let flow = cell.flow();
                for value in [flow.income, flow.expenses] {
                    if !value.is_finite() || value < 0.0 {
                        return Err(Error::Validation(format!(
                            "Budget value for {} / {} must be a non-negative number, got {}",
                            month, category, value
                        )));
                    }
                }
            }
        }

        for (category, rate) in &self.category_growth_rates {
            if !rate.income_rate_pct.is_finite() || !rate.expense_rate_pct.is_finite() {
                return Err(Error::Validation(format!(
                    "Growth rate for {} must be a finite number",
                    category
                )));
            }
        }

        Ok(())
    }
}

/// Whether a timeline month is realized or projected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryType {
    Actual,
    Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingForecastEntry {
    pub month: YearMonth,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    pub balance: f64,
    pub by_category: BTreeMap<String, Flow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunwaySeverity {
    Critical,
    MediumRisk,
    LowRisk,
    Healthy,
}

impl RunwaySeverity {
    pub fn from_runway(runway: Option<u32>) -> Self {
        match runway {
            None => Self::Healthy,
            Some(months) if months <= 1 => Self::Critical,
            Some(months) if months <= 3 => Self::MediumRisk,
            Some(months) if months <= 6 => Self::LowRisk,
            Some(_) => Self::Healthy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::MediumRisk => "mediumRisk",
            Self::LowRisk => "lowRisk",
            Self::Healthy => "healthy",
        }
    }
}

/// Months until the running balance first reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayEstimate {
    /// `None` means the balance never runs out on the current trajectory
    pub runway: Option<u32>,
    /// Set only when the crossing falls inside the forecast horizon
    pub negative_month: Option<YearMonth>,
    /// True when the runway was extrapolated past the horizon from the mean net
    pub extrapolated: bool,
    pub severity: RunwaySeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BudgetSource {
    Saved,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingForecastSummary {
    pub current_balance: f64,
    pub runway: RunwayEstimate,
    pub forecast_income: f64,
    pub forecast_expenses: f64,
    pub forecast_net: f64,
    pub ending_balance: f64,
    pub budget_source: BudgetSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingForecast {
    pub entries: Vec<RollingForecastEntry>,
    pub summary: RollingForecastSummary,
}

/// Plan, actual, and their differences for one month or one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceDetail {
    pub plan: NetFlow,
    pub actual: NetFlow,
    pub variance: NetFlow,
    pub variance_percent: NetFlow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceRecord {
    pub month: YearMonth,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub plan: NetFlow,
    pub actual: NetFlow,
    pub variance: NetFlow,
    pub variance_percent: NetFlow,
    pub by_category: BTreeMap<String, VarianceDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceReport {
    pub has_budget: bool,
    pub records: Vec<VarianceRecord>,
}
