//! Forecasting and budget-variance engine
//!
//! Turns a history of categorized cash movements into trend estimates, a
//! projected budget, a rolling actual+forecast timeline, a cash-runway
//! estimate, and a plan-vs-actual variance report.
//!
//! ## Components
//!
//! - **Historical Aggregator** (`aggregator`) - month × category totals
//! - **Trend Estimator** (`trend`) - smoothed growth rate per category
//! - **Budget Projector** (`projector`) - compounds rates over the horizon
//! - **Rolling Forecast Merger** (`rolling`) - actual + forecast timeline
//! - **Runway Calculator** (`runway`) - months until cash runs out
//! - **Variance Analyzer** (`variance`) - saved plan versus actuals
//!
//! Every function here is pure and synchronous; persistence and clocks live
//! in [`crate::service`].

pub mod aggregator;
pub mod edits;
pub mod months;
pub mod projector;
pub mod rolling;
pub mod runway;
pub mod trend;
pub mod types;
pub mod variance;

pub use aggregator::{aggregate, MonthlyHistory};
pub use edits::{apply_edit, apply_edits, BudgetEdit, EditContext};
pub use months::YearMonth;
pub use projector::{build_budget, project};
pub use rolling::merge_timeline;
pub use runway::estimate_runway;
pub use trend::{estimate_trends, TrendSettings};
pub use types::{
    Budget, BudgetCell, BudgetGrid, BudgetSource, CategoryGrowthRate, EntryType, Flow, Horizon,
    NetFlow, RollingForecast, RollingForecastEntry, RollingForecastSummary, RunwayEstimate,
    RunwaySeverity, TrendDirection, TrendInfo, TrendMethod, VarianceDetail, VarianceRecord,
    VarianceReport, PLANNED_ITEMS_CATEGORY,
};
pub use variance::analyze_variance;
