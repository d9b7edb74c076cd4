//! Cashcast Core Library
//!
//! Cash-flow forecasting and budget variance for a small business ledger:
//! - Database access and migrations (SQLCipher-encrypted SQLite)
//! - Forecast engine: monthly aggregation, trend estimation, budget
//!   projection, rolling forecast, runway, and variance
//! - Store traits the engine reads from and writes to
//! - Forecast service wiring the engine to a store
//! - Configuration from TOML and environment

pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod models;
pub mod service;
pub mod store;

pub use config::ForecastConfig;
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{
    Budget, BudgetCell, BudgetEdit, Horizon, RollingForecast, VarianceReport, YearMonth,
};
pub use service::ForecastService;
pub use store::{BudgetStore, PlannedItemSource, TransactionLedger};
