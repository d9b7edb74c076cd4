//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, load_config, date parsing)
//! - `ledger` - Accounts and transactions
//! - `planned` - Planned item commands (add, list, delete)
//! - `budget` - Budget commands (generate, show, delete, edits)
//! - `forecast` - Rolling forecast and variance reports
//! - `serve` - Web server command

pub mod budget;
pub mod core;
pub mod forecast;
pub mod ledger;
pub mod planned;
pub mod serve;

// Re-export command functions for main.rs
pub use budget::*;
pub use core::*;
pub use forecast::*;
pub use ledger::*;
pub use planned::*;
pub use serve::*;

use cashcast_core::{Database, ForecastService};

/// The service every forecasting command runs against
pub type Service<'a> = ForecastService<'a, Database>;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a signed amount with color: red for money out, green for money in
pub fn format_signed(amount: f64) -> String {
    if amount < 0.0 {
        format!("\x1b[31m-${:.2}\x1b[0m", amount.abs())
    } else {
        format!("\x1b[32m+${:.2}\x1b[0m", amount)
    }
}
