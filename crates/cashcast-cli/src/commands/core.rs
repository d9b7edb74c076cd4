//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Forecast settings from file and environment
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use cashcast_core::config::default_config_path;
use cashcast_core::db::Database;
use cashcast_core::ForecastConfig;
use chrono::NaiveDate;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load forecast settings: defaults, then the config file, then environment
pub fn load_config(path: Option<&Path>) -> Result<ForecastConfig> {
    let config = ForecastConfig::load(path).context("Failed to load forecast config")?;
    tracing::debug!(
        lookback_months = config.lookback_months,
        currency = %config.reporting_currency,
        "Forecast config loaded"
    );
    Ok(config)
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", s))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }
    if let Some(path) = default_config_path() {
        println!("   Config file (optional): {}", path.display());
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record activity: cashcast tx add --account Operating --amount -1200 --date 2026-01-05 --category Rent");
    println!("  2. Project a budget: cashcast budget generate --save");
    println!("  3. Check runway: cashcast forecast");

    Ok(())
}
