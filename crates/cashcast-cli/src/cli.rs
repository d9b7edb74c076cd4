//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cashcast - Cash-flow forecasting and budget variance
#[derive(Parser)]
#[command(name = "cashcast")]
#[command(about = "Self-hosted cash-flow forecaster for small businesses", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "cashcast.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set CASHCAST_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Forecast config file (defaults to ~/.local/share/cashcast/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Owner whose ledger and budget the command acts on
    #[arg(long, default_value = cashcast_server::LOCAL_DEV_OWNER, global = true)]
    pub owner: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// List or add accounts
    Accounts {
        #[command(subcommand)]
        action: Option<AccountsAction>,
    },

    /// Record and categorize ledger transactions
    Tx {
        #[command(subcommand)]
        action: TxAction,
    },

    /// Manage planned income and expenses
    Planned {
        #[command(subcommand)]
        action: Option<PlannedAction>,
    },

    /// Generate, inspect, and edit the budget
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },

    /// Show the rolling forecast (actuals + projection) and cash runway
    Forecast {
        /// Forecast horizon: sixMonths or yearEnd
        #[arg(long, default_value = "sixMonths")]
        horizon: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compare the saved budget with actuals
    Variance {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires Cloudflare Access authentication headers
        /// or a bearer key from CASHCAST_API_KEYS.
        #[arg(long)]
        no_auth: bool,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allowed_origins: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum AccountsAction {
    /// Add an account (no-op if it already exists)
    Add {
        /// Account name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum TxAction {
    /// Book a transaction
    Add {
        /// Account name (created if missing)
        #[arg(short, long)]
        account: String,

        /// Signed amount: positive for money in, negative for money out
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,

        /// Booking date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Description
        #[arg(long, default_value = "")]
        description: String,

        /// Category (leave out for uncategorized)
        #[arg(short, long)]
        category: Option<String>,

        /// Currency code (defaults to the reporting currency)
        #[arg(long)]
        currency: Option<String>,
    },

    /// List transactions, optionally within a date range
    List {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Set or clear a transaction's category
    Categorize {
        /// Transaction ID
        id: i64,

        /// New category (leave out to clear)
        category: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PlannedAction {
    /// Add a planned item
    Add {
        /// Name, e.g. "Quarterly tax"
        name: String,

        /// Kind: income or expense
        #[arg(short, long)]
        kind: String,

        /// Amount (positive)
        #[arg(short, long)]
        amount: f64,

        /// Expected date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Recurrence: one-off or monthly
        #[arg(short, long, default_value = "one-off")]
        recurrence: String,
    },

    /// List planned items
    List,

    /// Delete a planned item
    Delete {
        /// Planned item ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Project a budget from recent history
    Generate {
        /// Forecast horizon: sixMonths or yearEnd
        #[arg(long, default_value = "sixMonths")]
        horizon: String,

        /// Save the generated budget (replaces any saved budget)
        #[arg(long)]
        save: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the saved budget
    Show {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Delete the saved budget
    Delete,

    /// Replace a category's growth rate in the saved budget
    SetRate {
        /// Category name
        category: String,

        /// Income growth, percent per month
        #[arg(long, allow_hyphen_values = true)]
        income: Option<f64>,

        /// Expense growth, percent per month
        #[arg(long, allow_hyphen_values = true)]
        expense: Option<f64>,
    },

    /// Pin one cell of the saved budget
    SetCell {
        /// Forecast month (YYYY-MM)
        month: String,

        /// Category name
        category: String,

        /// Planned income
        #[arg(long, default_value = "0")]
        income: f64,

        /// Planned expenses
        #[arg(long, default_value = "0")]
        expenses: f64,
    },

    /// Revert a pinned cell to its computed value
    ClearCell {
        /// Forecast month (YYYY-MM)
        month: String,

        /// Category name
        category: String,
    },
}
