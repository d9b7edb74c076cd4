//! Cashcast CLI - Cash-flow forecasting and budget variance
//!
//! Usage:
//!   cashcast init                          Initialize database
//!   cashcast tx add --account A --amount -250 --date 2026-01-05
//!   cashcast budget generate --save        Project and save a budget
//!   cashcast forecast --horizon yearEnd    Rolling forecast and runway
//!   cashcast serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cashcast_core::models::OwnerId;
use cashcast_core::{Database, ForecastConfig, ForecastService};
use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            allowed_origins,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                allowed_origins,
                config,
            )
            .await
        }
        command => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let owner = OwnerId::parse(&cli.owner).context("Invalid --owner")?;
            let service = ForecastService::new(&db, &config);
            run_command(command, &db, &service, &owner, &config)
        }
    }
}

/// Dispatch commands that act on one owner's ledger and budget
fn run_command(
    command: Commands,
    db: &Database,
    service: &commands::Service<'_>,
    owner: &OwnerId,
    config: &ForecastConfig,
) -> Result<()> {
    match command {
        Commands::Accounts { action } => match action {
            None => commands::cmd_accounts_list(db, owner),
            Some(AccountsAction::Add { name }) => {
                commands::cmd_accounts_add(db, owner, &name).map(|_| ())
            }
        },
        Commands::Tx { action } => match action {
            TxAction::Add {
                account,
                amount,
                date,
                description,
                category,
                currency,
            } => commands::cmd_tx_add(
                db,
                owner,
                &account,
                amount,
                &date,
                &description,
                category.as_deref(),
                currency.as_deref().unwrap_or(&config.reporting_currency),
            )
            .map(|_| ()),
            TxAction::List { from, to } => {
                commands::cmd_tx_list(db, owner, from.as_deref(), to.as_deref())
            }
            TxAction::Categorize { id, category } => {
                commands::cmd_tx_categorize(db, owner, id, category.as_deref())
            }
        },
        Commands::Planned { action } => match action {
            None | Some(PlannedAction::List) => commands::cmd_planned_list(db, owner),
            Some(PlannedAction::Add {
                name,
                kind,
                amount,
                date,
                recurrence,
            }) => commands::cmd_planned_add(db, owner, &name, &kind, amount, &date, &recurrence)
                .map(|_| ()),
            Some(PlannedAction::Delete { id }) => commands::cmd_planned_delete(db, owner, id),
        },
        Commands::Budget { action } => match action {
            BudgetAction::Generate {
                horizon,
                save,
                json,
            } => commands::cmd_budget_generate(service, owner, &horizon, save, json).map(|_| ()),
            BudgetAction::Show { json } => commands::cmd_budget_show(service, owner, json),
            BudgetAction::Delete => commands::cmd_budget_delete(service, owner).map(|_| ()),
            BudgetAction::SetRate {
                category,
                income,
                expense,
            } => commands::cmd_budget_set_rate(service, owner, &category, income, expense)
                .map(|_| ()),
            BudgetAction::SetCell {
                month,
                category,
                income,
                expenses,
            } => commands::cmd_budget_set_cell(service, owner, &month, &category, income, expenses)
                .map(|_| ()),
            BudgetAction::ClearCell { month, category } => {
                commands::cmd_budget_clear_cell(service, owner, &month, &category).map(|_| ())
            }
        },
        Commands::Forecast { horizon, json } => {
            commands::cmd_forecast(service, owner, &horizon, json).map(|_| ())
        }
        Commands::Variance { json } => commands::cmd_variance(service, owner, json).map(|_| ()),
        Commands::Init | Commands::Serve { .. } => {
            anyhow::bail!("init and serve do not run against an owner's ledger")
        }
    }
}
