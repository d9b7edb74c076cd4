//! Account and transaction command implementations

use anyhow::{Context, Result};
use cashcast_core::db::Database;
use cashcast_core::models::{NewTransaction, OwnerId};
use chrono::NaiveDate;

use super::{format_signed, parse_date, truncate};

pub fn cmd_accounts_list(db: &Database, owner: &OwnerId) -> Result<()> {
    let accounts = db.list_accounts(owner)?;

    if accounts.is_empty() {
        println!("No accounts yet. Add one with:");
        println!("  cashcast accounts add Operating");
        return Ok(());
    }

    println!();
    println!("🏦 Accounts");
    println!("   ─────────────────────────────");
    for account in accounts {
        println!("   [{}] {}", account.id, account.name);
    }

    Ok(())
}

pub fn cmd_accounts_add(db: &Database, owner: &OwnerId, name: &str) -> Result<i64> {
    let id = db.upsert_account(owner, name)?;
    println!("✅ Account '{}' ready (id {})", name.trim(), id);
    Ok(id)
}

/// Book a transaction, creating the account by name if needed
#[allow(clippy::too_many_arguments)]
pub fn cmd_tx_add(
    db: &Database,
    owner: &OwnerId,
    account: &str,
    amount: f64,
    date: &str,
    description: &str,
    category: Option<&str>,
    currency: &str,
) -> Result<i64> {
    let booked_at = parse_date(date)?;
    let account_id = db
        .upsert_account(owner, account)
        .with_context(|| format!("Failed to resolve account '{}'", account))?;

    let id = db.insert_transaction(
        owner,
        &NewTransaction {
            account_id,
            amount,
            currency: currency.to_string(),
            description: description.to_string(),
            booked_at,
            category: category.map(String::from),
        },
    )?;

    println!(
        "✅ Booked {} on {} ({})",
        format_signed(amount),
        booked_at,
        category.unwrap_or("uncategorized")
    );
    Ok(id)
}

pub fn cmd_tx_list(
    db: &Database,
    owner: &OwnerId,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let range = match (from, to) {
        (None, None) => None,
        (from, to) => {
            let start = match from {
                Some(s) => parse_date(s)?,
                None => NaiveDate::from_ymd_opt(1, 1, 1).context("Invalid start date")?,
            };
            let end = match to {
                Some(s) => parse_date(s)?,
                None => NaiveDate::from_ymd_opt(9999, 12, 31).context("Invalid end date")?,
            };
            Some((start, end))
        }
    };

    let transactions = db.list_transactions(owner, range)?;

    if transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!("  cashcast tx add --account Operating --amount -250 --date 2026-01-05");
        return Ok(());
    }

    println!();
    println!("📝 Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        println!(
            "   [{}] {} │ {:>12} {} │ {:<16} │ {}",
            tx.id,
            tx.booked_at,
            format_signed(tx.amount),
            tx.currency,
            truncate(tx.category_name().unwrap_or("-"), 16),
            truncate(&tx.description, 35)
        );
    }

    Ok(())
}

pub fn cmd_tx_categorize(
    db: &Database,
    owner: &OwnerId,
    id: i64,
    category: Option<&str>,
) -> Result<()> {
    db.set_transaction_category(owner, id, category)?;

    match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(category) => println!("✅ Transaction {} categorized as '{}'", id, category),
        None => println!("✅ Transaction {} is now uncategorized", id),
    }
    Ok(())
}
