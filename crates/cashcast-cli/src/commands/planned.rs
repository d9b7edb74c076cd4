//! Planned item command implementations

use anyhow::{anyhow, Result};
use cashcast_core::db::Database;
use cashcast_core::models::{NewPlannedItem, OwnerId, PlannedItemKind, Recurrence};

use super::{parse_date, truncate};

pub fn cmd_planned_add(
    db: &Database,
    owner: &OwnerId,
    name: &str,
    kind: &str,
    amount: f64,
    date: &str,
    recurrence: &str,
) -> Result<i64> {
    let kind: PlannedItemKind = kind.parse().map_err(|e: String| anyhow!(e))?;
    let recurrence: Recurrence = recurrence.parse().map_err(|e: String| anyhow!(e))?;
    let expected_date = parse_date(date)?;

    let id = db.insert_planned_item(
        owner,
        &NewPlannedItem {
            name: name.to_string(),
            kind,
            amount,
            expected_date,
            recurrence,
        },
    )?;

    println!(
        "✅ Planned {} '{}' of ${:.2} from {} ({})",
        kind, name, amount, expected_date, recurrence
    );
    Ok(id)
}

pub fn cmd_planned_list(db: &Database, owner: &OwnerId) -> Result<()> {
    let items = db.list_planned_items(owner)?;

    if items.is_empty() {
        println!("No planned items. Add one with:");
        println!("  cashcast planned add \"Quarterly tax\" --kind expense --amount 2400 --date 2026-04-15");
        return Ok(());
    }

    println!();
    println!("🗓️  Planned Items");
    println!("   ─────────────────────────────────────────────────────────────");
    for item in items {
        let sign = match item.kind {
            PlannedItemKind::Income => "+",
            PlannedItemKind::Expense => "-",
        };
        println!(
            "   [{}] {} │ {}${:>10.2} │ {:<8} │ {}",
            item.id,
            item.expected_date,
            sign,
            item.amount,
            item.recurrence,
            truncate(&item.name, 35)
        );
    }

    Ok(())
}

pub fn cmd_planned_delete(db: &Database, owner: &OwnerId, id: i64) -> Result<()> {
    db.delete_planned_item(owner, id)?;
    println!("✅ Planned item {} deleted", id);
    Ok(())
}
