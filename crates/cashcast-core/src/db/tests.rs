//! Database tests

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};

use super::*;
use crate::forecast::{
    build_budget, BudgetCell, CategoryGrowthRate, Flow, Horizon, TrendDirection, TrendInfo,
    TrendMethod, YearMonth,
};
use crate::models::*;
use crate::store::{BudgetStore, PlannedItemSource, TransactionLedger};

fn owner(s: &str) -> OwnerId {
    OwnerId::parse(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_tx(account_id: i64, amount: f64, booked_at: NaiveDate, category: Option<&str>) -> NewTransaction {
    NewTransaction {
        account_id,
        amount,
        currency: "USD".into(),
        description: "test".into(),
        booked_at,
        category: category.map(String::from),
    }
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.list_accounts(&owner("a@example.com")).unwrap().is_empty());
}

#[test]
fn test_schema_has_budget_table() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();
    let columns: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('budgets') WHERE name IN ('owner_id', 'horizon', 'payload', 'generated_at', 'updated_at')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(columns, 5);
}

#[test]
fn test_account_upsert_is_per_owner() {
    let db = Database::in_memory().unwrap();
    let alice = owner("alice@example.com");
    let bob = owner("bob@example.com");

    let id = db.upsert_account(&alice, "Checking").unwrap();
    assert!(id > 0);
    assert_eq!(db.upsert_account(&alice, "Checking").unwrap(), id);

    let bob_id = db.upsert_account(&bob, "Checking").unwrap();
    assert_ne!(bob_id, id);

    let accounts = db.list_accounts(&alice).unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Checking");
    assert_eq!(accounts[0].owner_id, alice);

    assert!(db.get_account(&bob, id).unwrap().is_none());
    assert!(db.upsert_account(&alice, "  ").is_err());
}

#[test]
fn test_transactions_range_and_order() {
    let db = Database::in_memory().unwrap();
    let alice = owner("alice@example.com");
    let account = db.upsert_account(&alice, "Checking").unwrap();

    db.insert_transaction(&alice, &new_tx(account, -20.0, date(2026, 3, 5), Some("Food")))
        .unwrap();
    db.insert_transaction(&alice, &new_tx(account, 1000.0, date(2026, 1, 31), Some("Salary")))
        .unwrap();
    db.insert_transaction(&alice, &new_tx(account, -5.0, date(2026, 2, 1), None))
        .unwrap();

    let all = db.transactions(&alice, None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].booked_at, date(2026, 1, 31));
    assert_eq!(all[2].category.as_deref(), Some("Food"));

    let feb_on = db
        .transactions(&alice, Some((date(2026, 2, 1), date(2026, 3, 5))))
        .unwrap();
    assert_eq!(feb_on.len(), 2);
    assert_eq!(feb_on[0].category, None);
}

#[test]
fn test_transactions_are_owner_scoped() {
    let db = Database::in_memory().unwrap();
    let alice = owner("alice@example.com");
    let bob = owner("bob@example.com");
    let account = db.upsert_account(&alice, "Checking").unwrap();
    db.insert_transaction(&alice, &new_tx(account, 50.0, date(2026, 1, 1), None))
        .unwrap();

    assert!(db.transactions(&bob, None).unwrap().is_empty());
    assert_eq!(db.current_balance(&bob, "USD").unwrap(), 0.0);

    // Bob cannot book into Alice's account
    let err = db
        .insert_transaction(&bob, &new_tx(account, 1.0, date(2026, 1, 1), None))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_balance_filters_currency() {
    let db = Database::in_memory().unwrap();
    let alice = owner("alice@example.com");
    let account = db.upsert_account(&alice, "Checking").unwrap();

    db.insert_transaction(&alice, &new_tx(account, 100.0, date(2025, 6, 1), None))
        .unwrap();
    db.insert_transaction(&alice, &new_tx(account, -30.0, date(2026, 1, 1), None))
        .unwrap();
    let mut eur = new_tx(account, 999.0, date(2026, 1, 1), None);
    eur.currency = "eur".into();
    db.insert_transaction(&alice, &eur).unwrap();

    assert_eq!(db.current_balance(&alice, "USD").unwrap(), 70.0);
    assert_eq!(db.current_balance(&alice, "EUR").unwrap(), 999.0);
}

#[test]
fn test_rejects_non_finite_amount() {
    let db = Database::in_memory().unwrap();
    let alice = owner("alice@example.com");
    let account = db.upsert_account(&alice, "Checking").unwrap();
    let err = db
        .insert_transaction(&alice, &new_tx(account, f64::INFINITY, date(2026, 1, 1), None))
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_set_transaction_category() {
    let db = Database::in_memory().unwrap();
    let alice = owner("alice@example.com");
    let account = db.upsert_account(&alice, "Checking").unwrap();
    let id = db
        .insert_transaction(&alice, &new_tx(account, -12.0, date(2026, 2, 2), None))
        .unwrap();

    db.set_transaction_category(&alice, id, Some("Transport")).unwrap();
    assert_eq!(
        db.transactions(&alice, None).unwrap()[0].category.as_deref(),
        Some("Transport")
    );

    db.set_transaction_category(&alice, id, Some("  ")).unwrap();
    assert_eq!(db.transactions(&alice, None).unwrap()[0].category, None);

    let err = db
        .set_transaction_category(&owner("bob@example.com"), id, Some("X"))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_planned_item_crud() {
    let db = Database::in_memory().unwrap();
    let alice = owner("alice@example.com");

    let id = db
        .insert_planned_item(
            &alice,
            &NewPlannedItem {
                name: "Annual insurance".into(),
                kind: PlannedItemKind::Expense,
                amount: 1200.0,
                expected_date: date(2026, 6, 15),
                recurrence: Recurrence::OneOff,
            },
        )
        .unwrap();
    db.insert_planned_item(
        &alice,
        &NewPlannedItem {
            name: "Retainer".into(),
            kind: PlannedItemKind::Income,
            amount: 500.0,
            expected_date: date(2026, 4, 1),
            recurrence: Recurrence::Monthly,
        },
    )
    .unwrap();

    let items = db.planned_items(&alice).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Retainer");
    assert_eq!(items[0].recurrence, Recurrence::Monthly);
    assert_eq!(items[1].kind, PlannedItemKind::Expense);

    assert!(db.planned_items(&owner("bob@example.com")).unwrap().is_empty());
    assert!(matches!(
        db.delete_planned_item(&owner("bob@example.com"), id),
        Err(Error::NotFound(_))
    ));

    db.delete_planned_item(&alice, id).unwrap();
    assert_eq!(db.planned_items(&alice).unwrap().len(), 1);
}

#[test]
fn test_planned_item_rejects_negative_amount() {
    let db = Database::in_memory().unwrap();
    let err = db
        .insert_planned_item(
            &owner("alice@example.com"),
            &NewPlannedItem {
                name: "Refund".into(),
                kind: PlannedItemKind::Income,
                amount: -10.0,
                expected_date: date(2026, 4, 1),
                recurrence: Recurrence::OneOff,
            },
        )
        .unwrap_err();
    assert!(err.is_validation());
}

fn sample_budget() -> crate::forecast::Budget {
    let mut rates = BTreeMap::new();
    rates.insert(
        "Sales".to_string(),
        CategoryGrowthRate {
            income_rate_pct: 2.5,
            expense_rate_pct: 0.0,
            last_value: Flow::new(1000.1, 0.0),
            baseline_value: Flow::new(1000.1, 0.0),
            trend: TrendInfo {
                direction: TrendDirection::Up,
                strength_pct: 87.33,
                volatility_pct: 4.1,
                window_months: 6,
                method: TrendMethod::LinearRegression,
            },
        },
    );
    let current = YearMonth::new(2026, 1).unwrap();
    let mut budget = build_budget(
        Horizon::SixMonths,
        current,
        rates,
        vec![YearMonth::new(2025, 12).unwrap(), current],
        &[],
        Utc.with_ymd_and_hms(2026, 1, 20, 9, 30, 0).unwrap(),
    );
    let march = YearMonth::new(2026, 3).unwrap();
    budget
        .budget
        .get_mut(&march)
        .unwrap()
        .insert("Sales".into(), BudgetCell::manual(Flow::new(1234.57, 0.0)));
    budget
}

#[test]
fn test_budget_round_trip() {
    let db = Database::in_memory().unwrap();
    let alice = owner("alice@example.com");
    assert!(db.get_budget(&alice).unwrap().is_none());

    let budget = sample_budget();
    db.put_budget(&alice, &budget).unwrap();

    let loaded = db.get_budget(&alice).unwrap().unwrap();
    assert_eq!(loaded, budget);
    assert!(db.get_budget(&owner("bob@example.com")).unwrap().is_none());
}

#[test]
fn test_budget_put_replaces() {
    let db = Database::in_memory().unwrap();
    let alice = owner("alice@example.com");

    let first = sample_budget();
    db.put_budget(&alice, &first).unwrap();

    let mut second = first.clone();
    second.category_growth_rates.clear();
    db.put_budget(&alice, &second).unwrap();

    assert_eq!(db.get_budget(&alice).unwrap().unwrap(), second);
    let rows: i64 = db
        .conn()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM budgets", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn test_budget_delete() {
    let db = Database::in_memory().unwrap();
    let alice = owner("alice@example.com");
    db.put_budget(&alice, &sample_budget()).unwrap();

    assert!(db.delete_budget(&alice).unwrap());
    assert!(!db.delete_budget(&alice).unwrap());
    assert!(db.get_budget(&alice).unwrap().is_none());
}

#[test]
fn test_encrypted_database_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enc.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::new_with_key(path, Some("correct horse")).unwrap();
        db.upsert_account(&owner("alice@example.com"), "Checking").unwrap();
    }

    let db = Database::new_with_key(path, Some("correct horse")).unwrap();
    assert_eq!(db.list_accounts(&owner("alice@example.com")).unwrap().len(), 1);

    assert!(Database::new_with_key(path, Some("wrong")).is_err());
}
