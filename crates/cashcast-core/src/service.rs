//! Forecast service: the engine wired to its stores
//!
//! `ForecastService` exposes the externally visible operations (generate,
//! save, load, delete, rolling forecast, variance, edits) for one store
//! backend. The engine in [`crate::forecast`] stays pure; this layer owns the
//! clock, the lookback window, and currency filtering.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::config::ForecastConfig;
use crate::error::Result;
use crate::forecast::{
    aggregate, apply_edits, build_budget, estimate_runway, estimate_trends, merge_timeline,
    analyze_variance, Budget, BudgetEdit, BudgetSource, EditContext, EntryType, Horizon,
    MonthlyHistory, RollingForecast, RollingForecastSummary, VarianceReport, YearMonth,
};
use crate::forecast::types::round_cents;
use crate::models::{OwnerId, Transaction};
use crate::store::{BudgetStore, PlannedItemSource, TransactionLedger};

pub struct ForecastService<'a, S> {
    store: &'a S,
    config: &'a ForecastConfig,
    today: NaiveDate,
}

impl<'a, S> ForecastService<'a, S>
where
    S: TransactionLedger + PlannedItemSource + BudgetStore,
{
    pub fn new(store: &'a S, config: &'a ForecastConfig) -> Self {
        Self {
            store,
            config,
            today: Utc::now().date_naive(),
        }
    }

    /// Pin the clock (tests, backfills)
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn current_month(&self) -> YearMonth {
        YearMonth::of(self.today)
    }

    /// First day of the oldest lookback month through today
    pub fn lookback_window(&self) -> (NaiveDate, NaiveDate) {
        let months_back = self.config.lookback_months.saturating_sub(1) as i32;
        let start = self.current_month().plus_months(-months_back);
        (start.first_day(), self.today)
    }

    /// Project a fresh budget from the owner's recent history (not persisted)
    pub fn generate(&self, owner: &OwnerId, horizon: Horizon) -> Result<Budget> {
        let window = self.lookback_window();
        let history = self.history(owner, window)?;
        let rates = estimate_trends(&history, &self.config.trend);
        let planned = self.store.planned_items(owner)?;

        let budget = build_budget(
            horizon,
            self.current_month(),
            rates,
            history.months(),
            &planned,
            Utc::now(),
        );

        info!(
            owner = %owner,
            horizon = %horizon,
            months = budget.forecast_months.len(),
            categories = budget.category_growth_rates.len(),
            planned_items = planned.len(),
            "Generated budget"
        );
        Ok(budget)
    }

    /// Validate and store a budget, replacing any existing one
    pub fn save(&self, owner: &OwnerId, budget: &Budget) -> Result<()> {
        budget.validate()?;
        self.store.put_budget(owner, budget)?;
        info!(owner = %owner, horizon = %budget.horizon, "Saved budget");
        Ok(())
    }

    pub fn load(&self, owner: &OwnerId) -> Result<Option<Budget>> {
        self.store.get_budget(owner)
    }

    /// Remove the owner's budget; returns whether one existed
    pub fn delete(&self, owner: &OwnerId) -> Result<bool> {
        let existed = self.store.delete_budget(owner)?;
        info!(owner = %owner, existed, "Deleted budget");
        Ok(existed)
    }

    /// Actual months plus forecast months with a ledger-anchored balance
    ///
    /// A saved budget is used when its horizon matches; otherwise a budget
    /// is generated on the fly and not stored.
    pub fn rolling_forecast(&self, owner: &OwnerId, horizon: Horizon) -> Result<RollingForecast> {
        let (budget, budget_source) = match self.store.get_budget(owner)? {
            Some(saved) if saved.horizon == horizon => (saved, BudgetSource::Saved),
            _ => (self.generate(owner, horizon)?, BudgetSource::Generated),
        };

        let current_month = self.current_month();
        let (mut from, to) = self.lookback_window();
        if let Some(first) = budget.forecast_months.first() {
            from = from.min(first.first_day());
        }
        let history = self.history(owner, (from, to))?;
        let current_balance = self.current_balance(owner)?;

        let entries = merge_timeline(&budget, &history, current_balance, current_month);
        let runway = estimate_runway(&entries, current_balance);

        let forecast = entries
            .iter()
            .filter(|e| e.entry_type == EntryType::Forecast);
        let (income, expenses) = forecast.fold((0.0, 0.0), |(i, x), e| (i + e.income, x + e.expenses));
        let ending_balance = entries.last().map_or(current_balance, |e| e.balance);

        debug!(
            owner = %owner,
            entries = entries.len(),
            runway = ?runway.runway,
            source = ?budget_source,
            "Built rolling forecast"
        );

        Ok(RollingForecast {
            summary: RollingForecastSummary {
                current_balance,
                runway,
                forecast_income: round_cents(income),
                forecast_expenses: round_cents(expenses),
                forecast_net: round_cents(income - expenses),
                ending_balance,
                budget_source,
            },
            entries,
        })
    }

    /// Saved plan versus actuals for the months that have elapsed
    pub fn variance(&self, owner: &OwnerId) -> Result<VarianceReport> {
        let Some(budget) = self.store.get_budget(owner)? else {
            return Ok(VarianceReport {
                has_budget: false,
                records: Vec::new(),
            });
        };

        let current_month = self.current_month();
        let elapsed = budget
            .forecast_months
            .first()
            .filter(|first| **first <= current_month)
            .copied();

        let records = match elapsed {
            Some(first) => {
                let history = self.history(owner, (first.first_day(), self.today))?;
                analyze_variance(&budget, &history, current_month)
            }
            None => Vec::new(),
        };

        debug!(owner = %owner, records = records.len(), "Computed variance");
        Ok(VarianceReport {
            has_budget: true,
            records,
        })
    }

    /// Apply edits in order to a copy of `budget`
    pub fn apply_edits(
        &self,
        owner: &OwnerId,
        budget: &Budget,
        edits: &[BudgetEdit],
    ) -> Result<Budget> {
        let planned = self.store.planned_items(owner)?;
        let ctx = EditContext {
            current_month: self.current_month(),
            planned_items: &planned,
            flat_threshold_pct: self.config.trend.flat_threshold_pct,
        };
        let edited = apply_edits(budget, edits, &ctx)?;
        debug!(owner = %owner, edits = edits.len(), "Applied budget edits");
        Ok(edited)
    }

    /// Ledger balance in the reporting currency
    pub fn current_balance(&self, owner: &OwnerId) -> Result<f64> {
        let balance = self
            .store
            .current_balance(owner, &self.config.reporting_currency)?;
        Ok(round_cents(balance))
    }

    fn history(&self, owner: &OwnerId, window: (NaiveDate, NaiveDate)) -> Result<MonthlyHistory> {
        let transactions = self.store.transactions(owner, Some(window))?;
        let total = transactions.len();
        let in_currency: Vec<Transaction> = transactions
            .into_iter()
            .filter(|tx| {
                tx.currency
                    .eq_ignore_ascii_case(&self.config.reporting_currency)
            })
            .collect();

        if in_currency.len() < total {
            debug!(
                owner = %owner,
                skipped = total - in_currency.len(),
                currency = %self.config.reporting_currency,
                "Skipped transactions outside the reporting currency"
            );
        }

        Ok(aggregate(&in_currency, Some(window)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::Error;
    use crate::forecast::{BudgetCell, Flow, RunwaySeverity, TrendMethod};
    use crate::models::{
        NewPlannedItem, NewTransaction, PlannedItem, PlannedItemKind, Recurrence,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn owner() -> OwnerId {
        OwnerId::parse("owner@example.com").unwrap()
    }

    fn book(db: &Database, account: i64, amount: f64, on: NaiveDate, category: Option<&str>) {
        db.insert_transaction(
            &owner(),
            &NewTransaction {
                account_id: account,
                amount,
                currency: "USD".into(),
                description: "test".into(),
                booked_at: on,
                category: category.map(String::from),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_lookback_window() {
        let db = Database::in_memory().unwrap();
        let config = ForecastConfig::default();
        let service = ForecastService::new(&db, &config).with_today(date(2026, 3, 14));
        assert_eq!(
            service.lookback_window(),
            (date(2025, 4, 1), date(2026, 3, 14))
        );
    }

    #[test]
    fn test_generate_with_no_history_is_empty_not_an_error() {
        let db = Database::in_memory().unwrap();
        let config = ForecastConfig::default();
        let service = ForecastService::new(&db, &config).with_today(date(2026, 3, 14));

        let budget = service.generate(&owner(), Horizon::SixMonths).unwrap();
        assert_eq!(budget.forecast_months.len(), 6);
        assert!(budget.category_growth_rates.is_empty());
        assert!(budget.budget.values().all(|cells| cells.is_empty()));

        let rolling = service.rolling_forecast(&owner(), Horizon::SixMonths).unwrap();
        assert_eq!(rolling.summary.runway.runway, None);
        assert_eq!(rolling.summary.budget_source, BudgetSource::Generated);

        let variance = service.variance(&owner()).unwrap();
        assert!(!variance.has_budget);
        assert!(variance.records.is_empty());
    }

    #[test]
    fn test_generate_ignores_other_currencies_and_old_history() {
        let db = Database::in_memory().unwrap();
        let account = db.upsert_account(&owner(), "Checking").unwrap();
        book(&db, account, -100.0, date(2026, 2, 10), Some("Rent"));
        book(&db, account, -5000.0, date(2024, 2, 10), Some("Ancient"));
        db.insert_transaction(
            &owner(),
            &NewTransaction {
                account_id: account,
                amount: -80.0,
                currency: "EUR".into(),
                description: "abroad".into(),
                booked_at: date(2026, 2, 11),
                category: Some("Travel".into()),
            },
        )
        .unwrap();

        let config = ForecastConfig::default();
        let service = ForecastService::new(&db, &config).with_today(date(2026, 3, 1));
        let budget = service.generate(&owner(), Horizon::SixMonths).unwrap();

        let categories: Vec<&String> = budget.category_growth_rates.keys().collect();
        assert_eq!(categories, vec!["Rent"]);
        assert_eq!(budget.historical_months, vec![ym("2026-02")]);
        // Balance still counts every USD transaction, whatever its age
        assert_eq!(service.current_balance(&owner()).unwrap(), -5100.0);
    }

    #[test]
    fn test_generate_folds_planned_items() {
        let db = Database::in_memory().unwrap();
        db.insert_planned_item(
            &owner(),
            &NewPlannedItem {
                name: "Software".into(),
                kind: PlannedItemKind::Expense,
                amount: 200.0,
                expected_date: date(2026, 5, 1),
                recurrence: Recurrence::Monthly,
            },
        )
        .unwrap();

        let config = ForecastConfig::default();
        let service = ForecastService::new(&db, &config).with_today(date(2026, 3, 20));
        let budget = service.generate(&owner(), Horizon::SixMonths).unwrap();

        assert_eq!(
            budget.budget[&ym("2026-04")]["Planned Items"].flow(),
            Flow::ZERO
        );
        for month in ["2026-05", "2026-06", "2026-09"] {
            assert_eq!(
                budget.budget[&ym(month)]["Planned Items"].flow().expenses,
                200.0
            );
        }
    }

    #[test]
    fn test_save_rejects_invalid_budget() {
        let db = Database::in_memory().unwrap();
        let config = ForecastConfig::default();
        let service = ForecastService::new(&db, &config).with_today(date(2026, 3, 20));

        let mut budget = service.generate(&owner(), Horizon::SixMonths).unwrap();
        budget.forecast_months.pop();
        let err = service.save(&owner(), &budget).unwrap_err();
        assert!(err.is_validation());
        assert!(service.load(&owner()).unwrap().is_none());
    }

    #[test]
    fn test_rolling_prefers_saved_budget_with_matching_horizon() {
        let db = Database::in_memory().unwrap();
        let config = ForecastConfig::default();
        let service = ForecastService::new(&db, &config).with_today(date(2026, 3, 20));

        let budget = service.generate(&owner(), Horizon::SixMonths).unwrap();
        let edited = service
            .apply_edits(
                &owner(),
                &budget,
                &[BudgetEdit::SetCell {
                    month: ym("2026-04"),
                    category: "Consulting".into(),
                    income: 900.0,
                    expenses: 0.0,
                }],
            )
            .unwrap();
        service.save(&owner(), &edited).unwrap();

        let saved = service.rolling_forecast(&owner(), Horizon::SixMonths).unwrap();
        assert_eq!(saved.summary.budget_source, BudgetSource::Saved);
        assert_eq!(saved.summary.forecast_income, 900.0);
        assert_eq!(saved.summary.ending_balance, 900.0);

        let other = service.rolling_forecast(&owner(), Horizon::YearEnd).unwrap();
        assert_eq!(other.summary.budget_source, BudgetSource::Generated);
        assert_eq!(other.summary.forecast_income, 0.0);
    }

    #[test]
    fn test_variance_after_months_elapse() {
        let db = Database::in_memory().unwrap();
        let account = db.upsert_account(&owner(), "Checking").unwrap();
        let config = ForecastConfig::default();

        // Plan made in December
        let december = ForecastService::new(&db, &config).with_today(date(2025, 12, 15));
        let budget = december.generate(&owner(), Horizon::SixMonths).unwrap();
        let budget = december
            .apply_edits(
                &owner(),
                &budget,
                &[BudgetEdit::SetCell {
                    month: ym("2026-01"),
                    category: "Sales".into(),
                    income: 2000.0,
                    expenses: 0.0,
                }],
            )
            .unwrap();
        december.save(&owner(), &budget).unwrap();
        assert!(december.variance(&owner()).unwrap().records.is_empty());

        book(&db, account, 2500.0, date(2026, 1, 12), Some("Sales"));

        let february = ForecastService::new(&db, &config).with_today(date(2026, 2, 3));
        let report = february.variance(&owner()).unwrap();
        assert!(report.has_budget);
        assert_eq!(report.records.len(), 2);
        let january = &report.records[0];
        assert_eq!(january.month, ym("2026-01"));
        assert_eq!(january.by_category["Sales"].variance.income, 500.0);
        assert_eq!(january.by_category["Sales"].variance_percent.income, 25.0);
    }

    #[test]
    fn test_apply_edits_sets_manual_rate() {
        let db = Database::in_memory().unwrap();
        let account = db.upsert_account(&owner(), "Checking").unwrap();
        for month in 1..=3 {
            book(&db, account, -300.0, date(2026, month, 5), Some("Payroll"));
        }
        let config = ForecastConfig::default();
        let service = ForecastService::new(&db, &config).with_today(date(2026, 3, 20));
        let budget = service.generate(&owner(), Horizon::SixMonths).unwrap();

        let edited = service
            .apply_edits(
                &owner(),
                &budget,
                &[BudgetEdit::SetGrowthRate {
                    category: "Payroll".into(),
                    income_rate_pct: None,
                    expense_rate_pct: Some(10.0),
                }],
            )
            .unwrap();

        let rate = edited.category_growth_rates["Payroll"];
        assert_eq!(rate.trend.method, TrendMethod::Manual);
        assert_eq!(
            edited.budget[&ym("2026-04")]["Payroll"],
            BudgetCell::computed(Flow::new(0.0, 330.0))
        );
        // Input is untouched
        assert_eq!(budget.category_growth_rates["Payroll"].expense_rate_pct, 0.0);
    }

    #[test]
    fn test_runway_in_summary() {
        let db = Database::in_memory().unwrap();
        let account = db.upsert_account(&owner(), "Checking").unwrap();
        book(&db, account, 1500.0, date(2025, 10, 1), None);
        for month in [(2025, 12), (2026, 1), (2026, 2)] {
            book(&db, account, -500.0, date(month.0, month.1, 3), Some("Rent"));
        }
        book(&db, account, 1500.0, date(2026, 2, 4), None);

        let config = ForecastConfig::default();
        let service = ForecastService::new(&db, &config).with_today(date(2026, 2, 20));
        let rolling = service.rolling_forecast(&owner(), Horizon::SixMonths).unwrap();

        assert_eq!(rolling.summary.current_balance, 1500.0);
        assert_eq!(rolling.summary.runway.runway, Some(3));
        assert_eq!(rolling.summary.runway.negative_month, Some(ym("2026-05")));
        assert_eq!(rolling.summary.runway.severity, RunwaySeverity::MediumRisk);
    }

    /// A store whose writes always fail
    struct ReadOnlyStore;

    impl TransactionLedger for ReadOnlyStore {
        fn transactions(
            &self,
            _owner: &OwnerId,
            _range: Option<(NaiveDate, NaiveDate)>,
        ) -> Result<Vec<Transaction>> {
            Ok(Vec::new())
        }

        fn current_balance(&self, _owner: &OwnerId, _currency: &str) -> Result<f64> {
            Ok(0.0)
        }
    }

    impl PlannedItemSource for ReadOnlyStore {
        fn planned_items(&self, _owner: &OwnerId) -> Result<Vec<PlannedItem>> {
            Ok(Vec::new())
        }
    }

    impl BudgetStore for ReadOnlyStore {
        fn get_budget(&self, _owner: &OwnerId) -> Result<Option<Budget>> {
            Ok(None)
        }

        fn put_budget(&self, _owner: &OwnerId, _budget: &Budget) -> Result<()> {
            Err(Error::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_READONLY),
                None,
            )))
        }

        fn delete_budget(&self, _owner: &OwnerId) -> Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_persistence_failure_is_distinct_from_validation() {
        let config = ForecastConfig::default();
        let service = ForecastService::new(&ReadOnlyStore, &config).with_today(date(2026, 3, 20));
        let budget = service.generate(&owner(), Horizon::SixMonths).unwrap();

        let err = service.save(&owner(), &budget).unwrap_err();
        assert!(err.is_persistence());
        assert!(!err.is_validation());
    }
}
