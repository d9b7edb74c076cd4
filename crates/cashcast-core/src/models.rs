//! Domain models for Cashcast

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum accepted length of an owner identifier (an email address at most)
pub const MAX_OWNER_LEN: usize = 254;

/// Identity of the user every read and write is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Validate and normalize an owner identifier supplied by the caller
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation(
                "Missing owner context: an owner id is required".to_string(),
            ));
        }
        if trimmed.len() > MAX_OWNER_LEN {
            return Err(Error::Validation(format!(
                "Owner id is too long ({} characters, max {})",
                trimmed.len(),
                MAX_OWNER_LEN
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(Error::Validation(
                "Owner id must not contain control characters".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for OwnerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A ledger account belonging to one owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub owner_id: OwnerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A booked cash movement
///
/// Amount and booking date never change once booked; corrections are new
/// transactions. Only the category is mutated after import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    /// Signed amount: positive is money in, negative is money out
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub booked_at: NaiveDate,
    pub category: Option<String>,
    pub owner_id: OwnerId,
}

impl Transaction {
    /// Category with blank values treated as uncategorized
    pub fn category_name(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// A transaction to be booked into the ledger
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: i64,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub booked_at: NaiveDate,
    pub category: Option<String>,
}

/// Direction of a planned cash movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlannedItemKind {
    Income,
    Expense,
}

impl PlannedItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for PlannedItemKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" | "expenses" => Ok(Self::Expense),
            _ => Err(format!("Unknown planned item kind: {} (use income or expense)", s)),
        }
    }
}

impl std::fmt::Display for PlannedItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How often a planned item repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Recurrence {
    /// Lands once, in the month of its expected date
    #[default]
    OneOff,
    /// Lands every month from the expected date onward
    Monthly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneOff => "one_off",
            Self::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for Recurrence {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "one_off" | "one-off" | "oneoff" | "once" => Ok(Self::OneOff),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("Unknown recurrence: {} (use one-off or monthly)", s)),
        }
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A manually entered expected income or expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedItem {
    pub id: i64,
    pub owner_id: OwnerId,
    pub name: String,
    pub kind: PlannedItemKind,
    /// Positive magnitude
    pub amount: f64,
    pub expected_date: NaiveDate,
    pub recurrence: Recurrence,
}

/// A planned item to be stored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlannedItem {
    pub name: String,
    pub kind: PlannedItemKind,
    pub amount: f64,
    pub expected_date: NaiveDate,
    #[serde(default)]
    pub recurrence: Recurrence,
}

impl NewPlannedItem {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("Planned item name is required".to_string()));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::Validation(format!(
                "Planned item amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_id_trims_and_rejects_blank() {
        assert_eq!(OwnerId::parse("  a@b.co ").unwrap().as_str(), "a@b.co");
        assert!(OwnerId::parse("   ").unwrap_err().is_validation());
        assert!(OwnerId::parse("a\u{0}b").is_err());
        assert!(OwnerId::parse(&"x".repeat(MAX_OWNER_LEN + 1)).is_err());
    }

    #[test]
    fn test_blank_category_is_uncategorized() {
        let tx = Transaction {
            id: 1,
            account_id: 1,
            amount: -5.0,
            currency: "USD".into(),
            description: "coffee".into(),
            booked_at: NaiveDate::from_ymd_opt(2026, 1, 3).unwrap(),
            category: Some("  ".into()),
            owner_id: OwnerId::parse("owner").unwrap(),
        };
        assert_eq!(tx.category_name(), None);
    }

    #[test]
    fn test_planned_item_validation() {
        let mut item = NewPlannedItem {
            name: "Insurance".into(),
            kind: PlannedItemKind::Expense,
            amount: 120.0,
            expected_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            recurrence: Recurrence::OneOff,
        };
        assert!(item.validate().is_ok());

        item.amount = -1.0;
        assert!(item.validate().is_err());

        item.amount = f64::NAN;
        assert!(item.validate().is_err());

        item.amount = 10.0;
        item.name = " ".into();
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_recurrence_parsing() {
        assert_eq!("monthly".parse::<Recurrence>().unwrap(), Recurrence::Monthly);
        assert_eq!("one-off".parse::<Recurrence>().unwrap(), Recurrence::OneOff);
        assert!("weekly".parse::<Recurrence>().is_err());
    }
}
