use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;
use super::period::BillPeriod;
use super::record::TransactionRecord;

/// Number of people a bill is divided among. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct OccupantCount(u32);

impl OccupantCount {
    pub fn new(count: i64) -> Option<Self> {
        u32::try_from(count)
            .ok()
            .filter(|&n| n > 0)
            .map(OccupantCount)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for OccupantCount {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        OccupantCount::new(value).ok_or_else(|| format!("occupant count must be positive, got {value}"))
    }
}

impl From<OccupantCount> for i64 {
    fn from(count: OccupantCount) -> Self {
        i64::from(count.0)
    }
}

impl fmt::Display for OccupantCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// De-duplication identity: at most one bill per merchant per month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BillKey {
    pub merchant_name: String,
    pub period: BillPeriod,
}

impl fmt::Display for BillKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.merchant_name, self.period)
    }
}

/// A transaction recognized as a recurring household bill, with its even split.
///
/// Derived from a [`TransactionRecord`] and never modified afterwards; fix a
/// bad match by re-deriving it from the source record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillMatch {
    merchant_name: String,
    bill_month: u32,
    bill_year: i32,
    total_amount: Money,
    split_amount: Money,
    occupant_count: OccupantCount,
    transaction_date: NaiveDate,
    description: String,
}

impl BillMatch {
    pub fn derive(
        record: &TransactionRecord,
        merchant_name: impl Into<String>,
        occupants: OccupantCount,
    ) -> Self {
        let period = BillPeriod::from_date(record.date);
        let total_amount = Money::from_decimal(record.amount.abs());
        BillMatch {
            merchant_name: merchant_name.into(),
            bill_month: period.month,
            bill_year: period.year,
            total_amount,
            split_amount: total_amount.split(occupants),
            occupant_count: occupants,
            transaction_date: record.date,
            description: record.description.clone(),
        }
    }

    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }

    pub fn bill_month(&self) -> u32 {
        self.bill_month
    }

    pub fn bill_year(&self) -> i32 {
        self.bill_year
    }

    pub fn period(&self) -> BillPeriod {
        BillPeriod {
            year: self.bill_year,
            month: self.bill_month,
        }
    }

    pub fn key(&self) -> BillKey {
        BillKey {
            merchant_name: self.merchant_name.clone(),
            period: self.period(),
        }
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn split_amount(&self) -> Money {
        self.split_amount
    }

    pub fn occupant_count(&self) -> OccupantCount {
        self.occupant_count
    }

    pub fn transaction_date(&self) -> NaiveDate {
        self.transaction_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// What the payer absorbs after everyone pays `split_amount`.
    /// Negative when rounding over-collects; `None` when the amount is too
    /// large for the collected total to be represented.
    pub fn residual(&self) -> Option<Money> {
        let collected = self.split_amount.checked_mul(self.occupant_count.get())?;
        self.total_amount.checked_sub(collected)
    }

    pub fn shares<S: AsRef<str>>(&self, occupants: &[S]) -> Vec<OccupantShare> {
        occupants
            .iter()
            .map(|name| OccupantShare {
                occupant: name.as_ref().to_string(),
                amount: self.split_amount,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantShare {
    pub occupant: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DuplicateReason {
    /// An earlier transaction in the same batch already produced the bill.
    SameBatch { kept_date: NaiveDate },
    /// Persisted history already holds a bill for this merchant and month.
    AlreadyProcessed,
}

impl fmt::Display for DuplicateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateReason::SameBatch { kept_date } => {
                write!(f, "already billed from the {kept_date} transaction")
            }
            DuplicateReason::AlreadyProcessed => write!(f, "already processed in an earlier run"),
        }
    }
}

/// A bill-shaped transaction that was not turned into a [`BillMatch`] and
/// needs a human to look at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateWarning {
    pub key: BillKey,
    pub record: TransactionRecord,
    #[serde(flatten)]
    pub reason: DuplicateReason,
}

impl fmt::Display for DuplicateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate {}: {} {} \"{}\" ({})",
            self.key, self.record.date, self.record.amount, self.record.description, self.reason
        )
    }
}
