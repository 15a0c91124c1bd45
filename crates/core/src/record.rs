use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One transaction row from a bank statement export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    /// Exactly as exported, embedded commas included.
    pub description: String,
    /// Negative = debit/expense, positive = credit.
    pub amount: Decimal,
    /// Informational only.
    pub running_balance: Decimal,
}

impl TransactionRecord {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        running_balance: Decimal,
    ) -> Self {
        TransactionRecord {
            date,
            description: description.into(),
            amount,
            running_balance,
        }
    }
}
