use billshare_core::{
    BillKey, BillMatch, BillPeriod, DuplicateReason, DuplicateWarning, OccupantCount,
    TransactionRecord,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::patterns::{ConfigError, PatternTable};

/// Bills recorded by earlier runs, consulted so a month is never billed twice.
pub trait BillHistory {
    fn already_processed(&self, key: &BillKey) -> bool;
}

/// History for a first run, or when persistence is not wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl BillHistory for NoHistory {
    fn already_processed(&self, _key: &BillKey) -> bool {
        false
    }
}

impl BillHistory for [BillMatch] {
    fn already_processed(&self, key: &BillKey) -> bool {
        self.iter().any(|bill| {
            bill.merchant_name() == key.merchant_name && bill.period() == key.period
        })
    }
}

impl BillHistory for HashSet<BillKey> {
    fn already_processed(&self, key: &BillKey) -> bool {
        self.contains(key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitOutcome {
    /// One per (merchant, month), ordered by transaction date.
    pub matches: Vec<BillMatch>,
    /// Bill-shaped transactions held back for manual review.
    pub duplicates: Vec<DuplicateWarning>,
}

pub fn match_and_split_bills(
    records: &[TransactionRecord],
    patterns: &PatternTable,
    occupant_count: i64,
) -> Result<SplitOutcome, ConfigError> {
    match_and_split_bills_with_history(records, patterns, occupant_count, &NoHistory)
}

/// Recognize bill transactions, split each evenly, and flag repeats.
///
/// Configuration is checked before any record is looked at, so an invalid
/// occupant count or an empty table yields no partial output.
pub fn match_and_split_bills_with_history<H: BillHistory + ?Sized>(
    records: &[TransactionRecord],
    patterns: &PatternTable,
    occupant_count: i64,
    history: &H,
) -> Result<SplitOutcome, ConfigError> {
    let occupants =
        OccupantCount::new(occupant_count).ok_or(ConfigError::InvalidOccupantCount(occupant_count))?;
    if patterns.is_empty() {
        return Err(ConfigError::EmptyPatternTable);
    }

    let mut candidates: Vec<(&TransactionRecord, &str)> = records
        .iter()
        .filter_map(|record| {
            patterns
                .find_match(record)
                .map(|p| (record, p.merchant.as_str()))
        })
        .collect();
    // Stable, so same-day transactions keep statement order.
    candidates.sort_by_key(|(record, _)| record.date);

    let mut outcome = SplitOutcome::default();
    let mut kept: HashMap<BillKey, NaiveDate> = HashMap::new();

    for (record, merchant) in candidates {
        let key = BillKey {
            merchant_name: merchant.to_string(),
            period: BillPeriod::from_date(record.date),
        };

        let reason = if history.already_processed(&key) {
            Some(DuplicateReason::AlreadyProcessed)
        } else {
            kept.get(&key)
                .map(|&kept_date| DuplicateReason::SameBatch { kept_date })
        };

        if let Some(reason) = reason {
            let warning = DuplicateWarning {
                key,
                record: record.clone(),
                reason,
            };
            tracing::warn!("Holding back for review: {warning}");
            outcome.duplicates.push(warning);
            continue;
        }

        let bill = BillMatch::derive(record, merchant, occupants);
        tracing::debug!(
            merchant = bill.merchant_name(),
            period = %bill.period(),
            total = %bill.total_amount(),
            split = %bill.split_amount(),
            "Matched bill"
        );
        kept.insert(key, record.date);
        outcome.matches.push(bill);
    }

    tracing::info!(
        records = records.len(),
        matched = outcome.matches.len(),
        duplicates = outcome.duplicates.len(),
        occupants = occupants.get(),
        "Split bills"
    );
    Ok(outcome)
}
