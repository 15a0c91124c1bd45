use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The calendar month a bill belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillPeriod {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for BillPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl BillPeriod {
    pub fn from_date(date: NaiveDate) -> Self {
        BillPeriod {
            year: date.year(),
            month: date.month(),
        }
    }
}

/// Inclusive range of days of the month in which a recurring bill is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub first: u32,
    pub last: u32,
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "days {}-{}", self.first, self.last)
    }
}

impl DayWindow {
    pub fn is_valid(self) -> bool {
        (1..=31).contains(&self.first) && (1..=31).contains(&self.last) && self.first <= self.last
    }

    /// A window ending on day 31 also covers the last day of shorter months.
    pub fn contains(self, date: NaiveDate) -> bool {
        let day = date.day();
        day >= self.first && day <= self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bill_period_from_date() {
        let p = BillPeriod::from_date(date(2025, 3, 25));
        assert_eq!(p, BillPeriod { year: 2025, month: 3 });
    }

    #[test]
    fn bill_period_display_is_zero_padded() {
        assert_eq!(BillPeriod::from_date(date(2025, 1, 9)).to_string(), "2025-01");
    }

    #[test]
    fn bill_period_orders_by_year_then_month() {
        let dec = BillPeriod::from_date(date(2024, 12, 1));
        let jan = BillPeriod::from_date(date(2025, 1, 1));
        assert!(dec < jan);
    }

    #[test]
    fn day_window_validation() {
        assert!(DayWindow { first: 1, last: 5 }.is_valid());
        assert!(!DayWindow { first: 0, last: 5 }.is_valid());
        assert!(!DayWindow { first: 10, last: 5 }.is_valid());
        assert!(!DayWindow { first: 1, last: 32 }.is_valid());
    }

    #[test]
    fn day_window_contains_is_inclusive() {
        let w = DayWindow { first: 1, last: 5 };
        assert!(w.contains(date(2025, 4, 1)));
        assert!(w.contains(date(2025, 4, 5)));
        assert!(!w.contains(date(2025, 4, 6)));
    }

    #[test]
    fn day_window_to_31_covers_short_months() {
        let w = DayWindow { first: 25, last: 31 };
        assert!(w.contains(date(2025, 2, 28)));
    }
}
