use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use super::bill::OccupantCount;

/// A currency amount held at two decimal places.
///
/// Every constructor rounds half-up (midpoint away from zero), so `0.005`
/// becomes `0.01` and `-0.005` becomes `-0.01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(round_half_up(decimal))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// One share of an even split across `parts` payers.
    ///
    /// The shares need not add back up to `self`; the difference is at most
    /// half a cent per part.
    pub fn split(self, parts: OccupantCount) -> Self {
        Money::from_decimal(self.0 / Decimal::from(parts.get()))
    }

    /// `None` on overflow, which only amounts near `Decimal::MAX` reach.
    pub fn checked_mul(self, rhs: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(rhs)).map(Money)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Money)
    }
}

fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_sign_negative() && !self.0.is_zero() {
            write!(f, "-${:.2}", self.0.abs())
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn occupants(n: u32) -> OccupantCount {
        OccupantCount::new(i64::from(n)).unwrap()
    }

    #[test]
    fn from_decimal_rounds_half_up() {
        assert_eq!(Money::from_decimal(dec("1.005")), Money::from_cents(101));
        assert_eq!(Money::from_decimal(dec("1.004")), Money::from_cents(100));
        assert_eq!(Money::from_decimal(dec("-1.005")), Money::from_cents(-101));
    }

    #[test]
    fn banker_rounding_is_not_used() {
        // Banker's rounding would give 0.02 here.
        assert_eq!(Money::from_decimal(dec("0.025")), Money::from_cents(3));
    }

    #[test]
    fn split_exact() {
        let total = Money::from_decimal(dec("322.29"));
        assert_eq!(total.split(occupants(3)), Money::from_cents(10743));
    }

    #[test]
    fn split_rounds_each_share() {
        let total = Money::from_cents(10000);
        assert_eq!(total.split(occupants(3)), Money::from_cents(3333));
        assert_eq!(Money::from_cents(200).split(occupants(3)), Money::from_cents(67));
    }

    #[test]
    fn split_by_one_is_identity() {
        let total = Money::from_cents(32229);
        assert_eq!(total.split(occupants(1)), total);
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let max = Money(Decimal::MAX);
        assert_eq!(max.checked_mul(1), Some(max));
        assert_eq!(max.checked_mul(2), None);
        assert_eq!(Money(Decimal::MIN).checked_sub(Money::from_cents(100)), None);
        assert_eq!(
            Money::from_cents(300).checked_sub(Money::from_cents(100)),
            Some(Money::from_cents(200))
        );
    }

    #[test]
    fn split_residual_is_bounded() {
        for parts in 1..=12u32 {
            for cents in [1i64, 7, 99, 100, 10001, 32229, 532473, 999_999] {
                let total = Money::from_cents(cents);
                let collected = total.split(occupants(parts)).checked_mul(parts).unwrap();
                let residual = (collected - total).abs();
                assert!(
                    residual <= Money::from_cents(i64::from(parts)),
                    "{total} / {parts} left {residual}"
                );
            }
        }
    }

    #[test]
    fn sum_and_arithmetic() {
        let parts = vec![Money::from_cents(150), Money::from_cents(250)];
        let total: Money = parts.into_iter().sum();
        assert_eq!(total, Money::from_cents(400));
        assert_eq!(total - Money::from_cents(100), Money::from_cents(300));
        assert_eq!(Money::from_cents(-250).abs(), Money::from_cents(250));
    }

    #[test]
    fn display() {
        assert_eq!(Money::from_cents(10743).to_string(), "$107.43");
        assert_eq!(Money::from_cents(-532473).to_string(), "-$5324.73");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }
}
