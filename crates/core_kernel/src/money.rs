//! Money and rate types with precise decimal arithmetic
//!
//! Ledger amounts are fixed-point decimals with two fractional digits.
//! Every constructor and arithmetic result is rounded back to that scale,
//! so values read from storage and values computed in memory compare equal.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use thiserror::Error;

/// Number of fractional digits persisted for money fields
pub const MONEY_SCALE: u32 = 2;

/// Number of fractional digits persisted for interest rates (in percent)
pub const RATE_SCALE: u32 = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount in the ledger's single operating currency
///
/// Stored as a `Decimal` rounded half away from zero to two places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates a new Money value, rounding to two decimal places
    pub fn new(amount: Decimal) -> Self {
        let mut value = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(MONEY_SCALE);
        Self(value)
    }

    /// Creates Money from an integer amount in minor units (paise, cents)
    pub fn from_minor(minor_units: i64) -> Self {
        Self(Decimal::new(minor_units, MONEY_SCALE))
    }

    /// Creates a strictly positive amount
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidAmount` if the rounded amount is zero or negative
    pub fn positive(amount: Decimal) -> Result<Self, MoneyError> {
        let money = Self::new(amount);
        if !money.is_positive() {
            return Err(MoneyError::InvalidAmount(format!(
                "amount must be greater than zero, got {}",
                amount
            )));
        }
        Ok(money)
    }

    /// Creates a zero amount
    pub fn zero() -> Self {
        Self::ZERO
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if the amount is strictly negative
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Returns the smaller of two amounts
    pub fn min(self, other: Money) -> Money {
        if self <= other { self } else { other }
    }

    /// Subtracts, flooring the result at zero
    pub fn saturating_sub(self, other: Money) -> Money {
        if other >= self {
            Money::ZERO
        } else {
            self - other
        }
    }

    /// Checked addition
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Multiplies by a scalar, rounding the product to two places
    pub fn multiply(&self, factor: Decimal) -> Result<Money, MoneyError> {
        self.0
            .checked_mul(factor)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Returns true if the two amounts differ by no more than `tolerance`
    pub fn approx_eq(&self, other: &Money, tolerance: Decimal) -> bool {
        (self.0 - other.0).abs() <= tolerance
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Decimal {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

/// An annual interest rate expressed in percent (12.00 means 12% p.a.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    /// Zero percent
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// Creates a rate from a percentage, rounded to two places
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidRate` for negative percentages
    pub fn from_percentage(percentage: Decimal) -> Result<Self, MoneyError> {
        let mut value = percentage.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(RATE_SCALE);
        if value < Decimal::ZERO {
            return Err(MoneyError::InvalidRate(format!(
                "interest rate cannot be negative, got {}",
                percentage
            )));
        }
        Ok(Self(value))
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a fraction (0.12 for 12%)
    pub fn as_fraction(&self) -> Decimal {
        self.0 / dec!(100)
    }

    /// Returns true for a zero rate
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_rounds_to_two_places() {
        assert_eq!(Money::new(dec!(100.125)).amount(), dec!(100.13));
        assert_eq!(Money::new(dec!(100.124)).amount(), dec!(100.12));
        assert_eq!(Money::new(dec!(-0.005)).amount(), dec!(-0.01));
    }

    #[test]
    fn test_money_from_minor() {
        assert_eq!(Money::from_minor(10050).amount(), dec!(100.50));
    }

    #[test]
    fn test_positive_rejects_zero_and_negative() {
        assert!(Money::positive(dec!(0)).is_err());
        assert!(Money::positive(dec!(-1)).is_err());
        assert!(Money::positive(dec!(0.004)).is_err());
        assert_eq!(Money::positive(dec!(0.01)).unwrap().amount(), dec!(0.01));
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Money::new(dec!(10));
        let b = Money::new(dec!(25));
        assert_eq!(a.saturating_sub(b), Money::ZERO);
        assert_eq!(b.saturating_sub(a).amount(), dec!(15));
    }

    #[test]
    fn test_rate_rejects_negative() {
        assert!(matches!(
            Rate::from_percentage(dec!(-0.5)),
            Err(MoneyError::InvalidRate(_))
        ));
        assert_eq!(Rate::from_percentage(dec!(12)).unwrap().as_fraction(), dec!(0.12));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::new(dec!(1000)).to_string(), "1000.00");
        assert_eq!(Rate::from_percentage(dec!(12.5)).unwrap().to_string(), "12.50%");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn money_sum_matches_decimal_sum(
            parts in proptest::collection::vec(-1_000_000_000i64..1_000_000_000i64, 1..50)
        ) {
            let total: Money = parts.iter().map(|p| Money::from_minor(*p)).sum();
            let expected: i64 = parts.iter().sum();
            prop_assert_eq!(total, Money::from_minor(expected));
        }

        #[test]
        fn money_new_is_idempotent(minor in -1_000_000_000i64..1_000_000_000i64, extra in 0u32..1000u32) {
            let raw = Decimal::new(minor, 2) + Decimal::new(extra as i64, 6);
            let once = Money::new(raw);
            prop_assert_eq!(Money::new(once.amount()), once);
        }
    }
}
