//! Property-Based Test Generators
//!
//! Proptest strategies for ledger inputs that respect domain constraints.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_lending::{LoanType, PaymentMode};

/// Loan principals as request decimals, 1.00 to 10,000,000.00
pub fn principal_decimal_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..1_000_000_000i64).prop_map(|minor| Decimal::new(minor, 2))
}

/// Annual rates from 0% to 36% in basis-point steps
pub fn rate_decimal_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=3600i64).prop_map(|bp| Decimal::new(bp, 2))
}

pub fn loan_type_strategy() -> impl Strategy<Value = LoanType> {
    prop_oneof![Just(LoanType::Given), Just(LoanType::Taken)]
}

pub fn payment_mode_strategy() -> impl Strategy<Value = PaymentMode> {
    prop_oneof![
        Just(PaymentMode::Cash),
        Just(PaymentMode::Bank),
        Just(PaymentMode::Cheque),
    ]
}

/// Start dates within 2020 to 2024
pub fn start_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..(5 * 365)).prop_map(|days| {
        NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid base date") + Duration::days(days)
    })
}

/// One step of activity on an open loan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerStep {
    /// Pay this percentage (1 to 100) of the current total
    PayShare(u32),
    /// Advance the clock by this many days, then accrue interest
    AccrueAfterDays(i64),
}

pub fn ledger_step_strategy() -> impl Strategy<Value = LedgerStep> {
    prop_oneof![
        (1u32..=100u32).prop_map(LedgerStep::PayShare),
        (0i64..=120i64).prop_map(LedgerStep::AccrueAfterDays),
    ]
}

pub fn ledger_steps_strategy(max_len: usize) -> impl Strategy<Value = Vec<LedgerStep>> {
    proptest::collection::vec(ledger_step_strategy(), 1..max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Rate;

    proptest! {
        #[test]
        fn rates_parse_as_rates(rate in rate_decimal_strategy()) {
            prop_assert!(Rate::from_percentage(rate).is_ok());
        }

        #[test]
        fn principals_are_positive_two_place(principal in principal_decimal_strategy()) {
            prop_assert!(principal > Decimal::ZERO);
            prop_assert_eq!(principal.round_dp(2), principal);
        }

        #[test]
        fn steps_are_in_range(steps in ledger_steps_strategy(10)) {
            prop_assert!(!steps.is_empty());
            for step in steps {
                match step {
                    LedgerStep::PayShare(pct) => prop_assert!((1..=100).contains(&pct)),
                    LedgerStep::AccrueAfterDays(days) => prop_assert!((0..=120).contains(&days)),
                }
            }
        }
    }
}
