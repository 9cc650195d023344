//! Interest accrual and payment allocation
//!
//! Interest is simple (non-compounding) and accrues on the current
//! outstanding principal:
//!
//! ```text
//! interest = principal × rate/100 × months/12
//! ```
//!
//! where `months` is the fractional calendar-month count from
//! `core_kernel::elapsed_months`. The result is rounded to two places.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, MoneyError, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Simple interest on `principal` for `months` at an annual `rate`
///
/// Returns zero for non-positive months, a zero rate or a zero principal.
///
/// # Errors
///
/// Returns `MoneyError::Overflow` if the product does not fit in a decimal
pub fn accrued_interest(principal: Money, rate: Rate, months: Decimal) -> Result<Money, MoneyError> {
    if months <= Decimal::ZERO || rate.is_zero() || !principal.is_positive() {
        return Ok(Money::ZERO);
    }

    let factor = rate
        .as_fraction()
        .checked_mul(months)
        .and_then(|f| f.checked_div(MONTHS_PER_YEAR))
        .ok_or(MoneyError::Overflow)?;
    principal.multiply(factor)
}

/// The instant interest starts accruing from
///
/// The later of the loan's start (midnight of the start date in business
/// time) and the most recent accrual posting.
pub fn accrual_anchor(loan_start: DateTime<Utc>, last_accrual: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match last_accrual {
        Some(last) if last > loan_start => last,
        _ => loan_start,
    }
}

/// How a repayment was split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub interest_portion: Money,
    pub principal_portion: Money,
}

/// Splits a payment: outstanding interest first, remainder to principal
///
/// Neither portion exceeds what is outstanding; callers reject amounts
/// above the total before allocating.
pub fn allocate_payment(amount: Money, outstanding_interest: Money, outstanding_principal: Money) -> PaymentAllocation {
    let interest_portion = amount.min(outstanding_interest).max(Money::ZERO);
    let remaining = amount.saturating_sub(interest_portion);
    let principal_portion = remaining.min(outstanding_principal).max(Money::ZERO);
    PaymentAllocation {
        interest_portion,
        principal_portion,
    }
}
