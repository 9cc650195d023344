//! Pre-built Test Fixtures
//!
//! Consistent, predictable values for unit and integration tests. Dates are
//! pinned so interest accrual is deterministic.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fake::faker::company::en::CompanyName;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{FixedClock, Money, Rate, UserId};
use domain_party::{Party, PartyType};

/// Fixture for money and rate values
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The principal used by the worked examples
    pub fn principal() -> Money {
        Money::new(dec!(100000.00))
    }

    /// Twelve percent per annum, one percent per month
    pub fn rate_12() -> Rate {
        Rate::from_percentage(dec!(12)).expect("fixture rate is valid")
    }

    pub fn zero_rate() -> Rate {
        Rate::ZERO
    }

    /// One month of interest on `principal` at `rate_12`
    pub fn one_month_interest() -> Decimal {
        dec!(1000.00)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The instant every test clock starts at (2024-06-15 00:00 UTC)
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
    }

    pub fn today() -> NaiveDate {
        Self::now().date_naive()
    }

    /// Exactly one calendar month before `now`
    pub fn month_ago() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    /// A due date already in the past at `now`
    pub fn past_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    pub fn future_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
    }

    pub fn clock() -> FixedClock {
        FixedClock::new(Self::now())
    }
}

/// Fixture for parties and audit users
pub struct PartyFixtures;

impl PartyFixtures {
    pub fn customer() -> Party {
        Party::new("Sharma Traders", PartyType::Customer).expect("fixture party is valid")
    }

    pub fn supplier() -> Party {
        Party::new("Cooperative Bank", PartyType::Supplier).expect("fixture party is valid")
    }

    /// A party with a generated company name
    pub fn random() -> Party {
        let name: String = CompanyName().fake();
        Party::new(name, PartyType::Both).expect("generated party is valid")
    }

    pub fn user() -> UserId {
        UserId::new(1).expect("fixture user is valid")
    }

    pub fn other_user() -> UserId {
        UserId::new(42).expect("fixture user is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Clock;

    #[test]
    fn test_month_ago_is_one_calendar_month() {
        let months = core_kernel::elapsed_months(
            TemporalFixtures::clock().start_of_day(TemporalFixtures::month_ago()),
            TemporalFixtures::now(),
        );
        assert_eq!(months, dec!(1));
    }

    #[test]
    fn test_random_party_has_name() {
        assert!(!PartyFixtures::random().name.is_empty());
    }
}
