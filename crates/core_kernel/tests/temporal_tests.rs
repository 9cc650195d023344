//! Unit tests for the temporal module
//!
//! Tests cover clocks, business timezone handling, month arithmetic
//! and date ranges.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use core_kernel::temporal::{elapsed_months, DateRange, TemporalError};
use core_kernel::{Clock, FixedClock, SystemClock, Timezone};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod months {
    use super::*;

    #[test]
    fn test_twelve_months_is_one_year() {
        let from = Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(elapsed_months(from, to), dec!(12));
    }

    #[test]
    fn test_month_end_clamps() {
        // Jan 31 + 1 month lands on Feb 29 in a leap year
        let from = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        assert_eq!(elapsed_months(from, to), dec!(1));
    }

    #[test]
    fn test_partial_month_uses_length_of_that_month() {
        // February 2023 has 28 days; 7 days is a quarter of it
        let from = Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2023, 2, 8, 0, 0, 0).unwrap();
        assert_eq!(elapsed_months(from, to), dec!(0.25));
    }

    #[test]
    fn test_whole_plus_fraction() {
        let from = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 6, 16, 0, 0, 0).unwrap();
        assert_eq!(elapsed_months(from, to), dec!(2.5));
    }

    #[test]
    fn test_non_positive_interval_is_zero() {
        let at = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        assert_eq!(elapsed_months(at, at - Duration::hours(1)), Decimal::ZERO);
    }
}

mod clocks {
    use super::*;

    #[test]
    fn test_fixed_clock_set() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let later = Utc.with_ymd_and_hms(2024, 7, 4, 9, 30, 0).unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
    }

    #[test]
    fn test_today_follows_business_timezone() {
        // 20:00 UTC on Jan 1 is already Jan 2 in Kolkata (UTC+05:30)
        let tz: Timezone = "Asia/Kolkata".parse().unwrap();
        let clock = FixedClock::with_timezone(Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap(), tz);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_start_of_day_in_timezone() {
        let tz: Timezone = "Asia/Kolkata".parse().unwrap();
        let start = tz.start_of_day(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_system_clock_reports_configured_timezone() {
        let tz: Timezone = "Europe/Berlin".parse().unwrap();
        let clock = SystemClock::new(tz);
        assert_eq!(clock.timezone(), tz);
        assert!(clock.now() <= Utc::now());
    }
}

mod timezone {
    use super::*;

    #[test]
    fn test_unknown_timezone() {
        let result = "Mars/Olympus".parse::<Timezone>();
        assert!(matches!(result, Err(TemporalError::UnknownTimezone(_))));
    }

    #[test]
    fn test_serde_uses_iana_name() {
        let tz: Timezone = "America/New_York".parse().unwrap();
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"America/New_York\"");
        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
    }
}

mod date_range {
    use super::*;

    #[test]
    fn test_reversed_range_rejected() {
        let result = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_single_day_range() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        let range = DateRange::new(day, day).unwrap();
        assert_eq!(range.days(), 1);
        assert!(range.contains(day));
        assert!(!range.contains(day.succ_opt().unwrap()));
    }
}
