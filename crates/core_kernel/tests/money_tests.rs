//! Unit tests for the Money and Rate types
//!
//! Tests cover construction, rounding, arithmetic and rate conversion.

use core_kernel::{Money, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_keeps_two_places() {
        let m = Money::new(dec!(100.50));
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_new_rounds_half_away_from_zero() {
        assert_eq!(Money::new(dec!(2.345)).amount(), dec!(2.35));
        assert_eq!(Money::new(dec!(-2.345)).amount(), dec!(-2.35));
        assert_eq!(Money::new(dec!(2.3449)).amount(), dec!(2.34));
    }

    #[test]
    fn test_zero_constructors_agree() {
        assert_eq!(Money::zero(), Money::ZERO);
        assert_eq!(Money::new(Decimal::ZERO), Money::ZERO);
        assert!(Money::ZERO.is_zero());
    }

    #[test]
    fn test_positive_rejects_sub_cent_amounts() {
        let result = Money::positive(dec!(0.001));
        assert!(matches!(result, Err(MoneyError::InvalidAmount(_))));
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_add_and_sub() {
        let a = Money::new(dec!(1000));
        let b = Money::new(dec!(10));
        assert_eq!((a + b).amount(), dec!(1010));
        assert_eq!((a - b).amount(), dec!(990));
    }

    #[test]
    fn test_assign_ops() {
        let mut total = Money::new(dec!(5));
        total += Money::new(dec!(2.50));
        total -= Money::new(dec!(1.25));
        assert_eq!(total.amount(), dec!(6.25));
    }

    #[test]
    fn test_multiply_rounds_product() {
        let principal = Money::new(dec!(1000));
        let interest = principal.multiply(dec!(0.01)).unwrap();
        assert_eq!(interest.amount(), dec!(10.00));

        let odd = Money::new(dec!(333.33)).multiply(dec!(0.015)).unwrap();
        assert_eq!(odd.amount(), dec!(5.00));
    }

    #[test]
    fn test_checked_sub_goes_negative() {
        let a = Money::new(dec!(5));
        let diff = a.checked_sub(&Money::new(dec!(7.25))).unwrap();
        assert!(diff.is_negative());
        assert_eq!(diff.abs().amount(), dec!(2.25));
    }

    #[test]
    fn test_min_and_saturating_sub() {
        let a = Money::new(dec!(40));
        let b = Money::new(dec!(75));
        assert_eq!(a.min(b), a);
        assert_eq!(a.saturating_sub(b), Money::ZERO);
    }

    #[test]
    fn test_sum_of_references() {
        let parts = vec![Money::new(dec!(1.10)), Money::new(dec!(2.20)), Money::new(dec!(3.30))];
        let total: Money = parts.iter().sum();
        assert_eq!(total.amount(), dec!(6.60));
    }

    #[test]
    fn test_approx_eq() {
        let a = Money::new(dec!(10.00));
        let b = Money::new(dec!(10.01));
        assert!(a.approx_eq(&b, dec!(0.01)));
        assert!(!a.approx_eq(&b, dec!(0.005)));
    }
}

mod rate {
    use super::*;

    #[test]
    fn test_zero_rate_is_allowed() {
        let rate = Rate::from_percentage(Decimal::ZERO).unwrap();
        assert!(rate.is_zero());
        assert_eq!(rate, Rate::ZERO);
    }

    #[test]
    fn test_rate_rounds_to_two_places() {
        let rate = Rate::from_percentage(dec!(12.345)).unwrap();
        assert_eq!(rate.as_percentage(), dec!(12.35));
    }

    #[test]
    fn test_rate_fraction() {
        let rate = Rate::from_percentage(dec!(18)).unwrap();
        assert_eq!(rate.as_fraction(), dec!(0.18));
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(Rate::from_percentage(dec!(-1)).is_err());
    }
}

mod serde_format {
    use super::*;

    #[test]
    fn test_money_serializes_as_decimal() {
        let json = serde_json::to_string(&Money::new(dec!(12.5))).unwrap();
        assert_eq!(json, "\"12.50\"");
    }

    #[test]
    fn test_rate_roundtrips() {
        let rate = Rate::from_percentage(dec!(9.75)).unwrap();
        let json = serde_json::to_string(&rate).unwrap();
        let back: Rate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rate);
    }
}
