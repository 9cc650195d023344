//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::temporal::TemporalError;
use core_kernel::PortError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_from_money_error() {
    let core_error: CoreError = MoneyError::InvalidRate("-1".to_string()).into();
    assert!(matches!(core_error, CoreError::Money(_)));
}

#[test]
fn test_core_error_from_temporal_error() {
    let core_error: CoreError = TemporalError::UnknownTimezone("X".to_string()).into();
    assert!(core_error.to_string().contains("Unknown timezone"));
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing config");
    assert_eq!(error.to_string(), "Configuration error: Missing config");
}

#[test]
fn test_port_error_helpers() {
    assert!(PortError::not_found("Party", "PTY-1").is_not_found());
    assert!(PortError::connection("refused").is_transient());
    assert!(!PortError::internal("boom").is_transient());
    assert!(PortError::conflict("stale").is_conflict());
}
