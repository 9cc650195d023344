//! Unit tests for the identifiers module

use core_kernel::{FinancialTransactionId, LoanAccountId, PartyId, UserId};
use uuid::Uuid;

mod typed_ids {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(LoanAccountId::new(), LoanAccountId::new());
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = FinancialTransactionId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = FinancialTransactionId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(LoanAccountId::prefix(), "LOAN");
        assert_eq!(FinancialTransactionId::prefix(), "FTX");
        assert_eq!(PartyId::prefix(), "PTY");
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        let uuid = Uuid::new_v4();
        let bare: PartyId = uuid.to_string().parse().unwrap();
        let prefixed: PartyId = format!("PTY-{}", uuid).parse().unwrap();
        assert_eq!(bare, prefixed);
        assert_eq!(*bare.as_uuid(), uuid);
    }

    #[test]
    fn test_invalid_uuid_rejected() {
        assert!("LOAN-not-a-uuid".parse::<LoanAccountId>().is_err());
    }

    #[test]
    fn test_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = LoanAccountId::from_uuid(uuid);
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{}\"", uuid));
    }
}

mod user_ids {
    use super::*;

    #[test]
    fn test_positive_accepted() {
        let id = UserId::try_from(7).unwrap();
        assert_eq!(id.value(), 7);
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        assert!(UserId::try_from(0).is_err());
        assert!(UserId::try_from(-1).is_err());
        assert!(" -3 ".parse::<UserId>().is_err());
    }
}
