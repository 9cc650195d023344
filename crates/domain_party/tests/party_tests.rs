//! Integration tests for domain_party

use domain_party::{Party, PartyType};

mod party_tests {
    use super::*;

    #[test]
    fn test_with_phone() {
        let party = Party::new("Om Plastics", PartyType::Supplier)
            .unwrap()
            .with_phone("+91 98200 00000");
        assert_eq!(party.phone.as_deref(), Some("+91 98200 00000"));
    }

    #[test]
    fn test_overlong_name_rejected() {
        let name = "x".repeat(201);
        assert!(Party::new(name, PartyType::Customer).is_err());
    }

    #[test]
    fn test_deactivate() {
        let mut party = Party::new("Kaveri Agro", PartyType::Both).unwrap();
        party.deactivate();
        assert!(!party.is_active);
    }

    #[test]
    fn test_party_serde() {
        let party = Party::new("Kaveri Agro", PartyType::Both).unwrap();
        let json = serde_json::to_string(&party).unwrap();
        let back: Party = serde_json::from_str(&json).unwrap();
        assert_eq!(back, party);
    }
}
