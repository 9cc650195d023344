//! Party entity
//!
//! A party is a customer, a supplier, or both. The ledger only ever reads
//! parties; creating and editing them belongs to the directory that owns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use core_kernel::PartyId;
use crate::error::PartyError;

/// The trading role of a party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartyType {
    /// Buys from the business
    Customer,
    /// Sells to the business
    Supplier,
    /// Trades in both directions
    Both,
}

impl PartyType {
    /// Stable code used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyType::Customer => "Customer",
            PartyType::Supplier => "Supplier",
            PartyType::Both => "Both",
        }
    }
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartyType {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" => Ok(PartyType::Customer),
            "Supplier" => Ok(PartyType::Supplier),
            "Both" => Ok(PartyType::Both),
            other => Err(PartyError::UnknownPartyType(other.to_string())),
        }
    }
}

/// A counter-party as seen by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Party {
    pub id: PartyId,
    /// Display name, snapshotted onto every ledger posting
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub party_type: PartyType,
    /// Contact phone number, free-form
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Party {
    /// Creates an active party with a fresh id
    ///
    /// # Errors
    ///
    /// Returns `PartyError::InvalidData` if the trimmed name is empty or too long
    pub fn new(name: impl Into<String>, party_type: PartyType) -> Result<Self, PartyError> {
        let party = Self {
            id: PartyId::new_v7(),
            name: name.into().trim().to_string(),
            party_type,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
        };
        party
            .validate()
            .map_err(|e| PartyError::invalid(e.to_string()))?;
        Ok(party)
    }

    /// Sets the contact phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Marks the party inactive
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_party_trims_name() {
        let party = Party::new("  Mehta Steels ", PartyType::Customer).unwrap();
        assert_eq!(party.name, "Mehta Steels");
        assert!(party.is_active);
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(Party::new("   ", PartyType::Both).is_err());
    }

    #[test]
    fn test_party_type_codes() {
        for t in [PartyType::Customer, PartyType::Supplier, PartyType::Both] {
            assert_eq!(t.as_str().parse::<PartyType>().unwrap(), t);
        }
        assert!("Vendor".parse::<PartyType>().is_err());
    }
}
