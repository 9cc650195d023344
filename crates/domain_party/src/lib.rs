//! Party Directory Domain
//!
//! Customers and suppliers are maintained outside the ledger. This crate
//! describes the slice of a party the ledger needs (identity, display name,
//! role) and the `PartyDirectory` port through which the lending engine
//! checks that a counter-party exists and snapshots its name onto postings.
//!
//! # Examples
//!
//! ```rust
//! use domain_party::party::{Party, PartyType};
//!
//! let party = Party::new("Shree Traders", PartyType::Supplier).unwrap();
//! assert!(party.is_active);
//! ```

pub mod party;
pub mod error;
pub mod ports;

pub use party::{Party, PartyType};
pub use error::PartyError;
pub use ports::PartyDirectory;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::InMemoryPartyDirectory;
