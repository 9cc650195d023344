//! Test Utilities Crate
//!
//! Shared test infrastructure for the ledger workspace.
//!
//! # Modules
//!
//! - `fixtures`: Fixed dates, amounts and parties
//! - `builders`: Request builders and an in-memory engine harness
//! - `database`: Postgres test container management
//! - `assertions`: Ledger invariant and money assertions
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
