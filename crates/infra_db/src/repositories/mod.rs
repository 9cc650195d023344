//! Repository implementations
//!
//! Each repository owns the SQL for one table and maps rows to plain row
//! structs. Translation to domain types happens in `adapters`.
//!
//! All queries are built at runtime with bound parameters, so the crate
//! builds without a live database.

pub mod ledger;
pub mod loans;
pub mod party;

pub use ledger::{LedgerEntryRow, LedgerFilter, LedgerRepository};
pub use loans::{LoanAccountRow, LoanFilter, LoanRepository};
pub use party::{PartyRepository, PartyRow};
