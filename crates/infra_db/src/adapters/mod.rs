//! Domain Adapters
//!
//! Port implementations over PostgreSQL. Each adapter implements a domain
//! port trait, translates between domain types and repository rows, and
//! maps `DatabaseError` onto `PortError`.

pub mod lending;
pub mod party;

pub use lending::PgLendingStore;
pub use party::PgPartyDirectory;
