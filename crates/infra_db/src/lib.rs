//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the loan ledger, built on SQLx.
//!
//! # Architecture
//!
//! - `repositories` own the SQL, one per table, and work on plain rows.
//! - `adapters` implement the domain ports (`LendingStore`,
//!   `PartyDirectory`) on top of the repositories.
//! - `pool` creates the connection pool and applies the migrations in
//!   `migrations/`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PgLendingStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/factory_ledger")).await?;
//! run_migrations(&pool).await?;
//! let store = PgLendingStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PgLendingStore, PgPartyDirectory};
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
