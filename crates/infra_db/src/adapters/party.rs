//! PostgreSQL Party Directory
//!
//! Implements `PartyDirectory` over the `parties` table through
//! `PartyRepository`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PgPartyDirectory;
//! use domain_party::PartyDirectory;
//! use std::sync::Arc;
//!
//! let directory: Arc<dyn PartyDirectory> = Arc::new(PgPartyDirectory::new(pool));
//! let party = directory.get_party(party_id).await?;
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Instant;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PartyId, PortError};
use domain_party::{Party, PartyDirectory, PartyType};

use crate::repositories::party::{PartyRepository, PartyRow, PartyType as DbPartyType};

const ADAPTER_ID: &str = "postgres-party-directory";

/// PostgreSQL-backed party directory
#[derive(Debug, Clone)]
pub struct PgPartyDirectory {
    repository: PartyRepository,
}

impl PgPartyDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PartyRepository::new(pool),
        }
    }

    /// Stores a party, replacing the details of an existing one
    ///
    /// Used to seed the directory; the ledger itself never writes parties.
    #[instrument(skip(self, party), fields(party_id = %party.id))]
    pub async fn register(&self, party: &Party) -> Result<(), PortError> {
        self.repository.upsert(&party_to_row(party)).await?;
        debug!("Party registered");
        Ok(())
    }
}

impl DomainPort for PgPartyDirectory {}

#[async_trait]
impl HealthCheckable for PgPartyDirectory {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = self.repository.ping().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, e.to_string()),
        }
    }
}

#[async_trait]
impl PartyDirectory for PgPartyDirectory {
    #[instrument(skip(self), fields(party_id = %id))]
    async fn party_exists(&self, id: PartyId) -> Result<bool, PortError> {
        Ok(self.repository.exists(*id.as_uuid()).await?)
    }

    #[instrument(skip(self), fields(party_id = %id))]
    async fn get_party(&self, id: PartyId) -> Result<Party, PortError> {
        let row = self.repository.get_by_id(*id.as_uuid()).await?;
        Ok(row_to_party(row))
    }
}

fn party_to_row(party: &Party) -> PartyRow {
    PartyRow {
        party_id: *party.id.as_uuid(),
        name: party.name.clone(),
        party_type: match party.party_type {
            PartyType::Customer => DbPartyType::Customer,
            PartyType::Supplier => DbPartyType::Supplier,
            PartyType::Both => DbPartyType::Both,
        },
        phone: party.phone.clone(),
        is_active: party.is_active,
        created_at: party.created_at,
    }
}

fn row_to_party(row: PartyRow) -> Party {
    Party {
        id: PartyId::from_uuid(row.party_id),
        name: row.name,
        party_type: match row.party_type {
            DbPartyType::Customer => PartyType::Customer,
            DbPartyType::Supplier => PartyType::Supplier,
            DbPartyType::Both => PartyType::Both,
        },
        phone: row.phone,
        is_active: row.is_active,
        created_at: row.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_row_round_trip() {
        let party = Party::new("Gupta Steel", PartyType::Supplier)
            .unwrap()
            .with_phone("+91 98100 00000");
        assert_eq!(row_to_party(party_to_row(&party)), party);
    }
}
