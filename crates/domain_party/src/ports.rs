//! Party Directory Port
//!
//! The ledger consumes the party directory through this trait. The
//! PostgreSQL adapter lives in `infra_db`; an in-memory directory for tests
//! and local runs sits behind the `mock` feature.
//!
//! ```rust,ignore
//! pub struct LoanAccountingEngine {
//!     parties: Arc<dyn PartyDirectory>,
//!     // ...
//! }
//!
//! let party = engine.parties.get_party(party_id).await?;
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PartyId, PortError};

use crate::party::Party;

/// Read access to the party directory
#[async_trait]
pub trait PartyDirectory: DomainPort + HealthCheckable {
    /// Returns true if a party with this id exists
    async fn party_exists(&self, id: PartyId) -> Result<bool, PortError>;

    /// Retrieves a party by ID
    ///
    /// # Returns
    ///
    /// The party if found, or `PortError::NotFound`
    async fn get_party(&self, id: PartyId) -> Result<Party, PortError>;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::RwLock;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use chrono::Utc;

    /// In-memory implementation of PartyDirectory
    #[derive(Debug, Default)]
    pub struct InMemoryPartyDirectory {
        parties: RwLock<HashMap<PartyId, Party>>,
        unavailable: AtomicBool,
    }

    impl InMemoryPartyDirectory {
        /// Creates an empty directory
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with parties for testing
        pub async fn with_parties(parties: Vec<Party>) -> Self {
            let directory = Self::new();
            for party in parties {
                directory.insert(party).await;
            }
            directory
        }

        /// Adds or replaces a party
        pub async fn insert(&self, party: Party) {
            self.parties.write().await.insert(party.id, party);
        }

        /// Renames a party in place
        pub async fn rename(&self, id: PartyId, name: impl Into<String>) -> Result<(), PortError> {
            let mut parties = self.parties.write().await;
            let party = parties
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Party", id))?;
            party.name = name.into();
            Ok(())
        }

        /// Simulates an outage: every lookup fails with `ServiceUnavailable`
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "party-directory".to_string(),
                });
            }
            Ok(())
        }
    }

    impl DomainPort for InMemoryPartyDirectory {}

    #[async_trait]
    impl HealthCheckable for InMemoryPartyDirectory {
        async fn health_check(&self) -> HealthCheckResult {
            let status = if self.unavailable.load(Ordering::SeqCst) {
                AdapterHealth::Unhealthy
            } else {
                AdapterHealth::Healthy
            };
            HealthCheckResult {
                adapter_id: "in-memory-party-directory".to_string(),
                status,
                latency_ms: 0,
                message: None,
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl PartyDirectory for InMemoryPartyDirectory {
        async fn party_exists(&self, id: PartyId) -> Result<bool, PortError> {
            self.check_available()?;
            Ok(self.parties.read().await.contains_key(&id))
        }

        async fn get_party(&self, id: PartyId) -> Result<Party, PortError> {
            self.check_available()?;
            self.parties
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Party", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::InMemoryPartyDirectory;
    use super::*;
    use crate::party::PartyType;

    #[tokio::test]
    async fn test_directory_lookup() {
        let party = Party::new("Gupta & Sons", PartyType::Customer).unwrap();
        let id = party.id;
        let directory = InMemoryPartyDirectory::with_parties(vec![party]).await;

        assert!(directory.party_exists(id).await.unwrap());
        assert_eq!(directory.get_party(id).await.unwrap().name, "Gupta & Sons");
        assert!(!directory.party_exists(PartyId::new()).await.unwrap());
        assert!(directory.get_party(PartyId::new()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_unavailable_directory() {
        let directory = InMemoryPartyDirectory::new();
        directory.set_unavailable(true);
        let err = directory.party_exists(PartyId::new()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_rename_is_visible_on_next_lookup() {
        let party = Party::new("Old Name", PartyType::Customer).unwrap();
        let id = party.id;
        let directory = InMemoryPartyDirectory::with_parties(vec![party]).await;

        directory.rename(id, "New Name").await.unwrap();
        assert_eq!(directory.get_party(id).await.unwrap().name, "New Name");
        assert!(directory.rename(PartyId::new(), "Nobody").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_health_reflects_outage() {
        use core_kernel::AdapterHealth;

        let directory = InMemoryPartyDirectory::new();
        assert_eq!(directory.health_check().await.status, AdapterHealth::Healthy);
        directory.set_unavailable(true);
        assert_eq!(directory.health_check().await.status, AdapterHealth::Unhealthy);
    }
}
