//! Party repository implementation
//!
//! Backs the party directory with the `parties` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for the `parties` table
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: PgPool,
}

impl PartyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a party by identifier
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no party has this id
    pub async fn get_by_id(&self, party_id: Uuid) -> Result<PartyRow, DatabaseError> {
        sqlx::query_as::<_, PartyRow>(
            r#"
            SELECT party_id, name, party_type, phone, is_active, created_at
            FROM parties
            WHERE party_id = $1
            "#,
        )
        .bind(party_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Party", party_id))
    }

    pub async fn exists(&self, party_id: Uuid) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM parties WHERE party_id = $1)")
            .bind(party_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Inserts a party, or refreshes its details if the id already exists
    pub async fn upsert(&self, row: &PartyRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO parties (party_id, name, party_type, phone, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (party_id) DO UPDATE SET
                name = EXCLUDED.name,
                party_type = EXCLUDED.party_type,
                phone = EXCLUDED.phone,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(row.party_id)
        .bind(&row.name)
        .bind(row.party_type)
        .bind(&row.phone)
        .bind(row.is_active)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Round-trips a trivial query to check connectivity
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "party_type", rename_all = "snake_case")]
pub enum PartyType {
    Customer,
    Supplier,
    Both,
}

/// Database row for a party
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PartyRow {
    pub party_id: Uuid,
    pub name: String,
    pub party_type: PartyType,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
