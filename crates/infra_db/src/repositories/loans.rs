//! Loan account repository
//!
//! Plain reads go through the pool. Writes take a connection so the
//! ledger adapter can run them inside its own transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

const LOAN_COLUMNS: &str = r#"
    loan_account_id,
    party_id,
    loan_type,
    original_amount,
    interest_rate,
    start_date,
    due_date,
    outstanding_principal,
    outstanding_interest,
    total_outstanding,
    status,
    created_by,
    notes,
    created_date,
    modified_date,
    version
"#;

/// Repository for the `loan_accounts` table
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a loan row by id
    pub async fn get_by_id(&self, loan_account_id: Uuid) -> Result<Option<LoanAccountRow>, DatabaseError> {
        let row = sqlx::query_as::<_, LoanAccountRow>(&format!(
            "SELECT {LOAN_COLUMNS} FROM loan_accounts WHERE loan_account_id = $1"
        ))
        .bind(loan_account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Finds loan rows matching the filter, newest first
    pub async fn find(&self, filter: &LoanFilter) -> Result<Vec<LoanAccountRow>, DatabaseError> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {LOAN_COLUMNS} FROM loan_accounts WHERE TRUE"));
        if let Some(party_id) = filter.party_id {
            query.push(" AND party_id = ").push_bind(party_id);
        }
        if let Some(loan_type) = filter.loan_type {
            query.push(" AND loan_type = ").push_bind(loan_type);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        query.push(" ORDER BY created_date DESC, loan_account_id DESC");

        let rows = query
            .build_query_as::<LoanAccountRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Inserts a new loan row
    pub async fn insert(conn: &mut PgConnection, row: &LoanAccountRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO loan_accounts (
                loan_account_id, party_id, loan_type, original_amount, interest_rate,
                start_date, due_date, outstanding_principal, outstanding_interest,
                total_outstanding, status, created_by, notes, created_date,
                modified_date, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(row.loan_account_id)
        .bind(row.party_id)
        .bind(row.loan_type)
        .bind(row.original_amount)
        .bind(row.interest_rate)
        .bind(row.start_date)
        .bind(row.due_date)
        .bind(row.outstanding_principal)
        .bind(row.outstanding_interest)
        .bind(row.total_outstanding)
        .bind(row.status)
        .bind(row.created_by)
        .bind(&row.notes)
        .bind(row.created_date)
        .bind(row.modified_date)
        .bind(row.version)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Writes the mutable columns of a loan if it is still at `expected_version`
    ///
    /// # Errors
    ///
    /// - `DatabaseError::NotFound` if the loan does not exist
    /// - `DatabaseError::Conflict` if the stored version differs
    pub async fn update_versioned(
        conn: &mut PgConnection,
        row: &LoanAccountRow,
        expected_version: i64,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE loan_accounts SET
                due_date = $3,
                outstanding_principal = $4,
                outstanding_interest = $5,
                total_outstanding = $6,
                status = $7,
                notes = $8,
                modified_date = $9,
                version = $10
            WHERE loan_account_id = $1 AND version = $2
            "#,
        )
        .bind(row.loan_account_id)
        .bind(expected_version)
        .bind(row.due_date)
        .bind(row.outstanding_principal)
        .bind(row.outstanding_interest)
        .bind(row.total_outstanding)
        .bind(row.status)
        .bind(&row.notes)
        .bind(row.modified_date)
        .bind(row.version)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        let stored: Option<i64> =
            sqlx::query_scalar("SELECT version FROM loan_accounts WHERE loan_account_id = $1")
                .bind(row.loan_account_id)
                .fetch_optional(&mut *conn)
                .await?;
        match stored {
            None => Err(DatabaseError::not_found("LoanAccount", row.loan_account_id)),
            Some(version) => Err(DatabaseError::Conflict(format!(
                "loan {} is at version {}, expected {}",
                row.loan_account_id, version, expected_version
            ))),
        }
    }
}

/// Filter for `LoanRepository::find`; unset fields do not filter
#[derive(Debug, Clone, Default)]
pub struct LoanFilter {
    pub party_id: Option<Uuid>,
    pub loan_type: Option<LoanType>,
    pub status: Option<LoanStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "loan_type", rename_all = "snake_case")]
pub enum LoanType {
    Given,
    Taken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "loan_status", rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    PartiallyPaid,
    Closed,
    Overdue,
}

/// Database row for a loan account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LoanAccountRow {
    pub loan_account_id: Uuid,
    pub party_id: Uuid,
    pub loan_type: LoanType,
    pub original_amount: Decimal,
    pub interest_rate: Decimal,
    pub start_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub outstanding_principal: Decimal,
    pub outstanding_interest: Decimal,
    pub total_outstanding: Decimal,
    pub status: LoanStatus,
    pub created_by: i64,
    pub notes: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: Option<DateTime<Utc>>,
    pub version: i64,
}
