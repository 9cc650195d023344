//! Ledger entry repository
//!
//! `financial_transactions` is append-only; a trigger rejects UPDATE and
//! DELETE, so this repository only ever inserts and reads.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

const ENTRY_COLUMNS: &str = r#"
    transaction_id,
    party_id,
    party_name,
    transaction_type,
    amount,
    payment_mode,
    interest_rate,
    interest_amount,
    transaction_date,
    due_date,
    linked_loan_account_id,
    entered_by,
    notes,
    created_date,
    modified_date
"#;

const NEWEST_FIRST: &str = " ORDER BY transaction_date DESC, transaction_id DESC";

/// Repository for the `financial_transactions` table
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, transaction_id: Uuid) -> Result<Option<LedgerEntryRow>, DatabaseError> {
        let row = sqlx::query_as::<_, LedgerEntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM financial_transactions WHERE transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Finds entries matching the filter, newest first
    pub async fn find(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntryRow>, DatabaseError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ENTRY_COLUMNS} FROM financial_transactions WHERE TRUE"
        ));
        if let Some(loan_id) = filter.loan_account_id {
            query.push(" AND linked_loan_account_id = ").push_bind(loan_id);
        }
        if let Some(party_id) = filter.party_id {
            query.push(" AND party_id = ").push_bind(party_id);
        }
        if let Some(transaction_type) = filter.transaction_type {
            query.push(" AND transaction_type = ").push_bind(transaction_type);
        }
        if let Some(from) = filter.from {
            query.push(" AND transaction_date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND transaction_date < ").push_bind(to);
        }
        query.push(NEWEST_FIRST);

        let rows = query
            .build_query_as::<LedgerEntryRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// All entries of one loan, newest first
    pub async fn for_loan(&self, loan_account_id: Uuid) -> Result<Vec<LedgerEntryRow>, DatabaseError> {
        self.find(&LedgerFilter {
            loan_account_id: Some(loan_account_id),
            ..Default::default()
        })
        .await
    }

    /// The newest entry of a type on a loan
    pub async fn latest(
        &self,
        loan_account_id: Uuid,
        transaction_type: TransactionType,
    ) -> Result<Option<LedgerEntryRow>, DatabaseError> {
        let row = sqlx::query_as::<_, LedgerEntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM financial_transactions \
             WHERE linked_loan_account_id = $1 AND transaction_type = $2{NEWEST_FIRST} LIMIT 1"
        ))
        .bind(loan_account_id)
        .bind(transaction_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Appends entries on the given connection
    pub async fn append(conn: &mut PgConnection, rows: &[LedgerEntryRow]) -> Result<(), DatabaseError> {
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO financial_transactions (
                    transaction_id, party_id, party_name, transaction_type, amount,
                    payment_mode, interest_rate, interest_amount, transaction_date,
                    due_date, linked_loan_account_id, entered_by, notes,
                    created_date, modified_date
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                "#,
            )
            .bind(row.transaction_id)
            .bind(row.party_id)
            .bind(&row.party_name)
            .bind(row.transaction_type)
            .bind(row.amount)
            .bind(row.payment_mode)
            .bind(row.interest_rate)
            .bind(row.interest_amount)
            .bind(row.transaction_date)
            .bind(row.due_date)
            .bind(row.linked_loan_account_id)
            .bind(row.entered_by)
            .bind(&row.notes)
            .bind(row.created_date)
            .bind(row.modified_date)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}

/// Filter for `LedgerRepository::find`
///
/// `from` is inclusive, `to` exclusive.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub loan_account_id: Option<Uuid>,
    pub party_id: Option<Uuid>,
    pub transaction_type: Option<TransactionType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "snake_case")]
pub enum TransactionType {
    LoanGiven,
    LoanTaken,
    LoanRepayment,
    LoanPayment,
    InterestReceived,
    InterestPaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_mode", rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Bank,
    Cheque,
    Loan,
}

/// Database row for a ledger entry
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LedgerEntryRow {
    pub transaction_id: Uuid,
    pub party_id: Uuid,
    pub party_name: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub payment_mode: PaymentMode,
    pub interest_rate: Option<Decimal>,
    pub interest_amount: Option<Decimal>,
    pub transaction_date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub linked_loan_account_id: Uuid,
    pub entered_by: i64,
    pub notes: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: Option<DateTime<Utc>>,
}
