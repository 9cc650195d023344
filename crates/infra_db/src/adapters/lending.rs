//! PostgreSQL Lending Store
//!
//! Implements the lending repositories and the ledger unit of work over
//! `loan_accounts` and `financial_transactions`.
//!
//! A `LedgerCommit` runs in one database transaction: the loan row is
//! inserted, or updated with `WHERE version = expected`, and the new
//! entries are appended. Any failure rolls the whole commit back.

use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, instrument};

use core_kernel::{
    DomainPort, FinancialTransactionId, HealthCheckResult, HealthCheckable, LoanAccountId, Money,
    PartyId, PortError, Rate, UserId,
};
use domain_lending::{
    FinancialTransaction, FinancialTransactionRepository, LedgerCommit, LedgerUnitOfWork,
    LoanAccount, LoanAccountRepository, LoanQuery, LoanStatus, LoanType, LoanWithTransactions,
    LoanWrite, PaymentMode, TransactionQuery, TransactionType,
};
use sqlx::PgPool;

use crate::error::DatabaseError;
use crate::repositories::ledger::{
    LedgerEntryRow, LedgerFilter, LedgerRepository, PaymentMode as DbPaymentMode,
    TransactionType as DbTransactionType,
};
use crate::repositories::loans::{
    LoanAccountRow, LoanFilter, LoanRepository, LoanStatus as DbLoanStatus, LoanType as DbLoanType,
};

const ADAPTER_ID: &str = "postgres-lending-store";

/// PostgreSQL-backed lending store
#[derive(Debug, Clone)]
pub struct PgLendingStore {
    loans: LoanRepository,
    ledger: LedgerRepository,
    pool: PgPool,
}

impl PgLendingStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            loans: LoanRepository::new(pool.clone()),
            ledger: LedgerRepository::new(pool.clone()),
            pool,
        }
    }

    async fn entries(&self, filter: LedgerFilter) -> Result<Vec<FinancialTransaction>, PortError> {
        let rows = self.ledger.find(&filter).await?;
        Ok(rows.into_iter().map(row_to_entry).collect::<Result<Vec<_>, DatabaseError>>()?)
    }
}

impl DomainPort for PgLendingStore {}

#[async_trait]
impl HealthCheckable for PgLendingStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, format!("Database error: {}", e)),
        }
    }
}

#[async_trait]
impl LoanAccountRepository for PgLendingStore {
    #[instrument(skip(self), fields(loan_id = %id))]
    async fn get_loan(&self, id: LoanAccountId) -> Result<Option<LoanAccount>, PortError> {
        let row = self.loans.get_by_id(*id.as_uuid()).await?;
        Ok(row.map(row_to_loan).transpose()?)
    }

    #[instrument(skip(self), fields(loan_id = %id))]
    async fn get_loan_with_transactions(
        &self,
        id: LoanAccountId,
    ) -> Result<Option<LoanWithTransactions>, PortError> {
        let Some(loan) = self.get_loan(id).await? else {
            return Ok(None);
        };
        let transactions = self
            .entries(LedgerFilter {
                loan_account_id: Some(*id.as_uuid()),
                ..Default::default()
            })
            .await?;
        Ok(Some(LoanWithTransactions { loan, transactions }))
    }

    #[instrument(skip(self))]
    async fn find_loans(&self, query: LoanQuery) -> Result<Vec<LoanAccount>, PortError> {
        debug!(?query, "Finding loans");
        let filter = LoanFilter {
            party_id: query.party_id.map(|p| *p.as_uuid()),
            loan_type: query.loan_type.map(DbLoanType::from),
            status: query.status.map(DbLoanStatus::from),
        };
        let rows = self.loans.find(&filter).await?;
        Ok(rows.into_iter().map(row_to_loan).collect::<Result<Vec<_>, DatabaseError>>()?)
    }
}

#[async_trait]
impl FinancialTransactionRepository for PgLendingStore {
    #[instrument(skip(self), fields(transaction_id = %id))]
    async fn get_transaction(
        &self,
        id: FinancialTransactionId,
    ) -> Result<Option<FinancialTransaction>, PortError> {
        let row = self.ledger.get_by_id(*id.as_uuid()).await?;
        Ok(row.map(row_to_entry).transpose()?)
    }

    #[instrument(skip(self))]
    async fn find_transactions(
        &self,
        query: TransactionQuery,
    ) -> Result<Vec<FinancialTransaction>, PortError> {
        debug!(?query, "Finding ledger entries");
        self.entries(LedgerFilter {
            loan_account_id: query.loan_id.map(|l| *l.as_uuid()),
            party_id: query.party_id.map(|p| *p.as_uuid()),
            transaction_type: query.transaction_type.map(DbTransactionType::from),
            from: query.from,
            to: query.to,
        })
        .await
    }

    async fn latest_transaction(
        &self,
        loan_id: LoanAccountId,
        transaction_type: TransactionType,
    ) -> Result<Option<FinancialTransaction>, PortError> {
        let row = self
            .ledger
            .latest(*loan_id.as_uuid(), transaction_type.into())
            .await?;
        Ok(row.map(row_to_entry).transpose()?)
    }
}

#[async_trait]
impl LedgerUnitOfWork for PgLendingStore {
    #[instrument(skip(self, commit), fields(loan_id = %commit.loan.id, entries = commit.entries.len()))]
    async fn commit(&self, commit: LedgerCommit) -> Result<LoanAccount, PortError> {
        commit.validate()?;
        let LedgerCommit { mut loan, write, entries } = commit;

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        match write {
            LoanWrite::Insert => {
                loan.version = 1;
                LoanRepository::insert(&mut *tx, &loan_to_row(&loan)).await?;
            }
            LoanWrite::Update { expected_version } => {
                loan.version = expected_version + 1;
                LoanRepository::update_versioned(&mut *tx, &loan_to_row(&loan), expected_version).await?;
            }
        }

        let rows: Vec<_> = entries.iter().map(entry_to_row).collect();
        LedgerRepository::append(&mut *tx, &rows).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        debug!(version = loan.version, "Ledger commit stored");
        Ok(loan)
    }
}

// ============================================================================
// Conversion functions
// ============================================================================

fn loan_to_row(loan: &LoanAccount) -> LoanAccountRow {
    LoanAccountRow {
        loan_account_id: *loan.id.as_uuid(),
        party_id: *loan.party_id.as_uuid(),
        loan_type: loan.loan_type.into(),
        original_amount: loan.original_amount.amount(),
        interest_rate: loan.interest_rate.as_percentage(),
        start_date: loan.start_date,
        due_date: loan.due_date,
        outstanding_principal: loan.outstanding_principal.amount(),
        outstanding_interest: loan.outstanding_interest.amount(),
        total_outstanding: loan.total_outstanding.amount(),
        status: loan.status.into(),
        created_by: loan.created_by.value(),
        notes: loan.notes.clone(),
        created_date: loan.created_date,
        modified_date: loan.modified_date,
        version: loan.version,
    }
}

fn row_to_loan(row: LoanAccountRow) -> Result<LoanAccount, DatabaseError> {
    Ok(LoanAccount {
        id: LoanAccountId::from_uuid(row.loan_account_id),
        party_id: PartyId::from_uuid(row.party_id),
        loan_type: row.loan_type.into(),
        original_amount: Money::new(row.original_amount),
        interest_rate: stored_rate(row.interest_rate)?,
        start_date: row.start_date,
        due_date: row.due_date,
        outstanding_principal: Money::new(row.outstanding_principal),
        outstanding_interest: Money::new(row.outstanding_interest),
        total_outstanding: Money::new(row.total_outstanding),
        status: row.status.into(),
        created_by: stored_user(row.created_by)?,
        notes: row.notes,
        created_date: row.created_date,
        modified_date: row.modified_date,
        version: row.version,
    })
}

fn entry_to_row(entry: &FinancialTransaction) -> LedgerEntryRow {
    LedgerEntryRow {
        transaction_id: *entry.id.as_uuid(),
        party_id: *entry.party_id.as_uuid(),
        party_name: entry.party_name.clone(),
        transaction_type: entry.transaction_type.into(),
        amount: entry.amount.amount(),
        payment_mode: entry.payment_mode.into(),
        interest_rate: entry.interest_rate.map(|r| r.as_percentage()),
        interest_amount: entry.interest_amount.map(|m| m.amount()),
        transaction_date: entry.transaction_date,
        due_date: entry.due_date,
        linked_loan_account_id: *entry.linked_loan_account_id.as_uuid(),
        entered_by: entry.entered_by.value(),
        notes: entry.notes.clone(),
        created_date: entry.created_date,
        modified_date: entry.modified_date,
    }
}

fn row_to_entry(row: LedgerEntryRow) -> Result<FinancialTransaction, DatabaseError> {
    Ok(FinancialTransaction {
        id: FinancialTransactionId::from_uuid(row.transaction_id),
        party_id: PartyId::from_uuid(row.party_id),
        party_name: row.party_name,
        transaction_type: row.transaction_type.into(),
        amount: Money::new(row.amount),
        payment_mode: row.payment_mode.into(),
        interest_rate: row.interest_rate.map(stored_rate).transpose()?,
        interest_amount: row.interest_amount.map(Money::new),
        transaction_date: row.transaction_date,
        due_date: row.due_date,
        linked_loan_account_id: LoanAccountId::from_uuid(row.linked_loan_account_id),
        entered_by: stored_user(row.entered_by)?,
        notes: row.notes,
        created_date: row.created_date,
        modified_date: row.modified_date,
    })
}

fn stored_rate(value: rust_decimal::Decimal) -> Result<Rate, DatabaseError> {
    Rate::from_percentage(value).map_err(|e| DatabaseError::corrupt(e.to_string()))
}

fn stored_user(value: i64) -> Result<UserId, DatabaseError> {
    UserId::new(value).map_err(|e| DatabaseError::corrupt(e.to_string()))
}

impl From<LoanType> for DbLoanType {
    fn from(value: LoanType) -> Self {
        match value {
            LoanType::Given => DbLoanType::Given,
            LoanType::Taken => DbLoanType::Taken,
        }
    }
}

impl From<DbLoanType> for LoanType {
    fn from(value: DbLoanType) -> Self {
        match value {
            DbLoanType::Given => LoanType::Given,
            DbLoanType::Taken => LoanType::Taken,
        }
    }
}

impl From<LoanStatus> for DbLoanStatus {
    fn from(value: LoanStatus) -> Self {
        match value {
            LoanStatus::Active => DbLoanStatus::Active,
            LoanStatus::PartiallyPaid => DbLoanStatus::PartiallyPaid,
            LoanStatus::Closed => DbLoanStatus::Closed,
            LoanStatus::Overdue => DbLoanStatus::Overdue,
        }
    }
}

impl From<DbLoanStatus> for LoanStatus {
    fn from(value: DbLoanStatus) -> Self {
        match value {
            DbLoanStatus::Active => LoanStatus::Active,
            DbLoanStatus::PartiallyPaid => LoanStatus::PartiallyPaid,
            DbLoanStatus::Closed => LoanStatus::Closed,
            DbLoanStatus::Overdue => LoanStatus::Overdue,
        }
    }
}

impl From<TransactionType> for DbTransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::LoanGiven => DbTransactionType::LoanGiven,
            TransactionType::LoanTaken => DbTransactionType::LoanTaken,
            TransactionType::LoanRepayment => DbTransactionType::LoanRepayment,
            TransactionType::LoanPayment => DbTransactionType::LoanPayment,
            TransactionType::InterestReceived => DbTransactionType::InterestReceived,
            TransactionType::InterestPaid => DbTransactionType::InterestPaid,
        }
    }
}

impl From<DbTransactionType> for TransactionType {
    fn from(value: DbTransactionType) -> Self {
        match value {
            DbTransactionType::LoanGiven => TransactionType::LoanGiven,
            DbTransactionType::LoanTaken => TransactionType::LoanTaken,
            DbTransactionType::LoanRepayment => TransactionType::LoanRepayment,
            DbTransactionType::LoanPayment => TransactionType::LoanPayment,
            DbTransactionType::InterestReceived => TransactionType::InterestReceived,
            DbTransactionType::InterestPaid => TransactionType::InterestPaid,
        }
    }
}

impl From<PaymentMode> for DbPaymentMode {
    fn from(value: PaymentMode) -> Self {
        match value {
            PaymentMode::Cash => DbPaymentMode::Cash,
            PaymentMode::Bank => DbPaymentMode::Bank,
            PaymentMode::Cheque => DbPaymentMode::Cheque,
            PaymentMode::Loan => DbPaymentMode::Loan,
        }
    }
}

impl From<DbPaymentMode> for PaymentMode {
    fn from(value: DbPaymentMode) -> Self {
        match value {
            DbPaymentMode::Cash => PaymentMode::Cash,
            DbPaymentMode::Bank => PaymentMode::Bank,
            DbPaymentMode::Cheque => PaymentMode::Cheque,
            DbPaymentMode::Loan => PaymentMode::Loan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn loan() -> LoanAccount {
        LoanAccount::open(
            PartyId::new(),
            LoanType::Taken,
            Money::new(dec!(2500.50)),
            Rate::from_percentage(dec!(9.75)).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            UserId::new(7).unwrap(),
            Utc::now(),
        )
        .unwrap()
        .with_notes(Some("working capital".to_string()))
    }

    #[test]
    fn test_loan_row_round_trip() {
        let loan = loan();
        let back = row_to_loan(loan_to_row(&loan)).unwrap();
        assert_eq!(back, loan);
    }

    #[test]
    fn test_entry_row_keeps_interest_fields() {
        let loan = loan();
        let entry = FinancialTransaction::interest_accrual(
            &loan,
            "Lender",
            Money::new(dec!(20.31)),
            loan.created_by,
            Utc::now(),
        );
        let row = entry_to_row(&entry);
        assert_eq!(row.transaction_type, DbTransactionType::InterestPaid);
        assert_eq!(row.interest_rate, Some(dec!(9.75)));
        assert_eq!(row_to_entry(row).unwrap(), entry);
    }

    #[test]
    fn test_corrupt_user_rejected() {
        let mut row = loan_to_row(&loan());
        row.created_by = 0;
        assert!(matches!(row_to_loan(row), Err(DatabaseError::CorruptRow(_))));
    }
}
