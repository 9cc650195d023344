//! Lending Domain Ports
//!
//! Loan accounts and ledger entries live in independent keyed collections;
//! an entry refers to its loan by id only and joins are explicit
//! repository lookups.
//!
//! # Architecture
//!
//! - `LoanAccountRepository` and `FinancialTransactionRepository` are the
//!   read side.
//! - `LedgerUnitOfWork` is the only write path: one loan row plus its new
//!   ledger entries commit together or not at all.
//! - `LendingStore` bundles the three for the engine.
//!
//! Adapters: `InMemoryLendingStore` (this crate) and `PgLendingStore`
//! (`infra_db`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{
    DomainPort, FinancialTransactionId, HealthCheckable, LoanAccountId, PartyId, PortError,
};

use crate::loan::{LoanAccount, LoanStatus, LoanType, LoanWithTransactions};
use crate::transaction::{FinancialTransaction, TransactionType};

/// Query parameters for finding loan accounts
///
/// Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanQuery {
    pub party_id: Option<PartyId>,
    pub loan_type: Option<LoanType>,
    pub status: Option<LoanStatus>,
}

impl LoanQuery {
    /// Matches every loan
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_party(party_id: PartyId) -> Self {
        Self {
            party_id: Some(party_id),
            ..Default::default()
        }
    }

    pub fn by_type(loan_type: LoanType) -> Self {
        Self {
            loan_type: Some(loan_type),
            ..Default::default()
        }
    }

    pub fn by_status(status: LoanStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn matches(&self, loan: &LoanAccount) -> bool {
        self.party_id.map_or(true, |p| loan.party_id == p)
            && self.loan_type.map_or(true, |t| loan.loan_type == t)
            && self.status.map_or(true, |s| loan.status == s)
    }
}

/// Query parameters for finding ledger entries
///
/// `from` is inclusive and `to` exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub loan_id: Option<LoanAccountId>,
    pub party_id: Option<PartyId>,
    pub transaction_type: Option<TransactionType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TransactionQuery {
    pub fn by_loan(loan_id: LoanAccountId) -> Self {
        Self {
            loan_id: Some(loan_id),
            ..Default::default()
        }
    }

    pub fn by_party(party_id: PartyId) -> Self {
        Self {
            party_id: Some(party_id),
            ..Default::default()
        }
    }

    pub fn by_type(transaction_type: TransactionType) -> Self {
        Self {
            transaction_type: Some(transaction_type),
            ..Default::default()
        }
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        }
    }

    pub fn matches(&self, entry: &FinancialTransaction) -> bool {
        self.loan_id.map_or(true, |l| entry.linked_loan_account_id == l)
            && self.party_id.map_or(true, |p| entry.party_id == p)
            && self.transaction_type.map_or(true, |t| entry.transaction_type == t)
            && self.from.map_or(true, |f| entry.transaction_date >= f)
            && self.to.map_or(true, |t| entry.transaction_date < t)
    }
}

/// Read access to loan accounts
#[async_trait]
pub trait LoanAccountRepository: DomainPort {
    /// Retrieves a loan by ID, or `None`
    async fn get_loan(&self, id: LoanAccountId) -> Result<Option<LoanAccount>, PortError>;

    /// Retrieves a loan and its ledger entries, newest entry first
    async fn get_loan_with_transactions(
        &self,
        id: LoanAccountId,
    ) -> Result<Option<LoanWithTransactions>, PortError>;

    /// Finds loans matching the query, newest loan first
    async fn find_loans(&self, query: LoanQuery) -> Result<Vec<LoanAccount>, PortError>;
}

/// Read access to ledger entries
#[async_trait]
pub trait FinancialTransactionRepository: DomainPort {
    /// Retrieves an entry by ID, or `None`
    async fn get_transaction(
        &self,
        id: FinancialTransactionId,
    ) -> Result<Option<FinancialTransaction>, PortError>;

    /// Finds entries matching the query, ordered by transaction date descending
    async fn find_transactions(
        &self,
        query: TransactionQuery,
    ) -> Result<Vec<FinancialTransaction>, PortError>;

    /// The most recent entry of the given type on a loan
    async fn latest_transaction(
        &self,
        loan_id: LoanAccountId,
        transaction_type: TransactionType,
    ) -> Result<Option<FinancialTransaction>, PortError>;
}

/// How the loan row in a commit is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanWrite {
    /// New loan; stored at version 1
    Insert,
    /// Existing loan; rejected with `PortError::Conflict` unless the stored
    /// version equals `expected_version`, stored at `expected_version + 1`
    Update { expected_version: i64 },
}

/// One atomic ledger write: a loan row and the entries posted against it
#[derive(Debug, Clone)]
pub struct LedgerCommit {
    pub loan: LoanAccount,
    pub write: LoanWrite,
    pub entries: Vec<FinancialTransaction>,
}

impl LedgerCommit {
    /// Opening a loan with its disbursement entry
    pub fn open(loan: LoanAccount, disbursement: FinancialTransaction) -> Self {
        Self {
            loan,
            write: LoanWrite::Insert,
            entries: vec![disbursement],
        }
    }

    /// Updating a loan read at `expected_version`, posting `entries`
    pub fn update(loan: LoanAccount, expected_version: i64, entries: Vec<FinancialTransaction>) -> Self {
        Self {
            loan,
            write: LoanWrite::Update { expected_version },
            entries,
        }
    }

    /// Checks that every entry is linked to the committed loan
    pub fn validate(&self) -> Result<(), PortError> {
        if let Some(stray) = self
            .entries
            .iter()
            .find(|e| e.linked_loan_account_id != self.loan.id)
        {
            return Err(PortError::validation(format!(
                "entry {} is linked to {} but committed with {}",
                stray.id, stray.linked_loan_account_id, self.loan.id
            )));
        }
        Ok(())
    }
}

/// Atomic write path of the ledger
#[async_trait]
pub trait LedgerUnitOfWork: DomainPort {
    /// Writes the loan row and appends the entries as one unit
    ///
    /// # Returns
    ///
    /// The loan as stored, with its new version
    ///
    /// # Errors
    ///
    /// - `PortError::Conflict` on a stale version or duplicate id
    /// - `PortError::Validation` if an entry is linked to another loan
    async fn commit(&self, commit: LedgerCommit) -> Result<LoanAccount, PortError>;
}

/// Everything the loan accounting engine needs from storage
pub trait LendingStore:
    LoanAccountRepository + FinancialTransactionRepository + LedgerUnitOfWork + HealthCheckable
{
}

impl<T> LendingStore for T where
    T: LoanAccountRepository + FinancialTransactionRepository + LedgerUnitOfWork + HealthCheckable
{
}
