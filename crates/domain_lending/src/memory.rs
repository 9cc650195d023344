//! In-memory ledger store
//!
//! Loans are keyed by id; entries sit in an append-only arena with a
//! per-loan index of arena slots. A single write lock around each commit
//! gives the same all-or-nothing behavior as a database transaction.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use core_kernel::{
    AdapterHealth, DomainPort, FinancialTransactionId, HealthCheckResult, HealthCheckable,
    LoanAccountId, PortError,
};

use crate::loan::{LoanAccount, LoanWithTransactions};
use crate::ports::{
    FinancialTransactionRepository, LedgerCommit, LedgerUnitOfWork, LoanAccountRepository,
    LoanQuery, LoanWrite, TransactionQuery,
};
use crate::transaction::{FinancialTransaction, TransactionType};

#[derive(Debug, Default)]
struct LedgerState {
    loans: HashMap<LoanAccountId, LoanAccount>,
    entries: Vec<FinancialTransaction>,
    entry_ids: HashSet<FinancialTransactionId>,
    by_loan: HashMap<LoanAccountId, Vec<usize>>,
}

impl LedgerState {
    fn loan_entries(&self, loan_id: LoanAccountId) -> Vec<FinancialTransaction> {
        let mut entries: Vec<_> = self
            .by_loan
            .get(&loan_id)
            .map(|slots| slots.iter().map(|&i| self.entries[i].clone()).collect())
            .unwrap_or_default();
        sort_newest_first(&mut entries);
        entries
    }
}

fn sort_newest_first(entries: &mut [FinancialTransaction]) {
    entries.sort_by(|a, b| {
        b.transaction_date
            .cmp(&a.transaction_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Ledger store held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryLendingStore {
    state: RwLock<LedgerState>,
    fail_commits: AtomicBool,
}

impl InMemoryLendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following commit fail with a connection error
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Number of ledger entries stored across all loans
    pub async fn entry_count(&self) -> usize {
        self.state.read().await.entries.len()
    }
}

impl DomainPort for InMemoryLendingStore {}

#[async_trait]
impl HealthCheckable for InMemoryLendingStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "in-memory-lending-store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl LoanAccountRepository for InMemoryLendingStore {
    async fn get_loan(&self, id: LoanAccountId) -> Result<Option<LoanAccount>, PortError> {
        Ok(self.state.read().await.loans.get(&id).cloned())
    }

    async fn get_loan_with_transactions(
        &self,
        id: LoanAccountId,
    ) -> Result<Option<LoanWithTransactions>, PortError> {
        let state = self.state.read().await;
        Ok(state.loans.get(&id).map(|loan| LoanWithTransactions {
            loan: loan.clone(),
            transactions: state.loan_entries(id),
        }))
    }

    async fn find_loans(&self, query: LoanQuery) -> Result<Vec<LoanAccount>, PortError> {
        let state = self.state.read().await;
        let mut loans: Vec<_> = state
            .loans
            .values()
            .filter(|loan| query.matches(loan))
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.created_date.cmp(&a.created_date).then_with(|| b.id.cmp(&a.id)));
        Ok(loans)
    }
}

#[async_trait]
impl FinancialTransactionRepository for InMemoryLendingStore {
    async fn get_transaction(
        &self,
        id: FinancialTransactionId,
    ) -> Result<Option<FinancialTransaction>, PortError> {
        let state = self.state.read().await;
        Ok(state.entries.iter().find(|e| e.id == id).cloned())
    }

    async fn find_transactions(
        &self,
        query: TransactionQuery,
    ) -> Result<Vec<FinancialTransaction>, PortError> {
        let state = self.state.read().await;
        let candidates: Vec<&FinancialTransaction> = match query.loan_id {
            Some(loan_id) => state
                .by_loan
                .get(&loan_id)
                .map(|slots| slots.iter().map(|&i| &state.entries[i]).collect())
                .unwrap_or_default(),
            None => state.entries.iter().collect(),
        };
        let mut entries: Vec<_> = candidates
            .into_iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    async fn latest_transaction(
        &self,
        loan_id: LoanAccountId,
        transaction_type: TransactionType,
    ) -> Result<Option<FinancialTransaction>, PortError> {
        let state = self.state.read().await;
        Ok(state
            .loan_entries(loan_id)
            .into_iter()
            .find(|e| e.transaction_type == transaction_type))
    }
}

#[async_trait]
impl LedgerUnitOfWork for InMemoryLendingStore {
    async fn commit(&self, commit: LedgerCommit) -> Result<LoanAccount, PortError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(PortError::connection("in-memory store is set to fail commits"));
        }
        commit.validate()?;

        let mut state = self.state.write().await;
        let LedgerCommit { mut loan, write, entries } = commit;

        let mut batch_ids = HashSet::new();
        for entry in &entries {
            if state.entry_ids.contains(&entry.id) || !batch_ids.insert(entry.id) {
                return Err(PortError::conflict(format!("ledger entry {} already exists", entry.id)));
            }
        }

        match write {
            LoanWrite::Insert => {
                if state.loans.contains_key(&loan.id) {
                    return Err(PortError::conflict(format!("loan {} already exists", loan.id)));
                }
                loan.version = 1;
            }
            LoanWrite::Update { expected_version } => {
                let stored = state
                    .loans
                    .get(&loan.id)
                    .ok_or_else(|| PortError::not_found("LoanAccount", loan.id))?;
                if stored.version != expected_version {
                    return Err(PortError::conflict(format!(
                        "loan {} is at version {}, expected {}",
                        loan.id, stored.version, expected_version
                    )));
                }
                loan.version = expected_version + 1;
            }
        }

        for entry in entries {
            let slot = state.entries.len();
            state.entry_ids.insert(entry.id);
            state.by_loan.entry(entry.linked_loan_account_id).or_default().push(slot);
            state.entries.push(entry);
        }
        state.loans.insert(loan.id, loan.clone());

        Ok(loan)
    }
}
