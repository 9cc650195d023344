//! Loan accounting engine
//!
//! Orchestrates every mutation of a loan account. Each mutating call
//! validates its input, computes the new balances in memory, then hands the
//! loan row and its new ledger entries to the store as one `LedgerCommit`.
//! Nothing is written when validation fails, and a failed commit leaves the
//! ledger exactly as it was.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use core_kernel::{
    elapsed_months, Clock, DateRange, LoanAccountId, Money, PartyId, Rate, UserId,
};
use domain_party::PartyDirectory;

use crate::error::LendingError;
use crate::interest::{accrual_anchor, accrued_interest};
use crate::loan::{LoanAccount, LoanStatus, LoanType, LoanWithTransactions};
use crate::ports::{LedgerCommit, LendingStore, LoanQuery, TransactionQuery};
use crate::transaction::{FinancialTransaction, PaymentMode, TransactionType};

/// Input for opening a loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoanRequest {
    pub party_id: PartyId,
    pub loan_type: LoanType,
    pub original_amount: Decimal,
    /// Percent per annum
    pub interest_rate: Decimal,
    pub start_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub created_by: UserId,
    pub payment_mode: PaymentMode,
    pub notes: Option<String>,
}

/// Input for recording a repayment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub loan_id: LoanAccountId,
    pub amount: Decimal,
    pub payment_mode: PaymentMode,
    pub entered_by: UserId,
    pub notes: Option<String>,
}

/// Result of an interest accrual run on one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualOutcome {
    /// The loan after the run; unchanged when nothing was posted
    pub loan: LoanAccount,
    /// The posted accrual entry, if any
    pub entry: Option<FinancialTransaction>,
}

impl AccrualOutcome {
    fn unchanged(loan: LoanAccount) -> Self {
        Self { loan, entry: None }
    }

    pub fn posted(&self) -> bool {
        self.entry.is_some()
    }
}

/// Portfolio totals for dashboards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingSummary {
    pub as_of: NaiveDate,
    /// Owed to the business on open Given loans
    pub total_given: Money,
    /// Owed by the business on open Taken loans
    pub total_taken: Money,
    /// `total_given - total_taken`
    pub net_position: Money,
    pub active_count: usize,
    pub partially_paid_count: usize,
    pub overdue_count: usize,
    pub closed_count: usize,
}

/// The loan accounting engine
pub struct LoanAccountingEngine {
    store: Arc<dyn LendingStore>,
    parties: Arc<dyn PartyDirectory>,
    clock: Arc<dyn Clock>,
}

impl LoanAccountingEngine {
    /// Creates an engine over a store, a party directory and a clock
    pub fn new(
        store: Arc<dyn LendingStore>,
        parties: Arc<dyn PartyDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, parties, clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Opens a loan and posts its disbursement entry atomically
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a non-positive amount, negative rate, or a due
    ///   date before the start date
    /// - `NotFound` if the party does not exist
    /// - `Directory` / `Persistence` for collaborator failures
    #[instrument(skip(self, request), fields(party_id = %request.party_id, loan_type = %request.loan_type))]
    pub async fn create_loan(&self, request: CreateLoanRequest) -> Result<LoanAccount, LendingError> {
        self.try_create_loan(request)
            .await
            .inspect_err(|e| log_rejection("create_loan", e))
    }

    async fn try_create_loan(&self, request: CreateLoanRequest) -> Result<LoanAccount, LendingError> {
        let original_amount = Money::positive(request.original_amount)?;
        let interest_rate = Rate::from_percentage(request.interest_rate)?;
        let now = self.clock.now();

        let loan = LoanAccount::open(
            request.party_id,
            request.loan_type,
            original_amount,
            interest_rate,
            request.start_date,
            request.created_by,
            now,
        )?
        .with_due_date(request.due_date)?
        .with_notes(request.notes);

        let exists = self
            .parties
            .party_exists(loan.party_id)
            .await
            .map_err(|e| LendingError::from_directory(e, loan.party_id))?;
        if !exists {
            return Err(LendingError::party_not_found(loan.party_id));
        }
        let party_name = self.party_name(loan.party_id).await?;

        let disbursement = FinancialTransaction::disbursement(&loan, party_name, request.payment_mode, now);
        let stored = self.store.commit(LedgerCommit::open(loan, disbursement)).await?;

        info!(
            loan_id = %stored.id,
            party_id = %stored.party_id,
            loan_type = %stored.loan_type,
            amount = %stored.original_amount,
            rate = %stored.interest_rate,
            "Loan created"
        );
        Ok(stored)
    }

    /// Applies a repayment: outstanding interest first, then principal
    ///
    /// # Returns
    ///
    /// The posted repayment entry
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a non-positive amount
    /// - `NotFound` if the loan does not exist
    /// - `InvalidState` if the loan is closed or the amount exceeds the
    ///   total outstanding
    /// - `Persistence` if the commit fails, including a concurrent update
    #[instrument(skip(self, request), fields(loan_id = %request.loan_id))]
    pub async fn record_payment(
        &self,
        request: RecordPaymentRequest,
    ) -> Result<FinancialTransaction, LendingError> {
        self.try_record_payment(request)
            .await
            .inspect_err(|e| log_rejection("record_payment", e))
    }

    async fn try_record_payment(
        &self,
        request: RecordPaymentRequest,
    ) -> Result<FinancialTransaction, LendingError> {
        let amount = Money::positive(request.amount)?;
        let mut loan = self.load_loan(request.loan_id).await?;
        let expected_version = loan.version;
        let now = self.clock.now();

        let allocation = loan.apply_payment(amount, self.clock.today(), now)?;
        let party_name = self.party_name(loan.party_id).await?;

        let entry = FinancialTransaction::repayment(
            &loan,
            party_name,
            amount,
            request.payment_mode,
            request.entered_by,
            now,
        )
        .with_notes(request.notes);
        let stored = self
            .store
            .commit(LedgerCommit::update(loan, expected_version, vec![entry.clone()]))
            .await?;

        info!(
            loan_id = %stored.id,
            amount = %amount,
            interest_portion = %allocation.interest_portion,
            principal_portion = %allocation.principal_portion,
            total_outstanding = %stored.total_outstanding,
            status = %stored.status,
            "Payment recorded"
        );
        Ok(entry)
    }

    /// Accrues simple interest since the later of the start date and the
    /// last accrual entry
    ///
    /// Posts nothing when no time has elapsed, the rounded accrual is zero,
    /// or the loan is closed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the loan does not exist
    /// - `Persistence` if the commit fails
    #[instrument(skip(self), fields(loan_id = %loan_id))]
    pub async fn update_loan_interest(&self, loan_id: LoanAccountId) -> Result<AccrualOutcome, LendingError> {
        self.try_update_loan_interest(loan_id)
            .await
            .inspect_err(|e| log_rejection("update_loan_interest", e))
    }

    async fn try_update_loan_interest(&self, loan_id: LoanAccountId) -> Result<AccrualOutcome, LendingError> {
        let mut loan = self.load_loan(loan_id).await?;
        if loan.is_closed() {
            debug!(loan_id = %loan.id, "Loan is closed, no interest accrued");
            return Ok(AccrualOutcome::unchanged(loan));
        }

        let now = self.clock.now();
        let last_accrual = self
            .store
            .latest_transaction(loan.id, loan.loan_type.interest_type())
            .await?
            .map(|entry| entry.transaction_date);
        let anchor = accrual_anchor(self.clock.start_of_day(loan.start_date), last_accrual);
        let months = elapsed_months(anchor, now);
        if months <= Decimal::ZERO {
            debug!(loan_id = %loan.id, %anchor, "No time elapsed since last accrual");
            return Ok(AccrualOutcome::unchanged(loan));
        }

        let interest = accrued_interest(loan.outstanding_principal, loan.interest_rate, months)?;
        if interest.is_zero() {
            debug!(loan_id = %loan.id, %months, "Accrued interest rounds to zero");
            return Ok(AccrualOutcome::unchanged(loan));
        }

        let party_name = self.party_name(loan.party_id).await?;
        let expected_version = loan.version;
        loan.apply_accrual(interest, self.clock.today(), now)?;

        let entry = FinancialTransaction::interest_accrual(&loan, party_name, interest, loan.created_by, now);
        let stored = self
            .store
            .commit(LedgerCommit::update(loan, expected_version, vec![entry.clone()]))
            .await?;

        info!(
            loan_id = %stored.id,
            months = %months.round_dp(4),
            interest = %interest,
            total_outstanding = %stored.total_outstanding,
            "Interest accrued"
        );
        Ok(AccrualOutcome {
            loan: stored,
            entry: Some(entry),
        })
    }

    /// Re-derives the status of every open loan against today's date
    ///
    /// Only loans whose status changes are written.
    ///
    /// # Returns
    ///
    /// The number of loans updated
    #[instrument(skip(self))]
    pub async fn refresh_statuses(&self) -> Result<usize, LendingError> {
        self.try_refresh_statuses()
            .await
            .inspect_err(|e| log_rejection("refresh_statuses", e))
    }

    async fn try_refresh_statuses(&self) -> Result<usize, LendingError> {
        let today = self.clock.today();
        let now = self.clock.now();
        let loans = self.store.find_loans(LoanQuery::all()).await?;

        let mut updated = 0;
        for mut loan in loans.into_iter().filter(|l| l.status.is_open()) {
            let expected_version = loan.version;
            let previous = loan.status;
            if loan.refresh_status(today) {
                loan.touch(now);
                let stored = self
                    .store
                    .commit(LedgerCommit::update(loan, expected_version, Vec::new()))
                    .await?;
                debug!(loan_id = %stored.id, from = %previous, to = %stored.status, "Status changed");
                updated += 1;
            }
        }

        info!(updated, %today, "Loan statuses refreshed");
        Ok(updated)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Retrieves a loan by ID
    pub async fn get_loan(&self, id: LoanAccountId) -> Result<LoanAccount, LendingError> {
        self.load_loan(id).await
    }

    /// Retrieves a loan with its ledger entries, newest first
    pub async fn get_loan_with_transactions(
        &self,
        id: LoanAccountId,
    ) -> Result<LoanWithTransactions, LendingError> {
        self.store
            .get_loan_with_transactions(id)
            .await?
            .ok_or_else(|| LendingError::loan_not_found(id))
    }

    /// Ledger entries of one loan, newest first; empty for an unknown loan
    pub async fn get_transactions_by_loan(
        &self,
        id: LoanAccountId,
    ) -> Result<Vec<FinancialTransaction>, LendingError> {
        Ok(self.store.find_transactions(TransactionQuery::by_loan(id)).await?)
    }

    pub async fn get_transactions_by_party(
        &self,
        party_id: PartyId,
    ) -> Result<Vec<FinancialTransaction>, LendingError> {
        Ok(self.store.find_transactions(TransactionQuery::by_party(party_id)).await?)
    }

    pub async fn get_transactions_by_type(
        &self,
        transaction_type: TransactionType,
    ) -> Result<Vec<FinancialTransaction>, LendingError> {
        Ok(self
            .store
            .find_transactions(TransactionQuery::by_type(transaction_type))
            .await?)
    }

    /// Ledger entries dated within `[start, end]` in business time
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `start` is after `end`
    pub async fn get_transactions_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FinancialTransaction>, LendingError> {
        let range = DateRange::new(start, end)?;
        let (from, to) = range.utc_bounds(&self.clock.timezone());
        Ok(self.store.find_transactions(TransactionQuery::between(from, to)).await?)
    }

    pub async fn get_loans_by_type(&self, loan_type: LoanType) -> Result<Vec<LoanAccount>, LendingError> {
        Ok(self.store.find_loans(LoanQuery::by_type(loan_type)).await?)
    }

    pub async fn get_loans_by_party(&self, party_id: PartyId) -> Result<Vec<LoanAccount>, LendingError> {
        Ok(self.store.find_loans(LoanQuery::by_party(party_id)).await?)
    }

    pub async fn get_loans_by_status(&self, status: LoanStatus) -> Result<Vec<LoanAccount>, LendingError> {
        Ok(self.store.find_loans(LoanQuery::by_status(status)).await?)
    }

    pub async fn get_all_loans(&self) -> Result<Vec<LoanAccount>, LendingError> {
        Ok(self.store.find_loans(LoanQuery::all()).await?)
    }

    /// Sum of total outstanding over open loans of one type
    pub async fn get_total_outstanding_by_type(&self, loan_type: LoanType) -> Result<Money, LendingError> {
        let loans = self.store.find_loans(LoanQuery::by_type(loan_type)).await?;
        Ok(open_total(&loans))
    }

    /// Totals and status counts across the whole portfolio
    pub async fn get_outstanding_summary(&self) -> Result<OutstandingSummary, LendingError> {
        let loans = self.store.find_loans(LoanQuery::all()).await?;
        let (given, taken): (Vec<_>, Vec<_>) =
            loans.iter().cloned().partition(|l| l.loan_type == LoanType::Given);
        let total_given = open_total(&given);
        let total_taken = open_total(&taken);
        let count = |status: LoanStatus| loans.iter().filter(|l| l.status == status).count();

        Ok(OutstandingSummary {
            as_of: self.clock.today(),
            total_given,
            total_taken,
            net_position: total_given - total_taken,
            active_count: count(LoanStatus::Active),
            partially_paid_count: count(LoanStatus::PartiallyPaid),
            overdue_count: count(LoanStatus::Overdue),
            closed_count: count(LoanStatus::Closed),
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn load_loan(&self, id: LoanAccountId) -> Result<LoanAccount, LendingError> {
        self.store
            .get_loan(id)
            .await?
            .ok_or_else(|| LendingError::loan_not_found(id))
    }

    async fn party_name(&self, party_id: PartyId) -> Result<String, LendingError> {
        self.parties
            .get_party(party_id)
            .await
            .map(|party| party.name)
            .map_err(|e| LendingError::from_directory(e, party_id))
    }
}

fn open_total(loans: &[LoanAccount]) -> Money {
    loans
        .iter()
        .filter(|l| l.status.is_open())
        .map(|l| l.total_outstanding)
        .sum()
}

fn log_rejection(operation: &'static str, error: &LendingError) {
    match error {
        LendingError::Persistence(_) | LendingError::Directory(_) => {
            error!(operation, error = %error, "Operation failed");
        }
        _ => {
            warn!(operation, error = %error, "Operation rejected");
        }
    }
}
