//! Lending Domain - Loan Accounts and Their Ledger
//!
//! This crate keeps the money the business has lent out (`Given`) and
//! borrowed (`Taken`), one `LoanAccount` per relationship, each backed by
//! an append-only sequence of `FinancialTransaction` postings.
//!
//! # Invariants
//!
//! For every loan, after every operation:
//! - `total_outstanding == outstanding_principal + outstanding_interest`
//! - neither outstanding balance is negative
//! - the status is `Closed` exactly when `total_outstanding` is zero
//! - `original_amount + Σ interest postings − Σ repayments == total_outstanding`
//!
//! # Policies
//!
//! - Payments settle outstanding interest before principal.
//! - A payment larger than the total outstanding is rejected.
//! - Postings are never edited; a correction is a new offsetting posting.
//!
//! # Example
//!
//! ```rust,ignore
//! let engine = LoanAccountingEngine::new(store, parties, clock);
//!
//! let loan = engine.create_loan(CreateLoanRequest { .. }).await?;
//! engine.record_payment(RecordPaymentRequest { loan_id: loan.id, .. }).await?;
//! let outcome = engine.update_loan_interest(loan.id).await?;
//! ```

pub mod error;
pub mod loan;
pub mod transaction;
pub mod interest;
pub mod ports;
pub mod memory;
pub mod engine;

pub use error::LendingError;
pub use loan::{LoanAccount, LoanStatus, LoanType, LoanWithTransactions};
pub use transaction::{FinancialTransaction, PaymentMode, TransactionType};
pub use interest::{accrued_interest, allocate_payment, PaymentAllocation};
pub use ports::{
    FinancialTransactionRepository, LedgerCommit, LedgerUnitOfWork, LendingStore,
    LoanAccountRepository, LoanQuery, LoanWrite, TransactionQuery,
};
pub use memory::InMemoryLendingStore;
pub use engine::{
    AccrualOutcome, CreateLoanRequest, LoanAccountingEngine, OutstandingSummary,
    RecordPaymentRequest,
};
