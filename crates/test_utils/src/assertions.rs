//! Custom Test Assertions
//!
//! Assertion helpers for ledger types with messages that say which
//! invariant broke.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_lending::{FinancialTransaction, LoanAccount, LoanStatus};

/// Asserts that a Money value equals a decimal amount
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Expected {} but got {}",
        expected,
        actual
    );
}

/// Asserts the balance invariants of a single loan
///
/// Total equals principal plus interest, neither part is negative, and the
/// loan is Closed exactly when nothing is outstanding.
pub fn assert_loan_balances(loan: &LoanAccount) {
    assert_eq!(
        loan.total_outstanding,
        loan.outstanding_principal + loan.outstanding_interest,
        "loan {}: total {} != principal {} + interest {}",
        loan.id,
        loan.total_outstanding,
        loan.outstanding_principal,
        loan.outstanding_interest
    );
    assert!(
        !loan.outstanding_principal.is_negative(),
        "loan {}: negative principal {}",
        loan.id,
        loan.outstanding_principal
    );
    assert!(
        !loan.outstanding_interest.is_negative(),
        "loan {}: negative interest {}",
        loan.id,
        loan.outstanding_interest
    );
    assert!(
        loan.outstanding_principal >= loan.original_amount || loan.status != LoanStatus::Active,
        "loan {}: principal {} repaid below original {} but status is Active",
        loan.id,
        loan.outstanding_principal,
        loan.original_amount
    );
    assert_eq!(
        loan.status == LoanStatus::Closed,
        loan.total_outstanding.is_zero(),
        "loan {}: status {} with total {}",
        loan.id,
        loan.status,
        loan.total_outstanding
    );
}

/// Asserts that a loan's ledger reproduces its balance
///
/// Checks `assert_loan_balances`, then that there is exactly one
/// disbursement equal to the original amount, every entry links to the
/// loan, entries are newest first, and original + interest - payments
/// equals the total outstanding.
pub fn assert_loan_invariants(loan: &LoanAccount, entries: &[FinancialTransaction]) {
    assert_loan_balances(loan);

    let disbursements: Vec<_> = entries
        .iter()
        .filter(|e| e.transaction_type.is_disbursement())
        .collect();
    assert_eq!(disbursements.len(), 1, "loan {}: expected one disbursement", loan.id);
    assert_eq!(disbursements[0].amount, loan.original_amount);

    for entry in entries {
        assert_eq!(
            entry.linked_loan_account_id, loan.id,
            "entry {} is linked to another loan",
            entry.id
        );
        assert!(entry.amount.is_positive(), "entry {} has non-positive amount", entry.id);
    }
    assert!(
        entries
            .windows(2)
            .all(|w| w[0].transaction_date >= w[1].transaction_date),
        "entries are not newest first"
    );

    let interest: Money = entries
        .iter()
        .filter(|e| e.transaction_type.is_interest())
        .map(|e| e.amount)
        .sum();
    let repaid: Money = entries
        .iter()
        .filter(|e| e.transaction_type.is_repayment())
        .map(|e| e.amount)
        .sum();
    assert_eq!(
        loan.original_amount + interest - repaid,
        loan.total_outstanding,
        "loan {}: ledger (original {} + interest {} - repaid {}) disagrees with total {}",
        loan.id,
        loan.original_amount,
        interest,
        repaid,
        loan.total_outstanding
    );
}
