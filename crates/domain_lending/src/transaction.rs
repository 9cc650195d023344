//! Ledger entries
//!
//! A `FinancialTransaction` is an immutable posting against one loan
//! account. Entries are only ever appended; a correction is a new
//! offsetting posting, never an edit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{FinancialTransactionId, LoanAccountId, Money, PartyId, Rate, UserId};
use crate::error::LendingError;
use crate::loan::{LoanAccount, LoanType};

/// Kind of ledger posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Disbursement of a Given loan
    LoanGiven,
    /// Receipt of a Taken loan
    LoanTaken,
    /// Repayment received on a Given loan
    LoanRepayment,
    /// Payment made on a Taken loan
    LoanPayment,
    /// Interest accrued on a Given loan
    InterestReceived,
    /// Interest accrued on a Taken loan
    InterestPaid,
}

impl TransactionType {
    pub const ALL: [TransactionType; 6] = [
        TransactionType::LoanGiven,
        TransactionType::LoanTaken,
        TransactionType::LoanRepayment,
        TransactionType::LoanPayment,
        TransactionType::InterestReceived,
        TransactionType::InterestPaid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::LoanGiven => "LoanGiven",
            TransactionType::LoanTaken => "LoanTaken",
            TransactionType::LoanRepayment => "LoanRepayment",
            TransactionType::LoanPayment => "LoanPayment",
            TransactionType::InterestReceived => "InterestReceived",
            TransactionType::InterestPaid => "InterestPaid",
        }
    }

    /// The loan direction this posting belongs to
    pub fn loan_type(&self) -> LoanType {
        match self {
            TransactionType::LoanGiven
            | TransactionType::LoanRepayment
            | TransactionType::InterestReceived => LoanType::Given,
            TransactionType::LoanTaken
            | TransactionType::LoanPayment
            | TransactionType::InterestPaid => LoanType::Taken,
        }
    }

    pub fn is_disbursement(&self) -> bool {
        matches!(self, TransactionType::LoanGiven | TransactionType::LoanTaken)
    }

    pub fn is_repayment(&self) -> bool {
        matches!(self, TransactionType::LoanRepayment | TransactionType::LoanPayment)
    }

    pub fn is_interest(&self) -> bool {
        matches!(self, TransactionType::InterestReceived | TransactionType::InterestPaid)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LendingError::invalid_argument(format!("unknown transaction type '{}'", s)))
    }
}

/// Cash-flow channel of a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    Bank,
    Cheque,
    /// Book entry with no cash movement, used for interest accruals
    Loan,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Bank => "Bank",
            PaymentMode::Cheque => "Cheque",
            PaymentMode::Loan => "Loan",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(PaymentMode::Cash),
            "Bank" => Ok(PaymentMode::Bank),
            "Cheque" => Ok(PaymentMode::Cheque),
            "Loan" => Ok(PaymentMode::Loan),
            other => Err(LendingError::invalid_argument(format!("unknown payment mode '{}'", other))),
        }
    }
}

/// A single ledger posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTransaction {
    pub id: FinancialTransactionId,
    pub party_id: PartyId,
    /// Party name as the directory reported it when the entry was posted
    pub party_name: String,
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub payment_mode: PaymentMode,
    /// Set on interest accruals only
    pub interest_rate: Option<Rate>,
    /// Set on interest accruals only
    pub interest_amount: Option<Money>,
    pub transaction_date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub linked_loan_account_id: LoanAccountId,
    pub entered_by: UserId,
    pub notes: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: Option<DateTime<Utc>>,
}

impl FinancialTransaction {
    fn posting(
        loan: &LoanAccount,
        party_name: String,
        transaction_type: TransactionType,
        amount: Money,
        payment_mode: PaymentMode,
        entered_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: FinancialTransactionId::new_v7(),
            party_id: loan.party_id,
            party_name,
            transaction_type,
            amount,
            payment_mode,
            interest_rate: None,
            interest_amount: None,
            transaction_date: now,
            due_date: loan.due_date,
            linked_loan_account_id: loan.id,
            entered_by,
            notes: None,
            created_date: now,
            modified_date: None,
        }
    }

    /// The opening entry for a new loan, for its full original amount
    pub fn disbursement(
        loan: &LoanAccount,
        party_name: impl Into<String>,
        payment_mode: PaymentMode,
        now: DateTime<Utc>,
    ) -> Self {
        Self::posting(
            loan,
            party_name.into(),
            loan.loan_type.disbursement_type(),
            loan.original_amount,
            payment_mode,
            loan.created_by,
            now,
        )
        .with_notes(loan.notes.clone())
    }

    /// A repayment entry
    pub fn repayment(
        loan: &LoanAccount,
        party_name: impl Into<String>,
        amount: Money,
        payment_mode: PaymentMode,
        entered_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self::posting(
            loan,
            party_name.into(),
            loan.loan_type.repayment_type(),
            amount,
            payment_mode,
            entered_by,
            now,
        )
    }

    /// An interest accrual entry at the loan's rate
    pub fn interest_accrual(
        loan: &LoanAccount,
        party_name: impl Into<String>,
        interest: Money,
        entered_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        let mut entry = Self::posting(
            loan,
            party_name.into(),
            loan.loan_type.interest_type(),
            interest,
            PaymentMode::Loan,
            entered_by,
            now,
        );
        entry.interest_rate = Some(loan.interest_rate);
        entry.interest_amount = Some(interest);
        entry
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Effect of this posting on the loan's total outstanding
    ///
    /// Disbursements and accruals add, repayments subtract.
    pub fn signed_amount(&self) -> Money {
        if self.transaction_type.is_repayment() {
            -self.amount
        } else {
            self.amount
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_direction() {
        for t in TransactionType::ALL {
            let expected = match t.loan_type() {
                LoanType::Given => [
                    TransactionType::LoanGiven,
                    TransactionType::LoanRepayment,
                    TransactionType::InterestReceived,
                ],
                LoanType::Taken => [
                    TransactionType::LoanTaken,
                    TransactionType::LoanPayment,
                    TransactionType::InterestPaid,
                ],
            };
            assert!(expected.contains(&t));
        }
    }

    #[test]
    fn test_type_codes() {
        for t in TransactionType::ALL {
            assert_eq!(t.as_str().parse::<TransactionType>().unwrap(), t);
        }
        assert!("Refund".parse::<TransactionType>().is_err());
        assert_eq!("Cheque".parse::<PaymentMode>().unwrap(), PaymentMode::Cheque);
    }

    #[test]
    fn test_each_type_has_one_kind() {
        for t in TransactionType::ALL {
            let kinds = [t.is_disbursement(), t.is_repayment(), t.is_interest()];
            assert_eq!(kinds.iter().filter(|k| **k).count(), 1);
        }
    }
}
