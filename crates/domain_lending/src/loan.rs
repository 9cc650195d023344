//! Loan account aggregate
//!
//! A loan account is one lending (`Given`) or borrowing (`Taken`)
//! relationship with a party. Its four balance fields move only through
//! `apply_payment` and `apply_accrual`, and `Status` is always recomputed
//! from them rather than set directly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{LoanAccountId, Money, PartyId, Rate, UserId};
use crate::error::LendingError;
use crate::interest::{allocate_payment, PaymentAllocation};
use crate::transaction::{FinancialTransaction, TransactionType};

/// Direction of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanType {
    /// Money lent out to the party
    Given,
    /// Money borrowed from the party
    Taken,
}

impl LoanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Given => "Given",
            LoanType::Taken => "Taken",
        }
    }

    /// Ledger entry type posted when the loan is opened
    pub fn disbursement_type(&self) -> TransactionType {
        match self {
            LoanType::Given => TransactionType::LoanGiven,
            LoanType::Taken => TransactionType::LoanTaken,
        }
    }

    /// Ledger entry type posted for a repayment
    pub fn repayment_type(&self) -> TransactionType {
        match self {
            LoanType::Given => TransactionType::LoanRepayment,
            LoanType::Taken => TransactionType::LoanPayment,
        }
    }

    /// Ledger entry type posted for an interest accrual
    pub fn interest_type(&self) -> TransactionType {
        match self {
            LoanType::Given => TransactionType::InterestReceived,
            LoanType::Taken => TransactionType::InterestPaid,
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanType {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Given" => Ok(LoanType::Given),
            "Taken" => Ok(LoanType::Taken),
            other => Err(LendingError::invalid_argument(format!("unknown loan type '{}'", other))),
        }
    }
}

/// Loan status, derived from the balances and the due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoanStatus {
    /// Opened, nothing repaid below the original amount yet
    Active,
    /// At least one payment applied, balance still owed
    PartiallyPaid,
    /// Fully settled; terminal
    Closed,
    /// Past the due date with balance owed; payments and accruals still apply
    Overdue,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "Active",
            LoanStatus::PartiallyPaid => "PartiallyPaid",
            LoanStatus::Closed => "Closed",
            LoanStatus::Overdue => "Overdue",
        }
    }

    /// Returns true for every status that still carries a balance
    pub fn is_open(&self) -> bool {
        !matches!(self, LoanStatus::Closed)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(LoanStatus::Active),
            "PartiallyPaid" => Ok(LoanStatus::PartiallyPaid),
            "Closed" => Ok(LoanStatus::Closed),
            "Overdue" => Ok(LoanStatus::Overdue),
            other => Err(LendingError::invalid_argument(format!("unknown loan status '{}'", other))),
        }
    }
}

/// A loan account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAccount {
    pub id: LoanAccountId,
    /// Counter-party; fixed at creation
    pub party_id: PartyId,
    pub loan_type: LoanType,
    pub original_amount: Money,
    /// Simple interest, percent per annum
    pub interest_rate: Rate,
    pub start_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub outstanding_principal: Money,
    pub outstanding_interest: Money,
    /// Always `outstanding_principal + outstanding_interest`
    pub total_outstanding: Money,
    pub status: LoanStatus,
    pub created_by: UserId,
    pub notes: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: Option<DateTime<Utc>>,
    /// Row version for optimistic concurrency; 0 until first stored
    pub version: i64,
}

impl LoanAccount {
    /// Opens a new loan with the full original amount outstanding
    ///
    /// # Arguments
    ///
    /// * `party_id` - The counter-party
    /// * `loan_type` - Given or Taken
    /// * `original_amount` - Must be positive
    /// * `interest_rate` - Percent per annum
    /// * `start_date` - Interest accrues from the start of this day
    /// * `created_by` - Audit user
    /// * `now` - Creation instant
    ///
    /// # Errors
    ///
    /// Returns `LendingError::InvalidArgument` for a non-positive amount
    pub fn open(
        party_id: PartyId,
        loan_type: LoanType,
        original_amount: Money,
        interest_rate: Rate,
        start_date: NaiveDate,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, LendingError> {
        if !original_amount.is_positive() {
            return Err(LendingError::invalid_argument(format!(
                "original amount must be greater than zero, got {}",
                original_amount
            )));
        }

        Ok(Self {
            id: LoanAccountId::new_v7(),
            party_id,
            loan_type,
            original_amount,
            interest_rate,
            start_date,
            due_date: None,
            outstanding_principal: original_amount,
            outstanding_interest: Money::ZERO,
            total_outstanding: original_amount,
            status: LoanStatus::Active,
            created_by,
            notes: None,
            created_date: now,
            modified_date: None,
            version: 0,
        })
    }

    /// Sets the due date
    ///
    /// # Errors
    ///
    /// Returns `LendingError::InvalidArgument` if the due date precedes the start date
    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Result<Self, LendingError> {
        if let Some(due) = due_date {
            if due < self.start_date {
                return Err(LendingError::invalid_argument(format!(
                    "due date {} is before start date {}",
                    due, self.start_date
                )));
            }
        }
        self.due_date = due_date;
        Ok(self)
    }

    /// Sets the notes
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.status == LoanStatus::Closed
    }

    /// Derives the status the balances and due date call for on `today`
    ///
    /// Checked in order: Closed, Overdue, PartiallyPaid, Active. Principal
    /// only ever decreases, so a loan that has repaid any principal never
    /// returns to Active when later interest lifts the total.
    pub fn derive_status(&self, today: NaiveDate) -> LoanStatus {
        if self.total_outstanding.is_zero() {
            return LoanStatus::Closed;
        }
        if let Some(due) = self.due_date {
            if due < today && self.total_outstanding.is_positive() {
                return LoanStatus::Overdue;
            }
        }
        if self.outstanding_principal < self.original_amount
            || self.total_outstanding < self.original_amount
        {
            return LoanStatus::PartiallyPaid;
        }
        LoanStatus::Active
    }

    /// Re-derives the status; returns true if it changed
    pub fn refresh_status(&mut self, today: NaiveDate) -> bool {
        let derived = self.derive_status(today);
        let changed = derived != self.status;
        self.status = derived;
        changed
    }

    /// Applies a repayment, interest first and then principal
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a non-positive amount
    /// - `InvalidState` if the loan is closed or the amount exceeds the total outstanding
    pub fn apply_payment(
        &mut self,
        amount: Money,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<PaymentAllocation, LendingError> {
        if !amount.is_positive() {
            return Err(LendingError::invalid_argument(format!(
                "payment amount must be greater than zero, got {}",
                amount
            )));
        }
        if self.is_closed() {
            return Err(LendingError::invalid_state(format!(
                "loan {} is closed",
                self.id
            )));
        }
        if amount > self.total_outstanding {
            return Err(LendingError::invalid_state(format!(
                "payment {} exceeds total outstanding {} on loan {}",
                amount, self.total_outstanding, self.id
            )));
        }

        let allocation = allocate_payment(amount, self.outstanding_interest, self.outstanding_principal);
        self.outstanding_interest -= allocation.interest_portion;
        self.outstanding_principal -= allocation.principal_portion;
        self.recompute(today, now);
        Ok(allocation)
    }

    /// Adds accrued interest to the outstanding interest
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the loan is closed
    pub fn apply_accrual(
        &mut self,
        interest: Money,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), LendingError> {
        if self.is_closed() {
            return Err(LendingError::invalid_state(format!(
                "loan {} is closed",
                self.id
            )));
        }
        if interest.is_negative() {
            return Err(LendingError::invalid_argument(format!(
                "accrued interest cannot be negative, got {}",
                interest
            )));
        }
        self.outstanding_interest += interest;
        self.recompute(today, now);
        Ok(())
    }

    /// Marks the row as modified at `now`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.modified_date = Some(now);
    }

    fn recompute(&mut self, today: NaiveDate, now: DateTime<Utc>) {
        self.total_outstanding = self.outstanding_principal + self.outstanding_interest;
        self.status = self.derive_status(today);
        self.touch(now);
    }
}

/// A loan together with its ledger entries, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanWithTransactions {
    pub loan: LoanAccount,
    pub transactions: Vec<FinancialTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
    }

    fn loan(amount: Money) -> LoanAccount {
        LoanAccount::open(
            PartyId::new(),
            LoanType::Given,
            amount,
            Rate::from_percentage(dec!(12)).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            UserId::new(1).unwrap(),
            now(),
        )
        .unwrap()
    }

    #[test]
    fn test_open_sets_balances() {
        let loan = loan(Money::new(dec!(100000)));
        assert_eq!(loan.outstanding_principal.amount(), dec!(100000));
        assert_eq!(loan.outstanding_interest, Money::ZERO);
        assert_eq!(loan.total_outstanding.amount(), dec!(100000));
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.version, 0);
    }

    #[test]
    fn test_open_rejects_zero_amount() {
        let result = LoanAccount::open(
            PartyId::new(),
            LoanType::Taken,
            Money::ZERO,
            Rate::ZERO,
            today(),
            UserId::new(1).unwrap(),
            now(),
        );
        assert!(matches!(result, Err(LendingError::InvalidArgument(_))));
    }

    #[test]
    fn test_due_date_before_start_rejected() {
        let result = loan(Money::new(dec!(10))).with_due_date(NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(matches!(result, Err(LendingError::InvalidArgument(_))));
    }

    #[test]
    fn test_payment_goes_to_interest_first() {
        let mut loan = loan(Money::new(dec!(1000)));
        loan.apply_accrual(Money::new(dec!(50)), today(), now()).unwrap();

        let allocation = loan.apply_payment(Money::new(dec!(80)), today(), now()).unwrap();
        assert_eq!(allocation.interest_portion.amount(), dec!(50));
        assert_eq!(allocation.principal_portion.amount(), dec!(30));
        assert_eq!(loan.outstanding_interest, Money::ZERO);
        assert_eq!(loan.outstanding_principal.amount(), dec!(970));
        assert_eq!(loan.total_outstanding.amount(), dec!(970));
        assert_eq!(loan.status, LoanStatus::PartiallyPaid);
    }

    #[test]
    fn test_exact_payment_closes() {
        let mut loan = loan(Money::new(dec!(500)));
        loan.apply_payment(Money::new(dec!(500)), today(), now()).unwrap();
        assert!(loan.total_outstanding.is_zero());
        assert_eq!(loan.status, LoanStatus::Closed);

        let again = loan.apply_payment(Money::new(dec!(1)), today(), now());
        assert!(matches!(again, Err(LendingError::InvalidState(_))));
    }

    #[test]
    fn test_overpayment_rejected_without_change() {
        let mut loan = loan(Money::new(dec!(500)));
        let before = loan.clone();
        let result = loan.apply_payment(Money::new(dec!(500.01)), today(), now());
        assert!(matches!(result, Err(LendingError::InvalidState(_))));
        assert_eq!(loan, before);
    }

    #[test]
    fn test_status_derivation_order() {
        let mut loan = loan(Money::new(dec!(1000)))
            .with_due_date(NaiveDate::from_ymd_opt(2024, 6, 1))
            .unwrap();
        assert_eq!(loan.derive_status(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()), LoanStatus::Active);
        assert_eq!(loan.derive_status(today()), LoanStatus::Overdue);

        loan.apply_payment(Money::new(dec!(1000)), today(), now()).unwrap();
        assert_eq!(loan.derive_status(today()), LoanStatus::Closed);
    }

    #[test]
    fn test_accrual_above_original_stays_active() {
        let mut loan = loan(Money::new(dec!(1000)));
        loan.apply_accrual(Money::new(dec!(10)), today(), now()).unwrap();
        loan.apply_payment(Money::new(dec!(5)), today(), now()).unwrap();
        assert_eq!(loan.total_outstanding.amount(), dec!(1005));
        assert_eq!(loan.status, LoanStatus::Active);
    }

    #[test]
    fn test_accrual_after_principal_payment_stays_partially_paid() {
        let mut loan = loan(Money::new(dec!(1000)));
        loan.apply_payment(Money::new(dec!(5)), today(), now()).unwrap();
        assert_eq!(loan.status, LoanStatus::PartiallyPaid);

        loan.apply_accrual(Money::new(dec!(9.95)), today(), now()).unwrap();
        assert_eq!(loan.total_outstanding.amount(), dec!(1004.95));
        assert_eq!(loan.status, LoanStatus::PartiallyPaid);
    }

    #[test]
    fn test_codes_parse_back() {
        for status in [LoanStatus::Active, LoanStatus::PartiallyPaid, LoanStatus::Closed, LoanStatus::Overdue] {
            assert_eq!(status.as_str().parse::<LoanStatus>().unwrap(), status);
        }
        assert_eq!("Taken".parse::<LoanType>().unwrap(), LoanType::Taken);
        assert!("Lent".parse::<LoanType>().is_err());
    }
}
