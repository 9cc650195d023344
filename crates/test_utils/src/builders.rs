//! Test Data Builders
//!
//! Request builders with sensible defaults, so tests only name the fields
//! they care about, and `TestEngine`, an engine wired to in-memory
//! collaborators and a fixed clock.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use core_kernel::{FixedClock, LoanAccountId, PartyId, UserId};
use domain_lending::{
    CreateLoanRequest, InMemoryLendingStore, LoanAccount, LoanAccountingEngine, LoanType,
    PaymentMode, RecordPaymentRequest,
};
use domain_party::{InMemoryPartyDirectory, Party};

use crate::fixtures::{PartyFixtures, TemporalFixtures};

/// Builder for `CreateLoanRequest`
#[derive(Debug, Clone)]
pub struct LoanRequestBuilder {
    request: CreateLoanRequest,
}

impl LoanRequestBuilder {
    /// A Given loan of 100000.00 at 12% starting today
    pub fn new(party_id: PartyId) -> Self {
        Self {
            request: CreateLoanRequest {
                party_id,
                loan_type: LoanType::Given,
                original_amount: dec!(100000.00),
                interest_rate: dec!(12),
                start_date: TemporalFixtures::today(),
                due_date: None,
                created_by: PartyFixtures::user(),
                payment_mode: PaymentMode::Cash,
                notes: None,
            },
        }
    }

    pub fn given(mut self) -> Self {
        self.request.loan_type = LoanType::Given;
        self
    }

    pub fn taken(mut self) -> Self {
        self.request.loan_type = LoanType::Taken;
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.request.original_amount = amount;
        self
    }

    pub fn rate(mut self, rate: Decimal) -> Self {
        self.request.interest_rate = rate;
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.request.start_date = date;
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.request.due_date = Some(date);
        self
    }

    pub fn created_by(mut self, user: UserId) -> Self {
        self.request.created_by = user;
        self
    }

    pub fn payment_mode(mut self, mode: PaymentMode) -> Self {
        self.request.payment_mode = mode;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.request.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> CreateLoanRequest {
        self.request
    }
}

/// Builder for `RecordPaymentRequest`
#[derive(Debug, Clone)]
pub struct PaymentRequestBuilder {
    request: RecordPaymentRequest,
}

impl PaymentRequestBuilder {
    pub fn new(loan_id: LoanAccountId, amount: Decimal) -> Self {
        Self {
            request: RecordPaymentRequest {
                loan_id,
                amount,
                payment_mode: PaymentMode::Bank,
                entered_by: PartyFixtures::user(),
                notes: None,
            },
        }
    }

    pub fn payment_mode(mut self, mode: PaymentMode) -> Self {
        self.request.payment_mode = mode;
        self
    }

    pub fn entered_by(mut self, user: UserId) -> Self {
        self.request.entered_by = user;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.request.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> RecordPaymentRequest {
        self.request
    }
}

/// A loan engine over in-memory collaborators
///
/// The handles to the store, directory and clock stay available so tests
/// can inject faults and move time.
pub struct TestEngine {
    pub engine: Arc<LoanAccountingEngine>,
    pub store: Arc<InMemoryLendingStore>,
    pub parties: Arc<InMemoryPartyDirectory>,
    pub clock: Arc<FixedClock>,
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEngine {
    /// An empty ledger with the clock at `TemporalFixtures::now()`
    pub fn new() -> Self {
        let store = Arc::new(InMemoryLendingStore::new());
        let parties = Arc::new(InMemoryPartyDirectory::new());
        let clock = Arc::new(TemporalFixtures::clock());
        let engine = Arc::new(LoanAccountingEngine::new(
            store.clone(),
            parties.clone(),
            clock.clone(),
        ));
        Self {
            engine,
            store,
            parties,
            clock,
        }
    }

    /// Adds a party to the directory and returns its id
    pub async fn add_party(&self, party: Party) -> PartyId {
        let id = party.id;
        self.parties.insert(party).await;
        id
    }

    /// Adds a fresh party and opens a loan for it
    pub async fn open_loan(
        &self,
        configure: impl FnOnce(LoanRequestBuilder) -> LoanRequestBuilder,
    ) -> LoanAccount {
        let party_id = self.add_party(PartyFixtures::random()).await;
        let request = configure(LoanRequestBuilder::new(party_id)).build();
        self.engine
            .create_loan(request)
            .await
            .expect("test loan should open")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_lending::LoanStatus;

    #[test]
    fn test_loan_request_defaults() {
        let request = LoanRequestBuilder::new(PartyId::new()).taken().amount(dec!(5)).build();
        assert_eq!(request.loan_type, LoanType::Taken);
        assert_eq!(request.original_amount, dec!(5));
        assert_eq!(request.start_date, TemporalFixtures::today());
    }

    #[tokio::test]
    async fn test_engine_opens_loan() {
        let harness = TestEngine::new();
        let loan = harness.open_loan(|b| b.amount(dec!(2500))).await;
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(harness.store.entry_count().await, 1);
    }
}
