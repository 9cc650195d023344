//! PostgreSQL ledger store tests
//!
//! Run the loan accounting engine against `PgLendingStore` and
//! `PgPartyDirectory` in a throwaway Postgres container.
//!
//! ```text
//! cargo test -p test_utils --test postgres_store_tests -- --ignored
//! ```

use chrono::Duration;
use rust_decimal_macros::dec;
use std::sync::Arc;

use core_kernel::{Clock, HealthCheckable, AdapterHealth};
use domain_lending::{
    LedgerCommit, LedgerUnitOfWork, LendingError, LoanAccountRepository, LoanAccountingEngine,
    LoanStatus, TransactionType,
};
use domain_party::PartyDirectory;
use infra_db::{PgLendingStore, PgPartyDirectory};
use test_utils::{
    assert_loan_invariants, assert_money_eq, LoanRequestBuilder, PartyFixtures,
    PaymentRequestBuilder, TemporalFixtures, TestDatabase,
};

struct PgHarness {
    _db: TestDatabase,
    engine: LoanAccountingEngine,
    store: Arc<PgLendingStore>,
    parties: Arc<PgPartyDirectory>,
    clock: Arc<core_kernel::FixedClock>,
}

async fn harness() -> PgHarness {
    let db = TestDatabase::start().await.expect("postgres container should start");
    let store = Arc::new(PgLendingStore::new(db.pool().clone()));
    let parties = Arc::new(PgPartyDirectory::new(db.pool().clone()));
    let clock = Arc::new(TemporalFixtures::clock());
    let engine = LoanAccountingEngine::new(store.clone(), parties.clone(), clock.clone());
    PgHarness {
        _db: db,
        engine,
        store,
        parties,
        clock,
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_health_checks_report_healthy() {
    let h = harness().await;
    assert_eq!(h.store.health_check().await.status, AdapterHealth::Healthy);
    assert_eq!(h.parties.health_check().await.status, AdapterHealth::Healthy);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_party_directory_round_trip() {
    let h = harness().await;
    let party = PartyFixtures::customer();
    h.parties.register(&party).await.unwrap();

    assert!(h.parties.party_exists(party.id).await.unwrap());
    let stored = h.parties.get_party(party.id).await.unwrap();
    assert_eq!(stored.name, party.name);

    let missing = h.parties.get_party(core_kernel::PartyId::new()).await.unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_full_loan_lifecycle() {
    let h = harness().await;
    let party = PartyFixtures::customer();
    h.parties.register(&party).await.unwrap();

    let loan = h
        .engine
        .create_loan(
            LoanRequestBuilder::new(party.id)
                .start_date(TemporalFixtures::month_ago())
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(loan.version, 1);

    let outcome = h.engine.update_loan_interest(loan.id).await.unwrap();
    assert_money_eq(&outcome.loan.outstanding_interest, dec!(1000.00));
    assert!(!h.engine.update_loan_interest(loan.id).await.unwrap().posted());

    h.clock.advance(Duration::days(3));
    h.engine
        .record_payment(PaymentRequestBuilder::new(loan.id, dec!(26000)).build())
        .await
        .unwrap();

    let view = h.engine.get_loan_with_transactions(loan.id).await.unwrap();
    assert_eq!(view.loan.status, LoanStatus::PartiallyPaid);
    assert_money_eq(&view.loan.total_outstanding, dec!(75000.00));
    assert_eq!(view.transactions.len(), 3);
    assert_eq!(view.transactions[0].transaction_type, TransactionType::LoanRepayment);
    assert_loan_invariants(&view.loan, &view.transactions);

    let again = h.engine.get_loan_with_transactions(loan.id).await.unwrap();
    assert_eq!(again, view);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_stale_version_is_rejected_atomically() {
    let h = harness().await;
    let party = PartyFixtures::supplier();
    h.parties.register(&party).await.unwrap();
    let loan = h
        .engine
        .create_loan(LoanRequestBuilder::new(party.id).taken().amount(dec!(500)).build())
        .await
        .unwrap();

    // Two writers read version 1; the second commit must lose
    h.engine
        .record_payment(PaymentRequestBuilder::new(loan.id, dec!(100)).build())
        .await
        .unwrap();

    let mut stale = loan.clone();
    stale.touch(h.clock.now());
    let entry = domain_lending::FinancialTransaction::repayment(
        &stale,
        &party.name,
        core_kernel::Money::new(dec!(50)),
        domain_lending::PaymentMode::Cash,
        PartyFixtures::user(),
        h.clock.now(),
    );
    let err = h
        .store
        .commit(LedgerCommit::update(stale, loan.version, vec![entry]))
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let stored = h.store.get_loan(loan.id).await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
    assert_money_eq(&stored.total_outstanding, dec!(400.00));
    assert_eq!(h.engine.get_transactions_by_loan(loan.id).await.unwrap().len(), 2);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_queries_and_summary() {
    let h = harness().await;
    let customer = PartyFixtures::customer();
    let supplier = PartyFixtures::supplier();
    h.parties.register(&customer).await.unwrap();
    h.parties.register(&supplier).await.unwrap();

    h.engine
        .create_loan(LoanRequestBuilder::new(customer.id).amount(dec!(1000)).build())
        .await
        .unwrap();
    h.engine
        .create_loan(
            LoanRequestBuilder::new(supplier.id)
                .taken()
                .amount(dec!(300))
                .due_date(TemporalFixtures::today() + Duration::days(1))
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(h.engine.get_loans_by_party(customer.id).await.unwrap().len(), 1);
    assert_eq!(h.engine.get_all_loans().await.unwrap().len(), 2);

    h.clock.advance(Duration::days(5));
    assert_eq!(h.engine.refresh_statuses().await.unwrap(), 1);

    let summary = h.engine.get_outstanding_summary().await.unwrap();
    assert_money_eq(&summary.total_given, dec!(1000.00));
    assert_money_eq(&summary.total_taken, dec!(300.00));
    assert_eq!(summary.overdue_count, 1);

    let today = h.clock.today();
    let entries = h
        .engine
        .get_transactions_by_date_range(today - Duration::days(5), today)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_unknown_party_writes_nothing() {
    let h = harness().await;
    let err = h
        .engine
        .create_loan(LoanRequestBuilder::new(core_kernel::PartyId::new()).build())
        .await
        .unwrap_err();
    assert!(matches!(err, LendingError::NotFound { .. }));
    assert!(h.engine.get_all_loans().await.unwrap().is_empty());
}
