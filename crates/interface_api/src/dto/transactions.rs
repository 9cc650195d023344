//! Ledger entry DTOs

use chrono::NaiveDate;
use serde::Deserialize;

use core_kernel::{LoanAccountId, PartyId, Timezone};
use domain_lending::{FinancialTransaction, TransactionType};

/// Filters of `GET /transactions`, combined with AND
///
/// `from` and `to` are inclusive business dates.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    pub loan_id: Option<LoanAccountId>,
    pub party_id: Option<PartyId>,
    pub transaction_type: Option<TransactionType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TransactionListQuery {
    pub fn is_empty(&self) -> bool {
        self.loan_id.is_none()
            && self.party_id.is_none()
            && self.transaction_type.is_none()
            && self.from.is_none()
            && self.to.is_none()
    }

    pub fn matches(&self, entry: &FinancialTransaction, timezone: &Timezone) -> bool {
        let date = timezone.local_date(entry.transaction_date);
        self.loan_id.map_or(true, |id| entry.linked_loan_account_id == id)
            && self.party_id.map_or(true, |p| entry.party_id == p)
            && self.transaction_type.map_or(true, |t| entry.transaction_type == t)
            && self.from.map_or(true, |from| date >= from)
            && self.to.map_or(true, |to| date <= to)
    }
}
