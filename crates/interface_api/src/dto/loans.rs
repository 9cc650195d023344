//! Loan DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{LoanAccountId, Money, PartyId, UserId};
use domain_lending::{CreateLoanRequest, LoanQuery, LoanStatus, LoanType, PaymentMode, RecordPaymentRequest};

fn default_payment_mode() -> PaymentMode {
    PaymentMode::Cash
}

/// Body of `POST /loans`; the creating user comes from the token
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLoanBody {
    pub party_id: PartyId,
    pub loan_type: LoanType,
    pub original_amount: Decimal,
    /// Percent per annum
    pub interest_rate: Decimal,
    pub start_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    #[serde(default = "default_payment_mode")]
    pub payment_mode: PaymentMode,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl CreateLoanBody {
    pub fn into_request(self, created_by: UserId) -> CreateLoanRequest {
        CreateLoanRequest {
            party_id: self.party_id,
            loan_type: self.loan_type,
            original_amount: self.original_amount,
            interest_rate: self.interest_rate,
            start_date: self.start_date,
            due_date: self.due_date,
            created_by,
            payment_mode: self.payment_mode,
            notes: self.notes,
        }
    }
}

/// Body of `POST /loans/:id/payments`
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentBody {
    pub amount: Decimal,
    #[serde(default = "default_payment_mode")]
    pub payment_mode: PaymentMode,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl RecordPaymentBody {
    pub fn into_request(self, loan_id: LoanAccountId, entered_by: UserId) -> RecordPaymentRequest {
        RecordPaymentRequest {
            loan_id,
            amount: self.amount,
            payment_mode: self.payment_mode,
            entered_by,
            notes: self.notes,
        }
    }
}

/// Filters of `GET /loans`; all optional and combined with AND
#[derive(Debug, Default, Deserialize)]
pub struct LoanListQuery {
    pub party_id: Option<PartyId>,
    pub loan_type: Option<LoanType>,
    pub status: Option<LoanStatus>,
}

impl From<LoanListQuery> for LoanQuery {
    fn from(query: LoanListQuery) -> Self {
        LoanQuery {
            party_id: query.party_id,
            loan_type: query.loan_type,
            status: query.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutstandingQuery {
    pub loan_type: LoanType,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TotalOutstandingResponse {
    pub loan_type: LoanType,
    pub total_outstanding: Money,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub updated: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_body_defaults_to_cash() {
        let body: CreateLoanBody = serde_json::from_value(json!({
            "party_id": PartyId::new(),
            "loan_type": "Given",
            "original_amount": "100000",
            "interest_rate": "12",
            "start_date": "2024-05-15",
            "due_date": null
        }))
        .unwrap();
        assert_eq!(body.payment_mode, PaymentMode::Cash);
        assert!(body.validate().is_ok());

        let request = body.into_request(UserId::new(9).unwrap());
        assert_eq!(request.created_by.value(), 9);
    }

    #[test]
    fn test_long_notes_rejected() {
        let body = RecordPaymentBody {
            amount: Decimal::ONE,
            payment_mode: PaymentMode::Bank,
            notes: Some("x".repeat(501)),
        };
        assert!(body.validate().is_err());
    }
}
