//! Ledger entry handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use domain_lending::FinancialTransaction;

use crate::auth::{permissions, Claims};
use crate::dto::transactions::TransactionListQuery;
use crate::{error::ApiError, AppState};

/// Lists ledger entries, newest first
///
/// At least one filter is required. A date window alone needs both `from`
/// and `to`.
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<FinancialTransaction>>, ApiError> {
    claims.require(permissions::LOAN_READ)?;
    if query.is_empty() {
        return Err(ApiError::BadRequest(
            "at least one of loan_id, party_id, transaction_type or from/to is required".to_string(),
        ));
    }

    let engine = &state.engine;
    let entries = match (query.loan_id, query.party_id, query.transaction_type, query.from, query.to) {
        (Some(loan_id), ..) => engine.get_transactions_by_loan(loan_id).await?,
        (None, Some(party_id), ..) => engine.get_transactions_by_party(party_id).await?,
        (None, None, Some(transaction_type), ..) => {
            engine.get_transactions_by_type(transaction_type).await?
        }
        (None, None, None, Some(from), Some(to)) => {
            engine.get_transactions_by_date_range(from, to).await?
        }
        _ => {
            return Err(ApiError::BadRequest(
                "a date window needs both from and to".to_string(),
            ))
        }
    };

    let timezone = engine.clock().timezone();
    Ok(Json(
        entries
            .into_iter()
            .filter(|e| query.matches(e, &timezone))
            .collect(),
    ))
}
