//! Loan handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::LoanAccountId;
use domain_lending::{
    AccrualOutcome, FinancialTransaction, LoanAccount, LoanQuery, LoanWithTransactions,
    OutstandingSummary,
};

use crate::auth::{permissions, Claims};
use crate::dto::loans::*;
use crate::{error::ApiError, AppState};

/// Opens a loan and posts its disbursement
pub async fn create_loan(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateLoanBody>,
) -> Result<(StatusCode, Json<LoanAccount>), ApiError> {
    claims.require(permissions::LOAN_WRITE)?;
    body.validate()?;

    let loan = state
        .engine
        .create_loan(body.into_request(claims.user_id()?))
        .await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Lists loans, newest first
pub async fn list_loans(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<LoanListQuery>,
) -> Result<Json<Vec<LoanAccount>>, ApiError> {
    claims.require(permissions::LOAN_READ)?;

    let query = LoanQuery::from(query);
    let engine = &state.engine;
    let loans = match (query.party_id, query.loan_type, query.status) {
        (Some(party_id), _, _) => engine.get_loans_by_party(party_id).await?,
        (None, Some(loan_type), _) => engine.get_loans_by_type(loan_type).await?,
        (None, None, Some(status)) => engine.get_loans_by_status(status).await?,
        (None, None, None) => engine.get_all_loans().await?,
    };

    Ok(Json(loans.into_iter().filter(|l| query.matches(l)).collect()))
}

pub async fn get_loan(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<LoanAccountId>,
) -> Result<Json<LoanAccount>, ApiError> {
    claims.require(permissions::LOAN_READ)?;
    Ok(Json(state.engine.get_loan(id).await?))
}

/// The loan together with its ledger entries, newest first
pub async fn get_loan_transactions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<LoanAccountId>,
) -> Result<Json<LoanWithTransactions>, ApiError> {
    claims.require(permissions::LOAN_READ)?;
    Ok(Json(state.engine.get_loan_with_transactions(id).await?))
}

/// Applies a repayment, interest first
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<LoanAccountId>,
    Json(body): Json<RecordPaymentBody>,
) -> Result<(StatusCode, Json<FinancialTransaction>), ApiError> {
    claims.require(permissions::LOAN_WRITE)?;
    body.validate()?;

    let entry = state
        .engine
        .record_payment(body.into_request(id, claims.user_id()?))
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Accrues interest up to now; `entry` is null when nothing was due
pub async fn accrue_interest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<LoanAccountId>,
) -> Result<Json<AccrualOutcome>, ApiError> {
    claims.require(permissions::LOAN_WRITE)?;
    Ok(Json(state.engine.update_loan_interest(id).await?))
}

pub async fn refresh_statuses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<RefreshResponse>, ApiError> {
    claims.require(permissions::LOAN_WRITE)?;
    let updated = state.engine.refresh_statuses().await?;
    Ok(Json(RefreshResponse { updated }))
}

pub async fn outstanding_summary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<OutstandingSummary>, ApiError> {
    claims.require(permissions::LOAN_READ)?;
    Ok(Json(state.engine.get_outstanding_summary().await?))
}

/// Sum of `total_outstanding` over the open loans of one type
pub async fn total_outstanding(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<OutstandingQuery>,
) -> Result<Json<TotalOutstandingResponse>, ApiError> {
    claims.require(permissions::LOAN_READ)?;
    let total_outstanding = state
        .engine
        .get_total_outstanding_by_type(query.loan_type)
        .await?;
    Ok(Json(TotalOutstandingResponse {
        loan_type: query.loan_type,
        total_outstanding,
    }))
}
