//! HTTP API Layer
//!
//! REST API for the loan ledger using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: thin wrappers over `LoanAccountingEngine`
//! - **Middleware**: JWT authentication and audit logging
//! - **DTOs**: request bodies and query strings
//! - **Error Handling**: `LendingError` mapped onto status codes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(engine, probes, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_lending::LoanAccountingEngine;

use crate::config::ApiConfig;
use crate::handlers::{health, loans, transactions};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LoanAccountingEngine>,
    /// Adapters polled by the readiness check
    pub probes: Vec<Arc<dyn HealthCheckable>>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(
        engine: Arc<LoanAccountingEngine>,
        probes: Vec<Arc<dyn HealthCheckable>>,
        config: ApiConfig,
    ) -> Self {
        Self {
            engine,
            probes,
            config,
        }
    }
}

/// Creates the main API router
///
/// `/health` and `/health/ready` are public; everything under `/api/v1`
/// needs a bearer token.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let loan_routes = Router::new()
        .route("/", post(loans::create_loan).get(loans::list_loans))
        .route("/summary", get(loans::outstanding_summary))
        .route("/outstanding", get(loans::total_outstanding))
        .route("/refresh-status", post(loans::refresh_statuses))
        .route("/:id", get(loans::get_loan))
        .route("/:id/transactions", get(loans::get_loan_transactions))
        .route("/:id/payments", post(loans::record_payment))
        .route("/:id/interest", post(loans::accrue_interest));

    let transaction_routes = Router::new().route("/", get(transactions::list_transactions));

    // Layers run bottom-up: auth first, so audit sees the claims
    let api_routes = Router::new()
        .nest("/loans", loan_routes)
        .nest("/transactions", transaction_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
