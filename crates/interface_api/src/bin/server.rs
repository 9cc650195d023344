//! Factory Ledger - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin ledger-api
//!
//! API_PORT=8080 API_DATABASE_URL=postgres://... API_TIMEZONE=Asia/Kolkata cargo run --bin ledger-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `API_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `API_TIMEZONE` - IANA zone of the business day (default: UTC)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{HealthCheckable, SystemClock};
use domain_lending::LoanAccountingEngine;
use infra_db::{create_pool, run_migrations, DatabaseConfig, PgLendingStore, PgPartyDirectory};
use interface_api::{config::ApiConfig, create_router, AppState};

/// Loads configuration, connects and migrates the database, then serves
/// until Ctrl+C or SIGTERM.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    init_tracing(&config.log_level);

    let timezone = config.business_timezone()?;
    tracing::info!(
        host = %config.host,
        port = %config.port,
        timezone = %config.timezone,
        "Starting Factory Ledger API Server"
    );

    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone()).max_connections(config.db_max_connections),
    )
    .await?;
    run_migrations(&pool).await?;

    let store = Arc::new(PgLendingStore::new(pool.clone()));
    let parties = Arc::new(PgPartyDirectory::new(pool));
    let engine = Arc::new(LoanAccountingEngine::new(
        store.clone(),
        parties.clone(),
        Arc::new(SystemClock::new(timezone)),
    ));
    let probes: Vec<Arc<dyn HealthCheckable>> = vec![store, parties];

    let addr: SocketAddr = config.server_addr().parse()?;
    let app = create_router(AppState::new(engine, probes, config));

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
