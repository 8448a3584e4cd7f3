//! # Alotrabong Coupon Sweeper
//!
//! Background process that switches off coupons whose validity window has
//! ended, so admin listings and the active-coupon index stay accurate.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Coupon Sweeper                                   │
//! │                                                                         │
//! │  env ──► SweeperConfig ──► Database (SQLite, migrations)               │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                       sweeper::run (hourly) ◄── SIGINT / SIGTERM       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checkout never depends on this process: the evaluator checks the window
//! itself, so a missed sweep only delays the admin-facing flag.

mod config;
mod error;
mod sweeper;

use alo_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{SweeperConfig, DEFAULT_LOG_FILTER};
use crate::error::SweeperError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Alotrabong coupon sweeper...");

    let config = SweeperConfig::load().map_err(SweeperError::from)?;
    info!(
        db = %config.database_path.display(),
        interval_secs = config.sweep_interval.as_secs(),
        max_connections = config.max_connections,
        "Configuration loaded"
    );

    let db_config = DbConfig::new(&config.database_path).max_connections(config.max_connections);
    let db = Database::new(db_config).await.map_err(SweeperError::from)?;
    info!("Connected to database");

    sweeper::run(&db, config.sweep_interval, shutdown_signal()).await;

    db.close().await;
    info!("Sweeper shutdown complete");
    Ok(())
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Graceful shutdown signal handler.
///
/// If a handler cannot be installed that branch never fires, and the other
/// signal still stops the sweeper.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, finishing current sweep...");
}
