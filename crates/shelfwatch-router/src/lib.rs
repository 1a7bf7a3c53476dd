//! Shelfwatch Router
//!
//! HTTP trigger surface for the inventory aging alert pass. An external
//! scheduler (cron, a load balancer health job, an operator) calls
//! `POST /alerts/run`; repeated calls never duplicate alerts.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::RouterConfig;
use handlers::{create_router, AppState};
use shelfwatch_store::{SqliteStore, StoreError};
use shelfwatch_sweeper::{unix_now, AlertSweeper, PassReport, SweeperError, SweeperWorker};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Router error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Alert pass could not run
    #[error("Sweeper error: {0}")]
    Sweeper(#[from] SweeperError),

    /// Report could not be rendered
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Run a single alert pass against the configured database
///
/// Used for cron-style invocation without a long-running server.
pub fn run_once(config: &RouterConfig) -> Result<PassReport, RouterError> {
    let store = SqliteStore::new(&config.database_path)?;
    let mut sweeper = AlertSweeper::new(config.sweeper.clone());
    let report = sweeper.sweep(&store, &store, &store, unix_now())?;
    Ok(report)
}

/// Start the router HTTP server
///
/// Opens the store, optionally spawns the background worker on its own
/// connection, and serves until Ctrl+C.
pub async fn start_server(config: RouterConfig) -> Result<(), RouterError> {
    info!("Starting Shelfwatch Router");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);

    let store = SqliteStore::new(&config.database_path)?;
    let state = AppState::new(store, AlertSweeper::new(config.sweeper.clone()));

    if config.run_worker {
        if config.is_in_memory() {
            warn!("run_worker ignored: an in-memory database cannot be shared with the worker");
        } else {
            let worker_store = SqliteStore::new(&config.database_path)?;
            let mut worker = SweeperWorker::new(config.sweeper.clone());
            tokio::spawn(async move {
                if let Err(e) = worker.run(worker_store).await {
                    tracing::error!("Sweeper worker stopped: {}", e);
                }
            });
        }
    }

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Router listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    Ok(())
}
