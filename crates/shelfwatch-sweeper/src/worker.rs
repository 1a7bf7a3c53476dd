//! Background worker for scheduled alert passes

use crate::{unix_now, AlertSweeper, PassReport, SweeperConfig, SweeperError, SweeperMetrics};
use shelfwatch_domain::traits::{ItemStore, NotificationSink, RecipientDirectory};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tokio::time::{interval, Duration};

/// Background worker that runs alert passes on a schedule
///
/// Each tick runs one pass against wall-clock time. Running more often than
/// daily is harmless: the checkpoint policy suppresses repeats.
///
/// # Examples
///
/// ```no_run
/// use shelfwatch_sweeper::{SweeperWorker, SweeperConfig};
/// use shelfwatch_store::SqliteStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = SqliteStore::new("shelfwatch.db")?;
///     let mut worker = SweeperWorker::new(SweeperConfig::default());
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run(store).await?;
///     Ok(())
/// }
/// ```
pub struct SweeperWorker {
    sweeper: Arc<Mutex<AlertSweeper>>,
    interval: Duration,
}

impl SweeperWorker {
    /// Create a new background worker with the given configuration
    pub fn new(config: SweeperConfig) -> Self {
        let interval = config.sweep_interval();
        Self {
            sweeper: Arc::new(Mutex::new(AlertSweeper::new(config))),
            interval,
        }
    }

    /// Create a worker with default configuration
    pub fn default_config() -> Self {
        Self::new(SweeperConfig::default())
    }

    /// Run the worker until a shutdown signal (Ctrl+C) is received
    ///
    /// A failed pass is logged and retried on the next tick.
    pub async fn run<S>(&mut self, store: S) -> Result<(), SweeperError>
    where
        S: ItemStore + NotificationSink + RecipientDirectory + Send + 'static,
        <S as ItemStore>::Error: Display,
        <S as NotificationSink>::Error: Display,
        <S as RecipientDirectory>::Error: Display,
    {
        self.validate()?;
        let store = Arc::new(Mutex::new(store));
        let mut ticker = interval(self.interval);

        tracing::info!("Sweeper worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_blocking(&store).await {
                        tracing::error!("Alert pass failed: {}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping sweeper");
                    break;
                }
            }
        }

        tracing::info!("Sweeper stopped. Final metrics:\n{}", self.metrics().summary());

        Ok(())
    }

    /// Run for a specific number of cycles (useful for testing)
    ///
    /// Unlike [`SweeperWorker::run`], the first failed pass stops the worker.
    pub async fn run_cycles<S>(&mut self, store: S, cycles: usize) -> Result<(), SweeperError>
    where
        S: ItemStore + NotificationSink + RecipientDirectory + Send + 'static,
        <S as ItemStore>::Error: Display,
        <S as NotificationSink>::Error: Display,
        <S as RecipientDirectory>::Error: Display,
    {
        self.validate()?;
        let store = Arc::new(Mutex::new(store));
        let mut ticker = interval(self.interval);

        tracing::info!("Sweeper worker started for {} cycles (interval: {:?})", cycles, self.interval);

        for cycle in 0..cycles {
            ticker.tick().await;

            match self.sweep_blocking(&store).await {
                Ok(report) => {
                    tracing::debug!("Pass {}/{}: {}", cycle + 1, cycles, report.summary());
                }
                Err(e) => {
                    tracing::error!("Pass {}/{} failed: {}", cycle + 1, cycles, e);
                    return Err(e);
                }
            }
        }

        tracing::info!("Sweeper finished {} cycles. Final metrics:\n{}", cycles, self.metrics().summary());

        Ok(())
    }

    /// Snapshot of the sweeper's current metrics
    pub fn metrics(&self) -> SweeperMetrics {
        match self.sweeper.lock() {
            Ok(sweeper) => sweeper.metrics().clone(),
            Err(poisoned) => poisoned.into_inner().metrics().clone(),
        }
    }

    /// Reset the sweeper's metrics counters
    pub fn reset_metrics(&mut self) {
        match self.sweeper.lock() {
            Ok(mut sweeper) => sweeper.reset_metrics(),
            Err(poisoned) => poisoned.into_inner().reset_metrics(),
        }
    }

    fn validate(&self) -> Result<(), SweeperError> {
        self.sweeper
            .lock()
            .map_err(|_| SweeperError::Worker("sweeper lock poisoned".to_string()))?
            .config()
            .validate()
    }

    /// One pass on the blocking pool; SQLite calls must not stall the runtime
    async fn sweep_blocking<S>(&self, store: &Arc<Mutex<S>>) -> Result<PassReport, SweeperError>
    where
        S: ItemStore + NotificationSink + RecipientDirectory + Send + 'static,
        <S as ItemStore>::Error: Display,
        <S as NotificationSink>::Error: Display,
        <S as RecipientDirectory>::Error: Display,
    {
        let store = Arc::clone(store);
        let sweeper = Arc::clone(&self.sweeper);

        tokio::task::spawn_blocking(move || {
            let store = store
                .lock()
                .map_err(|_| SweeperError::Worker("store lock poisoned".to_string()))?;
            let mut sweeper = sweeper
                .lock()
                .map_err(|_| SweeperError::Worker("sweeper lock poisoned".to_string()))?;
            sweeper.sweep(&*store, &*store, &*store, unix_now())
        })
        .await
        .map_err(|e| SweeperError::Worker(e.to_string()))?
    }
}
