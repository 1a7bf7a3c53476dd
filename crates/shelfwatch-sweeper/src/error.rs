//! Error types for sweeper operations

use thiserror::Error;

/// Errors that abort a whole sweep
///
/// Per-item problems never surface here; they are collected in the
/// [`crate::PassReport`].
#[derive(Error, Debug)]
pub enum SweeperError {
    /// Storage layer could not supply candidates
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}
