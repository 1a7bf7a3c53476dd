//! Shelfwatch Sweeper
//!
//! Alert deduplication scheduler for inventory aging.
//!
//! # Overview
//!
//! A pass takes the in-stock items from the store and, for each one:
//! - **Classifies** it from its intake timestamp and the pass's `now`
//! - **Refreshes** the cached bucket and attention flag on the item
//! - **Alerts** when the item sits on a checkpoint day it has not yet been
//!   alerted for, recording the alert and creating one broadcast notification
//!
//! ## Checkpoints
//!
//! | Reason | Elapsed day | Meaning |
//! |--------|-------------|---------|
//! | `7_DAY_WARNING` | 38 | Obsolete in 7 days |
//! | `1_DAY_WARNING` | 44 | Obsolete tomorrow |
//!
//! No alert fires on entry into Obsolete (45) or Surplus (90).
//!
//! ## Failure model
//!
//! Only failing to load candidates fails a pass. Write, notification and
//! classifier-invariant failures are recorded per item in the [`PassReport`]
//! and never stop the other items. An alert whose notification could not be
//! created is released again, so the next pass on the same day retries it.
//!
//! # Configuration
//!
//! ```toml
//! [sweeper]
//! sweep_interval_minutes = 1440
//! batch_limit = 5000
//! pass_deadline_secs = 300
//! dry_run = false
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod report;
mod sweeper;
mod worker;

pub use config::SweeperConfig;
pub use error::SweeperError;
pub use metrics::SweeperMetrics;
pub use report::{FailureKind, ItemFailure, PassReport};
pub use sweeper::AlertSweeper;
pub use worker::SweeperWorker;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in seconds since the Unix epoch
///
/// Clocks set before 1970 read as 0.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
