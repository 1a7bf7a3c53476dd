//! Configuration for sweeper operations
//!
//! Defines the sweep interval, batch size and pass deadline.

use crate::SweeperError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the alert sweeper
///
/// # Examples
///
/// ```
/// use shelfwatch_sweeper::SweeperConfig;
///
/// // Default configuration (one pass per day)
/// let config = SweeperConfig::default();
/// assert_eq!(config.sweep_interval_minutes, 1440);
///
/// // Hourly passes with a deadline
/// let config = SweeperConfig::hourly();
/// assert_eq!(config.sweep_interval_minutes, 60);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// How often the background worker runs a pass (in minutes)
    /// Default: 1440 (daily)
    #[serde(default = "default_sweep_interval_minutes")]
    pub sweep_interval_minutes: u64,

    /// Maximum number of candidates loaded per pass
    /// Default: unlimited
    #[serde(default)]
    pub batch_limit: Option<usize>,

    /// Wall-clock budget for one pass (in seconds)
    /// Items not reached in time are left for the next pass.
    /// Default: none
    #[serde(default)]
    pub pass_deadline_secs: Option<u64>,

    /// Dry-run mode: evaluate and report alerts without writing anything
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,
}

fn default_sweep_interval_minutes() -> u64 {
    1440
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            sweep_interval_minutes: default_sweep_interval_minutes(),
            batch_limit: None,
            pass_deadline_secs: None,
            dry_run: false,
        }
    }
}

impl SweeperConfig {
    /// Hourly passes, each capped at five minutes
    ///
    /// Checkpoints are whole days, so extra passes only shorten the delay
    /// between an item reaching a checkpoint and its alert.
    pub fn hourly() -> Self {
        Self {
            sweep_interval_minutes: 60,
            batch_limit: None,
            pass_deadline_secs: Some(300),
            dry_run: false,
        }
    }

    /// Reject values that would make the worker or a pass meaningless
    pub fn validate(&self) -> Result<(), SweeperError> {
        if self.sweep_interval_minutes == 0 {
            return Err(SweeperError::Config("sweep_interval_minutes must be positive".to_string()));
        }
        if self.batch_limit == Some(0) {
            return Err(SweeperError::Config("batch_limit must be positive when set".to_string()));
        }
        if self.pass_deadline_secs == Some(0) {
            return Err(SweeperError::Config("pass_deadline_secs must be positive when set".to_string()));
        }
        Ok(())
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes * 60)
    }

    /// Get the pass deadline as Duration, if any
    pub fn pass_deadline(&self) -> Option<Duration> {
        self.pass_deadline_secs.map(Duration::from_secs)
    }
}
