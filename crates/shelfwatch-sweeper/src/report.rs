//! Result of a single alert pass

use shelfwatch_domain::{AlertEvent, ItemId};
use std::fmt;

/// Why one item could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Reading or writing the item's state failed
    Persistence(String),

    /// Recipient lookup or notification creation failed after the alert was recorded
    Notification(String),

    /// The classifier produced an inconsistent result; the item was left untouched
    Invariant(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Persistence(msg) => write!(f, "persistence: {}", msg),
            FailureKind::Notification(msg) => write!(f, "notification: {}", msg),
            FailureKind::Invariant(msg) => write!(f, "invariant: {}", msg),
        }
    }
}

/// A per-item failure recorded during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Item that failed
    pub item_id: ItemId,

    /// What went wrong
    pub kind: FailureKind,
}

/// Outcome of one pass over a batch of items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Instant the pass was evaluated at
    pub now: u64,

    /// Alerts emitted, one per qualifying item
    pub events: Vec<AlertEvent>,

    /// Items not in stock or without an intake timestamp
    pub skipped: usize,

    /// Items whose aging cache was refreshed without an alert
    pub refreshed: usize,

    /// Due alerts dropped because a concurrent pass already recorded them
    pub suppressed: usize,

    /// Items modified by another writer after they were loaded
    pub changed: usize,

    /// Items not reached before the pass deadline
    pub omitted: usize,

    /// Items that failed
    pub failures: Vec<ItemFailure>,
}

impl PassReport {
    /// Create an empty report for a pass evaluated at `now`
    pub fn new(now: u64) -> Self {
        Self {
            now,
            ..Default::default()
        }
    }

    /// Number of alerts emitted
    pub fn events_emitted(&self) -> usize {
        self.events.len()
    }

    /// Number of per-item failures
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub(crate) fn record_failure(&mut self, item_id: ItemId, kind: FailureKind) {
        self.failures.push(ItemFailure { item_id, kind });
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} emitted, {} refreshed, {} skipped, {} suppressed, {} changed, {} omitted, {} failed",
            self.events_emitted(),
            self.refreshed,
            self.skipped,
            self.suppressed,
            self.changed,
            self.omitted,
            self.failure_count()
        )
    }
}
