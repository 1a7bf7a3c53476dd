//! Metrics collection across sweeper passes

use crate::PassReport;
use shelfwatch_domain::TriggerReason;
use std::collections::HashMap;
use std::time::Duration;

/// Cumulative metrics over all passes run by one sweeper
#[derive(Debug, Clone, Default)]
pub struct SweeperMetrics {
    /// Alerts emitted per trigger reason
    pub emitted: HashMap<TriggerReason, usize>,

    /// Items skipped as unclassifiable
    pub skipped: usize,

    /// Due alerts lost to a concurrent pass
    pub suppressed: usize,

    /// Items left for a later pass by the deadline
    pub omitted: usize,

    /// Per-item failures
    pub failures: usize,

    /// Total passes completed
    pub pass_count: usize,

    /// Total runtime in milliseconds
    pub total_runtime_ms: u64,
}

impl SweeperMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one pass into the totals
    pub fn record_pass(&mut self, report: &PassReport, runtime: Duration) {
        for event in &report.events {
            *self.emitted.entry(event.reason()).or_insert(0) += 1;
        }
        self.skipped += report.skipped;
        self.suppressed += report.suppressed;
        self.omitted += report.omitted;
        self.failures += report.failure_count();
        self.pass_count += 1;
        self.total_runtime_ms += runtime.as_millis() as u64;
    }

    /// Get total alerts emitted across all reasons
    pub fn total_emitted(&self) -> usize {
        self.emitted.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Sweeper Metrics Summary".to_string(),
            "=======================".to_string(),
            format!("Passes: {}", self.pass_count),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            String::new(),
        ];

        if !self.emitted.is_empty() {
            lines.push("Alerts by reason:".to_string());
            for reason in TriggerReason::ALL {
                if let Some(count) = self.emitted.get(&reason) {
                    lines.push(format!("  {}: {}", reason, count));
                }
            }
            lines.push(format!("  Total: {}", self.total_emitted()));
            lines.push(String::new());
        }

        lines.push(format!("Skipped: {}", self.skipped));
        lines.push(format!("Suppressed: {}", self.suppressed));
        lines.push(format!("Omitted: {}", self.omitted));
        lines.push(format!("Failures: {}", self.failures));

        lines.join("\n")
    }
}
