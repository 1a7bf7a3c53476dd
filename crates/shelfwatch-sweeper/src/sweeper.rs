//! Core alert pass: classify, deduplicate, record, notify

use crate::report::FailureKind;
use crate::{PassReport, SweeperConfig, SweeperError, SweeperMetrics};
use shelfwatch_domain::alert::due_alert;
use shelfwatch_domain::traits::{AgingUpdate, AlertClaim, ItemQuery, ItemStore, NotificationSink, RecipientDirectory};
use shelfwatch_domain::{
    classify, AlertEvent, Classification, InventoryItem, Notification, RecipientId, TriggerReason,
};
use std::fmt::Display;
use std::time::Instant;

/// Alert sweeper for inventory aging
///
/// Responsible for:
/// - Refreshing each in-stock item's cached bucket and attention flag
/// - Emitting one alert per item per checkpoint (days 38 and 44)
/// - Collecting metrics across passes
///
/// Every pass is evaluated against a single `now` supplied by the caller.
///
/// # Examples
///
/// ```no_run
/// use shelfwatch_sweeper::{AlertSweeper, SweeperConfig, unix_now};
/// use shelfwatch_store::SqliteStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::new("shelfwatch.db")?;
/// let mut sweeper = AlertSweeper::new(SweeperConfig::default());
///
/// let report = sweeper.sweep(&store, &store, &store, unix_now())?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub struct AlertSweeper {
    config: SweeperConfig,
    metrics: SweeperMetrics,
}

impl AlertSweeper {
    /// Create a new sweeper with the given configuration
    pub fn new(config: SweeperConfig) -> Self {
        Self {
            config,
            metrics: SweeperMetrics::new(),
        }
    }

    /// Create a sweeper with default configuration
    pub fn default_config() -> Self {
        Self::new(SweeperConfig::default())
    }

    /// Get the active configuration
    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &SweeperMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Load candidates from the store and run one pass over them
    ///
    /// Fails only if candidates cannot be loaded; everything after that is
    /// reported per item in the returned [`PassReport`].
    pub fn sweep<S, N, D>(&mut self, store: &S, sink: &N, directory: &D, now: u64) -> Result<PassReport, SweeperError>
    where
        S: ItemStore,
        S::Error: Display,
        N: NotificationSink,
        N::Error: Display,
        D: RecipientDirectory,
        D::Error: Display,
    {
        let query = ItemQuery::candidates(self.config.batch_limit);
        let items = store
            .load_candidates(&query)
            .map_err(|e| SweeperError::Store(e.to_string()))?;

        Ok(self.run_pass(items, now, store, sink, directory))
    }

    /// Run one pass over the given items
    ///
    /// Items are independent: a failure on one never stops the others.
    pub fn run_pass<S, N, D>(
        &mut self,
        items: Vec<InventoryItem>,
        now: u64,
        store: &S,
        sink: &N,
        directory: &D,
    ) -> PassReport
    where
        S: ItemStore,
        S::Error: Display,
        N: NotificationSink,
        N::Error: Display,
        D: RecipientDirectory,
        D::Error: Display,
    {
        let started = Instant::now();
        let deadline = self.config.pass_deadline();
        let total = items.len();

        let mut pass = Pass {
            config: &self.config,
            store,
            sink,
            directory,
            now,
            recipients: None,
            report: PassReport::new(now),
        };

        tracing::debug!("Starting alert pass over {} items (now={})", total, now);

        for (index, item) in items.iter().enumerate() {
            if deadline.is_some_and(|limit| started.elapsed() >= limit) {
                pass.report.omitted = total - index;
                tracing::warn!(
                    "Pass deadline reached, {} items left for the next pass",
                    pass.report.omitted
                );
                break;
            }
            pass.process(item);
        }

        let report = pass.report;
        let runtime = started.elapsed();
        self.metrics.record_pass(&report, runtime);

        tracing::info!("Alert pass completed in {:?}: {}", runtime, report.summary());

        report
    }
}

/// State for one pass over a batch
struct Pass<'a, S, N, D> {
    config: &'a SweeperConfig,
    store: &'a S,
    sink: &'a N,
    directory: &'a D,
    now: u64,
    recipients: Option<Vec<RecipientId>>,
    report: PassReport,
}

impl<S, N, D> Pass<'_, S, N, D>
where
    S: ItemStore,
    S::Error: Display,
    N: NotificationSink,
    N::Error: Display,
    D: RecipientDirectory,
    D::Error: Display,
{
    fn process(&mut self, item: &InventoryItem) {
        let intake_at = match item.intake_at {
            Some(intake_at) if item.status.is_in_stock() => intake_at,
            _ => {
                tracing::debug!("Skipping item {} ({}, intake {:?})", item.id, item.status.as_str(), item.intake_at);
                self.report.skipped += 1;
                return;
            }
        };

        self.evaluate(item, intake_at, classify(intake_at, self.now));
    }

    /// Decide and write for one classifiable item
    fn evaluate(&mut self, item: &InventoryItem, intake_at: u64, aging: Classification) {
        if let Err(violation) = aging.verify() {
            tracing::error!("Item {} not processed: {}", item.id, violation);
            self.report
                .record_failure(item.id, FailureKind::Invariant(violation.to_string()));
            return;
        }

        if let Some(stored) = item.stored_aging {
            if stored.bucket > aging.bucket {
                tracing::debug!(
                    "Item {} moved back from {} to {} (intake reset)",
                    item.id,
                    stored.bucket,
                    aging.bucket
                );
            }
        }

        match due_alert(intake_at, aging.elapsed_days, item.last_alert_at) {
            Some(reason) => self.emit(item, intake_at, aging, reason),
            None => self.refresh(item, intake_at, aging),
        }
    }

    fn refresh(&mut self, item: &InventoryItem, intake_at: u64, aging: Classification) {
        if self.config.dry_run {
            return;
        }

        let update = AgingUpdate {
            item_id: item.id,
            expected_intake_at: intake_at,
            aging,
        };

        match self.store.refresh_aging(&update) {
            Ok(true) => self.report.refreshed += 1,
            Ok(false) => {
                tracing::debug!("Item {} changed during the pass, refresh skipped", item.id);
                self.report.changed += 1;
            }
            Err(e) => {
                tracing::error!("Failed to refresh aging for item {}: {}", item.id, e);
                self.report
                    .record_failure(item.id, FailureKind::Persistence(e.to_string()));
            }
        }
    }

    fn emit(&mut self, item: &InventoryItem, intake_at: u64, aging: Classification, reason: TriggerReason) {
        let event = AlertEvent::new(item.id, aging.bucket, aging.elapsed_days, reason, self.now);

        if self.config.dry_run {
            tracing::info!("DRY RUN: Would emit {} for item {} (day {})", reason, item.id, aging.elapsed_days);
            self.report.events.push(event);
            return;
        }

        let claim = AlertClaim {
            item_id: item.id,
            expected_intake_at: intake_at,
            expected_last_alert_at: item.last_alert_at,
            aging,
            alerted_at: self.now,
        };

        match self.store.record_alert(&claim) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("{} for item {} already recorded by a concurrent pass", reason, item.id);
                self.report.suppressed += 1;
                return;
            }
            Err(e) => {
                tracing::error!("Failed to record {} for item {}: {}", reason, item.id, e);
                self.report
                    .record_failure(item.id, FailureKind::Persistence(e.to_string()));
                return;
            }
        }

        let delivered = self
            .resolve_recipients()
            .map(|recipients| Notification::for_event(&event, item, recipients))
            .and_then(|notification| {
                self.sink
                    .create_notification(&notification)
                    .map_err(|e| e.to_string())
            });

        if let Err(msg) = delivered {
            tracing::error!("Could not notify {} for item {}: {}", reason, item.id, msg);
            self.release(&claim, reason);
            self.report.record_failure(item.id, FailureKind::Notification(msg));
            return;
        }

        tracing::info!("Emitted {} for {} (day {})", reason, item.label(), aging.elapsed_days);
        self.report.events.push(event);
    }

    /// Give the checkpoint back so a later pass in the same window retries it
    fn release(&self, claim: &AlertClaim, reason: TriggerReason) {
        match self.store.release_alert(claim) {
            Ok(true) => {
                tracing::info!("Released {} for item {}, next pass will retry", reason, claim.item_id);
            }
            Ok(false) => {
                tracing::warn!("{} for item {} changed before it could be released", reason, claim.item_id);
            }
            Err(e) => {
                tracing::error!("Failed to release {} for item {}: {}", reason, claim.item_id, e);
            }
        }
    }

    /// Recipients are looked up once per pass, on the first alert
    fn resolve_recipients(&mut self) -> Result<Vec<RecipientId>, String> {
        if let Some(recipients) = &self.recipients {
            return Ok(recipients.clone());
        }
        let recipients = self.directory.all_recipients().map_err(|e| e.to_string())?;
        self.recipients = Some(recipients.clone());
        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfwatch_domain::aging::SECONDS_PER_DAY;
    use shelfwatch_domain::{AgingBucket, ItemId, StockStatus, StoredAging};
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, HashSet};
    use std::time::Duration;

    const DAY: u64 = SECONDS_PER_DAY;
    const NOW: u64 = 20_000 * DAY;

    // Mock collaborators for testing
    #[derive(Default)]
    struct MockStore {
        items: RefCell<BTreeMap<ItemId, InventoryItem>>,
        failing_writes: HashSet<ItemId>,
        fail_loads: bool,
        refresh_delay: Option<Duration>,
        notifications: RefCell<Vec<Notification>>,
        fail_notifications: Cell<bool>,
        directory_lookups: Cell<usize>,
    }

    impl MockStore {
        fn with_items(items: &[InventoryItem]) -> Self {
            let store = Self::default();
            for item in items {
                store.items.borrow_mut().insert(item.id, item.clone());
            }
            store
        }

        fn item(&self, id: ItemId) -> InventoryItem {
            self.items.borrow()[&id].clone()
        }

        fn all(&self) -> Vec<InventoryItem> {
            self.items.borrow().values().cloned().collect()
        }
    }

    impl ItemStore for MockStore {
        type Error = String;

        fn load_candidates(&self, query: &ItemQuery) -> Result<Vec<InventoryItem>, Self::Error> {
            if self.fail_loads {
                return Err("connection refused".to_string());
            }
            let mut items: Vec<_> = self
                .all()
                .into_iter()
                .filter(|i| !query.in_stock_only || i.status.is_in_stock())
                .collect();
            if let Some(limit) = query.limit {
                items.truncate(limit);
            }
            Ok(items)
        }

        fn get_item(&self, id: ItemId) -> Result<Option<InventoryItem>, Self::Error> {
            Ok(self.items.borrow().get(&id).cloned())
        }

        fn refresh_aging(&self, update: &AgingUpdate) -> Result<bool, Self::Error> {
            if let Some(delay) = self.refresh_delay {
                std::thread::sleep(delay);
            }
            if self.failing_writes.contains(&update.item_id) {
                return Err("disk I/O error".to_string());
            }
            let mut items = self.items.borrow_mut();
            let item = items.get_mut(&update.item_id).ok_or("missing")?;
            if item.intake_at != Some(update.expected_intake_at) {
                return Ok(false);
            }
            item.stored_aging = Some(StoredAging {
                bucket: update.aging.bucket,
                needs_attention: update.aging.needs_attention,
            });
            Ok(true)
        }

        fn record_alert(&self, claim: &AlertClaim) -> Result<bool, Self::Error> {
            if self.failing_writes.contains(&claim.item_id) {
                return Err("disk I/O error".to_string());
            }
            let mut items = self.items.borrow_mut();
            let item = items.get_mut(&claim.item_id).ok_or("missing")?;
            if item.intake_at != Some(claim.expected_intake_at) || item.last_alert_at != claim.expected_last_alert_at {
                return Ok(false);
            }
            item.last_alert_at = Some(claim.alerted_at);
            item.stored_aging = Some(StoredAging {
                bucket: claim.aging.bucket,
                needs_attention: claim.aging.needs_attention,
            });
            Ok(true)
        }

        fn release_alert(&self, claim: &AlertClaim) -> Result<bool, Self::Error> {
            let mut items = self.items.borrow_mut();
            let item = items.get_mut(&claim.item_id).ok_or("missing")?;
            if item.intake_at != Some(claim.expected_intake_at) || item.last_alert_at != Some(claim.alerted_at) {
                return Ok(false);
            }
            item.last_alert_at = claim.expected_last_alert_at;
            Ok(true)
        }
    }

    impl NotificationSink for MockStore {
        type Error = String;

        fn create_notification(&self, notification: &Notification) -> Result<(), Self::Error> {
            if self.fail_notifications.get() {
                return Err("sink unavailable".to_string());
            }
            self.notifications.borrow_mut().push(notification.clone());
            Ok(())
        }
    }

    impl RecipientDirectory for MockStore {
        type Error = String;

        fn all_recipients(&self) -> Result<Vec<RecipientId>, Self::Error> {
            self.directory_lookups.set(self.directory_lookups.get() + 1);
            Ok(vec!["alice".to_string(), "bob".to_string()])
        }
    }

    fn aged(days: u64) -> InventoryItem {
        InventoryItem::received(format!("SN-{}", days), "Label Printer", NOW - days * DAY)
    }

    fn sweep(sweeper: &mut AlertSweeper, store: &MockStore) -> PassReport {
        sweeper.sweep(store, store, store, NOW).unwrap()
    }

    #[test]
    fn test_seven_day_warning_at_day_38() {
        let item = aged(38);
        let store = MockStore::with_items(&[item.clone()]);
        let mut sweeper = AlertSweeper::default_config();

        let report = sweep(&mut sweeper, &store);

        assert_eq!(report.events_emitted(), 1);
        let event = &report.events[0];
        assert_eq!(event.item_id(), item.id);
        assert_eq!(event.reason(), TriggerReason::SevenDayWarning);
        assert_eq!(event.elapsed_days(), 38);
        assert_eq!(event.bucket(), AgingBucket::Idle);
        assert_eq!(event.emitted_at(), NOW);

        let stored = store.item(item.id);
        assert_eq!(stored.last_alert_at, Some(NOW));
        assert_eq!(stored.stored_aging.map(|a| a.bucket), Some(AgingBucket::Idle));
    }

    #[test]
    fn test_one_day_warning_at_day_44() {
        let store = MockStore::with_items(&[aged(44)]);
        let mut sweeper = AlertSweeper::default_config();

        let report = sweep(&mut sweeper, &store);

        assert_eq!(report.events_emitted(), 1);
        assert_eq!(report.events[0].reason(), TriggerReason::OneDayWarning);
        assert_eq!(report.events[0].elapsed_days(), 44);
    }

    #[test]
    fn test_no_alert_at_day_45_but_flag_set() {
        let item = aged(45);
        let store = MockStore::with_items(&[item.clone()]);
        let mut sweeper = AlertSweeper::default_config();

        let report = sweep(&mut sweeper, &store);

        assert_eq!(report.events_emitted(), 0);
        assert_eq!(report.refreshed, 1);
        let stored = store.item(item.id);
        assert_eq!(
            stored.stored_aging,
            Some(StoredAging {
                bucket: AgingBucket::Obsolete,
                needs_attention: true
            })
        );
        assert_eq!(stored.last_alert_at, None);
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let store = MockStore::with_items(&[aged(38), aged(44), aged(10)]);
        let mut sweeper = AlertSweeper::default_config();

        let first = sweep(&mut sweeper, &store);
        let second = sweep(&mut sweeper, &store);

        assert_eq!(first.events_emitted(), 2);
        assert_eq!(second.events_emitted(), 0);
        assert_eq!(store.notifications.borrow().len(), 2);
        assert_eq!(sweeper.metrics().pass_count, 2);
        assert_eq!(sweeper.metrics().total_emitted(), 2);
    }

    #[test]
    fn test_partial_failure_keeps_other_events() {
        let items = [aged(38), aged(38), aged(38)];
        let mut store = MockStore::with_items(&items);
        store.failing_writes.insert(items[1].id);
        let mut sweeper = AlertSweeper::default_config();

        let report = sweeper.run_pass(items.to_vec(), NOW, &store, &store, &store);

        assert_eq!(report.events_emitted(), 2);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures[0].item_id, items[1].id);
        assert!(matches!(report.failures[0].kind, FailureKind::Persistence(_)));
        let emitted: Vec<_> = report.events.iter().map(|e| e.item_id()).collect();
        assert_eq!(emitted, vec![items[0].id, items[2].id]);
    }

    #[test]
    fn test_out_of_stock_and_missing_intake_are_skipped() {
        let mut sold = aged(120);
        sold.status = StockStatus::OutOfStock;
        let mut unknown = aged(0);
        unknown.intake_at = None;
        let store = MockStore::with_items(&[sold.clone(), unknown.clone()]);
        let mut sweeper = AlertSweeper::default_config();

        let report = sweeper.run_pass(vec![sold.clone(), unknown], NOW, &store, &store, &store);

        assert_eq!(report.skipped, 2);
        assert_eq!(report.events_emitted(), 0);
        assert_eq!(report.refreshed, 0);
        assert_eq!(store.item(sold.id).stored_aging, None);
    }

    #[test]
    fn test_stale_read_is_suppressed() {
        let item = aged(38);
        let store = MockStore::with_items(&[item.clone()]);
        let mut sweeper = AlertSweeper::default_config();

        // Another pass records the alert after our snapshot was taken
        let snapshot = vec![item.clone()];
        store.items.borrow_mut().get_mut(&item.id).unwrap().last_alert_at = Some(NOW - 60);

        let report = sweeper.run_pass(snapshot, NOW, &store, &store, &store);

        assert_eq!(report.events_emitted(), 0);
        assert_eq!(report.suppressed, 1);
        assert!(store.notifications.borrow().is_empty());
    }

    #[test]
    fn test_intake_reset_re_arms_checkpoints() {
        let mut item = aged(38);
        item.last_alert_at = Some(NOW - 100 * DAY);
        item.stored_aging = Some(StoredAging {
            bucket: AgingBucket::Surplus,
            needs_attention: true,
        });
        let store = MockStore::with_items(&[item.clone()]);
        let mut sweeper = AlertSweeper::default_config();

        let report = sweep(&mut sweeper, &store);

        assert_eq!(report.events_emitted(), 1);
        assert_eq!(
            store.item(item.id).stored_aging,
            Some(StoredAging {
                bucket: AgingBucket::Idle,
                needs_attention: false
            })
        );
    }

    #[test]
    fn test_notification_failure_is_reported() {
        let item = aged(44);
        let store = MockStore::with_items(&[item.clone()]);
        store.fail_notifications.set(true);
        let mut sweeper = AlertSweeper::default_config();

        let report = sweep(&mut sweeper, &store);

        assert_eq!(report.events_emitted(), 0);
        assert_eq!(report.failure_count(), 1);
        assert!(matches!(report.failures[0].kind, FailureKind::Notification(_)));
        assert_eq!(store.item(item.id).last_alert_at, None, "claim released");
    }

    #[test]
    fn test_failed_notification_is_retried_later_same_day() {
        let item = aged(38);
        let store = MockStore::with_items(&[item.clone()]);
        let mut sweeper = AlertSweeper::default_config();

        store.fail_notifications.set(true);
        let first = sweeper.sweep(&store, &store, &store, NOW).unwrap();

        store.fail_notifications.set(false);
        let retry = sweeper.sweep(&store, &store, &store, NOW + 3600).unwrap();

        assert_eq!(first.events_emitted(), 0);
        assert_eq!(first.failure_count(), 1);
        assert_eq!(retry.events_emitted(), 1);
        assert_eq!(retry.events[0].reason(), TriggerReason::SevenDayWarning);
        assert_eq!(store.notifications.borrow().len(), 1);
        assert_eq!(store.item(item.id).last_alert_at, Some(NOW + 3600));
    }

    #[test]
    fn test_release_keeps_newer_claim() {
        let item = aged(38);
        let store = MockStore::with_items(&[item.clone()]);
        let claim = AlertClaim {
            item_id: item.id,
            expected_intake_at: item.intake_at.unwrap(),
            expected_last_alert_at: None,
            aging: classify(item.intake_at.unwrap(), NOW),
            alerted_at: NOW,
        };
        store.items.borrow_mut().get_mut(&item.id).unwrap().last_alert_at = Some(NOW + 60);

        assert!(!store.release_alert(&claim).unwrap());
        assert_eq!(store.item(item.id).last_alert_at, Some(NOW + 60));
    }

    #[test]
    fn test_recipients_resolved_once_per_pass() {
        let store = MockStore::with_items(&[aged(38), aged(38), aged(44)]);
        let mut sweeper = AlertSweeper::default_config();

        sweep(&mut sweeper, &store);

        assert_eq!(store.directory_lookups.get(), 1);
        let notifications = store.notifications.borrow();
        assert_eq!(notifications.len(), 3);
        assert!(notifications.iter().all(|n| n.recipients == ["alice", "bob"]));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let item = aged(38);
        let store = MockStore::with_items(&[item.clone(), aged(60)]);
        let mut sweeper = AlertSweeper::new(SweeperConfig {
            dry_run: true,
            ..Default::default()
        });

        let report = sweep(&mut sweeper, &store);

        assert_eq!(report.events_emitted(), 1);
        assert_eq!(report.refreshed, 0);
        assert!(store.notifications.borrow().is_empty());
        assert!(store.all().iter().all(|i| i.stored_aging.is_none() && i.last_alert_at.is_none()));
    }

    #[test]
    fn test_load_failure_fails_the_pass() {
        let store = MockStore {
            fail_loads: true,
            ..Default::default()
        };
        let mut sweeper = AlertSweeper::default_config();

        let result = sweeper.sweep(&store, &store, &store, NOW);

        assert!(matches!(result, Err(SweeperError::Store(_))));
        assert_eq!(sweeper.metrics().pass_count, 0);
    }

    #[test]
    fn test_batch_limit_caps_candidates() {
        let store = MockStore::with_items(&[aged(1), aged(2), aged(3)]);
        let mut sweeper = AlertSweeper::new(SweeperConfig {
            batch_limit: Some(2),
            ..Default::default()
        });

        let report = sweep(&mut sweeper, &store);

        assert_eq!(report.refreshed, 2);
    }

    #[test]
    fn test_metrics_reset() {
        let store = MockStore::with_items(&[aged(38)]);
        let mut sweeper = AlertSweeper::default_config();
        sweep(&mut sweeper, &store);
        assert_eq!(sweeper.metrics().pass_count, 1);

        sweeper.reset_metrics();

        assert_eq!(sweeper.metrics().pass_count, 0);
        assert_eq!(sweeper.metrics().total_emitted(), 0);
    }

    #[test]
    fn test_deadline_leaves_rest_for_next_pass() {
        let items = [aged(10), aged(38), aged(44)];
        let mut store = MockStore::with_items(&items);
        store.refresh_delay = Some(Duration::from_millis(1100));
        let mut sweeper = AlertSweeper::new(SweeperConfig {
            pass_deadline_secs: Some(1),
            ..Default::default()
        });

        let first = sweeper.run_pass(items.to_vec(), NOW, &store, &store, &store);

        assert_eq!(first.refreshed, 1);
        assert_eq!(first.omitted, items.len() - 1);
        assert_eq!(first.events_emitted(), 0);
        assert_eq!(sweeper.metrics().omitted, 2);

        store.refresh_delay = None;
        let next = sweeper.run_pass(items.to_vec(), NOW, &store, &store, &store);

        assert_eq!(next.omitted, 0);
        let mut reasons: Vec<_> = next.events.iter().map(|e| e.reason()).collect();
        reasons.sort_by_key(|r| r.checkpoint_day());
        assert_eq!(reasons, vec![TriggerReason::SevenDayWarning, TriggerReason::OneDayWarning]);
    }

    #[test]
    fn test_item_changed_during_pass_is_counted() {
        let item = aged(10);
        let store = MockStore::with_items(&[item.clone()]);
        let mut sweeper = AlertSweeper::default_config();

        // Relocated after the snapshot was loaded
        let snapshot = vec![item.clone()];
        store.items.borrow_mut().get_mut(&item.id).unwrap().intake_at = Some(NOW);

        let report = sweeper.run_pass(snapshot, NOW, &store, &store, &store);

        assert_eq!(report.changed, 1);
        assert_eq!(report.refreshed, 0);
        assert_eq!(report.failure_count(), 0);
        assert_eq!(store.item(item.id).stored_aging, None);
    }

    #[test]
    fn test_inconsistent_classification_is_flagged_not_written() {
        let item = aged(50);
        let store = MockStore::with_items(&[item.clone()]);
        let config = SweeperConfig::default();
        let mut pass = Pass {
            config: &config,
            store: &store,
            sink: &store,
            directory: &store,
            now: NOW,
            recipients: None,
            report: PassReport::new(NOW),
        };

        // classify() never yields this; evaluate() must still refuse it
        let inconsistent = Classification {
            bucket: AgingBucket::Idle,
            elapsed_days: 50,
            needs_attention: false,
        };
        pass.evaluate(&item, item.intake_at.unwrap(), inconsistent);

        assert_eq!(pass.report.failure_count(), 1);
        assert!(matches!(pass.report.failures[0].kind, FailureKind::Invariant(_)));
        assert_eq!(pass.report.refreshed, 0);
        assert_eq!(store.item(item.id).stored_aging, None);
    }
}
