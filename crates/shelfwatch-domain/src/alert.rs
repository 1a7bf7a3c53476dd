//! Alert module - checkpoint policy, alert events and notifications
//!
//! Alerts fire at fixed elapsed-day checkpoints ahead of the Obsolete
//! boundary, never on bucket transitions. Whether an item is due depends only
//! on its intake timestamp, its last alert and `now`, so the result does not
//! change with how often the sweep runs.

use crate::aging::{AgingBucket, OBSOLETE_START_DAY, SECONDS_PER_DAY};
use crate::item::{InventoryItem, ItemId};

/// Why an alert fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerReason {
    /// Seven days before the item becomes obsolete (day 38)
    SevenDayWarning,

    /// One day before the item becomes obsolete (day 44)
    OneDayWarning,
}

impl TriggerReason {
    /// All checkpoints, earliest first
    pub const ALL: [TriggerReason; 2] = [TriggerReason::SevenDayWarning, TriggerReason::OneDayWarning];

    /// Days between this checkpoint and the Obsolete boundary
    pub fn lead_days(&self) -> u64 {
        match self {
            TriggerReason::SevenDayWarning => 7,
            TriggerReason::OneDayWarning => 1,
        }
    }

    /// Elapsed day on which this checkpoint fires
    pub fn checkpoint_day(&self) -> u64 {
        OBSOLETE_START_DAY - self.lead_days()
    }

    /// The checkpoint that falls on the given elapsed day, if any
    ///
    /// # Examples
    ///
    /// ```
    /// use shelfwatch_domain::TriggerReason;
    ///
    /// assert_eq!(TriggerReason::for_elapsed_days(38), Some(TriggerReason::SevenDayWarning));
    /// assert_eq!(TriggerReason::for_elapsed_days(44), Some(TriggerReason::OneDayWarning));
    /// assert_eq!(TriggerReason::for_elapsed_days(45), None);
    /// ```
    pub fn for_elapsed_days(days: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|reason| reason.checkpoint_day() == days)
    }

    /// Wire name of the reason
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerReason::SevenDayWarning => "7_DAY_WARNING",
            TriggerReason::OneDayWarning => "1_DAY_WARNING",
        }
    }

    /// Parse a reason from its wire name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "7_DAY_WARNING" => Some(TriggerReason::SevenDayWarning),
            "1_DAY_WARNING" => Some(TriggerReason::OneDayWarning),
            _ => None,
        }
    }
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First instant of the checkpoint window for an item received at `intake_at`
pub fn checkpoint_window_start(intake_at: u64, reason: TriggerReason) -> u64 {
    intake_at.saturating_add(reason.checkpoint_day() * SECONDS_PER_DAY)
}

/// Decide which alert, if any, is due for an item
///
/// An item is due when `elapsed_days` is a checkpoint day and it has not been
/// alerted since that checkpoint's window opened. An alert recorded before
/// an intake reset predates the new window and so does not suppress.
pub fn due_alert(intake_at: u64, elapsed_days: u64, last_alert_at: Option<u64>) -> Option<TriggerReason> {
    let reason = TriggerReason::for_elapsed_days(elapsed_days)?;
    let window_start = checkpoint_window_start(intake_at, reason);
    match last_alert_at {
        Some(alerted_at) if alerted_at >= window_start => None,
        _ => Some(reason),
    }
}

/// Immutable record of one alert decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    item_id: ItemId,
    bucket: AgingBucket,
    elapsed_days: u64,
    reason: TriggerReason,
    emitted_at: u64,
}

impl AlertEvent {
    /// Create a new alert event
    pub fn new(item_id: ItemId, bucket: AgingBucket, elapsed_days: u64, reason: TriggerReason, emitted_at: u64) -> Self {
        Self {
            item_id,
            bucket,
            elapsed_days,
            reason,
            emitted_at,
        }
    }

    /// Item the alert is about
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Bucket at the time of the alert
    pub fn bucket(&self) -> AgingBucket {
        self.bucket
    }

    /// Whole days in stock at the time of the alert
    pub fn elapsed_days(&self) -> u64 {
        self.elapsed_days
    }

    /// Checkpoint that fired
    pub fn reason(&self) -> TriggerReason {
        self.reason
    }

    /// Pass instant the alert was emitted at
    pub fn emitted_at(&self) -> u64 {
        self.emitted_at
    }
}

/// Identifier of a notification recipient (a user id in the directory)
pub type RecipientId = String;

/// Notification creation request handed to a [`crate::traits::NotificationSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Item the notification is about
    pub item_id: ItemId,

    /// Users to notify
    pub recipients: Vec<RecipientId>,

    /// Short title
    pub title: String,

    /// Human-readable body
    pub message: String,

    /// Checkpoint that fired
    pub reason: TriggerReason,

    /// Creation instant (seconds since Unix epoch)
    pub created_at: u64,
}

impl Notification {
    /// Build the notification for an emitted alert
    pub fn for_event(event: &AlertEvent, item: &InventoryItem, recipients: Vec<RecipientId>) -> Self {
        let lead = event.reason().lead_days();
        let days_word = if lead == 1 { "day" } else { "days" };
        Self {
            item_id: event.item_id(),
            recipients,
            title: "Inventory aging warning".to_string(),
            message: format!(
                "{} has been in stock for {} days and becomes obsolete in {} {}.",
                item.label(),
                event.elapsed_days(),
                lead,
                days_word
            ),
            reason: event.reason(),
            created_at: event.emitted_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = SECONDS_PER_DAY;

    #[test]
    fn test_checkpoint_days() {
        assert_eq!(TriggerReason::SevenDayWarning.checkpoint_day(), 38);
        assert_eq!(TriggerReason::OneDayWarning.checkpoint_day(), 44);
    }

    #[test]
    fn test_no_checkpoint_on_bucket_boundaries() {
        for day in [0, 30, 31, 45, 89, 90] {
            assert_eq!(TriggerReason::for_elapsed_days(day), None, "day {}", day);
        }
    }

    #[test]
    fn test_due_without_prior_alert() {
        assert_eq!(due_alert(0, 38, None), Some(TriggerReason::SevenDayWarning));
        assert_eq!(due_alert(0, 44, None), Some(TriggerReason::OneDayWarning));
        assert_eq!(due_alert(0, 39, None), None);
    }

    #[test]
    fn test_alert_inside_window_suppresses() {
        let intake = 1000 * DAY;
        let alerted = intake + 38 * DAY + 3600;
        assert_eq!(due_alert(intake, 38, Some(alerted)), None);
    }

    #[test]
    fn test_earlier_checkpoint_does_not_suppress_later_one() {
        let intake = 1000 * DAY;
        let seven_day_alert = intake + 38 * DAY;
        assert_eq!(
            due_alert(intake, 44, Some(seven_day_alert)),
            Some(TriggerReason::OneDayWarning)
        );
    }

    #[test]
    fn test_alert_before_intake_reset_is_stale() {
        let old_alert = 500 * DAY;
        let new_intake = 600 * DAY;
        assert_eq!(
            due_alert(new_intake, 38, Some(old_alert)),
            Some(TriggerReason::SevenDayWarning)
        );
    }

    #[test]
    fn test_reason_wire_names() {
        for reason in TriggerReason::ALL {
            assert_eq!(TriggerReason::parse(reason.as_str()), Some(reason));
        }
        assert_eq!(TriggerReason::SevenDayWarning.to_string(), "7_DAY_WARNING");
    }

    #[test]
    fn test_notification_message() {
        let item = InventoryItem::received("SN-42", "Barcode Scanner", 0);
        let event = AlertEvent::new(item.id, AgingBucket::Idle, 44, TriggerReason::OneDayWarning, 44 * DAY);
        let notification = Notification::for_event(&event, &item, vec!["u1".to_string()]);

        assert_eq!(notification.item_id, item.id);
        assert_eq!(notification.created_at, 44 * DAY);
        assert_eq!(
            notification.message,
            "Barcode Scanner (S/N SN-42) has been in stock for 44 days and becomes obsolete in 1 day."
        );
    }
}
