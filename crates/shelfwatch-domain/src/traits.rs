//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the aging engine and the
//! surrounding application. Infrastructure implementations live in other crates.
//!
//! Every method takes `&self` so a single backend can serve as store, sink
//! and directory at once; implementations needing mutation use interior
//! mutability.

use crate::aging::Classification;
use crate::alert::{Notification, RecipientId};
use crate::item::{InventoryItem, ItemId};

/// Trait for reading items and writing their aging state
///
/// Implemented by the infrastructure layer (shelfwatch-store)
pub trait ItemStore {
    /// Error type for store operations
    type Error;

    /// Load items to evaluate in a sweep
    fn load_candidates(&self, query: &ItemQuery) -> Result<Vec<InventoryItem>, Self::Error>;

    /// Get an item by ID
    fn get_item(&self, id: ItemId) -> Result<Option<InventoryItem>, Self::Error>;

    /// Write a recomputed bucket and attention flag
    ///
    /// Applies only if the item's intake timestamp still equals
    /// `update.expected_intake_at`. Returns whether a row was updated.
    fn refresh_aging(&self, update: &AgingUpdate) -> Result<bool, Self::Error>;

    /// Record that an alert fired, together with the refreshed aging state
    ///
    /// Applies only if both `last_alert_at` and `intake_at` still hold the
    /// values read before the decision. Returns `false` when a concurrent
    /// writer got there first, in which case nothing is written.
    fn record_alert(&self, claim: &AlertClaim) -> Result<bool, Self::Error>;

    /// Undo a claim whose notification could not be created
    ///
    /// Restores `claim.expected_last_alert_at`, but only while the item still
    /// carries `claim.alerted_at` and the same intake timestamp. Returns
    /// whether the claim was released.
    fn release_alert(&self, claim: &AlertClaim) -> Result<bool, Self::Error>;
}

/// Query criteria for loading sweep candidates
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    /// Only return items whose status is in stock
    pub in_stock_only: bool,

    /// Maximum results to return
    pub limit: Option<usize>,
}

impl ItemQuery {
    /// Query for sweep candidates, optionally capped
    pub fn candidates(limit: Option<usize>) -> Self {
        Self {
            in_stock_only: true,
            limit,
        }
    }
}

/// Conditional write of recomputed aging state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgingUpdate {
    /// Item to update
    pub item_id: ItemId,

    /// Intake timestamp the classification was computed from
    pub expected_intake_at: u64,

    /// Freshly computed classification
    pub aging: Classification,
}

/// Conditional write claiming an alert checkpoint for an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertClaim {
    /// Item to update
    pub item_id: ItemId,

    /// Intake timestamp the decision was made from
    pub expected_intake_at: u64,

    /// `last_alert_at` as read before the decision
    pub expected_last_alert_at: Option<u64>,

    /// Freshly computed classification
    pub aging: Classification,

    /// New `last_alert_at`
    pub alerted_at: u64,
}

/// Trait for creating notifications
///
/// Delivery (push, email) happens downstream of the sink.
pub trait NotificationSink {
    /// Error type for sink operations
    type Error;

    /// Create one notification
    fn create_notification(&self, notification: &Notification) -> Result<(), Self::Error>;
}

/// Trait for resolving who receives aging alerts
pub trait RecipientDirectory {
    /// Error type for directory lookups
    type Error;

    /// All registered recipients (alerts are broadcast)
    fn all_recipients(&self) -> Result<Vec<RecipientId>, Self::Error>;
}
