//! Item module - serially tracked units of stock

use crate::aging::{classify, AgingBucket, Classification};
use std::fmt;

/// Unique identifier for an inventory item based on UUIDv7
///
/// UUIDv7 keeps identifiers sortable by creation time, which keeps batch
/// passes over the store in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(u128);

impl ItemId {
    /// Generate a new UUIDv7-based ItemId
    ///
    /// # Examples
    ///
    /// ```
    /// use shelfwatch_domain::ItemId;
    ///
    /// let id = ItemId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an ItemId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an ItemId from its hyphenated UUID string
    ///
    /// # Examples
    ///
    /// ```
    /// use shelfwatch_domain::ItemId;
    ///
    /// let id = ItemId::new();
    /// let parsed = ItemId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid item id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Stock status of an item
///
/// Only `InStock` items take part in aging evaluation and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockStatus {
    /// On the shelf and available
    InStock,

    /// Held for a pending request
    Reserved,

    /// Issued or sold
    OutOfStock,

    /// Moving between locations
    InTransit,

    /// Unusable
    Damaged,

    /// Missing
    Lost,
}

impl StockStatus {
    /// Whether the item counts as sitting in stock for aging purposes
    pub fn is_in_stock(&self) -> bool {
        matches!(self, StockStatus::InStock)
    }

    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::Reserved => "reserved",
            StockStatus::OutOfStock => "out_of_stock",
            StockStatus::InTransit => "in_transit",
            StockStatus::Damaged => "damaged",
            StockStatus::Lost => "lost",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "in_stock" => Some(StockStatus::InStock),
            "reserved" => Some(StockStatus::Reserved),
            "out_of_stock" => Some(StockStatus::OutOfStock),
            "in_transit" => Some(StockStatus::InTransit),
            "damaged" => Some(StockStatus::Damaged),
            "lost" => Some(StockStatus::Lost),
            _ => None,
        }
    }
}

impl std::str::FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid stock status: {}", s))
    }
}

/// Aging fields as last persisted by a sweep
///
/// A cache only. It may be stale between passes and is never an input to
/// an alerting decision; use [`InventoryItem::compute_aging`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredAging {
    /// Bucket written by the last sweep
    pub bucket: AgingBucket,

    /// Attention flag written by the last sweep
    pub needs_attention: bool,
}

/// A serially tracked inventory item
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    /// Unique identifier
    pub id: ItemId,

    /// Serial number of the unit
    pub serial_number: String,

    /// Name of the product this unit belongs to
    pub product_name: String,

    /// Current stock status
    pub status: StockStatus,

    /// When the item entered inventory (seconds since Unix epoch)
    ///
    /// Items without an intake timestamp cannot be classified.
    pub intake_at: Option<u64>,

    /// Cached aging fields from the last sweep
    pub stored_aging: Option<StoredAging>,

    /// When the most recent alert for this item was recorded
    pub last_alert_at: Option<u64>,
}

impl InventoryItem {
    /// Create a freshly received, in-stock item
    pub fn received(serial_number: impl Into<String>, product_name: impl Into<String>, intake_at: u64) -> Self {
        Self {
            id: ItemId::new(),
            serial_number: serial_number.into(),
            product_name: product_name.into(),
            status: StockStatus::InStock,
            intake_at: Some(intake_at),
            stored_aging: None,
            last_alert_at: None,
        }
    }

    /// Whether this item takes part in aging evaluation
    pub fn is_classifiable(&self) -> bool {
        self.status.is_in_stock() && self.intake_at.is_some()
    }

    /// Compute the authoritative classification at `now`
    ///
    /// Returns `None` when the item has no intake timestamp.
    pub fn compute_aging(&self, now: u64) -> Option<Classification> {
        self.intake_at.map(|intake| classify(intake, now))
    }

    /// Human-readable label used in notifications and logs
    pub fn label(&self) -> String {
        format!("{} (S/N {})", self.product_name, self.serial_number)
    }
}
