//! Shelfwatch Storage Layer
//!
//! Implements the [`ItemStore`], [`NotificationSink`] and [`RecipientDirectory`]
//! traits on top of SQLite.
//!
//! # Concurrency
//!
//! Aging writes are conditional updates keyed on the values a sweep read
//! (`intake_at`, `last_alert_at`). Two sweeps racing over the same item on
//! separate connections therefore cannot both claim the same alert checkpoint.
//!
//! # Examples
//!
//! ```no_run
//! use shelfwatch_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for item operations
//! ```

#![warn(missing_docs)]

use rusqlite::{params, Connection, OptionalExtension, Row};
use shelfwatch_domain::traits::{AgingUpdate, AlertClaim, ItemQuery, ItemStore, NotificationSink, RecipientDirectory};
use shelfwatch_domain::{AgingBucket, InventoryItem, ItemId, Notification, RecipientId, StockStatus, StoredAging};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Item not found
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Duplicate item detected
    #[error("Duplicate item detected")]
    Duplicate,
}

/// A notification as stored for one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNotification {
    /// Row id
    pub id: i64,
    /// Item the notification is about
    pub item_id: ItemId,
    /// Short title
    pub title: String,
    /// Human-readable body
    pub message: String,
    /// Wire name of the trigger reason
    pub reason: String,
    /// Creation instant (seconds since Unix epoch)
    pub created_at: u64,
    /// Whether the user has read it
    pub is_read: bool,
}

const ITEM_COLUMNS: &str =
    "id, serial_number, product_name, status, intake_at, aging_bucket, needs_attention, last_alert_at";

/// SQLite-based store for inventory items, users and notifications
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance; several instances may share one database file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert ItemId to bytes for storage
    fn item_id_to_bytes(id: ItemId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to ItemId
    fn bytes_to_item_id(bytes: &[u8]) -> Result<ItemId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for ItemId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(ItemId::from_value(u128::from_be_bytes(arr)))
    }

    fn conversion_error(column: usize, ty: rusqlite::types::Type, e: StoreError) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(column, ty, Box::new(e))
    }

    /// Map a row selected with `ITEM_COLUMNS` to an item
    fn row_to_item(row: &Row<'_>) -> rusqlite::Result<InventoryItem> {
        use rusqlite::types::Type;

        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_item_id(&id_bytes).map_err(|e| Self::conversion_error(0, Type::Blob, e))?;

        let status_str: String = row.get(3)?;
        let status = StockStatus::parse(&status_str).ok_or_else(|| {
            Self::conversion_error(3, Type::Text, StoreError::InvalidData(format!("Unknown status: {}", status_str)))
        })?;

        let bucket_str: Option<String> = row.get(5)?;
        let needs_attention: bool = row.get(6)?;
        let stored_aging = match bucket_str {
            Some(s) => {
                let bucket = AgingBucket::parse(&s).ok_or_else(|| {
                    Self::conversion_error(5, Type::Text, StoreError::InvalidData(format!("Unknown aging bucket: {}", s)))
                })?;
                Some(StoredAging { bucket, needs_attention })
            }
            None => None,
        };

        let intake_at: Option<i64> = row.get(4)?;
        let last_alert_at: Option<i64> = row.get(7)?;

        Ok(InventoryItem {
            id,
            serial_number: row.get(1)?,
            product_name: row.get(2)?,
            status,
            intake_at: intake_at.map(|t| t as u64),
            stored_aging,
            last_alert_at: last_alert_at.map(|t| t as u64),
        })
    }

    /// Insert a newly received item
    pub fn insert_item(&self, item: &InventoryItem) -> Result<ItemId, StoreError> {
        let id_bytes = Self::item_id_to_bytes(item.id);

        let exists: bool = self
            .conn
            .query_row("SELECT 1 FROM inventory_items WHERE id = ?1", params![&id_bytes], |_| Ok(true))
            .optional()?
            .unwrap_or(false);

        if exists {
            return Err(StoreError::Duplicate);
        }

        self.conn.execute(
            "INSERT INTO inventory_items (id, serial_number, product_name, status, intake_at, aging_bucket, needs_attention, last_alert_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &id_bytes,
                &item.serial_number,
                &item.product_name,
                item.status.as_str(),
                item.intake_at.map(|t| t as i64),
                item.stored_aging.map(|a| a.bucket.as_str()),
                item.stored_aging.map_or(false, |a| a.needs_attention),
                item.last_alert_at.map(|t| t as i64),
            ],
        )?;

        Ok(item.id)
    }

    /// Change an item's stock status
    ///
    /// An external mutation: the cached bucket and attention flag are cleared
    /// and recomputed by the next sweep.
    pub fn set_status(&self, id: ItemId, status: StockStatus) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE inventory_items SET status = ?1, aging_bucket = NULL, needs_attention = 0 WHERE id = ?2",
            params![status.as_str(), Self::item_id_to_bytes(id)],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Relocate an item, treating it as freshly received at `intake_at`
    ///
    /// Clears the cached bucket and attention flag. `last_alert_at` is kept;
    /// it predates the new checkpoint windows and no longer suppresses alerts.
    pub fn relocate(&self, id: ItemId, intake_at: u64) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE inventory_items SET intake_at = ?1, aging_bucket = NULL, needs_attention = 0 WHERE id = ?2",
            params![intake_at as i64, Self::item_id_to_bytes(id)],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Register a user who receives broadcast alerts
    pub fn add_user(&self, id: &str, name: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO users (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![id, name],
        )?;
        Ok(())
    }

    /// Notifications for a user, newest first
    pub fn notifications_for(&self, user_id: &str) -> Result<Vec<StoredNotification>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, title, message, reason, created_at, is_read
             FROM notifications WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;

        let notifications = stmt
            .query_map(params![user_id], |row| {
                let item_bytes: Vec<u8> = row.get(1)?;
                let item_id = Self::bytes_to_item_id(&item_bytes)
                    .map_err(|e| Self::conversion_error(1, rusqlite::types::Type::Blob, e))?;
                Ok(StoredNotification {
                    id: row.get(0)?,
                    item_id,
                    title: row.get(2)?,
                    message: row.get(3)?,
                    reason: row.get(4)?,
                    created_at: row.get::<_, i64>(5)? as u64,
                    is_read: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notifications)
    }

    /// Total number of notification rows
    pub fn notification_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM notifications", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl ItemStore for SqliteStore {
    type Error = StoreError;

    fn load_candidates(&self, query: &ItemQuery) -> Result<Vec<InventoryItem>, Self::Error> {
        let mut sql = format!("SELECT {} FROM inventory_items WHERE 1=1", ITEM_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if query.in_stock_only {
            sql.push_str(" AND status = ?");
            params.push(Box::new(StockStatus::InStock.as_str()));
        }

        sql.push_str(" ORDER BY id");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let items = stmt
            .query_map(&param_refs[..], Self::row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn get_item(&self, id: ItemId) -> Result<Option<InventoryItem>, Self::Error> {
        let sql = format!("SELECT {} FROM inventory_items WHERE id = ?1", ITEM_COLUMNS);
        let item = self
            .conn
            .query_row(&sql, params![Self::item_id_to_bytes(id)], Self::row_to_item)
            .optional()?;
        Ok(item)
    }

    fn refresh_aging(&self, update: &AgingUpdate) -> Result<bool, Self::Error> {
        let changed = self.conn.execute(
            "UPDATE inventory_items SET aging_bucket = ?1, needs_attention = ?2
             WHERE id = ?3 AND intake_at IS ?4",
            params![
                update.aging.bucket.as_str(),
                update.aging.needs_attention,
                Self::item_id_to_bytes(update.item_id),
                update.expected_intake_at as i64,
            ],
        )?;
        Ok(changed == 1)
    }

    fn record_alert(&self, claim: &AlertClaim) -> Result<bool, Self::Error> {
        let changed = self.conn.execute(
            "UPDATE inventory_items SET last_alert_at = ?1, aging_bucket = ?2, needs_attention = ?3
             WHERE id = ?4 AND intake_at IS ?5 AND last_alert_at IS ?6",
            params![
                claim.alerted_at as i64,
                claim.aging.bucket.as_str(),
                claim.aging.needs_attention,
                Self::item_id_to_bytes(claim.item_id),
                claim.expected_intake_at as i64,
                claim.expected_last_alert_at.map(|t| t as i64),
            ],
        )?;
        Ok(changed == 1)
    }

    fn release_alert(&self, claim: &AlertClaim) -> Result<bool, Self::Error> {
        let changed = self.conn.execute(
            "UPDATE inventory_items SET last_alert_at = ?1
             WHERE id = ?2 AND intake_at IS ?3 AND last_alert_at IS ?4",
            params![
                claim.expected_last_alert_at.map(|t| t as i64),
                Self::item_id_to_bytes(claim.item_id),
                claim.expected_intake_at as i64,
                claim.alerted_at as i64,
            ],
        )?;
        Ok(changed == 1)
    }
}

impl NotificationSink for SqliteStore {
    type Error = StoreError;

    fn create_notification(&self, notification: &Notification) -> Result<(), Self::Error> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO notifications (user_id, item_id, title, message, reason, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            let item_bytes = Self::item_id_to_bytes(notification.item_id);
            for recipient in &notification.recipients {
                stmt.execute(params![
                    recipient,
                    &item_bytes,
                    &notification.title,
                    &notification.message,
                    notification.reason.as_str(),
                    notification.created_at as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl RecipientDirectory for SqliteStore {
    type Error = StoreError;

    fn all_recipients(&self) -> Result<Vec<RecipientId>, Self::Error> {
        let mut stmt = self.conn.prepare("SELECT id FROM users ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}
