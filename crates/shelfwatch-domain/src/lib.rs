//! Shelfwatch Domain Layer
//!
//! Core business logic and domain model for inventory aging. Apart from
//! `uuid` for identifiers this crate has no external dependencies and does no
//! I/O; it defines the concepts, pure functions and trait interfaces that the
//! other layers build on.
//!
//! ## Key Concepts
//!
//! - **Inventory item**: A serially tracked unit with an intake timestamp
//! - **Aging bucket**: Active → Idle → Obsolete → Surplus, by whole days in stock
//! - **Classification**: Pure mapping of (intake, now) to bucket and attention flag
//! - **Checkpoint policy**: Fixed elapsed days (38, 44) at which alerts are due
//! - **Collaborators**: Store, notification sink and recipient directory traits
//!
//! ## Architecture
//!
//! - Pure business logic only
//! - Timestamps are seconds since the Unix epoch, passed in by the caller
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aging;
pub mod alert;
pub mod item;
pub mod traits;

// Re-exports for convenience
pub use aging::{classify, AgingBucket, Classification, InvariantViolation};
pub use alert::{AlertEvent, Notification, RecipientId, TriggerReason};
pub use item::{InventoryItem, ItemId, StockStatus, StoredAging};
