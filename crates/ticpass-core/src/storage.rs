//! # Queue Storage Contract
//!
//! The persistence seam between the queue engine and whatever holds items
//! durably. The engine never talks SQL; it talks this trait. Two
//! implementations ship in the workspace:
//!
//! - `MemoryQueueStorage` (ticpass-queue) — in-process, for `Never`-strategy
//!   queues and tests
//! - `SqliteQueueStorage` (ticpass-db) — SQLite-backed, survives restarts
//!
//! ## Observation
//! `observe_by_status` hands back a `watch` receiver that the implementation
//! refreshes after every mutation, so a UI list of pending items stays live
//! without polling.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::item::{QueueItem, QueueItemStatus};

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store rejected or failed the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// An item payload could not be (de)serialized.
    #[error("item serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No item with the given id exists.
    #[error("queue item not found: {0}")]
    NotFound(String),
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StorageError::NotFound("row not found".to_string()),
            other => StorageError::Backend(other.to_string()),
        }
    }
}

// =============================================================================
// Storage Contract
// =============================================================================

/// Durable (or deliberately non-durable) storage for one queue's items.
///
/// Implementations must order `get_next_pending` by priority descending with
/// insertion order breaking ties, so two equal-priority items process
/// first-in-first-out.
#[async_trait]
pub trait QueueStorage<T: QueueItem>: Send + Sync {
    /// Inserts a new item.
    async fn insert(&self, item: &T) -> Result<(), StorageError>;

    /// Rewrites an existing item (payload, priority and status).
    async fn update(&self, item: &T) -> Result<(), StorageError>;

    /// Updates only the status of the item with the given id.
    async fn update_status(&self, id: &str, status: QueueItemStatus) -> Result<(), StorageError>;

    /// Removes the item with the given id. Removing a missing id is a no-op.
    async fn remove(&self, id: &str) -> Result<(), StorageError>;

    /// Removes every item whose status is in `statuses`; returns the count.
    async fn remove_by_status(&self, statuses: &[QueueItemStatus]) -> Result<u64, StorageError>;

    /// The highest-priority pending item, if any.
    async fn get_next_pending(&self) -> Result<Option<T>, StorageError>;

    /// Every item with the given status, in processing order.
    async fn get_all_by_status(&self, status: QueueItemStatus) -> Result<Vec<T>, StorageError>;

    /// A live view of items with the given status, refreshed after each
    /// mutation.
    async fn observe_by_status(
        &self,
        status: QueueItemStatus,
    ) -> Result<watch::Receiver<Vec<T>>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "queue item not found: abc");
    }

    #[test]
    fn test_serde_error_converts() {
        let bad = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: StorageError = bad.into();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
