//! # SQLite Queue Storage
//!
//! The durable [`QueueStorage`] implementation. Items land in the
//! `queue_items` table as JSON payloads with priority and status mirrored
//! into columns, so the hot queries (next pending, per-status listing) run
//! entirely on indexed columns.
//!
//! ## Row Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  queue_items                                                            │
//! │                                                                         │
//! │  id          item UUID (primary key)                                    │
//! │  queue_name  which queue owns the row ("payment", "printing", ...)      │
//! │  priority    mirrored from the item; ORDER BY priority DESC, rowid ASC  │
//! │  status      mirrored from the item; 'pending' | 'processing' | ...     │
//! │  payload     the full item, serialized as JSON                          │
//! │                                                                         │
//! │  The columns are authoritative for priority/status: a decoded item is   │
//! │  stamped with the column values, so update_status never has to          │
//! │  rewrite the payload.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tokio::sync::watch;
use tracing::{debug, warn};

use ticpass_core::item::{QueueItem, QueueItemStatus};
use ticpass_core::storage::{QueueStorage, StorageError};

/// Durable `QueueStorage` backed by the shared SQLite pool.
///
/// One instance serves one named queue; construct it via
/// [`Database::queue_storage`](crate::Database::queue_storage).
pub struct SqliteQueueStorage<T> {
    pool: SqlitePool,
    queue: String,
    /// Live observers, refreshed after every mutation.
    observers: Mutex<Vec<(QueueItemStatus, watch::Sender<Vec<T>>)>>,
}

impl<T> SqliteQueueStorage<T>
where
    T: QueueItem + Serialize + DeserializeOwned,
{
    pub fn new(pool: SqlitePool, queue: impl Into<String>) -> Self {
        SqliteQueueStorage {
            pool,
            queue: queue.into(),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// The queue name this storage is namespaced to.
    pub fn queue_name(&self) -> &str {
        &self.queue
    }

    /// Rebuilds an item from a row: JSON payload first, then the priority
    /// and status columns stamped on top (the columns are authoritative).
    fn decode(&self, row: &SqliteRow) -> Result<T, StorageError> {
        let payload: String = row.try_get("payload")?;
        let mut item: T = serde_json::from_str(&payload)?;
        item.set_priority(row.try_get("priority")?);
        item.set_status(row.try_get("status")?);
        Ok(item)
    }

    async fn fetch_by_status(&self, status: QueueItemStatus) -> Result<Vec<T>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT payload, priority, status
            FROM queue_items
            WHERE queue_name = ? AND status = ?
            ORDER BY priority DESC, rowid ASC
            "#,
        )
        .bind(&self.queue)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| self.decode(row)).collect()
    }

    /// Pushes fresh snapshots to every live observer, dropping closed ones.
    ///
    /// Mutations have already committed by the time this runs; a failed
    /// refresh query only delays observers until the next mutation.
    async fn notify(&self) {
        let statuses: Vec<QueueItemStatus> = {
            let observers = self.observers.lock().unwrap_or_else(|e| e.into_inner());
            let mut statuses = Vec::new();
            for (status, _) in observers.iter() {
                if !statuses.contains(status) {
                    statuses.push(*status);
                }
            }
            statuses
        };

        for status in statuses {
            let snapshot = match self.fetch_by_status(status).await {
                Ok(items) => items,
                Err(err) => {
                    warn!(queue = %self.queue, %status, error = %err, "Observer refresh failed");
                    continue;
                }
            };
            let mut observers = self.observers.lock().unwrap_or_else(|e| e.into_inner());
            observers.retain(|(observed, tx)| {
                *observed != status || tx.send(snapshot.clone()).is_ok()
            });
        }
    }
}

#[async_trait]
impl<T> QueueStorage<T> for SqliteQueueStorage<T>
where
    T: QueueItem + Serialize + DeserializeOwned,
{
    async fn insert(&self, item: &T) -> Result<(), StorageError> {
        let payload = serde_json::to_string(item)?;
        let now = Utc::now();

        debug!(queue = %self.queue, id = %item.id(), "Inserting queue item");

        sqlx::query(
            r#"
            INSERT INTO queue_items (id, queue_name, priority, status, payload, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id())
        .bind(&self.queue)
        .bind(item.priority())
        .bind(item.status())
        .bind(payload)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.notify().await;
        Ok(())
    }

    async fn update(&self, item: &T) -> Result<(), StorageError> {
        let payload = serde_json::to_string(item)?;

        let result = sqlx::query(
            r#"
            UPDATE queue_items
            SET priority = ?, status = ?, payload = ?, updated_at = ?
            WHERE queue_name = ? AND id = ?
            "#,
        )
        .bind(item.priority())
        .bind(item.status())
        .bind(payload)
        .bind(Utc::now())
        .bind(&self.queue)
        .bind(item.id())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(item.id().to_string()));
        }

        self.notify().await;
        Ok(())
    }

    async fn update_status(&self, id: &str, status: QueueItemStatus) -> Result<(), StorageError> {
        debug!(queue = %self.queue, id = %id, %status, "Updating item status");

        let result = sqlx::query(
            r#"
            UPDATE queue_items
            SET status = ?, updated_at = ?
            WHERE queue_name = ? AND id = ?
            "#,
        )
        .bind(status)
        .bind(Utc::now())
        .bind(&self.queue)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }

        self.notify().await;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM queue_items WHERE queue_name = ? AND id = ?")
            .bind(&self.queue)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.notify().await;
        Ok(())
    }

    async fn remove_by_status(&self, statuses: &[QueueItemStatus]) -> Result<u64, StorageError> {
        if statuses.is_empty() {
            return Ok(0);
        }

        // Variable-length IN clause; sqlx has no array binds for SQLite.
        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "DELETE FROM queue_items WHERE queue_name = ? AND status IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql).bind(&self.queue);
        for status in statuses {
            query = query.bind(*status);
        }
        let result = query.execute(&self.pool).await?;

        let removed = result.rows_affected();
        debug!(queue = %self.queue, removed, "Removed finished items");

        self.notify().await;
        Ok(removed)
    }

    async fn get_next_pending(&self) -> Result<Option<T>, StorageError> {
        // Highest priority wins; rowid breaks ties so equal-priority items
        // stay first-in-first-out.
        let row = sqlx::query(
            r#"
            SELECT payload, priority, status
            FROM queue_items
            WHERE queue_name = ? AND status = ?
            ORDER BY priority DESC, rowid ASC
            LIMIT 1
            "#,
        )
        .bind(&self.queue)
        .bind(QueueItemStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| self.decode(&row)).transpose()
    }

    async fn get_all_by_status(&self, status: QueueItemStatus) -> Result<Vec<T>, StorageError> {
        self.fetch_by_status(status).await
    }

    async fn observe_by_status(
        &self,
        status: QueueItemStatus,
    ) -> Result<watch::Receiver<Vec<T>>, StorageError> {
        let snapshot = self.fetch_by_status(status).await?;
        let (tx, rx) = watch::channel(snapshot);
        self.observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((status, tx));
        Ok(rx)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use ticpass_core::models::payment::{PaymentProcessorType, PaymentQueueItem};

    async fn storage() -> (Database, SqliteQueueStorage<PaymentQueueItem>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let storage = db.queue_storage("payment");
        (db, storage)
    }

    fn item(amount: i64, priority: i32) -> PaymentQueueItem {
        PaymentQueueItem::new(amount, PaymentProcessorType::Cash).with_priority(priority)
    }

    #[tokio::test]
    async fn test_insert_then_next_pending_prefers_highest_priority() {
        let (_db, storage) = storage().await;
        storage.insert(&item(100, 5)).await.unwrap();
        let high = item(200, 10);
        storage.insert(&high).await.unwrap();

        let next = storage.get_next_pending().await.unwrap().unwrap();
        assert_eq!(next.id, high.id);
    }

    #[tokio::test]
    async fn test_equal_priority_is_fifo() {
        let (_db, storage) = storage().await;
        let first = item(100, 5);
        let second = item(200, 5);
        storage.insert(&first).await.unwrap();
        storage.insert(&second).await.unwrap();

        let next = storage.get_next_pending().await.unwrap().unwrap();
        assert_eq!(next.id, first.id);
    }

    #[tokio::test]
    async fn test_update_status_survives_reload() {
        let (db, storage) = storage().await;
        let paid = item(100, 0);
        storage.insert(&paid).await.unwrap();
        storage
            .update_status(&paid.id, QueueItemStatus::Done)
            .await
            .unwrap();

        // A fresh handle over the same pool sees the new status.
        let reloaded: SqliteQueueStorage<PaymentQueueItem> = db.queue_storage("payment");
        let done = reloaded
            .get_all_by_status(QueueItemStatus::Done)
            .await
            .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].status(), QueueItemStatus::Done);
        assert!(reloaded.get_next_pending().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_status_unknown_id_is_not_found() {
        let (_db, storage) = storage().await;
        let err = storage
            .update_status("no-such-item", QueueItemStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let (_db, storage) = storage().await;
        storage.remove("no-such-item").await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_by_status_counts_finished() {
        let (_db, storage) = storage().await;
        let done = item(100, 0);
        let failed = item(200, 0);
        let pending = item(300, 0);
        storage.insert(&done).await.unwrap();
        storage.insert(&failed).await.unwrap();
        storage.insert(&pending).await.unwrap();
        storage
            .update_status(&done.id, QueueItemStatus::Done)
            .await
            .unwrap();
        storage
            .update_status(&failed.id, QueueItemStatus::Failed)
            .await
            .unwrap();

        let removed = storage
            .remove_by_status(&QueueItemStatus::FINISHED)
            .await
            .unwrap();
        assert_eq!(removed, 2);
        let next = storage.get_next_pending().await.unwrap().unwrap();
        assert_eq!(next.id, pending.id);
    }

    #[tokio::test]
    async fn test_queues_are_isolated_by_name() {
        let (db, payment) = storage().await;
        let other: SqliteQueueStorage<PaymentQueueItem> = db.queue_storage("refund");

        payment.insert(&item(100, 0)).await.unwrap();

        assert!(other.get_next_pending().await.unwrap().is_none());
        assert!(payment.get_next_pending().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_observe_by_status_tracks_mutations() {
        let (_db, storage) = storage().await;
        let mut pending = storage
            .observe_by_status(QueueItemStatus::Pending)
            .await
            .unwrap();
        assert!(pending.borrow().is_empty());

        let queued = item(100, 0);
        storage.insert(&queued).await.unwrap();
        pending.changed().await.unwrap();
        assert_eq!(pending.borrow().len(), 1);

        storage
            .update_status(&queued.id, QueueItemStatus::Processing)
            .await
            .unwrap();
        pending.changed().await.unwrap();
        assert!(pending.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_skip_demotion_reorders_persisted_queue() {
        let (_db, storage) = storage().await;
        let mut skipped = item(100, 5);
        let rest = item(200, 5);
        storage.insert(&skipped).await.unwrap();
        storage.insert(&rest).await.unwrap();

        // Demote below the pending minimum, as the manager does on SKIP.
        skipped.set_priority(4);
        storage.update(&skipped).await.unwrap();

        let next = storage.get_next_pending().await.unwrap().unwrap();
        assert_eq!(next.id, rest.id);
        assert_eq!(next.priority(), 5);
    }
}
