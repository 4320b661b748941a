//! # In-Memory Queue Storage
//!
//! A `QueueStorage` backend that never touches disk. Serves
//! `PersistenceStrategy::Never` queues (NFC operations must not replay after
//! a crash) and every engine test. Ordering matches the durable backend:
//! priority descending, insertion order breaking ties.

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};

use ticpass_core::item::{QueueItem, QueueItemStatus};
use ticpass_core::storage::{QueueStorage, StorageError};

struct Inner<T> {
    /// Items with their enqueue sequence number, in insertion order.
    items: Vec<(u64, T)>,
    next_seq: u64,
    observers: Vec<(QueueItemStatus, watch::Sender<Vec<T>>)>,
}

/// Non-durable `QueueStorage` implementation.
pub struct MemoryQueueStorage<T: QueueItem> {
    inner: Mutex<Inner<T>>,
}

impl<T: QueueItem> Default for MemoryQueueStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: QueueItem> MemoryQueueStorage<T> {
    pub fn new() -> Self {
        MemoryQueueStorage {
            inner: Mutex::new(Inner {
                items: Vec::new(),
                next_seq: 0,
                observers: Vec::new(),
            }),
        }
    }

    /// Total number of stored items, any status.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.items.is_empty()
    }
}

impl<T: QueueItem> Inner<T> {
    fn snapshot(&self, status: QueueItemStatus) -> Vec<T> {
        self.items
            .iter()
            .filter(|(_, item)| item.status() == status)
            .map(|(_, item)| item.clone())
            .collect()
    }

    /// Pushes fresh snapshots to every live observer, dropping closed ones.
    fn notify(&mut self) {
        let mut alive = Vec::with_capacity(self.observers.len());
        for (status, tx) in self.observers.drain(..) {
            let snapshot = self
                .items
                .iter()
                .filter(|(_, item)| item.status() == status)
                .map(|(_, item)| item.clone())
                .collect();
            if tx.send(snapshot).is_ok() {
                alive.push((status, tx));
            }
        }
        self.observers = alive;
    }
}

#[async_trait]
impl<T: QueueItem> QueueStorage<T> for MemoryQueueStorage<T> {
    async fn insert(&self, item: &T) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.items.push((seq, item.clone()));
        inner.notify();
        Ok(())
    }

    async fn update(&self, item: &T) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        let found = inner
            .items
            .iter_mut()
            .find(|(_, stored)| stored.id() == item.id());
        match found {
            Some((_, stored)) => {
                *stored = item.clone();
                inner.notify();
                Ok(())
            }
            None => Err(StorageError::NotFound(item.id().to_string())),
        }
    }

    async fn update_status(&self, id: &str, status: QueueItemStatus) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        let found = inner.items.iter_mut().find(|(_, stored)| stored.id() == id);
        match found {
            Some((_, stored)) => {
                stored.set_status(status);
                inner.notify();
                Ok(())
            }
            None => Err(StorageError::NotFound(id.to_string())),
        }
    }

    async fn remove(&self, id: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        inner.items.retain(|(_, stored)| stored.id() != id);
        inner.notify();
        Ok(())
    }

    async fn remove_by_status(&self, statuses: &[QueueItemStatus]) -> Result<u64, StorageError> {
        let mut inner = self.inner.lock().await;
        let before = inner.items.len();
        inner
            .items
            .retain(|(_, stored)| !statuses.contains(&stored.status()));
        let removed = (before - inner.items.len()) as u64;
        inner.notify();
        Ok(removed)
    }

    async fn get_next_pending(&self) -> Result<Option<T>, StorageError> {
        let inner = self.inner.lock().await;
        // Highest priority wins; the lowest sequence number breaks ties so
        // equal-priority items stay first-in-first-out.
        let best = inner
            .items
            .iter()
            .filter(|(_, item)| item.status() == QueueItemStatus::Pending)
            .min_by_key(|(seq, item)| (-i64::from(item.priority()), *seq))
            .map(|(_, item)| item.clone());
        Ok(best)
    }

    async fn get_all_by_status(&self, status: QueueItemStatus) -> Result<Vec<T>, StorageError> {
        Ok(self.inner.lock().await.snapshot(status))
    }

    async fn observe_by_status(
        &self,
        status: QueueItemStatus,
    ) -> Result<watch::Receiver<Vec<T>>, StorageError> {
        let mut inner = self.inner.lock().await;
        let (tx, rx) = watch::channel(inner.snapshot(status));
        inner.observers.push((status, tx));
        Ok(rx)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
