//! # Hybrid Queue Manager
//!
//! The orchestrator: owns one storage backend and one processor (usually a
//! dynamic dispatcher), drives one-at-a-time processing, applies the
//! persistence strategy, and mediates the queue-level input protocol.
//!
//! ## Queue State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     HybridQueueManager States                           │
//! │                                                                         │
//! │               enqueue / start                                           │
//! │  ┌──────────┐ ───────────────► ┌────────────────┐                      │
//! │  │ QueueIdle│                  │ ItemProcessing │◄──────┐              │
//! │  └──────────┘ ◄─── abort ───── └───────┬────────┘       │ RETRY        │
//! │       ▲                                │                │              │
//! │       │            ┌───────────────────┼────────────┐   │              │
//! │       │            ▼                   ▼            ▼   │              │
//! │       │       ┌──────────┐       ┌────────────┐  ┌──────┴─────┐       │
//! │       │       │ ItemDone │       │ItemSkipped │  │ ItemFailed │       │
//! │       │       └────┬─────┘       └─────┬──────┘  └──────┬─────┘       │
//! │       │            │ next item         │ next item      │ SKIP/ABORT  │
//! │       │            └─────────►─────────┘◄───────────────┘             │
//! │       │                                                               │
//! │  queue empty ──► QueueDone      cancel_all ──► QueueCanceled          │
//! │                                 ABORT_ALL  ──► QueueAborted           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Hybrid = memory + storage
//! The in-memory queue is the live rotation the drain loop picks from; the
//! storage backend is the durable projection of it. The persistence strategy
//! decides how eagerly the two are kept in sync: `Immediate` writes through
//! on every transition, `OnBackground` buffers ids until
//! [`persist_pending_items`] flushes them, `Never` skips storage entirely.
//!
//! [`persist_pending_items`]: HybridQueueManager::persist_pending_items

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, oneshot, watch, Mutex};
use tracing::{debug, error, info, warn};

use ticpass_core::config::{
    PersistenceStrategy, ProcessorStartMode, QueueConfig, QueueConfirmationMode,
};
use ticpass_core::error::ErrorHandlingAction;
use ticpass_core::event::ProcessingEvent;
use ticpass_core::input::{
    QueueInputRequest, QueueInputResponse, UserInputRequest, UserInputResponse,
};
use ticpass_core::item::{QueueItem, QueueItemStatus};
use ticpass_core::result::ProcessingResult;
use ticpass_core::state::ProcessingState;
use ticpass_core::storage::{QueueStorage, StorageError};

use crate::error::{QueueError, QueueResult};
use crate::processor::QueueProcessor;

/// Queue-level input requests buffered per subscriber.
const QUEUE_INPUT_CHANNEL_CAPACITY: usize = 3;

/// Why the drain loop stopped before running the queue empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    /// `cancel_all`: pending items stay for the next session.
    Canceled,
    /// ABORT_ALL error action.
    Aborted,
}

// =============================================================================
// Manager Internals
// =============================================================================

struct Inner<T: QueueItem, E: ProcessingEvent> {
    processor: Arc<dyn QueueProcessor<T, E>>,
    storage: Arc<dyn QueueStorage<T>>,
    config: QueueConfig,

    /// Live rotation with enqueue sequence numbers for tie-breaking.
    queue: Mutex<Vec<(u64, T)>>,
    next_seq: AtomicU64,

    /// Item ids awaiting a flush under `OnBackground` persistence.
    pending_persistence: Mutex<HashSet<String>>,

    state_tx: watch::Sender<ProcessingState<T>>,
    queue_tx: watch::Sender<Vec<T>>,

    queue_input_tx: broadcast::Sender<QueueInputRequest>,
    queue_input_outstanding: Mutex<Vec<QueueInputRequest>>,
    queue_input_waiters: Mutex<HashMap<String, oneshot::Sender<QueueInputResponse>>>,

    running: AtomicBool,
    stop_reason: Mutex<Option<StopReason>>,
    abort_requested: AtomicBool,
}

impl<T: QueueItem, E: ProcessingEvent> Inner<T, E> {
    fn set_state(&self, state: ProcessingState<T>) {
        // send_replace: the value must be stored even before any receiver
        // subscribes, so late subscribers observe the latest state.
        let _ = self.state_tx.send_replace(state);
    }

    /// Highest-priority pending item; lowest sequence breaks ties.
    async fn next_pending(&self) -> Option<T> {
        let queue = self.queue.lock().await;
        queue
            .iter()
            .filter(|(_, item)| item.status() == QueueItemStatus::Pending)
            .min_by_key(|(seq, item)| (-i64::from(item.priority()), *seq))
            .map(|(_, item)| item.clone())
    }

    async fn refresh_queue_watch(&self) {
        let queue = self.queue.lock().await;
        let mut pending: Vec<(u64, T)> = queue
            .iter()
            .filter(|(_, item)| item.status() == QueueItemStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|(seq, item)| (-i64::from(item.priority()), *seq));
        let _ = self
            .queue_tx
            .send_replace(pending.into_iter().map(|(_, item)| item).collect());
    }

    /// Writes an item's current state through to memory and, per strategy,
    /// to storage.
    async fn apply_update(&self, item: &T) -> Result<(), StorageError> {
        {
            let mut queue = self.queue.lock().await;
            if let Some((_, stored)) = queue.iter_mut().find(|(_, s)| s.id() == item.id()) {
                *stored = item.clone();
            }
        }
        match self.config.persistence {
            PersistenceStrategy::Immediate => self.storage.update(item).await?,
            PersistenceStrategy::OnBackground => {
                self.pending_persistence
                    .lock()
                    .await
                    .insert(item.id().to_string());
            }
            PersistenceStrategy::Never => {}
        }
        self.refresh_queue_watch().await;
        Ok(())
    }

    /// Re-ranks an item below every other pending item so it lands at the
    /// back of the rotation, and re-marks it pending.
    async fn demote_to_back(&self, item: &mut T) -> Result<(), StorageError> {
        let floor = {
            let queue = self.queue.lock().await;
            queue
                .iter()
                .filter(|(_, other)| {
                    other.status() == QueueItemStatus::Pending && other.id() != item.id()
                })
                .map(|(_, other)| other.priority())
                .min()
        };
        if let Some(floor) = floor {
            item.set_priority(floor.saturating_sub(1));
        }
        item.set_status(QueueItemStatus::Pending);
        self.apply_update(item).await
    }

    /// Publishes a queue-level request and waits (unbounded) for its answer.
    async fn request_queue_input(&self, request: QueueInputRequest) -> QueueInputResponse {
        let id = request.id().to_string();
        let (tx, rx) = oneshot::channel();
        self.queue_input_waiters.lock().await.insert(id.clone(), tx);
        {
            let mut outstanding = self.queue_input_outstanding.lock().await;
            if outstanding.len() == QUEUE_INPUT_CHANNEL_CAPACITY {
                outstanding.remove(0);
            }
            outstanding.push(request.clone());
        }
        let _ = self.queue_input_tx.send(request);
        debug!(request_id = %id, "queue input requested");

        let response = rx
            .await
            .unwrap_or_else(|_| QueueInputResponse::canceled(&id));
        self.queue_input_waiters.lock().await.remove(&id);
        self.queue_input_outstanding
            .lock()
            .await
            .retain(|r| r.id() != id);
        response
    }

    async fn take_stop_reason(&self) -> Option<StopReason> {
        self.stop_reason.lock().await.take()
    }

    fn finish(&self, reason: StopReason) {
        match reason {
            StopReason::Canceled => {
                info!("queue canceled; pending items stay for the next session");
                self.set_state(ProcessingState::QueueCanceled);
            }
            StopReason::Aborted => {
                info!("queue aborted by error action");
                self.set_state(ProcessingState::QueueAborted);
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Drain loop
    // -------------------------------------------------------------------------

    async fn drain(self: Arc<Self>) {
        loop {
            if let Some(reason) = self.take_stop_reason().await {
                self.finish(reason);
                return;
            }

            let Some(mut item) = self.next_pending().await else {
                info!("queue drained");
                self.set_state(ProcessingState::QueueDone);
                self.running.store(false, Ordering::SeqCst);
                return;
            };

            if self.config.confirmation == QueueConfirmationMode::Confirmation
                && !self.confirm_next(&mut item).await
            {
                continue;
            }

            item.set_status(QueueItemStatus::Processing);
            if let Err(err) = self.apply_update(&item).await {
                error!(item_id = %item.id(), %err, "failed to persist processing status");
                self.running.store(false, Ordering::SeqCst);
                return;
            }
            info!(item_id = %item.id(), priority = item.priority(), "processing item");
            self.set_state(ProcessingState::ItemProcessing(item.clone()));

            if !self.work_item(&mut item).await {
                return;
            }
        }
    }

    /// Raises the next-item confirmation gate. Returns whether to proceed;
    /// a skip or canceled answer rotates the item to the back.
    async fn confirm_next(&self, item: &mut T) -> bool {
        let (index, total, next_id) = {
            let queue = self.queue.lock().await;
            let mut pending: Vec<&(u64, T)> = queue
                .iter()
                .filter(|(_, other)| other.status() == QueueItemStatus::Pending)
                .collect();
            pending.sort_by_key(|(seq, other)| (-i64::from(other.priority()), *seq));
            let index = pending
                .iter()
                .position(|(_, other)| other.id() == item.id())
                .unwrap_or(0);
            let next_id = pending
                .get(index + 1)
                .map(|(_, other)| other.id().to_string());
            (index, pending.len(), next_id)
        };

        let request =
            QueueInputRequest::confirm_next_processor(index, total, item.id(), next_id);
        let response = self.request_queue_input(request).await;
        if response.confirmation() == Some(true) {
            return true;
        }
        debug!(item_id = %item.id(), "item skipped at confirmation gate");
        if let Err(err) = self.demote_to_back(item).await {
            error!(item_id = %item.id(), %err, "failed to persist skipped item");
        }
        self.set_state(ProcessingState::ItemSkipped(item.clone()));
        false
    }

    /// Processes one checked-out item, including the retry protocol.
    /// Returns `false` when the whole drain loop must stop.
    async fn work_item(self: &Arc<Self>, item: &mut T) -> bool {
        loop {
            let result = self.processor.process(item).await;

            // An abort-current raced the result: the item is done for this
            // session regardless of what the processor returned.
            if self.abort_requested.swap(false, Ordering::SeqCst) {
                item.set_status(QueueItemStatus::Aborted);
                if let Err(err) = self.apply_update(item).await {
                    error!(item_id = %item.id(), %err, "failed to persist aborted item");
                }
                self.set_state(ProcessingState::ItemAborted(item.clone()));
                self.set_state(ProcessingState::QueueIdle);
                self.running.store(false, Ordering::SeqCst);
                return false;
            }

            if let Some(reason) = self.take_stop_reason().await {
                // cancel_all mid-flight: the item goes back to pending so
                // the next session picks it up again.
                item.set_status(QueueItemStatus::Pending);
                if let Err(err) = self.apply_update(item).await {
                    error!(item_id = %item.id(), %err, "failed to repersist canceled item");
                }
                self.finish(reason);
                return false;
            }

            match result {
                ProcessingResult::Success(_) => {
                    item.set_status(QueueItemStatus::Done);
                    if let Err(err) = self.apply_update(item).await {
                        error!(item_id = %item.id(), %err, "failed to persist done item");
                    }
                    info!(item_id = %item.id(), "item done");
                    self.set_state(ProcessingState::ItemDone(item.clone()));
                    return true;
                }
                ProcessingResult::Error(event) => {
                    warn!(item_id = %item.id(), error = %event, "item failed");
                    self.set_state(ProcessingState::ItemFailed(item.clone(), event));

                    let request = QueueInputRequest::error_retry_or_skip(item.id(), event);
                    let response = self.request_queue_input(request).await;
                    match response.error_handling_action() {
                        Some(ErrorHandlingAction::Retry) => {
                            info!(item_id = %item.id(), "retrying item");
                            self.set_state(ProcessingState::ItemRetrying(item.clone()));
                        }
                        Some(ErrorHandlingAction::Skip) => {
                            info!(item_id = %item.id(), "skipping item to back of queue");
                            if let Err(err) = self.demote_to_back(item).await {
                                error!(item_id = %item.id(), %err, "failed to persist skip");
                            }
                            self.set_state(ProcessingState::ItemSkipped(item.clone()));
                            return true;
                        }
                        Some(ErrorHandlingAction::Abort) => {
                            info!(item_id = %item.id(), "aborting item, parked for later");
                            self.processor.abort().await;
                            item.set_status(QueueItemStatus::Aborted);
                            if let Err(err) = self.apply_update(item).await {
                                error!(item_id = %item.id(), %err, "failed to persist abort");
                            }
                            self.set_state(ProcessingState::ItemAborted(item.clone()));
                            return true;
                        }
                        Some(ErrorHandlingAction::AbortAll) => {
                            self.processor.abort().await;
                            item.set_status(QueueItemStatus::Failed);
                            if let Err(err) = self.apply_update(item).await {
                                error!(item_id = %item.id(), %err, "failed to persist failure");
                            }
                            self.finish(StopReason::Aborted);
                            return false;
                        }
                        None => {
                            // Dismissed dialog: fail the item and advance.
                            info!(item_id = %item.id(), "error dialog dismissed, failing item");
                            item.set_status(QueueItemStatus::Failed);
                            if let Err(err) = self.apply_update(item).await {
                                error!(item_id = %item.id(), %err, "failed to persist failure");
                            }
                            return true;
                        }
                    }
                }
            }
        }
    }
}

// =============================================================================
// Hybrid Queue Manager
// =============================================================================

/// Orchestrates one queue: durable items, single in-flight processing, the
/// four-way error protocol and the confirmation gate.
///
/// Cheap to clone a handle to via [`HybridQueueManager::state`] and friends;
/// the manager itself owns its processor and storage exclusively for the
/// session.
pub struct HybridQueueManager<T: QueueItem, E: ProcessingEvent> {
    inner: Arc<Inner<T, E>>,
}

impl<T: QueueItem, E: ProcessingEvent> HybridQueueManager<T, E> {
    pub fn new(
        processor: Arc<dyn QueueProcessor<T, E>>,
        storage: Arc<dyn QueueStorage<T>>,
        config: QueueConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(ProcessingState::QueueIdle);
        let (queue_tx, _) = watch::channel(Vec::new());
        let (queue_input_tx, _) = broadcast::channel(QUEUE_INPUT_CHANNEL_CAPACITY);
        HybridQueueManager {
            inner: Arc::new(Inner {
                processor,
                storage,
                config,
                queue: Mutex::new(Vec::new()),
                next_seq: AtomicU64::new(0),
                pending_persistence: Mutex::new(HashSet::new()),
                state_tx,
                queue_tx,
                queue_input_tx,
                queue_input_outstanding: Mutex::new(Vec::new()),
                queue_input_waiters: Mutex::new(HashMap::new()),
                running: AtomicBool::new(false),
                stop_reason: Mutex::new(None),
                abort_requested: AtomicBool::new(false),
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Queue operations
    // -------------------------------------------------------------------------

    /// Inserts an item as pending. Under `ProcessorStartMode::Immediate` an
    /// idle queue starts draining right away.
    pub async fn enqueue(&self, mut item: T) -> QueueResult<()> {
        item.set_status(QueueItemStatus::Pending);
        let seq = self.inner.next_seq.fetch_add(1, Ordering::SeqCst);
        self.inner.queue.lock().await.push((seq, item.clone()));
        match self.inner.config.persistence {
            PersistenceStrategy::Immediate => self.inner.storage.insert(&item).await?,
            PersistenceStrategy::OnBackground => {
                self.inner
                    .pending_persistence
                    .lock()
                    .await
                    .insert(item.id().to_string());
            }
            PersistenceStrategy::Never => {}
        }
        self.inner.refresh_queue_watch().await;
        debug!(item_id = %item.id(), priority = item.priority(), "item enqueued");

        if self.inner.config.start_mode == ProcessorStartMode::Immediate {
            self.start();
        }
        Ok(())
    }

    /// Starts the drain loop if it is not already running.
    pub fn start(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let inner = self.inner.clone();
        tokio::spawn(async move {
            inner.drain().await;
        });
    }

    /// Whether the drain loop is currently running.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Aborts the in-flight item: the processor's waiters are released, the
    /// item is marked aborted and the queue returns to idle without
    /// advancing. Returns whether the processor-side abort succeeded.
    pub async fn abort_current(&self) -> QueueResult<bool> {
        if !matches!(
            *self.inner.state_tx.borrow(),
            ProcessingState::ItemProcessing(_) | ProcessingState::ItemRetrying(_)
        ) {
            return Err(QueueError::NoActiveItem);
        }
        self.inner.abort_requested.store(true, Ordering::SeqCst);
        Ok(self.inner.processor.abort().await)
    }

    /// Stops the whole queue, leaving pending items in storage for the next
    /// session. Aborts the in-flight item if there is one.
    pub async fn cancel_all(&self) -> QueueResult<()> {
        *self.inner.stop_reason.lock().await = Some(StopReason::Canceled);

        // Release a drain loop parked on an error decision so it can
        // observe the stop flag.
        let waiters: Vec<_> = self
            .inner
            .queue_input_waiters
            .lock()
            .await
            .drain()
            .collect();
        for (id, tx) in waiters {
            let _ = tx.send(QueueInputResponse::canceled(&id));
        }

        if matches!(
            *self.inner.state_tx.borrow(),
            ProcessingState::ItemProcessing(_) | ProcessingState::ItemRetrying(_)
        ) {
            self.inner.processor.abort().await;
        } else if !self.is_running() {
            // Nothing in flight and no loop to observe the flag.
            self.inner.stop_reason.lock().await.take();
            self.inner.set_state(ProcessingState::QueueCanceled);
        }
        Ok(())
    }

    /// Removes one pending item from the rotation and storage.
    pub async fn cancel_item(&self, id: &str) -> QueueResult<()> {
        {
            let mut queue = self.inner.queue.lock().await;
            let Some(position) = queue
                .iter()
                .position(|(_, item)| item.id() == id && item.status() == QueueItemStatus::Pending)
            else {
                return Err(QueueError::ItemNotFound(id.to_string()));
            };
            queue.remove(position);
        }
        if self.inner.config.persistence != PersistenceStrategy::Never {
            self.inner.storage.remove(id).await?;
        }
        self.inner.pending_persistence.lock().await.remove(id);
        self.inner.refresh_queue_watch().await;
        Ok(())
    }

    /// Removes every pending item, leaving only the in-flight one.
    pub async fn clear_queue(&self) -> QueueResult<()> {
        let removed: Vec<String> = {
            let mut queue = self.inner.queue.lock().await;
            let removed = queue
                .iter()
                .filter(|(_, item)| item.status() == QueueItemStatus::Pending)
                .map(|(_, item)| item.id().to_string())
                .collect();
            queue.retain(|(_, item)| item.status() != QueueItemStatus::Pending);
            removed
        };
        if self.inner.config.persistence != PersistenceStrategy::Never {
            for id in &removed {
                self.inner.storage.remove(id).await?;
            }
        }
        {
            let mut pending = self.inner.pending_persistence.lock().await;
            for id in &removed {
                pending.remove(id);
            }
        }
        self.inner.refresh_queue_watch().await;
        info!(count = removed.len(), "queue cleared");
        Ok(())
    }

    /// Reloads pending items from storage into the rotation, deduplicating
    /// by id. Returns how many items were recovered.
    pub async fn resume(&self) -> QueueResult<usize> {
        let stored = self
            .inner
            .storage
            .get_all_by_status(QueueItemStatus::Pending)
            .await?;
        let mut recovered = 0;
        {
            let mut queue = self.inner.queue.lock().await;
            for item in stored {
                if queue.iter().any(|(_, held)| held.id() == item.id()) {
                    continue;
                }
                let seq = self.inner.next_seq.fetch_add(1, Ordering::SeqCst);
                queue.push((seq, item));
                recovered += 1;
            }
        }
        self.inner.refresh_queue_watch().await;
        info!(recovered, "resumed pending items from storage");
        Ok(recovered)
    }

    /// Flushes items buffered by `OnBackground` persistence. Returns how
    /// many were written.
    pub async fn persist_pending_items(&self) -> QueueResult<usize> {
        let ids: Vec<String> = self
            .inner
            .pending_persistence
            .lock()
            .await
            .drain()
            .collect();
        let mut written = 0;
        for id in ids {
            let item = {
                let queue = self.inner.queue.lock().await;
                queue
                    .iter()
                    .find(|(_, held)| held.id() == id)
                    .map(|(_, held)| held.clone())
            };
            let Some(item) = item else { continue };
            match self.inner.storage.update(&item).await {
                Ok(()) => written += 1,
                Err(StorageError::NotFound(_)) => {
                    self.inner.storage.insert(&item).await?;
                    written += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
        info!(written, "flushed buffered items to storage");
        Ok(written)
    }

    /// Deletes every done/failed/aborted item from the rotation and storage.
    pub async fn remove_finished(&self) -> QueueResult<u64> {
        self.inner
            .queue
            .lock()
            .await
            .retain(|(_, item)| !QueueItemStatus::FINISHED.contains(&item.status()));
        let removed = if self.inner.config.persistence != PersistenceStrategy::Never {
            self.inner
                .storage
                .remove_by_status(&QueueItemStatus::FINISHED)
                .await?
        } else {
            0
        };
        self.inner.refresh_queue_watch().await;
        Ok(removed)
    }

    // -------------------------------------------------------------------------
    // Input mediation
    // -------------------------------------------------------------------------

    /// Resolves a pending queue-level request (error decision or next-item
    /// confirmation).
    pub async fn provide_queue_input(&self, response: QueueInputResponse) -> QueueResult<()> {
        let waiter = self
            .inner
            .queue_input_waiters
            .lock()
            .await
            .remove(&response.request_id);
        match waiter {
            Some(tx) => {
                let id = response.request_id.clone();
                tx.send(response)
                    .map_err(|_| QueueError::UnknownInputRequest(id))
            }
            None => Err(QueueError::UnknownInputRequest(response.request_id)),
        }
    }

    /// Forwards a processor-level answer to the active processor.
    pub async fn provide_user_input(&self, response: UserInputResponse) -> bool {
        self.inner.processor.provide_user_input(response).await
    }

    // -------------------------------------------------------------------------
    // Observation
    // -------------------------------------------------------------------------

    /// The queue-level state channel the UI renders from.
    pub fn state(&self) -> watch::Receiver<ProcessingState<T>> {
        self.inner.state_tx.subscribe()
    }

    /// A live snapshot of pending items in processing order.
    pub fn observe_queue(&self) -> watch::Receiver<Vec<T>> {
        self.inner.queue_tx.subscribe()
    }

    /// The processor's progress events, forwarded unmodified.
    pub fn events(&self) -> broadcast::Receiver<E> {
        self.inner.processor.events()
    }

    /// Processor-level input requests with the missed-request snapshot.
    pub async fn user_input_requests(
        &self,
    ) -> (Vec<UserInputRequest>, broadcast::Receiver<UserInputRequest>) {
        self.inner.processor.input_requests().await
    }

    /// Queue-level input requests with the outstanding-request snapshot.
    pub async fn queue_input_requests(
        &self,
    ) -> (Vec<QueueInputRequest>, broadcast::Receiver<QueueInputRequest>) {
        let outstanding = self.inner.queue_input_outstanding.lock().await.clone();
        (outstanding, self.inner.queue_input_tx.subscribe())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use ticpass_core::error::ProcessingErrorEvent;
    use ticpass_core::input::UserInputKind;
    use ticpass_core::models::nfc::{NfcProcessorType, NfcQueueItem};
    use ticpass_core::models::payment::{PaymentProcessorType, PaymentQueueItem};

    use crate::memory::MemoryQueueStorage;
    use crate::processors::payment::MerchantConfig;
    use crate::wiring::{nfc_queue_manager, payment_queue_manager};

    fn merchant() -> MerchantConfig {
        MerchantConfig {
            name: "Ticpass Bar".to_string(),
            city: "SAO PAULO".to_string(),
        }
    }

    fn cash(amount_cents: i64, priority: i32) -> PaymentQueueItem {
        PaymentQueueItem::new(amount_cents, PaymentProcessorType::Cash).with_priority(priority)
    }

    fn payment_setup(
        config: QueueConfig,
    ) -> (
        Arc<MemoryQueueStorage<PaymentQueueItem>>,
        HybridQueueManager<PaymentQueueItem, ticpass_core::models::payment::PaymentEvent>,
    ) {
        let storage = Arc::new(MemoryQueueStorage::new());
        let manager = payment_queue_manager(storage.clone(), config, merchant());
        (storage, manager)
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_gate_walks_queue_in_priority_order() {
        let config = QueueConfig::new()
            .with_start_mode(ProcessorStartMode::Manual)
            .with_confirmation(QueueConfirmationMode::Confirmation);
        let (storage, manager) = payment_setup(config);
        let mut state = manager.state();
        let (_, mut requests) = manager.queue_input_requests().await;

        let low = cash(2_000, 1);
        let high = cash(3_000, 9);
        manager.enqueue(low.clone()).await.unwrap();
        manager.enqueue(high.clone()).await.unwrap();
        manager.start();

        // Priority 9 goes first even though it was enqueued second.
        let first = requests.recv().await.unwrap();
        match &first {
            QueueInputRequest::ConfirmNextProcessor {
                current_item_id,
                total_items,
                next_item_id,
                ..
            } => {
                assert_eq!(current_item_id, &high.id);
                assert_eq!(*total_items, 2);
                assert_eq!(next_item_id.as_deref(), Some(low.id.as_str()));
            }
            other => panic!("expected confirmation request, got {other:?}"),
        }
        manager
            .provide_queue_input(QueueInputResponse::proceed(first.id()))
            .await
            .unwrap();

        let second = requests.recv().await.unwrap();
        match &second {
            QueueInputRequest::ConfirmNextProcessor {
                current_item_id, ..
            } => assert_eq!(current_item_id, &low.id),
            other => panic!("expected confirmation request, got {other:?}"),
        }
        manager
            .provide_queue_input(QueueInputResponse::proceed(second.id()))
            .await
            .unwrap();

        state
            .wait_for(|s| matches!(s, ProcessingState::QueueDone))
            .await
            .unwrap();
        let done = storage
            .get_all_by_status(QueueItemStatus::Done)
            .await
            .unwrap();
        assert_eq!(done.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_skip_rotates_item_to_back() {
        let config = QueueConfig::new()
            .with_start_mode(ProcessorStartMode::Manual)
            .with_confirmation(QueueConfirmationMode::Confirmation);
        let (storage, manager) = payment_setup(config);
        let mut state = manager.state();
        let (_, mut requests) = manager.queue_input_requests().await;

        let low = cash(2_000, 1);
        let high = cash(3_000, 9);
        manager.enqueue(low.clone()).await.unwrap();
        manager.enqueue(high.clone()).await.unwrap();
        manager.start();

        // Skip the high-priority item: it rotates to the back.
        let first = requests.recv().await.unwrap();
        manager
            .provide_queue_input(QueueInputResponse::skip(first.id()))
            .await
            .unwrap();

        let second = requests.recv().await.unwrap();
        match &second {
            QueueInputRequest::ConfirmNextProcessor {
                current_item_id, ..
            } => assert_eq!(current_item_id, &low.id),
            other => panic!("expected confirmation request, got {other:?}"),
        }
        manager
            .provide_queue_input(QueueInputResponse::proceed(second.id()))
            .await
            .unwrap();

        // The skipped item comes back around.
        let third = requests.recv().await.unwrap();
        match &third {
            QueueInputRequest::ConfirmNextProcessor {
                current_item_id, ..
            } => assert_eq!(current_item_id, &high.id),
            other => panic!("expected confirmation request, got {other:?}"),
        }
        manager
            .provide_queue_input(QueueInputResponse::proceed(third.id()))
            .await
            .unwrap();

        state
            .wait_for(|s| matches!(s, ProcessingState::QueueDone))
            .await
            .unwrap();
        assert_eq!(
            storage
                .get_all_by_status(QueueItemStatus::Done)
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_retry_reprocesses_then_abort_parks_item() {
        let (storage, manager) = payment_setup(QueueConfig::new());
        let mut state = manager.state();
        let (_, mut requests) = manager.queue_input_requests().await;

        // Below the cash minimum: fails every attempt.
        let bad = cash(500, 0);
        manager.enqueue(bad.clone()).await.unwrap();

        let first = requests.recv().await.unwrap();
        match &first {
            QueueInputRequest::ErrorRetryOrSkip { item_id, error, .. } => {
                assert_eq!(item_id, &bad.id);
                assert_eq!(*error, ProcessingErrorEvent::InvalidTransactionAmount);
            }
            other => panic!("expected error request, got {other:?}"),
        }
        manager
            .provide_queue_input(QueueInputResponse::retry(first.id()))
            .await
            .unwrap();

        // The retry reprocesses the same item and fails again.
        let second = requests.recv().await.unwrap();
        match &second {
            QueueInputRequest::ErrorRetryOrSkip { item_id, .. } => assert_eq!(item_id, &bad.id),
            other => panic!("expected error request, got {other:?}"),
        }
        manager
            .provide_queue_input(QueueInputResponse::abort_current(second.id()))
            .await
            .unwrap();

        state
            .wait_for(|s| matches!(s, ProcessingState::QueueDone))
            .await
            .unwrap();
        let aborted = storage
            .get_all_by_status(QueueItemStatus::Aborted)
            .await
            .unwrap();
        assert_eq!(aborted.len(), 1);
        assert_eq!(aborted[0].id, bad.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismissed_error_dialog_fails_item_and_advances() {
        let (storage, manager) = payment_setup(QueueConfig::new());
        let mut state = manager.state();
        let (_, mut requests) = manager.queue_input_requests().await;

        let bad = cash(500, 9);
        let good = cash(2_000, 1);
        manager.enqueue(bad.clone()).await.unwrap();
        manager.enqueue(good.clone()).await.unwrap();

        let request = requests.recv().await.unwrap();
        manager
            .provide_queue_input(QueueInputResponse::canceled(request.id()))
            .await
            .unwrap();

        state
            .wait_for(|s| matches!(s, ProcessingState::QueueDone))
            .await
            .unwrap();
        let failed = storage
            .get_all_by_status(QueueItemStatus::Failed)
            .await
            .unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, bad.id);
        assert_eq!(
            storage
                .get_all_by_status(QueueItemStatus::Done)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_all_stops_queue_and_keeps_rest_pending() {
        let (storage, manager) = payment_setup(QueueConfig::new());
        let mut state = manager.state();
        let (_, mut requests) = manager.queue_input_requests().await;

        let bad = cash(500, 9);
        let untouched = cash(2_000, 1);
        manager.enqueue(bad.clone()).await.unwrap();
        manager.enqueue(untouched.clone()).await.unwrap();

        let request = requests.recv().await.unwrap();
        manager
            .provide_queue_input(QueueInputResponse::abort_all(request.id()))
            .await
            .unwrap();

        state
            .wait_for(|s| matches!(s, ProcessingState::QueueAborted))
            .await
            .unwrap();
        assert!(!manager.is_running());
        let pending = storage
            .get_all_by_status(QueueItemStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, untouched.id);
        assert_eq!(
            storage
                .get_all_by_status(QueueItemStatus::Failed)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_current_during_user_input_parks_item() {
        let (storage, manager) = payment_setup(QueueConfig::new());
        let mut state = manager.state();
        let (_, mut inputs) = manager.user_input_requests().await;

        let pix = PaymentQueueItem::new(5_000, PaymentProcessorType::MerchantPix);
        manager.enqueue(pix.clone()).await.unwrap();

        // The PIX rail suspends asking for the merchant key.
        let request = inputs.recv().await.unwrap();
        assert!(matches!(request.kind, UserInputKind::ConfirmMerchantPixKey));

        assert!(manager.abort_current().await.unwrap());

        state
            .wait_for(|s| matches!(s, ProcessingState::QueueIdle))
            .await
            .unwrap();
        assert!(!manager.is_running());
        let aborted = storage
            .get_all_by_status(QueueItemStatus::Aborted)
            .await
            .unwrap();
        assert_eq!(aborted.len(), 1);
        assert_eq!(aborted[0].id, pix.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_current_without_active_item_errors() {
        let (_storage, manager) =
            payment_setup(QueueConfig::new().with_start_mode(ProcessorStartMode::Manual));
        assert!(matches!(
            manager.abort_current().await,
            Err(QueueError::NoActiveItem)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_mid_flight_repersists_item_as_pending() {
        let (storage, manager) = payment_setup(QueueConfig::new());
        let mut state = manager.state();
        let (_, mut inputs) = manager.user_input_requests().await;

        let pix = PaymentQueueItem::new(5_000, PaymentProcessorType::MerchantPix);
        manager.enqueue(pix.clone()).await.unwrap();
        let _ = inputs.recv().await.unwrap();

        manager.cancel_all().await.unwrap();

        state
            .wait_for(|s| matches!(s, ProcessingState::QueueCanceled))
            .await
            .unwrap();
        assert!(!manager.is_running());
        // The interrupted item stays pending for the next session.
        let pending = storage
            .get_all_by_status(QueueItemStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, pix.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_on_idle_queue_keeps_pending_items() {
        let (storage, manager) =
            payment_setup(QueueConfig::new().with_start_mode(ProcessorStartMode::Manual));
        manager.enqueue(cash(2_000, 0)).await.unwrap();

        manager.cancel_all().await.unwrap();

        assert!(matches!(
            *manager.state().borrow(),
            ProcessingState::QueueCanceled
        ));
        assert_eq!(
            storage
                .get_all_by_status(QueueItemStatus::Pending)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrouted_item_surfaces_processor_not_found() {
        let storage = Arc::new(MemoryQueueStorage::new());
        let manager = nfc_queue_manager(
            storage,
            QueueConfig::new().with_persistence(PersistenceStrategy::Never),
        );
        let mut state = manager.state();
        let (_, mut requests) = manager.queue_input_requests().await;

        // CartUpdate has no registered processor and NFC has no fallback.
        let item = NfcQueueItem::new(NfcProcessorType::CartUpdate, json!({}));
        manager.enqueue(item.clone()).await.unwrap();

        let request = requests.recv().await.unwrap();
        match &request {
            QueueInputRequest::ErrorRetryOrSkip { item_id, error, .. } => {
                assert_eq!(item_id, &item.id);
                assert_eq!(*error, ProcessingErrorEvent::ProcessorNotFound);
            }
            other => panic!("expected error request, got {other:?}"),
        }
        manager
            .provide_queue_input(QueueInputResponse::canceled(request.id()))
            .await
            .unwrap();

        state
            .wait_for(|s| matches!(s, ProcessingState::QueueDone))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_background_persistence_flushes_on_demand() {
        let config = QueueConfig::new()
            .with_persistence(PersistenceStrategy::OnBackground)
            .with_start_mode(ProcessorStartMode::Manual);
        let (storage, manager) = payment_setup(config);

        manager.enqueue(cash(2_000, 0)).await.unwrap();
        manager.enqueue(cash(3_000, 0)).await.unwrap();
        assert!(storage.is_empty().await);

        assert_eq!(manager.persist_pending_items().await.unwrap(), 2);
        assert_eq!(
            storage
                .get_all_by_status(QueueItemStatus::Pending)
                .await
                .unwrap()
                .len(),
            2
        );

        // Nothing left to flush.
        assert_eq!(manager.persist_pending_items().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_reloads_pending_items_once() {
        let config = QueueConfig::new().with_start_mode(ProcessorStartMode::Manual);
        let (storage, manager) = payment_setup(config);

        // A previous session left two pending items in storage.
        storage.insert(&cash(2_000, 0)).await.unwrap();
        storage.insert(&cash(3_000, 5)).await.unwrap();

        assert_eq!(manager.resume().await.unwrap(), 2);
        assert_eq!(manager.observe_queue().borrow().len(), 2);

        // Resuming again deduplicates by id.
        assert_eq!(manager.resume().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_item_and_clear_queue() {
        let config = QueueConfig::new().with_start_mode(ProcessorStartMode::Manual);
        let (storage, manager) = payment_setup(config);

        let first = cash(2_000, 0);
        let second = cash(3_000, 0);
        let third = cash(4_000, 0);
        manager.enqueue(first.clone()).await.unwrap();
        manager.enqueue(second.clone()).await.unwrap();
        manager.enqueue(third.clone()).await.unwrap();

        manager.cancel_item(&second.id).await.unwrap();
        assert_eq!(manager.observe_queue().borrow().len(), 2);
        assert!(matches!(
            manager.cancel_item("no-such-item").await,
            Err(QueueError::ItemNotFound(_))
        ));

        manager.clear_queue().await.unwrap();
        assert!(manager.observe_queue().borrow().is_empty());
        assert_eq!(
            storage
                .get_all_by_status(QueueItemStatus::Pending)
                .await
                .unwrap()
                .len(),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_finished_purges_done_items() {
        let (storage, manager) = payment_setup(QueueConfig::new());
        let mut state = manager.state();

        manager.enqueue(cash(2_000, 0)).await.unwrap();
        state
            .wait_for(|s| matches!(s, ProcessingState::QueueDone))
            .await
            .unwrap();

        assert_eq!(manager.remove_finished().await.unwrap(), 1);
        assert!(storage.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_queue_input_is_rejected() {
        let (_storage, manager) =
            payment_setup(QueueConfig::new().with_start_mode(ProcessorStartMode::Manual));
        let result = manager
            .provide_queue_input(QueueInputResponse::proceed("no-such-request"))
            .await;
        assert!(matches!(result, Err(QueueError::UnknownInputRequest(_))));
    }
}
