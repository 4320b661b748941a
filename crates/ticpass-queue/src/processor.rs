//! # Processor Contract & Shared Core
//!
//! Every concrete processor (cash drawer, PIX, thermal printer, NFC reader)
//! is built from the same two pieces:
//!
//! - [`ProcessorCore`]: owned channels and bookkeeping - progress event
//!   broadcast, input request broadcast with a small replay window, and the
//!   correlation map that parks `process()` while it waits for an answer.
//! - [`ProcessorTemplate`]: the hook trait a concrete processor implements.
//!   A blanket impl lifts any template into the [`QueueProcessor`] object
//!   surface the manager drives, emitting the start/cancelled markers in
//!   exactly one place.
//!
//! ## Suspension Model
//! `request_user_input` parks the calling task on a oneshot channel keyed by
//! the request id. Whoever answers first wins: the UI via
//! `provide_user_input`, the per-kind timeout, or an abort synthesizing a
//! canceled answer. The processor resumes at the exact await point either
//! way, so no hardware state machine is ever left half-stepped.
//!
//! ## Replay Window
//! The input broadcast has no replay, so a UI that subscribes *after* a
//! request went out would deadlock the queue. `subscribe_inputs` therefore
//! returns a snapshot of the last three outstanding requests alongside the
//! live receiver.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::{broadcast, oneshot, Mutex};
use tracing::{debug, warn};

use ticpass_core::event::ProcessingEvent;
use ticpass_core::input::{UserInputRequest, UserInputResponse};
use ticpass_core::item::QueueItem;
use ticpass_core::result::ProcessingResult;

/// Progress events buffered per subscriber before the oldest is dropped.
const EVENT_CHANNEL_CAPACITY: usize = 10;

/// Input requests buffered per subscriber; also the replay window size.
const INPUT_CHANNEL_CAPACITY: usize = 3;

// =============================================================================
// Processor Core
// =============================================================================

/// Channels and input bookkeeping shared by every processor.
pub struct ProcessorCore<E: ProcessingEvent> {
    events_tx: broadcast::Sender<E>,
    inputs_tx: broadcast::Sender<UserInputRequest>,

    /// Outstanding (unanswered) requests, newest last. Capped at the replay
    /// window size.
    outstanding: Mutex<VecDeque<UserInputRequest>>,

    /// Parked `process()` calls by request id.
    waiters: Mutex<HashMap<String, oneshot::Sender<UserInputResponse>>>,
}

impl<E: ProcessingEvent> Default for ProcessorCore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ProcessingEvent> ProcessorCore<E> {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (inputs_tx, _) = broadcast::channel(INPUT_CHANNEL_CAPACITY);
        ProcessorCore {
            events_tx,
            inputs_tx,
            outstanding: Mutex::new(VecDeque::new()),
            waiters: Mutex::new(HashMap::new()),
        }
    }

    /// Broadcasts a progress event. Fire-and-forget: no subscribers is fine.
    pub fn emit(&self, event: E) {
        let _ = self.events_tx.send(event);
    }

    /// Subscribes to progress events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<E> {
        self.events_tx.subscribe()
    }

    /// Subscribes to input requests, returning the outstanding requests a
    /// late subscriber missed alongside the live receiver.
    pub async fn subscribe_inputs(
        &self,
    ) -> (Vec<UserInputRequest>, broadcast::Receiver<UserInputRequest>) {
        let outstanding = self.outstanding.lock().await;
        let snapshot = outstanding.iter().cloned().collect();
        (snapshot, self.inputs_tx.subscribe())
    }

    /// Broadcasts a request and parks the caller until an answer, the
    /// request's timeout, or an abort.
    pub async fn request_user_input(&self, request: UserInputRequest) -> UserInputResponse {
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().await.insert(request.id.clone(), tx);
        {
            let mut outstanding = self.outstanding.lock().await;
            if outstanding.len() == INPUT_CHANNEL_CAPACITY {
                outstanding.pop_front();
            }
            outstanding.push_back(request.clone());
        }
        let _ = self.inputs_tx.send(request.clone());
        debug!(request_id = %request.id, "user input requested");

        let response = match request.timeout {
            Some(deadline) => match tokio::time::timeout(deadline, rx).await {
                Ok(Ok(response)) => response,
                // Waiter dropped by an abort that raced the removal below.
                Ok(Err(_)) => UserInputResponse::canceled(&request.id),
                Err(_) => {
                    warn!(request_id = %request.id, "user input request timed out");
                    UserInputResponse::timeout(&request.id)
                }
            },
            None => rx
                .await
                .unwrap_or_else(|_| UserInputResponse::canceled(&request.id)),
        };

        self.waiters.lock().await.remove(&request.id);
        self.outstanding
            .lock()
            .await
            .retain(|r| r.id != request.id);
        response
    }

    /// Forwards an answer to the parked request it correlates with.
    /// Returns `false` when no such request is waiting here.
    pub async fn provide_user_input(&self, response: UserInputResponse) -> bool {
        match self.waiters.lock().await.remove(&response.request_id) {
            Some(tx) => tx.send(response).is_ok(),
            None => false,
        }
    }

    /// Synthesizes a canceled answer for every parked request.
    pub async fn cancel_outstanding_inputs(&self) {
        let waiters: Vec<_> = self.waiters.lock().await.drain().collect();
        for (id, tx) in waiters {
            debug!(request_id = %id, "cancelling outstanding input request");
            let _ = tx.send(UserInputResponse::canceled(&id));
        }
        self.outstanding.lock().await.clear();
    }

    /// Re-broadcasts a delegate's request without registering a waiter; the
    /// dispatcher routes the answer back to the delegate itself.
    pub async fn forward_input_request(&self, request: UserInputRequest) {
        {
            let mut outstanding = self.outstanding.lock().await;
            if outstanding.len() == INPUT_CHANNEL_CAPACITY {
                outstanding.pop_front();
            }
            outstanding.push_back(request.clone());
        }
        let _ = self.inputs_tx.send(request);
    }

    /// Clears the replay window without touching parked waiters. Used by the
    /// dispatcher, whose window only ever holds forwarded requests.
    pub async fn clear_window(&self) {
        self.outstanding.lock().await.clear();
    }
}

// =============================================================================
// Queue Processor (object surface)
// =============================================================================

/// The surface the queue manager drives. One call to [`process`] per item;
/// at most one item in flight per processor instance.
///
/// [`process`]: QueueProcessor::process
#[async_trait]
pub trait QueueProcessor<T: QueueItem, E: ProcessingEvent>: Send + Sync {
    /// Processes one item to a single, exhaustive result. Never panics.
    async fn process(&self, item: &T) -> ProcessingResult;

    /// Aborts the in-flight operation: emits the cancelled marker and
    /// synthesizes canceled answers for outstanding input requests. Returns
    /// whether the abort itself succeeded, not whether processing had
    /// already finished.
    async fn abort(&self) -> bool;

    /// Routes a user's answer to the request it correlates with.
    async fn provide_user_input(&self, response: UserInputResponse) -> bool;

    /// Subscribes to progress events.
    fn events(&self) -> broadcast::Receiver<E>;

    /// Subscribes to input requests with the missed-request snapshot.
    async fn input_requests(
        &self,
    ) -> (Vec<UserInputRequest>, broadcast::Receiver<UserInputRequest>);
}

// =============================================================================
// Processor Template (hook surface)
// =============================================================================

/// What a concrete processor actually writes: domain logic plus optional
/// hooks. The blanket impl below supplies the [`QueueProcessor`] surface,
/// emitting `E::start()` before [`run`] and `E::cancelled()` on abort so no
/// concrete processor can forget either marker.
///
/// [`run`]: ProcessorTemplate::run
#[async_trait]
pub trait ProcessorTemplate<T: QueueItem, E: ProcessingEvent>: Send + Sync {
    /// The shared core this processor emits and waits through.
    fn core(&self) -> &ProcessorCore<E>;

    /// Domain logic for one item. The start marker is already out.
    async fn run(&self, item: &T) -> ProcessingResult;

    /// Hook for hardware-level cancellation (telling a card reader to stop,
    /// cutting a print job). Runs after outstanding inputs were cancelled.
    /// Returns whether the hardware abort succeeded.
    async fn on_abort(&self) -> bool {
        true
    }

    /// Hook for routing answers beyond this processor's own core (used by
    /// the dynamic dispatcher to reach its current delegate).
    async fn forward_user_input(&self, _response: UserInputResponse) -> bool {
        false
    }
}

#[async_trait]
impl<T, E, P> QueueProcessor<T, E> for P
where
    T: QueueItem,
    E: ProcessingEvent,
    P: ProcessorTemplate<T, E>,
{
    async fn process(&self, item: &T) -> ProcessingResult {
        self.core().emit(E::start());
        self.run(item).await
    }

    async fn abort(&self) -> bool {
        self.core().emit(E::cancelled());
        self.core().cancel_outstanding_inputs().await;
        self.on_abort().await
    }

    async fn provide_user_input(&self, response: UserInputResponse) -> bool {
        if self.core().provide_user_input(response.clone()).await {
            return true;
        }
        self.forward_user_input(response).await
    }

    fn events(&self) -> broadcast::Receiver<E> {
        self.core().subscribe_events()
    }

    async fn input_requests(
        &self,
    ) -> (Vec<UserInputRequest>, broadcast::Receiver<UserInputRequest>) {
        self.core().subscribe_inputs().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
