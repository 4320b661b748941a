//! # NFC Domain Model
//!
//! Cashless wristband/card operations against MIFARE Classic tags. NFC items
//! are memory-only by convention (`PersistenceStrategy::Never`): replaying a
//! tag write after a crash would double-apply it against whatever tag happens
//! to be on the reader.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::ProcessingEvent;
use crate::item::{QueueItem, QueueItemStatus, RoutedQueueItem};

// =============================================================================
// NFC Route
// =============================================================================

/// The NFC operation an item should be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NfcProcessorType {
    /// Verify the customer PIN against the tag's subject record.
    CustomerAuth,
    /// Wipe the tag and lay down the Ticpass sector layout.
    TagFormat,
    /// Write a fresh customer record (and PIN) onto a formatted tag.
    CustomerSetup,
    /// Read the cart sectors off the tag.
    CartRead,
    /// Rewrite the cart sectors on the tag.
    CartUpdate,
    /// Read the stored balance.
    BalanceRead,
    /// Rewrite the stored balance.
    BalanceUpdate,
}

// =============================================================================
// NFC Queue Item
// =============================================================================

/// Operation-specific input data carried by an NFC item.
///
/// Kept as structured JSON so the engine and storage stay ignorant of each
/// operation's sector layout.
pub type NfcOperation = serde_json::Value;

/// One NFC operation waiting for a tag on the reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NfcQueueItem {
    /// Stable UUID v4 identifier.
    pub id: String,
    /// Which NFC operation this item performs.
    pub processor_type: NfcProcessorType,
    /// Operation input (balance delta, customer record, cart lines, …).
    pub payload: NfcOperation,
    /// Higher runs first; ties break by insertion order.
    pub priority: i32,
    /// Lifecycle status, owned by the engine.
    pub status: QueueItemStatus,
    /// When the item was enqueued.
    pub created_at: DateTime<Utc>,
}

impl NfcQueueItem {
    pub fn new(processor_type: NfcProcessorType, payload: NfcOperation) -> Self {
        NfcQueueItem {
            id: Uuid::new_v4().to_string(),
            processor_type,
            payload,
            priority: 0,
            status: QueueItemStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl QueueItem for NfcQueueItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    fn status(&self) -> QueueItemStatus {
        self.status
    }

    fn set_status(&mut self, status: QueueItemStatus) {
        self.status = status;
    }
}

impl RoutedQueueItem for NfcQueueItem {
    type Route = NfcProcessorType;

    fn route(&self) -> NfcProcessorType {
        self.processor_type
    }
}

// =============================================================================
// NFC Progress Events
// =============================================================================

/// Progress milestones emitted while an NFC operation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NfcEvent {
    /// Processing began.
    Start,
    /// Waiting for a tag to make contact.
    TagDetection,
    /// Authenticating sector keys against the tag.
    Authenticating,
    /// Reading sectors.
    Reading,
    /// Writing sectors.
    Writing,
    /// The in-flight operation was aborted.
    Cancelled,
}

impl ProcessingEvent for NfcEvent {
    fn start() -> Self {
        NfcEvent::Start
    }

    fn cancelled() -> Self {
        NfcEvent::Cancelled
    }

    fn is_start(&self) -> bool {
        matches!(self, NfcEvent::Start)
    }
}
