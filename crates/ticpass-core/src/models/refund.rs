//! # Refund Domain Model
//!
//! Refunds reverse a previously settled acquirer transaction. The item
//! carries the original transaction id plus the authorization token the
//! acquirer handed back at settlement time; both are required to void.
//!
//! Refunds are not routed: there is a single acquirer refund rail, so the
//! item implements only [`QueueItem`] and runs under a plain processor
//! rather than a dispatch table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::ProcessingEvent;
use crate::item::{QueueItem, QueueItemStatus};

// =============================================================================
// Refund Queue Item
// =============================================================================

/// One refund waiting its turn at the terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundQueueItem {
    /// Stable UUID v4 identifier.
    pub id: String,
    /// Id of the transaction being reversed.
    pub transaction_id: String,
    /// Authorization token from the original settlement.
    pub auth_token: String,
    /// Higher runs first; ties break by insertion order.
    pub priority: i32,
    /// Lifecycle status, owned by the engine.
    pub status: QueueItemStatus,
    /// When the item was enqueued.
    pub created_at: DateTime<Utc>,
}

impl RefundQueueItem {
    pub fn new(transaction_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        RefundQueueItem {
            id: Uuid::new_v4().to_string(),
            transaction_id: transaction_id.into(),
            auth_token: auth_token.into(),
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

impl QueueItem for RefundQueueItem {
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

// =============================================================================
// Refund Progress Events
// =============================================================================

/// Progress milestones emitted while a refund is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundEvent {
    /// Processing began.
    Start,
    /// The acquirer is voiding the transaction.
    Refunding,
    /// The reversal settled.
    RefundDone,
    /// The in-flight refund was aborted.
    Cancelled,
}

impl ProcessingEvent for RefundEvent {
    fn start() -> Self {
        RefundEvent::Start
    }

    fn cancelled() -> Self {
        RefundEvent::Cancelled
    }

    fn is_start(&self) -> bool {
        matches!(self, RefundEvent::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_refund_is_pending() {
        let item = RefundQueueItem::new("TX-123", "AUTH-abc");
        assert_eq!(item.status, QueueItemStatus::Pending);
        assert_eq!(item.transaction_id, "TX-123");
    }

    #[test]
    fn test_serde_json_roundtrip() {
        let item = RefundQueueItem::new("TX-9", "AUTH-9").with_priority(3);
        let json = serde_json::to_string(&item).unwrap();
        let back: RefundQueueItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
