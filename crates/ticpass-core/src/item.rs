//! # Queue Items
//!
//! The persisted unit of work and its lifecycle state.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Queue Item Lifecycle                              │
//! │                                                                         │
//! │   enqueue()                                                             │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  ┌─────────┐     picked by manager      ┌────────────┐                 │
//! │  │ PENDING │ ─────────────────────────► │ PROCESSING │                 │
//! │  └─────────┘                            └─────┬──────┘                 │
//! │      ▲                                        │                         │
//! │      │ SKIP (back of queue)     ┌─────────────┼─────────────┐          │
//! │      └──────────────────────────┤             │             │          │
//! │                                 ▼             ▼             ▼          │
//! │                             ┌──────┐     ┌────────┐    ┌─────────┐    │
//! │                             │ DONE │     │ FAILED │    │ ABORTED │    │
//! │                             └──────┘     └────────┘    └─────────┘    │
//! │                                                                         │
//! │  DONE/FAILED/ABORTED rows are removed by the cleanup pass.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual Identity Pattern
//! Every item has:
//! - `id`: UUID v4 string - stable for the lifetime of the item
//! - `priority`: processing order hint - higher is processed first

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

// =============================================================================
// Queue Item Status
// =============================================================================

/// The lifecycle status of a queue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum QueueItemStatus {
    /// Waiting in the queue for its turn.
    Pending,
    /// Currently checked out by the manager (at most one per queue).
    Processing,
    /// Processed successfully.
    Done,
    /// Processing failed and the user chose not to retry.
    Failed,
    /// Abandoned by an abort; kept parked for a future session.
    Aborted,
}

impl QueueItemStatus {
    /// Statuses that represent a finished item (no further processing).
    pub const FINISHED: [QueueItemStatus; 3] = [
        QueueItemStatus::Done,
        QueueItemStatus::Failed,
        QueueItemStatus::Aborted,
    ];
}

impl Default for QueueItemStatus {
    fn default() -> Self {
        QueueItemStatus::Pending
    }
}

impl fmt::Display for QueueItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueueItemStatus::Pending => "pending",
            QueueItemStatus::Processing => "processing",
            QueueItemStatus::Done => "done",
            QueueItemStatus::Failed => "failed",
            QueueItemStatus::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Queue Item Contract
// =============================================================================

/// One discrete unit of work: a payment, print job, refund or NFC operation.
///
/// Concrete variants carry domain payload (amount/method for payment, file
/// path for printing, …); the engine only ever touches this surface.
///
/// ## Status Mutability
/// The engine owns every status transition and persists it through the
/// storage contract; processors never mutate an item's status themselves.
pub trait QueueItem: Clone + Send + Sync + 'static {
    /// Unique identifier, stable for the lifetime of the item.
    fn id(&self) -> &str;

    /// Processing order hint; higher priorities are processed first.
    fn priority(&self) -> i32;

    /// Re-ranks the item (used when an item is skipped to the back).
    fn set_priority(&mut self, priority: i32);

    /// Current lifecycle status.
    fn status(&self) -> QueueItemStatus;

    /// Moves the item to a new lifecycle status.
    fn set_status(&mut self, status: QueueItemStatus);
}

/// A queue item that can be routed to one of several concrete processors.
///
/// The `Route` discriminator is how a mixed queue (cash next to PIX next to
/// Bitcoin-Lightning) still reaches the right hardware: the dynamic processor
/// looks the route up in its table and delegates.
pub trait RoutedQueueItem: QueueItem {
    /// Discriminator type, e.g. `PaymentProcessorType`.
    type Route: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// The route this item should be dispatched to.
    fn route(&self) -> Self::Route;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(QueueItemStatus::default(), QueueItemStatus::Pending);
    }

    #[test]
    fn test_finished_statuses() {
        assert!(QueueItemStatus::FINISHED.contains(&QueueItemStatus::Done));
        assert!(QueueItemStatus::FINISHED.contains(&QueueItemStatus::Failed));
        assert!(QueueItemStatus::FINISHED.contains(&QueueItemStatus::Aborted));
        assert!(!QueueItemStatus::FINISHED.contains(&QueueItemStatus::Pending));
    }

    #[test]
    fn test_status_display_matches_serde() {
        assert_eq!(QueueItemStatus::Processing.to_string(), "processing");
        assert_eq!(
            serde_json::to_string(&QueueItemStatus::Processing).unwrap(),
            "\"processing\""
        );
    }
}
