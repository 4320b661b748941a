//! # Queue Engine Errors
//!
//! Errors surfaced by the manager's control surface. These are *caller*
//! errors (bad handle, stale request id, storage failure) - item-level
//! processing failures travel as `ProcessingResult::Error` through the
//! state channel instead.

use thiserror::Error;
use ticpass_core::storage::StorageError;

/// Result alias used across the queue engine.
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors from the queue manager's control surface.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// An operation referenced an item id the queue does not hold.
    #[error("no queued item with id {0}")]
    ItemNotFound(String),

    /// `abort_current` was called while nothing was processing.
    #[error("no item is currently processing")]
    NoActiveItem,

    /// A queue-level response referenced an unknown or already-answered
    /// request.
    #[error("no pending queue input request with id {0}")]
    UnknownInputRequest(String),
}
