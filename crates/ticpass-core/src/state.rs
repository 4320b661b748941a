//! # Queue Processing State
//!
//! The single channel the UI observes to render queue progress. Exactly one
//! state is active at a time per queue instance; the manager publishes it on
//! a `tokio::sync::watch` channel so late subscribers always see the current
//! state.

use crate::error::ProcessingErrorEvent;

// =============================================================================
// Processing State
// =============================================================================

/// Queue-level processing state, parameterized over the item type.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingState<T> {
    /// No item is being worked and the drain loop is parked.
    QueueIdle,
    /// Every item was processed; the queue ran itself empty.
    QueueDone,
    /// The queue was canceled from the outside; pending items stay persisted.
    QueueCanceled,
    /// The queue was stopped via the AbortAll error action.
    QueueAborted,
    /// An item is checked out and being processed.
    ItemProcessing(T),
    /// The current item completed successfully.
    ItemDone(T),
    /// The current item was aborted.
    ItemAborted(T),
    /// The current item failed; the queue is waiting on an error decision.
    ItemFailed(T, ProcessingErrorEvent),
    /// The failed item is about to be re-processed in place.
    ItemRetrying(T),
    /// The item was moved to the back of the queue for a later retry.
    ItemSkipped(T),
}

impl<T> Default for ProcessingState<T> {
    fn default() -> Self {
        ProcessingState::QueueIdle
    }
}

impl<T> ProcessingState<T> {
    /// Whether this state ends the whole queue run (not just one item).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessingState::QueueDone
                | ProcessingState::QueueCanceled
                | ProcessingState::QueueAborted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state: ProcessingState<u32> = ProcessingState::default();
        assert_eq!(state, ProcessingState::QueueIdle);
    }

    #[test]
    fn test_terminal_states() {
        assert!(ProcessingState::<u32>::QueueDone.is_terminal());
        assert!(ProcessingState::<u32>::QueueAborted.is_terminal());
        assert!(!ProcessingState::ItemProcessing(1u32).is_terminal());
    }
}
