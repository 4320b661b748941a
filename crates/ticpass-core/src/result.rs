//! # Processing Results
//!
//! The outcome vocabulary shared by every processor: `process()` returns
//! exactly one [`ProcessingResult`], never a partial state and never a panic.

use serde::{Deserialize, Serialize};

use crate::error::ProcessingErrorEvent;

// =============================================================================
// Processing Result
// =============================================================================

/// The single, exhaustive outcome of one `process()` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingResult {
    /// The operation completed; carries the domain-specific payload.
    Success(ProcessingOutcome),
    /// The operation failed with a categorical error event.
    Error(ProcessingErrorEvent),
}

impl ProcessingResult {
    /// Shorthand for a payload-free success.
    pub fn done() -> Self {
        ProcessingResult::Success(ProcessingOutcome::Completed)
    }

    /// Whether this result is a success of any kind.
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingResult::Success(_))
    }
}

// =============================================================================
// Domain Payloads
// =============================================================================

/// Domain-specific success payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingOutcome {
    /// Operation finished with nothing to report (e.g. a print job).
    Completed,

    /// A payment went through.
    Payment {
        /// Transaction id assigned by the processor (e.g. `CASH-1a2b3c4d`).
        transaction_id: String,
        /// Acquirer authorization token; empty for SDK-free processors.
        auth_token: String,
    },

    /// A refund was accepted by the acquirer.
    Refund {
        /// Id of the refunded transaction.
        transaction_id: String,
    },

    /// An NFC operation produced data (tag contents, balance, …).
    NfcPayload(serde_json::Value),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_done_is_success() {
        assert!(ProcessingResult::done().is_success());
        assert!(!ProcessingResult::Error(ProcessingErrorEvent::Generic).is_success());
    }
}
