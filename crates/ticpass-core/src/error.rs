//! # Processing Error Taxonomy
//!
//! Domain-agnostic error events surfaced by processors, plus the four-way
//! protocol the queue offers the user when an item fails.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Error Propagation                                  │
//! │                                                                         │
//! │  Vendor SDK error code / hardware condition                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProcessingErrorEvent (this module) ← concrete processor translates;   │
//! │       │                               unknown codes become Generic     │
//! │       ▼                                                                 │
//! │  ProcessingResult::Error → ProcessingState::ItemFailed                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  QueueInputRequest::ErrorRetryOrSkip → UI prompts the operator         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ErrorHandlingAction (Retry / Skip / Abort / AbortAll)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Processing Error Events
// =============================================================================

/// Categorical error codes emitted during item processing.
///
/// Concrete processors translate vendor SDK codes into this taxonomy before
/// returning from `process()`; anything unrecognized maps to [`Generic`]
/// rather than being dropped or escaping as a panic.
///
/// [`Generic`]: ProcessingErrorEvent::Generic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingErrorEvent {
    /// Unexpected error. Try again.
    #[error("unexpected processing error")]
    Generic,

    /// The operator or customer canceled the operation.
    #[error("operation cancelled by user")]
    CancelledByUser,

    /// Operation timeout exceeded. Try again.
    #[error("operation timed out")]
    OperationTimeout,

    /// Connectivity to the acquirer/backend was lost mid-operation.
    #[error("connection error")]
    ConnectionError,

    /// Terminal battery too low to safely run the hardware operation.
    #[error("battery too low")]
    LowBattery,

    /// The requested capability is not available on this terminal/flavor.
    #[error("feature unavailable")]
    FeatureUnavailable,

    /// No processor registered for the item's route.
    #[error("no suitable processor found")]
    ProcessorNotFound,

    // ---- payment ----
    /// Transaction amount outside the accepted range.
    #[error("invalid transaction amount")]
    InvalidTransactionAmount,

    /// The transaction was declined or failed at the acquirer.
    #[error("transaction failure")]
    TransactionFailure,

    /// Merchant PIX key missing or malformed.
    #[error("invalid PIX key")]
    InvalidPixKey,

    // ---- printing ----
    /// Generic printer failure.
    #[error("printer error")]
    PrinterError,

    /// Printer busy with another job.
    #[error("printer busy")]
    PrinterBusy,

    /// Printer out of paper.
    #[error("printer out of paper")]
    PrinterOutOfPaper,

    /// Printer overheated; wait before retrying.
    #[error("printer overheating")]
    PrinterOverheating,

    /// Print source file missing or unreadable.
    #[error("invalid print file")]
    InvalidFile,

    // ---- refund ----
    /// Refund rejected by the acquirer. Try again later.
    #[error("refund error")]
    RefundError,

    /// The referenced transaction could not be found for refund.
    #[error("transaction not found")]
    TransactionNotFound,

    // ---- NFC ----
    /// No tag made contact within the detection window.
    #[error("NFC tag not found")]
    NfcTagNotFound,

    /// Reading sectors from the tag failed.
    #[error("NFC read error")]
    NfcReadError,

    /// Writing sectors to the tag failed.
    #[error("NFC write error")]
    NfcWriteError,

    /// Tag keys rejected by the tag.
    #[error("invalid NFC tag keys")]
    NfcTagInvalidKeys,

    /// Customer PIN did not match the tag's subject.
    #[error("NFC customer PIN incorrect")]
    NfcCustomerPinIncorrect,
}

// =============================================================================
// Error Handling Actions
// =============================================================================

/// The four-way decision offered to the user after an item fails.
///
/// Domain-agnostic by design: payment, printing, refund and NFC queues all
/// wire identical affordances to these actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandlingAction {
    /// Re-invoke `process()` on the same item immediately, no reordering.
    Retry,
    /// Move the item to the back of the queue for a later retry; advance now.
    Skip,
    /// Abandon this attempt but keep the item parked for a future session.
    Abort,
    /// Stop the entire queue; no further items until explicitly restarted.
    AbortAll,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_event_messages() {
        assert_eq!(
            ProcessingErrorEvent::PrinterOutOfPaper.to_string(),
            "printer out of paper"
        );
        assert_eq!(
            ProcessingErrorEvent::InvalidTransactionAmount.to_string(),
            "invalid transaction amount"
        );
    }

    #[test]
    fn test_error_event_serde_roundtrip() {
        let json = serde_json::to_string(&ProcessingErrorEvent::NfcTagNotFound).unwrap();
        assert_eq!(json, "\"nfc_tag_not_found\"");
        let back: ProcessingErrorEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProcessingErrorEvent::NfcTagNotFound);
    }
}
