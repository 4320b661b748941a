//! # Input Requests & Responses
//!
//! Two-tier request/response vocabulary:
//!
//! - **Processor-level** ([`UserInputRequest`]/[`UserInputResponse`]): a value
//!   a specific in-flight processor needs mid-operation to continue, e.g.
//!   "confirm the merchant PIX key" or "was the QR code scanned?". The
//!   processor suspends (not thread-blocks) until the UI answers, the
//!   request times out, or an abort synthesizes a canceled answer.
//! - **Queue-level** ([`QueueInputRequest`]/[`QueueInputResponse`]): a
//!   decision the *queue* needs between items — confirm/skip the next item,
//!   or pick one of the four error-handling actions after a failure.
//!
//! ## Request/Resume Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Processor                    Engine                    UI              │
//! │     │                            │                       │              │
//! │     │ request_user_input(req) ──►│── broadcast(req) ────►│ show dialog  │
//! │     │        (suspended)         │                       │              │
//! │     │                            │◄─ provide_user_input ─│ user answers │
//! │     │◄── response by req.id ─────│                       │              │
//! │     │ resume exactly here        │                       │              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ErrorHandlingAction, ProcessingErrorEvent};

// =============================================================================
// User Input Request (processor-level)
// =============================================================================

/// A request for user input raised by an in-flight processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInputRequest {
    /// Correlates the eventual response to this request.
    pub id: String,
    /// How long to wait before synthesizing a timeout response.
    /// `None` waits effectively unbounded.
    pub timeout: Option<Duration>,
    /// What is being asked of the user.
    pub kind: UserInputKind,
}

/// The catalogue of mid-operation questions processors may ask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserInputKind {
    /// Should the customer receipt be printed?
    ConfirmCustomerReceiptPrinting,
    /// Ask the operator for / to confirm the merchant PIX key.
    ConfirmMerchantPixKey,
    /// Show the PIX BR Code and wait for the scan confirmation.
    MerchantPixScanning { pix_code: String },
    /// Confirm printer network information (IP address, port).
    ConfirmPrinterNetworkInfo,
    /// Confirm the paper cut after a print job.
    ConfirmPrinterPaperCut,
    /// Confirm the NFC sector keys to use.
    ConfirmNfcKeys,
    /// Confirm tag authentication with a PIN against the tag's subject.
    ConfirmNfcTagAuth { pin: String, subject_id: String },
    /// Collect customer data to write onto a tag.
    ConfirmNfcTagCustomerData,
    /// Customer confirms they saved their freshly generated tag PIN.
    ConfirmNfcTagCustomerSavePin { pin: String },
}

impl UserInputRequest {
    /// Creates a request with the kind's default timeout and a fresh id.
    pub fn new(kind: UserInputKind) -> Self {
        let timeout = Some(Self::default_timeout(&kind));
        UserInputRequest {
            id: Uuid::new_v4().to_string(),
            timeout,
            kind,
        }
    }

    /// Overrides the timeout (`None` waits unbounded).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-kind default deadlines, tuned for how long each dialog reasonably
    /// stays on screen at a busy counter.
    fn default_timeout(kind: &UserInputKind) -> Duration {
        let secs = match kind {
            UserInputKind::ConfirmCustomerReceiptPrinting => 10,
            UserInputKind::ConfirmMerchantPixKey => 60,
            UserInputKind::MerchantPixScanning { .. } => 60,
            UserInputKind::ConfirmPrinterNetworkInfo => 5,
            UserInputKind::ConfirmPrinterPaperCut => 10,
            UserInputKind::ConfirmNfcKeys => 5,
            UserInputKind::ConfirmNfcTagAuth { .. } => 30,
            UserInputKind::ConfirmNfcTagCustomerData => 300,
            UserInputKind::ConfirmNfcTagCustomerSavePin { .. } => 90,
        };
        Duration::from_secs(secs)
    }
}

// =============================================================================
// User Input Response (processor-level)
// =============================================================================

/// The answer delivered back to a waiting processor.
///
/// `value` is opaque to the engine; the waiting processor interprets it
/// (a PIX key string, a yes/no boolean, structured customer data, …).
///
/// Both [`canceled`](UserInputResponse::canceled) and
/// [`timeout`](UserInputResponse::timeout) encode as `value = None`; the two
/// are deliberately indistinguishable to the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInputResponse {
    /// Id of the request this answers.
    pub request_id: String,
    /// Opaque payload interpreted by the waiting processor.
    pub value: Option<serde_json::Value>,
}

impl UserInputResponse {
    /// A response carrying a value.
    pub fn of(request_id: impl Into<String>, value: serde_json::Value) -> Self {
        UserInputResponse {
            request_id: request_id.into(),
            value: Some(value),
        }
    }

    /// The user dismissed the dialog.
    pub fn canceled(request_id: impl Into<String>) -> Self {
        UserInputResponse {
            request_id: request_id.into(),
            value: None,
        }
    }

    /// No answer arrived before the request's deadline.
    pub fn timeout(request_id: impl Into<String>) -> Self {
        UserInputResponse {
            request_id: request_id.into(),
            value: None,
        }
    }

    /// The payload as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_ref().and_then(|v| v.as_bool())
    }

    /// The payload as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(|v| v.as_str())
    }
}

// =============================================================================
// Queue Input Request (queue-level)
// =============================================================================

/// A decision the queue itself needs from the outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueueInputRequest {
    /// Confirm (or skip) the next item before it is processed.
    ConfirmNextProcessor {
        id: String,
        /// Position of the item about to run.
        current_item_index: usize,
        /// Total items currently queued.
        total_items: usize,
        /// Id of the item about to run.
        current_item_id: String,
        /// Id of the item after it, if any.
        next_item_id: Option<String>,
    },

    /// An item failed; pick one of the four error-handling actions.
    ErrorRetryOrSkip {
        id: String,
        /// Id of the failed item.
        item_id: String,
        /// What went wrong.
        error: ProcessingErrorEvent,
    },
}

impl QueueInputRequest {
    /// Builds a confirmation request for the item about to run.
    pub fn confirm_next_processor(
        current_item_index: usize,
        total_items: usize,
        current_item_id: impl Into<String>,
        next_item_id: Option<String>,
    ) -> Self {
        QueueInputRequest::ConfirmNextProcessor {
            id: Uuid::new_v4().to_string(),
            current_item_index,
            total_items,
            current_item_id: current_item_id.into(),
            next_item_id,
        }
    }

    /// Builds an error-decision request for a failed item.
    pub fn error_retry_or_skip(item_id: impl Into<String>, error: ProcessingErrorEvent) -> Self {
        QueueInputRequest::ErrorRetryOrSkip {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.into(),
            error,
        }
    }

    /// The correlation id of this request.
    pub fn id(&self) -> &str {
        match self {
            QueueInputRequest::ConfirmNextProcessor { id, .. } => id,
            QueueInputRequest::ErrorRetryOrSkip { id, .. } => id,
        }
    }
}

// =============================================================================
// Queue Input Response (queue-level)
// =============================================================================

/// Typed payload of a queue-level answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueInputValue {
    /// Answer to `ConfirmNextProcessor`: proceed (`true`) or skip (`false`).
    Confirmation(bool),
    /// Answer to `ErrorRetryOrSkip`.
    ErrorAction(ErrorHandlingAction),
}

/// The answer to a [`QueueInputRequest`].
///
/// `is_canceled` distinguishes a dismissed dialog from a legitimate
/// `Confirmation(false)` answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueInputResponse {
    /// Id of the request this answers.
    pub request_id: String,
    /// The decision, absent when canceled.
    pub value: Option<QueueInputValue>,
    /// Whether the dialog was dismissed rather than answered.
    pub is_canceled: bool,
}

impl QueueInputResponse {
    fn new(request_id: impl Into<String>, value: Option<QueueInputValue>, canceled: bool) -> Self {
        QueueInputResponse {
            request_id: request_id.into(),
            value,
            is_canceled: canceled,
        }
    }

    /// The dialog was dismissed.
    pub fn canceled(request_id: impl Into<String>) -> Self {
        Self::new(request_id, None, true)
    }

    /// Proceed with the next item.
    pub fn proceed(request_id: impl Into<String>) -> Self {
        Self::new(request_id, Some(QueueInputValue::Confirmation(true)), false)
    }

    /// Skip the next item (rotate it to the back).
    pub fn skip(request_id: impl Into<String>) -> Self {
        Self::new(request_id, Some(QueueInputValue::Confirmation(false)), false)
    }

    /// Retry the failed item immediately.
    pub fn retry(request_id: impl Into<String>) -> Self {
        Self::error_action(request_id, ErrorHandlingAction::Retry)
    }

    /// Move the failed item to the back of the queue for a later retry.
    pub fn retry_later(request_id: impl Into<String>) -> Self {
        Self::error_action(request_id, ErrorHandlingAction::Skip)
    }

    /// Abandon the failed item but keep it parked for a future session.
    pub fn abort_current(request_id: impl Into<String>) -> Self {
        Self::error_action(request_id, ErrorHandlingAction::Abort)
    }

    /// Stop the entire queue.
    pub fn abort_all(request_id: impl Into<String>) -> Self {
        Self::error_action(request_id, ErrorHandlingAction::AbortAll)
    }

    fn error_action(request_id: impl Into<String>, action: ErrorHandlingAction) -> Self {
        Self::new(request_id, Some(QueueInputValue::ErrorAction(action)), false)
    }

    /// The error-handling action carried by this response, if any.
    pub fn error_handling_action(&self) -> Option<ErrorHandlingAction> {
        match self.value {
            Some(QueueInputValue::ErrorAction(action)) => Some(action),
            _ => None,
        }
    }

    /// The confirmation carried by this response, if any.
    pub fn confirmation(&self) -> Option<bool> {
        match self.value {
            Some(QueueInputValue::Confirmation(v)) => Some(v),
            _ => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let req = UserInputRequest::new(UserInputKind::ConfirmMerchantPixKey);
        assert_eq!(req.timeout, Some(Duration::from_secs(60)));

        let req = UserInputRequest::new(UserInputKind::ConfirmNfcTagCustomerData);
        assert_eq!(req.timeout, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_canceled_and_timeout_are_indistinguishable() {
        let canceled = UserInputResponse::canceled("r1");
        let timed_out = UserInputResponse::timeout("r1");
        assert_eq!(canceled, timed_out);
        assert!(canceled.value.is_none());
    }

    #[test]
    fn test_queue_response_factories() {
        let resp = QueueInputResponse::retry("r2");
        assert_eq!(
            resp.error_handling_action(),
            Some(ErrorHandlingAction::Retry)
        );
        assert!(!resp.is_canceled);

        let resp = QueueInputResponse::skip("r3");
        assert_eq!(resp.confirmation(), Some(false));

        let resp = QueueInputResponse::canceled("r4");
        assert!(resp.is_canceled);
        assert_eq!(resp.error_handling_action(), None);
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = QueueInputRequest::error_retry_or_skip("item", ProcessingErrorEvent::Generic);
        let b = QueueInputRequest::error_retry_or_skip("item", ProcessingErrorEvent::Generic);
        assert_ne!(a.id(), b.id());
    }
}
