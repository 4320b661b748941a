//! # Payment Domain Model
//!
//! A payment queue item routes to one of several payment rails at the same
//! counter: cash drawer, merchant-key PIX, Bitcoin Lightning, a
//! transactionless marker, or the terminal's acquirer SDK. Amounts are kept
//! in cents of BRL; no floating point touches money.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::ProcessingEvent;
use crate::item::{QueueItem, QueueItemStatus, RoutedQueueItem};

// =============================================================================
// Payment Route
// =============================================================================

/// The payment rail an item should be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProcessorType {
    /// Operator-confirmed cash payment, no SDK involved.
    Cash,
    /// Merchant-key PIX: shows a BR Code, operator confirms the scan.
    MerchantPix,
    /// Bitcoin Lightning invoice.
    BitcoinLightning,
    /// Records the sale without moving money (comps, vouchers).
    Transactionless,
    /// The terminal's acquirer SDK (card present). Default fallback route.
    Acquirer,
}

// =============================================================================
// Payment Queue Item
// =============================================================================

/// One payment waiting its turn at the terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentQueueItem {
    /// Stable UUID v4 identifier.
    pub id: String,
    /// Amount in cents of BRL.
    pub amount_cents: i64,
    /// Which rail processes this payment.
    pub processor_type: PaymentProcessorType,
    /// Higher runs first; ties break by insertion order.
    pub priority: i32,
    /// Lifecycle status, owned by the engine.
    pub status: QueueItemStatus,
    /// Free-form order reference shown on receipts.
    pub order_reference: Option<String>,
    /// When the item was enqueued.
    pub created_at: DateTime<Utc>,
}

impl PaymentQueueItem {
    pub fn new(amount_cents: i64, processor_type: PaymentProcessorType) -> Self {
        PaymentQueueItem {
            id: Uuid::new_v4().to_string(),
            amount_cents,
            processor_type,
            priority: 0,
            status: QueueItemStatus::Pending,
            order_reference: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_order_reference(mut self, reference: impl Into<String>) -> Self {
        self.order_reference = Some(reference.into());
        self
    }
}

impl QueueItem for PaymentQueueItem {
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

impl RoutedQueueItem for PaymentQueueItem {
    type Route = PaymentProcessorType;

    fn route(&self) -> PaymentProcessorType {
        self.processor_type
    }
}

// =============================================================================
// Payment Progress Events
// =============================================================================

/// Progress milestones emitted while a payment is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEvent {
    /// Processing began.
    Start,
    /// The rail is working the transaction (SDK call, invoice wait, …).
    TransactionProcessing,
    /// Awaiting authorization from the acquirer/network.
    Authorizing,
    /// The transaction settled.
    TransactionDone,
    /// The in-flight payment was aborted.
    Cancelled,
}

impl ProcessingEvent for PaymentEvent {
    fn start() -> Self {
        PaymentEvent::Start
    }

    fn cancelled() -> Self {
        PaymentEvent::Cancelled
    }

    fn is_start(&self) -> bool {
        matches!(self, PaymentEvent::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_is_pending() {
        let item = PaymentQueueItem::new(2500, PaymentProcessorType::Cash);
        assert_eq!(item.status, QueueItemStatus::Pending);
        assert_eq!(item.priority, 0);
        assert_eq!(item.route(), PaymentProcessorType::Cash);
    }

    #[test]
    fn test_serde_json_roundtrip() {
        let item = PaymentQueueItem::new(9900, PaymentProcessorType::MerchantPix)
            .with_priority(5)
            .with_order_reference("ORD-42");
        let json = serde_json::to_string(&item).unwrap();
        let back: PaymentQueueItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_event_markers() {
        assert!(PaymentEvent::start().is_start());
        assert!(!PaymentEvent::TransactionDone.is_start());
        assert_eq!(PaymentEvent::cancelled(), PaymentEvent::Cancelled);
    }
}
