//! # Domain Models
//!
//! Concrete queue item and progress-event types for the four Ticpass
//! processing domains. Each module pairs:
//!
//! - a `*QueueItem` struct (the persisted unit of work, serde-round-trippable
//!   so storage backends can keep the payload as JSON), and
//! - a `*ProcessorType` route enum plus a `*Event` progress enum.

pub mod nfc;
pub mod payment;
pub mod printing;
pub mod refund;

pub use nfc::{NfcEvent, NfcOperation, NfcProcessorType, NfcQueueItem};
pub use payment::{PaymentEvent, PaymentProcessorType, PaymentQueueItem};
pub use printing::{PrintingEvent, PrintingProcessorType, PrintingQueueItem};
pub use refund::{RefundEvent, RefundQueueItem};
