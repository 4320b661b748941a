//! # Domain Wiring
//!
//! Convenience constructors assembling a manager per domain: storage +
//! registry-built dispatcher + configuration. Each call produces a fully
//! independent queue; nothing here is a singleton.

use std::sync::Arc;

use ticpass_core::config::QueueConfig;
use ticpass_core::models::nfc::{NfcEvent, NfcQueueItem};
use ticpass_core::models::payment::{PaymentEvent, PaymentQueueItem};
use ticpass_core::models::printing::{PrintingEvent, PrintingQueueItem};
use ticpass_core::models::refund::{RefundEvent, RefundQueueItem};
use ticpass_core::storage::QueueStorage;

use crate::manager::HybridQueueManager;
use crate::processors::nfc::NfcProcessorRegistry;
use crate::processors::payment::{MerchantConfig, PaymentProcessorRegistry};
use crate::processors::printing::PrintingProcessorRegistry;
use crate::processors::refund::AcquirerRefundProcessor;

/// A payment queue with every SDK-free rail wired.
pub fn payment_queue_manager(
    storage: Arc<dyn QueueStorage<PaymentQueueItem>>,
    config: QueueConfig,
    merchant: MerchantConfig,
) -> HybridQueueManager<PaymentQueueItem, PaymentEvent> {
    let dispatcher = PaymentProcessorRegistry::new(merchant).dynamic_processor();
    HybridQueueManager::new(Arc::new(dispatcher), storage, config)
}

/// A printing queue driving the MP-4200 HS rail.
pub fn printing_queue_manager(
    storage: Arc<dyn QueueStorage<PrintingQueueItem>>,
    config: QueueConfig,
) -> HybridQueueManager<PrintingQueueItem, PrintingEvent> {
    let dispatcher = PrintingProcessorRegistry::new().dynamic_processor();
    HybridQueueManager::new(Arc::new(dispatcher), storage, config)
}

/// A refund queue; single rail, no dispatcher.
pub fn refund_queue_manager(
    storage: Arc<dyn QueueStorage<RefundQueueItem>>,
    config: QueueConfig,
) -> HybridQueueManager<RefundQueueItem, RefundEvent> {
    HybridQueueManager::new(Arc::new(AcquirerRefundProcessor::new()), storage, config)
}

/// An NFC queue; callers usually pair this with
/// `PersistenceStrategy::Never`.
pub fn nfc_queue_manager(
    storage: Arc<dyn QueueStorage<NfcQueueItem>>,
    config: QueueConfig,
) -> HybridQueueManager<NfcQueueItem, NfcEvent> {
    let dispatcher = NfcProcessorRegistry::new().dynamic_processor();
    HybridQueueManager::new(Arc::new(dispatcher), storage, config)
}
