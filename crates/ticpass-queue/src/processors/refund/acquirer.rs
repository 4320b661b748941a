//! Acquirer refunds: voiding a settled transaction with the original
//! transaction id and authorization token. The SDK void call is simulated;
//! the validation and event sequence are the real contract.

use std::time::Duration;

use async_trait::async_trait;

use ticpass_core::error::ProcessingErrorEvent;
use ticpass_core::models::refund::{RefundEvent, RefundQueueItem};
use ticpass_core::result::{ProcessingOutcome, ProcessingResult};

use crate::processor::{ProcessorCore, ProcessorTemplate};

pub struct AcquirerRefundProcessor {
    core: ProcessorCore<RefundEvent>,
}

impl Default for AcquirerRefundProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl AcquirerRefundProcessor {
    pub fn new() -> Self {
        AcquirerRefundProcessor {
            core: ProcessorCore::new(),
        }
    }
}

#[async_trait]
impl ProcessorTemplate<RefundQueueItem, RefundEvent> for AcquirerRefundProcessor {
    fn core(&self) -> &ProcessorCore<RefundEvent> {
        &self.core
    }

    async fn run(&self, item: &RefundQueueItem) -> ProcessingResult {
        if item.transaction_id.is_empty() {
            return ProcessingResult::Error(ProcessingErrorEvent::TransactionNotFound);
        }
        if item.auth_token.is_empty() {
            return ProcessingResult::Error(ProcessingErrorEvent::RefundError);
        }

        self.core.emit(RefundEvent::Refunding);
        tokio::time::sleep(Duration::from_millis(1200)).await;
        self.core.emit(RefundEvent::RefundDone);

        ProcessingResult::Success(ProcessingOutcome::Refund {
            transaction_id: item.transaction_id.clone(),
        })
    }
}
