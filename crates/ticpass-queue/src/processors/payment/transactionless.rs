//! Transactionless "payments": comps and vouchers that record a sale
//! without moving money. Same validation as cash, no settlement step.

use std::time::Duration;

use async_trait::async_trait;

use ticpass_core::error::ProcessingErrorEvent;
use ticpass_core::models::payment::{PaymentEvent, PaymentQueueItem};
use ticpass_core::result::{ProcessingOutcome, ProcessingResult};

use crate::processor::{ProcessorCore, ProcessorTemplate};
use crate::processors::payment::{transaction_id, MIN_AMOUNT_CENTS};

pub struct TransactionlessPaymentProcessor {
    core: ProcessorCore<PaymentEvent>,
}

impl Default for TransactionlessPaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionlessPaymentProcessor {
    pub fn new() -> Self {
        TransactionlessPaymentProcessor {
            core: ProcessorCore::new(),
        }
    }
}

#[async_trait]
impl ProcessorTemplate<PaymentQueueItem, PaymentEvent> for TransactionlessPaymentProcessor {
    fn core(&self) -> &ProcessorCore<PaymentEvent> {
        &self.core
    }

    async fn run(&self, item: &PaymentQueueItem) -> ProcessingResult {
        self.core.emit(PaymentEvent::TransactionProcessing);
        tokio::time::sleep(Duration::from_millis(500)).await;

        if item.amount_cents <= MIN_AMOUNT_CENTS {
            return ProcessingResult::Error(ProcessingErrorEvent::InvalidTransactionAmount);
        }

        self.core.emit(PaymentEvent::TransactionDone);
        ProcessingResult::Success(ProcessingOutcome::Payment {
            transaction_id: transaction_id("TRANSACTIONLESS"),
            auth_token: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticpass_core::models::payment::PaymentProcessorType;
    use crate::processor::QueueProcessor;

    #[tokio::test(start_paused = true)]
    async fn test_records_sale_without_settlement() {
        let processor = TransactionlessPaymentProcessor::new();
        let item = PaymentQueueItem::new(5000, PaymentProcessorType::Transactionless);
        match processor.process(&item).await {
            ProcessingResult::Success(ProcessingOutcome::Payment { transaction_id, .. }) => {
                assert!(transaction_id.starts_with("TRANSACTIONLESS-"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }
}
