//! Cash payments: no SDK, no hardware - the operator takes the money and
//! the processor records the sale after a short settling delay.

use std::time::Duration;

use async_trait::async_trait;

use ticpass_core::error::ProcessingErrorEvent;
use ticpass_core::models::payment::{PaymentEvent, PaymentQueueItem};
use ticpass_core::result::{ProcessingOutcome, ProcessingResult};

use crate::processor::{ProcessorCore, ProcessorTemplate};
use crate::processors::payment::{transaction_id, MIN_AMOUNT_CENTS};

pub struct CashPaymentProcessor {
    core: ProcessorCore<PaymentEvent>,
}

impl Default for CashPaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl CashPaymentProcessor {
    pub fn new() -> Self {
        CashPaymentProcessor {
            core: ProcessorCore::new(),
        }
    }
}

#[async_trait]
impl ProcessorTemplate<PaymentQueueItem, PaymentEvent> for CashPaymentProcessor {
    fn core(&self) -> &ProcessorCore<PaymentEvent> {
        &self.core
    }

    async fn run(&self, item: &PaymentQueueItem) -> ProcessingResult {
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let transaction_id = transaction_id("CASH");
        if item.amount_cents <= MIN_AMOUNT_CENTS {
            return ProcessingResult::Error(ProcessingErrorEvent::InvalidTransactionAmount);
        }

        tokio::time::sleep(Duration::from_millis(1000)).await;
        self.core.emit(PaymentEvent::TransactionDone);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        ProcessingResult::Success(ProcessingOutcome::Payment {
            transaction_id,
            auth_token: String::new(),
        })
    }
}
