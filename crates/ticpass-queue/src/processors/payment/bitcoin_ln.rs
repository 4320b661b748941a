//! Bitcoin Lightning payments: invoice display and settlement wait,
//! simulated at the node seam.

use std::time::Duration;

use async_trait::async_trait;

use ticpass_core::error::ProcessingErrorEvent;
use ticpass_core::models::payment::{PaymentEvent, PaymentQueueItem};
use ticpass_core::result::{ProcessingOutcome, ProcessingResult};

use crate::processor::{ProcessorCore, ProcessorTemplate};
use crate::processors::payment::{transaction_id, MIN_AMOUNT_CENTS};

pub struct BitcoinLnPaymentProcessor {
    core: ProcessorCore<PaymentEvent>,
}

impl Default for BitcoinLnPaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl BitcoinLnPaymentProcessor {
    pub fn new() -> Self {
        BitcoinLnPaymentProcessor {
            core: ProcessorCore::new(),
        }
    }
}

#[async_trait]
impl ProcessorTemplate<PaymentQueueItem, PaymentEvent> for BitcoinLnPaymentProcessor {
    fn core(&self) -> &ProcessorCore<PaymentEvent> {
        &self.core
    }

    async fn run(&self, item: &PaymentQueueItem) -> ProcessingResult {
        self.core.emit(PaymentEvent::TransactionProcessing);

        if item.amount_cents <= MIN_AMOUNT_CENTS {
            return ProcessingResult::Error(ProcessingErrorEvent::InvalidTransactionAmount);
        }

        // Invoice settlement window.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        self.core.emit(PaymentEvent::Authorizing);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        self.core.emit(PaymentEvent::TransactionDone);

        ProcessingResult::Success(ProcessingOutcome::Payment {
            transaction_id: transaction_id("BTC_LN"),
            auth_token: String::new(),
        })
    }
}
