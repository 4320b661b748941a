//! Merchant-key PIX payments: the operator supplies the merchant PIX key,
//! the processor renders a BR Code and waits for the scan confirmation.
//! No acquirer SDK is involved; the money lands directly on the merchant
//! key.

use std::time::Duration;

use async_trait::async_trait;

use ticpass_core::error::ProcessingErrorEvent;
use ticpass_core::input::{UserInputKind, UserInputRequest};
use ticpass_core::models::payment::{PaymentEvent, PaymentQueueItem};
use ticpass_core::result::{ProcessingOutcome, ProcessingResult};

use crate::processor::{ProcessorCore, ProcessorTemplate};
use crate::processors::payment::{charge_for, transaction_id, MerchantConfig};

pub struct MerchantPixPaymentProcessor {
    core: ProcessorCore<PaymentEvent>,
    merchant: MerchantConfig,
}

impl MerchantPixPaymentProcessor {
    pub fn new(merchant: MerchantConfig) -> Self {
        MerchantPixPaymentProcessor {
            core: ProcessorCore::new(),
            merchant,
        }
    }

    /// Asks the operator for the merchant PIX key. A blank or missing
    /// answer is a hard failure; there is nothing to charge against.
    async fn request_pix_key(&self) -> Result<String, ProcessingErrorEvent> {
        let response = self
            .core
            .request_user_input(UserInputRequest::new(UserInputKind::ConfirmMerchantPixKey))
            .await;
        match response.as_str() {
            Some(key) if !key.trim().is_empty() => Ok(key.to_string()),
            _ => Err(ProcessingErrorEvent::InvalidPixKey),
        }
    }

    /// Shows the BR Code and waits for the scan confirmation. A dismissed
    /// or timed-out dialog counts as scanned: the payer may well have paid
    /// while the operator ignored the prompt.
    async fn request_pix_scanning(&self, pix_code: String) -> bool {
        let response = self
            .core
            .request_user_input(UserInputRequest::new(UserInputKind::MerchantPixScanning {
                pix_code,
            }))
            .await;
        response.as_bool().unwrap_or(true)
    }
}

#[async_trait]
impl ProcessorTemplate<PaymentQueueItem, PaymentEvent> for MerchantPixPaymentProcessor {
    fn core(&self) -> &ProcessorCore<PaymentEvent> {
        &self.core
    }

    async fn run(&self, item: &PaymentQueueItem) -> ProcessingResult {
        self.core.emit(PaymentEvent::TransactionProcessing);

        let key = match self.request_pix_key().await {
            Ok(key) => key,
            Err(event) => return ProcessingResult::Error(event),
        };
        let pix_code = match charge_for(&self.merchant, key, item).to_br_code() {
            Ok(code) => code,
            Err(_) => return ProcessingResult::Error(ProcessingErrorEvent::InvalidPixKey),
        };

        if !self.request_pix_scanning(pix_code).await {
            return ProcessingResult::Error(ProcessingErrorEvent::TransactionFailure);
        }

        self.core.emit(PaymentEvent::Authorizing);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        self.core.emit(PaymentEvent::TransactionDone);
        tokio::time::sleep(Duration::from_millis(300)).await;

        ProcessingResult::Success(ProcessingOutcome::Payment {
            transaction_id: transaction_id("PIX"),
            auth_token: String::new(),
        })
    }
}
