//! Customer authentication: the tag carries a subject record; the operator
//! confirms the customer's PIN against it before any balance operation.

use std::time::Duration;

use async_trait::async_trait;

use ticpass_core::error::ProcessingErrorEvent;
use ticpass_core::input::{UserInputKind, UserInputRequest};
use ticpass_core::models::nfc::{NfcEvent, NfcQueueItem};
use ticpass_core::result::{ProcessingOutcome, ProcessingResult};

use crate::processor::{ProcessorCore, ProcessorTemplate};

pub struct NfcCustomerAuthProcessor {
    core: ProcessorCore<NfcEvent>,
}

impl Default for NfcCustomerAuthProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl NfcCustomerAuthProcessor {
    pub fn new() -> Self {
        NfcCustomerAuthProcessor {
            core: ProcessorCore::new(),
        }
    }
}

#[async_trait]
impl ProcessorTemplate<NfcQueueItem, NfcEvent> for NfcCustomerAuthProcessor {
    fn core(&self) -> &ProcessorCore<NfcEvent> {
        &self.core
    }

    async fn run(&self, item: &NfcQueueItem) -> ProcessingResult {
        let Some(pin) = item.payload["pin"].as_str().map(str::to_string) else {
            return ProcessingResult::Error(ProcessingErrorEvent::NfcReadError);
        };
        let Some(subject_id) = item.payload["subject_id"].as_str().map(str::to_string) else {
            return ProcessingResult::Error(ProcessingErrorEvent::NfcReadError);
        };

        self.core.emit(NfcEvent::TagDetection);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        self.core.emit(NfcEvent::Authenticating);

        let response = self
            .core
            .request_user_input(UserInputRequest::new(UserInputKind::ConfirmNfcTagAuth {
                pin,
                subject_id: subject_id.clone(),
            }))
            .await;
        if response.as_bool() != Some(true) {
            return ProcessingResult::Error(ProcessingErrorEvent::NfcCustomerPinIncorrect);
        }

        ProcessingResult::Success(ProcessingOutcome::NfcPayload(serde_json::json!({
            "authenticated": true,
            "subject_id": subject_id,
        })))
    }
}
