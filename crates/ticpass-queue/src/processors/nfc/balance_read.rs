//! Balance read: authenticates against the tag and reads the stored
//! balance sectors.

use std::time::Duration;

use async_trait::async_trait;

use ticpass_core::error::ProcessingErrorEvent;
use ticpass_core::models::nfc::{NfcEvent, NfcQueueItem};
use ticpass_core::result::{ProcessingOutcome, ProcessingResult};

use crate::processor::{ProcessorCore, ProcessorTemplate};

pub struct NfcBalanceReadProcessor {
    core: ProcessorCore<NfcEvent>,
}

impl Default for NfcBalanceReadProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl NfcBalanceReadProcessor {
    pub fn new() -> Self {
        NfcBalanceReadProcessor {
            core: ProcessorCore::new(),
        }
    }
}

#[async_trait]
impl ProcessorTemplate<NfcQueueItem, NfcEvent> for NfcBalanceReadProcessor {
    fn core(&self) -> &ProcessorCore<NfcEvent> {
        &self.core
    }

    async fn run(&self, item: &NfcQueueItem) -> ProcessingResult {
        self.core.emit(NfcEvent::TagDetection);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        self.core.emit(NfcEvent::Authenticating);
        tokio::time::sleep(Duration::from_millis(300)).await;
        self.core.emit(NfcEvent::Reading);

        // The reader seam is simulated: the expected sector contents ride
        // in on the item payload.
        let Some(balance_cents) = item.payload["balance_cents"].as_i64() else {
            return ProcessingResult::Error(ProcessingErrorEvent::NfcReadError);
        };

        ProcessingResult::Success(ProcessingOutcome::NfcPayload(serde_json::json!({
            "balance_cents": balance_cents,
        })))
    }
}
