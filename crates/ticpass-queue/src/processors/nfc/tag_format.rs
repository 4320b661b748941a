//! Tag formatting: wipes a tag and lays down the Ticpass sector layout
//! under freshly confirmed sector keys.

use std::time::Duration;

use async_trait::async_trait;

use ticpass_core::input::{UserInputKind, UserInputRequest};
use ticpass_core::models::nfc::{NfcEvent, NfcQueueItem};
use ticpass_core::result::{ProcessingOutcome, ProcessingResult};

use crate::processor::{ProcessorCore, ProcessorTemplate};

pub struct NfcTagFormatProcessor {
    core: ProcessorCore<NfcEvent>,
}

impl Default for NfcTagFormatProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl NfcTagFormatProcessor {
    pub fn new() -> Self {
        NfcTagFormatProcessor {
            core: ProcessorCore::new(),
        }
    }
}

#[async_trait]
impl ProcessorTemplate<NfcQueueItem, NfcEvent> for NfcTagFormatProcessor {
    fn core(&self) -> &ProcessorCore<NfcEvent> {
        &self.core
    }

    async fn run(&self, item: &NfcQueueItem) -> ProcessingResult {
        self.core.emit(NfcEvent::TagDetection);
        tokio::time::sleep(Duration::from_millis(1000)).await;

        // A dismissed prompt keeps the default transport keys.
        let keys = self
            .core
            .request_user_input(UserInputRequest::new(UserInputKind::ConfirmNfcKeys))
            .await
            .value;

        self.core.emit(NfcEvent::Writing);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        ProcessingResult::Success(ProcessingOutcome::NfcPayload(serde_json::json!({
            "formatted": true,
            "tag_id": item.payload["tag_id"],
            "custom_keys": keys.is_some(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ticpass_core::models::nfc::NfcProcessorType;
    use crate::processor::QueueProcessor;

    #[tokio::test(start_paused = true)]
    async fn test_format_proceeds_on_dismissed_keys_prompt() {
        // The 5 s keys prompt times out under paused time and the format
        // continues with transport keys.
        let processor = NfcTagFormatProcessor::new();
        let item = NfcQueueItem::new(NfcProcessorType::TagFormat, json!({ "tag_id": "tag-1" }));
        match processor.process(&item).await {
            ProcessingResult::Success(ProcessingOutcome::NfcPayload(payload)) => {
                assert_eq!(payload["formatted"], true);
                assert_eq!(payload["custom_keys"], false);
            }
            other => panic!("expected format success, got {other:?}"),
        }
    }
}
