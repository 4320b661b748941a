//! Bematech MP-4200 HS: a network thermal printer driven over a raw TCP
//! socket. The socket write itself is simulated; file validation, the
//! network-info prompt and the event sequence are the real contract.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ticpass_core::error::ProcessingErrorEvent;
use ticpass_core::input::{UserInputKind, UserInputRequest};
use ticpass_core::models::printing::{PrintingEvent, PrintingQueueItem};
use ticpass_core::result::{ProcessingOutcome, ProcessingResult};

use crate::processor::{ProcessorCore, ProcessorTemplate};

/// Where to reach the printer on the venue LAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterNetworkInfo {
    pub ip_address: String,
    pub port: u16,
}

impl Default for PrinterNetworkInfo {
    /// The MP-4200 HS factory address.
    fn default() -> Self {
        PrinterNetworkInfo {
            ip_address: "192.168.0.2".to_string(),
            port: 9100,
        }
    }
}

pub struct Mp4200HsPrintingProcessor {
    core: ProcessorCore<PrintingEvent>,
}

impl Default for Mp4200HsPrintingProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Mp4200HsPrintingProcessor {
    pub fn new() -> Self {
        Mp4200HsPrintingProcessor {
            core: ProcessorCore::new(),
        }
    }

    /// Asks the operator to confirm the printer's network information,
    /// falling back to the factory address when the answer is missing or
    /// malformed.
    async fn request_network_info(&self) -> PrinterNetworkInfo {
        let response = self
            .core
            .request_user_input(UserInputRequest::new(
                UserInputKind::ConfirmPrinterNetworkInfo,
            ))
            .await;
        response
            .value
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProcessorTemplate<PrintingQueueItem, PrintingEvent> for Mp4200HsPrintingProcessor {
    fn core(&self) -> &ProcessorCore<PrintingEvent> {
        &self.core
    }

    async fn run(&self, item: &PrintingQueueItem) -> ProcessingResult {
        self.core.emit(PrintingEvent::Processing);

        if !Path::new(&item.file_path).is_file() {
            return ProcessingResult::Error(ProcessingErrorEvent::InvalidFile);
        }

        let _network_info = self.request_network_info().await;

        self.core.emit(PrintingEvent::Printing);
        // One pass of the print head per copy.
        for _ in 0..item.copies.max(1) {
            tokio::time::sleep(Duration::from_millis(800)).await;
        }

        ProcessingResult::Success(ProcessingOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use ticpass_core::models::printing::PrintingProcessorType;
    use crate::processor::QueueProcessor;

    #[tokio::test(start_paused = true)]
    async fn test_missing_file_is_invalid_file() {
        let processor = Mp4200HsPrintingProcessor::new();
        let item = PrintingQueueItem::new("/nonexistent/ticket.bin", PrintingProcessorType::Mp4200Hs);
        assert_eq!(
            processor.process(&item).await,
            ProcessingResult::Error(ProcessingErrorEvent::InvalidFile)
        );
    }

    #[tokio::test]
    async fn test_processing_then_printing_event_order() {
        let file = std::env::temp_dir().join("ticpass-mp4200hs-test.bin");
        std::fs::write(&file, b"ticket").unwrap();

        let processor = Arc::new(Mp4200HsPrintingProcessor::new());
        let mut events = processor.events();
        let item = PrintingQueueItem::new(
            file.to_string_lossy().to_string(),
            PrintingProcessorType::Mp4200Hs,
        );

        let worker = {
            let processor = processor.clone();
            tokio::spawn(async move { processor.process(&item).await })
        };

        // Default the network info by dismissing the prompt.
        let (snapshot, mut inputs) = processor.input_requests().await;
        let request = match snapshot.into_iter().next() {
            Some(request) => request,
            None => inputs.recv().await.unwrap(),
        };
        processor
            .provide_user_input(ticpass_core::input::UserInputResponse::canceled(&request.id))
            .await;

        assert_eq!(
            worker.await.unwrap(),
            ProcessingResult::Success(ProcessingOutcome::Completed)
        );
        assert_eq!(events.recv().await.unwrap(), PrintingEvent::Start);
        assert_eq!(events.recv().await.unwrap(), PrintingEvent::Processing);
        assert_eq!(events.recv().await.unwrap(), PrintingEvent::Printing);

        std::fs::remove_file(&file).ok();
    }
}
