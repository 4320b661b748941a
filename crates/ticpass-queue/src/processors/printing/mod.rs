//! # Printing Processors
//!
//! Receipt/ticket printing. The MP4200HS rail talks to a network thermal
//! printer; the registry wires it as the only explicit route, with itself
//! as fallback so acquirer-printer items still print somewhere sensible on
//! SDK-free builds.

mod mp4200hs;

pub use mp4200hs::{Mp4200HsPrintingProcessor, PrinterNetworkInfo};

use std::sync::Arc;

use ticpass_core::models::printing::{PrintingEvent, PrintingProcessorType, PrintingQueueItem};

use crate::dynamic::DynamicProcessor;

/// Explicitly wired route table for print jobs.
pub struct PrintingProcessorRegistry;

impl PrintingProcessorRegistry {
    pub fn new() -> Self {
        PrintingProcessorRegistry
    }

    pub fn dynamic_processor(&self) -> DynamicProcessor<PrintingQueueItem, PrintingEvent> {
        let mp4200hs = Arc::new(Mp4200HsPrintingProcessor::new());
        DynamicProcessor::new()
            .register(PrintingProcessorType::Mp4200Hs, mp4200hs.clone() as _)
            .with_fallback(mp4200hs as _)
    }
}

impl Default for PrintingProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
