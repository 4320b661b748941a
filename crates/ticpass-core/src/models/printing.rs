//! # Printing Domain Model
//!
//! Print jobs reference a rendered receipt/ticket file on disk; the processor
//! validates the file and drives the printer head. The MP4200HS is a
//! network thermal printer, so its processor additionally confirms network
//! information with the operator before the first job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::ProcessingEvent;
use crate::item::{QueueItem, QueueItemStatus, RoutedQueueItem};

// =============================================================================
// Printing Route
// =============================================================================

/// The printer hardware an item should be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintingProcessorType {
    /// Bematech MP-4200 HS network thermal printer.
    Mp4200Hs,
    /// The acquirer terminal's built-in printer. Default fallback route.
    Acquirer,
}

// =============================================================================
// Printing Queue Item
// =============================================================================

/// One document waiting to be printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintingQueueItem {
    /// Stable UUID v4 identifier.
    pub id: String,
    /// Path of the rendered document to print.
    pub file_path: String,
    /// Which printer processes this job.
    pub processor_type: PrintingProcessorType,
    /// Higher runs first; ties break by insertion order.
    pub priority: i32,
    /// Lifecycle status, owned by the engine.
    pub status: QueueItemStatus,
    /// Copies to print.
    pub copies: u32,
    /// When the item was enqueued.
    pub created_at: DateTime<Utc>,
}

impl PrintingQueueItem {
    pub fn new(file_path: impl Into<String>, processor_type: PrintingProcessorType) -> Self {
        PrintingQueueItem {
            id: Uuid::new_v4().to_string(),
            file_path: file_path.into(),
            processor_type,
            priority: 0,
            status: QueueItemStatus::Pending,
            copies: 1,
            created_at: Utc::now(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_copies(mut self, copies: u32) -> Self {
        self.copies = copies;
        self
    }
}

impl QueueItem for PrintingQueueItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    fn status(&self) -> QueueItemStatus {
        self.status
    }

    fn set_status(&mut self, status: QueueItemStatus) {
        self.status = status;
    }
}

impl RoutedQueueItem for PrintingQueueItem {
    type Route = PrintingProcessorType;

    fn route(&self) -> PrintingProcessorType {
        self.processor_type
    }
}

// =============================================================================
// Printing Progress Events
// =============================================================================

/// Progress milestones emitted while a print job is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintingEvent {
    /// Processing began.
    Start,
    /// Validating the file and preparing the printer.
    Processing,
    /// Paper is moving.
    Printing,
    /// The in-flight job was aborted.
    Cancelled,
}

impl ProcessingEvent for PrintingEvent {
    fn start() -> Self {
        PrintingEvent::Start
    }

    fn cancelled() -> Self {
        PrintingEvent::Cancelled
    }

    fn is_start(&self) -> bool {
        matches!(self, PrintingEvent::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_defaults() {
        let item = PrintingQueueItem::new("/tmp/ticket.bin", PrintingProcessorType::Mp4200Hs);
        assert_eq!(item.copies, 1);
        assert_eq!(item.status, QueueItemStatus::Pending);
        assert_eq!(item.route(), PrintingProcessorType::Mp4200Hs);
    }

    #[test]
    fn test_serde_json_roundtrip() {
        let item = PrintingQueueItem::new("/tmp/receipt.bin", PrintingProcessorType::Acquirer)
            .with_copies(2);
        let json = serde_json::to_string(&item).unwrap();
        let back: PrintingQueueItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
