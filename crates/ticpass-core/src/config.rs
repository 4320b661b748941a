//! # Queue Configuration
//!
//! The three orthogonal knobs that shape a queue instance's behavior. Each is
//! fixed at construction time; changing a knob mid-run is not supported.

use serde::{Deserialize, Serialize};

// =============================================================================
// Persistence Strategy
// =============================================================================

/// When enqueued items are written to durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceStrategy {
    /// Persist synchronously inside `enqueue()` before it returns.
    ///
    /// The safe default for money-adjacent queues: a crash right after
    /// enqueue still finds the item on disk.
    Immediate,

    /// Track enqueued items in a pending set; flush on an explicit
    /// lifecycle signal (e.g. the app backgrounding).
    ///
    /// Trades a crash window for snappier enqueue on hot paths.
    OnBackground,

    /// Never write to storage; the queue is memory-only.
    ///
    /// For ephemeral work (e.g. NFC reads) where replaying after a crash
    /// would be wrong.
    Never,
}

impl Default for PersistenceStrategy {
    fn default() -> Self {
        PersistenceStrategy::Immediate
    }
}

// =============================================================================
// Processor Start Mode
// =============================================================================

/// Whether enqueueing an item kicks the drain loop automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorStartMode {
    /// `enqueue()` starts processing if the queue is idle.
    Immediate,
    /// Items accumulate until `start()` is called explicitly.
    Manual,
}

impl Default for ProcessorStartMode {
    fn default() -> Self {
        ProcessorStartMode::Immediate
    }
}

// =============================================================================
// Confirmation Mode
// =============================================================================

/// Whether the queue pauses for operator confirmation between items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueConfirmationMode {
    /// Items flow back-to-back with no human gate.
    Auto,
    /// Before each item the queue raises
    /// [`QueueInputRequest::ConfirmNextProcessor`] and waits.
    ///
    /// Used when consecutive items need physical staging, e.g. positioning
    /// the next NFC tag on the reader.
    ///
    /// [`QueueInputRequest::ConfirmNextProcessor`]: crate::input::QueueInputRequest::ConfirmNextProcessor
    Confirmation,
}

impl Default for QueueConfirmationMode {
    fn default() -> Self {
        QueueConfirmationMode::Auto
    }
}

// =============================================================================
// Queue Config
// =============================================================================

/// Bundled configuration for one queue instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueueConfig {
    /// When items hit durable storage.
    pub persistence: PersistenceStrategy,
    /// Whether enqueue auto-starts the drain loop.
    pub start_mode: ProcessorStartMode,
    /// Whether a human gates each item.
    pub confirmation: QueueConfirmationMode,
}

impl QueueConfig {
    /// Immediate persistence, auto start, no confirmation gate.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_persistence(mut self, persistence: PersistenceStrategy) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn with_start_mode(mut self, start_mode: ProcessorStartMode) -> Self {
        self.start_mode = start_mode;
        self
    }

    pub fn with_confirmation(mut self, confirmation: QueueConfirmationMode) -> Self {
        self.confirmation = confirmation;
        self
    }
}
