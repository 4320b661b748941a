//! # ticpass-core: Pure Queue Vocabulary for Ticpass POS
//!
//! This crate is the **heart** of the Ticpass queue engine. It contains the
//! shared vocabulary every queue speaks - items, states, errors, input
//! requests, configuration - with zero hardware or database dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Ticpass Queue Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Terminal UI                                │   │
//! │  │   observes ProcessingState ── answers input requests            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ticpass-queue (Engine Layer)                      │   │
//! │  │   HybridQueueManager • processors • dynamic dispatch            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ticpass-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │   item   │ │  state   │ │  input   │ │  config  │         │   │
//! │  │   │ QueueItem│ │Processing│ │ requests │ │ strategy │         │   │
//! │  │   │  status  │ │  State   │ │ responses│ │  modes   │         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO HARDWARE • NO DATABASE • NO NETWORK                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ticpass-db (Storage Layer)                        │   │
//! │  │   SQLite-backed QueueStorage implementation                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`item`] - The [`QueueItem`]/[`RoutedQueueItem`] contracts and lifecycle status
//! - [`state`] - [`ProcessingState`], the one channel the UI observes
//! - [`result`] - [`ProcessingResult`] and domain success payloads
//! - [`error`] - The processing error taxonomy and the four error actions
//! - [`event`] - The [`ProcessingEvent`] contract domain event enums satisfy
//! - [`input`] - Processor-level and queue-level request/response types
//! - [`config`] - Persistence strategy, start mode, confirmation mode
//! - [`storage`] - The [`QueueStorage`] persistence seam
//! - [`pix`] - EMV merchant-presented PIX BR Code generation
//! - [`models`] - Concrete payment/printing/refund/NFC item and event types
//!
//! ## Design Principles
//!
//! 1. **Integer Money**: Amounts are cents (i64); floats never touch money
//! 2. **Explicit Errors**: Failures are typed results, never panics
//! 3. **Engine Owns Status**: Only the queue engine mutates item lifecycle
//! 4. **Events are Hints**: Losing a progress event never corrupts state

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod item;
pub mod models;
pub mod pix;
pub mod result;
pub mod state;
pub mod storage;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{PersistenceStrategy, ProcessorStartMode, QueueConfig, QueueConfirmationMode};
pub use error::{ErrorHandlingAction, ProcessingErrorEvent};
pub use event::ProcessingEvent;
pub use input::{
    QueueInputRequest, QueueInputResponse, QueueInputValue, UserInputKind, UserInputRequest,
    UserInputResponse,
};
pub use item::{QueueItem, QueueItemStatus, RoutedQueueItem};
pub use pix::{PixCharge, PixError};
pub use result::{ProcessingOutcome, ProcessingResult};
pub use state::ProcessingState;
pub use storage::{QueueStorage, StorageError};
