//! # ticpass-queue: Queue Engine for Ticpass POS
//!
//! Drives sequential processing of payment, printing, refund and NFC
//! operations at the terminal: one item in flight at a time, durable across
//! restarts, able to pause mid-operation for user input and to offer the
//! four-way error protocol when something goes wrong.
//!
//! ## Engine Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ticpass-queue Engine                              │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                     HybridQueueManager                           │  │
//! │  │                                                                  │  │
//! │  │  • single-consumer drain loop over the pending rotation          │  │
//! │  │  • persistence strategy (immediate / on-background / never)      │  │
//! │  │  • error protocol: retry / skip / abort / abort-all              │  │
//! │  │  • queue-level input mediation & confirmation gate               │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ process / abort / provide input        │
//! │                               ▼                                        │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      DynamicProcessor                            │  │
//! │  │       route table keyed by the item's discriminator              │  │
//! │  └───────┬──────────────┬──────────────┬──────────────┬────────────┘  │
//! │          ▼              ▼              ▼              ▼                │
//! │     ┌─────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐         │
//! │     │  Cash   │   │ Merchant │   │ MP4200HS │   │ NFC ops  │  ...    │
//! │     │         │   │   PIX    │   │ printer  │   │          │         │
//! │     └─────────┘   └──────────┘   └──────────┘   └──────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`manager`] - [`HybridQueueManager`], the orchestrator
//! - [`processor`] - [`QueueProcessor`]/[`ProcessorTemplate`] contracts and
//!   the shared [`ProcessorCore`]
//! - [`dynamic`] - [`DynamicProcessor`] per-route dispatch
//! - [`memory`] - non-durable [`MemoryQueueStorage`]
//! - [`processors`] - concrete payment/printing/refund/NFC processors
//! - [`wiring`] - per-domain manager assembly
//! - [`error`] - control-surface errors

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dynamic;
pub mod error;
pub mod manager;
pub mod memory;
pub mod processor;
pub mod processors;
pub mod wiring;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use dynamic::DynamicProcessor;
pub use error::{QueueError, QueueResult};
pub use manager::HybridQueueManager;
pub use memory::MemoryQueueStorage;
pub use processor::{ProcessorCore, ProcessorTemplate, QueueProcessor};
