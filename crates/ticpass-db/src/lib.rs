//! # ticpass-db: Database Layer for Ticpass Queues
//!
//! SQLite persistence for queue items. This crate owns the pool, the
//! embedded migrations and the durable [`QueueStorage`] implementation the
//! engine drains from; it knows nothing about processors or hardware.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ticpass-db                                     │
//! │                                                                         │
//! │  ticpass-queue engine                                                  │
//! │       │                                                                 │
//! │       │ QueueStorage contract (ticpass-core)                           │
//! │       ▼                                                                 │
//! │  ┌──────────────────────┐      ┌──────────────────────┐                │
//! │  │  SqliteQueueStorage  │◄─────│  Database (pool)     │                │
//! │  │  per queue name      │      │  WAL + migrations    │                │
//! │  └──────────┬───────────┘      └──────────────────────┘                │
//! │             │                                                           │
//! │             ▼                                                           │
//! │  queue_items table (JSON payload + indexed priority/status)            │
//! │                                                                         │
//! │  Items persisted here survive a terminal restart; resume() reloads     │
//! │  the pending rows into a fresh queue.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("./ticpass.db")).await?;
//! let storage: SqliteQueueStorage<PaymentQueueItem> = db.queue_storage("payment");
//! let manager = payment_queue_manager(Arc::new(storage), config, merchant);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod storage;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use storage::SqliteQueueStorage;

// Re-export the contract this crate implements so callers don't need a
// direct ticpass-core dependency just to name the trait.
pub use ticpass_core::storage::{QueueStorage, StorageError};
