//! # Database Error Types
//!
//! Errors for pool setup and migrations. Per-item storage operations surface
//! `ticpass_core::storage::StorageError` instead, because the engine only
//! ever talks the storage contract.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ├── during connect / migrate ──► DbError (this module)           │
//! │       │                                                                 │
//! │       └── during item CRUD ──────────► StorageError (ticpass-core)     │
//! │                                             │                           │
//! │                                             ▼                           │
//! │                                    QueueError (ticpass-queue)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database setup errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    ///
    /// ## When This Occurs
    /// - Invalid SQL in migration
    /// - Migration version conflict
    /// - Schema incompatibility
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Generic query error during setup or diagnostics.
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Convenience result type for database setup operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed_display() {
        let err = DbError::ConnectionFailed("disk full".to_string());
        assert_eq!(err.to_string(), "Connection failed: disk full");
    }
}
