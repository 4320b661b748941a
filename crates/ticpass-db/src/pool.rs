//! # Database Connection Pool
//!
//! SQLite connection pool setup for the queue database.
//!
//! ## Why a Pool for a Terminal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Several queues share one database file:                                │
//! │                                                                         │
//! │  payment queue ──┐                                                      │
//! │  printing queue ─┼──► SqlitePool ──► ticpass.db (WAL)                   │
//! │  refund queue ───┘                                                      │
//! │                                                                         │
//! │  WAL mode lets the UI's observation queries read while a queue          │
//! │  persists a status change.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::run_migrations;
use crate::storage::SqliteQueueStorage;
use ticpass_core::item::QueueItem;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Minimum number of pooled connections kept alive.
    pub min_connections: u32,
    /// How long to wait when acquiring a connection.
    pub connect_timeout: Duration,
    /// How long an idle connection may live before being reaped.
    pub idle_timeout: Duration,
    /// Whether to run embedded migrations on connect.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration pointing at the given database file.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: database_path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(":memory:")
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle.
///
/// Cloning is cheap (the pool is internally reference-counted); the embedding
/// app typically creates one `Database` at startup and derives one
/// [`SqliteQueueStorage`] per queue domain from it.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite for terminal use:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing queue database"
        );

        let connect_options = if config.is_in_memory() {
            SqliteConnectOptions::new().in_memory(true)
        } else {
            // sqlite://path with mode=rwc creates the file if not exists
            let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());
            SqliteConnectOptions::from_str(&connect_url)
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                // WAL mode: readers don't block writers and vice versa
                .journal_mode(SqliteJournalMode::Wal)
                // NORMAL synchronous: safe from corruption, may lose the
                // last transaction on power loss
                .synchronous(SqliteSynchronous::Normal)
                // SQLite ships with foreign keys off for compatibility
                .foreign_keys(true)
                .create_if_missing(true)
        };

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!("Connection pool created");

        if config.run_migrations {
            run_migrations(&pool).await?;
        }

        info!("Queue database ready");

        Ok(Database { pool })
    }

    /// Returns a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates a durable storage handle for one named queue.
    ///
    /// Different queue names on the same database are fully isolated; the
    /// payment queue never sees printing rows.
    pub fn queue_storage<T>(&self, queue_name: impl Into<String>) -> SqliteQueueStorage<T>
    where
        T: QueueItem + serde::Serialize + serde::de::DeserializeOwned,
    {
        SqliteQueueStorage::new(self.pool.clone(), queue_name)
    }

    /// Closes the pool, flushing outstanding work.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_migrates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // The migrated schema is queryable.
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queue_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("./ticpass.db")
            .max_connections(10)
            .run_migrations(false);
        assert_eq!(config.max_connections, 10);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
    }
}
