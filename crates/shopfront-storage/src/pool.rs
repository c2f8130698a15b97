//! # Storage Handle
//!
//! Opens the SQLite file that backs the session's key-value storage.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new(path)            DbConfig::in_memory()                   │
//! │        │                               │                                │
//! │        ▼                               ▼                                │
//! │  StorageLocation::File          StorageLocation::Memory                 │
//! │   parent dir created             one connection, gone on close          │
//! │   WAL + NORMAL sync                                                     │
//! │        └───────────────┬───────────────┘                                │
//! │                        ▼                                                │
//! │            Database::new(config).await                                  │
//! │                        │  migrations (unless disabled)                  │
//! │                        ▼                                                │
//! │       db.carts()   db.checkouts()   db.kv()                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session writes after every cart mutation, so the pool stays small:
//! one writer at a time, WAL so reads never wait on it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::cart::CartRepository;
use crate::repository::checkout::CheckoutRepository;
use crate::repository::kv::KeyValueRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Where the storage lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// A SQLite file, created with its parent directory on first open.
    File(PathBuf),
    /// Private in-memory database. Each `Database` gets its own.
    Memory,
}

/// Storage settings.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/shopfront.db")
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: StorageLocation,

    /// Default 2. Forced to 1 for [`StorageLocation::Memory`], where every
    /// connection would otherwise see a different database.
    pub max_connections: u32,

    /// How long a statement waits on a locked file before failing.
    pub busy_timeout: Duration,

    /// How long to wait for a free pooled connection.
    pub acquire_timeout: Duration,

    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed storage at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::at(StorageLocation::File(path.into()))
    }

    /// Throwaway storage for tests.
    ///
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// ```
    pub fn in_memory() -> Self {
        Self::at(StorageLocation::Memory)
    }

    fn at(location: StorageLocation) -> Self {
        DbConfig {
            location,
            max_connections: 2,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(10),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// The storage file, if this is not an in-memory database.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.location {
            StorageLocation::File(path) => Some(path),
            StorageLocation::Memory => None,
        }
    }

    fn pool_size(&self) -> u32 {
        match self.location {
            StorageLocation::File(_) => self.max_connections,
            StorageLocation::Memory => 1,
        }
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.location {
            StorageLocation::Memory => SqliteConnectOptions::new().in_memory(true),
            StorageLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        DbError::ConnectionFailed(format!("cannot create {}: {}", parent.display(), e))
                    })?;
                }
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
            }
        };

        Ok(options.busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to local storage. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the storage and brings its schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        match config.file_path() {
            Some(path) => info!(path = %path.display(), "Opening local storage"),
            None => info!("Opening in-memory storage"),
        }

        let options = config.connect_options()?;
        let pool_size = config.pool_size();

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(pool_size, "Storage pool connected");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Raw key-value access.
    pub fn kv(&self) -> KeyValueRepository {
        KeyValueRepository::new(self.pool.clone())
    }

    /// Typed access to the `cart` key.
    pub fn carts(&self) -> CartRepository {
        CartRepository::new(self.kv())
    }

    /// Typed access to the `checkoutData` key.
    pub fn checkouts(&self) -> CheckoutRepository {
        CheckoutRepository::new(self.kv())
    }

    /// Closes the pool. Later repository calls fail with `ConnectionFailed`.
    pub async fn close(&self) {
        debug!("Closing storage pool");
        self.pool.close().await;
    }

    /// True while storage answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_is_usable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shopfront.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.kv().set("greeting", "\"hello\"").await.unwrap();
        db.close().await;

        assert!(path.exists());
        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(
            reopened.kv().get("greeting").await.unwrap().as_deref(),
            Some("\"hello\"")
        );
    }

    #[tokio::test]
    async fn test_closed_storage_fails_health_check() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_memory_storage_uses_one_connection() {
        let config = DbConfig::in_memory().max_connections(8);
        assert_eq!(config.pool_size(), 1);
        assert_eq!(config.file_path(), None);

        let file = DbConfig::new("/tmp/shop.db").max_connections(0).run_migrations(false);
        assert_eq!(file.pool_size(), 1);
        assert_eq!(file.file_path(), Some(Path::new("/tmp/shop.db")));
        assert!(!file.run_migrations);
    }
}
