//! Lazily-opened, process-wide SQLite handle for the history store.
//!
//! Lifecycle is `Unopened -> Opening -> Ready`: the first operation to need
//! the database triggers the open, concurrent callers await that same
//! pending open, and once ready the pool is reused for the rest of the
//! process. A failed open leaves the handle unopened so a later call can
//! retry.

use std::path::PathBuf;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::CoreConfig;
use crate::error::{Result, StoreError};

/// Schema version 1: one table keyed by `id`, with non-unique secondary
/// indexes on `created_at` and `kind`. Setup is create-if-absent; there is
/// no migration path beyond that.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS history (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        prompt TEXT,
        image_data TEXT NOT NULL,
        thumbnail_data TEXT,
        created_at INTEGER NOT NULL,
        parameters TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_history_created_at
        ON history (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_history_kind ON history (kind)",
];

/// Shared handle over the history database.
#[derive(Debug)]
pub struct StoreHandle {
    config: CoreConfig,
    pool: OnceCell<SqlitePool>,
}

impl StoreHandle {
    /// Create an unopened handle; nothing touches the filesystem until the
    /// first operation.
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
        }
    }

    /// The pool, opening the database on first use.
    pub async fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .get_or_try_init(|| open_database(&self.config))
            .await
    }
}

/// Resolve the database path, create its directory, connect, and bootstrap
/// the schema.
async fn open_database(config: &CoreConfig) -> Result<SqlitePool> {
    // Anchor relative data dirs so the store location is stable regardless
    // of later working-directory changes.
    let data_dir = if config.data_dir.is_absolute() {
        config.data_dir.clone()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(&config.data_dir)
    };

    tokio::fs::create_dir_all(&data_dir)
        .await
        .map_err(|err| StoreError::Open(sqlx::Error::Io(err)))?;

    let path = data_dir.join(&config.database_file);
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(StoreError::Open)?;

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .map_err(StoreError::Open)?;
    }

    info!("History database ready at {}", path.display());
    Ok(pool)
}
