use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default directory for the on-disk store, relative to the working
/// directory unless overridden.
const DEFAULT_DATA_DIR: &str = "easel-data";

/// File name of the SQLite history database inside the data directory.
const DEFAULT_DATABASE_FILE: &str = "easel-history.sqlite3";

/// Per-request HTTP timeout for image fetches.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration for the persistence core.
///
/// Constructed once at application start and passed to
/// [`HistoryStore`](crate::store::HistoryStore) and
/// [`PreloadCache`](crate::preload::PreloadCache); there is no hidden
/// module-level state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Directory holding the history database. Relative paths are resolved
    /// against the current working directory when the store opens.
    pub data_dir: PathBuf,
    /// File name of the SQLite database inside `data_dir`.
    pub database_file: String,
    /// Timeout applied to each image fetch.
    pub http_timeout: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by `EASEL_DATA_DIR` and
    /// `EASEL_HTTP_TIMEOUT_SECS` where set and parseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("EASEL_DATA_DIR")
            && !dir.trim().is_empty()
        {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(secs) = std::env::var("EASEL_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.http_timeout = Duration::from_secs(secs.max(1));
        }

        config
    }

    /// Override the data directory.
    pub fn with_data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }

    /// Full path of the history database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }
}
