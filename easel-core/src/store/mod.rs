//! Durable, capacity-bounded history store.
//!
//! [`HistoryStore`] is the total, UI-facing surface: every operation
//! resolves, never panics or propagates an error, and degrades to
//! empty/no-op defaults when the database is unavailable. The fallible
//! [`HistoryRepository`] underneath stays public for tests and embedders
//! that want the errors.

mod handle;
mod repository;

use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use easel_model::{HistoryKind, HistoryRecord, RecordParameters};
use tracing::warn;

pub use handle::StoreHandle;
pub use repository::HistoryRepository;

use crate::config::CoreConfig;
use crate::convert;
use crate::fetch::{HttpFetcher, RemoteFetcher};

/// Retention cap: the store keeps the newest 50 records.
///
/// Transiently, immediately after an insert and before cleanup, it may hold
/// one extra.
pub const MAX_HISTORY_ITEMS: usize = 50;

/// UI-facing handle to the durable history store.
///
/// Cheap to clone; all clones share one lazily-opened database handle and
/// one HTTP client.
#[derive(Clone)]
pub struct HistoryStore {
    repository: HistoryRepository,
    fetcher: Arc<dyn RemoteFetcher>,
}

impl fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStore")
            .field("repository", &self.repository)
            .field("fetcher", &type_name_of_val(self.fetcher.as_ref()))
            .finish()
    }
}

impl HistoryStore {
    /// Build a store over the real HTTP fetcher.
    pub fn new(config: CoreConfig) -> Self {
        let fetcher = Arc::new(HttpFetcher::new(config.http_timeout));
        Self::with_fetcher(config, fetcher)
    }

    /// Build a store with a custom fetch implementation.
    pub fn with_fetcher(
        config: CoreConfig,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        let handle = Arc::new(StoreHandle::new(config));
        Self {
            repository: HistoryRepository::new(handle),
            fetcher,
        }
    }

    /// The fallible repository underneath this store.
    pub fn repository(&self) -> &HistoryRepository {
        &self.repository
    }

    /// Persist the result of an operation, then evict past the retention
    /// cap.
    ///
    /// `source_url` is made durable through the conversion pipeline first;
    /// a record whose conversion failed keeps the original URL. Failures at
    /// any later step are logged and swallowed: from the caller's
    /// perspective the operation is fire-and-forget.
    pub async fn put(
        &self,
        kind: HistoryKind,
        source_url: &str,
        prompt: Option<String>,
        parameters: Option<RecordParameters>,
    ) {
        let image_data =
            convert::to_data_uri(self.fetcher.as_ref(), source_url).await;
        let record = HistoryRecord::new(kind, image_data, prompt, parameters);

        if let Err(err) = self.repository.insert(&record).await {
            warn!("Failed to save history record {}: {}", record.id, err);
            return;
        }

        if let Err(err) =
            self.repository.trim_to_cap(MAX_HISTORY_ITEMS).await
        {
            warn!("Failed to trim history past the cap: {}", err);
        }
    }

    /// All records, newest first. Unavailable storage reads as no history.
    pub async fn list(&self) -> Vec<HistoryRecord> {
        match self.repository.list().await {
            Ok(records) => records,
            Err(err) => {
                warn!("Failed to list history: {}", err);
                Vec::new()
            }
        }
    }

    /// Point lookup; absent on miss or failure.
    pub async fn get(&self, id: &str) -> Option<HistoryRecord> {
        match self.repository.get(id).await {
            Ok(record) => record,
            Err(err) => {
                warn!("Failed to load history record {}: {}", id, err);
                None
            }
        }
    }

    /// Delete one record; idempotent.
    pub async fn delete(&self, id: &str) {
        if let Err(err) = self.repository.delete(id).await {
            warn!("Failed to delete history record {}: {}", id, err);
        }
    }

    /// Remove all records.
    pub async fn clear(&self) {
        if let Err(err) = self.repository.clear().await {
            warn!("Failed to clear history: {}", err);
        }
    }

    /// Number of stored records; 0 when storage is unavailable.
    pub async fn count(&self) -> usize {
        match self.repository.count().await {
            Ok(n) => n as usize,
            Err(err) => {
                warn!("Failed to count history records: {}", err);
                0
            }
        }
    }
}
