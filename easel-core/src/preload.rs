//! Ephemeral in-memory preload cache.
//!
//! Avoids refetching and redecoding an image the process has already seen
//! this session, so switching between results and reopening them from
//! history has no visible load latency. Entries are never evicted; the
//! cache grows for the life of the process. That is a documented
//! limitation, not an oversight: a bounded LRU would change the contract
//! that every warmed URL stays instant for the whole session.

use std::sync::Arc;

use dashmap::DashMap;
use image::DynamicImage;
use tracing::warn;

use crate::config::CoreConfig;
use crate::convert;
use crate::error::FetchError;
use crate::fetch::{HttpFetcher, RemoteFetcher};

/// An already-fetched, already-decoded image held by the cache.
#[derive(Clone)]
pub struct PreloadedImage {
    image: DynamicImage,
}

impl std::fmt::Debug for PreloadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloadedImage")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

impl PreloadedImage {
    /// Pixel dimensions of the decoded image.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// The decoded image itself.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Process-wide map from remote URL to decoded image.
///
/// Safe for unsynchronized concurrent use: racing warms of the same URL
/// insert equivalent content, so last write wins.
pub struct PreloadCache {
    fetcher: Arc<dyn RemoteFetcher>,
    entries: DashMap<String, Arc<PreloadedImage>>,
}

impl std::fmt::Debug for PreloadCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloadCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl PreloadCache {
    /// Build a cache over the real HTTP fetcher.
    pub fn new(config: &CoreConfig) -> Self {
        Self::with_fetcher(Arc::new(HttpFetcher::new(config.http_timeout)))
    }

    /// Build a cache with a custom fetch implementation.
    pub fn with_fetcher(fetcher: Arc<dyn RemoteFetcher>) -> Self {
        Self {
            fetcher,
            entries: DashMap::new(),
        }
    }

    /// Fetch and decode `url` into the cache.
    ///
    /// Resolves immediately when the URL is already cached or is a
    /// self-contained data URI (nothing to fetch). An individual warm may
    /// fail; batch callers are isolated from that via [`Self::warm_all`].
    pub async fn warm(&self, url: &str) -> Result<(), FetchError> {
        if self.has(url) {
            return Ok(());
        }

        let fetched = self.fetcher.fetch(url).await?;
        let image = image::load_from_memory(&fetched.bytes)?;
        self.entries
            .insert(url.to_string(), Arc::new(PreloadedImage { image }));

        Ok(())
    }

    /// Warm every URL concurrently; resolves once all have settled.
    ///
    /// Individual failures are logged and dropped — a batch never fails as
    /// a whole.
    pub async fn warm_all<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let warms = urls.into_iter().map(|url| async move {
            if let Err(err) = self.warm(url.as_ref()).await {
                warn!("Failed to preload {}: {}", url.as_ref(), err);
            }
        });

        futures::future::join_all(warms).await;
    }

    /// Whether `url` can be displayed without a network fetch.
    pub fn has(&self, url: &str) -> bool {
        convert::is_self_contained(url) || self.entries.contains_key(url)
    }

    /// The cached handle for `url`, if warmed.
    pub fn get(&self, url: &str) -> Option<Arc<PreloadedImage>> {
        self.entries.get(url).map(|entry| Arc::clone(entry.value()))
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
