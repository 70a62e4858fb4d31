//! Integration tests for the durable history store: repository semantics
//! against a real SQLite file, plus the total facade behavior on top.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use easel_core::store::StoreHandle;
use easel_core::{
    CoreConfig, FetchError, FetchedImage, HistoryRepository, HistoryStore,
    MAX_HISTORY_ITEMS, RemoteFetcher,
};
use easel_model::{HistoryKind, HistoryRecord, generate_record_id};
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Serves one fixed body for every URL and counts fetches.
struct StaticFetcher {
    content_type: &'static str,
    bytes: Vec<u8>,
    hits: AtomicUsize,
}

impl StaticFetcher {
    fn png(bytes: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            content_type: "image/png",
            bytes,
            hits: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl RemoteFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedImage, FetchError> {
        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(FetchedImage {
            bytes: self.bytes.clone(),
            content_type: Some(self.content_type.to_string()),
        })
    }
}

/// Answers 404 to everything.
struct FailingFetcher;

#[async_trait]
impl RemoteFetcher for FailingFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        Err(FetchError::HttpStatus {
            status: reqwest::StatusCode::NOT_FOUND,
            url: url.to_string(),
        })
    }
}

fn temp_repository() -> (TempDir, HistoryRepository) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = CoreConfig::default().with_data_dir(dir.path());
    let repository = HistoryRepository::new(Arc::new(StoreHandle::new(config)));
    (dir, repository)
}

fn record_at(created_at: i64, kind: HistoryKind) -> HistoryRecord {
    let image_data = format!("data:image/png;base64,payload{created_at}");
    HistoryRecord {
        id: generate_record_id(created_at),
        kind,
        prompt: Some(format!("prompt {created_at}")),
        thumbnail_data: Some(image_data.clone()),
        image_data,
        created_at,
        parameters: None,
    }
}

#[tokio::test]
async fn insert_then_get_round_trips() {
    init_tracing();
    let (_dir, repository) = temp_repository();

    let mut record = record_at(1_700_000_000_000, HistoryKind::Generate);
    record.parameters = Some(
        serde_json::json!({ "model": "flux-dev", "size": "1024x1024" })
            .as_object()
            .cloned()
            .unwrap(),
    );

    repository.insert(&record).await.unwrap();
    let loaded = repository.get(&record.id).await.unwrap();

    assert_eq!(loaded, Some(record));
}

#[tokio::test]
async fn list_returns_newest_first_regardless_of_insertion_order() {
    let (_dir, repository) = temp_repository();

    let base = 1_700_000_000_000;
    for offset in [3i64, 1, 5, 2, 4] {
        repository
            .insert(&record_at(base + offset, HistoryKind::Edit))
            .await
            .unwrap();
    }

    let listed = repository.list().await.unwrap();
    let timestamps: Vec<i64> =
        listed.iter().map(|record| record.created_at).collect();

    assert_eq!(
        timestamps,
        vec![base + 5, base + 4, base + 3, base + 2, base + 1]
    );
}

#[tokio::test]
async fn delete_is_idempotent_and_get_reports_absent() {
    let (_dir, repository) = temp_repository();

    let record = record_at(1_700_000_000_000, HistoryKind::Upscale);
    repository.insert(&record).await.unwrap();

    repository.delete(&record.id).await.unwrap();
    assert_eq!(repository.get(&record.id).await.unwrap(), None);

    // Second delete of the same id is not an error.
    repository.delete(&record.id).await.unwrap();
}

#[tokio::test]
async fn clear_removes_every_record() {
    let (_dir, repository) = temp_repository();

    for offset in 0..5 {
        repository
            .insert(&record_at(1_700_000_000_000 + offset, HistoryKind::Generate))
            .await
            .unwrap();
    }
    assert_eq!(repository.count().await.unwrap(), 5);

    repository.clear().await.unwrap();

    assert_eq!(repository.count().await.unwrap(), 0);
    assert!(repository.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn trim_evicts_only_the_oldest_records_beyond_the_cap() {
    let (_dir, repository) = temp_repository();

    let base = 1_700_000_000_000;
    let mut ids = Vec::new();
    for i in 1..=51i64 {
        let record = record_at(base + i, HistoryKind::Generate);
        ids.push(record.id.clone());
        repository.insert(&record).await.unwrap();
    }

    let evicted = repository.trim_to_cap(MAX_HISTORY_ITEMS).await.unwrap();
    assert_eq!(evicted, 1);

    let listed = repository.list().await.unwrap();
    assert_eq!(listed.len(), MAX_HISTORY_ITEMS);
    assert_eq!(listed.first().unwrap().created_at, base + 51);
    // t1 was evicted; the oldest survivor is t2.
    assert_eq!(listed.last().unwrap().created_at, base + 2);
    assert_eq!(repository.get(&ids[0]).await.unwrap(), None);

    // Trimming again is a no-op once under the cap.
    assert_eq!(repository.trim_to_cap(MAX_HISTORY_ITEMS).await.unwrap(), 0);
}

#[tokio::test]
async fn puts_converge_to_the_cap_with_the_newest_records_kept() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig::default().with_data_dir(dir.path());
    let fetcher = StaticFetcher::png(vec![0xAA; 32]);
    let store = HistoryStore::with_fetcher(config, fetcher.clone());

    for i in 0..=MAX_HISTORY_ITEMS {
        store
            .put(
                HistoryKind::Generate,
                &format!("https://img.example/result-{i}.png"),
                Some(format!("prompt {i}")),
                None,
            )
            .await;
        // Keep created_at strictly increasing across puts.
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let listed = store.list().await;
    assert_eq!(listed.len(), MAX_HISTORY_ITEMS);
    assert_eq!(store.count().await, MAX_HISTORY_ITEMS);

    // The newest survives, the very first put was evicted.
    assert_eq!(
        listed.first().unwrap().prompt.as_deref(),
        Some(format!("prompt {MAX_HISTORY_ITEMS}").as_str())
    );
    assert_eq!(listed.last().unwrap().prompt.as_deref(), Some("prompt 1"));

    // Every stored image was made durable.
    assert!(
        listed
            .iter()
            .all(|record| record.image_data.starts_with("data:image/png;base64,"))
    );
    assert_eq!(fetcher.hits.load(Ordering::Relaxed), MAX_HISTORY_ITEMS + 1);
}

#[tokio::test]
async fn put_keeps_the_original_url_when_conversion_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig::default().with_data_dir(dir.path());
    let store = HistoryStore::with_fetcher(config, Arc::new(FailingFetcher));

    store
        .put(HistoryKind::Edit, "https://img.example/expired.png", None, None)
        .await;

    let listed = store.list().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].image_data, "https://img.example/expired.png");
    assert_eq!(
        listed[0].thumbnail_data.as_deref(),
        Some("https://img.example/expired.png")
    );
}

#[tokio::test]
async fn facade_stays_total_when_the_store_cannot_open() {
    init_tracing();
    // Nesting the data dir under a regular file makes every open fail.
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let config =
        CoreConfig::default().with_data_dir(blocker.path().join("nested"));
    let store =
        HistoryStore::with_fetcher(config, StaticFetcher::png(vec![1, 2, 3]));

    store
        .put(HistoryKind::Generate, "data:image/png;base64,AAAA", None, None)
        .await;

    assert!(store.list().await.is_empty());
    assert_eq!(store.get("1700000000000-abcdefghi").await, None);
    assert_eq!(store.count().await, 0);
    store.delete("1700000000000-abcdefghi").await;
    store.clear().await;
}

#[tokio::test]
async fn data_uri_sources_are_stored_without_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig::default().with_data_dir(dir.path());
    let fetcher = StaticFetcher::png(vec![9, 9, 9]);
    let store = HistoryStore::with_fetcher(config, fetcher.clone());

    let source = "data:image/webp;base64,UklGRg==";
    store.put(HistoryKind::Upscale, source, None, None).await;

    let listed = store.list().await;
    assert_eq!(listed[0].image_data, source);
    assert_eq!(fetcher.hits.load(Ordering::Relaxed), 0);
}
