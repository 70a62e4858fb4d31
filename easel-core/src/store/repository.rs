//! Fallible CRUD and retention trimming over the `history` table.
//!
//! Every operation here returns a [`StoreError`] on failure; the
//! [`HistoryStore`](super::HistoryStore) facade is the only place errors
//! are converted into the total, UI-facing defaults.

use std::sync::Arc;

use easel_model::{HistoryKind, HistoryRecord, RecordParameters};
use sqlx::Row;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::handle::StoreHandle;

/// Row shape of the `history` table.
#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: String,
    kind: String,
    prompt: Option<String>,
    image_data: String,
    thumbnail_data: Option<String>,
    created_at: i64,
    parameters: Option<String>,
}

impl HistoryRow {
    fn into_record(self) -> Result<HistoryRecord> {
        let kind: HistoryKind = self
            .kind
            .parse()
            .map_err(|err: easel_model::ParseHistoryKindError| {
                StoreError::InvalidRecord(err.to_string())
            })?;

        let parameters: Option<RecordParameters> = self
            .parameters
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(HistoryRecord {
            id: self.id,
            kind,
            prompt: self.prompt,
            image_data: self.image_data,
            thumbnail_data: self.thumbnail_data,
            created_at: self.created_at,
            parameters,
        })
    }
}

/// Newest-first ordering; ids lead with the epoch millis, so the id
/// tie-break keeps same-millisecond records near insertion order.
const LIST_ORDER: &str = "ORDER BY created_at DESC, id DESC";

/// Repository over the history collection.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    handle: Arc<StoreHandle>,
}

impl HistoryRepository {
    /// Wrap a shared store handle.
    pub fn new(handle: Arc<StoreHandle>) -> Self {
        Self { handle }
    }

    /// Insert one record.
    pub async fn insert(&self, record: &HistoryRecord) -> Result<()> {
        let parameters = record
            .parameters
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let pool = self.handle.pool().await?;
        sqlx::query(
            "INSERT INTO history \
                (id, kind, prompt, image_data, thumbnail_data, created_at, parameters) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&record.id)
        .bind(record.kind.to_string())
        .bind(&record.prompt)
        .bind(&record.image_data)
        .bind(&record.thumbnail_data)
        .bind(record.created_at)
        .bind(parameters)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// All records, newest first via the `created_at` index.
    pub async fn list(&self) -> Result<Vec<HistoryRecord>> {
        let pool = self.handle.pool().await?;
        let rows: Vec<HistoryRow> = sqlx::query_as(&format!(
            "SELECT id, kind, prompt, image_data, thumbnail_data, created_at, parameters \
             FROM history {LIST_ORDER}"
        ))
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(HistoryRow::into_record).collect()
    }

    /// Point lookup by id.
    pub async fn get(&self, id: &str) -> Result<Option<HistoryRecord>> {
        let pool = self.handle.pool().await?;
        let row: Option<HistoryRow> = sqlx::query_as(
            "SELECT id, kind, prompt, image_data, thumbnail_data, created_at, parameters \
             FROM history WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(HistoryRow::into_record).transpose()
    }

    /// Delete one record; deleting an absent id is not an error.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let pool = self.handle.pool().await?;
        sqlx::query("DELETE FROM history WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Remove all records.
    pub async fn clear(&self) -> Result<()> {
        let pool = self.handle.pool().await?;
        sqlx::query("DELETE FROM history").execute(pool).await?;

        Ok(())
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<u64> {
        let pool = self.handle.pool().await?;
        let row = sqlx::query("SELECT COUNT(*) AS n FROM history")
            .fetch_one(pool)
            .await?;
        let n: i64 = row.try_get("n")?;

        Ok(n.max(0) as u64)
    }

    /// Delete everything beyond the newest `cap` records.
    ///
    /// Runs as a single statement instead of the read-then-delete round
    /// trips a naive port would make, so two writers racing past the cap
    /// cannot interleave between the read and the deletes. Returns the
    /// number of evicted records.
    pub async fn trim_to_cap(&self, cap: usize) -> Result<u64> {
        let pool = self.handle.pool().await?;
        let result = sqlx::query(&format!(
            "DELETE FROM history WHERE id NOT IN \
                (SELECT id FROM history {LIST_ORDER} LIMIT ?1)"
        ))
        .bind(cap as i64)
        .execute(pool)
        .await?;

        let evicted = result.rows_affected();
        if evicted > 0 {
            debug!("Evicted {} history records beyond cap {}", evicted, cap);
        }

        Ok(evicted)
    }
}
