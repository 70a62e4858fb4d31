use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};

/// Free-form echo of the generation parameters attached to a record
/// (model id, size, aspect ratio), kept for display and "regenerate with
/// same settings".
pub type RecordParameters = serde_json::Map<String, serde_json::Value>;

/// Length of the random suffix appended to a record id.
const RECORD_ID_SUFFIX_LEN: usize = 9;

/// Which operation produced a history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    /// Text-to-image generation
    Generate,
    /// Prompt-driven edit of an existing image
    Edit,
    /// Resolution upscale of an existing image
    Upscale,
}

impl Display for HistoryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryKind::Generate => write!(f, "generate"),
            HistoryKind::Edit => write!(f, "edit"),
            HistoryKind::Upscale => write!(f, "upscale"),
        }
    }
}

/// Error returned when parsing an unknown [`HistoryKind`] label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown history kind: {0}")]
pub struct ParseHistoryKindError(String);

impl FromStr for HistoryKind {
    type Err = ParseHistoryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generate" => Ok(HistoryKind::Generate),
            "edit" => Ok(HistoryKind::Edit),
            "upscale" => Ok(HistoryKind::Upscale),
            other => Err(ParseHistoryKindError(other.to_string())),
        }
    }
}

/// One persisted memory of a past generate/edit/upscale operation.
///
/// Records are created exactly once, when the result of an operation is
/// accepted, and are immutable thereafter. The store owns them; callers
/// always receive owned copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unique id: epoch millis plus a random suffix, generated at insert
    /// time rather than assigned by the database.
    pub id: String,
    /// Which operation produced this record.
    pub kind: HistoryKind,
    /// Text prompt associated with the result, if any.
    pub prompt: Option<String>,
    /// Durable self-contained representation of the image (data URI).
    ///
    /// A bare remote URL only appears here when conversion failed and the
    /// original input was kept as a non-durable fallback.
    pub image_data: String,
    /// Currently identical to `image_data`; kept as a distinct field so a
    /// real downscaled thumbnail can be introduced without a migration.
    pub thumbnail_data: Option<String>,
    /// Creation time in epoch millis; the sort and eviction key.
    pub created_at: i64,
    /// Free-form generation parameters, if any.
    pub parameters: Option<RecordParameters>,
}

impl HistoryRecord {
    /// Build a fresh record stamped with the current time.
    pub fn new(
        kind: HistoryKind,
        image_data: String,
        prompt: Option<String>,
        parameters: Option<RecordParameters>,
    ) -> Self {
        let created_at = chrono::Utc::now().timestamp_millis();
        Self {
            id: generate_record_id(created_at),
            kind,
            prompt,
            thumbnail_data: Some(image_data.clone()),
            image_data,
            created_at,
            parameters,
        }
    }
}

/// Generate a record id from a time component plus a random alphanumeric
/// suffix.
///
/// The millis prefix keeps ids monotonic enough that sorting ties by id
/// approximates insertion order; the suffix guards against collisions
/// within the same millisecond.
pub fn generate_record_id(created_at_millis: i64) -> String {
    let suffix =
        Alphanumeric.sample_string(&mut rand::rng(), RECORD_ID_SUFFIX_LEN);
    format!("{created_at_millis}-{suffix}")
}
