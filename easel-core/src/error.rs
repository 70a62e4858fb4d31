use thiserror::Error;

/// Errors raised by the durable history store internals.
///
/// The public [`HistoryStore`](crate::store::HistoryStore) facade never
/// surfaces these; it logs them and degrades to the documented empty/no-op
/// defaults. The split keeps failures visible to tests and logs while the
/// UI-facing contract stays total.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database could not be opened or its schema could not be created.
    #[error("failed to open history database: {0}")]
    Open(#[source] sqlx::Error),

    /// An individual read/write against an open database failed.
    #[error("history database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Record parameters could not be encoded to or decoded from JSON.
    #[error("failed to encode history parameters: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row could not be mapped back to a record.
    #[error("invalid stored history record: {0}")]
    InvalidRecord(String),
}

/// Convenience alias for store-internal results.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised while fetching or decoding a remote image.
///
/// Conversion falls back to the original input on these; preload warms fail
/// individually without affecting the rest of a batch.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {url}")]
    HttpStatus {
        /// Response status code.
        status: reqwest::StatusCode,
        /// The URL that was requested.
        url: String,
    },

    /// The fetched bytes could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}
