//! # Easel Core
//!
//! Local media persistence and cache layer for the Easel image studio:
//!
//! - **Durable History Store** ([`store::HistoryStore`]): a capacity-bounded,
//!   SQLite-backed gallery of past generate/edit/upscale results. Remote
//!   result URLs are converted to self-contained data URIs before they are
//!   persisted, so records survive link expiry.
//! - **Conversion Pipeline** ([`convert`]): fetches a remote image and
//!   encodes it as a base64 data URI, falling back to the original URL when
//!   the fetch fails.
//! - **Preload Cache** ([`preload::PreloadCache`]): an ephemeral,
//!   process-lifetime map from remote URL to an already-decoded image,
//!   used to make browsing between results instant.
//!
//! Every operation on the public surfaces is total: failures are logged and
//! degrade to empty/no-op defaults rather than propagating, because history
//! and preloading are best-effort features that must never take the
//! application down with them. The fallible internals
//! ([`store::HistoryRepository`], [`convert::fetch_as_data_uri`]) stay
//! visible for tests and embedders that want the errors.

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Runtime configuration for the persistence core.
pub mod config;
/// Remote-URL to data-URI conversion pipeline.
pub mod convert;
/// Error taxonomy for the store and the fetch/convert paths.
pub mod error;
/// HTTP fetch seam shared by conversion and preloading.
pub mod fetch;
/// Ephemeral in-memory preload cache.
pub mod preload;
/// Durable, capacity-bounded history store.
pub mod store;

pub use config::CoreConfig;
pub use error::{FetchError, StoreError};
pub use fetch::{FetchedImage, HttpFetcher, RemoteFetcher};
pub use preload::{PreloadCache, PreloadedImage};
pub use store::{HistoryRepository, HistoryStore, MAX_HISTORY_ITEMS};
