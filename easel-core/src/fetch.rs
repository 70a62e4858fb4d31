//! HTTP fetch seam shared by the conversion pipeline and the preload cache.
//!
//! The trait exists so tests can substitute a double for the network; the
//! production implementation is a thin wrapper over a pooled
//! [`reqwest::Client`].

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;

/// Body bytes plus the server-reported content type of a fetched resource.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Raw response body.
    pub bytes: Vec<u8>,
    /// Media type from the `Content-Type` header, without parameters.
    pub content_type: Option<String>,
}

/// A plain GET against a remote image URL. No auth, no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Fetch `url` and return the body on a success status.
    async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError>;
}

/// Production [`RemoteFetcher`] over a shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value.split(';').next().unwrap_or(value).trim().to_string()
            });

        let bytes = response.bytes().await?;

        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
