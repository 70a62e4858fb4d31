//! Conversion pipeline: turn a remote image URL into a self-contained
//! base64 data URI so history records survive link expiry.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::fetch::RemoteFetcher;

/// Prefix marking an input that already embeds its bytes.
const DATA_URI_PREFIX: &str = "data:";

/// MIME type used when the server does not report one.
const FALLBACK_MIME: &str = "application/octet-stream";

/// Whether `input` is already a self-contained representation that needs no
/// network access to display.
pub fn is_self_contained(input: &str) -> bool {
    input.starts_with(DATA_URI_PREFIX)
}

/// Produce a durable representation of `input`.
///
/// Self-contained inputs are returned unchanged without touching the
/// network. Remote URLs are fetched and encoded as a data URI; on any fetch
/// or encode failure the original input is returned verbatim. A history
/// entry that could not be made durable is still better than losing the
/// event, even though it risks later becoming a dead link.
pub async fn to_data_uri(fetcher: &dyn RemoteFetcher, input: &str) -> String {
    if is_self_contained(input) {
        return input.to_string();
    }

    match fetch_as_data_uri(fetcher, input).await {
        Ok(uri) => uri,
        Err(err) => {
            warn!(
                "Image conversion failed for {}: {}; keeping the remote URL",
                input, err
            );
            input.to_string()
        }
    }
}

/// Fallible core of [`to_data_uri`]: fetch `url` and encode the body as
/// `data:{mime};base64,{payload}`.
///
/// The MIME type comes from the response `Content-Type` header, falling
/// back to `application/octet-stream`. No validation of content, size, or
/// dimensions happens here.
pub async fn fetch_as_data_uri(
    fetcher: &dyn RemoteFetcher,
    url: &str,
) -> Result<String, FetchError> {
    let fetched = fetcher.fetch(url).await?;
    let mime = fetched.content_type.as_deref().unwrap_or(FALLBACK_MIME);
    let payload = BASE64.encode(&fetched.bytes);

    debug!(
        "Converted {} to a {} data URI ({} bytes raw)",
        url,
        mime,
        fetched.bytes.len()
    );

    Ok(format!("data:{mime};base64,{payload}"))
}
