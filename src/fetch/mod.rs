//! Retrieval of the raw source CSV.
//!
//! [`fetch_bytes`] performs one GET and rejects anything but a 2xx answer.
//! [`CachedFetch`] wraps a [`Source`] so the payload is downloaded at most
//! once per process.

mod basic;
mod cache;
mod client;

pub use basic::BasicClient;
pub use cache::{CachedFetch, HttpSource, Source};
pub use client::HttpClient;

use crate::error::FetchError;
use bytes::Bytes;
use tracing::debug;

/// Downloads `url` and returns the response body.
///
/// # Errors
///
/// Returns a [`FetchError`] if the URL does not parse, the request fails or
/// times out, the server answers with a non-success status, or the body
/// cannot be read.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Bytes, FetchError> {
    let parsed = url.parse::<reqwest::Url>().map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client
        .execute(req)
        .await
        .map_err(|e| request_error(url, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = resp.bytes().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                source: e,
            }
        }
    })?;

    debug!(url, status = status.as_u16(), bytes = body.len(), "Source fetched");
    Ok(body)
}

fn request_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_request() {
        let client = BasicClient::new().unwrap();
        let err = fetch_bytes(&client, "not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
