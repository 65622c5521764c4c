use super::client::HttpClient;
use crate::config::{FETCH_CONNECT_TIMEOUT_SECS, FETCH_TIMEOUT_SECS};
use async_trait::async_trait;
use std::time::Duration;

/// Plain `reqwest` client with the fixed fetch timeouts applied.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
    }

    /// Builds a client whose whole-request deadline is `timeout`. Expiry
    /// surfaces as [`FetchError::Timeout`](crate::error::FetchError::Timeout).
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(FETCH_CONNECT_TIMEOUT_SECS).min(timeout))
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
