use super::{HttpClient, fetch_bytes};
use crate::error::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Something that can produce the raw source table.
#[async_trait]
pub trait Source: Send + Sync {
    /// Where the payload comes from, for logs.
    fn location(&self) -> &str;

    async fn fetch(&self) -> Result<Bytes, FetchError>;
}

/// A [`Source`] backed by an HTTP GET against a fixed URL.
pub struct HttpSource<C> {
    client: C,
    url: String,
}

impl<C: HttpClient> HttpSource<C> {
    pub fn new(client: C, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClient> Source for HttpSource<C> {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Bytes, FetchError> {
        fetch_bytes(&self.client, &self.url).await
    }
}

/// Memoizes the first successful fetch of a [`Source`].
///
/// Later calls to [`get`](Self::get) return the same payload without
/// touching the network. Failures are not cached, so a later call retries.
pub struct CachedFetch<S> {
    source: S,
    payload: OnceCell<Bytes>,
}

impl<S: Source> CachedFetch<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            payload: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_cached(&self) -> bool {
        self.payload.initialized()
    }

    #[tracing::instrument(skip(self), fields(source = %self.source.location()))]
    pub async fn get(&self) -> Result<Bytes, FetchError> {
        if let Some(bytes) = self.payload.get() {
            debug!(bytes = bytes.len(), "Serving memoized payload");
            return Ok(bytes.clone());
        }

        let bytes = self
            .payload
            .get_or_try_init(|| async {
                let bytes = self.source.fetch().await?;
                info!(bytes = bytes.len(), "Source downloaded");
                Ok::<_, FetchError>(bytes)
            })
            .await?;
        Ok(bytes.clone())
    }

    /// Drops the memoized payload so the next [`get`](Self::get) fetches again.
    pub fn reset(&mut self) {
        if self.payload.take().is_some() {
            debug!(source = %self.source.location(), "Memoized payload cleared");
        }
    }
}
