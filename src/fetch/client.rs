use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Lets the fetch path be wrapped or swapped
/// without touching [`fetch_bytes`](super::fetch_bytes).
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
