use async_trait::async_trait;
use reqwest::{Request, Response};

/// Seam over the HTTP stack so report loading can run against any client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
