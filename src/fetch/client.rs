use async_trait::async_trait;
use reqwest::{Request, Response};

/// Seam for issuing requests; tests swap in canned responses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
