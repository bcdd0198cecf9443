use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport used by [`FeedFetcher`](super::FeedFetcher) to reach the feed.
///
/// Implementations only execute the request; status handling and decoding
/// stay in the fetcher.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
