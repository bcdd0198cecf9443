use std::time::Duration;

use super::client::HttpClient;
use async_trait::async_trait;

/// Redirect hops followed before the request is abandoned.
const MAX_REDIRECTS: usize = 10;

/// [`HttpClient`] backed by a plain `reqwest::Client` with a request timeout.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// Builds a client whose requests, body download included, give up after
    /// `timeout`.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
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
