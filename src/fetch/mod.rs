//! Feed retrieval and the fetch → decode → transform cycle.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use std::time::Instant;

use bytes::Bytes;
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::config::{FeedConfig, FeedSource};
use crate::decoder::decode;
use crate::error::FeedError;
use crate::feed::RawFeedMessage;
use crate::geojson::FeatureCollection;
use crate::transform::transform;

/// Issues a single GET for `url` and returns the body of a successful response.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &Url) -> Result<Bytes, FeedError> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.clone());

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FeedError::Status(status));
    }

    Ok(resp.bytes().await?)
}

/// Retrieves the configured feed and turns it into map features.
pub struct FeedFetcher<C> {
    client: C,
    source: FeedSource,
}

impl FeedFetcher<BasicClient> {
    pub fn from_config(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = BasicClient::with_timeout(config.timeout)?;
        Ok(Self::new(client, config.source.clone()))
    }
}

impl<C: HttpClient> FeedFetcher<C> {
    pub fn new(client: C, source: FeedSource) -> Self {
        Self { client, source }
    }

    pub fn source(&self) -> &FeedSource {
        &self.source
    }

    /// Loads the raw feed bytes from the network or from disk.
    pub async fn fetch_bytes(&self) -> Result<Bytes, FeedError> {
        match &self.source {
            FeedSource::Http(url) => fetch_bytes(&self.client, url).await,
            FeedSource::File(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|source| FeedError::Io {
                    path: path.clone(),
                    source,
                }),
        }
    }

    pub async fn fetch_feed(&self) -> Result<RawFeedMessage, FeedError> {
        let bytes = self.fetch_bytes().await?;
        debug!(bytes = bytes.len(), "Feed bytes received, decoding");
        decode(&bytes)
    }

    /// Runs one fetch cycle.
    ///
    /// Never fails: an unreachable feed, an error status or an undecodable
    /// payload is logged and yields an empty collection.
    #[tracing::instrument(skip(self), fields(source = %self.source))]
    pub async fn fetch_and_transform(&self, filter: Option<&str>) -> FeatureCollection {
        let started = Instant::now();

        let message = match self.fetch_feed().await {
            Ok(message) => message,
            Err(e) => {
                warn!(
                    error = %e,
                    kind = e.kind(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Feed unavailable, serving empty collection"
                );
                return FeatureCollection::empty();
            }
        };

        let collection = transform(&message, filter);

        info!(
            entities = message.entities.len(),
            positioned = message.positioned(),
            features = collection.len(),
            feed_time = ?message.generated_at(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Feed transformed"
        );

        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FEED_TIMESTAMP, single_bus_feed, static_fetcher};
    use reqwest::StatusCode;

    #[tokio::test]
    async fn test_fetch_and_transform_success() {
        let collection = static_fetcher(StatusCode::OK, single_bus_feed())
            .fetch_and_transform(None)
            .await;

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.features[0].properties.id, "B42");
        assert_eq!(collection.features[0].properties.timestamp, FEED_TIMESTAMP);
    }

    #[tokio::test]
    async fn test_filter_is_passed_through() {
        let fetcher = static_fetcher(StatusCode::OK, single_bus_feed());

        assert_eq!(fetcher.fetch_and_transform(Some("R1")).await.len(), 1);
        assert!(fetcher.fetch_and_transform(Some("B99")).await.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_degrades_to_empty() {
        let fetcher = static_fetcher(StatusCode::SERVICE_UNAVAILABLE, single_bus_feed());

        let err = fetcher.fetch_feed().await.unwrap_err();
        assert!(matches!(err, FeedError::Status(s) if s == StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(err.kind(), "upstream_unavailable");

        assert_eq!(fetcher.fetch_and_transform(None).await, FeatureCollection::empty());
    }

    #[tokio::test]
    async fn test_garbage_payload_degrades_to_empty() {
        let fetcher = static_fetcher(StatusCode::OK, b"<html>maintenance</html>".to_vec());

        assert!(matches!(
            fetcher.fetch_feed().await.unwrap_err(),
            FeedError::Decode(_)
        ));
        assert!(fetcher.fetch_and_transform(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VehiclePositions.pb");
        std::fs::write(&path, single_bus_feed()).unwrap();

        let config = FeedConfig::new(path.to_str().unwrap()).unwrap();
        let fetcher = FeedFetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.source(), &FeedSource::File(path));

        let collection = fetcher.fetch_and_transform(Some("B42")).await;
        assert_eq!(collection.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = FeedConfig::new(dir.path().join("missing.pb").to_str().unwrap()).unwrap();
        let fetcher = FeedFetcher::from_config(&config).unwrap();

        assert!(matches!(
            fetcher.fetch_feed().await.unwrap_err(),
            FeedError::Io { .. }
        ));
        assert!(fetcher.fetch_and_transform(None).await.is_empty());
    }
}
