//! Fixtures shared by the unit tests.

use async_trait::async_trait;
use prost::Message;
use reqwest::StatusCode;

use crate::fetch::{FeedFetcher, HttpClient};
use crate::gtfs_rt::{
    FeedEntity, FeedHeader, FeedMessage, Position, TripDescriptor, VehicleDescriptor,
    VehiclePosition,
};

pub const FEED_TIMESTAMP: u64 = 1_700_000_000;

/// Answers every request with the same status and body.
pub struct StaticClient {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

#[async_trait]
impl HttpClient for StaticClient {
    async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let resp = http::Response::builder()
            .status(self.status)
            .body(self.body.clone())
            .unwrap();
        Ok(reqwest::Response::from(resp))
    }
}

pub fn static_fetcher(status: StatusCode, body: Vec<u8>) -> FeedFetcher<StaticClient> {
    let source = "http://feed.test/VehiclePositions.pb".parse().unwrap();
    FeedFetcher::new(StaticClient { status, body }, source)
}

pub fn vehicle(
    entity_id: &str,
    vehicle_id: Option<&str>,
    route_id: Option<&str>,
    latitude: f32,
    longitude: f32,
) -> FeedEntity {
    FeedEntity {
        id: entity_id.to_string(),
        vehicle: Some(VehiclePosition {
            trip: route_id.map(|r| TripDescriptor {
                route_id: Some(r.to_string()),
                ..Default::default()
            }),
            vehicle: vehicle_id.map(|v| VehicleDescriptor {
                id: Some(v.to_string()),
                ..Default::default()
            }),
            position: Some(Position {
                latitude,
                longitude,
                bearing: Some(90.0),
                odometer: None,
                speed: None,
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn feed_bytes(entities: Vec<FeedEntity>) -> Vec<u8> {
    FeedMessage {
        header: FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            timestamp: Some(FEED_TIMESTAMP),
            incrementality: None,
            feed_version: None,
        },
        entity: entities,
    }
    .encode_to_vec()
}

/// A one-bus feed: entity `E1`, vehicle `B42` on route `R1`.
pub fn single_bus_feed() -> Vec<u8> {
    feed_bytes(vec![vehicle("E1", Some("B42"), Some("R1"), 44.65, -63.57)])
}
