//! Protobuf decoding for GTFS Realtime vehicle-position feeds.
//!
//! This is the only module that touches the generated [`crate::gtfs_rt`]
//! types; everything downstream works on [`RawFeedMessage`].

use prost::Message;

use crate::error::FeedError;
use crate::feed::{Position, RawFeedMessage, TripReference, VehicleEntity};
use crate::gtfs_rt::{self, FeedMessage};

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid protobuf for a `FeedMessage`.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage, prost::DecodeError> {
    FeedMessage::decode(bytes)
}

/// Decodes raw feed bytes into a [`RawFeedMessage`], keeping entity order.
pub fn decode(bytes: &[u8]) -> Result<RawFeedMessage, FeedError> {
    let feed = parse_feed(bytes)?;
    tracing::debug!(entities = feed.entity.len(), "Decoded protobuf feed");
    Ok(RawFeedMessage::from(feed))
}

impl From<FeedMessage> for RawFeedMessage {
    fn from(feed: FeedMessage) -> Self {
        RawFeedMessage {
            timestamp: feed.header.timestamp.unwrap_or(0),
            entities: feed.entity.into_iter().map(VehicleEntity::from).collect(),
        }
    }
}

impl From<gtfs_rt::FeedEntity> for VehicleEntity {
    fn from(entity: gtfs_rt::FeedEntity) -> Self {
        let Some(vehicle) = entity.vehicle else {
            return VehicleEntity {
                id: entity.id,
                ..Default::default()
            };
        };

        VehicleEntity {
            id: entity.id,
            vehicle_id: vehicle.vehicle.and_then(|v| v.id),
            trip: vehicle.trip.map(|t| TripReference {
                route_id: t.route_id,
            }),
            position: vehicle.position.map(|p| Position {
                latitude: p.latitude,
                longitude: p.longitude,
                bearing: p.bearing,
            }),
        }
    }
}
