//! Decoded vehicle-position records, independent of the wire format.

use chrono::{DateTime, Utc};

/// Route id reported when the feed does not say which route a vehicle serves.
pub const ROUTE_UNAVAILABLE: &str = "N/A";

/// One decoded feed snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedMessage {
    /// Feed generation time in seconds since the epoch, `0` when unknown.
    pub timestamp: u64,
    pub entities: Vec<VehicleEntity>,
}

impl RawFeedMessage {
    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        if self.timestamp == 0 {
            return None;
        }
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn positioned(&self) -> usize {
        self.entities.iter().filter(|e| e.position.is_some()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleEntity {
    pub id: String,
    pub vehicle_id: Option<String>,
    pub trip: Option<TripReference>,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripReference {
    pub route_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub latitude: f32,
    pub longitude: f32,
    /// Degrees clockwise from true north.
    pub bearing: Option<f32>,
}

impl VehicleEntity {
    /// Identifier shown on the map and matched by filters: the vehicle id,
    /// or the entity id when the feed leaves the vehicle id unset or blank.
    pub fn effective_id(&self) -> &str {
        non_empty(self.vehicle_id.as_deref()).unwrap_or(self.id.as_str())
    }

    /// The trip's route id, or [`ROUTE_UNAVAILABLE`].
    pub fn route_id(&self) -> &str {
        non_empty(self.trip.as_ref().and_then(|t| t.route_id.as_deref()))
            .unwrap_or(ROUTE_UNAVAILABLE)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
