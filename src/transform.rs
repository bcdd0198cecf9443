//! Vehicle records to GeoJSON features.

use crate::feed::{RawFeedMessage, VehicleEntity};
use crate::geojson::{Feature, FeatureCollection, FeatureType, Point, VehicleProperties};

/// Builds the feature collection for one feed snapshot.
///
/// Entities without a position are skipped. When `filter` is set, only
/// vehicles whose effective id or route id equals it exactly are kept.
/// Output order follows the feed.
pub fn transform(message: &RawFeedMessage, filter: Option<&str>) -> FeatureCollection {
    message
        .entities
        .iter()
        .filter_map(|entity| to_feature(entity, message.timestamp, filter))
        .collect()
}

fn to_feature(entity: &VehicleEntity, timestamp: u64, filter: Option<&str>) -> Option<Feature> {
    let position = entity.position?;

    let id = entity.effective_id();
    let route_id = entity.route_id();

    if filter.is_some_and(|wanted| id != wanted && route_id != wanted) {
        return None;
    }

    Some(Feature {
        kind: FeatureType::Feature,
        properties: VehicleProperties {
            id: id.to_string(),
            route_id: route_id.to_string(),
            bearing: position.bearing.unwrap_or_default(),
            timestamp,
        },
        geometry: Point::new(position.longitude, position.latitude),
    })
}
