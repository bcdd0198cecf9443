//! GeoJSON shapes served to the map front-end.
//!
//! Field declaration order is the serialized key order, which keeps both the
//! HTTP body and the snapshot file stable.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionType {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    #[default]
    Point,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: CollectionType,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// The degraded-mode response: valid, with no features.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            kind: CollectionType::FeatureCollection,
            features: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub properties: VehicleProperties,
    pub geometry: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleProperties {
    pub id: String,
    pub route_id: String,
    pub bearing: f32,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: GeometryType,
    /// `[longitude, latitude]`, as GeoJSON requires.
    pub coordinates: [f32; 2],
}

impl Point {
    pub fn new(longitude: f32, latitude: f32) -> Self {
        Self {
            kind: GeometryType::Point,
            coordinates: [longitude, latitude],
        }
    }
}
