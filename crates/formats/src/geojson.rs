//! Captured shapes → GeoJSON.

use capture::{CapturedShape, ShapeKind};
use foundation::RawPoint;
use serde::Serialize;
use serde_json::{Map, Value};

pub type Position = [f64; 3];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedGeometry {
    Feature(Feature),
    FeatureCollection(FeatureCollection),
}

impl NormalizedGeometry {
    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_geojson_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Whether the caller wants a bare feature or a one-feature collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum GeoJsonOutput {
    Feature,
    #[default]
    FeatureCollection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    EmptyShape,
}

impl std::fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::EmptyShape => write!(f, "shape has no vertices"),
        }
    }
}

impl std::error::Error for NormalizeError {}

pub fn normalize(
    shape: &CapturedShape,
    output: GeoJsonOutput,
) -> Result<NormalizedGeometry, NormalizeError> {
    let feature = to_feature(shape)?;
    Ok(match output {
        GeoJsonOutput::Feature => NormalizedGeometry::Feature(feature),
        GeoJsonOutput::FeatureCollection => {
            NormalizedGeometry::FeatureCollection(FeatureCollection {
                features: vec![feature],
            })
        }
    })
}

pub fn to_feature(shape: &CapturedShape) -> Result<Feature, NormalizeError> {
    let first = *shape.vertices.first().ok_or(NormalizeError::EmptyShape)?;
    let positions = || shape.vertices.iter().copied().map(RawPoint::as_array);

    let geometry = match shape.kind {
        ShapeKind::Line => Geometry::LineString(positions().collect()),
        ShapeKind::Polygon => {
            let mut ring: Vec<Position> = positions().collect();
            if shape.vertices.last() != Some(&first) {
                ring.push(first.as_array());
            }
            Geometry::Polygon(vec![ring])
        }
    };

    Ok(Feature {
        geometry,
        properties: Map::new(),
    })
}
