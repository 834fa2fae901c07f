//! Upload server responses.
//!
//! The flight-log converter answers with either a bare track object
//! (`{"coordinates": [[lon, lat, alt], ...], "times": [...]}`) or a GeoJSON
//! `FeatureCollection` whose first feature carries the coordinates in its
//! geometry and the timestamps in `properties.times`. Both reduce to a
//! `RawTrack` here.

use foundation::RawPoint;
use serde_json::{Map, Value};
use track::RawTrack;

#[derive(Debug)]
pub enum UploadError {
    Json(serde_json::Error),
    UnrecognizedPayload,
    MissingTimes,
    InvalidCoordinate { index: usize, reason: String },
    InvalidTime { index: usize },
    InvalidGeometry(String),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::Json(e) => write!(f, "JSON parse error: {e}"),
            UploadError::UnrecognizedPayload => write!(
                f,
                "expected a {{coordinates, times}} object or a GeoJSON FeatureCollection"
            ),
            UploadError::MissingTimes => write!(f, "payload has no times array"),
            UploadError::InvalidCoordinate { index, reason } => {
                write!(f, "invalid coordinate at index {index}: {reason}")
            }
            UploadError::InvalidTime { index } => {
                write!(f, "time at index {index} must be a string")
            }
            UploadError::InvalidGeometry(reason) => write!(f, "invalid geometry: {reason}"),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(e: serde_json::Error) -> Self {
        UploadError::Json(e)
    }
}

/// Geometry of the first uploaded feature, for the static (non-animated) view.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadGeometry {
    Point(RawPoint),
    Line(Vec<RawPoint>),
    Polygon(Vec<Vec<RawPoint>>),
}

impl PayloadGeometry {
    /// All vertices, ring after ring for polygons.
    pub fn vertices(&self) -> Vec<RawPoint> {
        match self {
            PayloadGeometry::Point(p) => vec![*p],
            PayloadGeometry::Line(ps) => ps.clone(),
            PayloadGeometry::Polygon(rings) => rings.iter().flatten().copied().collect(),
        }
    }
}

pub fn parse_upload_str(payload: &str) -> Result<RawTrack, UploadError> {
    let value: Value = serde_json::from_str(payload)?;
    parse_upload(&value)
}

pub fn parse_upload(value: &Value) -> Result<RawTrack, UploadError> {
    let obj = value.as_object().ok_or(UploadError::UnrecognizedPayload)?;

    if obj.get("type").and_then(|v| v.as_str()) == Some("FeatureCollection") {
        let feature = first_feature(obj)?;
        let coordinates = feature
            .get("geometry")
            .and_then(|g| g.get("coordinates"))
            .ok_or(UploadError::UnrecognizedPayload)?;
        let times = feature
            .get("properties")
            .and_then(|p| p.get("times"))
            .ok_or(UploadError::MissingTimes)?;
        return Ok(RawTrack::new(parse_positions(coordinates)?, parse_times(times)?));
    }

    let coordinates = obj
        .get("coordinates")
        .ok_or(UploadError::UnrecognizedPayload)?;
    let times = obj.get("times").ok_or(UploadError::MissingTimes)?;
    Ok(RawTrack::new(parse_positions(coordinates)?, parse_times(times)?))
}

pub fn payload_geometry(value: &Value) -> Result<PayloadGeometry, UploadError> {
    let obj = value.as_object().ok_or(UploadError::UnrecognizedPayload)?;
    let geometry = match obj.get("type").and_then(|v| v.as_str()) {
        Some("FeatureCollection") => first_feature(obj)?
            .get("geometry")
            .ok_or(UploadError::InvalidGeometry("feature missing geometry".to_string()))?,
        Some("Feature") => obj
            .get("geometry")
            .ok_or(UploadError::InvalidGeometry("feature missing geometry".to_string()))?,
        _ => value,
    };

    let ty = geometry
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(UploadError::InvalidGeometry("geometry missing type".to_string()))?;
    let coords = geometry
        .get("coordinates")
        .ok_or(UploadError::InvalidGeometry("geometry missing coordinates".to_string()))?;

    match ty {
        "Point" => Ok(PayloadGeometry::Point(parse_position(coords, 0)?)),
        "LineString" => Ok(PayloadGeometry::Line(parse_positions(coords)?)),
        "Polygon" => {
            let rings = coords.as_array().ok_or(UploadError::InvalidGeometry(
                "Polygon coordinates must be an array of rings".to_string(),
            ))?;
            let mut out = Vec::with_capacity(rings.len());
            for ring in rings {
                out.push(parse_positions(ring)?);
            }
            Ok(PayloadGeometry::Polygon(out))
        }
        other => Err(UploadError::InvalidGeometry(format!(
            "unsupported geometry type: {other}"
        ))),
    }
}

fn first_feature(collection: &Map<String, Value>) -> Result<&Map<String, Value>, UploadError> {
    collection
        .get("features")
        .and_then(|v| v.as_array())
        .and_then(|features| features.first())
        .and_then(|f| f.as_object())
        .ok_or(UploadError::UnrecognizedPayload)
}

fn parse_positions(coords: &Value) -> Result<Vec<RawPoint>, UploadError> {
    let arr = coords.as_array().ok_or(UploadError::InvalidCoordinate {
        index: 0,
        reason: "coordinates must be an array".to_string(),
    })?;
    let mut out = Vec::with_capacity(arr.len());
    for (index, item) in arr.iter().enumerate() {
        out.push(parse_position(item, index)?);
    }
    Ok(out)
}

/// `[lon, lat]` or `[lon, lat, alt]`; a missing altitude is `0`.
fn parse_position(item: &Value, index: usize) -> Result<RawPoint, UploadError> {
    let invalid = |reason: &str| UploadError::InvalidCoordinate {
        index,
        reason: reason.to_string(),
    };
    let arr = item.as_array().ok_or_else(|| invalid("position must be an array"))?;
    if arr.len() < 2 {
        return Err(invalid("position must have [lon, lat]"));
    }
    let lon = arr[0].as_f64().ok_or_else(|| invalid("lon must be a number"))?;
    let lat = arr[1].as_f64().ok_or_else(|| invalid("lat must be a number"))?;
    let alt = match arr.get(2) {
        Some(v) => v.as_f64().ok_or_else(|| invalid("alt must be a number"))?,
        None => 0.0,
    };
    Ok(RawPoint::new(lon, lat, alt))
}

fn parse_times(times: &Value) -> Result<Vec<String>, UploadError> {
    let arr = times.as_array().ok_or(UploadError::MissingTimes)?;
    arr.iter()
        .enumerate()
        .map(|(index, t)| {
            t.as_str()
                .map(str::to_string)
                .ok_or(UploadError::InvalidTime { index })
        })
        .collect()
}
