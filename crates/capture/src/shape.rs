use foundation::RawPoint;

use crate::CaptureError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ShapeKind {
    #[default]
    Line,
    Polygon,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Line => "line",
            ShapeKind::Polygon => "polygon",
        }
    }

    /// Fewest vertices that make a valid GeoJSON geometry of this kind.
    pub fn min_vertices(self) -> usize {
        match self {
            ShapeKind::Line => 2,
            ShapeKind::Polygon => 3,
        }
    }
}

impl std::str::FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "line" | "linestring" => Ok(ShapeKind::Line),
            "polygon" => Ok(ShapeKind::Polygon),
            other => Err(format!("unknown shape kind: {other}")),
        }
    }
}

/// A committed capture. Polygons are implicitly closed (last vertex
/// connects back to the first); lines are open.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedShape {
    pub kind: ShapeKind,
    pub vertices: Vec<RawPoint>,
}

impl CapturedShape {
    pub fn new(kind: ShapeKind, vertices: Vec<RawPoint>) -> Self {
        Self { kind, vertices }
    }

    /// Fails for a single-click line or a polygon with fewer than three
    /// vertices.
    pub fn validate(&self) -> Result<(), CaptureError> {
        let required = self.kind.min_vertices();
        if self.vertices.len() < required {
            return Err(CaptureError::TooFewVertices {
                kind: self.kind,
                required,
                got: self.vertices.len(),
            });
        }
        Ok(())
    }
}
