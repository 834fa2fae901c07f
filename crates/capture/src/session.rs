use foundation::RawPoint;

use crate::{CapturedShape, ShapeKind};

/// One entry of the in-progress vertex list.
///
/// While drawing, the list is some number of `Fixed` vertices followed by
/// exactly one `Preview` vertex that follows the pointer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Vertex {
    Fixed(RawPoint),
    Preview(RawPoint),
}

impl Vertex {
    pub fn position(self) -> RawPoint {
        match self {
            Vertex::Fixed(p) | Vertex::Preview(p) => p,
        }
    }

    pub fn is_preview(self) -> bool {
        matches!(self, Vertex::Preview(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    InvalidStateTransition {
        operation: &'static str,
        state: &'static str,
    },
    TooFewVertices {
        kind: ShapeKind,
        required: usize,
        got: usize,
    },
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::InvalidStateTransition { operation, state } => {
                write!(f, "{operation} is not allowed while {state}")
            }
            CaptureError::TooFewVertices {
                kind,
                required,
                got,
            } => write!(
                f,
                "a {} needs at least {required} vertices, got {got}",
                kind.as_str()
            ),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Pointer-driven capture of a line or polygon.
///
/// `Idle -> Drawing` on the first `add_vertex`, `Drawing -> Idle` on
/// `finish`. Consumers redraw from `vertices()` after every call; the
/// preview vertex is never part of the shape `finish` returns.
///
/// Dropping a session (or `cancel`) discards the gesture; nothing outside
/// the session is touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeCapture {
    kind: ShapeKind,
    vertices: Vec<Vertex>,
}

impl ShapeCapture {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn is_drawing(&self) -> bool {
        !self.vertices.is_empty()
    }

    fn state_name(&self) -> &'static str {
        if self.is_drawing() { "drawing" } else { "idle" }
    }

    /// Only allowed while idle.
    pub fn set_kind(&mut self, kind: ShapeKind) -> Result<(), CaptureError> {
        if self.is_drawing() {
            return Err(CaptureError::InvalidStateTransition {
                operation: "set_kind",
                state: self.state_name(),
            });
        }
        self.kind = kind;
        Ok(())
    }

    /// Commits `p` and starts a fresh preview at `p`.
    pub fn add_vertex(&mut self, p: RawPoint) {
        if let Some(Vertex::Preview(_)) = self.vertices.last() {
            self.vertices.pop();
        }
        self.vertices.push(Vertex::Fixed(p));
        self.vertices.push(Vertex::Preview(p));
        self.debug_check();
    }

    /// Moves the preview vertex. Returns `false` when idle.
    pub fn update_preview(&mut self, p: RawPoint) -> bool {
        match self.vertices.last_mut() {
            Some(last) if last.is_preview() => {
                *last = Vertex::Preview(p);
                true
            }
            _ => false,
        }
    }

    /// Drops the preview and returns the committed shape; `None` when idle.
    pub fn finish(&mut self) -> Option<CapturedShape> {
        if !self.is_drawing() {
            return None;
        }
        let vertices: Vec<RawPoint> = std::mem::take(&mut self.vertices)
            .into_iter()
            .filter_map(|v| match v {
                Vertex::Fixed(p) => Some(p),
                Vertex::Preview(_) => None,
            })
            .collect();
        Some(CapturedShape::new(self.kind, vertices))
    }

    /// Discards any in-progress gesture. Returns `true` if one was active.
    pub fn cancel(&mut self) -> bool {
        let was_drawing = self.is_drawing();
        self.vertices.clear();
        was_drawing
    }

    /// Every vertex including the preview, in drawing order.
    pub fn vertices(&self) -> impl Iterator<Item = RawPoint> + '_ {
        self.vertices.iter().map(|v| v.position())
    }

    pub fn fixed_vertices(&self) -> impl Iterator<Item = RawPoint> + '_ {
        self.vertices.iter().filter_map(|v| match v {
            Vertex::Fixed(p) => Some(*p),
            Vertex::Preview(_) => None,
        })
    }

    pub fn preview(&self) -> Option<RawPoint> {
        match self.vertices.last() {
            Some(Vertex::Preview(p)) => Some(*p),
            _ => None,
        }
    }

    fn debug_check(&self) {
        debug_assert!(self.vertices.len() >= 2);
        debug_assert!(self.vertices.last().is_some_and(|v| v.is_preview()));
        debug_assert_eq!(self.vertices.iter().filter(|v| v.is_preview()).count(), 1);
    }
}
