//! The globe renderer as seen from the core.
//!
//! Rendering, camera control and widgets live behind `Renderer`; the core
//! only issues the calls below and never reaches further in. Each renderer
//! is an explicit value handed to the orchestrator, never a global.

use foundation::RawPoint;
use foundation::math::Ecef;
use track::PlaybackWindow;
use tracing::info;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u64);

/// Pixel position on the viewer canvas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const GREEN_YELLOW: Color = Color::rgb(0.678, 1.0, 0.184);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointStyle {
    pub pixel_size: f32,
    pub color: Color,
    pub clamp_to_ground: bool,
}

impl PointStyle {
    /// Marker for each sampled track position.
    pub const TRACK_SAMPLE: PointStyle = PointStyle {
        pixel_size: 10.0,
        color: Color::RED,
        clamp_to_ground: false,
    };

    /// Marker for a clicked capture vertex.
    pub const CAPTURE_VERTEX: PointStyle = PointStyle {
        pixel_size: 5.0,
        color: Color::WHITE,
        clamp_to_ground: true,
    };
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PolylineStyle {
    pub width: f32,
    pub color: Color,
    pub clamp_to_ground: bool,
}

impl PolylineStyle {
    pub const TRACK_PATH: PolylineStyle = PolylineStyle {
        width: 3.0,
        color: Color::GREEN_YELLOW,
        clamp_to_ground: false,
    };

    pub const CAPTURE: PolylineStyle = PolylineStyle {
        width: 3.0,
        color: Color::WHITE,
        clamp_to_ground: true,
    };
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PolygonStyle {
    pub fill: Color,
}

impl PolygonStyle {
    pub const CAPTURE: PolygonStyle = PolygonStyle {
        fill: Color::WHITE.with_alpha(0.7),
    };
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FlyTarget {
    Entity(EntityHandle),
    Position(RawPoint),
}

pub trait Renderer {
    fn add_point_marker(&mut self, position: RawPoint, style: &PointStyle) -> EntityHandle;

    fn add_polyline(&mut self, positions: &[RawPoint], style: &PolylineStyle) -> EntityHandle;

    /// `hierarchy` is the outer ring; the renderer closes it.
    fn add_polygon(&mut self, hierarchy: &[RawPoint], style: &PolygonStyle) -> EntityHandle;

    fn remove_entity(&mut self, handle: EntityHandle);

    fn remove_all_entities(&mut self);

    fn set_clock_window(&mut self, window: &PlaybackWindow);

    /// World position under `screen`, or `None` if nothing was hit.
    fn pick_world_position(&mut self, screen: ScreenPoint) -> Option<Ecef>;

    fn fly_to(&mut self, target: FlyTarget);
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    PointMarker {
        handle: EntityHandle,
        position: RawPoint,
        style: PointStyle,
    },
    Polyline {
        handle: EntityHandle,
        positions: Vec<RawPoint>,
        style: PolylineStyle,
    },
    Polygon {
        handle: EntityHandle,
        hierarchy: Vec<RawPoint>,
        style: PolygonStyle,
    },
    Remove(EntityHandle),
    RemoveAll,
    ClockWindow(PlaybackWindow),
    Pick(ScreenPoint),
    FlyTo(FlyTarget),
}

/// Headless renderer that records every call and logs it through `tracing`.
///
/// Picks are answered from a scripted queue (`push_pick`); an empty queue
/// picks nothing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
    live: Vec<EntityHandle>,
    picks: std::collections::VecDeque<Option<Ecef>>,
    next_handle: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn drain(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }

    /// Entities added and not yet removed, in creation order.
    pub fn live_entities(&self) -> &[EntityHandle] {
        &self.live
    }

    pub fn push_pick(&mut self, hit: Option<Ecef>) {
        self.picks.push_back(hit);
    }

    fn allocate(&mut self) -> EntityHandle {
        let handle = EntityHandle(self.next_handle);
        self.next_handle += 1;
        self.live.push(handle);
        handle
    }
}

impl Renderer for RecordingRenderer {
    fn add_point_marker(&mut self, position: RawPoint, style: &PointStyle) -> EntityHandle {
        let handle = self.allocate();
        info!(
            entity = handle.0,
            lon = position.lon_deg,
            lat = position.lat_deg,
            alt = position.alt_m,
            "point marker"
        );
        self.calls.push(RenderCall::PointMarker {
            handle,
            position,
            style: *style,
        });
        handle
    }

    fn add_polyline(&mut self, positions: &[RawPoint], style: &PolylineStyle) -> EntityHandle {
        let handle = self.allocate();
        info!(entity = handle.0, vertices = positions.len(), "polyline");
        self.calls.push(RenderCall::Polyline {
            handle,
            positions: positions.to_vec(),
            style: *style,
        });
        handle
    }

    fn add_polygon(&mut self, hierarchy: &[RawPoint], style: &PolygonStyle) -> EntityHandle {
        let handle = self.allocate();
        info!(entity = handle.0, vertices = hierarchy.len(), "polygon");
        self.calls.push(RenderCall::Polygon {
            handle,
            hierarchy: hierarchy.to_vec(),
            style: *style,
        });
        handle
    }

    fn remove_entity(&mut self, handle: EntityHandle) {
        info!(entity = handle.0, "remove entity");
        self.live.retain(|h| *h != handle);
        self.calls.push(RenderCall::Remove(handle));
    }

    fn remove_all_entities(&mut self) {
        info!("remove all entities");
        self.live.clear();
        self.calls.push(RenderCall::RemoveAll);
    }

    fn set_clock_window(&mut self, window: &PlaybackWindow) {
        info!(
            start = %window.start,
            stop = %window.stop,
            multiplier = window.multiplier,
            "clock window"
        );
        self.calls.push(RenderCall::ClockWindow(*window));
    }

    fn pick_world_position(&mut self, screen: ScreenPoint) -> Option<Ecef> {
        self.calls.push(RenderCall::Pick(screen));
        self.picks.pop_front().flatten()
    }

    fn fly_to(&mut self, target: FlyTarget) {
        info!(?target, "fly to");
        self.calls.push(RenderCall::FlyTo(target));
    }
}
