use capture::ShapeKind;
use formats::{GeoJsonOutput, PayloadGeometry, parse_upload, payload_geometry};
use foundation::RawPoint;
use serde_json::Value;
use track::{PlaybackWindow, RawTrack, SamplerOptions, compute_window, sample_with};
use tracing::info;

use crate::config::PlaybackConfig;
use crate::drawing::DrawingSession;
use crate::error::RuntimeError;
use crate::renderer::{EntityHandle, FlyTarget, PointStyle, PolygonStyle, PolylineStyle, Renderer};

/// Drives a renderer from upload payloads and drawing gestures.
///
/// Owns its renderer; there is no ambient "current viewer".
#[derive(Debug)]
pub struct Orchestrator<R: Renderer> {
    renderer: R,
    config: PlaybackConfig,
}

impl<R: Renderer> Orchestrator<R> {
    pub fn new(renderer: R, config: PlaybackConfig) -> Self {
        Self { renderer, config }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn clear(&mut self) {
        self.renderer.remove_all_entities();
    }

    /// Animated view of an uploaded track.
    ///
    /// Returns `Ok(None)` when nothing survives sampling; the map is left
    /// cleared and playback simply has nothing to show.
    pub fn play_track(&mut self, raw: &RawTrack) -> Result<Option<PlaybackWindow>, RuntimeError> {
        self.clear();

        let track = sample_with(
            raw,
            SamplerOptions {
                start_index: self.config.start_index,
                jump_threshold: self.config.jump_threshold,
            },
        )?;
        if track.is_empty() {
            info!(raw_len = raw.len(), "no samples left after filtering");
            return Ok(None);
        }

        let window = compute_window(&track, self.config.multiplier)?;
        self.renderer.set_clock_window(&window);

        let positions: Vec<RawPoint> = track.positions().collect();
        let marker_style = PointStyle::TRACK_SAMPLE;
        let path_style = PolylineStyle::TRACK_PATH;
        for &position in &positions {
            self.renderer.add_point_marker(position, &marker_style);
        }
        let path = self.renderer.add_polyline(&positions, &path_style);
        self.renderer.fly_to(FlyTarget::Entity(path));

        info!(
            samples = track.len(),
            raw_len = raw.len(),
            duration_s = window.duration_s(),
            "playing track"
        );
        Ok(Some(window))
    }

    pub fn play_payload(
        &mut self,
        payload: &Value,
    ) -> Result<Option<PlaybackWindow>, RuntimeError> {
        let raw = parse_upload(payload)?;
        self.play_track(&raw)
    }

    /// Static view of the uploaded geometry: the shape plus a marker per vertex.
    pub fn show_geometry(&mut self, geometry: &PayloadGeometry) -> EntityHandle {
        self.clear();

        let marker_style = PointStyle::TRACK_SAMPLE;
        let line_style = PolylineStyle::TRACK_PATH;
        let entity = match geometry {
            PayloadGeometry::Point(p) => self.renderer.add_point_marker(*p, &marker_style),
            PayloadGeometry::Line(points) => self.renderer.add_polyline(points, &line_style),
            PayloadGeometry::Polygon(rings) => {
                let outer = rings.first().map(Vec::as_slice).unwrap_or(&[]);
                self.renderer.add_polygon(outer, &PolygonStyle::CAPTURE)
            }
        };

        if !matches!(geometry, PayloadGeometry::Point(_)) {
            for p in geometry.vertices() {
                self.renderer.add_point_marker(p, &marker_style);
            }
        }

        self.renderer.fly_to(FlyTarget::Entity(entity));
        entity
    }

    pub fn show_payload(&mut self, payload: &Value) -> Result<EntityHandle, RuntimeError> {
        let geometry = payload_geometry(payload)?;
        Ok(self.show_geometry(&geometry))
    }

    /// Starts a drawing gesture. The session borrows the renderer, so only
    /// one can be active at a time.
    pub fn begin_drawing(
        &mut self,
        kind: ShapeKind,
        output: GeoJsonOutput,
    ) -> DrawingSession<'_, R> {
        DrawingSession::new(&mut self.renderer, kind, output)
    }
}
