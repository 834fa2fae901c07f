use capture::{CapturedShape, ShapeCapture, ShapeKind};
use formats::{GeoJsonOutput, NormalizedGeometry, normalize};
use foundation::RawPoint;
use tracing::{debug, info, warn};

use crate::error::RuntimeError;
use crate::renderer::{
    EntityHandle, PointStyle, PolygonStyle, PolylineStyle, Renderer, ScreenPoint,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FinishedShape {
    pub shape: CapturedShape,
    pub geojson: NormalizedGeometry,
    /// The committed shape as drawn on the map.
    pub entity: EntityHandle,
}

/// One drawing gesture on the globe.
///
/// Left clicks add vertices, pointer moves drag the preview vertex, and
/// `finish` commits. Preview entities are owned by the session: finishing,
/// cancelling or dropping it removes them from the renderer.
pub struct DrawingSession<'r, R: Renderer> {
    renderer: &'r mut R,
    capture: ShapeCapture,
    output: GeoJsonOutput,
    preview: Option<EntityHandle>,
    markers: Vec<EntityHandle>,
}

impl<'r, R: Renderer> DrawingSession<'r, R> {
    pub fn new(renderer: &'r mut R, kind: ShapeKind, output: GeoJsonOutput) -> Self {
        Self {
            renderer,
            capture: ShapeCapture::new(kind),
            output,
            preview: None,
            markers: Vec::new(),
        }
    }

    pub fn capture(&self) -> &ShapeCapture {
        &self.capture
    }

    pub fn is_drawing(&self) -> bool {
        self.capture.is_drawing()
    }

    /// Switching shape kind mid-gesture is a caller bug; it is logged and
    /// ignored. Returns whether the kind was applied.
    pub fn set_kind(&mut self, kind: ShapeKind) -> bool {
        match self.capture.set_kind(kind) {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, requested = kind.as_str(), "ignoring shape kind change");
                false
            }
        }
    }

    /// Left click. Returns `false` when the pick missed the globe.
    pub fn click(&mut self, screen: ScreenPoint) -> bool {
        let Some(world) = self.renderer.pick_world_position(screen) else {
            debug!(x = screen.x, y = screen.y, "click missed the globe");
            return false;
        };
        self.add_point(RawPoint::from_ecef(world));
        true
    }

    /// Pointer move. Returns `false` when idle or when the pick missed.
    pub fn hover(&mut self, screen: ScreenPoint) -> bool {
        if !self.capture.is_drawing() {
            return false;
        }
        let Some(world) = self.renderer.pick_world_position(screen) else {
            return false;
        };
        self.move_preview(RawPoint::from_ecef(world))
    }

    /// Adds a vertex already resolved to geographic coordinates.
    pub fn add_point(&mut self, p: RawPoint) {
        self.capture.add_vertex(p);
        let marker = self.renderer.add_point_marker(p, &PointStyle::CAPTURE_VERTEX);
        self.markers.push(marker);
        self.redraw_preview();
    }

    pub fn move_preview(&mut self, p: RawPoint) -> bool {
        if !self.capture.update_preview(p) {
            return false;
        }
        self.redraw_preview();
        true
    }

    /// Commits the gesture: the preview is replaced by the final shape, the
    /// vertex markers stay on the map. `Ok(None)` when nothing was drawn.
    ///
    /// A shape with too few vertices (a single-click line, a two-point
    /// polygon) is discarded together with its markers and reported as
    /// `RuntimeError::Capture`.
    pub fn finish(&mut self) -> Result<Option<FinishedShape>, RuntimeError> {
        let Some(shape) = self.capture.finish() else {
            return Ok(None);
        };
        if let Err(err) = shape.validate() {
            warn!(%err, "discarding degenerate shape");
            self.release_all();
            return Err(err.into());
        }
        self.release_preview();
        self.markers.clear();

        let geojson = normalize(&shape, self.output)?;
        let entity = self.draw(&shape.vertices, shape.kind, false);
        info!(
            kind = shape.kind.as_str(),
            vertices = shape.vertices.len(),
            "shape captured"
        );

        Ok(Some(FinishedShape {
            shape,
            geojson,
            entity,
        }))
    }

    /// Abandons the gesture and removes everything it put on the map.
    pub fn cancel(&mut self) -> bool {
        self.release_all();
        self.capture.cancel()
    }

    fn redraw_preview(&mut self) {
        self.release_preview();
        let vertices: Vec<RawPoint> = self.capture.vertices().collect();
        let kind = self.capture.kind();
        self.preview = Some(self.draw(&vertices, kind, true));
    }

    fn draw(&mut self, vertices: &[RawPoint], kind: ShapeKind, preview: bool) -> EntityHandle {
        let edge_style = PolylineStyle::CAPTURE;
        match kind {
            ShapeKind::Line => self.renderer.add_polyline(vertices, &edge_style),
            ShapeKind::Polygon if preview && vertices.len() < 3 => {
                // Two points do not span an area yet; show the edge instead.
                self.renderer.add_polyline(vertices, &edge_style)
            }
            ShapeKind::Polygon => self.renderer.add_polygon(vertices, &PolygonStyle::CAPTURE),
        }
    }

    fn release_preview(&mut self) {
        if let Some(handle) = self.preview.take() {
            self.renderer.remove_entity(handle);
        }
    }

    fn release_all(&mut self) {
        self.release_preview();
        for marker in self.markers.drain(..) {
            self.renderer.remove_entity(marker);
        }
    }
}

impl<R: Renderer> Drop for DrawingSession<'_, R> {
    fn drop(&mut self) {
        if self.capture.is_drawing() {
            debug!("drawing session dropped mid-gesture");
        }
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use crate::config::PlaybackConfig;
    use crate::error::RuntimeError;
    use crate::playback::Orchestrator;
    use crate::renderer::{RecordingRenderer, RenderCall, ScreenPoint};
    use capture::{CaptureError, ShapeKind};
    use formats::{GeoJsonOutput, Geometry, NormalizedGeometry};
    use foundation::RawPoint;

    fn p(lon: f64, lat: f64) -> RawPoint {
        RawPoint::new(lon, lat, 0.0)
    }

    fn orchestrator() -> Orchestrator<RecordingRenderer> {
        Orchestrator::new(RecordingRenderer::new(), PlaybackConfig::default())
    }

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn polygon_gesture_produces_closed_collection() {
        let mut orch = orchestrator();
        let finished = {
            let mut session =
                orch.begin_drawing(ShapeKind::Polygon, GeoJsonOutput::FeatureCollection);
            session.add_point(p(0.0, 0.0));
            session.add_point(p(1.0, 0.0));
            session.add_point(p(1.0, 1.0));
            session.move_preview(p(5.0, 5.0));
            session.finish().unwrap().unwrap()
        };

        assert_eq!(finished.shape.vertices, vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]);
        let NormalizedGeometry::FeatureCollection(collection) = &finished.geojson else {
            panic!("expected a collection");
        };
        assert_eq!(collection.features.len(), 1);
        let Geometry::Polygon(rings) = &collection.features[0].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0][0], rings[0][3]);

        // Three vertex markers and the committed polygon remain.
        let live = orch.renderer().live_entities();
        assert_eq!(live.len(), 4);
        assert_eq!(live.last(), Some(&finished.entity));
    }

    #[test]
    fn preview_is_redrawn_without_growing() {
        let mut orch = orchestrator();
        let mut session = orch.begin_drawing(ShapeKind::Line, GeoJsonOutput::Feature);
        session.add_point(p(0.0, 0.0));
        for i in 0..10 {
            assert!(session.move_preview(p(i as f64, 1.0)));
        }
        assert_eq!(session.capture().vertices().count(), 2);
        drop(session);

        let last_preview = orch
            .renderer()
            .calls()
            .iter()
            .rev()
            .find_map(|c| match c {
                RenderCall::Polyline { positions, .. } => Some(positions.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_preview, vec![p(0.0, 0.0), p(9.0, 1.0)]);
    }

    #[test]
    fn dropping_a_session_leaves_no_entities() {
        let mut orch = orchestrator();
        {
            let mut session = orch.begin_drawing(ShapeKind::Line, GeoJsonOutput::Feature);
            session.add_point(p(0.0, 0.0));
            session.add_point(p(1.0, 0.0));
            session.move_preview(p(2.0, 0.0));
            assert!(session.is_drawing());
        }
        assert!(orch.renderer().live_entities().is_empty());
    }

    #[test]
    fn cancel_removes_markers_and_preview() {
        let mut orch = orchestrator();
        let mut session = orch.begin_drawing(ShapeKind::Polygon, GeoJsonOutput::Feature);
        session.add_point(p(0.0, 0.0));
        assert!(session.cancel());
        assert!(!session.is_drawing());
        assert_eq!(session.finish().unwrap(), None);
        drop(session);
        assert!(orch.renderer().live_entities().is_empty());
    }

    #[test]
    fn kind_change_mid_gesture_is_ignored() {
        let mut orch = orchestrator();
        let mut session = orch.begin_drawing(ShapeKind::Line, GeoJsonOutput::Feature);
        assert!(session.set_kind(ShapeKind::Polygon));
        session.add_point(p(0.0, 0.0));
        assert!(!session.set_kind(ShapeKind::Line));
        session.add_point(p(1.0, 0.0));
        session.add_point(p(1.0, 1.0));
        let finished = session.finish().unwrap().unwrap();
        assert_eq!(finished.shape.kind, ShapeKind::Polygon);
    }

    #[test]
    fn single_click_line_is_rejected_and_cleared() {
        let mut orch = orchestrator();
        let mut session = orch.begin_drawing(ShapeKind::Line, GeoJsonOutput::Feature);
        session.add_point(p(3.0, 4.0));
        session.move_preview(p(5.0, 4.0));

        let err = session.finish().unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Capture(CaptureError::TooFewVertices {
                required: 2,
                got: 1,
                ..
            })
        ));
        assert!(!session.is_drawing());
        drop(session);

        assert!(orch.renderer().live_entities().is_empty());
        assert!(
            !orch
                .renderer()
                .calls()
                .iter()
                .any(|c| matches!(c, RenderCall::Polygon { .. }))
        );
    }

    #[test]
    fn two_point_polygon_is_not_drawn_as_area() {
        let mut orch = orchestrator();
        let mut session = orch.begin_drawing(ShapeKind::Polygon, GeoJsonOutput::Feature);
        session.add_point(p(0.0, 0.0));
        session.add_point(p(1.0, 0.0));
        assert!(matches!(session.finish(), Err(RuntimeError::Capture(_))));
        drop(session);
        assert!(orch.renderer().live_entities().is_empty());
    }

    #[test]
    fn finish_without_clicks_is_none() {
        let mut orch = orchestrator();
        let mut session = orch.begin_drawing(ShapeKind::Line, GeoJsonOutput::Feature);
        assert!(!session.hover(ScreenPoint::new(1.0, 1.0)));
        assert_eq!(session.finish().unwrap(), None);
    }

    #[test]
    fn clicks_resolve_picked_world_positions() {
        let a = p(24.0, 60.0);
        let b = p(24.5, 60.2);
        let c = p(30.0, 61.0);
        let mut renderer = RecordingRenderer::new();
        renderer.push_pick(Some(a.to_ecef()));
        renderer.push_pick(None);
        renderer.push_pick(Some(b.to_ecef()));
        renderer.push_pick(Some(c.to_ecef()));
        let mut orch = Orchestrator::new(renderer, PlaybackConfig::default());

        let mut session = orch.begin_drawing(ShapeKind::Line, GeoJsonOutput::Feature);
        assert!(session.click(ScreenPoint::new(100.0, 100.0)));
        assert!(!session.click(ScreenPoint::new(0.0, 0.0)));
        assert!(session.click(ScreenPoint::new(120.0, 90.0)));
        assert!(session.hover(ScreenPoint::new(300.0, 40.0)));

        let preview = session.capture().preview().unwrap();
        assert_close(preview.lon_deg, c.lon_deg, 1e-9);
        assert_close(preview.lat_deg, c.lat_deg, 1e-9);

        let finished = session.finish().unwrap().unwrap();
        assert_eq!(finished.shape.vertices.len(), 2);
        assert_close(finished.shape.vertices[0].lon_deg, a.lon_deg, 1e-9);
        assert_close(finished.shape.vertices[1].lat_deg, b.lat_deg, 1e-9);
    }
}
