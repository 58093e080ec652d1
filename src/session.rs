//! The drawing session state machine.
//!
//! Exactly one polygon can be in the process of being drawn. The session
//! moves through `Idle -> Drawing -> Closable` and returns to `Idle` on
//! commit or cancel; the finalized polygon is handed to the
//! [`PolygonStore`]. Vertices are kept in image space so zooming and
//! panning mid-draw never invalidates them.

use crate::error::{AnnotationError, Result};
use crate::geometry::Point;
use crate::store::{PolygonId, PolygonStore, MIN_POLYGON_VERTICES};
use crate::transform::ViewState;

/// Pointer positions closer than this (image space) to the last vertex are
/// not appended again on force-close.
const DISTINCT_VERTEX_EPS: f64 = 1e-3;

/// Where the in-progress polygon is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No polygon being drawn
    Idle,
    /// Vertices placed, not yet closable
    Drawing { vertices: Vec<Point> },
    /// At least 3 vertices and the pointer hovers the first one; the next
    /// click commits. Purely a hover affordance, vertices are unchanged.
    Closable { vertices: Vec<Point> },
}

/// State machine for the polygon currently being authored.
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    state: SessionState,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether a polygon is currently being drawn.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, SessionState::Idle)
    }

    /// Whether the next click on the first vertex would commit.
    pub fn is_closable(&self) -> bool {
        matches!(self.state, SessionState::Closable { .. })
    }

    /// Vertices placed so far, in image space. Empty while idle.
    pub fn vertices(&self) -> &[Point] {
        match &self.state {
            SessionState::Idle => &[],
            SessionState::Drawing { vertices } | SessionState::Closable { vertices } => vertices,
        }
    }

    /// Begin a new polygon with its first vertex.
    ///
    /// Rejected while another polygon is still being drawn; the in-progress
    /// vertex list is left untouched.
    pub fn start(&mut self, first_vertex: Point) -> Result<()> {
        if self.is_active() {
            log::warn!("start rejected: a polygon is already being drawn");
            return Err(AnnotationError::SessionAlreadyOpen);
        }
        self.state = SessionState::Drawing {
            vertices: vec![first_vertex],
        };
        log::debug!("drawing started at ({:.1}, {:.1})", first_vertex.x, first_vertex.y);
        Ok(())
    }

    /// Append a vertex to the in-progress polygon. No-op while idle.
    pub fn add_vertex(&mut self, vertex: Point) {
        match std::mem::take(&mut self.state) {
            SessionState::Idle => {
                log::warn!("add_vertex ignored: no active session");
            }
            SessionState::Drawing { mut vertices } | SessionState::Closable { mut vertices } => {
                vertices.push(vertex);
                // A click that landed here was not on the first vertex, so
                // the armed state no longer applies until the next hover.
                self.state = SessionState::Drawing { vertices };
            }
        }
    }

    /// Continuous (shift-held) drawing: append the pointer position only
    /// once it is at least `min_spacing_px` away, in screen space, from the
    /// last placed vertex. Returns whether a vertex was appended.
    pub fn add_continuous(
        &mut self,
        pointer_screen: Point,
        view: &ViewState,
        min_spacing_px: f64,
    ) -> Result<bool> {
        let last = match self.vertices().last() {
            Some(last) => *last,
            None => return Ok(false),
        };

        let last_screen = view.to_screen(last)?;
        if last_screen.distance_to(pointer_screen) < min_spacing_px {
            return Ok(false);
        }

        let vertex = view.to_image(pointer_screen)?;
        self.add_vertex(vertex);
        Ok(true)
    }

    /// Re-evaluate the hover affordance: `Drawing` becomes `Closable` while
    /// the pointer is within `hit_radius_px` of the first vertex and at
    /// least 3 vertices exist, and reverts when it leaves. Returns whether
    /// the session is closable afterwards.
    pub fn update_hover(
        &mut self,
        pointer_screen: Point,
        view: &ViewState,
        hit_radius_px: f64,
    ) -> Result<bool> {
        let armed = match self.vertices().first() {
            Some(first) if self.vertices().len() >= MIN_POLYGON_VERTICES => {
                view.to_screen(*first)?.distance_to(pointer_screen) <= hit_radius_px
            }
            _ => false,
        };

        self.state = match std::mem::take(&mut self.state) {
            SessionState::Idle => SessionState::Idle,
            SessionState::Drawing { vertices } | SessionState::Closable { vertices } => {
                if armed {
                    SessionState::Closable { vertices }
                } else {
                    SessionState::Drawing { vertices }
                }
            }
        };
        Ok(self.is_closable())
    }

    /// Commit via click on the first vertex. Only valid in the `Closable`
    /// state; the store appends the explicit closure vertex.
    pub fn commit_click(&mut self, store: &mut PolygonStore, label: &str) -> Result<PolygonId> {
        match &self.state {
            SessionState::Closable { vertices } => {
                let id = store.add_polygon(label, vertices.clone())?;
                self.state = SessionState::Idle;
                log::debug!("polygon {} committed by click on first vertex", id);
                Ok(id)
            }
            SessionState::Drawing { vertices } => Err(AnnotationError::InvalidPolygon {
                count: vertices.len(),
            }),
            SessionState::Idle => Err(AnnotationError::InvalidPolygon { count: 0 }),
        }
    }

    /// Force-close the polygon (the `N` key): append the current pointer
    /// position when it is distinct from the last vertex, close, commit.
    ///
    /// Requires at least 3 authored vertices; otherwise the attempt is
    /// rejected and the in-progress vertex list is preserved.
    pub fn force_close(
        &mut self,
        pointer_image: Option<Point>,
        store: &mut PolygonStore,
        label: &str,
    ) -> Result<PolygonId> {
        let count = self.vertices().len();
        if count < MIN_POLYGON_VERTICES {
            log::warn!("force-close rejected with {} vertices", count);
            return Err(AnnotationError::InvalidPolygon { count });
        }

        let mut vertices = self.vertices().to_vec();
        if let Some(p) = pointer_image {
            let last = vertices[vertices.len() - 1];
            if last.distance_to(p) > DISTINCT_VERTEX_EPS {
                vertices.push(p);
            }
        }

        let id = store.add_polygon(label, vertices)?;
        self.state = SessionState::Idle;
        log::debug!("polygon {} force-closed", id);
        Ok(id)
    }

    /// Discard the in-progress polygon.
    pub fn cancel(&mut self) {
        if self.is_active() {
            log::debug!("drawing cancelled with {} vertices", self.vertices().len());
        }
        self.state = SessionState::Idle;
    }

    /// Screen-space preview line: the placed vertices, the pointer
    /// position, and back to the first vertex. Derived only, never stored.
    /// Empty while idle.
    pub fn preview(&self, pointer_screen: Option<Point>, view: &ViewState) -> Vec<Point> {
        let vertices = self.vertices();
        if vertices.is_empty() {
            return Vec::new();
        }

        let mut line = Vec::with_capacity(vertices.len() + 2);
        for v in vertices {
            match view.to_screen(*v) {
                Ok(s) => line.push(s),
                Err(_) => return Vec::new(),
            }
        }
        if let Some(pointer) = pointer_screen {
            line.push(pointer);
        }
        line.push(line[0]);
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn identity_view() -> ViewState {
        ViewState {
            scale: 1.0,
            offset: Point::default(),
            viewport: Size::new(1200.0, 800.0),
            image_size: Size::new(1200.0, 800.0),
        }
    }

    fn session_with(points: &[(f64, f64)]) -> DrawingSession {
        let mut session = DrawingSession::new();
        let mut iter = points.iter();
        if let Some(&(x, y)) = iter.next() {
            session.start(Point::new(x, y)).unwrap();
        }
        for &(x, y) in iter {
            session.add_vertex(Point::new(x, y));
        }
        session
    }

    #[test]
    fn test_single_session_invariant() {
        let mut session = session_with(&[(10.0, 10.0), (20.0, 10.0)]);
        let err = session.start(Point::new(50.0, 50.0)).unwrap_err();
        assert_eq!(err, AnnotationError::SessionAlreadyOpen);
        // Existing vertices untouched
        assert_eq!(session.vertices().len(), 2);
        assert_eq!(session.vertices()[0], Point::new(10.0, 10.0));
    }

    #[test]
    fn test_force_close_rejects_two_vertices() {
        let mut store = PolygonStore::new();
        let mut session = session_with(&[(10.0, 10.0), (20.0, 10.0)]);

        let err = session.force_close(None, &mut store, "Car").unwrap_err();
        assert_eq!(err, AnnotationError::InvalidPolygon { count: 2 });
        // Rejection preserves the session
        assert!(session.is_active());
        assert_eq!(session.vertices().len(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_force_close_with_three_vertices() {
        let mut store = PolygonStore::new();
        let mut session = session_with(&[(100.0, 100.0), (200.0, 100.0), (200.0, 200.0)]);

        let id = session.force_close(None, &mut store, "Car").unwrap();
        assert!(!session.is_active());

        let polygon = store.get(id).unwrap();
        // 3 authored + closure
        assert_eq!(polygon.vertices.len(), 4);
        assert_eq!(polygon.vertices[3], Point::new(100.0, 100.0));
    }

    #[test]
    fn test_force_close_appends_distinct_pointer() {
        let mut store = PolygonStore::new();
        let mut session = session_with(&[(100.0, 100.0), (200.0, 100.0), (200.0, 200.0)]);

        let id = session
            .force_close(Some(Point::new(100.0, 200.0)), &mut store, "Car")
            .unwrap();

        let polygon = store.get(id).unwrap();
        assert_eq!(
            polygon.vertices,
            vec![
                Point::new(100.0, 100.0),
                Point::new(200.0, 100.0),
                Point::new(200.0, 200.0),
                Point::new(100.0, 200.0),
                Point::new(100.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_force_close_skips_pointer_on_last_vertex() {
        let mut store = PolygonStore::new();
        let mut session = session_with(&[(100.0, 100.0), (200.0, 100.0), (200.0, 200.0)]);

        let id = session
            .force_close(Some(Point::new(200.0, 200.0)), &mut store, "Car")
            .unwrap();
        assert_eq!(store.get(id).unwrap().vertices.len(), 4);
    }

    #[test]
    fn test_hover_arms_and_disarms() {
        let view = identity_view();
        let mut session = session_with(&[(100.0, 100.0), (200.0, 100.0), (200.0, 200.0)]);

        // Near the first vertex (within 6 px)
        let armed = session
            .update_hover(Point::new(103.0, 98.0), &view, 6.0)
            .unwrap();
        assert!(armed);
        assert!(session.is_closable());

        let armed = session
            .update_hover(Point::new(150.0, 150.0), &view, 6.0)
            .unwrap();
        assert!(!armed);
        assert!(session.is_active());
    }

    #[test]
    fn test_hover_needs_three_vertices() {
        let view = identity_view();
        let mut session = session_with(&[(100.0, 100.0), (200.0, 100.0)]);
        let armed = session
            .update_hover(Point::new(100.0, 100.0), &view, 6.0)
            .unwrap();
        assert!(!armed);
    }

    #[test]
    fn test_commit_click() {
        let view = identity_view();
        let mut store = PolygonStore::new();
        let mut session = session_with(&[(100.0, 100.0), (200.0, 100.0), (200.0, 200.0)]);

        session
            .update_hover(Point::new(100.0, 100.0), &view, 6.0)
            .unwrap();
        let id = session.commit_click(&mut store, "Car").unwrap();

        assert!(!session.is_active());
        let polygon = store.get(id).unwrap();
        assert_eq!(polygon.vertices.len(), 4);
        assert_eq!(polygon.label, "Car");
    }

    #[test]
    fn test_commit_click_requires_closable() {
        let mut store = PolygonStore::new();
        let mut session = session_with(&[(100.0, 100.0), (200.0, 100.0), (200.0, 200.0)]);

        let err = session.commit_click(&mut store, "Car").unwrap_err();
        assert_eq!(err, AnnotationError::InvalidPolygon { count: 3 });
        assert!(session.is_active());
    }

    #[test]
    fn test_continuous_spacing() {
        let view = identity_view();
        let mut session = session_with(&[(100.0, 100.0)]);

        // 10 px away: below the 25 px minimum
        let added = session
            .add_continuous(Point::new(110.0, 100.0), &view, 25.0)
            .unwrap();
        assert!(!added);
        assert_eq!(session.vertices().len(), 1);

        let added = session
            .add_continuous(Point::new(130.0, 100.0), &view, 25.0)
            .unwrap();
        assert!(added);
        assert_eq!(session.vertices().len(), 2);
        assert_eq!(session.vertices()[1], Point::new(130.0, 100.0));
    }

    #[test]
    fn test_continuous_spacing_is_screen_space() {
        // At 0.5x zoom, 30 image px is only 15 screen px
        let mut view = identity_view();
        view.scale = 0.5;

        let mut session = session_with(&[(100.0, 100.0)]);
        let pointer = view.to_screen(Point::new(130.0, 100.0)).unwrap();
        let added = session.add_continuous(pointer, &view, 25.0).unwrap();
        assert!(!added);
    }

    #[test]
    fn test_cancel_discards() {
        let mut session = session_with(&[(10.0, 10.0), (20.0, 20.0)]);
        session.cancel();
        assert!(!session.is_active());
        assert!(session.vertices().is_empty());
        // New session can start afterwards
        session.start(Point::new(1.0, 1.0)).unwrap();
    }

    #[test]
    fn test_preview_closes_to_first_vertex() {
        let view = identity_view();
        let session = session_with(&[(100.0, 100.0), (200.0, 100.0)]);

        let line = session.preview(Some(Point::new(150.0, 180.0)), &view);
        assert_eq!(
            line,
            vec![
                Point::new(100.0, 100.0),
                Point::new(200.0, 100.0),
                Point::new(150.0, 180.0),
                Point::new(100.0, 100.0),
            ]
        );

        assert!(DrawingSession::new().preview(None, &view).is_empty());
    }
}
