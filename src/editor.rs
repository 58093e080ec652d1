//! The annotation editor.
//!
//! [`AnnotationEditor`] is the single entry point the host renderer talks
//! to: it consumes [`InputEvent`]s, routes them to the viewport, the
//! drawing session, and the polygon store, and hands back screen-space
//! polygon lists to draw. Every mutation goes through one dispatch
//! function, so the interaction flow is deterministic and replayable.

use crate::config::EditorConfig;
use crate::error::Result;
use crate::event::{InputEvent, Key};
use crate::geometry::{clamp, safe, Point};
use crate::keybindings::{EditorAction, KeyBindings};
use crate::session::DrawingSession;
use crate::store::{PolygonId, PolygonStore};
use crate::viewport::{ViewportController, PAN_STEP};

/// Label assigned to new polygons until the host sets another.
const DEFAULT_LABEL: &str = "Car";

/// A polygon ready for drawing, in screen coordinates.
///
/// Unfinished entries are the in-progress preview line; finished entries
/// carry explicit closure (last point equals the first).
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenPolygon {
    pub points: Vec<Point>,
    pub is_finished: bool,
}

/// What the pointer is currently dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    /// One vertex handle of a finalized polygon
    Vertex { polygon: PolygonId, index: usize },
    /// A whole finalized polygon; `last_pos` is the screen position the
    /// previous delta was applied at
    WholePolygon { polygon: PolygonId, last_pos: Point },
}

/// Owns the full editing state and dispatches input events to it.
#[derive(Debug)]
pub struct AnnotationEditor {
    config: EditorConfig,
    bindings: KeyBindings,
    viewport: ViewportController,
    store: PolygonStore,
    session: DrawingSession,
    drag: DragState,
    shift_held: bool,
    last_pointer: Option<Point>,
    active_label: String,
}

impl Default for AnnotationEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl AnnotationEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            bindings: KeyBindings::default(),
            viewport: ViewportController::new(config),
            store: PolygonStore::new(),
            session: DrawingSession::new(),
            drag: DragState::Idle,
            shift_held: false,
            last_pointer: None,
            active_label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Process one input event. Rejected operations return the error and
    /// leave all state unchanged.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::PointerDown { pos, modifiers } => {
                self.shift_held = modifiers.shift;
                self.last_pointer = Some(pos);
                self.on_pointer_down(pos)
            }
            InputEvent::PointerMove { pos } => {
                self.last_pointer = Some(pos);
                self.on_pointer_move(pos)
            }
            InputEvent::PointerUp => {
                if self.drag != DragState::Idle {
                    log::debug!("drag ended");
                    self.drag = DragState::Idle;
                }
                Ok(())
            }
            InputEvent::KeyDown(Key::Shift) => {
                self.shift_held = true;
                Ok(())
            }
            InputEvent::KeyUp(Key::Shift) => {
                self.shift_held = false;
                Ok(())
            }
            InputEvent::KeyDown(key) => match self.bindings.action_for_key(key) {
                Some(action) => self.on_action(action),
                None => Ok(()),
            },
            InputEvent::KeyUp(_) => Ok(()),
            InputEvent::Wheel { pos, delta_y } => {
                self.last_pointer = Some(pos);
                self.viewport.on_wheel(pos, delta_y)
            }
            InputEvent::Resize(size) => {
                self.viewport.on_resize(size);
                Ok(())
            }
            InputEvent::ImageLoaded(size) => {
                self.viewport.image_loaded(size);
                Ok(())
            }
        }
    }

    fn on_action(&mut self, action: EditorAction) -> Result<()> {
        match action {
            EditorAction::ClosePolygon => {
                let view = *self.viewport.view();
                let pointer = self
                    .last_pointer
                    .and_then(|p| view.to_image(p).ok());
                self.session
                    .force_close(pointer, &mut self.store, &self.active_label)?;
                Ok(())
            }
            EditorAction::CancelDrawing => {
                self.session.cancel();
                Ok(())
            }
            EditorAction::ZoomIn => {
                self.viewport.zoom_in();
                Ok(())
            }
            EditorAction::ZoomOut => {
                self.viewport.zoom_out();
                Ok(())
            }
            EditorAction::FitView => {
                self.viewport.set_fit_to_view();
                Ok(())
            }
            EditorAction::PanLeft => {
                self.viewport.pan_by(Point::new(-PAN_STEP, 0.0));
                Ok(())
            }
            EditorAction::PanRight => {
                self.viewport.pan_by(Point::new(PAN_STEP, 0.0));
                Ok(())
            }
            EditorAction::PanUp => {
                self.viewport.pan_by(Point::new(0.0, -PAN_STEP));
                Ok(())
            }
            EditorAction::PanDown => {
                self.viewport.pan_by(Point::new(0.0, PAN_STEP));
                Ok(())
            }
        }
    }

    fn on_pointer_down(&mut self, pos: Point) -> Result<()> {
        let view = *self.viewport.view();

        if !view.is_inside_image(pos) {
            log::debug!("click outside image ignored at ({:.1}, {:.1})", pos.x, pos.y);
            return Ok(());
        }

        if self.session.is_active() {
            // All in-image clicks belong to the drawing flow while a
            // session is open.
            self.session
                .update_hover(pos, &view, self.config.vertex_hit_radius_px)?;
            if self.session.is_closable() {
                self.session.commit_click(&mut self.store, &self.active_label)?;
            } else {
                self.session.add_vertex(view.to_image(pos)?);
            }
            return Ok(());
        }

        // Idle: editing existing polygons wins over starting a new one.
        if let Some((polygon, index)) = self.hit_test_vertex(pos) {
            log::debug!("vertex drag started: polygon {} vertex {}", polygon, index);
            self.drag = DragState::Vertex { polygon, index };
            return Ok(());
        }

        let image_pos = view.to_image(pos)?;
        if let Some(polygon) = self.store.hit_test(image_pos) {
            log::debug!("polygon drag started: polygon {}", polygon);
            self.drag = DragState::WholePolygon {
                polygon,
                last_pos: pos,
            };
            return Ok(());
        }

        self.session.start(image_pos)
    }

    fn on_pointer_move(&mut self, pos: Point) -> Result<()> {
        match self.drag {
            DragState::Vertex { polygon, index } => self.drag_vertex(polygon, index, pos),
            DragState::WholePolygon { polygon, last_pos } => {
                let applied = self.drag_polygon(polygon, pos - last_pos)?;
                self.drag = DragState::WholePolygon {
                    polygon,
                    last_pos: last_pos + applied,
                };
                Ok(())
            }
            DragState::Idle => {
                if !self.session.is_active() {
                    return Ok(());
                }
                let view = *self.viewport.view();
                self.session
                    .update_hover(pos, &view, self.config.vertex_hit_radius_px)?;
                if self.shift_held {
                    self.session
                        .add_continuous(pos, &view, self.config.min_vertex_spacing_px)?;
                }
                Ok(())
            }
        }
    }

    /// Drag one vertex handle: the screen position is clamped to the image
    /// rectangle (inset by the handle radius on the far edges) before being
    /// mapped back to image space.
    fn drag_vertex(&mut self, polygon: PolygonId, index: usize, pos: Point) -> Result<()> {
        let view = *self.viewport.view();
        let rect = view.image_rect()?;
        let radius = self.config.vertex_hit_radius_px;

        let clamped = Point::new(
            clamp(safe(pos.x), rect.x, rect.x + rect.width - radius),
            clamp(safe(pos.y), rect.y, rect.y + rect.height - radius),
        );
        let image_pos = view.to_image(clamped)?;
        self.store.move_vertex(polygon, index, image_pos)
    }

    /// Drag a whole polygon by a screen-space delta, clamped so its
    /// bounding box stays within the image. Returns the screen-space delta
    /// actually applied.
    fn drag_polygon(&mut self, polygon: PolygonId, delta_screen: Point) -> Result<Point> {
        let view = *self.viewport.view();
        let scale = view.scale;

        let bbox = match self.store.get(polygon).and_then(|p| p.bounding_box()) {
            Some(bbox) => bbox,
            None => return Ok(Point::default()),
        };

        let mut dx = safe(delta_screen.x) / scale;
        let mut dy = safe(delta_screen.y) / scale;

        // Bounding box must stay inside [0, natural size] in image space
        if bbox.x + dx < 0.0 {
            dx = -bbox.x;
        }
        if bbox.x + bbox.width + dx > view.image_size.width {
            dx = view.image_size.width - bbox.x - bbox.width;
        }
        if bbox.y + dy < 0.0 {
            dy = -bbox.y;
        }
        if bbox.y + bbox.height + dy > view.image_size.height {
            dy = view.image_size.height - bbox.y - bbox.height;
        }

        let delta_image = Point::new(dx, dy);
        self.store.translate_polygon(polygon, delta_image)?;
        Ok(Point::new(dx * scale, dy * scale))
    }

    /// Topmost vertex handle under the pointer, closure duplicates skipped.
    fn hit_test_vertex(&self, pos: Point) -> Option<(PolygonId, usize)> {
        let view = self.viewport.view();
        let radius = self.config.vertex_hit_radius_px;

        for (id, polygon) in self.store.polygons().iter().enumerate().rev() {
            for (index, vertex) in polygon.vertices[..polygon.authored_len()].iter().enumerate() {
                if let Ok(screen) = view.to_screen(*vertex) {
                    if screen.distance_to(pos) <= radius {
                        return Some((id, index));
                    }
                }
            }
        }
        None
    }

    /// Everything the renderer should draw: finalized polygons plus the
    /// in-progress preview, all in screen space.
    pub fn screen_polygons(&self) -> Vec<ScreenPolygon> {
        let view = self.viewport.view();
        let mut out = Vec::with_capacity(self.store.len() + 1);

        for polygon in self.store.polygons() {
            let mut points = Vec::with_capacity(polygon.vertices.len());
            for v in &polygon.vertices {
                match view.to_screen(*v) {
                    Ok(s) => points.push(s),
                    Err(_) => return Vec::new(),
                }
            }
            out.push(ScreenPolygon {
                points,
                is_finished: true,
            });
        }

        let preview = self.session.preview(self.last_pointer, view);
        if !preview.is_empty() {
            out.push(ScreenPolygon {
                points: preview,
                is_finished: false,
            });
        }
        out
    }

    /// Screen-space radius for first-vertex hit-testing, matching the
    /// rendered handle size.
    pub fn start_vertex_hit_radius(&self) -> f64 {
        self.config.vertex_hit_radius_px
    }

    /// Label assigned to polygons committed from now on.
    pub fn set_active_label(&mut self, label: impl Into<String>) {
        self.active_label = label.into();
    }

    pub fn active_label(&self) -> &str {
        &self.active_label
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn store(&self) -> &PolygonStore {
        &self.store
    }

    /// Mutable store access for hosts that drive vertex edits through their
    /// own gesture recognition. Positions must be pre-clamped to the image.
    pub fn store_mut(&mut self) -> &mut PolygonStore {
        &mut self.store
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }
}
