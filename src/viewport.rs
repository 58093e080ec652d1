//! Viewport control: resize, zoom, and pan.
//!
//! [`ViewportController`] owns the [`ViewState`] and is the only place that
//! mutates it. Zoom is clamped into the configured bounds; wheel zoom keeps
//! the image point under the pointer fixed on screen.

use crate::config::EditorConfig;
use crate::error::{AnnotationError, Result};
use crate::geometry::{clamp, Point, Size};
use crate::transform::ViewState;

/// Pan step for keyboard navigation, in screen pixels.
pub const PAN_STEP: f64 = 10.0;

/// Scale changes below this are treated as saturated no-ops.
const ZOOM_CHANGE: f64 = 1e-9;

/// How the image scale is being chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Recompute the fit scale whenever the viewport or image size changes
    #[default]
    FitToView,
    /// The user has zoomed; resize must not clobber their scale
    Manual,
}

/// Owns the view state and applies resize/zoom/pan gestures to it.
#[derive(Debug, Clone)]
pub struct ViewportController {
    view: ViewState,
    fit_mode: FitMode,
    config: EditorConfig,
}

impl ViewportController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            view: ViewState::default(),
            fit_mode: FitMode::FitToView,
            config,
        }
    }

    /// Read access to the current view state.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }

    /// Viewport size changed. Re-fits the image unless the user has zoomed
    /// manually.
    pub fn on_resize(&mut self, size: Size) {
        self.view.viewport = size;
        self.refit();
        log::debug!(
            "viewport resized to {:.0}x{:.0}, scale {:.3}",
            size.width,
            size.height,
            self.view.scale
        );
    }

    /// Image natural size became known (or changed).
    pub fn image_loaded(&mut self, size: Size) {
        self.view.image_size = size;
        self.refit();
        log::debug!(
            "image loaded at {:.0}x{:.0}, scale {:.3}",
            size.width,
            size.height,
            self.view.scale
        );
    }

    fn refit(&mut self) {
        if self.fit_mode == FitMode::FitToView {
            if let Ok(scale) = self.view.fit_scale() {
                self.view.scale = scale;
            }
        }
    }

    /// Wheel zoom at the pointer position: one notch per call, anchored so
    /// the image point under the pointer stays fixed on screen.
    ///
    /// `delta_y > 0` zooms in. Steps that would leave the zoom bounds
    /// saturate at the bound; once saturated, further steps are no-ops.
    pub fn on_wheel(&mut self, pos: Point, delta_y: f64) -> Result<()> {
        if !self.view.is_ready() {
            return Err(AnnotationError::NotReady);
        }

        let old_scale = self.view.scale;
        let stepped = if delta_y > 0.0 {
            old_scale * self.config.zoom_step
        } else {
            old_scale / self.config.zoom_step
        };
        let new_scale = clamp(stepped, self.config.min_zoom, self.config.max_zoom);

        if (new_scale - old_scale).abs() < ZOOM_CHANGE {
            log::debug!("zoom saturated at {:.2}", old_scale);
            return Ok(());
        }

        // Image point under the pointer before the zoom; the new offset is
        // chosen so that point maps back to `pos` afterwards.
        let origin = self.view.image_origin(old_scale);
        let anchor_x = (pos.x - origin.x) / old_scale;
        let anchor_y = (pos.y - origin.y) / old_scale;

        self.view.scale = new_scale;
        self.view.offset = Point::new(
            pos.x - anchor_x * new_scale
                - (self.view.viewport.width - self.view.image_size.width * new_scale) / 2.0,
            pos.y - anchor_y * new_scale
                - (self.view.viewport.height - self.view.image_size.height * new_scale) / 2.0,
        );
        self.fit_mode = FitMode::Manual;

        log::debug!(
            "🔍 zoom {:.3} -> {:.3} at ({:.1}, {:.1})",
            old_scale,
            new_scale,
            pos.x,
            pos.y
        );
        Ok(())
    }

    /// Step zoom in (keyboard/buttons); not anchored.
    pub fn zoom_in(&mut self) {
        self.view.scale = clamp(
            self.view.scale * self.config.zoom_step,
            self.config.min_zoom,
            self.config.max_zoom,
        );
        self.fit_mode = FitMode::Manual;
        log::debug!("🔍 zoom in: {:.2}x", self.view.scale);
    }

    /// Step zoom out (keyboard/buttons); not anchored.
    pub fn zoom_out(&mut self) {
        self.view.scale = clamp(
            self.view.scale / self.config.zoom_step,
            self.config.min_zoom,
            self.config.max_zoom,
        );
        self.fit_mode = FitMode::Manual;
        log::debug!("🔍 zoom out: {:.2}x", self.view.scale);
    }

    /// Translate the view. Unbounded: panning the image out of sight is
    /// currently permitted.
    pub fn pan_by(&mut self, delta: Point) {
        self.view.offset = self.view.offset + delta;
    }

    /// Return to automatic fitting and recompute the fit scale.
    pub fn set_fit_to_view(&mut self) {
        self.fit_mode = FitMode::FitToView;
        self.view.offset = Point::default();
        self.refit();
        log::debug!("view reset to fit, scale {:.3}", self.view.scale);
    }
}
