//! Image-space / screen-space coordinate mapping.
//!
//! The image is drawn centered in the viewport at the current scale, then
//! shifted by the pan offset. Every conversion in the crate goes through
//! [`ViewState`] so the transform is derived in exactly one place.
//!
//! Forward mapping per axis:
//!
//! ```text
//! screen = image * scale + (viewport - natural * scale) / 2 + offset
//! ```
//!
//! [`ViewState::to_image`] is the exact algebraic inverse, so
//! `to_image(to_screen(p)) == p` up to floating-point rounding.

use serde::{Deserialize, Serialize};

use crate::error::{AnnotationError, Result};
use crate::geometry::{BoundingBox, Point, Size};

/// The view parameters the transform depends on.
///
/// Owned and mutated by [`crate::viewport::ViewportController`]; everything
/// here is plain data and all methods are pure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Current zoom scale (screen pixels per image pixel)
    pub scale: f64,
    /// Pan translation in screen space
    pub offset: Point,
    /// Viewport size in screen pixels
    pub viewport: Size,
    /// Natural (unscaled) image size; zero until the image has loaded
    pub image_size: Size,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Point::default(),
            viewport: Size::default(),
            image_size: Size::default(),
        }
    }
}

impl ViewState {
    /// Whether the image's natural size is known.
    pub fn is_ready(&self) -> bool {
        self.image_size.is_valid()
    }

    /// Scale that fits the whole image inside the viewport.
    pub fn fit_scale(&self) -> Result<f64> {
        if !self.is_ready() {
            return Err(AnnotationError::NotReady);
        }
        let sx = self.viewport.width / self.image_size.width;
        let sy = self.viewport.height / self.image_size.height;
        Ok(sx.min(sy))
    }

    /// Screen position of the image's top-left corner at the given scale.
    ///
    /// Centering term plus pan offset; factored out so the zoom anchor math
    /// in the viewport controller uses the same expression.
    pub fn image_origin(&self, scale: f64) -> Point {
        Point::new(
            (self.viewport.width - self.image_size.width * scale) / 2.0 + self.offset.x,
            (self.viewport.height - self.image_size.height * scale) / 2.0 + self.offset.y,
        )
    }

    /// Map an image-space point to screen space.
    pub fn to_screen(&self, p: Point) -> Result<Point> {
        if !self.is_ready() {
            return Err(AnnotationError::NotReady);
        }
        let origin = self.image_origin(self.scale);
        Ok(Point::new(
            p.x * self.scale + origin.x,
            p.y * self.scale + origin.y,
        ))
    }

    /// Map a screen-space point to image space. Inverse of [`Self::to_screen`].
    pub fn to_image(&self, p: Point) -> Result<Point> {
        if !self.is_ready() {
            return Err(AnnotationError::NotReady);
        }
        let origin = self.image_origin(self.scale);
        Ok(Point::new(
            (p.x - origin.x) / self.scale,
            (p.y - origin.y) / self.scale,
        ))
    }

    /// The image's current on-screen rectangle.
    pub fn image_rect(&self) -> Result<BoundingBox> {
        if !self.is_ready() {
            return Err(AnnotationError::NotReady);
        }
        let origin = self.image_origin(self.scale);
        Ok(BoundingBox::new(
            origin.x,
            origin.y,
            self.image_size.width * self.scale,
            self.image_size.height * self.scale,
        ))
    }

    /// Whether a screen-space point lies on the image. False until the image
    /// has loaded, so stray clicks before then are simply ignored.
    pub fn is_inside_image(&self, p: Point) -> bool {
        self.image_rect().map(|r| r.contains(p)).unwrap_or(false)
    }
}
