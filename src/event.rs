//! Input event types.
//!
//! The host (renderer) translates its native windowing events into these and
//! feeds them to [`crate::editor::AnnotationEditor::handle_event`]. All types
//! are serde-serializable so event traces can be recorded and replayed.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Size};

/// Keyboard keys the editor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// A printable character key; matching is case-insensitive
    Char(char),
    Shift,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

/// Modifier keys active during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
}

/// All input the annotation core consumes from its host.
///
/// Positions are in screen space (viewport pixels); sizes are the viewport
/// size or the image's natural size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Primary button pressed
    PointerDown { pos: Point, modifiers: Modifiers },
    /// Pointer moved
    PointerMove { pos: Point },
    /// Primary button released
    PointerUp,
    /// Key pressed
    KeyDown(Key),
    /// Key released
    KeyUp(Key),
    /// Wheel notch at the pointer position; `delta_y > 0` zooms in
    Wheel { pos: Point, delta_y: f64 },
    /// Viewport size changed
    Resize(Size),
    /// Image finished loading; natural size now known
    ImageLoaded(Size),
}
