//! Keyboard bindings for editor actions.
//!
//! Defaults follow the tool's established keys: `N` force-closes the
//! current polygon, `Escape` cancels it, `+`/`-` zoom, `F` fits the image
//! to the viewport, and the arrow keys pan. Character matching is
//! case-insensitive. Holding `Shift` (continuous drawing) is a modifier,
//! not an action, and is tracked by the editor directly.

use crate::event::Key;

/// Discrete actions a key press can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Force-close and commit the in-progress polygon
    ClosePolygon,
    /// Discard the in-progress polygon
    CancelDrawing,
    ZoomIn,
    ZoomOut,
    /// Re-fit the image to the viewport
    FitView,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
}

/// Keybinding configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    /// Force-close the current polygon
    pub close_polygon: Key,
    /// Cancel the current polygon
    pub cancel: Key,
    pub zoom_in: Key,
    pub zoom_out: Key,
    pub fit_view: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            close_polygon: Key::Char('n'),
            cancel: Key::Escape,
            zoom_in: Key::Char('+'),
            zoom_out: Key::Char('-'),
            fit_view: Key::Char('f'),
        }
    }
}

fn keys_match(bound: Key, pressed: Key) -> bool {
    match (bound, pressed) {
        (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(&b),
        (a, b) => a == b,
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the action bound to a key press, if any. Arrow-key panning
    /// is fixed and not rebindable.
    pub fn action_for_key(&self, key: Key) -> Option<EditorAction> {
        match key {
            Key::ArrowLeft => return Some(EditorAction::PanLeft),
            Key::ArrowRight => return Some(EditorAction::PanRight),
            Key::ArrowUp => return Some(EditorAction::PanUp),
            Key::ArrowDown => return Some(EditorAction::PanDown),
            _ => {}
        }

        if keys_match(self.close_polygon, key) {
            Some(EditorAction::ClosePolygon)
        } else if keys_match(self.cancel, key) {
            Some(EditorAction::CancelDrawing)
        } else if keys_match(self.zoom_in, key) {
            Some(EditorAction::ZoomIn)
        } else if keys_match(self.zoom_out, key) {
            Some(EditorAction::ZoomOut)
        } else if keys_match(self.fit_view, key) {
            Some(EditorAction::FitView)
        } else {
            None
        }
    }
}
