//! Editor configuration.
//!
//! Tunables for zoom bounds, vertex spacing, and hit-testing. Host
//! applications can construct the config directly or deserialize it from
//! JSON; missing fields fall back to the documented defaults.

use serde::{Deserialize, Serialize};

/// Tunable parameters for the annotation editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Lower zoom bound
    pub min_zoom: f64,
    /// Upper zoom bound
    pub max_zoom: f64,
    /// Zoom factor applied per wheel notch or zoom step
    pub zoom_step: f64,
    /// Minimum screen-space distance between vertices appended in
    /// continuous (shift-held) drawing mode
    pub min_vertex_spacing_px: f64,
    /// Screen-space radius for vertex handle hit-testing; matches the
    /// rendered handle size
    pub vertex_hit_radius_px: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.3,
            max_zoom: 5.0,
            zoom_step: 1.1,
            min_vertex_spacing_px: 25.0,
            vertex_hit_radius_px: 6.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.min_zoom, 0.3);
        assert_eq!(config.max_zoom, 5.0);
        assert_eq!(config.zoom_step, 1.1);
        assert_eq!(config.min_vertex_spacing_px, 25.0);
        assert_eq!(config.vertex_hit_radius_px, 6.0);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"max_zoom": 8.0}"#).unwrap();
        assert_eq!(config.max_zoom, 8.0);
        assert_eq!(config.min_zoom, 0.3);
        assert_eq!(config.min_vertex_spacing_px, 25.0);
    }
}
