//! Editor configuration.

use serde::{Deserialize, Serialize};

/// Tunable constants for an editing session.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of history snapshots kept.
    pub history_capacity: usize,
    /// Minimum width/height (unscaled units) enforced by interactive resize.
    pub min_element_size: f32,
    /// Smallest zoom factor.
    pub zoom_min: f32,
    /// Largest zoom factor.
    pub zoom_max: f32,
    /// Zoom increment; `set_zoom` snaps to multiples of it.
    pub zoom_step: f32,
    /// Resize handle edge length in screen pixels.
    pub handle_size: f32,
    /// Padding subtracted from the viewport before fitting the canvas.
    pub canvas_padding: f32,
    /// Font family applied to text elements that do not specify one.
    pub default_font_family: String,
    /// Text color for newly added text elements.
    pub default_text_color: String,
    /// Image source used when a description or new image has none.
    pub placeholder_image_url: String,
    /// Background colors cycled through for newly added shapes.
    pub shape_palette: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            min_element_size: 20.0,
            zoom_min: 0.1,
            zoom_max: 3.0,
            zoom_step: 0.1,
            handle_size: 10.0,
            canvas_padding: 40.0,
            default_font_family: "Poppins, sans-serif".to_string(),
            default_text_color: "#333333".to_string(),
            placeholder_image_url: "https://via.placeholder.com/150".to_string(),
            shape_palette: [
                "#4a90e2", "#50c878", "#f06292", "#ff9800", "#9c27b0", "#607d8b",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON, filling unspecified fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
