//! Serialized representations shared with hosts: layout descriptions coming
//! in from generation or files, and canvas documents going out.
//!
//! Layout descriptions are produced by a language model, so they are read
//! leniently: numbers may arrive as numeric strings, ids as numbers, and
//! anything malformed is left for the renderer to skip with a notice.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::style::Color;
use crate::{EditorError, EditorResult, ElementId, ElementRecord};

/// Authoritative canvas size and background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDescriptor {
    /// Width in canvas pixels.
    pub width: u32,
    /// Height in canvas pixels.
    pub height: u32,
    /// Canvas fill.
    pub background_color: Color,
}

impl Default for CanvasDescriptor {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl CanvasDescriptor {
    /// A white canvas of the given size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background_color: Color::Rgb {
                r: 255,
                g: 255,
                b: 255,
            },
        }
    }

    /// Set the background color.
    #[must_use]
    pub const fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Size label shown next to the canvas, e.g. `400 × 300`.
    #[must_use]
    pub fn size_label(&self) -> String {
        format!("{} × {}", self.width, self.height)
    }
}

/// A layout description as received, before validation.
///
/// Both fields are kept as raw JSON; the renderer decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDescription {
    /// Canvas object (`width`, `height`, `backgroundColor`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<Value>,
    /// Element descriptions; anything other than an array renders empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Value>,
}

impl LayoutDescription {
    /// Parse a layout description from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Serialization`] if the text is not a JSON
    /// object.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a description from a canvas and typed records.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Serialization`] if a record fails to
    /// serialize.
    pub fn from_parts(canvas: &CanvasDescriptor, elements: &[ElementRecord]) -> EditorResult<Self> {
        Ok(Self {
            canvas: Some(serde_json::to_value(canvas)?),
            elements: Some(serde_json::to_value(elements)?),
        })
    }
}

/// One element description, read leniently.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementDescription {
    /// Element id; numbers are accepted and stringified.
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// `text`, `shape` or `image`.
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub element_type: Option<String>,
    /// Shape sub-kind.
    #[serde(deserialize_with = "lenient_string")]
    pub shape: Option<String>,
    /// Left edge.
    #[serde(deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    /// Top edge.
    #[serde(deserialize_with = "lenient_number")]
    pub y: Option<f64>,
    /// Width.
    #[serde(deserialize_with = "lenient_number")]
    pub width: Option<f64>,
    /// Height.
    #[serde(deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    /// Explicit stacking order.
    #[serde(deserialize_with = "lenient_number")]
    pub z_index: Option<f64>,
    /// Text body.
    #[serde(deserialize_with = "lenient_string")]
    pub content: Option<String>,
    /// Image source.
    #[serde(deserialize_with = "lenient_string")]
    pub src: Option<String>,
    /// Image alternative text.
    #[serde(deserialize_with = "lenient_string")]
    pub alt: Option<String>,
    /// Style bag; non-objects are ignored.
    pub style: Option<Value>,
    /// Editable property names.
    #[serde(alias = "editableProperties")]
    pub editable: Option<Value>,
}

impl ElementDescription {
    /// Read a description from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Validation`] if the value is not an object.
    pub fn from_value(value: &Value) -> EditorResult<Self> {
        if !value.is_object() {
            return Err(EditorError::Validation(format!(
                "element description is not an object: {value}"
            )));
        }
        Ok(Self::deserialize(value)?)
    }

    /// The style bag, if it is an object.
    #[must_use]
    pub fn style_map(&self) -> Option<&Map<String, Value>> {
        self.style.as_ref().and_then(Value::as_object)
    }

    /// Editable property names, if given as an array of strings.
    #[must_use]
    pub fn editable_names(&self) -> Option<Vec<&str>> {
        self.editable
            .as_ref()
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Read a number given either as a JSON number or a numeric string.
#[must_use]
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|n: &f64| n.is_finite())
}

/// JSON view of an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDocument {
    /// Canvas size and background.
    pub canvas: CanvasDescriptor,
    /// Elements in store order.
    pub elements: Vec<ElementRecord>,
    /// Selected element, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_element_id: Option<ElementId>,
    /// Display scale at the time of capture.
    pub zoom: f32,
}

impl CanvasDocument {
    /// Pretty JSON text of this document.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Re-read this document as a layout description.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Serialization`] if a record fails to
    /// serialize.
    pub fn to_layout(&self) -> EditorResult<LayoutDescription> {
        LayoutDescription::from_parts(&self.canvas, &self.elements)
    }
}

/// A request to the external layout generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// What the user asked for.
    pub prompt: String,
    /// Requested canvas width.
    pub width: u32,
    /// Requested canvas height.
    pub height: u32,
}

impl GenerationRequest {
    /// Create a request.
    #[must_use]
    pub fn new(prompt: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            prompt: prompt.into(),
            width,
            height,
        }
    }

    /// Check the request before sending it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Validation`] for an empty prompt or a zero
    /// dimension.
    pub fn validate(&self) -> EditorResult<()> {
        if self.prompt.trim().is_empty() {
            return Err(EditorError::Validation(
                "Please enter a description for your graphic".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(EditorError::Validation(format!(
                "Canvas size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Instruction text sent to the generator, asking for a layout
    /// description in the shape the renderer reads.
    #[must_use]
    pub fn structured_prompt(&self) -> String {
        format!(
            "Generate a graphic based on the following description: '{prompt}'.\n\
             The canvas size should be {width}x{height} pixels.\n\
             Represent the graphic as a JSON object with:\n\
             1. A 'canvas' object containing 'width', 'height', and 'backgroundColor'.\n\
             2. An 'elements' array, where each element is an object with:\n\
             \x20  - 'id': A unique string identifier (e.g., 'elem-1').\n\
             \x20  - 'type': The element type ('text', 'shape', 'image').\n\
             \x20  - 'x', 'y': Top-left coordinates in pixels.\n\
             \x20  - 'width', 'height': Dimensions in pixels.\n\
             \x20  - 'zIndex': Optional stacking order; higher is drawn on top.\n\
             \x20  - 'content': (For type 'text') The text content.\n\
             \x20  - 'shape': (For type 'shape') The shape type ('rectangle', 'circle', 'ellipse').\n\
             \x20  - 'src': (For type 'image') Placeholder for image URL or data.\n\
             \x20  - 'style': An object of style properties ('color', 'backgroundColor', \
             'fontSize', 'fontFamily', 'fontWeight', 'textAlign', 'borderRadius', \
             'borderColor', 'borderWidth', 'objectFit').\n\
             \x20  - 'editable': An array of user-editable properties (e.g., ['content', 'position', 'size', 'style']).\n\
             Ensure the output is ONLY the JSON object, nothing else.",
            prompt = self.prompt.trim(),
            width = self.width,
            height = self.height,
        )
    }

    /// Check a generator response and force its canvas to the requested
    /// size.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Validation`] if the response lacks a canvas
    /// object or an element array.
    pub fn conform(&self, mut layout: LayoutDescription) -> EditorResult<LayoutDescription> {
        let Some(Value::Object(canvas)) = layout.canvas.as_mut() else {
            return Err(EditorError::Validation(
                "Invalid data structure received from the generator: missing canvas".to_string(),
            ));
        };
        if !layout.elements.as_ref().is_some_and(Value::is_array) {
            return Err(EditorError::Validation(
                "Invalid data structure received from the generator: missing elements".to_string(),
            ));
        }
        canvas.insert("width".to_string(), Value::from(self.width));
        canvas.insert("height".to_string(), Value::from(self.height));
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn element_description_accepts_loose_numbers_and_ids() {
        let value = json!({
            "id": 7,
            "type": "shape",
            "x": "12.5",
            "y": 4,
            "width": "wide",
            "editableProperties": ["style.backgroundColor"]
        });
        let desc = ElementDescription::from_value(&value).expect("parse");
        assert_eq!(desc.id.as_deref(), Some("7"));
        assert!(desc.x.is_some_and(|x| (x - 12.5).abs() < f64::EPSILON));
        assert!(desc.y.is_some_and(|y| (y - 4.0).abs() < f64::EPSILON));
        assert!(desc.width.is_none());
        assert_eq!(desc.editable_names(), Some(vec!["style.backgroundColor"]));
    }

    #[test]
    fn element_description_rejects_non_objects() {
        assert!(ElementDescription::from_value(&json!("text")).is_err());
    }

    #[test]
    fn canvas_descriptor_serializes_camel_case() {
        let canvas = CanvasDescriptor::new(400, 300);
        let value = serde_json::to_value(canvas).expect("serialize");
        assert_eq!(value["backgroundColor"], "#ffffff");
        assert_eq!(canvas.size_label(), "400 × 300");
    }

    #[test]
    fn generation_request_validation() {
        assert!(GenerationRequest::new("  ", 10, 10).validate().is_err());
        assert!(GenerationRequest::new("poster", 0, 10).validate().is_err());
        let request = GenerationRequest::new("poster", 400, 300);
        assert!(request.validate().is_ok());
        let prompt = request.structured_prompt();
        assert!(prompt.contains("'poster'"));
        assert!(prompt.contains("400x300"));
    }

    #[test]
    fn conform_forces_requested_size() {
        let request = GenerationRequest::new("poster", 400, 300);
        let layout = LayoutDescription {
            canvas: Some(json!({"width": 1024, "height": 768})),
            elements: Some(json!([])),
        };
        let layout = request.conform(layout).expect("conform");
        let canvas = layout.canvas.expect("canvas");
        assert_eq!(canvas["width"], 400);
        assert_eq!(canvas["height"], 300);
    }

    #[test]
    fn conform_rejects_missing_elements() {
        let request = GenerationRequest::new("poster", 400, 300);
        let layout = LayoutDescription {
            canvas: Some(json!({"width": 1, "height": 1})),
            elements: None,
        };
        assert!(request.conform(layout).is_err());
    }
}
