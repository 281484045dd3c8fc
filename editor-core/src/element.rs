//! Element records - the authoritative data behind every placed element.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::style::{Style, StyleKey};
use crate::{EditorError, EditorResult};

/// Unique, stable identifier for an element on a canvas.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Wrap an existing id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id such as `shape-1b4e28ba2fa1...`.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", Uuid::new_v4().simple()))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Top-level element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Text block.
    Text,
    /// Filled shape.
    Shape,
    /// Image.
    Image,
}

impl ElementType {
    /// Parse a layout-description type name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "shape" => Some(Self::Shape),
            "image" => Some(Self::Image),
            _ => None,
        }
    }

    /// Prefix used for generated ids.
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Shape => "shape",
            Self::Image => "image",
        }
    }

    /// Properties exposed to the customization UI when a description does
    /// not list its own.
    #[must_use]
    pub fn default_editable(self) -> BTreeSet<EditableProperty> {
        let mut props: BTreeSet<EditableProperty> = match self {
            Self::Text => [EditableProperty::Content].into_iter().collect(),
            Self::Shape => BTreeSet::new(),
            Self::Image => [EditableProperty::Src].into_iter().collect(),
        };
        props.extend(self.default_style_keys().iter().map(|k| EditableProperty::Style(*k)));
        props.insert(EditableProperty::Position);
        props.insert(EditableProperty::Size);
        props
    }

    /// Style keys the customization UI offers for this type.
    #[must_use]
    pub const fn default_style_keys(self) -> &'static [StyleKey] {
        match self {
            Self::Text => &[
                StyleKey::Color,
                StyleKey::FontSize,
                StyleKey::FontWeight,
                StyleKey::TextAlign,
            ],
            Self::Shape => &[
                StyleKey::BackgroundColor,
                StyleKey::BorderColor,
                StyleKey::BorderWidth,
                StyleKey::BorderRadius,
            ],
            Self::Image => &[
                StyleKey::ObjectFit,
                StyleKey::BorderRadius,
                StyleKey::BorderColor,
                StyleKey::BorderWidth,
            ],
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id_prefix())
    }
}

/// Sub-kind of a shape element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Rectangle with optional rounded corners.
    #[default]
    Rectangle,
    /// Circle (50% radius).
    Circle,
    /// Ellipse (50% radius on a non-square box).
    Ellipse,
}

impl ShapeKind {
    /// Parse a layout-description shape name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "rectangle" | "rect" => Some(Self::Rectangle),
            "circle" => Some(Self::Circle),
            "ellipse" => Some(Self::Ellipse),
            _ => None,
        }
    }

    /// Whether the shape is drawn with fully rounded corners.
    #[must_use]
    pub const fn is_round(self) -> bool {
        matches!(self, Self::Circle | Self::Ellipse)
    }
}

/// Type-specific content of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// A text block.
    Text {
        /// Text body.
        content: String,
    },
    /// A filled shape.
    Shape {
        /// Shape sub-kind.
        shape: ShapeKind,
    },
    /// An image.
    Image {
        /// Image source URL or data URI.
        src: String,
        /// Alternative text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
}

impl ElementKind {
    /// The element type of this content.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Text { .. } => ElementType::Text,
            Self::Shape { .. } => ElementType::Shape,
            Self::Image { .. } => ElementType::Image,
        }
    }
}

/// A point in canvas or screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in unscaled canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a rect.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the point lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// A property name the customization UI may edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EditableProperty {
    /// Text body.
    Content,
    /// Image source.
    Src,
    /// Image alternative text.
    Alt,
    /// x/y.
    Position,
    /// width/height.
    Size,
    /// A single style property (`style.<name>`).
    Style(StyleKey),
}

impl EditableProperty {
    /// Parse `content`, `src`, `alt`, `position`, `size` or `style.<name>`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "content" => Some(Self::Content),
            "src" => Some(Self::Src),
            "alt" => Some(Self::Alt),
            "position" => Some(Self::Position),
            "size" => Some(Self::Size),
            other => other
                .strip_prefix("style.")
                .and_then(StyleKey::from_name)
                .map(Self::Style),
        }
    }
}

impl fmt::Display for EditableProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => f.write_str("content"),
            Self::Src => f.write_str("src"),
            Self::Alt => f.write_str("alt"),
            Self::Position => f.write_str("position"),
            Self::Size => f.write_str("size"),
            Self::Style(key) => write!(f, "style.{key}"),
        }
    }
}

impl TryFrom<String> for EditableProperty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown editable property: {value}"))
    }
}

impl From<EditableProperty> for String {
    fn from(prop: EditableProperty) -> Self {
        prop.to_string()
    }
}

/// The authoritative record of one placed element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    /// Unique identifier.
    pub id: ElementId,
    /// Type-specific content.
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Position and size in unscaled canvas units.
    #[serde(flatten)]
    pub geometry: Rect,
    /// Explicit stacking order; higher paints on top.
    #[serde(default)]
    pub z_index: i32,
    /// Typed style declarations.
    #[serde(default)]
    pub style: Style,
    /// Properties exposed to the customization UI.
    #[serde(default)]
    pub editable: BTreeSet<EditableProperty>,
}

impl ElementRecord {
    /// Create a record with the type's default editable properties.
    #[must_use]
    pub fn new(id: ElementId, kind: ElementKind, geometry: Rect) -> Self {
        let editable = kind.element_type().default_editable();
        Self {
            id,
            kind,
            geometry,
            z_index: 0,
            style: Style::new(),
            editable,
        }
    }

    /// Set the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// The element type.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Whether the point (canvas units) is inside the element box.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        self.geometry.contains(point)
    }

    /// Merge a patch into this record.
    ///
    /// Fields merge shallowly except `style`, which merges per key. The
    /// record is left untouched if the patch is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Validation`] for non-positive sizes or content
    /// fields that do not belong to this element type.
    pub fn apply(&mut self, patch: &ElementPatch) -> EditorResult<()> {
        patch.validate_for(self.element_type())?;

        if let Some(x) = patch.x {
            self.geometry.x = x;
        }
        if let Some(y) = patch.y {
            self.geometry.y = y;
        }
        if let Some(width) = patch.width {
            self.geometry.width = width;
        }
        if let Some(height) = patch.height {
            self.geometry.height = height;
        }
        if let Some(z) = patch.z_index {
            self.z_index = z;
        }
        if let Some(style) = &patch.style {
            self.style.merge(style);
        }
        if let Some(editable) = &patch.editable {
            self.editable.clone_from(editable);
        }
        match &mut self.kind {
            ElementKind::Text { content } => {
                if let Some(new) = &patch.content {
                    content.clone_from(new);
                }
            }
            ElementKind::Shape { shape } => {
                if let Some(new) = patch.shape {
                    *shape = new;
                }
            }
            ElementKind::Image { src, alt } => {
                if let Some(new) = &patch.src {
                    src.clone_from(new);
                }
                if let Some(new) = &patch.alt {
                    *alt = Some(new.clone());
                }
            }
        }
        Ok(())
    }
}

/// A partial update for an [`ElementRecord`]. `None` fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementPatch {
    /// New left edge.
    pub x: Option<f32>,
    /// New top edge.
    pub y: Option<f32>,
    /// New width.
    pub width: Option<f32>,
    /// New height.
    pub height: Option<f32>,
    /// New z-index.
    pub z_index: Option<i32>,
    /// New text body (text only).
    pub content: Option<String>,
    /// New shape sub-kind (shape only).
    pub shape: Option<ShapeKind>,
    /// New image source (image only).
    pub src: Option<String>,
    /// New alternative text (image only).
    pub alt: Option<String>,
    /// Style declarations to merge.
    pub style: Option<Style>,
    /// Replacement editable-property set.
    pub editable: Option<BTreeSet<EditableProperty>>,
}

impl ElementPatch {
    /// Patch that moves the element.
    #[must_use]
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that sets position and size.
    #[must_use]
    pub fn geometry(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            ..Self::default()
        }
    }

    /// Patch that merges style declarations.
    #[must_use]
    pub fn style(style: Style) -> Self {
        Self {
            style: Some(style),
            ..Self::default()
        }
    }

    /// Patch that replaces the text body.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Patch that sets the z-index.
    #[must_use]
    pub fn z_index(z_index: i32) -> Self {
        Self {
            z_index: Some(z_index),
            ..Self::default()
        }
    }

    fn validate_for(&self, element_type: ElementType) -> EditorResult<()> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = value {
                if !(v.is_finite() && v > 0.0) {
                    return Err(EditorError::Validation(format!(
                        "{name} must be positive, got {v}"
                    )));
                }
            }
        }
        for (name, value) in [("x", self.x), ("y", self.y)] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(EditorError::Validation(format!("{name} must be finite")));
            }
        }
        let misplaced = match element_type {
            ElementType::Text => {
                (self.src.is_some() || self.alt.is_some() || self.shape.is_some()).then_some("src/alt/shape")
            }
            ElementType::Shape => {
                (self.content.is_some() || self.src.is_some() || self.alt.is_some())
                    .then_some("content/src/alt")
            }
            ElementType::Image => (self.content.is_some() || self.shape.is_some()).then_some("content/shape"),
        };
        match misplaced {
            Some(fields) => Err(EditorError::Validation(format!(
                "{fields} not applicable to {element_type} elements"
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Color, StyleProperty, TextAlign};

    fn text_record() -> ElementRecord {
        ElementRecord::new(
            ElementId::new("t1"),
            ElementKind::Text {
                content: "Hello".to_string(),
            },
            Rect::new(10.0, 10.0, 100.0, 30.0),
        )
    }

    #[test]
    fn generated_ids_carry_prefix_and_differ() {
        let a = ElementId::generate("shape");
        let b = ElementId::generate("shape");
        assert!(a.as_str().starts_with("shape-"));
        assert_ne!(a, b);
    }

    #[test]
    fn default_editable_includes_position_and_size() {
        let props = ElementType::Shape.default_editable();
        assert!(props.contains(&EditableProperty::Position));
        assert!(props.contains(&EditableProperty::Size));
        assert!(props.contains(&EditableProperty::Style(StyleKey::BorderRadius)));
        assert!(!props.contains(&EditableProperty::Content));
    }

    #[test]
    fn editable_property_names_round_trip() {
        for name in ["content", "src", "position", "style.fontSize", "style.objectFit"] {
            let prop = EditableProperty::parse(name).expect("known name");
            assert_eq!(prop.to_string(), name);
        }
        assert_eq!(EditableProperty::parse("style.zIndex"), None);
    }

    #[test]
    fn apply_merges_style_per_key() {
        let mut record = text_record().with_style(
            Style::new()
                .with(StyleProperty::Color(Color::parse("#111").expect("color")))
                .with(StyleProperty::TextAlign(TextAlign::Left)),
        );
        let patch = ElementPatch::style(Style::new().with(StyleProperty::TextAlign(TextAlign::Right)));
        record.apply(&patch).expect("apply");
        assert!(record.style.contains(StyleKey::Color));
        assert_eq!(
            record.style.get(StyleKey::TextAlign),
            Some(&StyleProperty::TextAlign(TextAlign::Right))
        );
    }

    #[test]
    fn apply_rejects_non_positive_size() {
        let mut record = text_record();
        let patch = ElementPatch {
            width: Some(0.0),
            ..ElementPatch::default()
        };
        assert!(record.apply(&patch).is_err());
        assert!((record.geometry.width - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn apply_rejects_foreign_content_fields() {
        let mut record = text_record();
        let patch = ElementPatch {
            src: Some("x.png".to_string()),
            ..ElementPatch::default()
        };
        assert!(record.apply(&patch).is_err());
    }

    #[test]
    fn negative_position_is_allowed() {
        let mut record = text_record();
        record.apply(&ElementPatch::position(-50.0, -5.0)).expect("apply");
        assert!((record.geometry.x + 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn record_serializes_flat() {
        let record = text_record().with_z_index(3);
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["type"], "text");
        assert_eq!(value["content"], "Hello");
        assert_eq!(value["zIndex"], 3);
        assert_eq!(value["x"], 10.0);
        let back: ElementRecord = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, record);
    }
}
