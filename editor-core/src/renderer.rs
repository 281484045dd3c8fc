//! Materializes layout descriptions and snapshots into the session.
//!
//! Rendering happens in two steps. [`Renderer::prepare`] validates a layout
//! description and turns every usable element description into a record,
//! collecting notices for whatever it had to skip or drop. Then
//! [`Renderer::materialize`] replaces the store and the visual tree
//! wholesale and binds interaction on every visual. History restore uses
//! the second step directly.

use serde::Serialize;
use serde_json::Value;

use crate::element::EditableProperty;
use crate::resize;
use crate::schema::{number_from_value, ElementDescription};
use crate::session::EditorSession;
use crate::style::{Color, Length, ObjectFit, Style, StyleKey, StyleProperty};
use crate::visual::VisualTree;
use crate::{
    CanvasDescriptor, CanvasElementStore, EditorConfig, EditorError, EditorResult, ElementId,
    ElementKind, ElementRecord, ElementType, LayoutDescription, Rect, ShapeKind,
};

const DEFAULT_WIDTH: f32 = 100.0;
const DEFAULT_HEIGHT: f32 = 50.0;
const DEFAULT_TEXT: &str = "Text";
const DEFAULT_RECT_RADIUS: f32 = 4.0;

/// Severity of a render notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Informational; nothing was lost.
    Info,
    /// Part of the description was skipped or dropped.
    Warning,
}

/// A non-fatal problem found while rendering, for display to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Human-readable description.
    pub message: String,
}

impl Notice {
    fn info(message: String) -> Self {
        tracing::info!("{message}");
        Self {
            level: NoticeLevel::Info,
            message,
        }
    }

    fn warning(message: String) -> Self {
        tracing::warn!("{message}");
        Self {
            level: NoticeLevel::Warning,
            message,
        }
    }
}

/// Summary of a render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    /// Elements placed on the canvas.
    pub rendered: usize,
    /// Element descriptions skipped entirely.
    pub skipped: usize,
    /// Everything worth telling the user.
    pub notices: Vec<Notice>,
}

/// A validated layout, ready to materialize.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLayout {
    /// Canvas size and background.
    pub canvas: CanvasDescriptor,
    /// Records in description order.
    pub records: Vec<ElementRecord>,
    /// What happened during preparation.
    pub report: RenderReport,
}

/// Turns descriptions and snapshots into records and visuals.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer;

impl Renderer {
    /// Validate a layout description and replace the session with it.
    ///
    /// The selection is cleared. On error the session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Validation`] if the canvas size is missing or
    /// not a positive integer.
    pub fn render(session: &mut EditorSession, layout: &LayoutDescription) -> EditorResult<RenderReport> {
        let prepared = Self::prepare(layout, &session.config)?;
        session.selected = None;
        Self::materialize(session, prepared.canvas, &prepared.records)?;
        Ok(prepared.report)
    }

    /// Validate a layout description into records without touching any
    /// session.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Validation`] if the canvas size is missing or
    /// not a positive integer.
    pub fn prepare(layout: &LayoutDescription, config: &EditorConfig) -> EditorResult<PreparedLayout> {
        let mut report = RenderReport::default();
        let canvas = canvas_from(layout.canvas.as_ref(), &mut report)?;

        let Some(Value::Array(descriptions)) = &layout.elements else {
            report.notices.push(Notice::info(
                "Layout elements are missing or not a list; rendering an empty canvas".to_string(),
            ));
            return Ok(PreparedLayout {
                canvas,
                records: Vec::new(),
                report,
            });
        };

        let mut records: Vec<ElementRecord> = Vec::with_capacity(descriptions.len());
        for (index, value) in descriptions.iter().enumerate() {
            match record_from(value, index, config, &mut report.notices) {
                Some(record) if records.iter().any(|r| r.id == record.id) => {
                    report.notices.push(Notice::warning(format!(
                        "Skipping element {index}: duplicate id {}",
                        record.id
                    )));
                    report.skipped += 1;
                }
                Some(record) => records.push(record),
                None => report.skipped += 1,
            }
        }
        report.rendered = records.len();
        tracing::info!(
            "Prepared layout {}: {} elements, {} skipped",
            canvas.size_label(),
            report.rendered,
            report.skipped
        );
        Ok(PreparedLayout {
            canvas,
            records,
            report,
        })
    }

    /// Replace the store and visual tree with `records` and bind
    /// interaction on every visual.
    ///
    /// A selection that survives the replacement keeps its affordance and
    /// handles; otherwise it is cleared. Nothing is published.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::DuplicateId`] if two records share an id; the
    /// session is left untouched.
    pub fn materialize(
        session: &mut EditorSession,
        canvas: CanvasDescriptor,
        records: &[ElementRecord],
    ) -> EditorResult<()> {
        let store = CanvasElementStore::from_records(records.iter().cloned())?;
        let mut visuals = VisualTree::from_records(records);
        let bound = visuals.bind_all();

        session.canvas = canvas;
        session.store = store;
        session.visuals = visuals;
        if session.selected.as_ref().is_some_and(|id| !session.store.contains(id)) {
            session.selected = None;
        }
        session.visuals.set_selected(session.selected.as_ref());
        resize::sync_handles(session);

        tracing::debug!("Materialized {bound} elements on {}", canvas.size_label());
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn canvas_from(value: Option<&Value>, report: &mut RenderReport) -> EditorResult<CanvasDescriptor> {
    let invalid = || EditorError::Validation("Invalid or missing canvas dimensions".to_string());
    let canvas = value.and_then(Value::as_object).ok_or_else(invalid)?;
    let dimension = |key: &str| {
        canvas
            .get(key)
            .and_then(number_from_value)
            .map(f64::trunc)
            .filter(|n| *n >= 1.0 && *n <= f64::from(u32::MAX))
            .map(|n| n as u32)
    };
    let (Some(width), Some(height)) = (dimension("width"), dimension("height")) else {
        tracing::warn!("Rejected canvas description: {canvas:?}");
        return Err(invalid());
    };

    let mut descriptor = CanvasDescriptor::new(width, height);
    if let Some(raw) = canvas.get("backgroundColor").and_then(Value::as_str) {
        match Color::parse(raw) {
            Ok(color) => descriptor = descriptor.with_background(color),
            Err(err) => report
                .notices
                .push(Notice::warning(format!("Canvas background ignored: {err}"))),
        }
    }
    Ok(descriptor)
}

#[allow(clippy::cast_possible_truncation)]
fn record_from(value: &Value, index: usize, config: &EditorConfig, notices: &mut Vec<Notice>) -> Option<ElementRecord> {
    let desc = match ElementDescription::from_value(value) {
        Ok(desc) => desc,
        Err(err) => {
            notices.push(Notice::warning(format!("Skipping element {index}: {err}")));
            return None;
        }
    };
    let Some(id) = desc.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) else {
        notices.push(Notice::warning(format!("Skipping element {index}: missing id")));
        return None;
    };
    let Some(element_type) = desc.element_type.as_deref().and_then(ElementType::parse) else {
        notices.push(Notice::warning(format!(
            "Skipping element {id}: unknown element type {:?}",
            desc.element_type.as_deref().unwrap_or("")
        )));
        return None;
    };

    let positive = |v: Option<f64>| v.map(|v| v as f32).filter(|v| v.is_finite() && *v > 0.0);
    let geometry = Rect::new(
        desc.x.map_or(0.0, |v| v as f32),
        desc.y.map_or(0.0, |v| v as f32),
        positive(desc.width).unwrap_or(DEFAULT_WIDTH),
        positive(desc.height).unwrap_or(DEFAULT_HEIGHT),
    );

    let mut style = Style::new();
    if let Some(map) = desc.style_map() {
        let (parsed, rejected) = Style::from_json_map(map);
        for bad in rejected {
            notices.push(Notice::warning(format!(
                "Element {id}: dropped style {}: {}",
                bad.name, bad.error
            )));
        }
        style = parsed;
    }

    let kind = match element_type {
        ElementType::Text => {
            if !style.contains(StyleKey::FontFamily) {
                style.set(StyleProperty::FontFamily(config.default_font_family.clone()));
            }
            ElementKind::Text {
                content: desc.content.clone().unwrap_or_else(|| DEFAULT_TEXT.to_string()),
            }
        }
        ElementType::Shape => {
            let shape = desc.shape.as_deref().and_then(ShapeKind::parse).unwrap_or_default();
            if !style.contains(StyleKey::BorderRadius) {
                let radius = if shape.is_round() {
                    Length::percent(50.0)
                } else {
                    Length::px(DEFAULT_RECT_RADIUS)
                };
                style.set(StyleProperty::BorderRadius(radius));
            }
            ElementKind::Shape { shape }
        }
        ElementType::Image => {
            if !style.contains(StyleKey::ObjectFit) {
                style.set(StyleProperty::ObjectFit(ObjectFit::Cover));
            }
            ElementKind::Image {
                src: desc
                    .src
                    .clone()
                    .filter(|src| !src.trim().is_empty())
                    .unwrap_or_else(|| config.placeholder_image_url.clone()),
                alt: desc.alt.clone(),
            }
        }
    };

    let z_index = desc
        .z_index
        .or_else(|| desc.style_map().and_then(|s| s.get("zIndex")).and_then(number_from_value))
        .map_or_else(|| i32::try_from(index).unwrap_or(i32::MAX), |z| z.round() as i32);

    let mut record = ElementRecord::new(ElementId::new(id), kind, geometry)
        .with_z_index(z_index)
        .with_style(style);
    if let Some(names) = desc.editable_names() {
        record.editable = editable_from(&names, element_type);
    }
    Some(record)
}

fn editable_from(names: &[&str], element_type: ElementType) -> std::collections::BTreeSet<EditableProperty> {
    let mut props = std::collections::BTreeSet::new();
    for name in names {
        if *name == "style" {
            props.extend(
                element_type
                    .default_style_keys()
                    .iter()
                    .map(|key| EditableProperty::Style(*key)),
            );
        } else if let Some(prop) = EditableProperty::parse(name) {
            props.insert(prop);
        } else {
            tracing::debug!("Ignoring unknown editable property {name}");
        }
    }
    props.insert(EditableProperty::Position);
    props.insert(EditableProperty::Size);
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layout(value: &Value) -> LayoutDescription {
        serde_json::from_value(value.clone()).expect("layout")
    }

    fn render(value: &Value) -> (EditorSession, RenderReport) {
        let mut session = EditorSession::default();
        let report = Renderer::render(&mut session, &layout(value)).expect("render");
        (session, report)
    }

    #[test]
    fn renders_elements_into_store_and_bound_visuals() {
        let (session, report) = render(&json!({
            "canvas": {"width": 400, "height": 300, "backgroundColor": "#fafafa"},
            "elements": [
                {"id": "title", "type": "text", "x": 10, "y": 10, "width": 100, "height": 30, "content": "Hello"},
                {"id": "box", "type": "shape", "shape": "circle", "x": 50, "y": 50, "width": 80, "height": 80}
            ]
        }));
        assert_eq!(report.rendered, 2);
        assert_eq!(session.original_size(), (400, 300));
        assert_eq!(session.store.len(), 2);
        assert_eq!(session.visuals.len(), 2);
        assert!(session.visuals.iter().all(crate::visual::VisualElement::is_bound));
        let shape = session.store.get(&ElementId::new("box")).expect("shape");
        assert_eq!(
            shape.style.get(StyleKey::BorderRadius),
            Some(&StyleProperty::BorderRadius(Length::percent(50.0)))
        );
    }

    #[test]
    fn explicit_radius_survives_on_round_shapes() {
        let (session, _) = render(&json!({
            "canvas": {"width": 400, "height": 300},
            "elements": [
                {"id": "dot", "type": "shape", "shape": "circle", "style": {"borderRadius": "8px"}}
            ]
        }));
        let shape = session.store.get(&ElementId::new("dot")).expect("shape");
        assert_eq!(
            shape.style.get(StyleKey::BorderRadius),
            Some(&StyleProperty::BorderRadius(Length::px(8.0)))
        );
    }

    #[test]
    fn invalid_canvas_leaves_session_untouched() {
        let (mut session, _) = render(&json!({
            "canvas": {"width": 400, "height": 300},
            "elements": [{"id": "a", "type": "shape"}]
        }));
        for bad in [
            json!({"canvas": {"width": 0, "height": 300}, "elements": []}),
            json!({"canvas": {"width": "wide", "height": 300}}),
            json!({"elements": []}),
        ] {
            let result = Renderer::render(&mut session, &layout(&bad));
            assert!(matches!(result, Err(EditorError::Validation(_))));
        }
        assert_eq!(session.store.len(), 1);
    }

    #[test]
    fn missing_elements_render_empty_canvas() {
        let (session, report) = render(&json!({"canvas": {"width": 200, "height": 100}, "elements": "nope"}));
        assert!(session.store.is_empty());
        assert_eq!(report.notices[0].level, NoticeLevel::Info);
    }

    #[test]
    fn unknown_types_and_missing_ids_are_skipped() {
        let (session, report) = render(&json!({
            "canvas": {"width": 200, "height": 100},
            "elements": [
                {"id": "v", "type": "video"},
                {"type": "text"},
                {"id": "ok", "type": "text"},
                {"id": "ok", "type": "shape"},
                42
            ]
        }));
        assert_eq!(report.rendered, 1);
        assert_eq!(report.skipped, 4);
        assert!(report.notices.iter().all(|n| n.level == NoticeLevel::Warning));
        assert!(session.store.contains(&ElementId::new("ok")));
    }

    #[test]
    fn defaults_fill_missing_geometry_and_content() {
        let (session, _) = render(&json!({
            "canvas": {"width": 200, "height": 100},
            "elements": [
                {"id": "t", "type": "text", "width": -5},
                {"id": "i", "type": "image"}
            ]
        }));
        let text = session.store.get(&ElementId::new("t")).expect("text");
        assert!((text.geometry.width - DEFAULT_WIDTH).abs() < f32::EPSILON);
        assert!((text.geometry.height - DEFAULT_HEIGHT).abs() < f32::EPSILON);
        assert!(matches!(&text.kind, ElementKind::Text { content } if content == "Text"));
        assert!(text.style.contains(StyleKey::FontFamily));

        let image = session.store.get(&ElementId::new("i")).expect("image");
        assert!(matches!(&image.kind, ElementKind::Image { src, .. } if src.contains("placeholder")));
        assert_eq!(
            image.style.get(StyleKey::ObjectFit),
            Some(&StyleProperty::ObjectFit(ObjectFit::Cover))
        );
    }

    #[test]
    fn unknown_styles_ignored_and_bad_values_dropped() {
        let (session, report) = render(&json!({
            "canvas": {"width": 200, "height": 100},
            "elements": [{
                "id": "s", "type": "shape",
                "style": {"boxShadow": "0 0 2px", "backgroundColor": "#123456", "borderColor": "not-a-color"}
            }]
        }));
        let shape = session.store.get(&ElementId::new("s")).expect("shape");
        assert!(shape.style.contains(StyleKey::BackgroundColor));
        assert!(!shape.style.contains(StyleKey::BorderColor));
        assert_eq!(report.notices.len(), 1);
    }

    #[test]
    fn z_index_defaults_to_description_order() {
        let (session, _) = render(&json!({
            "canvas": {"width": 200, "height": 100},
            "elements": [
                {"id": "a", "type": "shape", "zIndex": 7},
                {"id": "b", "type": "shape", "style": {"zIndex": "3"}},
                {"id": "c", "type": "shape"}
            ]
        }));
        let z = |id: &str| session.store.get(&ElementId::new(id)).expect("record").z_index;
        assert_eq!((z("a"), z("b"), z("c")), (7, 3, 2));
    }

    #[test]
    fn editable_list_expands_style_and_adds_geometry() {
        let (session, _) = render(&json!({
            "canvas": {"width": 200, "height": 100},
            "elements": [{"id": "t", "type": "text", "editable": ["content", "style", "bogus"]}]
        }));
        let text = session.store.get(&ElementId::new("t")).expect("text");
        assert!(text.editable.contains(&EditableProperty::Content));
        assert!(text.editable.contains(&EditableProperty::Style(StyleKey::FontSize)));
        assert!(text.editable.contains(&EditableProperty::Position));
        assert!(text.editable.contains(&EditableProperty::Size));
        assert!(!text.editable.contains(&EditableProperty::Src));
    }

    #[test]
    fn render_replaces_previous_canvas() {
        let (mut session, _) = render(&json!({
            "canvas": {"width": 200, "height": 100},
            "elements": [{"id": "old", "type": "shape"}]
        }));
        session.selected = Some(ElementId::new("old"));
        Renderer::render(
            &mut session,
            &layout(&json!({"canvas": {"width": 300, "height": 300}, "elements": [{"id": "new", "type": "text"}]})),
        )
        .expect("render");
        assert!(!session.store.contains(&ElementId::new("old")));
        assert!(session.selected.is_none());
        assert_eq!(session.original_size(), (300, 300));
    }
}
