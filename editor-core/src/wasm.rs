//! WebAssembly bindings for editor-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! Structured values cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::bus::{handler, EditorEvent, EventKind};
use crate::{
    Editor, EditorConfig, EditorError, ElementId, ElementPatch, GenerationRequest, HandlePosition,
    InputEvent, LayoutDescription, Point, ShapeKind,
};

/// Initialize the editor WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
    web_sys::console::debug_1(&JsValue::from_str(&format!("editor-core {}", crate::VERSION)));
}

fn to_js(err: &EditorError) -> String {
    err.to_string()
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = queueMicrotask)]
    fn queue_microtask(callback: &js_sys::Function);
}

fn event_payload(event: &EditorEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor with the default configuration.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            editor: Editor::default(),
        }
    }

    /// Create an editor from a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error string if the configuration does not parse.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<WasmEditor, String> {
        let config = EditorConfig::from_json(json).map_err(|e| e.to_string())?;
        Ok(Self {
            editor: Editor::new(config),
        })
    }

    /// Subscribe a JavaScript callback to an event by name. The callback
    /// receives the event as JSON text.
    ///
    /// Callbacks run from a microtask after the publishing call has
    /// returned, so they may call back into this editor.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown event name.
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, name: &str, callback: js_sys::Function) -> Result<(), String> {
        let kind = EventKind::from_name(name).ok_or_else(|| format!("Unknown event: {name}"))?;
        let subscriber = handler(move |event| {
            let payload = JsValue::from_str(&event_payload(event)?);
            let callback = callback.clone();
            let deliver = Closure::once_into_js(move || {
                if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
                    tracing::warn!("Event callback failed: {err:?}");
                }
            });
            queue_microtask(deliver.unchecked_ref());
            Ok(())
        });
        self.editor.bus().subscribe(kind, &subscriber);
        Ok(())
    }

    /// Render a layout description. Returns the render report as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the JSON does not parse or the canvas is
    /// invalid.
    #[wasm_bindgen(js_name = loadLayout)]
    pub fn load_layout(&mut self, json: &str) -> Result<String, String> {
        let layout = LayoutDescription::from_json(json).map_err(|e| to_js(&e))?;
        let report = self.editor.load_layout(&layout).map_err(|e| to_js(&e))?;
        serde_json::to_string(&report).map_err(|e| e.to_string())
    }

    /// Structured prompt for the external generator.
    ///
    /// # Errors
    ///
    /// Returns an error string for an empty prompt or zero size.
    #[wasm_bindgen(js_name = generationPrompt)]
    pub fn generation_prompt(prompt: &str, width: u32, height: u32) -> Result<String, String> {
        let request = GenerationRequest::new(prompt, width, height);
        request.validate().map_err(|e| to_js(&e))?;
        Ok(request.structured_prompt())
    }

    /// Apply a generator response for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error string if the response is unusable.
    #[wasm_bindgen(js_name = applyGenerated)]
    pub fn apply_generated(&mut self, prompt: &str, width: u32, height: u32, json: &str) -> Result<String, String> {
        let request = GenerationRequest::new(prompt, width, height);
        let layout = LayoutDescription::from_json(json).map_err(|e| to_js(&e))?;
        let report = self
            .editor
            .apply_generated(&request, layout)
            .map_err(|e| to_js(&e))?;
        serde_json::to_string(&report).map_err(|e| e.to_string())
    }

    /// Route a host input event given as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the event does not parse or the routed
    /// operation fails.
    #[wasm_bindgen(js_name = handleInput)]
    pub fn handle_input(&mut self, json: &str) -> Result<(), String> {
        let event: InputEvent = serde_json::from_str(json).map_err(|e| e.to_string())?;
        self.editor.handle_input(&event).map_err(|e| to_js(&e))
    }

    /// Pointer pressed. Returns `"handle:<pos>"`, `"element:<id>"` or
    /// `"background"`.
    ///
    /// # Errors
    ///
    /// Returns an error string while another gesture is active.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<String, String> {
        let target = self
            .editor
            .pointer_down(Point::new(x, y))
            .map_err(|e| to_js(&e))?;
        Ok(match target {
            crate::PointerTarget::Handle(handle) => format!("handle:{handle}"),
            crate::PointerTarget::Element(id) => format!("element:{id}"),
            crate::PointerTarget::Background => "background".to_string(),
        })
    }

    /// Pointer moved.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.editor.pointer_move(Point::new(x, y));
    }

    /// Pointer released. Returns whether a change was committed.
    ///
    /// # Errors
    ///
    /// Returns an error string if the commit fails.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32) -> Result<bool, String> {
        self.editor
            .pointer_up(Point::new(x, y))
            .map(|commit| commit.is_some())
            .map_err(|e| to_js(&e))
    }

    /// Select an element, or clear the selection with `undefined`.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown id.
    #[wasm_bindgen(js_name = selectElement)]
    pub fn select_element(&mut self, id: Option<String>) -> Result<(), String> {
        let id = id.map(ElementId::new);
        self.editor.select(id.as_ref()).map_err(|e| to_js(&e))
    }

    /// Delete the selected element.
    ///
    /// # Errors
    ///
    /// Returns an error string when nothing is selected.
    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> Result<(), String> {
        self.editor.delete_selected().map(|_| ()).map_err(|e| to_js(&e))
    }

    /// Apply a live property patch (JSON) to an element.
    ///
    /// # Errors
    ///
    /// Returns an error string if the patch does not parse or apply.
    #[wasm_bindgen(js_name = updateElement)]
    pub fn update_element(&mut self, id: &str, patch_json: &str) -> Result<(), String> {
        let patch: ElementPatch = serde_json::from_str(patch_json).map_err(|e| e.to_string())?;
        self.editor
            .update_element(&ElementId::new(id), &patch)
            .map_err(|e| to_js(&e))
    }

    /// Record a history snapshot after property edits.
    #[wasm_bindgen(js_name = commitEdit)]
    pub fn commit_edit(&mut self) {
        self.editor.commit_edit();
    }

    /// Start in-place text editing. Returns the current content.
    ///
    /// # Errors
    ///
    /// Returns an error string for a missing or non-text element.
    #[wasm_bindgen(js_name = beginTextEdit)]
    pub fn begin_text_edit(&mut self, id: &str) -> Result<String, String> {
        self.editor
            .begin_text_edit(&ElementId::new(id))
            .map_err(|e| to_js(&e))
    }

    /// Finish in-place text editing.
    ///
    /// # Errors
    ///
    /// Returns an error string if no edit is in progress.
    #[wasm_bindgen(js_name = commitTextEdit)]
    pub fn commit_text_edit(&mut self, content: &str) -> Result<bool, String> {
        self.editor.commit_text_edit(content).map_err(|e| to_js(&e))
    }

    /// Add a text element. Returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element cannot be added.
    #[wasm_bindgen(js_name = addText)]
    pub fn add_text(&mut self) -> Result<String, String> {
        self.editor
            .add_text()
            .map(|id| id.to_string())
            .map_err(|e| to_js(&e))
    }

    /// Add a shape (`rectangle`, `circle`, ...). Returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown shape.
    #[wasm_bindgen(js_name = addShape)]
    pub fn add_shape(&mut self, shape: &str) -> Result<String, String> {
        let shape = ShapeKind::parse(shape).ok_or_else(|| format!("Unknown shape: {shape}"))?;
        self.editor
            .add_shape(shape)
            .map(|id| id.to_string())
            .map_err(|e| to_js(&e))
    }

    /// Add a placeholder image. Returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element cannot be added.
    #[wasm_bindgen(js_name = addImage)]
    pub fn add_image(&mut self) -> Result<String, String> {
        self.editor
            .add_image()
            .map(|id| id.to_string())
            .map_err(|e| to_js(&e))
    }

    /// Raise the selected element to the top.
    ///
    /// # Errors
    ///
    /// Returns an error string when nothing is selected.
    #[wasm_bindgen(js_name = bringToFront)]
    pub fn bring_to_front(&mut self) -> Result<bool, String> {
        self.editor.bring_to_front().map_err(|e| to_js(&e))
    }

    /// Lower the selected element to the bottom.
    ///
    /// # Errors
    ///
    /// Returns an error string when nothing is selected.
    #[wasm_bindgen(js_name = sendToBack)]
    pub fn send_to_back(&mut self) -> Result<bool, String> {
        self.editor.send_to_back().map_err(|e| to_js(&e))
    }

    /// Undo the last commit.
    ///
    /// # Errors
    ///
    /// Returns an error string during a gesture.
    pub fn undo(&mut self) -> Result<bool, String> {
        self.editor.undo().map_err(|e| to_js(&e))
    }

    /// Redo the last undone commit.
    ///
    /// # Errors
    ///
    /// Returns an error string during a gesture.
    pub fn redo(&mut self) -> Result<bool, String> {
        self.editor.redo().map_err(|e| to_js(&e))
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Set the zoom factor. Returns the applied scale.
    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, factor: f32) -> f32 {
        self.editor.set_zoom(factor)
    }

    /// Zoom in one step.
    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> f32 {
        self.editor.zoom_in()
    }

    /// Zoom out one step.
    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> f32 {
        self.editor.zoom_out()
    }

    /// Fit the canvas into the available area.
    #[wasm_bindgen(js_name = fitToView)]
    pub fn fit_to_view(&mut self, width: f32, height: f32) -> f32 {
        self.editor.fit_to_view(width, height)
    }

    /// Zoom label, e.g. `100%`.
    #[wasm_bindgen(js_name = zoomLabel)]
    #[must_use]
    pub fn zoom_label(&self) -> String {
        self.editor.zoom_label()
    }

    /// Resize handle positions of the selection as JSON.
    #[wasm_bindgen(js_name = getHandlesJson)]
    #[must_use]
    pub fn get_handles_json(&self) -> String {
        serde_json::to_string(self.editor.session().visuals().handles()).unwrap_or_default()
    }

    /// The session as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = getDocumentJson)]
    pub fn get_document_json(&self) -> Result<String, String> {
        self.editor.document().to_json().map_err(|e| to_js(&e))
    }

    /// The session as JSON, captured at scale 1.0 with handles hidden.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&mut self) -> Result<String, String> {
        self.editor
            .with_export_mode(|session| session.document().to_json())
            .map_err(|e| to_js(&e))
    }

    /// Whether a handle name is valid (`nw`, `se`, ...).
    #[wasm_bindgen(js_name = isHandleName)]
    #[must_use]
    pub fn is_handle_name(name: &str) -> bool {
        HandlePosition::parse(name).is_some()
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"{"canvas":{"width":400,"height":300},"elements":[{"id":"a","type":"shape","x":10,"y":10,"width":50,"height":50}]}"#;

    #[test]
    fn event_payload_is_tagged_json() {
        let event = EditorEvent::ElementSelected {
            current: Some(ElementId::new("a")),
            previous: None,
        };
        let payload = event_payload(&event).expect("payload");
        let value: serde_json::Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(value["event"], "elementSelected");
        assert_eq!(value["current"], "a");
        assert!(value["previous"].is_null());
    }

    #[test]
    fn load_layout_returns_report() {
        let mut editor = WasmEditor::new();
        let report = editor.load_layout(LAYOUT).expect("load");
        assert!(report.contains("\"rendered\":1"));
        let doc = editor.get_document_json().expect("doc");
        assert!(doc.contains("\"width\": 400"));
    }

    #[test]
    fn load_layout_rejects_bad_json() {
        let mut editor = WasmEditor::new();
        assert!(editor.load_layout("{ not json }").is_err());
    }

    #[test]
    fn pointer_down_reports_target() {
        let mut editor = WasmEditor::new();
        editor.load_layout(LAYOUT).expect("load");
        assert_eq!(editor.pointer_down(20.0, 20.0).expect("down"), "element:a");
        assert!(editor.pointer_up(30.0, 20.0).expect("up"));
        assert_eq!(editor.pointer_down(300.0, 250.0).expect("down"), "background");
    }

    #[test]
    fn update_element_accepts_json_patch() {
        let mut editor = WasmEditor::new();
        editor.load_layout(LAYOUT).expect("load");
        editor.update_element("a", r#"{"x": 42, "zIndex": 7}"#).expect("patch");
        let doc = editor.get_document_json().expect("doc");
        assert!(doc.contains("\"zIndex\": 7"));
    }

    #[test]
    fn add_shape_rejects_unknown_kind() {
        let mut editor = WasmEditor::new();
        assert!(editor.add_shape("hexagon").is_err());
        assert!(editor.add_shape("circle").expect("circle").starts_with("shape-"));
    }
}
