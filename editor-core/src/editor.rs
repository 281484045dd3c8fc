//! Top-level editor controller.
//!
//! [`Editor`] owns the session, the event bus, the gesture controllers and
//! the history, and routes host input to them. Commit points (gesture end,
//! text edit, property commit, add, delete, reorder) record a history
//! snapshot; live updates do not.

use crate::bus::{EditorEvent, EventBus};
use crate::drag::DragController;
use crate::event::{InputEvent, PointerEvent, PointerPhase};
use crate::history::HistoryManager;
use crate::renderer::{RenderReport, Renderer};
use crate::resize::{self, HandlePosition, ResizeController};
use crate::selection::SelectionController;
use crate::session::{EditorSession, GestureCommit};
use crate::style::{Color, FontWeight, Length, ObjectFit, Style, StyleProperty, TextAlign};
use crate::visual::VisualElement;
use crate::{
    CanvasDocument, CanvasElementStore, EditorConfig, EditorError, EditorResult, ElementId,
    ElementKind, ElementPatch, ElementRecord, GenerationRequest, LayoutDescription, Point, Rect,
    ShapeKind,
};

const NEW_TEXT_CONTENT: &str = "Double-click to edit text";
const NEW_IMAGE_ALT: &str = "Placeholder Image";
const NEW_ELEMENT_MARGIN: f32 = 20.0;

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// A resize handle of the selected element; a resize started.
    Handle(HandlePosition),
    /// An element body; it was selected and a drag started.
    Element(ElementId),
    /// Empty canvas; the selection was cleared.
    Background,
}

/// The editing core behind one canvas.
#[derive(Debug)]
pub struct Editor {
    session: EditorSession,
    bus: EventBus,
    drag: DragController,
    resize: ResizeController,
    history: HistoryManager,
    text_edit: Option<ElementId>,
    viewport_size: Option<(f32, f32)>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor with an empty canvas and record it as the first
    /// history state.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let history = HistoryManager::new(config.history_capacity);
        let mut editor = Self {
            session: EditorSession::new(config),
            bus: EventBus::new(),
            drag: DragController::new(),
            resize: ResizeController::new(),
            history,
            text_edit: None,
            viewport_size: None,
        };
        editor.record();
        editor
    }

    /// The event bus panels subscribe to.
    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The live session.
    #[must_use]
    pub const fn session(&self) -> &EditorSession {
        &self.session
    }

    /// The history.
    #[must_use]
    pub const fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// JSON view of the session.
    #[must_use]
    pub fn document(&self) -> CanvasDocument {
        self.session.document()
    }

    /// Record of an element, for property panels.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&ElementRecord> {
        self.session.store.get(id)
    }

    fn selection(&mut self) -> SelectionController<'_> {
        SelectionController::new(&mut self.session, &self.bus)
    }

    fn record(&mut self) {
        self.history.record_state(&self.session);
    }

    // ---------------------------------------------------------------------
    // Layout
    // ---------------------------------------------------------------------

    /// Replace the canvas with a layout description.
    ///
    /// Abandons any drag or resize in progress, clears the selection, fits
    /// the view when the viewport size is known and records a history
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Validation`] for an unusable canvas size; the
    /// current canvas is left untouched.
    pub fn load_layout(&mut self, layout: &LayoutDescription) -> EditorResult<RenderReport> {
        let prepared = Renderer::prepare(layout, &self.session.config)?;
        if self.drag.cancel(&mut self.session) || self.resize.cancel(&mut self.session) {
            tracing::info!("Gesture in progress abandoned by layout load");
        }
        let previous = self.session.selected.take();
        if let Err(err) = Renderer::materialize(&mut self.session, prepared.canvas, &prepared.records) {
            self.session.selected = previous;
            return Err(err);
        }
        self.text_edit = None;
        self.selection().after_restore(previous);
        if let Some((width, height)) = self.viewport_size {
            self.session
                .viewport
                .fit_to_view(width, height, &self.session.canvas);
        }
        self.record();
        tracing::info!(
            "Loaded layout {} with {} elements",
            self.session.canvas.size_label(),
            prepared.report.rendered
        );
        Ok(prepared.report)
    }

    /// Apply a generator response for `request`.
    ///
    /// The canvas size is forced to the requested size. A response that
    /// fails validation leaves the current canvas untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Validation`] for an invalid request or
    /// response.
    pub fn apply_generated(&mut self, request: &GenerationRequest, response: LayoutDescription) -> EditorResult<RenderReport> {
        request.validate()?;
        let layout = request.conform(response).map_err(|err| {
            tracing::warn!("Generation failed: {err}");
            err
        })?;
        self.load_layout(&layout)
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Select an element, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ElementNotFound`] for an unknown id.
    pub fn select(&mut self, id: Option<&ElementId>) -> EditorResult<()> {
        self.selection().select(id)
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selection().deselect();
    }

    /// Selected element id.
    #[must_use]
    pub const fn selected(&self) -> Option<&ElementId> {
        self.session.selected()
    }

    /// Delete the selected element and record a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] when nothing is selected.
    pub fn delete_selected(&mut self) -> EditorResult<ElementRecord> {
        let removed = self.selection().delete_selected()?;
        if self.text_edit.as_ref() == Some(&removed.id) {
            self.text_edit = None;
        }
        self.record();
        Ok(removed)
    }

    // ---------------------------------------------------------------------
    // Pointer input
    // ---------------------------------------------------------------------

    /// Route a host input event.
    ///
    /// # Errors
    ///
    /// Returns whatever the routed operation returns.
    pub fn handle_input(&mut self, event: &InputEvent) -> EditorResult<()> {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(*pointer),
            InputEvent::DoubleClick { x, y } => {
                let point = self.session.viewport.to_canvas(Point::new(*x, *y));
                let Some(id) = self.session.visuals.hit_test(point).cloned() else {
                    return Ok(());
                };
                if self.session.store.get(&id).is_some_and(|r| matches!(r.kind, ElementKind::Text { .. })) {
                    self.begin_text_edit(&id).map(|_| ())
                } else {
                    Ok(())
                }
            }
            InputEvent::Key(key) => {
                if key.is_delete() && self.session.selected.is_some() {
                    self.delete_selected().map(|_| ())
                } else {
                    Ok(())
                }
            }
        }
    }

    fn handle_pointer(&mut self, pointer: PointerEvent) -> EditorResult<()> {
        let position = pointer.position();
        match pointer.phase {
            PointerPhase::Down => self.pointer_down(position).map(|_| ()),
            PointerPhase::Move => {
                self.pointer_move(position);
                Ok(())
            }
            PointerPhase::Up => self.pointer_up(position).map(|_| ()),
        }
    }

    /// Pointer pressed at a display position.
    ///
    /// On a handle of the selected element this starts a resize; on an
    /// element it selects the element and starts a drag; on empty canvas it
    /// clears the selection.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Busy`] if a gesture is already in progress.
    pub fn pointer_down(&mut self, position: Point) -> EditorResult<PointerTarget> {
        if let Some(busy) = self.session.busy() {
            return Err(EditorError::Busy(format!("pointer down during {busy:?}")));
        }
        let point = self.session.viewport.to_canvas(position);
        let radius = self.session.config.handle_size / 2.0 / self.session.display_scale();

        if let Some(handle) = self.session.visuals.handle_at(point, radius) {
            self.resize.begin(&mut self.session, handle, position)?;
            return Ok(PointerTarget::Handle(handle));
        }
        if let Some(id) = self.session.visuals.hit_test(point).cloned() {
            if self.session.selected.as_ref() != Some(&id) {
                self.select(Some(&id))?;
            }
            self.drag.begin(&mut self.session, position)?;
            return Ok(PointerTarget::Element(id));
        }
        self.deselect();
        Ok(PointerTarget::Background)
    }

    /// Pointer moved to a display position. Returns the live geometry of
    /// the element under manipulation, if any.
    pub fn pointer_move(&mut self, position: Point) -> Option<Rect> {
        if self.resize.is_resizing() {
            return self.resize.update(&mut self.session, position);
        }
        self.drag.update(&mut self.session, position)?;
        self.session
            .selected
            .as_ref()
            .and_then(|id| self.session.visuals.get(id))
            .map(|visual| visual.geometry)
    }

    /// Pointer released at a display position. Commits any gesture in
    /// progress and records a snapshot.
    ///
    /// A gesture whose element disappeared mid-way commits nothing.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures other than a stale element.
    pub fn pointer_up(&mut self, position: Point) -> EditorResult<Option<GestureCommit>> {
        let finished = if self.resize.is_resizing() {
            self.resize.update(&mut self.session, position);
            self.resize.finish(&mut self.session, &self.bus)
        } else if self.drag.is_dragging() {
            self.drag.update(&mut self.session, position);
            self.drag.finish(&mut self.session, &self.bus)
        } else {
            Ok(None)
        };
        match finished {
            Ok(Some(commit)) => {
                self.record();
                Ok(Some(commit))
            }
            Ok(None) => Ok(None),
            Err(err) if err.is_not_found() => {
                tracing::debug!("Gesture ended on a stale element: {err}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Drag the selected element by a display-pixel delta, as one gesture.
    ///
    /// # Errors
    ///
    /// Returns an error if the drag cannot start.
    pub fn drag_selected_by(&mut self, dx: f32, dy: f32) -> EditorResult<Option<GestureCommit>> {
        let origin = self.selected_display_origin()?;
        self.drag.begin(&mut self.session, origin)?;
        let target = Point::new(origin.x + dx, origin.y + dy);
        self.drag.update(&mut self.session, target);
        self.pointer_up(target)
    }

    /// Resize the selected element through a handle by a display-pixel
    /// delta, as one gesture.
    ///
    /// # Errors
    ///
    /// Returns an error if the resize cannot start.
    pub fn resize_selected(&mut self, handle: HandlePosition, dx: f32, dy: f32) -> EditorResult<Option<GestureCommit>> {
        let origin = self.selected_display_origin()?;
        self.resize.begin(&mut self.session, handle, origin)?;
        let target = Point::new(origin.x + dx, origin.y + dy);
        self.resize.update(&mut self.session, target);
        self.pointer_up(target)
    }

    fn selected_display_origin(&self) -> EditorResult<Point> {
        let id = self
            .session
            .selected
            .as_ref()
            .ok_or_else(|| EditorError::InvalidOperation("nothing selected".to_string()))?;
        let record = self
            .session
            .store
            .get(id)
            .ok_or_else(|| EditorError::ElementNotFound(id.to_string()))?;
        let scale = self.session.display_scale();
        Ok(Point::new(record.geometry.x * scale, record.geometry.y * scale))
    }

    // ---------------------------------------------------------------------
    // Property editing
    // ---------------------------------------------------------------------

    /// Apply a live property change without recording history.
    ///
    /// Call [`commit_edit`](Self::commit_edit) at the commit boundary
    /// (blur, discrete choice) to record it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ElementNotFound`] or
    /// [`EditorError::Validation`] from the store.
    pub fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> EditorResult<()> {
        let record = self.session.store.update(id, patch)?.clone();
        self.session.visuals.sync_record(&record);
        resize::sync_handles(&mut self.session);
        self.bus.publish(&EditorEvent::ElementUpdated {
            element_id: id.clone(),
        });
        Ok(())
    }

    /// Record a snapshot after property edits.
    pub fn commit_edit(&mut self) {
        self.record();
    }

    /// Start in-place editing of a text element. Returns its content.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ElementNotFound`] for an unknown id or
    /// [`EditorError::InvalidOperation`] for a non-text element.
    pub fn begin_text_edit(&mut self, id: &ElementId) -> EditorResult<String> {
        let content = match self.session.store.get(id).map(|r| &r.kind) {
            Some(ElementKind::Text { content }) => content.clone(),
            Some(_) => {
                return Err(EditorError::InvalidOperation(format!("{id} is not a text element")));
            }
            None => return Err(EditorError::ElementNotFound(id.to_string())),
        };
        self.select(Some(id))?;
        self.text_edit = Some(id.clone());
        tracing::debug!("Editing text of {id}");
        Ok(content)
    }

    /// Element being edited in place, if any.
    #[must_use]
    pub const fn editing_text(&self) -> Option<&ElementId> {
        self.text_edit.as_ref()
    }

    /// Finish in-place editing, writing `content`. Returns whether the
    /// content changed; a change records a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] if no edit is in progress,
    /// or the store's error if the write is rejected. A rejected write
    /// leaves the edit open unless the element no longer exists.
    pub fn commit_text_edit(&mut self, content: &str) -> EditorResult<bool> {
        let Some(id) = self.text_edit.clone() else {
            return Err(EditorError::InvalidOperation("no text edit in progress".to_string()));
        };
        let unchanged = matches!(
            self.session.store.get(&id).map(|r| &r.kind),
            Some(ElementKind::Text { content: current }) if current == content
        );
        if unchanged {
            self.text_edit = None;
            return Ok(false);
        }
        if let Err(err) = self.update_element(&id, &ElementPatch::content(content)) {
            // A rejected write keeps the edit open unless the element is gone.
            if err.is_not_found() {
                self.text_edit = None;
            }
            return Err(err);
        }
        self.text_edit = None;
        self.record();
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // Adding elements
    // ---------------------------------------------------------------------

    /// Add a text element centered on the canvas and select it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the generated id collides.
    pub fn add_text(&mut self) -> EditorResult<ElementId> {
        let config = &self.session.config;
        let mut style = Style::new()
            .with(StyleProperty::FontSize(Length::px(18.0)))
            .with(StyleProperty::TextAlign(TextAlign::Center))
            .with(StyleProperty::FontWeight(FontWeight::Normal))
            .with(StyleProperty::FontFamily(config.default_font_family.clone()));
        if let Some(color) = parse_config_color(&config.default_text_color) {
            style.set(StyleProperty::Color(color));
        }
        self.add_element(
            ElementKind::Text {
                content: NEW_TEXT_CONTENT.to_string(),
            },
            (200.0, 50.0),
            style,
        )
    }

    /// Add a shape centered on the canvas and select it. The fill cycles
    /// through the configured palette.
    ///
    /// # Errors
    ///
    /// Returns an error only if the generated id collides.
    pub fn add_shape(&mut self, shape: ShapeKind) -> EditorResult<ElementId> {
        let palette = &self.session.config.shape_palette;
        let fill = (!palette.is_empty())
            .then(|| &palette[self.session.store.len() % palette.len()])
            .and_then(|color| parse_config_color(color));
        let radius = if shape.is_round() {
            Length::percent(50.0)
        } else {
            Length::px(4.0)
        };
        let mut style = Style::new().with(StyleProperty::BorderRadius(radius));
        if let Some(fill) = fill {
            style.set(StyleProperty::BackgroundColor(fill));
        }
        self.add_element(ElementKind::Shape { shape }, (100.0, 100.0), style)
    }

    /// Add a placeholder image centered on the canvas and select it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the generated id collides.
    pub fn add_image(&mut self) -> EditorResult<ElementId> {
        let config = &self.session.config;
        let mut style = Style::new()
            .with(StyleProperty::ObjectFit(ObjectFit::Cover))
            .with(StyleProperty::BorderWidth(Length::px(1.0)))
            .with(StyleProperty::BorderRadius(Length::px(4.0)));
        if let Some(color) = parse_config_color(&config.default_text_color) {
            style.set(StyleProperty::BorderColor(color));
        }
        let kind = ElementKind::Image {
            src: config.placeholder_image_url.clone(),
            alt: Some(NEW_IMAGE_ALT.to_string()),
        };
        self.add_element(kind, (150.0, 150.0), style)
    }

    fn add_element(&mut self, kind: ElementKind, (width, height): (f32, f32), style: Style) -> EditorResult<ElementId> {
        let id = ElementId::generate(kind.element_type().id_prefix());
        #[allow(clippy::cast_precision_loss)]
        let (canvas_w, canvas_h) = (self.session.canvas.width as f32, self.session.canvas.height as f32);
        let geometry = Rect::new(
            (canvas_w / 2.0 - width / 2.0).max(NEW_ELEMENT_MARGIN).round(),
            (canvas_h / 2.0 - height / 2.0).max(NEW_ELEMENT_MARGIN).round(),
            width,
            height,
        );
        let z_index = self.session.store.max_z().map_or(1, |z| z.saturating_add(1));
        let record = ElementRecord::new(id.clone(), kind, geometry)
            .with_z_index(z_index)
            .with_style(style);

        let mut visual = VisualElement::from_record(&record);
        visual.bind();
        self.session.store.add(record)?;
        self.session.visuals.insert(visual);
        tracing::info!("Added element {id}");

        self.select(Some(&id))?;
        self.record();
        Ok(id)
    }

    // ---------------------------------------------------------------------
    // Stacking order
    // ---------------------------------------------------------------------

    /// Whether the selected element can move further up.
    #[must_use]
    pub fn can_bring_to_front(&self) -> bool {
        self.selected_z_and(CanvasElementStore::max_z_excluding)
            .is_some_and(|(z, other)| z <= other)
    }

    /// Whether the selected element can move further down.
    #[must_use]
    pub fn can_send_to_back(&self) -> bool {
        self.selected_z_and(CanvasElementStore::min_z_excluding)
            .is_some_and(|(z, other)| z >= other)
    }

    fn selected_z_and(
        &self,
        other: fn(&CanvasElementStore, &ElementId) -> Option<i32>,
    ) -> Option<(i32, i32)> {
        let id = self.session.selected.as_ref()?;
        let z = self.session.store.get(id)?.z_index;
        Some((z, other(&self.session.store, id)?))
    }

    /// Raise the selected element above every other element. Returns
    /// `false` if it already was.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] when nothing is selected.
    pub fn bring_to_front(&mut self) -> EditorResult<bool> {
        if !self.can_bring_to_front() {
            return self.require_selection().map(|()| false);
        }
        let target = self
            .selected_z_and(CanvasElementStore::max_z_excluding)
            .map_or(0, |(_, max)| max.saturating_add(1));
        self.set_selected_z(target)
    }

    /// Lower the selected element below every other element. Returns
    /// `false` if it already was.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] when nothing is selected.
    pub fn send_to_back(&mut self) -> EditorResult<bool> {
        if !self.can_send_to_back() {
            return self.require_selection().map(|()| false);
        }
        let target = self
            .selected_z_and(CanvasElementStore::min_z_excluding)
            .map_or(0, |(_, min)| min.saturating_sub(1));
        self.set_selected_z(target)
    }

    fn require_selection(&self) -> EditorResult<()> {
        match self.session.selected {
            Some(_) => Ok(()),
            None => Err(EditorError::InvalidOperation("nothing selected".to_string())),
        }
    }

    fn set_selected_z(&mut self, z_index: i32) -> EditorResult<bool> {
        let id = self
            .session
            .selected
            .clone()
            .ok_or_else(|| EditorError::InvalidOperation("nothing selected".to_string()))?;
        self.update_element(&id, &ElementPatch::z_index(z_index))?;
        tracing::debug!("Moved {id} to z-index {z_index}");
        self.record();
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    /// Undo the last commit. Returns `false` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Busy`] during a gesture.
    pub fn undo(&mut self) -> EditorResult<bool> {
        self.restore_with(HistoryManager::undo)
    }

    /// Redo the last undone commit. Returns `false` when there is nothing
    /// to redo.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Busy`] during a gesture.
    pub fn redo(&mut self) -> EditorResult<bool> {
        self.restore_with(HistoryManager::redo)
    }

    fn restore_with(
        &mut self,
        step: fn(&mut HistoryManager, &mut EditorSession, &EventBus) -> EditorResult<bool>,
    ) -> EditorResult<bool> {
        if let Some(busy) = self.session.busy() {
            return Err(EditorError::Busy(format!("history restore during {busy:?}")));
        }
        let previous = self.session.selected.clone();
        if !step(&mut self.history, &mut self.session, &self.bus)? {
            return Ok(false);
        }
        if self
            .text_edit
            .as_ref()
            .is_some_and(|id| !self.session.store.contains(id))
        {
            self.text_edit = None;
        }
        self.selection().after_restore(previous);
        Ok(true)
    }

    /// Whether undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Forget all history; the current canvas becomes the only state.
    pub fn clear_history(&mut self) {
        self.history.clear(&self.session);
    }

    // ---------------------------------------------------------------------
    // Viewport
    // ---------------------------------------------------------------------

    /// Set the zoom factor (clamped and snapped). Returns the applied
    /// scale.
    pub fn set_zoom(&mut self, factor: f32) -> f32 {
        self.session.viewport.set_zoom(factor)
    }

    /// Zoom in one step.
    pub fn zoom_in(&mut self) -> f32 {
        self.session.viewport.zoom_in()
    }

    /// Zoom out one step.
    pub fn zoom_out(&mut self) -> f32 {
        self.session.viewport.zoom_out()
    }

    /// Fit the canvas into an available area and remember the area for
    /// later layout loads.
    pub fn fit_to_view(&mut self, available_width: f32, available_height: f32) -> f32 {
        self.viewport_size = Some((available_width, available_height));
        self.session
            .viewport
            .fit_to_view(available_width, available_height, &self.session.canvas)
    }

    /// Zoom label, e.g. `100%`.
    #[must_use]
    pub fn zoom_label(&self) -> String {
        self.session.viewport.zoom_label()
    }

    /// Canvas size label, e.g. `400 × 300`.
    #[must_use]
    pub fn size_label(&self) -> String {
        self.session.canvas.size_label()
    }

    // ---------------------------------------------------------------------
    // Export
    // ---------------------------------------------------------------------

    /// Run `export` against the session at scale 1.0 with resize handles
    /// hidden. Display state is restored afterwards even if `export`
    /// fails or panics.
    pub fn with_export_mode<T>(&mut self, export: impl FnOnce(&EditorSession) -> T) -> T {
        let guard = ExportGuard::enter(&mut self.session);
        let result = export(&*guard.session);
        drop(guard);
        result
    }
}

/// Puts the session in export mode and restores it on drop.
struct ExportGuard<'a> {
    session: &'a mut EditorSession,
    scale: f32,
    handles_hidden: bool,
}

impl<'a> ExportGuard<'a> {
    fn enter(session: &'a mut EditorSession) -> Self {
        let scale = session.viewport.reset();
        let handles_hidden = session.visuals.handles_hidden();
        session.visuals.set_handles_hidden(true);
        tracing::debug!("Entering export mode (display scale was {scale})");
        Self {
            session,
            scale,
            handles_hidden,
        }
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.session.viewport.restore(self.scale);
        self.session.visuals.set_handles_hidden(self.handles_hidden);
        tracing::debug!("Left export mode");
    }
}

fn parse_config_color(value: &str) -> Option<Color> {
    Color::parse(value)
        .map_err(|err| tracing::warn!("Ignoring configured color: {err}"))
        .ok()
}
