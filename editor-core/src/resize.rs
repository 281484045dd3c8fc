//! Handle-driven resizing of the selected element.
//!
//! Eight handles sit on the selected element's bounding box. Each one
//! controls the edges named by its compass position. Width and height never
//! drop below the configured minimum; when a west or north edge hits the
//! minimum, the element's origin is adjusted so the opposite edge stays put.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bus::{EditorEvent, EventBus};
use crate::session::{EditorSession, GestureCommit, Interaction};
use crate::{EditorError, EditorResult, ElementId, ElementPatch, Point, Rect};

/// Compass position of a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlePosition {
    /// Top-left corner.
    Nw,
    /// Top edge midpoint.
    N,
    /// Top-right corner.
    Ne,
    /// Right edge midpoint.
    E,
    /// Bottom-right corner.
    Se,
    /// Bottom edge midpoint.
    S,
    /// Bottom-left corner.
    Sw,
    /// Left edge midpoint.
    W,
}

/// Which side of an axis a handle controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    /// Left or top edge; moves the origin.
    Near,
    /// Axis not controlled.
    None,
    /// Right or bottom edge.
    Far,
}

impl HandlePosition {
    /// All handles, clockwise from the top-left corner.
    pub const ALL: [Self; 8] = [
        Self::Nw,
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
    ];

    /// Lowercase compass name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nw => "nw",
            Self::N => "n",
            Self::Ne => "ne",
            Self::E => "e",
            Self::Se => "se",
            Self::S => "s",
            Self::Sw => "sw",
            Self::W => "w",
        }
    }

    /// Parse a compass name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    const fn horizontal(self) -> Side {
        match self {
            Self::Nw | Self::W | Self::Sw => Side::Near,
            Self::N | Self::S => Side::None,
            Self::Ne | Self::E | Self::Se => Side::Far,
        }
    }

    const fn vertical(self) -> Side {
        match self {
            Self::Nw | Self::N | Self::Ne => Side::Near,
            Self::W | Self::E => Side::None,
            Self::Sw | Self::S | Self::Se => Side::Far,
        }
    }

    /// Where this handle sits on a bounding box.
    #[must_use]
    pub fn anchor(self, rect: Rect) -> Point {
        let along = |side: Side, start: f32, len: f32| match side {
            Side::Near => start,
            Side::None => start + len / 2.0,
            Side::Far => start + len,
        };
        Point::new(
            along(self.horizontal(), rect.x, rect.width),
            along(self.vertical(), rect.y, rect.height),
        )
    }
}

impl fmt::Display for HandlePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A handle placed on the selected element, in unscaled canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResizeHandle {
    /// Compass position.
    pub position: HandlePosition,
    /// Handle center.
    pub center: Point,
}

/// The eight handles for a bounding box.
#[must_use]
pub fn handles_for(rect: Rect) -> Vec<ResizeHandle> {
    HandlePosition::ALL
        .into_iter()
        .map(|position| ResizeHandle {
            position,
            center: position.anchor(rect),
        })
        .collect()
}

/// Recreate handles around the selected element's live geometry, or
/// destroy them when nothing is selected.
pub fn sync_handles(session: &mut EditorSession) {
    let geometry = session
        .selected
        .as_ref()
        .and_then(|id| session.visuals.get(id))
        .map(|visual| visual.geometry);
    match geometry {
        Some(rect) => session.visuals.set_handles(handles_for(rect)),
        None => session.visuals.clear_handles(),
    }
}

/// Apply a pointer delta (unscaled) to `original` through `handle`.
///
/// Sizes are clamped to `min_size`. A near edge that hits the minimum
/// stops there while the far edge stays fixed.
#[must_use]
pub fn resize_rect(original: Rect, handle: HandlePosition, dx: f32, dy: f32, min_size: f32) -> Rect {
    let (x, width) = resize_axis(handle.horizontal(), original.x, original.width, dx, min_size);
    let (y, height) = resize_axis(handle.vertical(), original.y, original.height, dy, min_size);
    Rect::new(x, y, width, height)
}

fn resize_axis(side: Side, start: f32, len: f32, delta: f32, min_size: f32) -> (f32, f32) {
    match side {
        Side::None => (start, len),
        Side::Far => (start, (len + delta).max(min_size)),
        Side::Near => {
            let new_len = (len - delta).max(min_size);
            (start + (len - new_len), new_len)
        }
    }
}

/// An in-progress resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeGesture {
    /// Element being resized.
    pub element_id: ElementId,
    /// Handle being dragged.
    pub handle: HandlePosition,
    /// Pointer position at pointer-down, in display pixels.
    pub pointer_origin: Point,
    /// Geometry at pointer-down.
    pub original: Rect,
    /// Live geometry, ahead of the store.
    pub working: Rect,
}

/// Resize state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResizeState {
    /// No resize in progress.
    #[default]
    Idle,
    /// Resizing through a handle.
    Resizing(ResizeGesture),
}

/// Resizes the selected element through its handles.
#[derive(Debug, Default)]
pub struct ResizeController {
    state: ResizeState,
}

impl ResizeController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ResizeState {
        &self.state
    }

    /// Whether a resize is in progress.
    #[must_use]
    pub const fn is_resizing(&self) -> bool {
        matches!(self.state, ResizeState::Resizing(_))
    }

    /// Start resizing the selected element.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] if nothing is selected,
    /// [`EditorError::ElementNotFound`] if the selection has no record, or
    /// [`EditorError::Busy`] if another gesture is running.
    pub fn begin(&mut self, session: &mut EditorSession, handle: HandlePosition, pointer: Point) -> EditorResult<()> {
        let Some(id) = session.selected.clone() else {
            return Err(EditorError::InvalidOperation(
                "only the selected element can be resized".to_string(),
            ));
        };
        let original = session
            .store
            .get(&id)
            .map(|record| record.geometry)
            .ok_or_else(|| EditorError::ElementNotFound(id.to_string()))?;
        session.acquire(Interaction::Resizing)?;

        tracing::debug!("Resize start {id} via {handle}");
        self.state = ResizeState::Resizing(ResizeGesture {
            element_id: id,
            handle,
            pointer_origin: pointer,
            original,
            working: original,
        });
        Ok(())
    }

    /// Follow the pointer. Returns the live geometry, or `None` when idle.
    pub fn update(&mut self, session: &mut EditorSession, pointer: Point) -> Option<Rect> {
        let ResizeState::Resizing(gesture) = &mut self.state else {
            return None;
        };
        let (dx, dy) = session.viewport.delta_to_canvas(
            pointer.x - gesture.pointer_origin.x,
            pointer.y - gesture.pointer_origin.y,
        );
        let min_size = session.config.min_element_size;
        let rect = resize_rect(gesture.original, gesture.handle, dx, dy, min_size);
        gesture.working = round_edges(rect, min_size);

        if session.visuals.set_geometry(&gesture.element_id, gesture.working) {
            sync_handles(session);
        } else {
            tracing::debug!("Resize target {} has no visual", gesture.element_id);
        }
        Some(gesture.working)
    }

    /// Abandon the resize without touching the store. The visual snaps
    /// back to the stored geometry if the element still exists. Returns
    /// whether a resize was in progress.
    pub fn cancel(&mut self, session: &mut EditorSession) -> bool {
        let ResizeState::Resizing(gesture) = std::mem::take(&mut self.state) else {
            return false;
        };
        session.release();
        if let Some(geometry) = session.store.get(&gesture.element_id).map(|r| r.geometry) {
            session.visuals.set_geometry(&gesture.element_id, geometry);
            sync_handles(session);
        }
        tracing::debug!("Resize cancelled for {}", gesture.element_id);
        true
    }

    /// End the resize and write the final geometry to the store.
    ///
    /// Returns `Ok(None)` when no resize was in progress.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ElementNotFound`] if the element was removed
    /// mid-resize; nothing is committed in that case.
    pub fn finish(&mut self, session: &mut EditorSession, bus: &EventBus) -> EditorResult<Option<GestureCommit>> {
        let ResizeState::Resizing(gesture) = std::mem::take(&mut self.state) else {
            return Ok(None);
        };
        session.release();

        let patch = ElementPatch::geometry(gesture.working);
        let committed = match session.store.update(&gesture.element_id, &patch) {
            Ok(record) => record.geometry,
            Err(err) => {
                tracing::warn!("Resize commit skipped: {err}");
                return Err(err);
            }
        };
        session.visuals.set_geometry(&gesture.element_id, committed);
        sync_handles(session);
        tracing::debug!(
            "Resize end {}: {}x{} at ({}, {})",
            gesture.element_id,
            committed.width,
            committed.height,
            committed.x,
            committed.y
        );
        bus.publish(&EditorEvent::ElementUpdated {
            element_id: gesture.element_id.clone(),
        });
        Ok(Some(GestureCommit {
            element_id: gesture.element_id,
            interaction: Interaction::Resizing,
            geometry: committed,
        }))
    }
}

/// Snap every edge to a whole unit. Width and height are derived from the
/// rounded edges so an edge that did not move stays exactly where it was.
fn round_edges(rect: Rect, min_size: f32) -> Rect {
    let left = rect.x.round();
    let top = rect.y.round();
    let right = rect.right().round();
    let bottom = rect.bottom().round();
    Rect::new(left, top, (right - left).max(min_size), (bottom - top).max(min_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::VisualElement;
    use crate::{ElementKind, ElementRecord, ShapeKind};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn session_with_selected(rect: Rect) -> EditorSession {
        let mut session = EditorSession::default();
        let record = ElementRecord::new(
            ElementId::new("s"),
            ElementKind::Shape {
                shape: ShapeKind::Rectangle,
            },
            rect,
        );
        let mut visual = VisualElement::from_record(&record);
        visual.bind();
        session.visuals.insert(visual);
        session.store.add(record).expect("add");
        session.selected = Some(ElementId::new("s"));
        sync_handles(&mut session);
        session
    }

    #[test]
    fn east_handle_grows_width_only() {
        let rect = resize_rect(Rect::new(10.0, 10.0, 100.0, 50.0), HandlePosition::E, 30.0, 99.0, 20.0);
        assert!(approx(rect.width, 130.0));
        assert!(approx(rect.height, 50.0));
        assert!(approx(rect.x, 10.0));
    }

    #[test]
    fn west_handle_keeps_right_edge_fixed_at_minimum() {
        let original = Rect::new(100.0, 0.0, 80.0, 40.0);
        let rect = resize_rect(original, HandlePosition::W, 500.0, 0.0, 20.0);
        assert!(approx(rect.width, 20.0));
        assert!(approx(rect.right(), original.right()));
    }

    #[test]
    fn north_west_moves_origin_and_shrinks() {
        let original = Rect::new(0.0, 0.0, 100.0, 100.0);
        let rect = resize_rect(original, HandlePosition::Nw, 10.0, 20.0, 20.0);
        assert!(approx(rect.x, 10.0) && approx(rect.y, 20.0));
        assert!(approx(rect.width, 90.0) && approx(rect.height, 80.0));
        assert!(approx(rect.bottom(), 100.0));
    }

    #[test]
    fn resize_never_goes_below_minimum() {
        let original = Rect::new(0.0, 0.0, 60.0, 60.0);
        for handle in HandlePosition::ALL {
            for delta in [-1000.0, -60.0, 0.0, 60.0, 1000.0] {
                let rect = resize_rect(original, handle, delta, delta, 20.0);
                assert!(rect.width >= 20.0, "{handle} width {}", rect.width);
                assert!(rect.height >= 20.0, "{handle} height {}", rect.height);
            }
        }
    }

    #[test]
    fn handles_track_live_geometry() {
        let mut session = session_with_selected(Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut resize = ResizeController::new();
        resize
            .begin(&mut session, HandlePosition::Se, Point::new(100.0, 100.0))
            .expect("begin");
        resize.update(&mut session, Point::new(150.0, 120.0));
        let se = session
            .visuals
            .handles()
            .iter()
            .find(|h| h.position == HandlePosition::Se)
            .expect("se handle");
        assert!(approx(se.center.x, 150.0) && approx(se.center.y, 120.0));
        let stored = session.store.get(&ElementId::new("s")).expect("record");
        assert!(approx(stored.geometry.width, 100.0));
    }

    #[test]
    fn commit_writes_store_and_releases() {
        let mut session = session_with_selected(Rect::new(0.0, 0.0, 100.0, 100.0));
        let bus = EventBus::new();
        let mut resize = ResizeController::new();
        resize
            .begin(&mut session, HandlePosition::S, Point::new(50.0, 100.0))
            .expect("begin");
        resize.update(&mut session, Point::new(50.0, -400.0));
        let commit = resize.finish(&mut session, &bus).expect("finish").expect("commit");
        assert!(approx(commit.geometry.height, 20.0));
        let stored = session.store.get(&ElementId::new("s")).expect("record");
        assert!(approx(stored.geometry.height, 20.0));
        assert!(session.busy().is_none());
        assert!(!resize.is_resizing());
    }

    #[test]
    fn near_handle_keeps_fractional_far_edge_whole() {
        let mut session = session_with_selected(Rect::new(10.0, 0.0, 100.6, 50.0));
        let mut resize = ResizeController::new();
        resize
            .begin(&mut session, HandlePosition::W, Point::new(10.0, 25.0))
            .expect("begin");
        let live = resize.update(&mut session, Point::new(10.3, 25.0)).expect("live");
        assert!(approx(live.x, 10.0));
        assert!(approx(live.right(), 111.0));
        assert!(approx(live.width, 101.0));
    }

    #[test]
    fn cancel_leaves_store_untouched() {
        let mut session = session_with_selected(Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut resize = ResizeController::new();
        resize
            .begin(&mut session, HandlePosition::Se, Point::new(100.0, 100.0))
            .expect("begin");
        resize.update(&mut session, Point::new(300.0, 300.0));
        assert!(resize.cancel(&mut session));
        assert!(session.busy().is_none());
        let visual = session.visuals.get(&ElementId::new("s")).expect("visual");
        assert!(approx(visual.geometry.width, 100.0));
        let stored = session.store.get(&ElementId::new("s")).expect("record");
        assert!(approx(stored.geometry.width, 100.0));
    }

    #[test]
    fn handle_names_parse() {
        for handle in HandlePosition::ALL {
            assert_eq!(HandlePosition::parse(handle.name()), Some(handle));
        }
        assert_eq!(HandlePosition::parse("NE"), Some(HandlePosition::Ne));
        assert_eq!(HandlePosition::parse("middle"), None);
    }
}
