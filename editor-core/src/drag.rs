//! Pointer-driven moving of the selected element.
//!
//! While dragging, only the visual element and the gesture's working copy
//! change. The store is written once, on pointer-up.

use crate::bus::{EditorEvent, EventBus};
use crate::resize;
use crate::session::{EditorSession, GestureCommit, Interaction};
use crate::{EditorError, EditorResult, ElementId, ElementPatch, Point, Rect};

/// An in-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    /// Element being dragged.
    pub element_id: ElementId,
    /// Pointer position at pointer-down, in display pixels.
    pub pointer_origin: Point,
    /// Element position at pointer-down, in unscaled units.
    pub element_origin: Point,
    /// Live geometry, ahead of the store.
    pub working: Rect,
}

/// Drag state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// Dragging an element.
    Dragging(DragGesture),
}

/// Moves the selected element with the pointer.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &DragState {
        &self.state
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Start dragging the selected element from a display position.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] if nothing is selected,
    /// [`EditorError::ElementNotFound`] if the selected element has no
    /// record, or [`EditorError::Busy`] if another gesture is running.
    pub fn begin(&mut self, session: &mut EditorSession, pointer: Point) -> EditorResult<()> {
        let Some(id) = session.selected.clone() else {
            return Err(EditorError::InvalidOperation(
                "only the selected element can be dragged".to_string(),
            ));
        };
        let geometry = session
            .store
            .get(&id)
            .map(|record| record.geometry)
            .ok_or_else(|| EditorError::ElementNotFound(id.to_string()))?;
        session.acquire(Interaction::Dragging)?;

        tracing::debug!("Drag start {id} at ({}, {})", pointer.x, pointer.y);
        self.state = DragState::Dragging(DragGesture {
            element_id: id,
            pointer_origin: pointer,
            element_origin: Point::new(geometry.x, geometry.y),
            working: geometry,
        });
        Ok(())
    }

    /// Follow the pointer. Returns the live position, or `None` when idle.
    pub fn update(&mut self, session: &mut EditorSession, pointer: Point) -> Option<Point> {
        let DragState::Dragging(gesture) = &mut self.state else {
            return None;
        };
        let (dx, dy) = session.viewport.delta_to_canvas(
            pointer.x - gesture.pointer_origin.x,
            pointer.y - gesture.pointer_origin.y,
        );
        gesture.working.x = (gesture.element_origin.x + dx).round();
        gesture.working.y = (gesture.element_origin.y + dy).round();

        if session.visuals.set_geometry(&gesture.element_id, gesture.working) {
            resize::sync_handles(session);
        } else {
            tracing::debug!("Drag target {} has no visual", gesture.element_id);
        }
        Some(Point::new(gesture.working.x, gesture.working.y))
    }

    /// Abandon the drag without touching the store. The visual snaps back
    /// to the stored geometry if the element still exists. Returns whether
    /// a drag was in progress.
    pub fn cancel(&mut self, session: &mut EditorSession) -> bool {
        let DragState::Dragging(gesture) = std::mem::take(&mut self.state) else {
            return false;
        };
        session.release();
        if let Some(geometry) = session.store.get(&gesture.element_id).map(|r| r.geometry) {
            session.visuals.set_geometry(&gesture.element_id, geometry);
            resize::sync_handles(session);
        }
        tracing::debug!("Drag cancelled for {}", gesture.element_id);
        true
    }

    /// End the drag and write the final position to the store.
    ///
    /// Returns `Ok(None)` when no drag was in progress.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ElementNotFound`] if the element was removed
    /// mid-drag; nothing is committed in that case.
    pub fn finish(&mut self, session: &mut EditorSession, bus: &EventBus) -> EditorResult<Option<GestureCommit>> {
        let DragState::Dragging(gesture) = std::mem::take(&mut self.state) else {
            return Ok(None);
        };
        session.release();

        let patch = ElementPatch::position(gesture.working.x, gesture.working.y);
        let committed = match session.store.update(&gesture.element_id, &patch) {
            Ok(record) => record.geometry,
            Err(err) => {
                tracing::warn!("Drag commit skipped: {err}");
                return Err(err);
            }
        };
        session.visuals.set_geometry(&gesture.element_id, committed);
        tracing::debug!(
            "Drag end {} at ({}, {})",
            gesture.element_id,
            committed.x,
            committed.y
        );
        bus.publish(&EditorEvent::ElementUpdated {
            element_id: gesture.element_id.clone(),
        });
        Ok(Some(GestureCommit {
            element_id: gesture.element_id,
            interaction: Interaction::Dragging,
            geometry: committed,
        }))
    }
}
