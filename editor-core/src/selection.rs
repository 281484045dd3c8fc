//! Single-element selection.
//!
//! The selection is either nothing or one element id, held on the session.
//! Every transition updates the visual affordances and resize handles
//! first, then publishes.

use crate::bus::{EditorEvent, EventBus};
use crate::resize;
use crate::session::EditorSession;
use crate::{EditorError, EditorResult, ElementId, ElementRecord};

/// Selection operations over a borrowed session.
#[derive(Debug)]
pub struct SelectionController<'a> {
    session: &'a mut EditorSession,
    bus: &'a EventBus,
}

impl<'a> SelectionController<'a> {
    /// Borrow a session and bus for selection changes.
    pub fn new(session: &'a mut EditorSession, bus: &'a EventBus) -> Self {
        Self { session, bus }
    }

    /// Currently selected id.
    #[must_use]
    pub fn current(&self) -> Option<&ElementId> {
        self.session.selected.as_ref()
    }

    /// Select `id`, or clear the selection with `None`.
    ///
    /// Selecting the already-selected element republishes
    /// `elementSelected`. Switching from another element publishes
    /// `elementDeselected` for it first.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ElementNotFound`] if `id` is not in the
    /// store; the selection is left unchanged.
    pub fn select(&mut self, id: Option<&ElementId>) -> EditorResult<()> {
        if let Some(id) = id {
            if !self.session.store.contains(id) {
                tracing::warn!("Cannot select missing element {id}");
                return Err(EditorError::ElementNotFound(id.to_string()));
            }
        }

        let previous = self.session.selected.take();
        self.session.selected = id.cloned();
        self.session.visuals.set_selected(id);
        resize::sync_handles(self.session);

        if let Some(prev) = previous.as_ref().filter(|prev| Some(*prev) != id) {
            tracing::debug!("Deselected {prev}");
            self.bus.publish(&EditorEvent::ElementDeselected {
                element_id: prev.clone(),
            });
        }
        if let Some(id) = id {
            tracing::debug!("Selected {id}");
        }
        self.bus.publish(&EditorEvent::ElementSelected {
            current: id.cloned(),
            previous,
        });
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        // Selecting nothing cannot miss.
        let _ = self.select(None);
    }

    /// Resynchronize panels after the canvas was rebuilt from a snapshot.
    ///
    /// `previous` is the selection before the rebuild. A selection that
    /// survived is re-affirmed; one whose element no longer exists is
    /// reported as deselected.
    pub fn after_restore(&mut self, previous: Option<ElementId>) {
        match (previous, self.session.selected.clone()) {
            (_, Some(id)) => {
                if let Err(err) = self.select(Some(&id)) {
                    tracing::warn!("Could not re-affirm selection after restore: {err}");
                }
            }
            (Some(prev), None) => {
                tracing::debug!("Selection {prev} did not survive restore");
                self.bus.publish(&EditorEvent::ElementDeselected {
                    element_id: prev.clone(),
                });
                self.bus.publish(&EditorEvent::ElementSelected {
                    current: None,
                    previous: Some(prev),
                });
            }
            (None, None) => {}
        }
    }

    /// Delete the selected element and clear the selection.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] when nothing is selected,
    /// or [`EditorError::ElementNotFound`] if the selected id has gone
    /// stale (the selection is cleared in that case).
    pub fn delete_selected(&mut self) -> EditorResult<ElementRecord> {
        let Some(id) = self.session.selected.clone() else {
            return Err(EditorError::InvalidOperation(
                "no element selected to delete".to_string(),
            ));
        };
        let removed = match self.session.store.remove(&id) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!("Selected element {id} vanished before delete");
                self.deselect();
                return Err(err);
            }
        };
        self.session.visuals.remove(&id);
        tracing::info!("Deleted element {id}");
        self.bus.publish(&EditorEvent::ElementDeleted { element_id: id });
        self.deselect();
        Ok(removed)
    }
}
