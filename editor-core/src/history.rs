//! Undo/redo over structured canvas snapshots.
//!
//! A snapshot is plain data: the canvas descriptor and every element
//! record. Restoring one rebuilds the store and the visual tree through the
//! renderer, which also rebinds interaction on every rebuilt visual.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::bus::{EditorEvent, EventBus};
use crate::renderer::Renderer;
use crate::session::EditorSession;
use crate::{CanvasDescriptor, EditorResult, ElementRecord};

/// Immutable copy of the canvas at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Canvas size and background.
    pub canvas: CanvasDescriptor,
    /// Element records in store order.
    pub elements: Vec<ElementRecord>,
}

impl Snapshot {
    /// Capture the session's canvas and elements.
    #[must_use]
    pub fn capture(session: &EditorSession) -> Self {
        Self {
            canvas: session.canvas,
            elements: session.store.all().to_vec(),
        }
    }

    /// JSON text of this snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditorError::Serialization`] if serialization
    /// fails.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Bounded undo/redo stack with a cursor.
#[derive(Debug)]
pub struct HistoryManager {
    snapshots: VecDeque<Snapshot>,
    current_index: usize,
    capacity: usize,
    restoring: bool,
}

impl HistoryManager {
    /// Create an empty history holding at most `capacity` snapshots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            current_index: 0,
            capacity,
            restoring: false,
        }
    }

    /// Capture the session as a new snapshot.
    ///
    /// Discards any redo branch, evicts the oldest snapshot past capacity
    /// and moves the cursor to the new snapshot. Ignored while a restore
    /// is in progress; returns whether a snapshot was recorded.
    pub fn record_state(&mut self, session: &EditorSession) -> bool {
        if self.restoring {
            tracing::debug!("Skipping history capture during restore");
            return false;
        }
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.current_index + 1);
        }
        self.snapshots.push_back(Snapshot::capture(session));
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.current_index = self.snapshots.len() - 1;
        tracing::debug!(
            "State recorded. Index: {}, history size: {}",
            self.current_index,
            self.snapshots.len()
        );
        true
    }

    /// Step back one snapshot. Returns `Ok(false)` when there is nothing to
    /// undo.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be materialized; the cursor
    /// and the session are left as they were.
    pub fn undo(&mut self, session: &mut EditorSession, bus: &EventBus) -> EditorResult<bool> {
        if !self.can_undo() {
            tracing::debug!("Nothing to undo");
            return Ok(false);
        }
        let previous = self.current_index;
        self.current_index -= 1;
        if let Err(err) = self.restore_current(session, bus) {
            self.current_index = previous;
            return Err(err);
        }
        tracing::info!("Undo. Index: {}", self.current_index);
        Ok(true)
    }

    /// Step forward one snapshot. Returns `Ok(false)` when there is
    /// nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be materialized; the cursor
    /// and the session are left as they were.
    pub fn redo(&mut self, session: &mut EditorSession, bus: &EventBus) -> EditorResult<bool> {
        if !self.can_redo() {
            tracing::debug!("Nothing to redo");
            return Ok(false);
        }
        let previous = self.current_index;
        self.current_index += 1;
        if let Err(err) = self.restore_current(session, bus) {
            self.current_index = previous;
            return Err(err);
        }
        tracing::info!("Redo. Index: {}", self.current_index);
        Ok(true)
    }

    fn restore_current(&mut self, session: &mut EditorSession, bus: &EventBus) -> EditorResult<()> {
        let Some(snapshot) = self.snapshots.get(self.current_index) else {
            return Ok(());
        };
        self.restoring = true;
        let result = Renderer::materialize(session, snapshot.canvas, &snapshot.elements);
        if result.is_ok() {
            bus.publish(&EditorEvent::HistoryRestored);
        }
        self.restoring = false;
        result
    }

    /// Whether [`undo`](Self::undo) would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    /// Whether [`redo`](Self::redo) would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.current_index + 1 < self.snapshots.len()
    }

    /// Drop all snapshots and record the session as the new starting
    /// point.
    pub fn clear(&mut self, session: &EditorSession) {
        self.snapshots.clear();
        self.current_index = 0;
        self.record_state(session);
    }

    /// Whether a restore is in progress.
    #[must_use]
    pub const fn is_restoring(&self) -> bool {
        self.restoring
    }

    /// Cursor position.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of snapshots held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshots are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Maximum number of snapshots.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.current_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementId, ElementKind, ElementPatch, Rect};

    fn session_with_text() -> EditorSession {
        let mut session = EditorSession::default();
        let record = ElementRecord::new(
            ElementId::new("t"),
            ElementKind::Text {
                content: "Hi".to_string(),
            },
            Rect::new(0.0, 0.0, 50.0, 20.0),
        );
        Renderer::materialize(&mut session, CanvasDescriptor::new(400, 300), &[record]).expect("materialize");
        session
    }

    fn move_to(session: &mut EditorSession, x: f32) {
        session
            .store
            .update(&ElementId::new("t"), &ElementPatch::position(x, 0.0))
            .expect("update");
    }

    fn x_of(session: &EditorSession) -> f32 {
        session.store.get(&ElementId::new("t")).expect("record").geometry.x
    }

    #[test]
    fn undo_redo_walks_snapshots() {
        let mut session = session_with_text();
        let bus = EventBus::new();
        let mut history = HistoryManager::new(50);
        history.record_state(&session);
        for x in [10.0, 20.0, 30.0] {
            move_to(&mut session, x);
            history.record_state(&session);
        }
        let latest = Snapshot::capture(&session);

        for expected in [20.0, 10.0, 0.0] {
            assert!(history.undo(&mut session, &bus).expect("undo"));
            assert!((x_of(&session) - expected).abs() < f32::EPSILON);
        }
        assert!(!history.undo(&mut session, &bus).expect("undo at start"));
        for _ in 0..3 {
            assert!(history.redo(&mut session, &bus).expect("redo"));
        }
        assert_eq!(Snapshot::capture(&session), latest);
    }

    #[test]
    fn failed_restore_keeps_cursor() {
        let mut session = session_with_text();
        let bus = EventBus::new();
        let mut history = HistoryManager::new(50);
        let mut corrupt = Snapshot::capture(&session);
        corrupt.elements.push(corrupt.elements[0].clone());
        history.snapshots.push_back(corrupt);
        move_to(&mut session, 10.0);
        history.record_state(&session);
        assert_eq!(history.current_index(), 1);

        assert!(history.undo(&mut session, &bus).is_err());
        assert_eq!(history.current_index(), 1);
        assert!((x_of(&session) - 10.0).abs() < f32::EPSILON);
        assert!(!history.restoring);
        assert!(history.can_undo());
    }

    #[test]
    fn recording_after_undo_discards_future() {
        let mut session = session_with_text();
        let bus = EventBus::new();
        let mut history = HistoryManager::new(50);
        history.record_state(&session);
        move_to(&mut session, 10.0);
        history.record_state(&session);
        history.undo(&mut session, &bus).expect("undo");
        move_to(&mut session, 99.0);
        history.record_state(&session);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut session, &bus).expect("redo"));
        assert!((x_of(&session) - 99.0).abs() < f32::EPSILON);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut session = session_with_text();
        let mut history = HistoryManager::new(50);
        for i in 0..60u8 {
            move_to(&mut session, f32::from(i));
            history.record_state(&session);
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.current_index(), 49);
        let current = history.current().expect("current");
        assert!((current.elements[0].geometry.x - 59.0).abs() < f32::EPSILON);
    }

    #[test]
    fn restored_visuals_are_bound() {
        let mut session = session_with_text();
        let bus = EventBus::new();
        let mut history = HistoryManager::new(5);
        history.record_state(&session);
        move_to(&mut session, 100.0);
        history.record_state(&session);
        history.undo(&mut session, &bus).expect("undo");
        assert!(session.visuals.iter().all(crate::visual::VisualElement::is_bound));
        assert!(!history.is_restoring());
    }

    #[test]
    fn clear_keeps_only_current_state() {
        let mut session = session_with_text();
        let mut history = HistoryManager::new(5);
        history.record_state(&session);
        move_to(&mut session, 5.0);
        history.record_state(&session);
        history.clear(&session);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
