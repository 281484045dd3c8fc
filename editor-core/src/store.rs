//! Element storage for an editing session.
//!
//! [`CanvasElementStore`] is the single source of truth for element
//! position, size, content and style. Visual elements mirror it; drag and
//! resize write their final geometry back here on commit.

use crate::{EditorError, EditorResult, ElementId, ElementPatch, ElementRecord};

/// Ordered collection of element records with unique ids.
///
/// Insertion order is preserved; paint order is given by
/// [`paint_order`](Self::paint_order), which sorts by explicit z-index.
///
/// # Example
///
/// ```
/// use editor_core::store::CanvasElementStore;
/// use editor_core::{ElementId, ElementKind, ElementRecord, Rect};
///
/// let mut store = CanvasElementStore::new();
/// let record = ElementRecord::new(
///     ElementId::new("title"),
///     ElementKind::Text { content: "Hello".to_string() },
///     Rect::new(10.0, 10.0, 100.0, 30.0),
/// );
/// store.add(record).unwrap();
/// assert!(store.get(&ElementId::new("title")).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasElementStore {
    records: Vec<ElementRecord>,
}

impl CanvasElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::DuplicateId`] on the first collision.
    pub fn from_records(records: impl IntoIterator<Item = ElementRecord>) -> EditorResult<Self> {
        let mut store = Self::new();
        for record in records {
            store.add(record)?;
        }
        Ok(store)
    }

    /// Append a record.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::DuplicateId`] if the id is already present;
    /// the caller must pick a fresh id.
    pub fn add(&mut self, record: ElementRecord) -> EditorResult<()> {
        if self.contains(&record.id) {
            return Err(EditorError::DuplicateId(record.id.to_string()));
        }
        tracing::debug!("Store add {} ({})", record.id, record.element_type());
        self.records.push(record);
        Ok(())
    }

    /// Remove a record, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ElementNotFound`] if the id is absent. This is
    /// a signal for logging, not a failure of the store.
    pub fn remove(&mut self, id: &ElementId) -> EditorResult<ElementRecord> {
        let index = self
            .position(id)
            .ok_or_else(|| EditorError::ElementNotFound(id.to_string()))?;
        tracing::debug!("Store remove {id}");
        Ok(self.records.remove(index))
    }

    /// Get a record by id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&ElementRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Merge a partial update into a record.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ElementNotFound`] if the id is absent, or
    /// [`EditorError::Validation`] if the patch does not fit the record.
    pub fn update(&mut self, id: &ElementId, patch: &ElementPatch) -> EditorResult<&ElementRecord> {
        let index = self
            .position(id)
            .ok_or_else(|| EditorError::ElementNotFound(id.to_string()))?;
        let record = &mut self.records[index];
        record.apply(patch)?;
        Ok(record)
    }

    /// All records in insertion order.
    #[must_use]
    pub fn all(&self) -> &[ElementRecord] {
        &self.records
    }

    /// Records sorted bottom-to-top by z-index; ties keep insertion order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&ElementRecord> {
        let mut ordered: Vec<_> = self.records.iter().collect();
        ordered.sort_by_key(|r| r.z_index);
        ordered
    }

    /// Whether a record with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.position(id).is_some()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Highest z-index, or `None` when empty.
    #[must_use]
    pub fn max_z(&self) -> Option<i32> {
        self.records.iter().map(|r| r.z_index).max()
    }

    /// Lowest z-index, or `None` when empty.
    #[must_use]
    pub fn min_z(&self) -> Option<i32> {
        self.records.iter().map(|r| r.z_index).min()
    }

    /// Highest z-index among records other than `id`.
    #[must_use]
    pub fn max_z_excluding(&self, id: &ElementId) -> Option<i32> {
        self.records.iter().filter(|r| &r.id != id).map(|r| r.z_index).max()
    }

    /// Lowest z-index among records other than `id`.
    #[must_use]
    pub fn min_z_excluding(&self, id: &ElementId) -> Option<i32> {
        self.records.iter().filter(|r| &r.id != id).map(|r| r.z_index).min()
    }

    fn position(&self, id: &ElementId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }
}
