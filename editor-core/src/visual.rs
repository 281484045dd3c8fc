//! Retained visual tree mirroring the element store.
//!
//! A [`VisualElement`] is what the host draws. It carries display state the
//! store does not (selection affordance, live drag/resize geometry) and an
//! interaction binding: only bound elements receive pointer input. Visuals
//! rebuilt from data start unbound and must be bound again, which the
//! renderer does on every materialization.

use crate::resize::{HandlePosition, ResizeHandle};
use crate::{ElementId, ElementRecord, ElementType, Point, Rect};

/// Display-side counterpart of one element record.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualElement {
    /// Id of the record this visual mirrors.
    pub id: ElementId,
    /// Element type, for host-side drawing.
    pub element_type: ElementType,
    /// Geometry in unscaled canvas units; runs ahead of the store while a
    /// gesture is in progress.
    pub geometry: Rect,
    /// Stacking order.
    pub z_index: i32,
    selected: bool,
    bound: bool,
}

impl VisualElement {
    /// Build an unbound, unselected visual from a record.
    #[must_use]
    pub fn from_record(record: &ElementRecord) -> Self {
        Self {
            id: record.id.clone(),
            element_type: record.element_type(),
            geometry: record.geometry,
            z_index: record.z_index,
            selected: false,
            bound: false,
        }
    }

    /// Whether the selection affordance is shown.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether pointer input reaches this element.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.bound
    }

    /// Attach interaction handling.
    pub fn bind(&mut self) {
        self.bound = true;
    }

    /// Geometry on screen at the given display scale.
    #[must_use]
    pub fn display_rect(&self, scale: f32) -> Rect {
        Rect::new(
            self.geometry.x * scale,
            self.geometry.y * scale,
            self.geometry.width * scale,
            self.geometry.height * scale,
        )
    }
}

/// All visuals on the canvas plus the selected element's resize handles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualTree {
    elements: Vec<VisualElement>,
    handles: Vec<ResizeHandle>,
    handles_hidden: bool,
}

impl VisualTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build unbound visuals for records, in order.
    #[must_use]
    pub fn from_records(records: &[ElementRecord]) -> Self {
        Self {
            elements: records.iter().map(VisualElement::from_record).collect(),
            ..Self::default()
        }
    }

    /// Bind every visual, returning how many were newly bound.
    pub fn bind_all(&mut self) -> usize {
        let mut count = 0;
        for element in self.elements.iter_mut().filter(|e| !e.bound) {
            element.bind();
            count += 1;
        }
        count
    }

    /// Append a visual.
    pub fn insert(&mut self, element: VisualElement) {
        self.elements.push(element);
    }

    /// Remove a visual by id.
    pub fn remove(&mut self, id: &ElementId) -> Option<VisualElement> {
        let index = self.elements.iter().position(|e| &e.id == id)?;
        Some(self.elements.remove(index))
    }

    /// Get a visual by id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&VisualElement> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Overwrite a visual's geometry. Returns `false` if the id is absent.
    pub fn set_geometry(&mut self, id: &ElementId, geometry: Rect) -> bool {
        match self.elements.iter_mut().find(|e| &e.id == id) {
            Some(element) => {
                element.geometry = geometry;
                true
            }
            None => false,
        }
    }

    /// Copy geometry and z-index from a committed record.
    pub fn sync_record(&mut self, record: &ElementRecord) -> bool {
        match self.elements.iter_mut().find(|e| e.id == record.id) {
            Some(element) => {
                element.geometry = record.geometry;
                element.z_index = record.z_index;
                true
            }
            None => false,
        }
    }

    /// Show the selection affordance on `id` only, or on nothing.
    pub fn set_selected(&mut self, id: Option<&ElementId>) {
        for element in &mut self.elements {
            element.selected = Some(&element.id) == id;
        }
    }

    /// Ids of visuals currently showing the selection affordance.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<&ElementId> {
        self.elements
            .iter()
            .filter(|e| e.selected)
            .map(|e| &e.id)
            .collect()
    }

    /// Topmost bound element under a point in canvas units.
    ///
    /// Higher z-index wins; among equal z-indices the later element wins.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<&ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.bound && e.geometry.contains(point))
            .max_by_key(|(index, e)| (e.z_index, *index))
            .map(|(_, e)| &e.id)
    }

    /// Current resize handles, or none while handles are hidden.
    #[must_use]
    pub fn handles(&self) -> &[ResizeHandle] {
        if self.handles_hidden {
            &[]
        } else {
            &self.handles
        }
    }

    /// Replace the resize handles.
    pub fn set_handles(&mut self, handles: Vec<ResizeHandle>) {
        self.handles = handles;
    }

    /// Destroy the resize handles.
    pub fn clear_handles(&mut self) {
        self.handles.clear();
    }

    /// Hide or show handles without destroying them.
    pub fn set_handles_hidden(&mut self, hidden: bool) {
        self.handles_hidden = hidden;
    }

    /// Whether handles are hidden.
    #[must_use]
    pub const fn handles_hidden(&self) -> bool {
        self.handles_hidden
    }

    /// Handle within `radius` (canvas units) of a point.
    #[must_use]
    pub fn handle_at(&self, point: Point, radius: f32) -> Option<HandlePosition> {
        self.handles()
            .iter()
            .find(|h| (h.center.x - point.x).abs() <= radius && (h.center.y - point.y).abs() <= radius)
            .map(|h| h.position)
    }

    /// Iterate visuals in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &VisualElement> {
        self.elements.iter()
    }

    /// Number of visuals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether there are no visuals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, ShapeKind};

    fn record(id: &str, rect: Rect, z: i32) -> ElementRecord {
        ElementRecord::new(
            ElementId::new(id),
            ElementKind::Shape {
                shape: ShapeKind::Rectangle,
            },
            rect,
        )
        .with_z_index(z)
    }

    #[test]
    fn rebuilt_visuals_are_unbound_until_bound() {
        let records = [record("a", Rect::new(0.0, 0.0, 10.0, 10.0), 0)];
        let mut tree = VisualTree::from_records(&records);
        assert_eq!(tree.hit_test(Point::new(5.0, 5.0)), None);
        assert_eq!(tree.bind_all(), 1);
        assert_eq!(tree.hit_test(Point::new(5.0, 5.0)), Some(&ElementId::new("a")));
    }

    #[test]
    fn hit_test_prefers_higher_z() {
        let records = [
            record("top", Rect::new(0.0, 0.0, 50.0, 50.0), 3),
            record("bottom", Rect::new(0.0, 0.0, 50.0, 50.0), 1),
        ];
        let mut tree = VisualTree::from_records(&records);
        tree.bind_all();
        assert_eq!(tree.hit_test(Point::new(10.0, 10.0)), Some(&ElementId::new("top")));
        assert_eq!(tree.hit_test(Point::new(60.0, 10.0)), None);
    }

    #[test]
    fn selection_affordance_is_exclusive() {
        let records = [
            record("a", Rect::new(0.0, 0.0, 10.0, 10.0), 0),
            record("b", Rect::new(20.0, 0.0, 10.0, 10.0), 0),
        ];
        let mut tree = VisualTree::from_records(&records);
        tree.set_selected(Some(&ElementId::new("a")));
        tree.set_selected(Some(&ElementId::new("b")));
        assert_eq!(tree.selected_ids(), vec![&ElementId::new("b")]);
        tree.set_selected(None);
        assert!(tree.selected_ids().is_empty());
    }

    #[test]
    fn display_rect_scales_geometry() {
        let visual = VisualElement::from_record(&record("a", Rect::new(10.0, 20.0, 30.0, 40.0), 0));
        let rect = visual.display_rect(0.5);
        assert!((rect.x - 5.0).abs() < f32::EPSILON);
        assert!((rect.height - 20.0).abs() < f32::EPSILON);
    }
}
