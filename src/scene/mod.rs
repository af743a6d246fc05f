//! The annotation document: base image, z-ordered annotations and selection.
//!
//! Annotations live in an arena keyed by [`AnnotationId`]; the explicit `order`
//! list is the z-order (first = bottom). Mutating methods are meant for history
//! replay and initial load. Interactive code goes through
//! [`History`](crate::history::History) so every change stays undoable.

pub mod annotation;

pub use annotation::{
    Annotation, AnnotationId, AnnotationKind, BlurMode, SpotlightShape, Style,
};

use crate::draw::Raster;
use crate::geometry::{Point, Rect};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Scene lookup failures. Under correct history sequencing these never occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("annotation {0} not found")]
    NotFound(AnnotationId),

    #[error("annotation {0} is already in the scene")]
    DuplicateId(AnnotationId),
}

/// In-memory document for one editor session.
pub struct Scene {
    base: Raster,
    annotations: HashMap<AnnotationId, Annotation>,
    order: Vec<AnnotationId>,
    selection: BTreeSet<AnnotationId>,
    next_id: u64,
    dirty: bool,
    revision: u64,
}

impl Scene {
    /// Creates an empty scene over a captured image.
    pub fn new(base: Raster) -> Self {
        Self {
            base,
            annotations: HashMap::new(),
            order: Vec::new(),
            selection: BTreeSet::new(),
            next_id: 1,
            dirty: false,
            revision: 0,
        }
    }

    pub fn base(&self) -> &Raster {
        &self.base
    }

    /// Swaps the base image (crop and its undo), returning the previous one.
    pub fn replace_base(&mut self, base: Raster) -> Raster {
        let previous = std::mem::replace(&mut self.base, base);
        self.touch();
        previous
    }

    /// Image-space rectangle covered by the base image.
    pub fn image_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.base.width() as f64, self.base.height() as f64)
    }

    /// Builds an annotation with a fresh identifier without inserting it.
    ///
    /// Tools use this to construct the payload of an add command.
    pub fn allocate(&mut self, kind: AnnotationKind, style: Style) -> Annotation {
        let id = AnnotationId(self.next_id);
        self.next_id += 1;
        Annotation { id, style, kind }
    }

    /// Allocates and inserts on top of the z-order. For initial load only.
    pub fn create(&mut self, kind: AnnotationKind, style: Style) -> AnnotationId {
        let annotation = self.allocate(kind, style);
        let id = annotation.id;
        let top = self.order.len();
        // Freshly allocated ids cannot collide.
        let _ = self.insert(annotation, top);
        id
    }

    /// Inserts at z-index `index` (clamped to the top).
    pub fn insert(&mut self, annotation: Annotation, index: usize) -> Result<(), SceneError> {
        let id = annotation.id;
        if self.annotations.contains_key(&id) {
            return Err(SceneError::DuplicateId(id));
        }
        self.next_id = self.next_id.max(id.0 + 1);
        let index = index.min(self.order.len());
        self.order.insert(index, id);
        self.annotations.insert(id, annotation);
        self.touch();
        Ok(())
    }

    /// Removes an annotation, returning it with the z-index it occupied.
    pub fn remove(&mut self, id: AnnotationId) -> Result<(Annotation, usize), SceneError> {
        let index = self.index_of(id).ok_or(SceneError::NotFound(id))?;
        self.order.remove(index);
        let annotation = self
            .annotations
            .remove(&id)
            .ok_or(SceneError::NotFound(id))?;
        self.selection.remove(&id);
        self.touch();
        Ok((annotation, index))
    }

    /// Mutates an annotation in place and returns its previous state.
    pub fn update<F>(&mut self, id: AnnotationId, mutation: F) -> Result<Annotation, SceneError>
    where
        F: FnOnce(&mut Annotation),
    {
        let annotation = self
            .annotations
            .get_mut(&id)
            .ok_or(SceneError::NotFound(id))?;
        let previous = annotation.clone();
        mutation(annotation);
        // The identifier is not part of the mutable state.
        annotation.id = id;
        self.touch();
        Ok(previous)
    }

    /// Swaps in a full snapshot, returning the replaced state.
    pub fn replace(
        &mut self,
        id: AnnotationId,
        snapshot: Annotation,
    ) -> Result<Annotation, SceneError> {
        self.update(id, |a| *a = snapshot)
    }

    pub fn translate(&mut self, id: AnnotationId, dx: f64, dy: f64) -> Result<(), SceneError> {
        self.update(id, |a| a.kind.translate(dx, dy)).map(|_| ())
    }

    /// Moves an annotation to z-index `new_index` (clamped), returning the old index.
    pub fn reorder(&mut self, id: AnnotationId, new_index: usize) -> Result<usize, SceneError> {
        let old = self.index_of(id).ok_or(SceneError::NotFound(id))?;
        self.order.remove(old);
        let new_index = new_index.min(self.order.len());
        self.order.insert(new_index, id);
        self.touch();
        Ok(old)
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.get(&id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.annotations.contains_key(&id)
    }

    pub fn index_of(&self, id: AnnotationId) -> Option<usize> {
        self.order.iter().position(|x| *x == id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Annotations in z-order, bottom first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Annotation> + '_ {
        self.order.iter().filter_map(|id| self.annotations.get(id))
    }

    /// Identifiers of annotations under `point`, topmost first.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Vec<AnnotationId> {
        self.iter()
            .rev()
            .filter(|a| a.hit(point, tolerance))
            .map(|a| a.id)
            .collect()
    }

    /// Next step badge number: one past the highest badge in the scene.
    pub fn next_step_number(&self) -> u32 {
        self.iter()
            .filter_map(|a| match a.kind {
                AnnotationKind::StepCounter { number, .. } => Some(number),
                _ => None,
            })
            .max()
            .map_or(1, |n| n + 1)
    }

    // ------------------------------------------------------------------------
    // Selection (transient, never recorded in history)
    // ------------------------------------------------------------------------

    pub fn selection(&self) -> &BTreeSet<AnnotationId> {
        &self.selection
    }

    /// Selected annotations in z-order.
    pub fn selected(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.iter().filter(|a| self.selection.contains(&a.id))
    }

    pub fn is_selected(&self, id: AnnotationId) -> bool {
        self.selection.contains(&id)
    }

    /// Replaces the selection; identifiers not in the scene are dropped.
    pub fn set_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = AnnotationId>,
    {
        self.selection = ids.into_iter().filter(|id| self.contains(*id)).collect();
    }

    pub fn select_only(&mut self, id: AnnotationId) {
        self.set_selection([id]);
    }

    pub fn toggle_selected(&mut self, id: AnnotationId) {
        if !self.selection.remove(&id) && self.contains(id) {
            self.selection.insert(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_all(&mut self) {
        self.selection = self.order.iter().copied().collect();
    }

    // ------------------------------------------------------------------------
    // Change tracking
    // ------------------------------------------------------------------------

    /// True if annotations changed since the last successful export.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Monotonic counter bumped by every mutation; used as a render cache key.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(Raster::filled(200, 100, [255, 255, 255, 255]))
    }

    fn rect(x: f64) -> AnnotationKind {
        AnnotationKind::Rectangle {
            rect: Rect::new(x, 10.0, 50.0, 50.0),
        }
    }

    #[test]
    fn identifiers_are_never_reused() {
        let mut scene = scene();
        let a = scene.create(rect(0.0), Style::default());
        scene.remove(a).unwrap();
        let b = scene.create(rect(0.0), Style::default());
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn hit_test_returns_topmost_first() {
        let mut scene = scene();
        let mut style = Style::default();
        style.fill = Some(crate::draw::color::BLUE);
        let bottom = scene.create(rect(0.0), style.clone());
        let top = scene.create(rect(20.0), style);
        assert_eq!(scene.hit_test(Point::new(30.0, 30.0), 0.0), vec![top, bottom]);

        scene.reorder(top, 0).unwrap();
        assert_eq!(scene.hit_test(Point::new(30.0, 30.0), 0.0), vec![bottom, top]);
    }

    #[test]
    fn remove_reports_index_and_prunes_selection() {
        let mut scene = scene();
        let a = scene.create(rect(0.0), Style::default());
        let b = scene.create(rect(60.0), Style::default());
        scene.set_selection([a, b]);
        let (removed, index) = scene.remove(a).unwrap();
        assert_eq!(removed.id, a);
        assert_eq!(index, 0);
        assert_eq!(scene.selection().iter().copied().collect::<Vec<_>>(), vec![b]);
        assert_eq!(scene.remove(a).unwrap_err(), SceneError::NotFound(a));
    }

    #[test]
    fn update_returns_previous_state_and_marks_dirty() {
        let mut scene = scene();
        let id = scene.create(rect(0.0), Style::default());
        scene.mark_clean();
        let before = scene.revision();
        let prev = scene.update(id, |a| a.style.width = 9.0).unwrap();
        assert_eq!(prev.style.width, 3.0);
        assert_eq!(scene.get(id).unwrap().style.width, 9.0);
        assert!(scene.is_dirty());
        assert!(scene.revision() > before);
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut scene = scene();
        let id = scene.create(rect(0.0), Style::default());
        let copy = scene.get(id).unwrap().clone();
        assert_eq!(scene.insert(copy, 0), Err(SceneError::DuplicateId(id)));
    }

    #[test]
    fn selection_ignores_unknown_ids() {
        let mut scene = scene();
        let id = scene.create(rect(0.0), Style::default());
        let ghost = scene.allocate(rect(0.0), Style::default()).id;
        scene.set_selection([id, ghost]);
        assert_eq!(scene.selection().len(), 1);
        scene.toggle_selected(ghost);
        assert!(!scene.is_selected(ghost));
    }

    #[test]
    fn step_numbers_continue_from_highest() {
        let mut scene = scene();
        assert_eq!(scene.next_step_number(), 1);
        for number in [1, 4] {
            scene.create(
                AnnotationKind::StepCounter {
                    center: Point::new(10.0, 10.0),
                    number,
                    radius: 16.0,
                },
                Style::default(),
            );
        }
        assert_eq!(scene.next_step_number(), 5);
    }
}
