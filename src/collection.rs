//! Ordered, id-indexed storage of grasp rectangles.
//!
//! Order matters: later shapes are drawn on top and win hit tests. The
//! id→index map is kept in lockstep with the sequence and doubles as the
//! consistency token for reorders requested by the list view.

use crate::message::IdMap;
use crate::model::{GraspRect, ShapeId};

/// The shapes of the current image.
#[derive(Debug, Clone, Default)]
pub struct ShapeCollection {
    shapes: Vec<GraspRect>,
    id_to_index: IdMap,
}

impl ShapeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.id_to_index.contains_key(id)
    }

    pub fn index_of(&self, id: &ShapeId) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }

    pub fn get(&self, id: &ShapeId) -> Option<&GraspRect> {
        self.index_of(id).map(|i| &self.shapes[i])
    }

    pub fn get_mut(&mut self, id: &ShapeId) -> Option<&mut GraspRect> {
        self.index_of(id).map(move |i| &mut self.shapes[i])
    }

    /// Shapes bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, GraspRect> {
        self.shapes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, GraspRect> {
        self.shapes.iter_mut()
    }

    pub fn as_slice(&self) -> &[GraspRect] {
        &self.shapes
    }

    pub fn ids(&self) -> Vec<ShapeId> {
        self.shapes.iter().map(|s| s.id().clone()).collect()
    }

    pub fn id_map(&self) -> &IdMap {
        &self.id_to_index
    }

    /// Append shapes whose id is not present yet.
    ///
    /// Returns copies of the shapes actually inserted.
    pub fn insert(&mut self, shapes: impl IntoIterator<Item = GraspRect>) -> Vec<GraspRect> {
        let mut added = Vec::new();
        for shape in shapes {
            if self.contains(shape.id()) {
                log::debug!("Shape {} already present, skipping", shape.id());
                continue;
            }
            self.id_to_index.insert(shape.id().clone(), self.shapes.len());
            added.push(shape.clone());
            self.shapes.push(shape);
        }
        added
    }

    /// Remove the given shapes; unknown ids are ignored.
    ///
    /// Returns the ids that were actually removed, in request order.
    pub fn remove(&mut self, ids: &[ShapeId]) -> Vec<ShapeId> {
        let mut removed = Vec::new();
        let mut indices = Vec::new();
        for id in ids {
            if let Some(idx) = self.id_to_index.remove(id) {
                indices.push(idx);
                removed.push(id.clone());
            }
        }
        if removed.is_empty() {
            return removed;
        }

        indices.sort_unstable_by(|a, b| b.cmp(a));
        for idx in indices {
            self.shapes.remove(idx);
        }
        self.rebuild_index();
        removed
    }

    /// Remove every shape.
    pub fn clear(&mut self) -> Vec<ShapeId> {
        let ids = self.ids();
        self.remove(&ids)
    }

    /// Move shapes to the positions given by `new`.
    ///
    /// `old` is the order the requester based its change on.
    ///
    /// # Panics
    ///
    /// Panics if the current order matches neither `old` nor `new`, or if
    /// `new` is not a permutation of the current shapes. Either means the
    /// two mirrored orderings have diverged.
    pub fn reorder(&mut self, old: &IdMap, new: &IdMap) {
        if self.id_to_index != *old {
            if self.id_to_index == *new {
                log::info!("Shapes already in the requested order");
                return;
            }
            panic!("shape order out of sync with the requested reorder");
        }
        if old == new {
            log::info!("Shapes order not changed, no need to reorder");
            return;
        }
        assert_eq!(
            new.len(),
            self.shapes.len(),
            "reorder target has a different number of shapes"
        );

        let mut slots: Vec<Option<GraspRect>> = vec![None; self.shapes.len()];
        let mut current: Vec<Option<GraspRect>> =
            std::mem::take(&mut self.shapes).into_iter().map(Some).collect();

        for (id, &new_idx) in new {
            let Some(&old_idx) = self.id_to_index.get(id) else {
                panic!("shape order out of sync with the requested reorder: unknown id {id}");
            };
            assert!(
                new_idx < slots.len() && slots[new_idx].is_none(),
                "reorder target index {new_idx} is invalid"
            );
            slots[new_idx] = current[old_idx].take();
        }

        self.shapes = slots.into_iter().flatten().collect();
        self.id_to_index = new.clone();
    }

    fn rebuild_index(&mut self) {
        self.id_to_index = self
            .shapes
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id().clone(), i))
            .collect();
    }
}
