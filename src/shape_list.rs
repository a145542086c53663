//! Headless model of the shape list shown next to the canvas.
//!
//! The list mirrors the canvas order with its own id→index map. It learns
//! about changes from `CanvasEvent`s and turns user actions (check boxes,
//! row selection, drag-and-drop, delete) into `ListRequest`s for the canvas.

use crate::message::{CanvasEvent, IdMap, ListRequest};
use crate::model::{GraspRect, ShapeId};

/// One row of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeRow {
    pub id: ShapeId,
    /// Visibility check box.
    pub checked: bool,
    pub selected: bool,
    /// Marker color hue in degrees.
    pub hue: u32,
}

impl ShapeRow {
    fn new(shape: &GraspRect) -> Self {
        Self {
            id: shape.id().clone(),
            checked: shape.is_visible(),
            selected: false,
            hue: shape.fill_hue(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShapeList {
    rows: Vec<ShapeRow>,
    id_to_index: IdMap,
}

impl ShapeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[ShapeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn id_map(&self) -> &IdMap {
        &self.id_to_index
    }

    pub fn row(&self, id: &ShapeId) -> Option<&ShapeRow> {
        self.id_to_index.get(id).map(|&i| &self.rows[i])
    }

    fn row_mut(&mut self, id: &ShapeId) -> Option<&mut ShapeRow> {
        self.id_to_index.get(id).map(|&i| &mut self.rows[i])
    }

    /// Mirror a change reported by the canvas.
    pub fn apply(&mut self, event: &CanvasEvent) {
        match event {
            CanvasEvent::ShapesAdded(shapes) => {
                for shape in shapes {
                    if self.id_to_index.contains_key(shape.id()) {
                        continue;
                    }
                    self.id_to_index.insert(shape.id().clone(), self.rows.len());
                    self.rows.push(ShapeRow::new(shape));
                }
            }
            CanvasEvent::ShapesRemoved(ids) => {
                self.remove_rows(ids);
            }
            CanvasEvent::SelectionChanged {
                selected,
                deselected,
            } => {
                for (ids, value) in [(selected, true), (deselected, false)] {
                    for id in ids {
                        if let Some(row) = self.row_mut(id) {
                            row.selected = value;
                        }
                    }
                }
            }
            CanvasEvent::VisibilityChanged(changes) => {
                for (id, visible) in changes {
                    if let Some(row) = self.row_mut(id) {
                        row.checked = *visible;
                    }
                }
            }
            CanvasEvent::AreaChanged(shapes) => {
                for shape in shapes {
                    if let Some(row) = self.row_mut(shape.id()) {
                        row.hue = shape.fill_hue();
                    }
                }
            }
        }
    }

    fn remove_rows(&mut self, ids: &[ShapeId]) -> Vec<ShapeId> {
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
            self.rows.remove(idx);
        }
        self.rebuild_index();
        removed
    }

    fn rebuild_index(&mut self) {
        self.id_to_index = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
    }

    /// Drag-and-drop a row from `from` to `to`.
    ///
    /// Returns the reorder request for the canvas, or `None` when the order
    /// did not change or an index is out of range.
    pub fn move_row(&mut self, from: usize, to: usize) -> Option<ListRequest> {
        if from >= self.rows.len() || to >= self.rows.len() || from == to {
            return None;
        }
        let row = self.rows.remove(from);
        self.rows.insert(to, row);

        let old = std::mem::take(&mut self.id_to_index);
        self.rebuild_index();
        log::info!("Emit shape order change, {} rows", self.rows.len());
        Some(ListRequest::Reorder {
            old,
            new: self.id_to_index.clone(),
        })
    }

    /// Toggle a visibility check box.
    pub fn set_checked(&mut self, id: &ShapeId, checked: bool) -> Option<ListRequest> {
        let row = self.row_mut(id)?;
        if row.checked == checked {
            return None;
        }
        row.checked = checked;
        log::info!("Emit shape id = {id}, visible = {checked}");
        Some(ListRequest::SetVisible {
            id: id.clone(),
            visible: checked,
        })
    }

    /// Add rows to the list selection.
    pub fn select(&mut self, ids: &[ShapeId]) -> Option<ListRequest> {
        self.change_selection(ids, true)
    }

    /// Remove rows from the list selection.
    pub fn deselect(&mut self, ids: &[ShapeId]) -> Option<ListRequest> {
        self.change_selection(ids, false)
    }

    fn change_selection(&mut self, ids: &[ShapeId], value: bool) -> Option<ListRequest> {
        let mut changed = Vec::new();
        for id in ids {
            if let Some(row) = self.row_mut(id) {
                if row.selected != value {
                    row.selected = value;
                    changed.push(id.clone());
                }
            }
        }
        if changed.is_empty() {
            return None;
        }

        let (select, deselect) = if value {
            (changed, Vec::new())
        } else {
            (Vec::new(), changed)
        };
        Some(ListRequest::ChangeSelection { select, deselect })
    }

    /// Drop the selected rows and ask the canvas to delete their shapes.
    pub fn delete_selected(&mut self) -> Option<ListRequest> {
        let ids: Vec<ShapeId> = self
            .rows
            .iter()
            .filter(|r| r.selected)
            .map(|r| r.id.clone())
            .collect();
        let removed = self.remove_rows(&ids);
        if removed.is_empty() {
            return None;
        }
        log::info!("Emit removed shape ids, count = {}", removed.len());
        Some(ListRequest::Remove(removed))
    }
}
