//! Messages exchanged between the canvas and the shape list.
//!
//! The canvas reports what changed during one input event as a short list of
//! `CanvasEvent`s. The list view answers with `ListRequest`s; it never
//! touches shape geometry itself.

use std::collections::{HashMap, HashSet};

use crate::model::{GraspRect, ShapeId};

/// Shape id to position in the ordered collection.
pub type IdMap = HashMap<ShapeId, usize>;

/// Change notification emitted by the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Newly inserted shapes, in insertion order.
    ShapesAdded(Vec<GraspRect>),
    /// Ids of shapes that were actually removed.
    ShapesRemoved(Vec<ShapeId>),
    /// Region selection flipped on or off.
    SelectionChanged {
        selected: Vec<ShapeId>,
        deselected: Vec<ShapeId>,
    },
    /// Visibility flipped, with the new value.
    VisibilityChanged(Vec<(ShapeId, bool)>),
    /// Shapes whose corners moved, as they are now.
    AreaChanged(Vec<GraspRect>),
}

impl CanvasEvent {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            CanvasEvent::ShapesAdded(_) => "shapes added",
            CanvasEvent::ShapesRemoved(_) => "shapes removed",
            CanvasEvent::SelectionChanged { .. } => "selection changed",
            CanvasEvent::VisibilityChanged(_) => "visibility changed",
            CanvasEvent::AreaChanged(_) => "area changed",
        }
    }

    /// Whether the event changes what gets saved.
    pub fn modifies_content(&self) -> bool {
        matches!(
            self,
            CanvasEvent::ShapesAdded(_)
                | CanvasEvent::ShapesRemoved(_)
                | CanvasEvent::AreaChanged(_)
        )
    }
}

/// Request from the list view to the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum ListRequest {
    ChangeSelection {
        select: Vec<ShapeId>,
        deselect: Vec<ShapeId>,
    },
    SetVisible {
        id: ShapeId,
        visible: bool,
    },
    /// Reorder shapes; `old` must equal the canvas's current order.
    Reorder {
        old: IdMap,
        new: IdMap,
    },
    Remove(Vec<ShapeId>),
}

/// Changes collected while handling one input event.
///
/// Each concern is deduplicated by id. Turning this into events happens in
/// the canvas, which knows the final state of every shape.
#[derive(Debug, Clone, Default)]
pub struct ChangeBatch {
    pub added: Vec<GraspRect>,
    pub removed: Vec<ShapeId>,
    pub selection: HashSet<ShapeId>,
    pub visibility: HashSet<ShapeId>,
    pub area: HashSet<ShapeId>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` under `set` when `changed` is true.
    pub fn note(set: &mut HashSet<ShapeId>, id: &ShapeId, changed: bool) {
        if changed {
            set.insert(id.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.selection.is_empty()
            && self.visibility.is_empty()
            && self.area.is_empty()
    }
}
