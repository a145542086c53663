//! The interactive annotation surface.
//!
//! `Canvas` owns the shape collection and the builder and turns pointer and
//! keyboard input (already converted to model coordinates) into shape
//! mutations. Every entry point returns the change events produced while
//! handling that one input, coalesced per concern.

use crate::collection::ShapeCollection;
use crate::error::ProjectError;
use crate::geometry::Point;
use crate::input::{HeldButtons, Modifiers, PointerButton};
use crate::message::{CanvasEvent, ChangeBatch, IdMap, ListRequest};
use crate::model::{GraspBuilder, GraspRect, PickTolerance, ShapeId, ShapeRecord};

/// What primary clicks do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasMode {
    /// Clicks place the corners of a new rectangle.
    Create,
    /// Clicks select, drag and rotate existing rectangles.
    #[default]
    Edit,
}

impl CanvasMode {
    pub fn name(&self) -> &'static str {
        match self {
            CanvasMode::Create => "Create",
            CanvasMode::Edit => "Edit",
        }
    }
}

/// Interactive surface holding the shapes of one image.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    shapes: ShapeCollection,
    builder: GraspBuilder,
    mode: CanvasMode,
    tolerance: PickTolerance,
    pending: ChangeBatch,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas with custom pick distances.
    pub fn with_tolerance(tolerance: PickTolerance) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn shapes(&self) -> &ShapeCollection {
        &self.shapes
    }

    pub fn mode(&self) -> CanvasMode {
        self.mode
    }

    pub fn tolerance(&self) -> PickTolerance {
        self.tolerance
    }

    /// The rectangle under construction, if any.
    pub fn builder_preview(&self) -> Option<&GraspRect> {
        if self.builder.is_building() {
            self.builder.preview()
        } else {
            None
        }
    }

    /// Switch mode. Entering `Create` drops all selection and hover,
    /// entering `Edit` aborts any construction.
    pub fn set_mode(&mut self, mode: CanvasMode) -> Vec<CanvasEvent> {
        log::debug!("Canvas mode: {}", mode.name());
        self.mode = mode;
        match mode {
            CanvasMode::Create => {
                for shape in self.shapes.iter_mut() {
                    let changed = shape.reset_selected();
                    ChangeBatch::note(&mut self.pending.selection, shape.id(), changed);
                    shape.reset_hovering();
                }
            }
            CanvasMode::Edit => self.builder.reset(),
        }
        self.flush()
    }

    // ========================================================================
    // Pointer and keyboard input
    // ========================================================================

    /// Handle a button press at `pos`.
    pub fn pointer_press(
        &mut self,
        pos: Point,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> Vec<CanvasEvent> {
        if button == PointerButton::Middle {
            self.set_cursor(pos);
            return self.flush();
        }

        match self.mode {
            CanvasMode::Create => {
                self.builder.process_point(pos, Some(button));
                if let Some(rect) = self.builder.fetch_result() {
                    let added = self.shapes.insert([rect]);
                    self.pending.added.extend(added);
                }
            }
            CanvasMode::Edit if modifiers.ctrl => {
                if button == PointerButton::Primary {
                    self.select_additive(pos);
                }
            }
            CanvasMode::Edit => {
                let shape_only = button == PointerButton::Secondary;
                self.select_single(pos, shape_only);
            }
        }

        self.set_cursor(pos);
        self.flush()
    }

    /// Handle pointer motion with `held` buttons down.
    pub fn pointer_move(&mut self, pos: Point, held: HeldButtons) -> Vec<CanvasEvent> {
        if !held.middle {
            match self.mode {
                CanvasMode::Create => {
                    self.builder.process_point(pos, None);
                }
                CanvasMode::Edit if held.primary => {
                    for shape in self.shapes.iter_mut().filter(|s| s.is_visible()) {
                        let changed = shape.drag_selected(pos);
                        ChangeBatch::note(&mut self.pending.area, shape.id(), changed);
                    }
                }
                CanvasMode::Edit if held.secondary => {
                    for shape in self.shapes.iter_mut().filter(|s| s.is_visible()) {
                        let changed = shape.rotate_selected(pos);
                        ChangeBatch::note(&mut self.pending.area, shape.id(), changed);
                    }
                }
                CanvasMode::Edit => self.hover_topmost(pos),
            }
        }

        self.set_cursor(pos);
        self.flush()
    }

    /// Handle a button release at `pos`.
    pub fn pointer_release(&mut self, pos: Point, button: PointerButton) -> Vec<CanvasEvent> {
        if self.mode == CanvasMode::Edit && button == PointerButton::Primary {
            for shape in self.shapes.iter_mut() {
                shape.clear_selected_handle();
            }
            self.hover_topmost(pos);
        }
        self.flush()
    }

    /// Delete every region-selected shape.
    pub fn key_delete(&mut self) -> Vec<CanvasEvent> {
        let selected: Vec<ShapeId> = self
            .shapes
            .iter()
            .filter(|s| s.is_selected())
            .map(|s| s.id().clone())
            .collect();
        self.remove(&selected)
    }

    /// Additive pick: the topmost visible, unselected shape containing
    /// `pos` joins the selection.
    fn select_additive(&mut self, pos: Point) {
        for shape in self.shapes.iter_mut().rev() {
            if !shape.is_visible() || shape.is_selected() {
                continue;
            }
            let changed = shape.check_and_select(pos, true, &self.tolerance);
            ChangeBatch::note(&mut self.pending.selection, shape.id(), changed);
            if shape.is_selected() {
                break;
            }
        }
    }

    /// Exclusive pick: the topmost shape that selects anything wins and
    /// every other shape loses selection and hover.
    fn select_single(&mut self, pos: Point, shape_only: bool) {
        let mut winner = None;
        for (idx, shape) in self.shapes.iter_mut().enumerate().rev() {
            if !shape.is_visible() {
                continue;
            }
            let changed = shape.check_and_select(pos, shape_only, &self.tolerance);
            ChangeBatch::note(&mut self.pending.selection, shape.id(), changed);
            if shape.selected_anything() {
                winner = Some(idx);
                break;
            }
        }

        if let Some(winner) = winner {
            for (idx, shape) in self.shapes.iter_mut().enumerate() {
                if idx == winner {
                    continue;
                }
                let changed = shape.reset_selected();
                ChangeBatch::note(&mut self.pending.selection, shape.id(), changed);
                shape.reset_hovering();
            }
        }
    }

    fn hover_topmost(&mut self, pos: Point) {
        let mut winner = None;
        for (idx, shape) in self.shapes.iter_mut().enumerate().rev() {
            if !shape.is_visible() {
                continue;
            }
            shape.check_and_hover(pos, false, &self.tolerance);
            if shape.hovering_anything() {
                winner = Some(idx);
                break;
            }
        }

        if let Some(winner) = winner {
            for (idx, shape) in self.shapes.iter_mut().enumerate() {
                if idx != winner {
                    shape.reset_hovering();
                }
            }
        }
    }

    fn set_cursor(&mut self, pos: Point) {
        for shape in self.shapes.iter_mut() {
            shape.set_cursor(pos);
        }
    }

    // ========================================================================
    // Collection operations
    // ========================================================================

    /// Add shapes; ids already present are skipped.
    pub fn insert(&mut self, shapes: impl IntoIterator<Item = GraspRect>) -> Vec<CanvasEvent> {
        let added = self.shapes.insert(shapes);
        self.pending.added.extend(added);
        self.flush()
    }

    /// Remove shapes by id; unknown ids are ignored.
    pub fn remove(&mut self, ids: &[ShapeId]) -> Vec<CanvasEvent> {
        let removed = self.shapes.remove(ids);
        self.pending.removed.extend(removed);
        self.flush()
    }

    /// Remove every shape and abort any construction.
    pub fn clear(&mut self) -> Vec<CanvasEvent> {
        self.builder.reset();
        let removed = self.shapes.clear();
        self.pending.removed.extend(removed);
        self.flush()
    }

    /// Reorder shapes as requested by the list view.
    ///
    /// # Panics
    ///
    /// Panics when `old` does not describe the current order (see
    /// [`ShapeCollection::reorder`]).
    pub fn reorder(&mut self, old: &IdMap, new: &IdMap) {
        self.shapes.reorder(old, new);
    }

    pub fn change_selection(
        &mut self,
        select: &[ShapeId],
        deselect: &[ShapeId],
    ) -> Vec<CanvasEvent> {
        for (ids, selected) in [(select, true), (deselect, false)] {
            for id in ids {
                if let Some(shape) = self.shapes.get_mut(id) {
                    let changed = shape.set_selected(selected);
                    ChangeBatch::note(&mut self.pending.selection, id, changed);
                }
            }
        }
        self.flush()
    }

    pub fn set_visible(&mut self, id: &ShapeId, visible: bool) -> Vec<CanvasEvent> {
        if let Some(shape) = self.shapes.get_mut(id) {
            let changed = shape.set_visible(visible);
            ChangeBatch::note(&mut self.pending.visibility, id, changed);
        }
        self.flush()
    }

    /// Dispatch a request from the list view.
    pub fn apply_request(&mut self, request: &ListRequest) -> Vec<CanvasEvent> {
        match request {
            ListRequest::ChangeSelection { select, deselect } => {
                self.change_selection(select, deselect)
            }
            ListRequest::SetVisible { id, visible } => self.set_visible(id, *visible),
            ListRequest::Reorder { old, new } => {
                self.reorder(old, new);
                Vec::new()
            }
            ListRequest::Remove(ids) => self.remove(ids),
        }
    }

    /// Replace all shapes with the stored ones.
    ///
    /// The removal of the old shapes is reported before the stored ones are
    /// added, so a mirror sees reused ids come back. Nothing changes if any
    /// record is invalid.
    pub fn load_records(
        &mut self,
        records: &[ShapeRecord],
    ) -> Result<Vec<CanvasEvent>, ProjectError> {
        let rects = records
            .iter()
            .map(ShapeRecord::to_rect)
            .collect::<Result<Vec<_>, _>>()?;

        let mut events = self.clear();
        let added = self.shapes.insert(rects);
        self.pending.added.extend(added);
        events.extend(self.flush());
        Ok(events)
    }

    /// Export records of all shapes, bottom to top.
    pub fn export_records(&self) -> Vec<ShapeRecord> {
        self.shapes.iter().map(GraspRect::to_record).collect()
    }

    // ========================================================================
    // Event flushing
    // ========================================================================

    /// Turn the pending changes into events, in the order added, removed,
    /// selection, visibility, area.
    fn flush(&mut self) -> Vec<CanvasEvent> {
        let batch = std::mem::take(&mut self.pending);
        if batch.is_empty() {
            return Vec::new();
        }
        let mut events = Vec::new();

        if !batch.added.is_empty() {
            log::info!(
                "Emit shapes added, ids = {:?}",
                id_strs(batch.added.iter().map(|s| s.id()))
            );
            events.push(CanvasEvent::ShapesAdded(batch.added));
        }

        if !batch.removed.is_empty() {
            log::info!("Emit shapes removed, ids = {:?}", id_strs(batch.removed.iter()));
            events.push(CanvasEvent::ShapesRemoved(batch.removed));
        }

        let mut selected = Vec::new();
        let mut deselected = Vec::new();
        for shape in self.shapes.iter().filter(|s| batch.selection.contains(s.id())) {
            if shape.is_selected() {
                selected.push(shape.id().clone());
            } else {
                deselected.push(shape.id().clone());
            }
        }
        if !selected.is_empty() || !deselected.is_empty() {
            log::info!(
                "Emit selection changed, select = {:?}, deselect = {:?}",
                id_strs(selected.iter()),
                id_strs(deselected.iter())
            );
            events.push(CanvasEvent::SelectionChanged {
                selected,
                deselected,
            });
        }

        let visibility: Vec<(ShapeId, bool)> = self
            .shapes
            .iter()
            .filter(|s| batch.visibility.contains(s.id()))
            .map(|s| (s.id().clone(), s.is_visible()))
            .collect();
        if !visibility.is_empty() {
            log::debug!("Emit visibility changed for {} shapes", visibility.len());
            events.push(CanvasEvent::VisibilityChanged(visibility));
        }

        let modified: Vec<GraspRect> = self
            .shapes
            .iter()
            .filter(|s| batch.area.contains(s.id()))
            .cloned()
            .collect();
        if !modified.is_empty() {
            log::debug!("Emit area changed, ids = {:?}", id_strs(modified.iter().map(|s| s.id())));
            events.push(CanvasEvent::AreaChanged(modified));
        }

        events
    }
}

fn id_strs<'a>(ids: impl Iterator<Item = &'a ShapeId>) -> Vec<&'a str> {
    ids.map(ShapeId::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn rect_at(id: &str, x: f64) -> GraspRect {
        GraspRect::with_id(
            ShapeId::from(id),
            [
                Point::new(x, 0.0),
                Point::new(x + 10.0, 0.0),
                Point::new(x + 10.0, 5.0),
                Point::new(x, 5.0),
            ],
        )
    }

    /// `a` at x 0..10, `b` at x 20..30.
    fn canvas_ab() -> Canvas {
        let mut canvas = Canvas::new();
        canvas.insert([rect_at("a", 0.0), rect_at("b", 20.0)]);
        canvas
    }

    fn id(s: &str) -> ShapeId {
        ShapeId::from(s)
    }

    fn press(canvas: &mut Canvas, x: f64, y: f64) -> Vec<CanvasEvent> {
        canvas.pointer_press(Point::new(x, y), PointerButton::Primary, Modifiers::NONE)
    }

    #[test]
    fn test_create_mode_builds_and_inserts() {
        let mut canvas = Canvas::new();
        assert!(canvas.set_mode(CanvasMode::Create).is_empty());

        assert!(press(&mut canvas, 0.0, 0.0).is_empty());
        canvas.pointer_move(Point::new(10.0, 0.0), HeldButtons::NONE);
        press(&mut canvas, 10.0, 0.0);
        canvas.pointer_move(Point::new(10.0, 5.0), HeldButtons::NONE);
        assert!(canvas.builder_preview().is_some());

        let events = press(&mut canvas, 10.0, 5.0);
        assert_eq!(events.len(), 1);
        match &events[0] {
            CanvasEvent::ShapesAdded(shapes) => {
                assert_eq!(shapes.len(), 1);
                assert!(approx_eq(shapes[0].params().size, 10.0));
                assert!(approx_eq(shapes[0].params().opening, 5.0));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(canvas.shapes().len(), 1);
        assert!(canvas.builder_preview().is_none());
    }

    #[test]
    fn test_insert_reports_only_new_shapes() {
        let mut canvas = canvas_ab();
        assert!(canvas.insert([rect_at("a", 0.0)]).is_empty());
    }

    #[test]
    fn test_click_selects_and_deselects() {
        let mut canvas = canvas_ab();

        let events = press(&mut canvas, 5.0, 2.5);
        assert_eq!(
            events,
            vec![CanvasEvent::SelectionChanged {
                selected: vec![id("a")],
                deselected: vec![],
            }]
        );

        // Clicking b moves the selection
        let events = press(&mut canvas, 25.0, 2.5);
        assert_eq!(
            events,
            vec![CanvasEvent::SelectionChanged {
                selected: vec![id("b")],
                deselected: vec![id("a")],
            }]
        );

        // Clicking empty space clears it
        let events = press(&mut canvas, 50.0, 50.0);
        assert_eq!(
            events,
            vec![CanvasEvent::SelectionChanged {
                selected: vec![],
                deselected: vec![id("b")],
            }]
        );

        // Nothing left to change
        assert!(press(&mut canvas, 50.0, 50.0).is_empty());
    }

    #[test]
    fn test_topmost_shape_wins() {
        let mut canvas = Canvas::new();
        canvas.insert([rect_at("a", 0.0), rect_at("c", 5.0)]);

        press(&mut canvas, 7.0, 2.5);
        assert!(!canvas.shapes().get(&id("a")).unwrap().is_selected());
        assert!(canvas.shapes().get(&id("c")).unwrap().is_selected());
    }

    #[test]
    fn test_ctrl_click_extends_selection() {
        let mut canvas = canvas_ab();
        let ctrl_press = |canvas: &mut Canvas, x: f64| {
            canvas.pointer_press(Point::new(x, 2.5), PointerButton::Primary, Modifiers::CTRL)
        };

        ctrl_press(&mut canvas, 5.0);
        let events = ctrl_press(&mut canvas, 25.0);
        assert_eq!(
            events,
            vec![CanvasEvent::SelectionChanged {
                selected: vec![id("b")],
                deselected: vec![],
            }]
        );
        assert!(canvas.shapes().iter().all(|s| s.is_selected()));

        // Ctrl-click on empty space keeps the selection
        assert!(ctrl_press(&mut canvas, 50.0).is_empty());
    }

    #[test]
    fn test_drag_moves_selected_shape() {
        let mut canvas = canvas_ab();
        press(&mut canvas, 5.0, 2.5);

        let events =
            canvas.pointer_move(Point::new(7.0, 3.5), HeldButtons::only(PointerButton::Primary));
        assert_eq!(events.len(), 1);
        match &events[0] {
            CanvasEvent::AreaChanged(shapes) => {
                assert_eq!(shapes.len(), 1);
                assert_eq!(shapes[0].id(), &id("a"));
                let center = shapes[0].params().center;
                assert!(approx_eq(center.x, 7.0) && approx_eq(center.y, 3.5));
            }
            other => panic!("unexpected event {other:?}"),
        }

        // b did not move
        let b = canvas.shapes().get(&id("b")).unwrap();
        assert!(approx_eq(b.params().center.x, 25.0));
    }

    #[test]
    fn test_release_drops_handle_pick() {
        let mut canvas = canvas_ab();
        press(&mut canvas, 10.0, 5.0);
        assert!(canvas.shapes().get(&id("a")).unwrap().selected_handle().is_some());

        canvas.pointer_release(Point::new(10.0, 5.0), PointerButton::Primary);
        let a = canvas.shapes().get(&id("a")).unwrap();
        assert!(a.selected_handle().is_none());
        assert!(a.is_selected());
        assert!(a.hovering_anything());
    }

    #[test]
    fn test_hover_follows_pointer() {
        let mut canvas = canvas_ab();
        assert!(canvas.pointer_move(Point::new(25.0, 2.5), HeldButtons::NONE).is_empty());
        assert!(canvas.shapes().get(&id("b")).unwrap().is_hovering());
        assert!(!canvas.shapes().get(&id("a")).unwrap().is_hovering());
    }

    #[test]
    fn test_delete_key_removes_selected() {
        let mut canvas = canvas_ab();
        press(&mut canvas, 5.0, 2.5);
        let events = canvas.key_delete();
        assert_eq!(events, vec![CanvasEvent::ShapesRemoved(vec![id("a")])]);
        assert_eq!(canvas.shapes().ids(), vec![id("b")]);

        assert!(canvas.key_delete().is_empty());
    }

    #[test]
    fn test_entering_create_mode_clears_selection() {
        let mut canvas = canvas_ab();
        press(&mut canvas, 5.0, 2.5);
        let events = canvas.set_mode(CanvasMode::Create);
        assert_eq!(
            events,
            vec![CanvasEvent::SelectionChanged {
                selected: vec![],
                deselected: vec![id("a")],
            }]
        );
    }

    #[test]
    fn test_entering_edit_mode_aborts_construction() {
        let mut canvas = Canvas::new();
        canvas.set_mode(CanvasMode::Create);
        press(&mut canvas, 0.0, 0.0);
        canvas.pointer_move(Point::new(10.0, 0.0), HeldButtons::NONE);
        assert!(canvas.builder_preview().is_some());

        canvas.set_mode(CanvasMode::Edit);
        assert!(canvas.builder_preview().is_none());
    }

    #[test]
    fn test_hidden_shape_cannot_be_picked() {
        let mut canvas = canvas_ab();
        let events = canvas.apply_request(&ListRequest::SetVisible {
            id: id("a"),
            visible: false,
        });
        assert_eq!(
            events,
            vec![CanvasEvent::VisibilityChanged(vec![(id("a"), false)])]
        );
        assert!(press(&mut canvas, 5.0, 2.5).is_empty());
    }

    #[test]
    fn test_list_selection_request() {
        let mut canvas = canvas_ab();
        let events = canvas.apply_request(&ListRequest::ChangeSelection {
            select: vec![id("b"), id("missing")],
            deselect: vec![],
        });
        assert_eq!(
            events,
            vec![CanvasEvent::SelectionChanged {
                selected: vec![id("b")],
                deselected: vec![],
            }]
        );
    }

    #[test]
    #[should_panic]
    fn test_stale_reorder_request_panics() {
        let mut canvas = canvas_ab();
        let old: IdMap = [(id("a"), 1), (id("b"), 0)].into_iter().collect();
        let new: IdMap = [(id("a"), 1), (id("b"), 2)].into_iter().collect();
        canvas.apply_request(&ListRequest::Reorder { old, new });
    }

    #[test]
    fn test_load_records_replaces_shapes() {
        let mut canvas = canvas_ab();
        let records = vec![rect_at("z", 100.0).to_record()];

        let events = canvas.load_records(&records).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], CanvasEvent::ShapesRemoved(vec![id("a"), id("b")]));
        assert!(matches!(&events[1], CanvasEvent::ShapesAdded(s) if s.len() == 1));
        assert_eq!(canvas.shapes().ids(), vec![id("z")]);

        let exported = canvas.export_records();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].id, Some(id("z")));
    }

    #[test]
    fn test_reloading_same_ids_keeps_list_in_sync() {
        let mut canvas = canvas_ab();
        let mut list = crate::shape_list::ShapeList::new();
        list.apply(&CanvasEvent::ShapesAdded(canvas.shapes().as_slice().to_vec()));

        let records = canvas.export_records();
        let events = canvas.load_records(&records).unwrap();
        assert_eq!(events[0], CanvasEvent::ShapesRemoved(vec![id("a"), id("b")]));
        for event in &events {
            list.apply(event);
        }

        assert_eq!(canvas.shapes().ids(), vec![id("a"), id("b")]);
        assert_eq!(list.id_map(), canvas.shapes().id_map());
    }

    #[test]
    fn test_invalid_records_leave_canvas_untouched() {
        let mut canvas = canvas_ab();
        let mut record = rect_at("z", 100.0).to_record();
        record.points.pop();

        assert!(canvas.load_records(&[record]).is_err());
        assert_eq!(canvas.shapes().len(), 2);
    }
}
