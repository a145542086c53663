//! The interactive grasp rectangle.
//!
//! A `GraspRect` couples a `GraspParams` pose with its cached corners and
//! the interaction state the canvas needs: visibility, region/vertex/edge
//! selection, hover, and the last cursor position used by move and rotate
//! drags.
//!
//! Every mutator reports whether it changed observable state, so the caller
//! can batch change notifications per input event.

use crate::constants::{
    EDGE_SELECT_TOLERANCE, FILL_ALPHA, FILL_HOVERING_ALPHA, FILL_SELECTED_ALPHA,
    VERTEX_SELECT_TOLERANCE,
};
use crate::geometry::{
    Point, distance_point_to_segment, nearest_point, normalize_angle, point_in_polygon,
    project_point_onto_line,
};
use crate::model::grasp::{Corners, Edge, GraspParams, edges_of};
use crate::model::shape_id::ShapeId;

/// A pickable sub-element of a rectangle.
///
/// A vertex and an edge can never be picked at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    /// Corner index 0..4.
    Vertex(usize),
    /// Edge index 0..4, edge `i` runs from corner `i` to corner `i + 1`.
    Edge(usize),
}

/// Distances under which a vertex or an edge counts as hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickTolerance {
    pub vertex: f64,
    pub edge: f64,
}

impl Default for PickTolerance {
    fn default() -> Self {
        Self {
            vertex: VERTEX_SELECT_TOLERANCE,
            edge: EDGE_SELECT_TOLERANCE,
        }
    }
}

/// Result of testing a point against a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitTest {
    /// The point lies inside the rectangle.
    pub inside: bool,
    /// Nearest vertex or edge within tolerance (vertex wins).
    pub handle: Option<Handle>,
}

impl HitTest {
    /// True if the point is inside or close to a vertex or edge.
    pub fn near(&self) -> bool {
        self.inside || self.handle.is_some()
    }

    pub fn vertex(&self) -> Option<usize> {
        match self.handle {
            Some(Handle::Vertex(i)) => Some(i),
            _ => None,
        }
    }

    pub fn edge(&self) -> Option<usize> {
        match self.handle {
            Some(Handle::Edge(i)) => Some(i),
            _ => None,
        }
    }
}

/// An oriented grasp rectangle with interaction state.
#[derive(Debug, Clone, PartialEq)]
pub struct GraspRect {
    id: ShapeId,
    params: GraspParams,
    corners: Corners,

    visible: bool,

    selected: bool,
    selected_handle: Option<Handle>,

    hovering: bool,
    hovering_handle: Option<Handle>,

    prev_cursor: Option<Point>,
}

impl GraspRect {
    /// Create a rectangle with a fresh id from four corners.
    pub fn new(corners: Corners) -> Self {
        Self::with_id(ShapeId::generate(), corners)
    }

    /// Create a rectangle with a known id, e.g. one read from storage.
    pub fn with_id(id: ShapeId, corners: Corners) -> Self {
        Self::from_params_with_id(id, GraspParams::from_corners(&corners))
    }

    /// Create a rectangle with a fresh id from a pose.
    pub fn from_params(params: GraspParams) -> Self {
        Self::from_params_with_id(ShapeId::generate(), params)
    }

    fn from_params_with_id(id: ShapeId, params: GraspParams) -> Self {
        Self {
            id,
            params,
            corners: params.to_corners(),
            visible: true,
            selected: false,
            selected_handle: None,
            hovering: false,
            hovering_handle: None,
            prev_cursor: None,
        }
    }

    /// Zero-sized rectangle at the origin.
    pub fn empty() -> Self {
        Self::from_params(GraspParams::default())
    }

    /// Copy the geometry into a new, unselected rectangle.
    ///
    /// With `new_id` the copy gets a fresh identity, otherwise it shares this
    /// rectangle's id.
    pub fn duplicate(&self, new_id: bool) -> Self {
        let id = if new_id {
            ShapeId::generate()
        } else {
            self.id.clone()
        };
        Self::from_params_with_id(id, self.params)
    }

    pub fn id(&self) -> &ShapeId {
        &self.id
    }

    pub fn params(&self) -> GraspParams {
        self.params
    }

    pub fn corners(&self) -> Corners {
        self.corners
    }

    pub fn edges(&self) -> [Edge; 4] {
        edges_of(&self.corners)
    }

    // ========================================================================
    // Geometry mutation
    // ========================================================================

    /// Replace the geometry from four corners.
    ///
    /// The corners are normalized through the parameter model. Returns true
    /// if the stored corners changed.
    pub fn set_corners(&mut self, corners: &Corners) -> bool {
        if self.corners == *corners {
            return false;
        }
        self.set_params(GraspParams::from_corners(corners))
    }

    /// Replace the pose. Returns true if the corners changed.
    pub fn set_params(&mut self, params: GraspParams) -> bool {
        if self.params == params {
            return false;
        }
        let corners = params.to_corners();
        self.params = params;
        let changed = corners != self.corners;
        self.corners = corners;
        changed
    }

    // ========================================================================
    // Visibility, selection, hover
    // ========================================================================

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns true if visibility changed.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        true
    }

    /// Whether the region itself is selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Returns true if the region selection changed.
    pub fn set_selected(&mut self, selected: bool) -> bool {
        if self.selected == selected {
            return false;
        }
        self.selected = selected;
        true
    }

    pub fn selected_handle(&self) -> Option<Handle> {
        self.selected_handle
    }

    /// Region, vertex or edge selected.
    pub fn selected_anything(&self) -> bool {
        self.selected || self.selected_handle.is_some()
    }

    /// Drop the vertex/edge pick but keep region selection.
    pub fn clear_selected_handle(&mut self) {
        self.selected_handle = None;
    }

    /// Deselect everything. Returns true if the region selection changed.
    pub fn reset_selected(&mut self) -> bool {
        self.selected_handle = None;
        self.set_selected(false)
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn hovering_handle(&self) -> Option<Handle> {
        self.hovering_handle
    }

    pub fn hovering_anything(&self) -> bool {
        self.hovering || self.hovering_handle.is_some()
    }

    pub fn reset_hovering(&mut self) {
        self.hovering = false;
        self.hovering_handle = None;
    }

    /// Record the pointer position used as the reference of the next move
    /// or rotate update.
    pub fn set_cursor(&mut self, pos: Point) {
        self.prev_cursor = Some(pos);
    }

    // ========================================================================
    // Hit testing
    // ========================================================================

    pub fn nearest_vertex(&self, pos: Point) -> (usize, f64) {
        nearest_point(&self.corners, pos).unwrap_or((0, f64::INFINITY))
    }

    pub fn nearest_edge(&self, pos: Point) -> (usize, f64) {
        self.edges()
            .iter()
            .map(|(a, b)| distance_point_to_segment(*a, *b, pos))
            .enumerate()
            .fold((0, f64::INFINITY), |best, (i, d)| {
                if d < best.1 { (i, d) } else { best }
            })
    }

    pub fn contains(&self, pos: Point) -> bool {
        point_in_polygon(&self.corners, pos)
    }

    /// Classify `pos` against the rectangle.
    ///
    /// Vertices take priority over edges; containment is tested independently.
    pub fn hit_test(&self, pos: Point, tolerance: &PickTolerance) -> HitTest {
        let (vertex, vertex_dist) = self.nearest_vertex(pos);
        let handle = if vertex_dist < tolerance.vertex {
            Some(Handle::Vertex(vertex))
        } else {
            let (edge, edge_dist) = self.nearest_edge(pos);
            (edge_dist < tolerance.edge).then_some(Handle::Edge(edge))
        };

        HitTest {
            inside: self.contains(pos),
            handle,
        }
    }

    /// Update selection from a pointer press.
    ///
    /// With `shape_only` only containment counts and any vertex/edge pick is
    /// dropped; otherwise vertices and edges can be picked too. Invisible
    /// rectangles are left untouched. Returns true if the region selection
    /// changed.
    pub fn check_and_select(
        &mut self,
        pos: Point,
        shape_only: bool,
        tolerance: &PickTolerance,
    ) -> bool {
        if !self.visible {
            return false;
        }

        if shape_only {
            self.selected_handle = None;
            let inside = self.contains(pos);
            self.set_selected(inside)
        } else {
            let hit = self.hit_test(pos, tolerance);
            self.selected_handle = hit.handle;
            self.set_selected(hit.near())
        }
    }

    /// Update hover state from a pointer position. Invisible rectangles are
    /// left untouched.
    pub fn check_and_hover(&mut self, pos: Point, shape_only: bool, tolerance: &PickTolerance) {
        if !self.visible {
            return;
        }

        if shape_only {
            self.hovering_handle = None;
            self.hovering = self.contains(pos);
        } else {
            let hit = self.hit_test(pos, tolerance);
            self.hovering_handle = hit.handle;
            self.hovering = hit.near();
        }
    }

    // ========================================================================
    // Drag updates
    // ========================================================================

    /// Apply a primary-button drag to whatever is selected: a vertex, else
    /// an edge, else the whole region. Returns true if the corners changed.
    pub fn drag_selected(&mut self, pos: Point) -> bool {
        match self.selected_handle {
            Some(Handle::Vertex(i)) => self.move_vertex(i, pos),
            Some(Handle::Edge(i)) => self.move_edge(i, pos),
            None if self.selected => self.move_whole(pos),
            None => false,
        }
    }

    /// Apply a secondary-button drag: rotate if the region is selected.
    pub fn rotate_selected(&mut self, pos: Point) -> bool {
        if self.selected {
            self.rotate_whole(pos)
        } else {
            false
        }
    }

    /// Resize by dragging corner `index`, pivoting on the diagonal corner.
    ///
    /// The distance from `pos` to the pivot's opening-axis line becomes the
    /// new size and the distance to its size-axis line the new opening.
    pub fn move_vertex(&mut self, index: usize, pos: Point) -> bool {
        let pivot = self.corners[(index + 2) % 4];
        let opening_line = (pivot, pivot + self.params.opening_axis());
        let size_line = (pivot, pivot + self.params.size_axis());

        let size = project_point_onto_line(opening_line.0, opening_line.1, pos).distance;
        let opening = project_point_onto_line(size_line.0, size_line.1, pos).distance;

        self.set_params(GraspParams {
            center: pos.midpoint(pivot),
            size,
            opening,
            angle: self.params.angle,
        })
    }

    /// Resize by dragging edge `index`; the opposite edge stays in place.
    ///
    /// Even edges (e0, e2) control the opening, odd edges the size.
    pub fn move_edge(&mut self, index: usize, pos: Point) -> bool {
        let opposite = (index + 2) % 4;
        let anchor = self.corners[opposite];
        let opposite_mid = anchor.midpoint(self.corners[(opposite + 1) % 4]);

        let mut params = self.params;
        if opposite % 2 == 0 {
            let proj = project_point_onto_line(anchor, anchor + params.size_axis(), pos);
            params.opening = proj.distance;
            params.center = opposite_mid + proj.offset / 2.0;
        } else {
            let proj = project_point_onto_line(anchor, anchor + params.opening_axis(), pos);
            params.size = proj.distance;
            params.center = opposite_mid + proj.offset / 2.0;
        }
        self.set_params(params)
    }

    /// Translate by the pointer motion since the last recorded cursor.
    pub fn move_whole(&mut self, pos: Point) -> bool {
        let prev = *self.prev_cursor.get_or_insert(pos);
        let mut params = self.params;
        params.center += pos - prev;
        self.set_params(params)
    }

    /// Rotate about the center by the pointer's angular motion since the
    /// last recorded cursor.
    pub fn rotate_whole(&mut self, pos: Point) -> bool {
        let prev = *self.prev_cursor.get_or_insert(pos);
        let center = self.params.center;

        // Bearings are measured from the +y axis
        let bearing = |p: Point| (p.x - center.x).atan2(p.y - center.y);
        let delta = normalize_angle(bearing(pos) - bearing(prev));

        let mut params = self.params;
        params.angle = normalize_angle(params.angle - delta);
        self.set_params(params)
    }

    // ========================================================================
    // Display hints
    // ========================================================================

    /// Fill hue in degrees, `[0, 360)`, derived from the angle.
    pub fn fill_hue(&self) -> u32 {
        let degrees = self.params.angle.to_degrees().trunc() as i64;
        (degrees.rem_euclid(180) * 2) as u32
    }

    /// Fill opacity for the current selection/hover state.
    pub fn fill_alpha(&self) -> f32 {
        if self.selected {
            FILL_SELECTED_ALPHA
        } else if self.hovering {
            FILL_HOVERING_ALPHA
        } else {
            FILL_ALPHA
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
