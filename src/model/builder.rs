//! Click-by-click construction of a grasp rectangle.
//!
//! The first primary click anchors corner 0, the second fixes the size edge
//! `p0–p1` (and with it the angle), the third fixes the opening and finishes
//! the shape. Pointer motion in between updates a live preview. A secondary
//! click aborts at any stage.

use crate::constants::MIN_BUILD_DISTANCE;
use crate::geometry::{Point, project_point_onto_line};
use crate::input::PointerButton;
use crate::model::grasp::Corners;
use crate::model::rect::GraspRect;

/// How far construction has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildStage {
    /// Nothing placed yet.
    #[default]
    Empty,
    /// Corner 0 placed; the pointer drags corner 1.
    FirstCorner,
    /// Edge `p0–p1` placed; the pointer drags the opposite edge.
    FirstEdge,
    /// Shape complete, waiting to be fetched.
    Finished,
}

impl BuildStage {
    /// Number of determined clicks (the finishing click counts double).
    pub fn determined(&self) -> u8 {
        match self {
            BuildStage::Empty => 0,
            BuildStage::FirstCorner => 1,
            BuildStage::FirstEdge => 2,
            BuildStage::Finished => 4,
        }
    }
}

/// State machine that turns pointer input into a `GraspRect`.
#[derive(Debug, Clone)]
pub struct GraspBuilder {
    corners: Corners,
    stage: BuildStage,
    preview: GraspRect,
}

impl Default for GraspBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraspBuilder {
    pub fn new() -> Self {
        Self {
            corners: [Point::ZERO; 4],
            stage: BuildStage::Empty,
            preview: GraspRect::empty(),
        }
    }

    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    /// Raw corners as placed by the pointer, before normalization.
    pub fn corners(&self) -> Corners {
        self.corners
    }

    /// A shape is under construction.
    pub fn is_building(&self) -> bool {
        matches!(self.stage, BuildStage::FirstCorner | BuildStage::FirstEdge)
    }

    pub fn is_finished(&self) -> bool {
        self.stage == BuildStage::Finished
    }

    /// The live shape, while something has been placed.
    pub fn preview(&self) -> Option<&GraspRect> {
        (self.stage != BuildStage::Empty).then_some(&self.preview)
    }

    /// Feed a pointer position. `button` is the pressed button for a click,
    /// or `None` for plain motion.
    pub fn process_point(&mut self, pos: Point, button: Option<PointerButton>) -> BuildStage {
        if button == Some(PointerButton::Secondary) {
            self.stage = BuildStage::Empty;
            return self.stage;
        }
        let primary = button == Some(PointerButton::Primary);

        match self.stage {
            BuildStage::Empty => {
                self.corners = [pos; 4];
                if primary {
                    self.stage = BuildStage::FirstCorner;
                }
            }
            BuildStage::FirstCorner => {
                self.corners[1] = pos;
                self.corners[2] = pos;
                self.corners[3] = self.corners[0];

                let length = self.corners[1].distance_to(self.corners[0]);
                if primary && length > MIN_BUILD_DISTANCE {
                    self.stage = BuildStage::FirstEdge;
                }
            }
            BuildStage::FirstEdge => {
                let proj = project_point_onto_line(self.corners[0], self.corners[1], pos);
                self.corners[2] = self.corners[1] + proj.offset;
                self.corners[3] = self.corners[0] + proj.offset;

                if primary && proj.distance > MIN_BUILD_DISTANCE {
                    self.stage = BuildStage::Finished;
                }
            }
            BuildStage::Finished => {}
        }

        self.preview.set_corners(&self.corners);
        self.stage
    }

    /// Abort and start over with a fresh preview.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Take the finished shape and reset. Returns `None` unless finished.
    pub fn fetch_result(&mut self) -> Option<GraspRect> {
        if !self.is_finished() {
            return None;
        }
        let result = std::mem::replace(&mut self.preview, GraspRect::empty());
        self.reset();
        Some(result)
    }
}
