//! Grasp annotation data model.

mod builder;
mod grasp;
mod record;
mod rect;
mod shape_id;

pub use builder::{BuildStage, GraspBuilder};
pub use grasp::{Corners, Edge, GraspParams, edges_of};
pub use record::ShapeRecord;
pub use rect::{GraspRect, Handle, HitTest, PickTolerance};
pub use shape_id::ShapeId;
