//! Persisted form of a grasp rectangle.

use serde::{Deserialize, Serialize};

use crate::error::ProjectError;
use crate::model::grasp::Corners;
use crate::model::rect::GraspRect;
use crate::model::shape_id::ShapeId;

/// One stored shape.
///
/// Both the corners and the derived pose are written. On import only `id`
/// and `points` are read; a missing id is regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ShapeId>,
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub center: [f64; 2],
    #[serde(default)]
    pub gripper_size: f64,
    #[serde(default)]
    pub gripper_open: f64,
    #[serde(default)]
    pub angle: f64,
}

impl ShapeRecord {
    /// Rebuild the rectangle from the stored corners.
    pub fn to_rect(&self) -> Result<GraspRect, ProjectError> {
        let corners: Corners = match self.points.as_slice() {
            [a, b, c, d] => [(*a).into(), (*b).into(), (*c).into(), (*d).into()],
            other => {
                return Err(ProjectError::invalid_shape(format!(
                    "expected 4 points, found {}",
                    other.len()
                )));
            }
        };
        if corners.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(ProjectError::invalid_shape("non-finite coordinate"));
        }

        Ok(match &self.id {
            Some(id) => GraspRect::with_id(id.clone(), corners),
            None => GraspRect::new(corners),
        })
    }
}

impl From<&GraspRect> for ShapeRecord {
    fn from(rect: &GraspRect) -> Self {
        let params = rect.params();
        Self {
            id: Some(rect.id().clone()),
            points: rect.corners().iter().map(|p| p.to_array()).collect(),
            center: params.center.to_array(),
            gripper_size: params.size,
            gripper_open: params.opening,
            angle: params.angle,
        }
    }
}

impl GraspRect {
    /// Export record of this rectangle.
    pub fn to_record(&self) -> ShapeRecord {
        ShapeRecord::from(self)
    }

    pub fn from_record(record: &ShapeRecord) -> Result<Self, ProjectError> {
        record.to_rect()
    }
}
