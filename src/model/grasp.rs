//! Grasp pose parameters and their corner representation.
//!
//! ```text
//!     p3          ^   e2      p2
//!     ------------|------------
//!     |           | angle     |
//!  e3 |    center |-----------|-e1-> opening
//!     |                       |
//!     -------------------------
//!     p0   e0     size        p1
//! ```
//!
//! `size` is the gripper extent (edges e0/e2), `opening` the gripper stroke
//! (edges e1/e3). `angle` is the direction of the opening axis.

use std::f64::consts::FRAC_PI_2;

use crate::geometry::{Point, normalize_angle};

/// The four corners of a grasp rectangle, in winding order.
pub type Corners = [Point; 4];

/// A corner-to-corner segment.
pub type Edge = (Point, Point);

/// Canonical grasp pose.
///
/// Equality is exact field-wise comparison. It is only used to suppress
/// redundant change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GraspParams {
    pub center: Point,
    /// Gripper extent, `|p0 - p1|`.
    pub size: f64,
    /// Gripper opening, `|p1 - p2|`.
    pub opening: f64,
    /// Radians in `(-π, π]`.
    pub angle: f64,
}

impl GraspParams {
    pub fn new(center: Point, size: f64, opening: f64, angle: f64) -> Self {
        Self {
            center,
            size,
            opening,
            angle,
        }
    }

    /// Derive parameters from four corners.
    ///
    /// The longer of the two edge pairs decides how the angle is read: if
    /// the opening edge `p1→p2` is longer it gives the angle directly,
    /// otherwise the size edge `p0→p1` is rotated by +90°.
    pub fn from_corners(corners: &Corners) -> Self {
        let [p0, p1, p2, p3] = *corners;
        let center = (p0 + p1 + p2 + p3) / 4.0;
        let size = p0.distance_to(p1);
        let opening = p1.distance_to(p2);

        let angle = if opening > size {
            normalize_angle((p2 - p1).angle())
        } else {
            normalize_angle((p1 - p0).angle() + FRAC_PI_2)
        };

        Self {
            center,
            size,
            opening,
            angle,
        }
    }

    /// Compute the corners; exact inverse of [`GraspParams::from_corners`].
    pub fn to_corners(&self) -> Corners {
        let open_half = self.opening_axis() * (self.opening / 2.0);
        let size_half = self.size_axis() * (self.size / 2.0);

        let upper = open_half + size_half;
        let lower = open_half - size_half;

        [
            self.center - lower,
            self.center - upper,
            self.center + lower,
            self.center + upper,
        ]
    }

    /// Unit vector along the opening axis.
    pub fn opening_axis(&self) -> Point {
        Point::from_angle(self.angle)
    }

    /// Unit vector along the size axis.
    pub fn size_axis(&self) -> Point {
        Point::from_angle(self.angle + FRAC_PI_2)
    }
}

/// Edges `(p_i, p_{i+1})` of a corner set, closing back to `p0`.
pub fn edges_of(corners: &Corners) -> [Edge; 4] {
    std::array::from_fn(|i| (corners[i], corners[(i + 1) % 4]))
}
