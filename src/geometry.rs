//! Planar geometry helpers.
//!
//! This module provides the stateless building blocks used by the grasp
//! model and its interaction code:
//! - `Point`, a 2D vector in model (image) coordinates
//! - Projection of a point onto a line and distance to a segment
//! - Angle normalization into `(-π, π]`
//! - Point-in-polygon containment

use std::f64::consts::PI;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use crate::constants::MIN_LINE_NORM_SQUARED;

// ============================================================================
// Point
// ============================================================================

/// A 2D point (or vector) in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians).
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self - other).length()
    }

    /// Midpoint between `self` and `other`.
    pub fn midpoint(self, other: Point) -> Point {
        (self + other) / 2.0
    }

    /// Bearing of this vector, `atan2(y, x)`.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

impl From<(f64, f64)> for Point {
    fn from(p: (f64, f64)) -> Self {
        Self::new(p.0, p.1)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

// ============================================================================
// Line helpers
// ============================================================================

/// Decomposition of a point relative to a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineProjection {
    /// Component of `p - a` perpendicular to the line, pointing towards `p`.
    pub offset: Point,
    /// Length of `offset`.
    pub distance: f64,
    /// Foot of the perpendicular from `p` onto the line.
    pub foot: Point,
}

/// Project `p` onto the infinite line through `a` and `b`.
///
/// When `a` and `b` (nearly) coincide the squared line length is floored at
/// `MIN_LINE_NORM_SQUARED`, so the result is an approximation rather than an
/// error.
pub fn project_point_onto_line(a: Point, b: Point, p: Point) -> LineProjection {
    let line = b - a;
    let to_point = p - a;

    let norm_squared = line.length_squared().max(MIN_LINE_NORM_SQUARED);
    let along = line * (line.dot(to_point) / norm_squared);

    let offset = to_point - along;
    LineProjection {
        offset,
        distance: offset.length(),
        foot: a + along,
    }
}

/// Distance from `p` to the closed segment `[a, b]`.
pub fn distance_point_to_segment(a: Point, b: Point, p: Point) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let bp = p - b;

    if ab.dot(ap) < 0.0 {
        return ap.length();
    }
    if (-ab).dot(bp) < 0.0 {
        return bp.length();
    }
    ap.cross(bp).abs() / ab.length()
}

/// Wrap an angle into `(-π, π]`.
pub fn normalize_angle(mut angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    while angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}

/// Check if a point is inside a polygon (ray casting algorithm).
pub fn point_in_polygon(vertices: &[Point], point: Point) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for (i, &vi) in vertices.iter().enumerate() {
        let vj = vertices[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Index of and distance to the point in `points` closest to `target`.
///
/// Ties resolve to the lowest index.
pub fn nearest_point(points: &[Point], target: Point) -> Option<(usize, f64)> {
    points
        .iter()
        .map(|p| p.distance_to(target))
        .enumerate()
        .fold(None, |best, (i, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((i, d)),
        })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, -1.0);
        assert_eq!(a + b, Point::new(4.0, 1.0));
        assert_eq!(a - b, Point::new(-2.0, 3.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));
        assert_eq!(b / 2.0, Point::new(1.5, -0.5));
        assert_eq!(a.midpoint(b), Point::new(2.0, 0.5));
        assert!(approx_eq(Point::new(3.0, 4.0).length(), 5.0));
    }

    #[test]
    fn test_projection_perpendicular_offset() {
        let proj = project_point_onto_line(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(4.0, 5.0),
        );
        assert!(approx_eq(proj.offset.x, 0.0));
        assert!(approx_eq(proj.offset.y, 5.0));
        assert!(approx_eq(proj.distance, 5.0));
        assert!(approx_eq(proj.foot.x, 4.0));
        assert!(approx_eq(proj.foot.y, 0.0));
    }

    #[test]
    fn test_projection_degenerate_line_is_clamped() {
        // a == b: the along-component vanishes, so the whole vector is the offset
        let a = Point::new(1.0, 1.0);
        let proj = project_point_onto_line(a, a, Point::new(4.0, 5.0));
        assert!(approx_eq(proj.offset.x, 3.0));
        assert!(approx_eq(proj.offset.y, 4.0));
        assert!(approx_eq(proj.distance, 5.0));
        assert_eq!(proj.foot, a);
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        // Perpendicular region
        assert!(approx_eq(distance_point_to_segment(a, b, Point::new(5.0, 3.0)), 3.0));
        // Beyond `a`
        assert!(approx_eq(distance_point_to_segment(a, b, Point::new(-3.0, 4.0)), 5.0));
        // Beyond `b`
        assert!(approx_eq(distance_point_to_segment(a, b, Point::new(13.0, -4.0)), 5.0));
    }

    #[test]
    fn test_normalize_angle() {
        assert!(approx_eq(normalize_angle(0.0), 0.0));
        assert!(approx_eq(normalize_angle(PI), PI));
        assert!(approx_eq(normalize_angle(-PI), PI));
        assert!(approx_eq(normalize_angle(3.0 * PI / 2.0), -PI / 2.0));
        assert!(approx_eq(normalize_angle(-5.0 * PI / 2.0), -PI / 2.0));
        assert!(normalize_angle(f64::NAN).is_nan());
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        assert!(point_in_polygon(&square, Point::new(50.0, 50.0)));
        assert!(!point_in_polygon(&square, Point::new(150.0, 50.0)));
        assert!(!point_in_polygon(&square[..2], Point::new(50.0, 0.0)));

        let diamond = [
            Point::new(0.0, -10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(-10.0, 0.0),
        ];
        assert!(point_in_polygon(&diamond, Point::new(2.0, 2.0)));
        assert!(!point_in_polygon(&diamond, Point::new(8.0, 8.0)));
    }

    #[test]
    fn test_nearest_point() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let (idx, dist) = nearest_point(&points, Point::new(9.0, 1.0)).unwrap();
        assert_eq!(idx, 1);
        assert!(approx_eq(dist, 2.0_f64.sqrt()));
        assert!(nearest_point(&[], Point::ZERO).is_none());
    }
}
