//! Widget to model coordinate mapping.
//!
//! This module contains the pan/zoom math of the canvas, kept free of any
//! widget toolkit for testability. A widget point `w` maps to the model
//! point `(w - origin) / scale`.

use crate::constants::{WHEEL_NOTCH, WHEEL_ZOOM_STEP};
use crate::geometry::Point;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// How an image is fitted into the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitKind {
    /// Fill the widget width, center vertically.
    Width,
    /// Fill the widget height, center horizontally.
    Height,
    /// Whichever of width/height fit shows the whole image.
    #[default]
    Window,
    /// Scale 1, centered.
    OriginalSize,
}

/// Pan/zoom state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Widget position of the model origin.
    pub origin: Point,
    /// Widget pixels per model unit.
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}

impl Viewport {
    pub fn new(origin: Point, scale: f64) -> Self {
        Self { origin, scale }
    }

    pub fn identity() -> Self {
        Self::new(Point::ZERO, 1.0)
    }

    pub fn widget_to_model(&self, p: Point) -> Point {
        (p - self.origin) / self.scale
    }

    pub fn model_to_widget(&self, p: Point) -> Point {
        p * self.scale + self.origin
    }

    /// Zoom by the relative step `delta` around `pos`.
    ///
    /// The model point under `pos` stays where it is. `pos` is in widget
    /// coordinates when `widget_coords` is set, otherwise in model
    /// coordinates. Steps that would make the scale non-positive are
    /// ignored.
    pub fn scale_at(&mut self, pos: Point, delta: f64, widget_coords: bool) {
        let new_scale = self.scale * (1.0 + delta);
        if new_scale <= 0.0 || !new_scale.is_finite() {
            log::debug!("Ignoring zoom step {delta} at scale {}", self.scale);
            return;
        }

        let model_pos = if widget_coords {
            self.widget_to_model(pos)
        } else {
            pos
        };
        self.origin += model_pos * (self.scale - new_scale);
        self.scale = new_scale;
    }

    /// Pan by `delta` widget pixels.
    pub fn pan_by(&mut self, delta: Point) {
        self.origin += delta;
    }

    /// Fit `image` into `widget`.
    pub fn fit(&mut self, kind: FitKind, widget: Size, image: Size) {
        if widget.is_empty() || image.is_empty() {
            log::debug!("Skipping fit of {image:?} into {widget:?}");
            return;
        }

        match kind {
            FitKind::Width => {
                let scale = widget.width / image.width;
                self.scale = scale;
                self.origin = Point::new(0.0, (widget.height - scale * image.height) / 2.0);
            }
            FitKind::Height => {
                let scale = widget.height / image.height;
                self.scale = scale;
                self.origin = Point::new((widget.width - scale * image.width) / 2.0, 0.0);
            }
            FitKind::Window => {
                let w_scale = widget.width / image.width;
                let h_scale = widget.height / image.height;
                let kind = if w_scale <= h_scale {
                    FitKind::Width
                } else {
                    FitKind::Height
                };
                self.fit(kind, widget, image);
            }
            FitKind::OriginalSize => {
                self.scale = 1.0;
                self.origin = Point::new(
                    (widget.width - image.width) / 2.0,
                    (widget.height - image.height) / 2.0,
                );
            }
        }
    }
}

/// Relative zoom step for a vertical wheel delta in angle units.
pub fn wheel_delta_to_scale(angle_delta_y: f64) -> f64 {
    angle_delta_y / WHEEL_NOTCH * WHEEL_ZOOM_STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_identity() {
        let v = Viewport::identity();
        let p = Point::new(12.0, -3.0);
        assert_eq!(v.widget_to_model(p), p);
        assert_eq!(v.model_to_widget(p), p);
    }

    #[test]
    fn test_widget_model_inverse() {
        let v = Viewport::new(Point::new(40.0, -10.0), 2.5);
        let p = Point::new(17.0, 33.0);
        let back = v.widget_to_model(v.model_to_widget(p));
        assert!(approx_eq(back.x, p.x) && approx_eq(back.y, p.y));
    }

    #[test]
    fn test_scale_at_preserves_point_under_cursor() {
        let mut v = Viewport::new(Point::new(50.0, 30.0), 1.0);
        let cursor = Point::new(150.0, 120.0);
        let before = v.widget_to_model(cursor);

        v.scale_at(cursor, 0.2, true);
        assert!(approx_eq(v.scale, 1.2));

        let after = v.widget_to_model(cursor);
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_scale_at_rejects_collapse() {
        let mut v = Viewport::identity();
        v.scale_at(Point::new(10.0, 10.0), -1.0, true);
        assert_eq!(v, Viewport::identity());
    }

    #[test]
    fn test_pan_by() {
        let mut v = Viewport::new(Point::new(10.0, 20.0), 2.0);
        v.pan_by(Point::new(5.0, -10.0));
        assert_eq!(v.origin, Point::new(15.0, 10.0));
        assert_eq!(v.scale, 2.0);
    }

    #[test]
    fn test_fit_window_picks_limiting_axis() {
        // Wide image in a square widget: width limits
        let mut v = Viewport::identity();
        v.fit(FitKind::Window, Size::new(100.0, 100.0), Size::new(200.0, 50.0));
        assert!(approx_eq(v.scale, 0.5));
        assert!(approx_eq(v.origin.x, 0.0));
        assert!(approx_eq(v.origin.y, 37.5));

        // Tall image: height limits
        v.fit(FitKind::Window, Size::new(100.0, 100.0), Size::new(50.0, 200.0));
        assert!(approx_eq(v.scale, 0.5));
        assert!(approx_eq(v.origin.x, 37.5));
        assert!(approx_eq(v.origin.y, 0.0));
    }

    #[test]
    fn test_fit_original_size_centers() {
        let mut v = Viewport::new(Point::new(3.0, 3.0), 4.0);
        v.fit(FitKind::OriginalSize, Size::new(300.0, 200.0), Size::new(100.0, 100.0));
        assert_eq!(v.scale, 1.0);
        assert_eq!(v.origin, Point::new(100.0, 50.0));
    }

    #[test]
    fn test_fit_empty_image_is_ignored() {
        let mut v = Viewport::identity();
        v.fit(FitKind::Width, Size::new(100.0, 100.0), Size::new(0.0, 10.0));
        assert_eq!(v, Viewport::identity());
    }

    #[test]
    fn test_wheel_delta() {
        assert!(approx_eq(wheel_delta_to_scale(120.0), 0.2));
        assert!(approx_eq(wheel_delta_to_scale(-240.0), -0.4));
    }
}
