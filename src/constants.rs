//! Global constants for the grasp labeling tool

/// Diameter of a rendered corner marker, in model units.
pub const POINT_SIZE: f64 = 8.0;

/// Stroke width of an idle edge.
pub const LINE_WIDTH: f64 = 2.0;

/// Stroke width of a hovered edge.
pub const LINE_HOVERING_WIDTH: f64 = 3.0;

/// Stroke width of a selected edge.
pub const LINE_SELECTED_WIDTH: f64 = 4.0;

/// A corner is picked when the pointer is closer than half a marker.
pub const VERTEX_SELECT_TOLERANCE: f64 = POINT_SIZE / 2.0;

/// An edge is picked when the pointer is closer than half a selected stroke.
pub const EDGE_SELECT_TOLERANCE: f64 = LINE_SELECTED_WIDTH / 2.0;

/// Minimum extent of an edge before the builder accepts a click.
pub const MIN_BUILD_DISTANCE: f64 = 1.0;

/// Squared-length floor used when projecting onto a near-degenerate line.
pub const MIN_LINE_NORM_SQUARED: f64 = 1e-6;

/// Fill opacity of an idle shape.
pub const FILL_ALPHA: f32 = 0.0;

/// Fill opacity of a hovered shape.
pub const FILL_HOVERING_ALPHA: f32 = 0.3;

/// Fill opacity of a selected shape.
pub const FILL_SELECTED_ALPHA: f32 = 0.5;

/// Zoom step per wheel notch (one notch = 120 angle units).
pub const WHEEL_ZOOM_STEP: f64 = 0.2;

/// Angle units reported per wheel notch.
pub const WHEEL_NOTCH: f64 = 120.0;

/// Image file extensions picked up when scanning a folder.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Sentinel stored in `image_folder` for projects made of absolute paths.
pub const ABSOLUTE_PATH_FOLDER: &str = "absolute_path";
