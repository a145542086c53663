//! Grasp Label - oriented grasp-rectangle annotation engine.
//!
//! The crate holds everything a labeling front end needs except drawing:
//! rectangle geometry and hit testing, the click-by-click builder, the
//! canvas interaction state machine, the shape list mirror, pan/zoom math
//! and the JSON project file. Widgets feed pointer input into [`Canvas`] and
//! react to the [`CanvasEvent`]s it returns.

pub mod canvas;
pub mod collection;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod input;
pub mod message;
pub mod model;
pub mod project;
pub mod session;
pub mod shape_list;
pub mod viewport;

pub use canvas::{Canvas, CanvasMode};
pub use collection::ShapeCollection;
pub use config::{AppConfig, ConfigError, LogLevel};
pub use error::{ProjectError, SessionError};
pub use geometry::Point;
pub use input::{HeldButtons, Modifiers, PointerButton};
pub use message::{CanvasEvent, ListRequest};
pub use model::{GraspBuilder, GraspParams, GraspRect, PickTolerance, ShapeId, ShapeRecord};
pub use project::Project;
pub use session::Session;
pub use shape_list::ShapeList;
pub use viewport::{FitKind, Viewport};
