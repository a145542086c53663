//! Error types for project and session operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a project.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The folder a relative project points at does not exist
    #[error("Image folder not found: {path:?}")]
    ImageFolderNotFound {
        /// Folder recorded in the project
        path: PathBuf,
    },

    /// A stored shape cannot be turned back into a rectangle
    #[error("Invalid shape record: {message}")]
    InvalidShape {
        /// Description of the problem
        message: String,
    },

    /// The image name is not part of the project
    #[error("Unknown image: {name}")]
    UnknownImage {
        /// Name that was looked up
        name: String,
    },
}

impl ProjectError {
    /// Create an invalid shape error with a message.
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape {
            message: message.into(),
        }
    }
}

/// Errors raised by an annotation session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Saving was requested before an output file was chosen
    #[error("No output path set")]
    NoOutputPath,

    /// An operation needs a current image but none is selected
    #[error("No image selected")]
    NoImageSelected,

    /// Index outside the file list
    #[error("Image index {index} out of range (project has {len} images)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Underlying project error
    #[error(transparent)]
    Project(#[from] ProjectError),
}
