//! Project file management.
//!
//! A project records, for every image, whether it has been labeled and the
//! grasp rectangles drawn on it.
//!
//! # File Format
//!
//! Projects are stored as pretty-printed UTF-8 JSON:
//!
//! ```json
//! {
//!   "image_folder": "/data/images",
//!   "image_files": {
//!     "00001.jpg": {
//!       "labeled": true,
//!       "shapes": [
//!         {
//!           "id": "1700000000000-0",
//!           "points": [[0, 0], [10, 0], [10, 5], [0, 5]],
//!           "center": [5, 2.5],
//!           "gripper_size": 10.0,
//!           "gripper_open": 5.0,
//!           "angle": 1.5707963267948966
//!         }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! When `image_folder` is `"absolute_path"` the keys of `image_files` are
//! absolute paths; otherwise they are names relative to the folder.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::ABSOLUTE_PATH_FOLDER;
use crate::error::ProjectError;
use crate::model::ShapeRecord;

/// Per-image annotation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    #[serde(default)]
    pub labeled: bool,
    #[serde(default)]
    pub shapes: Vec<ShapeRecord>,
}

/// A grasp annotation project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Image directory, or `"absolute_path"`.
    pub image_folder: String,
    /// Entries keyed by image name, sorted.
    #[serde(default)]
    pub image_files: BTreeMap<String, ImageEntry>,
}

/// Which project images exist on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCheck {
    pub found: Vec<String>,
    pub missing: Vec<String>,
}

impl FileCheck {
    pub fn all_found(&self) -> bool {
        self.missing.is_empty()
    }
}

impl Project {
    /// Project over images in `folder`, all unlabeled.
    pub fn new(folder: impl Into<String>, files: impl IntoIterator<Item = String>) -> Self {
        Self {
            image_folder: folder.into(),
            image_files: files
                .into_iter()
                .map(|f| (f, ImageEntry::default()))
                .collect(),
        }
    }

    /// Scan `dir` (non-recursively) for images with one of `extensions`.
    ///
    /// Extensions are matched case-insensitively.
    pub fn from_folder(dir: &Path, extensions: &[String]) -> Result<Self, ProjectError> {
        let mut files: Vec<String> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_extension(path, extensions))
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .collect();
        files.sort();

        log::info!("Scanned folder {:?}: found {} images", dir, files.len());
        Ok(Self::new(dir.to_string_lossy(), files))
    }

    /// Project over explicitly chosen image files.
    pub fn from_images(paths: &[PathBuf]) -> Self {
        let files = paths.iter().map(|p| p.to_string_lossy().into_owned());
        Self::new(ABSOLUTE_PATH_FOLDER, files)
    }

    /// Whether image names are absolute paths.
    pub fn is_absolute(&self) -> bool {
        self.image_folder.eq_ignore_ascii_case(ABSOLUTE_PATH_FOLDER)
    }

    /// The image directory of a relative project.
    pub fn folder(&self) -> Option<&Path> {
        (!self.is_absolute()).then(|| Path::new(&self.image_folder))
    }

    /// Image names in sorted order.
    pub fn file_names(&self) -> Vec<String> {
        self.image_files.keys().cloned().collect()
    }

    /// Where the image `name` lives on disk.
    pub fn image_path(&self, name: &str) -> PathBuf {
        match self.folder() {
            Some(folder) => folder.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Split the images into those present on disk and those missing.
    ///
    /// Fails when the folder of a relative project does not exist.
    pub fn check_files(&self) -> Result<FileCheck, ProjectError> {
        if let Some(folder) = self.folder() {
            if !folder.is_dir() {
                return Err(ProjectError::ImageFolderNotFound {
                    path: folder.to_path_buf(),
                });
            }
        }

        let mut check = FileCheck::default();
        for name in self.image_files.keys() {
            if self.image_path(name).exists() {
                check.found.push(name.clone());
            } else {
                check.missing.push(name.clone());
            }
        }
        if !check.all_found() {
            log::warn!("{} image(s) cannot be found", check.missing.len());
        }
        Ok(check)
    }

    /// Keep only the entries named in `names`.
    pub fn retain_files(&mut self, names: &[String]) {
        self.image_files.retain(|name, _| names.contains(name));
    }

    pub fn entry(&self, name: &str) -> Option<&ImageEntry> {
        self.image_files.get(name)
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut ImageEntry, ProjectError> {
        self.image_files
            .get_mut(name)
            .ok_or_else(|| ProjectError::UnknownImage {
                name: name.to_string(),
            })
    }

    /// Stored shapes of `name`; empty for unknown images.
    pub fn shapes(&self, name: &str) -> &[ShapeRecord] {
        self.entry(name).map(|e| e.shapes.as_slice()).unwrap_or_default()
    }

    pub fn set_shapes(&mut self, name: &str, shapes: Vec<ShapeRecord>) -> Result<(), ProjectError> {
        self.entry_mut(name)?.shapes = shapes;
        Ok(())
    }

    pub fn is_labeled(&self, name: &str) -> bool {
        self.entry(name).is_some_and(|e| e.labeled)
    }

    /// Set the labeled flag. Returns true if it changed.
    pub fn set_labeled(&mut self, name: &str, labeled: bool) -> Result<bool, ProjectError> {
        let entry = self.entry_mut(name)?;
        let changed = entry.labeled != labeled;
        entry.labeled = labeled;
        Ok(changed)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved project to {:?}", path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let json = std::fs::read_to_string(path)?;
        let project = Self::from_json(&json)?;
        log::info!(
            "Loaded project {:?}: {} images, {} shapes",
            path,
            project.image_count(),
            project.shape_count()
        );
        Ok(project)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub fn image_count(&self) -> usize {
        self.image_files.len()
    }

    pub fn labeled_count(&self) -> usize {
        self.image_files.values().filter(|e| e.labeled).count()
    }

    pub fn shape_count(&self) -> usize {
        self.image_files.values().map(|e| e.shapes.len()).sum()
    }
}

/// Output file name stamped with the local time, `proj_MMDDHHMMSS.json`.
pub fn default_output_name() -> String {
    chrono::Local::now()
        .format("proj_%m%d%H%M%S.json")
        .to_string()
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}
