//! One annotation run over a project.
//!
//! `Session` ties the project file to the canvas and the shape list: it
//! moves shapes between the project and the canvas when the current image
//! changes, keeps the labeled flags up to date and tracks unsaved changes.

use std::path::{Path, PathBuf};

use crate::canvas::Canvas;
use crate::config::AppConfig;
use crate::error::SessionError;
use crate::message::{CanvasEvent, ListRequest};
use crate::model::PickTolerance;
use crate::project::{Project, default_output_name};
use crate::shape_list::ShapeList;

#[derive(Debug, Clone)]
pub struct Session {
    project: Project,
    /// Images shown in the file list, sorted.
    files: Vec<String>,
    current: Option<usize>,
    canvas: Canvas,
    shape_list: ShapeList,
    output_path: Option<PathBuf>,
    dirty: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PickTolerance::default())
    }
}

impl Session {
    /// Empty session whose canvas picks with `tolerance`.
    pub fn new(tolerance: PickTolerance) -> Self {
        Self {
            project: Project::new("unknown", Vec::new()),
            files: Vec::new(),
            current: None,
            canvas: Canvas::with_tolerance(tolerance),
            shape_list: ShapeList::new(),
            output_path: None,
            dirty: false,
        }
    }

    /// Empty session picking with the configured display sizes.
    pub fn with_config(config: &AppConfig) -> Self {
        Self::new(config.display.tolerance())
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_file(&self) -> Option<&str> {
        self.current.map(|i| self.files[i].as_str())
    }

    /// Disk location of the current image.
    pub fn current_image_path(&self) -> Option<PathBuf> {
        self.current_file().map(|f| self.project.image_path(f))
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Mutable canvas for input handling; pass the returned events to
    /// [`Session::handle_canvas_events`].
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn shape_list(&self) -> &ShapeList {
        &self.shape_list
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn set_output_path(&mut self, path: PathBuf) {
        self.output_path = Some(path);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ========================================================================
    // Opening
    // ========================================================================

    /// Start a new project over the images in `dir`.
    pub fn open_folder(
        &mut self,
        dir: &Path,
        extensions: &[String],
    ) -> Result<Vec<CanvasEvent>, SessionError> {
        let project = Project::from_folder(dir, extensions)?;
        let files = project.file_names();
        let events = self.replace_project(project, files)?;
        self.dirty = true;
        Ok(events)
    }

    /// Start a new project over explicitly chosen images.
    pub fn open_images(&mut self, paths: &[PathBuf]) -> Result<Vec<CanvasEvent>, SessionError> {
        let project = Project::from_images(paths);
        let files = project.file_names();
        let events = self.replace_project(project, files)?;
        self.dirty = true;
        Ok(events)
    }

    /// Continue an existing project; it becomes the output file.
    ///
    /// Only images found on disk are listed. Missing ones stay in the
    /// project when `keep_missing` is set and are dropped otherwise.
    pub fn open_project(
        &mut self,
        path: &Path,
        keep_missing: bool,
    ) -> Result<Vec<CanvasEvent>, SessionError> {
        let mut project = Project::load(path)?;
        let check = project.check_files()?;
        if !keep_missing && !check.all_found() {
            log::info!("Dropping {} missing image(s) from the project", check.missing.len());
            project.retain_files(&check.found);
        }

        let events = self.replace_project(project, check.found)?;
        self.output_path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(events)
    }

    fn replace_project(
        &mut self,
        project: Project,
        files: Vec<String>,
    ) -> Result<Vec<CanvasEvent>, SessionError> {
        let mut events = self.canvas.clear();
        self.mirror(&events);

        self.project = project;
        self.files = files;
        self.current = None;
        self.output_path = None;

        events.extend(self.next_file()?);
        Ok(events)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Make `index` the current image.
    ///
    /// The shapes on the canvas are stored under the image being left and
    /// the new image's shapes are loaded. The session is clean afterwards.
    pub fn select_file(&mut self, index: usize) -> Result<Vec<CanvasEvent>, SessionError> {
        let Some(name) = self.files.get(index).cloned() else {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        };

        self.store_current()?;

        log::info!("Loading data for image {}", name);
        let events = match self.project.entry(&name) {
            Some(entry) => self.canvas.load_records(&entry.shapes)?,
            None => self.canvas.clear(),
        };
        self.mirror(&events);

        self.current = Some(index);
        self.dirty = false;
        Ok(events)
    }

    /// Go to the next image, wrapping around; the image left is marked
    /// labeled.
    pub fn next_file(&mut self) -> Result<Vec<CanvasEvent>, SessionError> {
        let len = self.files.len();
        if len == 0 {
            return Ok(Vec::new());
        }
        let next = self.current.map_or(0, |i| (i + 1) % len);
        self.step_to(next)
    }

    /// Go to the previous image, wrapping around; the image left is marked
    /// labeled.
    pub fn prev_file(&mut self) -> Result<Vec<CanvasEvent>, SessionError> {
        let len = self.files.len();
        if len == 0 {
            return Ok(Vec::new());
        }
        let prev = self.current.map_or(len - 1, |i| (i + len - 1) % len);
        self.step_to(prev)
    }

    fn step_to(&mut self, index: usize) -> Result<Vec<CanvasEvent>, SessionError> {
        let left = self.current;
        let events = self.select_file(index)?;
        if let Some(left) = left {
            self.set_labeled(left, true)?;
        }
        Ok(events)
    }

    /// Set the labeled flag of image `index`; a change makes the session
    /// dirty.
    pub fn set_labeled(&mut self, index: usize, labeled: bool) -> Result<(), SessionError> {
        let name = self.files.get(index).ok_or(SessionError::IndexOutOfRange {
            index,
            len: self.files.len(),
        })?;
        if self.project.set_labeled(name, labeled)? {
            self.dirty = true;
        }
        Ok(())
    }

    /// Set the labeled flag of the current image.
    pub fn set_current_labeled(&mut self, labeled: bool) -> Result<(), SessionError> {
        let index = self.current.ok_or(SessionError::NoImageSelected)?;
        self.set_labeled(index, labeled)
    }

    // ========================================================================
    // Shape changes
    // ========================================================================

    /// Forward canvas events to the shape list and track unsaved changes.
    pub fn handle_canvas_events(&mut self, events: &[CanvasEvent]) {
        self.mirror(events);
        if events.iter().any(CanvasEvent::modifies_content) {
            self.dirty = true;
        }
    }

    /// Send a shape list request to the canvas.
    pub fn handle_list_request(&mut self, request: &ListRequest) -> Vec<CanvasEvent> {
        let events = self.canvas.apply_request(request);
        self.handle_canvas_events(&events);
        events
    }

    fn mirror(&mut self, events: &[CanvasEvent]) {
        for event in events {
            self.shape_list.apply(event);
        }
    }

    fn store_current(&mut self) -> Result<(), SessionError> {
        if let Some(name) = self.current_file().map(str::to_string) {
            log::debug!("Storing shapes of {}", name);
            self.project.set_shapes(&name, self.canvas.export_records())?;
        }
        Ok(())
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Store the current shapes, mark the current image labeled and write
    /// the project to the output path.
    pub fn save(&mut self) -> Result<PathBuf, SessionError> {
        let path = self.output_path.clone().ok_or(SessionError::NoOutputPath)?;

        self.store_current()?;
        if let Some(index) = self.current {
            self.set_labeled(index, true)?;
        }

        self.project.save(&path)?;
        self.dirty = false;
        Ok(path)
    }

    /// Save into `dir` under a time-stamped name.
    pub fn save_to(&mut self, dir: &Path) -> Result<PathBuf, SessionError> {
        self.output_path = Some(dir.join(default_output_name()));
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasMode;
    use crate::geometry::Point;
    use crate::input::{HeldButtons, Modifiers, PointerButton};
    use crate::model::ShapeId;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "grasp_label_session_{}_{}_{}",
            name,
            std::process::id(),
            ShapeId::generate()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn image_dir(name: &str) -> PathBuf {
        let dir = scratch_dir(name);
        for file in ["1.jpg", "2.jpg", "3.png"] {
            std::fs::write(dir.join(file), b"").unwrap();
        }
        dir
    }

    fn extensions() -> Vec<String> {
        vec!["jpg".to_string(), "png".to_string()]
    }

    fn draw(session: &mut Session, x: f64) {
        let canvas = session.canvas_mut();
        let mut events = canvas.set_mode(CanvasMode::Create);
        for p in [Point::new(x, 0.0), Point::new(x + 10.0, 0.0), Point::new(x + 10.0, 5.0)] {
            events.extend(canvas.pointer_move(p, HeldButtons::NONE));
            events.extend(canvas.pointer_press(p, PointerButton::Primary, Modifiers::NONE));
        }
        events.extend(canvas.set_mode(CanvasMode::Edit));
        session.handle_canvas_events(&events);
    }

    #[test]
    fn test_open_folder_selects_first_image() {
        let dir = image_dir("open");
        let mut session = Session::default();
        session.open_folder(&dir, &extensions()).unwrap();

        assert_eq!(session.files(), ["1.jpg", "2.jpg", "3.png"]);
        assert_eq!(session.current_index(), Some(0));
        assert_eq!(session.current_image_path(), Some(dir.join("1.jpg")));
        assert!(session.is_dirty());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_shapes_follow_their_image() {
        let dir = image_dir("follow");
        let mut session = Session::default();
        session.open_folder(&dir, &extensions()).unwrap();

        draw(&mut session, 0.0);
        assert!(session.is_dirty());
        assert_eq!(session.shape_list().len(), 1);

        session.next_file().unwrap();
        assert_eq!(session.current_file(), Some("2.jpg"));
        assert!(session.canvas().shapes().is_empty());
        assert!(session.shape_list().is_empty());
        assert!(session.project().is_labeled("1.jpg"));
        assert_eq!(session.project().shapes("1.jpg").len(), 1);

        session.prev_file().unwrap();
        assert_eq!(session.current_file(), Some("1.jpg"));
        assert_eq!(session.canvas().shapes().len(), 1);
        assert_eq!(session.shape_list().len(), 1);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_reselecting_current_image_keeps_list_in_sync() {
        let dir = scratch_dir("single");
        std::fs::write(dir.join("only.jpg"), b"").unwrap();
        let mut session = Session::default();
        session.open_folder(&dir, &extensions()).unwrap();

        draw(&mut session, 0.0);
        assert_eq!(session.canvas().shapes().len(), 1);

        // One image: next wraps onto itself and reloads the same shape
        session.next_file().unwrap();
        assert_eq!(session.current_file(), Some("only.jpg"));
        assert_eq!(session.canvas().shapes().len(), 1);
        assert_eq!(session.shape_list().id_map(), session.canvas().shapes().id_map());

        session.select_file(0).unwrap();
        assert_eq!(session.shape_list().len(), 1);
        assert_eq!(session.shape_list().id_map(), session.canvas().shapes().id_map());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_display_config_sets_pick_distance() {
        let mut config = AppConfig::new();
        config.display.point_size = 20.0;
        let mut session = Session::with_config(&config);
        assert_eq!(session.canvas().tolerance().vertex, 10.0);

        let corners = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(0.0, 5.0),
        ];
        let events = session
            .canvas_mut()
            .insert([crate::model::GraspRect::with_id(ShapeId::from("a"), corners)]);
        session.handle_canvas_events(&events);

        // 7 units off the corner: outside the default pick distance of 4
        let pos = Point::new(-5.0, -5.0);
        session
            .canvas_mut()
            .pointer_press(pos, PointerButton::Primary, Modifiers::NONE);
        let shape = session.canvas().shapes().get(&ShapeId::from("a")).unwrap();
        assert!(shape.is_selected());
        assert_eq!(shape.selected_handle(), Some(crate::model::Handle::Vertex(0)));
    }

    #[test]
    fn test_navigation_wraps() {
        let dir = image_dir("wrap");
        let mut session = Session::default();
        session.open_folder(&dir, &extensions()).unwrap();

        session.prev_file().unwrap();
        assert_eq!(session.current_index(), Some(2));
        session.next_file().unwrap();
        assert_eq!(session.current_index(), Some(0));

        assert!(matches!(
            session.select_file(7),
            Err(SessionError::IndexOutOfRange { index: 7, len: 3 })
        ));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_empty_session() {
        let mut session = Session::default();
        assert!(matches!(session.save(), Err(SessionError::NoOutputPath)));
        assert!(matches!(
            session.set_current_labeled(true),
            Err(SessionError::NoImageSelected)
        ));
        assert!(session.next_file().unwrap().is_empty());
        assert_eq!(session.current_index(), None);
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = image_dir("reopen");
        let mut session = Session::default();
        session.open_folder(&dir, &extensions()).unwrap();
        draw(&mut session, 0.0);
        draw(&mut session, 20.0);

        let path = session.save_to(&dir).unwrap();
        assert!(!session.is_dirty());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("proj_"));

        let mut reopened = Session::default();
        reopened.open_project(&path, false).unwrap();
        assert!(!reopened.is_dirty());
        assert_eq!(reopened.output_path(), Some(path.as_path()));
        assert_eq!(reopened.current_file(), Some("1.jpg"));
        assert!(reopened.project().is_labeled("1.jpg"));
        assert_eq!(reopened.canvas().shapes().len(), 2);
        assert_eq!(
            reopened.canvas().shapes().ids(),
            session.canvas().shapes().ids()
        );

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_open_project_drops_missing_images() {
        let dir = image_dir("missing");
        let mut session = Session::default();
        session.open_folder(&dir, &extensions()).unwrap();
        let path = session.save_to(&dir).unwrap();
        std::fs::remove_file(dir.join("2.jpg")).unwrap();

        let mut kept = Session::default();
        kept.open_project(&path, true).unwrap();
        assert_eq!(kept.files(), ["1.jpg", "3.png"]);
        assert_eq!(kept.project().image_count(), 3);

        let mut dropped = Session::default();
        dropped.open_project(&path, false).unwrap();
        assert_eq!(dropped.project().image_count(), 2);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_list_request_marks_dirty() {
        let dir = image_dir("request");
        let mut session = Session::default();
        session.open_folder(&dir, &extensions()).unwrap();
        draw(&mut session, 0.0);
        let path = session.save_to(&dir).unwrap();
        assert!(path.exists());

        let id = session.canvas().shapes().ids()[0].clone();
        let events = session.handle_list_request(&ListRequest::Remove(vec![id]));
        assert_eq!(events.len(), 1);
        assert!(session.is_dirty());
        assert!(session.shape_list().is_empty());

        let _ = std::fs::remove_dir_all(dir);
    }
}
