//! Session state
//!
//! One `Session` exists per run. It owns the captured image, the current save
//! target and the overwrite permission, and guards against concurrent saves.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gtk4::gio;
use gtk4::gio::prelude::*;
use image::RgbaImage;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{ScreenshotError, ScreenshotResult};

/// ICC color profile, kept base64-encoded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorProfile(String);

impl ColorProfile {
    #[cfg(test)]
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> ScreenshotResult<Vec<u8>> {
        STANDARD
            .decode(&self.0)
            .map_err(|e| ScreenshotError::EncodeWrite(format!("invalid color profile: {}", e)))
    }
}

/// A save location. The URI and the local path always describe the same file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveTarget {
    uri: String,
    path: PathBuf,
}

impl SaveTarget {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let file = gio::File::for_path(path.as_ref());
        Self {
            uri: file.uri().to_string(),
            path: file.path().unwrap_or_else(|| path.as_ref().to_path_buf()),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> gio::File {
        gio::File::for_path(&self.path)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn folder(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"))
    }

    pub fn folder_name(&self) -> String {
        let folder = self.folder();
        folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| folder.to_string_lossy().into_owned())
    }
}

/// Session-wide flag that admits one save at a time.
#[derive(Clone, Default)]
pub struct SaveLock(Rc<Cell<bool>>);

impl SaveLock {
    pub fn try_acquire(&self) -> ScreenshotResult<SaveLockGuard> {
        if self.0.replace(true) {
            return Err(ScreenshotError::SaveInProgress);
        }
        Ok(SaveLockGuard(self.0.clone()))
    }

    #[cfg(test)]
    pub fn is_held(&self) -> bool {
        self.0.get()
    }
}

#[must_use]
pub struct SaveLockGuard(Rc<Cell<bool>>);

impl Drop for SaveLockGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Everything one save attempt needs, detached from the session.
#[derive(Clone, Debug)]
pub struct SaveJob {
    pub image: Rc<RgbaImage>,
    pub target: SaveTarget,
    pub overwrite: bool,
    pub color_profile: Option<ColorProfile>,
}

#[derive(Default)]
pub struct Session {
    image: Option<Rc<RgbaImage>>,
    color_profile: Option<ColorProfile>,
    target: Option<SaveTarget>,
    should_overwrite: bool,
    save_lock: SaveLock,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_image(&mut self, image: RgbaImage) {
        self.image = Some(Rc::new(image));
    }

    pub fn image(&self) -> Option<&Rc<RgbaImage>> {
        self.image.as_ref()
    }

    /// True when a non-empty image is held.
    pub fn has_image(&self) -> bool {
        self.image
            .as_ref()
            .is_some_and(|image| image.width() > 0 && image.height() > 0)
    }

    pub fn set_color_profile(&mut self, profile: Option<ColorProfile>) {
        self.color_profile = profile;
    }

    /// A new target never inherits permission to overwrite.
    pub fn set_target(&mut self, target: SaveTarget) {
        self.target = Some(target);
        self.should_overwrite = false;
    }

    pub fn set_overwrite(&mut self, overwrite: bool) {
        self.should_overwrite = overwrite;
    }

    pub fn save_lock(&self) -> SaveLock {
        self.save_lock.clone()
    }

    /// Snapshot for the pipeline; fails unless both image and target are set.
    pub fn save_job(&self) -> ScreenshotResult<SaveJob> {
        let image = self
            .image
            .clone()
            .ok_or(ScreenshotError::NothingToSave("no image was captured"))?;
        let target = self
            .target
            .clone()
            .ok_or(ScreenshotError::NothingToSave("no save location was chosen"))?;

        Ok(SaveJob {
            image,
            target,
            overwrite: self.should_overwrite,
            color_profile: self.color_profile.clone(),
        })
    }

    /// Forget the capture, keeping the lock so in-flight saves stay guarded.
    pub fn reset_for_capture(&mut self) {
        self.image = None;
        self.target = None;
        self.should_overwrite = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_path_derives_uri() {
        let target = SaveTarget::from_path("/tmp/shots/Screenshot 1.png");

        assert_eq!(target.uri(), "file:///tmp/shots/Screenshot%201.png");
        assert_eq!(target.path(), Path::new("/tmp/shots/Screenshot 1.png"));
        assert_eq!(target.file_name(), "Screenshot 1.png");
        assert_eq!(target.folder_name(), "shots");
    }

    #[test]
    fn test_relative_path_becomes_absolute() {
        let target = SaveTarget::from_path("report.jpg");
        assert!(target.path().is_absolute());
        assert!(target.uri().ends_with("/report.jpg"));
    }

    #[test]
    fn test_save_job_requires_image_and_target() {
        let mut session = Session::new();
        assert!(matches!(
            session.save_job(),
            Err(ScreenshotError::NothingToSave(_))
        ));

        session.set_image(RgbaImage::new(2, 2));
        assert!(session.save_job().is_err());

        session.set_target(SaveTarget::from_path("/tmp/x.png"));
        let job = session.save_job().unwrap();
        assert!(!job.overwrite);
        assert_eq!(job.image.width(), 2);
    }

    #[test]
    fn test_new_target_clears_overwrite() {
        let mut session = Session::new();
        session.set_image(RgbaImage::new(1, 1));
        session.set_overwrite(true);
        session.set_target(SaveTarget::from_path("/tmp/x.png"));
        assert!(!session.save_job().unwrap().overwrite);
    }

    #[test]
    fn test_save_lock_is_exclusive() {
        let session = Session::new();
        let lock = session.save_lock();

        let guard = lock.try_acquire().unwrap();
        assert!(lock.is_held());
        assert!(matches!(
            session.save_lock().try_acquire(),
            Err(ScreenshotError::SaveInProgress)
        ));

        drop(guard);
        assert!(!lock.is_held());
        assert!(lock.try_acquire().is_ok());
    }

    #[test]
    fn test_empty_image_does_not_count() {
        let mut session = Session::new();
        assert!(!session.has_image());
        session.set_image(RgbaImage::new(0, 0));
        assert!(!session.has_image());
        session.set_image(RgbaImage::new(1, 1));
        assert!(session.has_image());
    }

    #[test]
    fn test_color_profile_base64() {
        let profile = ColorProfile::from_bytes(b"icc");
        assert_eq!(profile.as_base64(), "aWNj");
        assert_eq!(profile.to_bytes().unwrap(), b"icc");
        assert!(ColorProfile::from_base64("%%%").to_bytes().is_err());
    }
}
