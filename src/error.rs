//! Error type shared by the capture, save and interactive flows.

use thiserror::Error;

pub type ScreenshotResult<T> = Result<T, ScreenshotError>;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    /// No capture backend produced pixels.
    #[error("Unable to capture a screenshot: {0}")]
    Capture(String),

    /// No safe, unique save location could be derived.
    #[error("Impossible to find a valid location to save the screenshot: {0}")]
    PathResolution(String),

    /// The target exists and overwriting was not authorized.
    #[error("A file named \u{201c}{file_name}\u{201d} already exists in \u{201c}{folder}\u{201d}")]
    FileConflict { file_name: String, folder: String },

    /// I/O or codec failure while writing the image.
    #[error("Unable to save the screenshot: {0}")]
    EncodeWrite(String),

    #[error("Cannot run \u{201c}{0}\u{201d}: it is not installed")]
    ExternalToolUnavailable(String),

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("Nothing to save: {0}")]
    NothingToSave(&'static str),

    #[error("Conflicting options: {0}")]
    InvalidOptions(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl ScreenshotError {
    /// Conflicts are the only kind resolved locally, by asking the user.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::FileConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_file_and_folder() {
        let err = ScreenshotError::FileConflict {
            file_name: "shot.png".to_string(),
            folder: "Pictures".to_string(),
        };

        assert!(err.is_conflict());
        assert_eq!(
            err.to_string(),
            "A file named \u{201c}shot.png\u{201d} already exists in \u{201c}Pictures\u{201d}"
        );
    }

    #[test]
    fn test_other_kinds_are_not_conflicts() {
        assert!(!ScreenshotError::SaveInProgress.is_conflict());
        assert!(!ScreenshotError::EncodeWrite("disk full".into()).is_conflict());
    }
}
