//! Non-interactive run
//!
//! Delay, capture, save, done. Errors end up in one place: logged, an error
//! sound if enabled, and a failure exit status when `--file` was given.

use gtk4::prelude::*;
use gtk4::glib;
use log::{error, info, warn};
use std::path::PathBuf;

use crate::app::config::{CaptureConfig, Destination, CAPTURE_SOUND, ERROR_SOUND};
use crate::app::lifecycle::{ExitStatus, Lifecycle};
use crate::app::settings::SettingsStore;
use crate::app::state::{SaveTarget, Session};
use crate::capture::{acquire, capture_delay};
use crate::error::{ScreenshotError, ScreenshotResult};
use crate::platform::Desktop;
use crate::save::{resolve_save_path, save, DenyOverwrite, SavedImage};

const CLIPBOARD_FILE_TEMPLATE: &str = "shutterbug-clipboard-XXXXXX.png";

pub async fn run<D: Desktop, L: Lifecycle>(
    config: &CaptureConfig,
    desktop: &D,
    lifecycle: &L,
    settings: &dyn SettingsStore,
    status: &ExitStatus,
) {
    let _hold = lifecycle.hold();

    match capture_and_save(config, desktop, settings).await {
        Ok(Some(saved)) => info!("Screenshot saved to {}", saved.target.uri()),
        Ok(None) => info!("No screenshot taken"),
        Err(err) => {
            error!("{}", err);
            if config.play_sound {
                desktop.play_sound(ERROR_SOUND, "Unable to capture a screenshot");
            }
            if config.has_explicit_file() {
                status.fail();
            }
        }
    }
}

async fn capture_and_save<D: Desktop>(
    config: &CaptureConfig,
    desktop: &D,
    settings: &dyn SettingsStore,
) -> ScreenshotResult<Option<SavedImage>> {
    let delay = capture_delay(config);
    if !delay.is_zero() {
        info!("Waiting {:?} before capturing", delay);
        glib::timeout_future(delay).await;
    }

    let Some(image) = acquire(desktop, config).await? else {
        return Ok(None);
    };

    config.persist(settings);
    if config.play_sound {
        desktop.play_sound(CAPTURE_SOUND, "Screenshot taken");
    }

    let mut session = Session::new();
    session.set_image(image);
    session.set_color_profile(config.color_profile.clone());

    match &config.destination {
        Destination::File(path) => {
            session.set_target(SaveTarget::from_path(path));
            session.set_overwrite(true);
        }
        Destination::Clipboard => {
            session.set_target(SaveTarget::from_path(clipboard_scratch_path()?));
            session.set_overwrite(true);
        }
        Destination::AutoNamed => {
            let path = resolve_save_path(config.save_dir.as_deref()).await?;
            session.set_target(SaveTarget::from_path(path));
        }
    }

    let mut job = session.save_job()?;
    let saved = match save(&mut job, &session.save_lock(), &DenyOverwrite).await {
        Ok(saved) => saved,
        Err(err) => {
            if config.destination == Destination::Clipboard {
                discard_scratch(&job.target).await;
            }
            return Err(err);
        }
    };

    if config.destination == Destination::Clipboard {
        let published = desktop.publish_clipboard(saved.target.path()).await;
        discard_scratch(&saved.target).await;
        published?;
    } else {
        desktop.add_recent(saved.target.uri(), saved.format.mime_type());
    }

    Ok(Some(saved))
}

/// Fresh file in the temporary directory, only readable by this user.
fn clipboard_scratch_path() -> ScreenshotResult<PathBuf> {
    let (fd, path) = glib::file_open_tmp(Some(CLIPBOARD_FILE_TEMPLATE))
        .map_err(|e| ScreenshotError::PathResolution(e.to_string()))?;
    drop(fd);
    Ok(path)
}

async fn discard_scratch(target: &SaveTarget) {
    if let Err(e) = target.file().delete_future(glib::Priority::DEFAULT).await {
        warn!("Failed to remove {}: {}", target.uri(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::lifecycle::testing::CountingLifecycle;
    use crate::app::settings::testing::MemorySettings;
    use crate::app::settings::BORDER_EFFECT_KEY;
    use crate::app::{BorderEffect, CaptureMode};
    use crate::capture::CaptureRect;
    use crate::platform::testing::FakeDesktop;
    use image::ImageFormat;

    struct Run {
        desktop: FakeDesktop,
        lifecycle: CountingLifecycle,
        settings: MemorySettings,
        status: ExitStatus,
    }

    impl Run {
        fn new(desktop: FakeDesktop) -> Self {
            Self {
                desktop,
                lifecycle: CountingLifecycle::default(),
                settings: MemorySettings::new(),
                status: ExitStatus::default(),
            }
        }

        fn execute(&self, config: &CaptureConfig) {
            glib::MainContext::new().block_on(run(
                config,
                &self.desktop,
                &self.lifecycle,
                &self.settings,
                &self.status,
            ));
            assert_eq!(self.lifecycle.holds(), 1);
            assert_eq!(self.lifecycle.outstanding(), 0);
        }
    }

    fn to_file(path: PathBuf) -> CaptureConfig {
        CaptureConfig {
            destination: Destination::File(path),
            ..Default::default()
        }
    }

    #[test]
    fn test_explicit_jpeg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.jpg");
        let run = Run::new(FakeDesktop::default());

        run.execute(&to_file(path.clone()));

        assert!(!run.status.failed());
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        assert_eq!(run.desktop.sounds.borrow().as_slice(), [CAPTURE_SOUND]);
        assert_eq!(run.desktop.recents.borrow()[0].1, "image/jpeg");
    }

    #[test]
    fn test_explicit_file_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"old").unwrap();
        let run = Run::new(FakeDesktop::default());

        run.execute(&to_file(path.clone()));

        assert!(!run.status.failed());
        assert_ne!(std::fs::read(&path).unwrap(), b"old");
    }

    #[test]
    fn test_unwritable_explicit_file_fails_the_run() {
        let run = Run::new(FakeDesktop::default());

        run.execute(&to_file(PathBuf::from("/nonexistent-dir/x.png")));

        assert!(run.status.failed());
        assert_eq!(
            run.desktop.sounds.borrow().as_slice(),
            [CAPTURE_SOUND, ERROR_SOUND]
        );
        assert!(run.desktop.recents.borrow().is_empty());
    }

    #[test]
    fn test_capture_failure_with_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let run = Run::new(FakeDesktop::default().failing_capture());

        run.execute(&to_file(dir.path().join("x.png")));

        assert!(run.status.failed());
        assert!(!dir.path().join("x.png").exists());
        assert_eq!(run.desktop.sounds.borrow().as_slice(), [ERROR_SOUND]);
    }

    #[test]
    fn test_auto_named_failure_keeps_success_status() {
        let run = Run::new(FakeDesktop::default().failing_capture());

        run.execute(&CaptureConfig {
            play_sound: false,
            ..Default::default()
        });

        assert!(!run.status.failed());
        assert!(run.desktop.sounds.borrow().is_empty());
    }

    #[test]
    fn test_auto_named_goes_to_save_dir() {
        let dir = tempfile::tempdir().unwrap();
        let run = Run::new(FakeDesktop::default());

        run.execute(&CaptureConfig {
            save_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        });

        let saved: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].starts_with("Screenshot from "));
        assert_eq!(run.desktop.recents.borrow()[0].1, "image/png");
    }

    #[test]
    fn test_clipboard_run_publishes_scratch_png() {
        let run = Run::new(FakeDesktop::default());

        run.execute(&CaptureConfig {
            destination: Destination::Clipboard,
            ..Default::default()
        });

        let published = run.desktop.published.borrow();
        assert_eq!(published.len(), 1);
        assert!(published[0].starts_with(glib::tmp_dir()));
        assert!(!published[0].exists());
        assert!(run.desktop.recents.borrow().is_empty());
        assert!(!run.status.failed());
    }

    #[test]
    fn test_clipboard_tool_missing_is_logged_not_fatal() {
        let run = Run::new(FakeDesktop::default().failing_clipboard());

        run.execute(&CaptureConfig {
            destination: Destination::Clipboard,
            ..Default::default()
        });

        assert!(!run.status.failed());
        assert_eq!(
            run.desktop.sounds.borrow().as_slice(),
            [CAPTURE_SOUND, ERROR_SOUND]
        );
        let published = run.desktop.published.borrow();
        assert_eq!(published.len(), 1);
        assert!(!published[0].exists());
    }

    #[test]
    fn test_clipboard_scratch_paths_are_unique() {
        let first = clipboard_scratch_path().unwrap();
        let second = clipboard_scratch_path().unwrap();
        assert_ne!(first, second);

        for path in [first, second] {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("shutterbug-clipboard-"));
            assert!(name.ends_with(".png"));
            std::fs::remove_file(path).unwrap();
        }
    }

    #[test]
    fn test_cancelled_area_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let run = Run::new(FakeDesktop::default().with_selection(None));

        run.execute(&CaptureConfig {
            mode: CaptureMode::Area,
            destination: Destination::File(dir.path().join("area.png")),
            ..Default::default()
        });

        assert!(!run.status.failed());
        assert!(!dir.path().join("area.png").exists());
        assert!(run.desktop.sounds.borrow().is_empty());
    }

    #[test]
    fn test_area_selection_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("area.png");
        let run = Run::new(
            FakeDesktop::default().with_selection(Some(CaptureRect::new(4, 4, 16, 12))),
        );

        run.execute(&CaptureConfig {
            mode: CaptureMode::Area,
            destination: Destination::File(path.clone()),
            ..Default::default()
        });

        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (16, 12));
    }

    #[test]
    fn test_options_are_persisted_after_capture() {
        let dir = tempfile::tempdir().unwrap();
        let run = Run::new(FakeDesktop::default());

        run.execute(&CaptureConfig {
            mode: CaptureMode::Window,
            border_effect: BorderEffect::Vintage,
            destination: Destination::File(dir.path().join("w.png")),
            ..Default::default()
        });

        assert_eq!(
            run.settings.string(BORDER_EFFECT_KEY).as_deref(),
            Some("vintage")
        );
    }
}
