//! External programs: sound player, image editor and default viewer

use gtk4::gio;
use gtk4::gio::prelude::*;
use gtk4::glib;
use log::{debug, info, warn};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{ScreenshotError, ScreenshotResult};

const SOUND_PLAYER: &str = "canberra-gtk-play";

/// Best-effort event sound.
pub fn play_sound(name: &str, description: &str) {
    let Some(player) = glib::find_program_in_path(SOUND_PLAYER) else {
        debug!("{} not found, skipping sound {}", SOUND_PLAYER, name);
        return;
    };

    let spawned = Command::new(player)
        .arg(format!("--id={}", name))
        .arg(format!("--description={}", description))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    if let Err(e) = spawned {
        debug!("Failed to play sound {}: {}", name, e);
    }
}

/// Start `program` on `path`, detached.
pub fn launch_editor(program: &str, path: &Path) -> ScreenshotResult<()> {
    let executable = glib::find_program_in_path(program)
        .ok_or_else(|| ScreenshotError::ExternalToolUnavailable(program.to_string()))?;

    Command::new(&executable)
        .arg(path)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|e| {
            warn!("Failed to start {:?}: {}", executable, e);
            ScreenshotError::ExternalToolUnavailable(program.to_string())
        })?;

    info!("Opened {:?} in {}", path, program);
    Ok(())
}

pub fn has_default_app(mime_type: &str) -> bool {
    gio::AppInfo::default_for_type(mime_type, true).is_some()
}

pub fn open_in_viewer(uri: &str) {
    if let Err(e) = gio::AppInfo::launch_default_for_uri(uri, None::<&gio::AppLaunchContext>) {
        warn!("Failed to open {}: {}", uri, e);
    }
}
