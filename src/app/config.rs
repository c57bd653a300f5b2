//! Capture configuration
//!
//! The validated options record for one run, built from the command line
//! and the persisted settings, then passed explicitly to every entry point.

use clap::ValueEnum;
use gtk4::gio::prelude::*;
use gtk4::{gio, glib};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::app::settings::{
    SettingsStore, AUTO_SAVE_DIRECTORY_KEY, BORDER_EFFECT_KEY, COLOR_PROFILE_KEY, DELAY_KEY,
    IMAGE_EDITOR_KEY, INCLUDE_BORDER_KEY, INCLUDE_POINTER_KEY, LAST_SAVE_DIRECTORY_KEY,
    PLAY_SOUND_KEY,
};
use crate::app::state::ColorProfile;
use crate::cli::Cli;
use crate::error::{ScreenshotError, ScreenshotResult};

pub const DEFAULT_EDITOR: &str = "pinta";
pub const CAPTURE_SOUND: &str = "screen-capture";
pub const ERROR_SOUND: &str = "dialog-error";

/// What part of the screen to grab
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureMode {
    #[default]
    Screen,
    Window,
    Area,
}

/// Decoration applied to window captures
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BorderEffect {
    Shadow,
    Border,
    Vintage,
    #[default]
    None,
}

impl BorderEffect {
    pub const ALL: [BorderEffect; 4] = [
        BorderEffect::None,
        BorderEffect::Shadow,
        BorderEffect::Border,
        BorderEffect::Vintage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BorderEffect::Shadow => "shadow",
            BorderEffect::Border => "border",
            BorderEffect::Vintage => "vintage",
            BorderEffect::None => "none",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BorderEffect::Shadow => "Drop shadow",
            BorderEffect::Border => "Border",
            BorderEffect::Vintage => "Vintage",
            BorderEffect::None => "None",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value.trim(), true).ok()
    }
}

/// Where the image goes when the run is not interactive
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// `--file`: exactly this path, replacing any existing file
    File(PathBuf),
    /// `--clipboard`: no file is kept
    Clipboard,
    /// A generated, non-colliding name in the save folder
    AutoNamed,
}

#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub mode: CaptureMode,
    pub include_border: bool,
    pub include_pointer: bool,
    pub border_effect: BorderEffect,
    pub delay: u32,
    pub interactive: bool,
    pub destination: Destination,
    pub play_sound: bool,
    pub save_dir: Option<PathBuf>,
    pub editor: String,
    pub color_profile: Option<ColorProfile>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Screen,
            include_border: true,
            include_pointer: false,
            border_effect: BorderEffect::None,
            delay: 0,
            interactive: false,
            destination: Destination::AutoNamed,
            play_sound: true,
            save_dir: None,
            editor: DEFAULT_EDITOR.to_string(),
            color_profile: None,
        }
    }
}

impl CaptureConfig {
    /// Validate the command line and merge it over the persisted settings.
    pub fn from_cli(cli: &Cli, settings: &dyn SettingsStore) -> ScreenshotResult<Self> {
        if cli.window && cli.area {
            return Err(ScreenshotError::InvalidOptions(
                "--window and --area should not be used at the same time".to_string(),
            ));
        }
        if cli.include_border && cli.remove_border {
            return Err(ScreenshotError::InvalidOptions(
                "--include-border and --remove-border should not be used at the same time"
                    .to_string(),
            ));
        }
        if cli.clipboard && cli.file.is_some() {
            return Err(ScreenshotError::InvalidOptions(
                "--clipboard and --file should not be used at the same time".to_string(),
            ));
        }
        if cli.interactive && (cli.clipboard || cli.file.is_some()) {
            return Err(ScreenshotError::InvalidOptions(
                "--interactive chooses the destination itself".to_string(),
            ));
        }

        let mode = if cli.window {
            CaptureMode::Window
        } else if cli.area {
            CaptureMode::Area
        } else {
            CaptureMode::Screen
        };

        let include_border = if cli.remove_border {
            false
        } else if cli.include_border {
            true
        } else {
            settings.boolean(INCLUDE_BORDER_KEY).unwrap_or(true)
        };

        let border_effect = cli.border_effect.unwrap_or_else(|| {
            settings
                .string(BORDER_EFFECT_KEY)
                .and_then(|value| {
                    let effect = BorderEffect::parse(&value);
                    if effect.is_none() {
                        warn!("Unknown border effect {:?} in settings", value);
                    }
                    effect
                })
                .unwrap_or_default()
        });

        let delay = match cli.delay {
            Some(delay) => delay,
            None if cli.interactive => settings.uint(DELAY_KEY).unwrap_or(0),
            None => 0,
        };

        let destination = match (&cli.file, cli.clipboard) {
            (Some(path), _) => Destination::File(path.clone()),
            (None, true) => Destination::Clipboard,
            (None, false) => Destination::AutoNamed,
        };

        let dir_key = if cli.interactive {
            LAST_SAVE_DIRECTORY_KEY
        } else {
            AUTO_SAVE_DIRECTORY_KEY
        };
        let save_dir = settings
            .string(dir_key)
            .and_then(|value| expand_folder(&value));

        let color_profile = settings
            .string(COLOR_PROFILE_KEY)
            .and_then(|path| load_color_profile(Path::new(&path)));

        Ok(Self {
            mode,
            include_border,
            include_pointer: cli.include_pointer
                || settings.boolean(INCLUDE_POINTER_KEY).unwrap_or(false),
            border_effect,
            delay,
            interactive: cli.interactive,
            destination,
            play_sound: settings.boolean(PLAY_SOUND_KEY).unwrap_or(true),
            save_dir,
            editor: settings
                .string(IMAGE_EDITOR_KEY)
                .unwrap_or_else(|| DEFAULT_EDITOR.to_string()),
            color_profile,
        })
    }

    /// Whether a failure should end the process with a failure status.
    pub fn has_explicit_file(&self) -> bool {
        matches!(self.destination, Destination::File(_))
    }

    /// Store the options a user would expect to be remembered.
    pub fn persist(&self, settings: &dyn SettingsStore) {
        debug!("Persisting capture options");
        settings.set_string(BORDER_EFFECT_KEY, self.border_effect.as_str());
        settings.set_boolean(INCLUDE_BORDER_KEY, self.include_border);
        settings.set_boolean(INCLUDE_POINTER_KEY, self.include_pointer);
        if self.interactive {
            settings.set_string(DELAY_KEY, &self.delay.to_string());
        }
    }
}

/// Accepts plain paths, `~/...` and `file://` URIs.
pub fn expand_folder(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.starts_with("file://") {
        return gio::File::for_uri(value).path();
    }

    if value == "~" {
        return Some(glib::home_dir());
    }

    if let Some(rest) = value.strip_prefix("~/") {
        return Some(glib::home_dir().join(rest));
    }

    Some(PathBuf::from(value))
}

fn load_color_profile(path: &Path) -> Option<ColorProfile> {
    match std::fs::read(path) {
        Ok(bytes) if !bytes.is_empty() => {
            let profile = ColorProfile::from_bytes(&bytes);
            debug!(
                "Loaded color profile {:?} ({} bytes, {} encoded)",
                path,
                bytes.len(),
                profile.as_base64().len()
            );
            Some(profile)
        }
        Ok(_) => {
            warn!("Color profile {:?} is empty", path);
            None
        }
        Err(e) => {
            warn!("Failed to read color profile {:?}: {}", path, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::settings::testing::MemorySettings;

    fn cli(args: &[&str]) -> Cli {
        use clap::Parser;
        let mut argv = vec!["shutterbug"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = CaptureConfig::from_cli(&cli(&[]), &MemorySettings::new()).unwrap();

        assert_eq!(config.mode, CaptureMode::Screen);
        assert_eq!(config.destination, Destination::AutoNamed);
        assert_eq!(config.border_effect, BorderEffect::None);
        assert_eq!(config.editor, DEFAULT_EDITOR);
        assert!(config.include_border);
        assert!(config.play_sound);
        assert!(!config.has_explicit_file());
    }

    #[test]
    fn test_window_and_area_conflict() {
        let err = CaptureConfig::from_cli(&cli(&["-w", "-a"]), &MemorySettings::new()).unwrap_err();
        assert!(matches!(err, ScreenshotError::InvalidOptions(_)));
    }

    #[test]
    fn test_destinations_are_exclusive() {
        let settings = MemorySettings::new();

        assert!(CaptureConfig::from_cli(&cli(&["-c", "-f", "x.png"]), &settings).is_err());
        assert!(CaptureConfig::from_cli(&cli(&["-i", "-c"]), &settings).is_err());

        let config = CaptureConfig::from_cli(&cli(&["-c"]), &settings).unwrap();
        assert_eq!(config.destination, Destination::Clipboard);

        let config = CaptureConfig::from_cli(&cli(&["-f", "report.jpg"]), &settings).unwrap();
        assert_eq!(
            config.destination,
            Destination::File(PathBuf::from("report.jpg"))
        );
        assert!(config.has_explicit_file());
    }

    #[test]
    fn test_border_flags() {
        let settings = MemorySettings::new().with(INCLUDE_BORDER_KEY, "false");

        let config = CaptureConfig::from_cli(&cli(&[]), &settings).unwrap();
        assert!(!config.include_border);

        let config = CaptureConfig::from_cli(&cli(&["-b"]), &settings).unwrap();
        assert!(config.include_border);

        assert!(CaptureConfig::from_cli(&cli(&["-b", "-B"]), &settings).is_err());
    }

    #[test]
    fn test_cli_overrides_settings() {
        let settings = MemorySettings::new()
            .with(BORDER_EFFECT_KEY, "vintage")
            .with(DELAY_KEY, "4");

        let config = CaptureConfig::from_cli(&cli(&[]), &settings).unwrap();
        assert_eq!(config.border_effect, BorderEffect::Vintage);
        // The remembered delay only applies to interactive runs.
        assert_eq!(config.delay, 0);

        let config = CaptureConfig::from_cli(&cli(&["-i"]), &settings).unwrap();
        assert_eq!(config.delay, 4);

        let config = CaptureConfig::from_cli(&cli(&["-e", "shadow", "-d", "2"]), &settings).unwrap();
        assert_eq!(config.border_effect, BorderEffect::Shadow);
        assert_eq!(config.delay, 2);
    }

    #[test]
    fn test_save_dir_depends_on_mode() {
        let settings = MemorySettings::new()
            .with(LAST_SAVE_DIRECTORY_KEY, "/tmp/last")
            .with(AUTO_SAVE_DIRECTORY_KEY, "/tmp/auto");

        let config = CaptureConfig::from_cli(&cli(&["-i"]), &settings).unwrap();
        assert_eq!(config.save_dir, Some(PathBuf::from("/tmp/last")));

        let config = CaptureConfig::from_cli(&cli(&[]), &settings).unwrap();
        assert_eq!(config.save_dir, Some(PathBuf::from("/tmp/auto")));
    }

    #[test]
    fn test_persist_writes_options_back() {
        let settings = MemorySettings::new();
        let config = CaptureConfig {
            border_effect: BorderEffect::Border,
            include_pointer: true,
            delay: 3,
            interactive: true,
            ..CaptureConfig::default()
        };

        config.persist(&settings);

        assert_eq!(settings.string(BORDER_EFFECT_KEY).as_deref(), Some("border"));
        assert_eq!(settings.boolean(INCLUDE_POINTER_KEY), Some(true));
        assert_eq!(settings.uint(DELAY_KEY), Some(3));
    }

    #[test]
    fn test_expand_folder() {
        assert_eq!(expand_folder("  "), None);
        assert_eq!(expand_folder("/srv/shots"), Some(PathBuf::from("/srv/shots")));
        assert_eq!(
            expand_folder("file:///srv/shots"),
            Some(PathBuf::from("/srv/shots"))
        );
        assert_eq!(expand_folder("~/Pictures"), Some(glib::home_dir().join("Pictures")));
    }

    #[test]
    fn test_color_profile_loaded_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("display.icc");
        std::fs::write(&path, b"fake icc data").unwrap();

        let settings = MemorySettings::new().with(COLOR_PROFILE_KEY, path.to_str().unwrap());
        let config = CaptureConfig::from_cli(&cli(&[]), &settings).unwrap();

        let profile = config.color_profile.expect("profile should load");
        assert_eq!(profile.to_bytes().unwrap(), b"fake icc data");
    }

    #[test]
    fn test_border_effect_parse() {
        assert_eq!(BorderEffect::parse("Shadow"), Some(BorderEffect::Shadow));
        assert_eq!(BorderEffect::parse("none"), Some(BorderEffect::None));
        assert_eq!(BorderEffect::parse("glitter"), None);
    }
}
