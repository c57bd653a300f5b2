//! Persisted settings
//!
//! A small string key/value store. The desktop build keeps it in a
//! `glib::KeyFile` under the user's config directory.

use gtk4::glib;
use log::{debug, warn};
use std::path::PathBuf;

pub const LAST_SAVE_DIRECTORY_KEY: &str = "last-save-directory";
pub const AUTO_SAVE_DIRECTORY_KEY: &str = "auto-save-directory";
pub const BORDER_EFFECT_KEY: &str = "border-effect";
pub const INCLUDE_BORDER_KEY: &str = "include-border";
pub const INCLUDE_POINTER_KEY: &str = "include-pointer";
pub const DELAY_KEY: &str = "delay";
pub const PLAY_SOUND_KEY: &str = "play-sound";
pub const IMAGE_EDITOR_KEY: &str = "image-editor";
pub const COLOR_PROFILE_KEY: &str = "color-profile";

const GROUP: &str = "screenshot";

pub trait SettingsStore {
    fn string(&self, key: &str) -> Option<String>;

    fn set_string(&self, key: &str, value: &str);

    fn boolean(&self, key: &str) -> Option<bool> {
        match self.string(key)?.trim() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            other => {
                warn!("Ignoring non-boolean value {:?} for {}", other, key);
                None
            }
        }
    }

    fn set_boolean(&self, key: &str, value: bool) {
        self.set_string(key, if value { "true" } else { "false" });
    }

    fn uint(&self, key: &str) -> Option<u32> {
        self.string(key)?.trim().parse().ok()
    }
}

/// Settings stored in an ini-style key file, written back on every change.
pub struct KeyFileSettings {
    key_file: glib::KeyFile,
    path: PathBuf,
}

impl KeyFileSettings {
    pub fn default_path() -> PathBuf {
        glib::user_config_dir()
            .join("shutterbug")
            .join("settings.ini")
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let key_file = glib::KeyFile::new();

        if path.exists() {
            if let Err(e) = key_file.load_from_file(&path, glib::KeyFileFlags::NONE) {
                warn!("Failed to load settings from {:?}: {}", path, e);
            }
        } else {
            debug!("No settings file at {:?}, using defaults", path);
        }

        Self { key_file, path }
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create settings directory {:?}: {}", parent, e);
                return;
            }
        }

        if let Err(e) = self.key_file.save_to_file(&self.path) {
            warn!("Failed to write settings to {:?}: {}", self.path, e);
        }
    }
}

impl SettingsStore for KeyFileSettings {
    fn string(&self, key: &str) -> Option<String> {
        self.key_file
            .string(GROUP, key)
            .ok()
            .map(|value| value.to_string())
            .filter(|value| !value.is_empty())
    }

    fn set_string(&self, key: &str, value: &str) {
        debug!("Setting {} = {:?}", key, value);
        self.key_file.set_string(GROUP, key, value);
        self.persist();
    }
}

#[cfg(test)]
pub mod testing {
    use super::SettingsStore;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Volatile store used when no file should be touched.
    #[derive(Default)]
    pub struct MemorySettings {
        values: RefCell<HashMap<String, String>>,
    }

    impl MemorySettings {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(self, key: &str, value: &str) -> Self {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            self
        }
    }

    impl SettingsStore for MemorySettings {
        fn string(&self, key: &str) -> Option<String> {
            self.values
                .borrow()
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
        }

        fn set_string(&self, key: &str, value: &str) {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemorySettings;
    use super::*;

    #[test]
    fn test_key_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.ini");

        let settings = KeyFileSettings::open(&path);
        assert_eq!(settings.string(LAST_SAVE_DIRECTORY_KEY), None);

        settings.set_string(LAST_SAVE_DIRECTORY_KEY, "/home/user/Pictures");
        settings.set_boolean(PLAY_SOUND_KEY, false);
        assert!(path.exists());

        let reopened = KeyFileSettings::open(&path);
        assert_eq!(
            reopened.string(LAST_SAVE_DIRECTORY_KEY).as_deref(),
            Some("/home/user/Pictures")
        );
        assert_eq!(reopened.boolean(PLAY_SOUND_KEY), Some(false));
    }

    #[test]
    fn test_empty_values_read_as_unset() {
        let settings = MemorySettings::new().with(IMAGE_EDITOR_KEY, "");
        assert_eq!(settings.string(IMAGE_EDITOR_KEY), None);
    }

    #[test]
    fn test_typed_accessors() {
        let settings = MemorySettings::new()
            .with(DELAY_KEY, " 5 ")
            .with(INCLUDE_POINTER_KEY, "maybe");

        assert_eq!(settings.uint(DELAY_KEY), Some(5));
        assert_eq!(settings.boolean(INCLUDE_POINTER_KEY), None);
    }
}
