//! Filename builder
//!
//! Picks a writable folder and a `Screenshot from <timestamp>.png` name that
//! does not exist yet, appending ` - 2`, ` - 3`, ... on collisions. All
//! probing goes through async `query_info`, so the event loop keeps running.

use gtk4::gio;
use gtk4::gio::prelude::*;
use gtk4::glib;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::error::{ScreenshotError, ScreenshotResult};

const NAME_PREFIX: &str = "Screenshot from";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S";
const EXTENSION: &str = "png";
const MAX_ATTEMPTS: u32 = 10_000;

/// Resolve a fresh save path under `preferred`, or a default folder.
pub async fn resolve_save_path(preferred: Option<&Path>) -> ScreenshotResult<PathBuf> {
    let candidates = candidate_directories(preferred);
    let directory = pick_directory(&candidates).await?;
    let stem = timestamp_stem()?;

    unique_path(&directory, &stem).await
}

/// Preferred folder first, then Pictures, then home.
pub fn candidate_directories(preferred: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(dir) = preferred {
        candidates.push(dir.to_path_buf());
    }
    if let Some(pictures) = glib::user_special_dir(glib::UserDirectory::Pictures) {
        candidates.push(pictures);
    }
    candidates.push(glib::home_dir());

    candidates.dedup();
    candidates
}

pub async fn pick_directory(candidates: &[PathBuf]) -> ScreenshotResult<PathBuf> {
    for dir in candidates {
        if is_writable_directory(dir).await {
            debug!("Saving screenshots in {:?}", dir);
            return Ok(dir.clone());
        }
        warn!("{:?} is not a writable folder, trying the next one", dir);
    }

    Err(ScreenshotError::PathResolution(
        "no writable folder found".to_string(),
    ))
}

pub fn candidate_name(stem: &str, index: u32) -> String {
    if index <= 1 {
        format!("{}.{}", stem, EXTENSION)
    } else {
        format!("{} - {}.{}", stem, index, EXTENSION)
    }
}

/// First `candidate_name` in `directory` that does not exist.
pub async fn unique_path(directory: &Path, stem: &str) -> ScreenshotResult<PathBuf> {
    for index in 1..=MAX_ATTEMPTS {
        let candidate = directory.join(candidate_name(stem, index));
        if !exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Err(ScreenshotError::PathResolution(format!(
        "every name for {:?} is taken in {:?}",
        stem, directory
    )))
}

fn timestamp_stem() -> ScreenshotResult<String> {
    let now = glib::DateTime::now_local()
        .map_err(|e| ScreenshotError::PathResolution(e.to_string()))?;
    let timestamp = now
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| ScreenshotError::PathResolution(e.to_string()))?;

    Ok(format!("{} {}", NAME_PREFIX, timestamp))
}

async fn exists(path: &Path) -> ScreenshotResult<bool> {
    let result = gio::File::for_path(path)
        .query_info_future(
            gio::FILE_ATTRIBUTE_STANDARD_TYPE,
            gio::FileQueryInfoFlags::NONE,
            glib::Priority::DEFAULT,
        )
        .await;

    match result {
        Ok(_) => Ok(true),
        Err(e) if e.matches(gio::IOErrorEnum::NotFound) => Ok(false),
        Err(e) => Err(ScreenshotError::PathResolution(e.to_string())),
    }
}

async fn is_writable_directory(path: &Path) -> bool {
    let attributes = format!(
        "{},{}",
        gio::FILE_ATTRIBUTE_STANDARD_TYPE,
        gio::FILE_ATTRIBUTE_ACCESS_CAN_WRITE
    );

    match gio::File::for_path(path)
        .query_info_future(
            &attributes,
            gio::FileQueryInfoFlags::NONE,
            glib::Priority::DEFAULT,
        )
        .await
    {
        Ok(info) => {
            info.file_type() == gio::FileType::Directory
                && info.boolean(gio::FILE_ATTRIBUTE_ACCESS_CAN_WRITE)
        }
        Err(e) => {
            debug!("Cannot inspect {:?}: {}", path, e);
            false
        }
    }
}
