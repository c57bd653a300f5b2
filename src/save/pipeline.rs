//! Save pipeline
//!
//! `Idle -> Encoding -> Written`, with an existing target diverting through
//! `Conflict` to either an overwrite retry or a failure. One save per
//! session runs at a time; the session's `SaveLock` is held for the whole
//! span, overwrite prompt included.

use gtk4::gio;
use gtk4::gio::prelude::*;
use gtk4::glib;
use log::{debug, info, warn};

use crate::app::state::{SaveJob, SaveLock, SaveTarget};
use crate::error::{ScreenshotError, ScreenshotResult};
use crate::save::encode::encode;
use crate::save::format::SaveFormat;

/// Asks whether an existing file may be replaced.
#[allow(async_fn_in_trait)]
pub trait OverwritePrompt {
    async fn confirm_overwrite(&self, target: &SaveTarget) -> bool;
}

/// Never overwrites. Used where nobody can be asked.
pub struct DenyOverwrite;

impl OverwritePrompt for DenyOverwrite {
    async fn confirm_overwrite(&self, target: &SaveTarget) -> bool {
        debug!("Not asking to overwrite {:?}", target.path());
        false
    }
}

/// A finished save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub target: SaveTarget,
    pub format: SaveFormat,
}

/// Runs the pipeline to completion, retrying with overwrite when the prompt
/// allows it. On return `job.overwrite` reflects what was finally used.
pub async fn save<P: OverwritePrompt>(
    job: &mut SaveJob,
    lock: &SaveLock,
    prompt: &P,
) -> ScreenshotResult<SavedImage> {
    let _in_flight = lock.try_acquire()?;

    loop {
        match write_once(job).await {
            Err(err) if err.is_conflict() && !job.overwrite => {
                if !prompt.confirm_overwrite(&job.target).await {
                    return Err(err);
                }
                info!("Overwriting {:?}", job.target.path());
                job.overwrite = true;
            }
            result => return result,
        }
    }
}

/// One attempt: encode, open for create (or replace), write, close.
pub async fn write_once(job: &SaveJob) -> ScreenshotResult<SavedImage> {
    let format = SaveFormat::for_path(job.target.path());
    let bytes = encode(&job.image, format, job.color_profile.as_ref())?;

    let file = job.target.file();
    let stream = if job.overwrite {
        file.replace_future(
            None,
            false,
            gio::FileCreateFlags::NONE,
            glib::Priority::DEFAULT,
        )
        .await
    } else {
        file.create_future(gio::FileCreateFlags::NONE, glib::Priority::DEFAULT)
            .await
    }
    .map_err(|e| open_error(e, &job.target))?;

    debug!("Writing {} bytes to {}", bytes.len(), job.target.uri());

    let written = match stream
        .write_all_future(bytes, glib::Priority::DEFAULT)
        .await
    {
        Ok((_, _, None)) => Ok(()),
        Ok((_, _, Some(e))) | Err((_, e)) => Err(e),
    };

    let closed = stream.close_future(glib::Priority::DEFAULT).await;

    if let Err(e) = written.and(closed) {
        if !job.overwrite {
            discard_partial(&file).await;
        }
        return Err(ScreenshotError::EncodeWrite(e.to_string()));
    }

    Ok(SavedImage {
        target: job.target.clone(),
        format,
    })
}

fn open_error(err: glib::Error, target: &SaveTarget) -> ScreenshotError {
    if err.matches(gio::IOErrorEnum::Exists) {
        ScreenshotError::FileConflict {
            file_name: target.file_name(),
            folder: target.folder_name(),
        }
    } else {
        ScreenshotError::EncodeWrite(err.to_string())
    }
}

async fn discard_partial(file: &gio::File) {
    if let Err(e) = file.delete_future(glib::Priority::DEFAULT).await {
        warn!("Failed to remove partial file {}: {}", file.uri(), e);
    }
}
