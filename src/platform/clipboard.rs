//! Clipboard access
//!
//! Interactive runs put a texture on the display clipboard. Headless runs
//! exit right away, so they hand a PNG file to `wl-copy` or `xclip` instead.

use gtk4 as gtk;

use gtk::gdk::Texture;
use gtk::gdk_pixbuf::{Colorspace, Pixbuf};
use gtk::prelude::*;
use gtk::{gio, glib};
use image::RgbaImage;
use log::{debug, info};
use std::ffi::OsStr;
use std::path::Path;

use super::session::ClipboardTool;
use crate::error::{ScreenshotError, ScreenshotResult};

pub fn rgba_image_to_pixbuf(image: &RgbaImage) -> Pixbuf {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let stride = width * 4;
    let bytes = glib::Bytes::from_owned(image.as_raw().clone());

    Pixbuf::from_bytes(&bytes, Colorspace::Rgb, true, 8, width, height, stride)
}

pub fn texture_for_image(image: &RgbaImage) -> Texture {
    Texture::for_pixbuf(&rgba_image_to_pixbuf(image))
}

/// In-process clipboard, alive as long as the application is.
pub struct ClipboardManager {
    display: gtk::gdk::Display,
}

impl ClipboardManager {
    pub fn new(display: gtk::gdk::Display) -> Self {
        Self { display }
    }

    pub fn for_default_display() -> ScreenshotResult<Self> {
        gtk::gdk::Display::default()
            .map(Self::new)
            .ok_or_else(|| ScreenshotError::Clipboard("no display available".to_string()))
    }

    pub fn copy_image(&self, image: &RgbaImage) -> ScreenshotResult<()> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScreenshotError::Clipboard("the image is empty".to_string()));
        }

        self.display
            .clipboard()
            .set_texture(&texture_for_image(image));
        info!("Image copied to clipboard");
        Ok(())
    }
}

/// Hand a PNG file to an external clipboard owner.
pub async fn publish_png_file(tool: ClipboardTool, path: &Path) -> ScreenshotResult<()> {
    let program = glib::find_program_in_path(tool.program())
        .ok_or_else(|| ScreenshotError::ExternalToolUnavailable(tool.program().to_string()))?;

    let launcher = gio::SubprocessLauncher::new(gio::SubprocessFlags::STDOUT_SILENCE);
    launcher.set_stdin_file_path(Some(path));

    let argv = tool.argv(&program);
    let argv: Vec<&OsStr> = argv.iter().map(|arg| arg.as_os_str()).collect();

    debug!("Publishing {:?} through {:?}", path, program);
    let process = launcher.spawn(&argv).map_err(clipboard_error)?;
    process
        .wait_check_future()
        .await
        .map_err(|e| ScreenshotError::Clipboard(format!("{}: {}", tool.program(), e)))?;

    info!("Image copied to clipboard");
    Ok(())
}

fn clipboard_error(err: glib::Error) -> ScreenshotError {
    ScreenshotError::Clipboard(err.to_string())
}
