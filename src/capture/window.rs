//! Window capture using xcap
//!
//! Grabs the focused window. With the border included the window's frame is
//! cut out of its monitor image, so server-side decorations are kept.

use image::RgbaImage;
use log::{debug, warn};
use xcap::Window;

use super::screen::capture_monitor_at_point;
use super::{crop, CaptureRect};
use crate::error::{ScreenshotError, ScreenshotResult};

#[derive(Debug, Clone)]
pub struct WindowInfo {
    pub id: u32,

    pub app_name: String,

    pub title: String,

    pub x: i32,

    pub y: i32,

    pub width: u32,

    pub height: u32,

    pub is_minimized: bool,

    pub is_focused: bool,
}

impl WindowInfo {
    fn from_xcap_window(window: &Window) -> ScreenshotResult<Self> {
        Ok(Self {
            id: window.id().map_err(capture_error)?,
            app_name: window.app_name().unwrap_or_default(),
            title: window.title().unwrap_or_default(),
            x: window.x().map_err(capture_error)?,
            y: window.y().map_err(capture_error)?,
            width: window.width().map_err(capture_error)?,
            height: window.height().map_err(capture_error)?,
            is_minimized: window.is_minimized().unwrap_or(false),
            is_focused: window.is_focused().unwrap_or(false),
        })
    }

    pub fn display_label(&self) -> String {
        if self.title.is_empty() {
            format!("{} (ID: {})", self.app_name, self.id)
        } else {
            format!("{} - {}", self.title, self.app_name)
        }
    }

    /// Window bounds in global coordinates
    pub fn frame(&self) -> CaptureRect {
        CaptureRect::new(self.x, self.y, self.width, self.height)
    }
}

/// Index of the window to grab: the focused one, else the first visible one.
pub fn pick_active(windows: &[WindowInfo]) -> Option<usize> {
    windows
        .iter()
        .position(|w| w.is_focused && !w.is_minimized)
        .or_else(|| {
            windows
                .iter()
                .position(|w| !w.is_minimized && w.width > 0 && w.height > 0)
        })
}

/// Capture the active window.
pub fn capture_active_window(include_border: bool) -> ScreenshotResult<RgbaImage> {
    let windows = Window::all().map_err(capture_error)?;

    let mut infos = Vec::with_capacity(windows.len());
    let mut handles = Vec::with_capacity(windows.len());
    for window in windows {
        match WindowInfo::from_xcap_window(&window) {
            Ok(info) => {
                infos.push(info);
                handles.push(window);
            }
            Err(e) => warn!("Skipping a window: {}", e),
        }
    }

    let index = pick_active(&infos).ok_or_else(|| {
        ScreenshotError::Capture("Unable to capture a screenshot of any window".to_string())
    })?;
    let info = &infos[index];
    debug!(
        "Capturing window '{}' (border: {})",
        info.display_label(),
        include_border
    );

    if include_border {
        match capture_with_frame(info) {
            Ok(image) => return Ok(image),
            Err(e) => warn!("Failed to cut the window out of its monitor: {}", e),
        }
    }

    handles[index].capture_image().map_err(capture_error)
}

fn capture_with_frame(info: &WindowInfo) -> ScreenshotResult<RgbaImage> {
    let monitor = capture_monitor_at_point(info.x, info.y)?;
    let origin = &monitor.monitor_info;
    if !origin.contains(info.x, info.y) {
        debug!(
            "Window '{}' starts outside monitor {}, cropping what overlaps",
            info.display_label(),
            origin.name
        );
    }

    let local = info.frame().translated(-origin.x, -origin.y);

    crop(&monitor.image, local).ok_or_else(|| {
        ScreenshotError::Capture(format!(
            "window '{}' lies outside its monitor",
            info.display_label()
        ))
    })
}

fn capture_error(err: impl std::fmt::Display) -> ScreenshotError {
    ScreenshotError::Capture(err.to_string())
}
