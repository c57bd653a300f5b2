//! Screen capture module using xcap library
//!
//! Grabs whole monitors. A screen capture lays every monitor out on one
//! canvas the way they sit on the desktop, and area captures start from
//! that same frozen image.

use image::{imageops, RgbaImage};
use log::{debug, warn};
use xcap::Monitor;

use super::CaptureRect;
use crate::error::{ScreenshotError, ScreenshotResult};

/// Information about a monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub is_primary: bool,
}

impl MonitorInfo {
    fn from_xcap(monitor: &Monitor) -> ScreenshotResult<Self> {
        Ok(Self {
            name: monitor.name().map_err(capture_error)?,
            x: monitor.x().map_err(capture_error)?,
            y: monitor.y().map_err(capture_error)?,
            width: monitor.width().map_err(capture_error)?,
            height: monitor.height().map_err(capture_error)?,
            is_primary: monitor.is_primary().unwrap_or(false),
        })
    }

    /// Whether a global point falls on this monitor
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && (x - self.x) < self.width as i32
            && (y - self.y) < self.height as i32
    }
}

/// Result of a screen capture operation
pub struct CaptureResult {
    pub image: RgbaImage,
    pub monitor_info: MonitorInfo,
}

/// Capture the primary monitor, or the first one if none claims to be primary
pub fn capture_primary_monitor() -> ScreenshotResult<CaptureResult> {
    let monitors = Monitor::all().map_err(capture_error)?;

    let monitor = monitors
        .iter()
        .find(|m| m.is_primary().unwrap_or(false))
        .or(monitors.first())
        .ok_or_else(|| ScreenshotError::Capture("no monitors available".to_string()))?;

    capture_monitor_internal(monitor)
}

/// Capture the whole desktop, every monitor at its place
pub fn capture_all_monitors() -> ScreenshotResult<RgbaImage> {
    let monitors = Monitor::all().map_err(capture_error)?;

    let mut shots = Vec::with_capacity(monitors.len());
    for monitor in &monitors {
        match capture_monitor_internal(monitor) {
            Ok(shot) => shots.push(shot),
            Err(e) => warn!("Skipping a monitor: {}", e),
        }
    }

    compose(shots).ok_or_else(|| ScreenshotError::Capture("no monitors available".to_string()))
}

/// Global rectangle covering every captured monitor.
fn desktop_bounds(shots: &[CaptureResult]) -> Option<CaptureRect> {
    let left = shots.iter().map(|s| s.monitor_info.x).min()?;
    let top = shots.iter().map(|s| s.monitor_info.y).min()?;
    let right = shots
        .iter()
        .map(|s| s.monitor_info.x + s.image.width() as i32)
        .max()?;
    let bottom = shots
        .iter()
        .map(|s| s.monitor_info.y + s.image.height() as i32)
        .max()?;

    Some(CaptureRect::new(
        left,
        top,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

/// Paste monitor images onto one canvas. Gaps between monitors stay transparent.
fn compose(mut shots: Vec<CaptureResult>) -> Option<RgbaImage> {
    if shots.len() == 1 {
        return shots.pop().map(|shot| shot.image);
    }

    let bounds = desktop_bounds(&shots)?;
    let mut canvas = RgbaImage::new(bounds.width, bounds.height);
    for shot in &shots {
        imageops::overlay(
            &mut canvas,
            &shot.image,
            (shot.monitor_info.x - bounds.x) as i64,
            (shot.monitor_info.y - bounds.y) as i64,
        );
    }

    debug!(
        "Composed {} monitors into {}x{}",
        shots.len(),
        bounds.width,
        bounds.height
    );
    Some(canvas)
}

/// Capture the monitor showing a global point
pub fn capture_monitor_at_point(x: i32, y: i32) -> ScreenshotResult<CaptureResult> {
    match Monitor::from_point(x, y) {
        Ok(monitor) => capture_monitor_internal(&monitor),
        Err(e) => {
            warn!("No monitor at ({}, {}): {}, using the primary one", x, y, e);
            capture_primary_monitor()
        }
    }
}

fn capture_monitor_internal(monitor: &Monitor) -> ScreenshotResult<CaptureResult> {
    let monitor_info = MonitorInfo::from_xcap(monitor)?;
    debug!(
        "Capturing monitor {} ({}x{}, primary: {})",
        monitor_info.name, monitor_info.width, monitor_info.height, monitor_info.is_primary
    );

    let image = monitor.capture_image().map_err(capture_error)?;

    Ok(CaptureResult {
        image,
        monitor_info,
    })
}

fn capture_error(err: impl std::fmt::Display) -> ScreenshotError {
    ScreenshotError::Capture(err.to_string())
}
