//! Capture module for screen, window and area capture
//!
//! Wraps xcap so the rest of the crate only sees `image::RgbaImage` buffers.
//! Which backend runs is up to the `Desktop` collaborator, so `acquire` is
//! the same code in headless, interactive and test runs.

pub mod effects;
pub mod screen;
pub mod window;

use image::{imageops, RgbaImage};
use log::{debug, info};
use std::time::Duration;

use crate::app::{CaptureConfig, CaptureMode};
use crate::error::ScreenshotResult;
use crate::platform::Desktop;

/// Interactive zero-delay captures still wait for the options window to go.
const DIALOG_DISMISS_DELAY: Duration = Duration::from_millis(200);

/// Rectangle in image (or global) pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle spanned by two drag corners
    pub fn from_corners(start: (f64, f64), end: (f64, f64)) -> Self {
        let (x0, x1) = (start.0.min(end.0), start.0.max(end.0));
        let (y0, y1) = (start.1.min(end.1), start.1.max(end.1));

        Self {
            x: x0.round() as i32,
            y: y0.round() as i32,
            width: (x1 - x0).round() as u32,
            height: (y1 - y0).round() as u32,
        }
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Intersection with a `width` x `height` image, or None if empty
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let x0 = (self.x as i64).clamp(0, width as i64);
        let y0 = (self.y as i64).clamp(0, height as i64);
        let x1 = (self.x as i64 + self.width as i64).clamp(0, width as i64);
        let y1 = (self.y as i64 + self.height as i64).clamp(0, height as i64);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(Self::new(
            x0 as i32,
            y0 as i32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        ))
    }

    /// Too small to be a deliberate selection
    pub fn is_significant(&self) -> bool {
        self.width > 2 && self.height > 2
    }
}

/// Which backend grab to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    Screen,
    Window { include_border: bool },
}

/// Copy `rect` out of `image`, clamped to its bounds.
pub fn crop(image: &RgbaImage, rect: CaptureRect) -> Option<RgbaImage> {
    let rect = rect.clamp_to(image.width(), image.height())?;
    Some(
        imageops::crop_imm(image, rect.x as u32, rect.y as u32, rect.width, rect.height)
            .to_image(),
    )
}

/// How long to wait before grabbing.
pub fn capture_delay(config: &CaptureConfig) -> Duration {
    let seconds = match config.mode {
        CaptureMode::Area => 0,
        _ => config.delay,
    };

    if seconds == 0 && config.interactive {
        DIALOG_DISMISS_DELAY
    } else {
        Duration::from_secs(seconds as u64)
    }
}

/// Produce the image the configuration asks for.
///
/// `Ok(None)` means the user cancelled an area selection.
pub async fn acquire<D: Desktop>(
    desktop: &D,
    config: &CaptureConfig,
) -> ScreenshotResult<Option<RgbaImage>> {
    if config.include_pointer {
        debug!("The capture backend cannot composite the pointer, leaving it out");
    }

    let image = match config.mode {
        CaptureMode::Screen => desktop.grab(CaptureSource::Screen)?,
        CaptureMode::Window => {
            let window = desktop.grab(CaptureSource::Window {
                include_border: config.include_border,
            })?;
            effects::apply(config.border_effect, window)
        }
        CaptureMode::Area => {
            let frozen = desktop.grab(CaptureSource::Screen)?;
            let Some(rect) = desktop.select_area(&frozen).await else {
                info!("Area selection cancelled");
                return Ok(None);
            };
            let Some(area) = crop(&frozen, rect) else {
                info!("Selected area {:?} is empty", rect);
                return Ok(None);
            };
            area
        }
    };

    debug!("Captured {}x{} image", image.width(), image.height());
    Ok(Some(image))
}
