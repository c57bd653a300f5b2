//! Desktop collaborators
//!
//! Everything a run needs from the machine it runs on sits behind `Desktop`:
//! grabbing pixels, the area selector, sounds, the recent files registry and
//! the clipboard. `GtkDesktop` is the real thing.

pub mod clipboard;
pub mod external;
pub mod session;

use gtk4 as gtk;
use gtk4::prelude::*;
use libadwaita as adw;

use image::RgbaImage;
use log::debug;
use std::path::Path;

use crate::capture::{screen, window, CaptureRect, CaptureSource};
use crate::error::ScreenshotResult;
use session::DisplayServer;

#[allow(async_fn_in_trait)]
pub trait Desktop {
    fn grab(&self, source: CaptureSource) -> ScreenshotResult<RgbaImage>;

    /// Let the user pick a rectangle of `frozen`, in its pixel coordinates.
    async fn select_area(&self, frozen: &RgbaImage) -> Option<CaptureRect>;

    fn play_sound(&self, name: &str, description: &str);

    fn add_recent(&self, uri: &str, mime_type: &str);

    /// In-process clipboard, for interactive runs.
    fn copy_image(&self, image: &RgbaImage) -> ScreenshotResult<()>;

    /// Clipboard that outlives the process, fed from a saved PNG.
    async fn publish_clipboard(&self, png: &Path) -> ScreenshotResult<()>;
}

pub struct GtkDesktop {
    app: adw::Application,
    display_server: DisplayServer,
}

impl GtkDesktop {
    pub fn new(app: &adw::Application) -> Self {
        let display_server = DisplayServer::detect();
        debug!("Detected display server: {}", display_server);

        Self {
            app: app.clone(),
            display_server,
        }
    }
}

impl Desktop for GtkDesktop {
    fn grab(&self, source: CaptureSource) -> ScreenshotResult<RgbaImage> {
        match source {
            CaptureSource::Screen => screen::capture_all_monitors(),
            CaptureSource::Window { include_border } => {
                window::capture_active_window(include_border)
            }
        }
    }

    async fn select_area(&self, frozen: &RgbaImage) -> Option<CaptureRect> {
        crate::ui::area::select_area(&self.app, frozen).await
    }

    fn play_sound(&self, name: &str, description: &str) {
        external::play_sound(name, description);
    }

    fn add_recent(&self, uri: &str, mime_type: &str) {
        if !external::has_default_app(mime_type) {
            debug!("No default application for {}, not adding {} to recent files", mime_type, uri);
            return;
        }

        if !gtk::RecentManager::default().add_item(uri) {
            debug!("Recent manager rejected {}", uri);
        }
    }

    fn copy_image(&self, image: &RgbaImage) -> ScreenshotResult<()> {
        clipboard::ClipboardManager::for_default_display()?.copy_image(image)
    }

    async fn publish_clipboard(&self, png: &Path) -> ScreenshotResult<()> {
        clipboard::publish_png_file(self.display_server.clipboard_tool(), png).await
    }
}
