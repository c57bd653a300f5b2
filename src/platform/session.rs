//! Desktop session detection
//!
//! Only the display server matters here: it picks the command line tool that
//! can keep an image on the clipboard after this process has exited.

use std::env;
use std::ffi::OsString;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    Wayland,
    X11,
    Unknown,
}

impl std::fmt::Display for DisplayServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayServer::Wayland => write!(f, "Wayland"),
            DisplayServer::X11 => write!(f, "X11"),
            DisplayServer::Unknown => write!(f, "Unknown"),
        }
    }
}

impl DisplayServer {
    pub fn detect() -> Self {
        classify(
            env::var("XDG_SESSION_TYPE").ok().as_deref(),
            env::var_os("WAYLAND_DISPLAY").is_some(),
            env::var_os("DISPLAY").is_some(),
        )
    }

    pub fn clipboard_tool(&self) -> ClipboardTool {
        match self {
            DisplayServer::Wayland => ClipboardTool::WlCopy,
            DisplayServer::X11 | DisplayServer::Unknown => ClipboardTool::Xclip,
        }
    }
}

fn classify(session_type: Option<&str>, has_wayland: bool, has_x11: bool) -> DisplayServer {
    if let Some(session_type) = session_type {
        match session_type.to_lowercase().as_str() {
            "wayland" => return DisplayServer::Wayland,
            "x11" => return DisplayServer::X11,
            _ => {}
        }
    }

    if has_wayland {
        return DisplayServer::Wayland;
    }

    if has_x11 {
        return DisplayServer::X11;
    }

    DisplayServer::Unknown
}

/// External clipboard owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardTool {
    WlCopy,
    Xclip,
}

impl ClipboardTool {
    pub fn program(&self) -> &'static str {
        match self {
            ClipboardTool::WlCopy => "wl-copy",
            ClipboardTool::Xclip => "xclip",
        }
    }

    /// Command line that reads a PNG from stdin and owns the clipboard afterwards.
    pub fn argv(&self, program: &Path) -> Vec<OsString> {
        let args: &[&str] = match self {
            ClipboardTool::WlCopy => &["--type", "image/png"],
            ClipboardTool::Xclip => &["-selection", "clipboard", "-t", "image/png", "-i"],
        };

        std::iter::once(program.as_os_str().to_owned())
            .chain(args.iter().map(OsString::from))
            .collect()
    }
}
