use clap::Parser;
use std::path::PathBuf;

use crate::app::BorderEffect;

/// Save images of your screen or individual windows
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "shutterbug", version, about)]
pub struct Cli {
    /// Send the grab directly to the clipboard
    #[arg(short = 'c', long)]
    pub clipboard: bool,

    /// Grab a window instead of the entire screen
    #[arg(short = 'w', long)]
    pub window: bool,

    /// Grab an area of the screen instead of the entire screen
    #[arg(short = 'a', long)]
    pub area: bool,

    /// Include the window border with the screenshot
    #[arg(short = 'b', long)]
    pub include_border: bool,

    /// Remove the window border from the screenshot
    #[arg(short = 'B', long)]
    pub remove_border: bool,

    /// Include the pointer with the screenshot
    #[arg(short = 'p', long)]
    pub include_pointer: bool,

    /// Take screenshot after specified delay [in seconds]
    #[arg(short = 'd', long, value_name = "seconds")]
    pub delay: Option<u32>,

    /// Effect to add to the border
    #[arg(short = 'e', long, value_name = "effect", value_enum)]
    pub border_effect: Option<BorderEffect>,

    /// Interactively set options
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Save screenshot directly to this file
    #[arg(short = 'f', long, value_name = "filename")]
    pub file: Option<PathBuf>,
}
