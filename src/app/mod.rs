//! Application module
//!
//! Configuration, session state and the two ways a run can go: headless or
//! through the interactive flow.

pub mod config;
pub mod flow;
pub mod headless;
pub mod lifecycle;
pub mod settings;
pub mod shell;
pub mod state;

pub use config::{BorderEffect, CaptureConfig, CaptureMode};
pub use lifecycle::Lifecycle;
pub use settings::KeyFileSettings;
