//! Writing captures to disk
//!
//! Format selection, encoding, the async save pipeline and the filename
//! builder used when no explicit target is given.

pub mod encode;
pub mod filename;
pub mod format;
pub mod pipeline;

pub use filename::resolve_save_path;
pub use pipeline::{save, DenyOverwrite, OverwritePrompt, SavedImage};
