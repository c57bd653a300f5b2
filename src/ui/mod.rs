//! Interactive user interface
//!
//! Options window, area overlay, review dialog and alerts, tied together by
//! the controller.

pub mod alerts;
pub mod area;
pub mod controller;
pub mod dialog;
pub mod options;

pub use controller::InteractiveController;
