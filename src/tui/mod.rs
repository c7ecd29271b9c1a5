//! TUI module: Terminal User Interface using Ratatui.
//!
//! Two screens:
//! - Patient health information form
//! - Medical report with risk charts

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
