//! FlowCanvas Application
//!
//! Command-line shell around the designer core: loads workflows from files or
//! a store, replays scripted canvas events and writes definitions and SVG.

pub mod cli;
pub mod commands;
mod error;
mod shortcuts;

pub use cli::Cli;
pub use commands::{ReplayReport, replay, run, summarize};
pub use error::{AppError, AppResult};
pub use shortcuts::{Shortcut, ShortcutRegistry};
