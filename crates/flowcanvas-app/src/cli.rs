//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Workflow designer canvas, driven from the command line.
#[derive(Debug, Parser)]
#[command(name = "flowcanvas")]
#[command(about = "Replay and inspect workflow designer sessions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Feed a scripted event stream through the editor and save the result.
    Replay(ReplayArgs),
    /// Print a summary of a stored workflow.
    Inspect(SourceArgs),
    /// List workflows in a store directory.
    List(StoreArgs),
    /// Print the canvas keyboard shortcuts.
    Shortcuts,
}

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Workflow store directory (defaults to the user data directory).
    #[arg(long, env = "FLOWCANVAS_STORE")]
    pub store: Option<PathBuf>,
}

/// Where a workflow is read from: a JSON file or an id in a store.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Workflow definition file.
    #[arg(short, long, conflicts_with = "id")]
    pub file: Option<PathBuf>,

    /// Workflow id in the store (letters, digits, `-` and `_`).
    #[arg(long)]
    pub id: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// JSON array of canvas events.
    #[arg(short, long)]
    pub events: PathBuf,

    /// Editor configuration file (JSON, every field optional).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the resulting definition here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Save the result back to the store under `--id`.
    #[arg(long, requires = "id")]
    pub save: bool,

    /// Also render the final canvas to an SVG file.
    #[arg(long)]
    pub svg: Option<PathBuf>,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    pub width: f64,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 800.0)]
    pub height: f64,

    /// Grid style for SVG output: none, lines, crosses or dots.
    #[arg(long, default_value = "dots")]
    pub grid: String,

    /// SVG background color as `#rrggbb`.
    #[arg(long)]
    pub background: Option<String>,

    /// SVG selection highlight color as `#rrggbb`.
    #[arg(long)]
    pub selection_color: Option<String>,

    /// Fit the camera to the loaded content before replaying.
    #[arg(long)]
    pub fit: bool,
}
