//! Renderer trait abstraction.

use crate::projector::Scene;
use flowcanvas_core::camera::Camera;
use flowcanvas_core::config::EditorConfig;
use flowcanvas_core::editor::EditorSession;
use flowcanvas_core::graph::WorkflowGraph;
use flowcanvas_core::interaction::Mode;
use flowcanvas_core::selection::Selection;
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Output error: {0}")]
    Output(#[from] std::fmt::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    /// No grid (plain background).
    None,
    /// Full grid lines.
    Lines,
    /// Only corner crosses (+).
    CrossPlus,
    /// Only corner dots (.).
    #[default]
    Dots,
}

impl GridStyle {
    /// Get display name for this grid style.
    pub fn name(self) -> &'static str {
        match self {
            GridStyle::None => "None",
            GridStyle::Lines => "Lines",
            GridStyle::CrossPlus => "Crosses",
            GridStyle::Dots => "Dots",
        }
    }

    /// Parse a style name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(GridStyle::None),
            "lines" => Some(GridStyle::Lines),
            "crosses" | "cross" => Some(GridStyle::CrossPlus),
            "dots" => Some(GridStyle::Dots),
            _ => None,
        }
    }
}

/// Parse a `#rgb`, `#rrggbb` or `#rrggbbaa` color.
pub fn parse_hex_color(color: &str) -> Option<Color> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match hex.len() {
        3 => {
            // #rgb -> #rrggbb
            let r = channel(0..1)? * 17;
            let g = channel(1..2)? * 17;
            let b = channel(2..3)? * 17;
            Some(Color::from_rgba8(r, g, b, 255))
        }
        6 => Some(Color::from_rgba8(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
        8 => Some(Color::from_rgba8(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    pub graph: &'a WorkflowGraph,
    pub camera: &'a Camera,
    pub selection: Selection,
    /// Current interaction mode, for the connection preview and palette ghost.
    pub mode: &'a Mode,
    pub config: &'a EditorConfig,
    /// Viewport size in pixels.
    pub viewport_size: Size,
    pub background_color: Color,
    pub grid_style: GridStyle,
    /// Selection highlight color.
    pub selection_color: Color,
    /// Default stroke for step outlines and transitions.
    pub stroke_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a render context for the current state of `session`.
    pub fn new(session: &'a EditorSession, viewport_size: Size) -> Self {
        Self {
            graph: session.graph(),
            camera: session.camera(),
            selection: session.selection(),
            mode: session.mode(),
            config: session.config(),
            viewport_size,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            grid_style: GridStyle::Dots,
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            stroke_color: Color::from_rgba8(71, 85, 105, 255),
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the grid style.
    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }

    /// Set the selection highlight color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }
}

/// Trait for rendering backends.
///
/// Backends receive a fully projected [`Scene`] in screen space and never
/// look at the graph or camera themselves.
pub trait Renderer {
    /// Draw one frame.
    fn render(&mut self, scene: &Scene) -> RenderResult<()>;
}
