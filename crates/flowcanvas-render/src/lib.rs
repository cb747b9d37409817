//! FlowCanvas Render Library
//!
//! Projects the editor state into screen-space primitives and hands them to a
//! [`Renderer`] backend. The bundled backend writes SVG.

mod projector;
mod renderer;
mod svg;

pub use projector::{Grid, PlacementGhost, Scene, StepBox, TransitionPath, project};
pub use renderer::{
    GridStyle, RenderContext, RenderResult, Renderer, RendererError, parse_hex_color,
};
pub use svg::SvgRenderer;
