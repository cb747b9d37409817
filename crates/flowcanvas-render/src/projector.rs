//! Projection of the editor state into screen-space drawing primitives.
//!
//! Geometry comes from `flowcanvas_core::geometry`, the same functions the hit
//! tester uses, and is mapped to screen space through the camera transform.

use crate::renderer::{GridStyle, RenderContext};
use flowcanvas_core::geometry::{
    output_anchor, step_rect, transition_curve, transition_curve_between,
};
use flowcanvas_core::interaction::Mode;
use flowcanvas_core::snap::snap_point;
use flowcanvas_core::workflow::{StepId, StepKind, TransitionId};
use kurbo::{Affine, BezPath, CubicBez, ParamCurve, Point, Rect, Size, Vec2};
use peniko::Color;

/// Length of a transition arrowhead in screen pixels.
const ARROW_LENGTH: f64 = 10.0;
/// Half-width of a transition arrowhead in screen pixels.
const ARROW_HALF_WIDTH: f64 = 5.0;
/// Grids denser than this (screen pixels) are skipped.
const MIN_GRID_SPACING: f64 = 6.0;

/// A step box in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct StepBox {
    pub id: StepId,
    pub rect: Rect,
    pub label: String,
    pub kind: StepKind,
    pub is_start: bool,
    pub selected: bool,
}

/// A transition curve in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPath {
    pub id: TransitionId,
    pub path: BezPath,
    /// Closed triangle at the target end.
    pub arrow: BezPath,
    /// Condition text and where to center it.
    pub label: Option<(String, Point)>,
    pub selected: bool,
}

/// Translucent box shown under a palette item being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementGhost {
    pub rect: Rect,
    pub kind: StepKind,
}

/// Grid intersections visible in the viewport, in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub style: GridStyle,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone)]
pub struct Scene {
    pub viewport: Size,
    pub background: Color,
    pub selection_color: Color,
    pub stroke_color: Color,
    pub grid: Option<Grid>,
    /// Back to front.
    pub transitions: Vec<TransitionPath>,
    /// Back to front; drawn above transitions.
    pub steps: Vec<StepBox>,
    /// Rubber band from the connection source to the pointer.
    pub preview: Option<BezPath>,
    pub ghost: Option<PlacementGhost>,
}

impl Scene {
    pub fn step(&self, id: StepId) -> Option<&StepBox> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&TransitionPath> {
        self.transitions.iter().find(|t| t.id == id)
    }
}

/// Build the scene for one frame.
pub fn project(ctx: &RenderContext) -> Scene {
    let transform = ctx.camera.transform();
    let zoom = ctx.camera.zoom();
    let metrics = &ctx.config.node;

    let steps = ctx
        .graph
        .steps_ordered()
        .map(|step| StepBox {
            id: step.id(),
            rect: transform.transform_rect_bbox(step_rect(step, metrics, zoom)),
            label: if step.name.is_empty() {
                step.kind.label().to_string()
            } else {
                step.name.clone()
            },
            kind: step.kind,
            is_start: step.is_start(),
            selected: ctx.selection.is_step_selected(step.id()),
        })
        .collect();

    let transitions = ctx
        .graph
        .transitions_ordered()
        .filter_map(|transition| {
            let from = ctx.graph.step(transition.from())?;
            let to = ctx.graph.step(transition.to())?;
            let curve = transform * transition_curve_between(from, to, metrics, zoom);
            Some(TransitionPath {
                id: transition.id(),
                path: curve_path(&curve),
                arrow: arrowhead(&curve),
                label: transition.condition.as_ref().map(|c| (c.label(), curve.eval(0.5))),
                selected: ctx.selection.is_transition_selected(transition.id()),
            })
        })
        .collect();

    let preview = match ctx.mode {
        Mode::Connecting {
            source,
            cursor: Some(cursor),
        } => ctx.graph.step(*source).map(|step| {
            let start = output_anchor(step_rect(step, metrics, zoom));
            curve_path(&(transform * transition_curve(start, *cursor)))
        }),
        _ => None,
    };

    let ghost = match ctx.mode {
        Mode::PlacingFromPalette {
            kind,
            position: Some(position),
        } => {
            let world = ctx.camera.screen_to_world(*position);
            let origin = snap_point(world, ctx.config.snap, ctx.config.grid_size).point;
            let rect = Rect::from_origin_size(origin, metrics.footprint(zoom));
            Some(PlacementGhost {
                rect: transform.transform_rect_bbox(rect),
                kind: *kind,
            })
        }
        _ => None,
    };

    Scene {
        viewport: ctx.viewport_size,
        background: ctx.background_color,
        selection_color: ctx.selection_color,
        stroke_color: ctx.stroke_color,
        grid: project_grid(ctx, transform),
        transitions,
        steps,
        preview,
        ghost,
    }
}

fn curve_path(curve: &CubicBez) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(curve.p0);
    path.curve_to(curve.p1, curve.p2, curve.p3);
    path
}

/// Triangle at the end of `curve`, aligned with its final tangent.
fn arrowhead(curve: &CubicBez) -> BezPath {
    let tip = curve.p3;
    let mut direction = tip - curve.p2;
    if direction.hypot() < 1e-9 {
        direction = tip - curve.p0;
    }
    let direction = if direction.hypot() < 1e-9 {
        Vec2::new(1.0, 0.0)
    } else {
        direction.normalize()
    };
    let normal = Vec2::new(-direction.y, direction.x);
    let base = tip - direction * ARROW_LENGTH;

    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to(base + normal * ARROW_HALF_WIDTH);
    path.line_to(base - normal * ARROW_HALF_WIDTH);
    path.close_path();
    path
}

/// Grid positions covering the viewport, computed in world space and mapped back.
fn project_grid(ctx: &RenderContext, transform: Affine) -> Option<Grid> {
    let grid_size = ctx.config.grid_size;
    if ctx.grid_style == GridStyle::None || grid_size * ctx.camera.zoom() < MIN_GRID_SPACING {
        return None;
    }

    let inv = transform.inverse();
    let world_tl = inv * Point::ZERO;
    let world_br = inv * Point::new(ctx.viewport_size.width, ctx.viewport_size.height);

    let start_x = (world_tl.x / grid_size).floor() as i64;
    let start_y = (world_tl.y / grid_size).floor() as i64;
    let end_x = (world_br.x / grid_size).ceil() as i64;
    let end_y = (world_br.y / grid_size).ceil() as i64;

    let xs = (start_x..=end_x)
        .map(|i| (transform * Point::new(i as f64 * grid_size, 0.0)).x)
        .collect();
    let ys = (start_y..=end_y)
        .map(|j| (transform * Point::new(0.0, j as f64 * grid_size)).y)
        .collect();

    Some(Grid {
        style: ctx.grid_style,
        xs,
        ys,
    })
}
