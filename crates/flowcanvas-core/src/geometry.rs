//! Step footprints and transition curves.
//!
//! Both the hit tester and the render projector go through these functions,
//! so a click lands exactly where the curve is drawn.

use crate::workflow::Step;
use kurbo::{CubicBez, Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Rendered size of a step box and its minimum on-screen scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetrics {
    /// Box width in world units at zoom >= `min_scale`.
    pub width: f64,
    /// Box height in world units at zoom >= `min_scale`.
    pub height: f64,
    /// Steps never render smaller than this screen scale, so they stay
    /// clickable when zoomed far out.
    pub min_scale: f64,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            width: 180.0,
            height: 64.0,
            min_scale: 0.5,
        }
    }
}

impl NodeMetrics {
    /// Screen scale a step is rendered at for the given camera zoom.
    pub fn render_scale(&self, zoom: f64) -> f64 {
        sane_zoom(zoom).max(self.min_scale)
    }

    /// World-space size of a step box at the given camera zoom.
    ///
    /// Equal to the nominal size while `zoom >= min_scale`; below that the box
    /// grows in world units so that its screen size stays at `min_scale`.
    pub fn footprint(&self, zoom: f64) -> Size {
        let zoom = sane_zoom(zoom);
        let factor = self.render_scale(zoom) / zoom;
        Size::new(self.width * factor, self.height * factor)
    }

    /// Nominal size, independent of zoom.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

fn sane_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 }
}

/// World-space box occupied by a step at the given zoom.
pub fn step_rect(step: &Step, metrics: &NodeMetrics, zoom: f64) -> Rect {
    Rect::from_origin_size(step.position, metrics.footprint(zoom))
}

/// Anchor where outgoing transitions leave a step box (right-middle).
pub fn output_anchor(rect: Rect) -> Point {
    Point::new(rect.x1, rect.center().y)
}

/// Anchor where incoming transitions enter a step box (left-middle).
pub fn input_anchor(rect: Rect) -> Point {
    Point::new(rect.x0, rect.center().y)
}

/// Horizontally biased S-curve between two anchors.
///
/// Control points sit at one third and two thirds of the horizontal span,
/// pinned to the start and end heights respectively.
pub fn transition_curve(start: Point, end: Point) -> CubicBez {
    let dx = end.x - start.x;
    CubicBez::new(
        start,
        Point::new(start.x + dx / 3.0, start.y),
        Point::new(start.x + dx * 2.0 / 3.0, end.y),
        end,
    )
}

/// Curve for a transition from `from` to `to` in world space.
pub fn transition_curve_between(
    from: &Step,
    to: &Step,
    metrics: &NodeMetrics,
    zoom: f64,
) -> CubicBez {
    let start = output_anchor(step_rect(from, metrics, zoom));
    let end = input_anchor(step_rect(to, metrics, zoom));
    transition_curve(start, end)
}
