//! Hit-testing of steps and transitions in world space.

use crate::geometry::{NodeMetrics, step_rect, transition_curve_between};
use crate::graph::WorkflowGraph;
use crate::workflow::{StepId, TransitionId};
use kurbo::{CubicBez, ParamCurveExtrema, ParamCurveNearest, Point};
use serde::{Deserialize, Serialize};

/// Default clickable thickness of a transition curve in world units.
/// The visible stroke is ~2 units; this is the invisible pick stroke.
pub const DEFAULT_PICK_WIDTH: f64 = 20.0;

/// Accuracy passed to the nearest-point solver.
const NEAREST_ACCURACY: f64 = 1e-6;

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTarget {
    Step(StepId),
    Transition(TransitionId),
}

/// Topmost step whose box contains `point`.
pub fn hit_step(
    point: Point,
    graph: &WorkflowGraph,
    metrics: &NodeMetrics,
    zoom: f64,
) -> Option<StepId> {
    graph
        .steps_ordered()
        .rev()
        .find(|step| step_rect(step, metrics, zoom).contains(point))
        .map(|step| step.id())
}

/// Distance from `point` to the closest point on `curve`.
pub fn distance_to_curve(point: Point, curve: &CubicBez) -> f64 {
    curve.nearest(point, NEAREST_ACCURACY).distance_sq.sqrt()
}

/// Transition whose curve passes within `pick_width / 2` of `point`.
///
/// When several curves qualify the closest one wins; on a tie the one drawn
/// last (on top) wins.
pub fn hit_transition(
    point: Point,
    graph: &WorkflowGraph,
    metrics: &NodeMetrics,
    zoom: f64,
    pick_width: f64,
) -> Option<TransitionId> {
    let half = pick_width.max(0.0) / 2.0;
    let mut best: Option<(TransitionId, f64)> = None;

    for transition in graph.transitions_ordered() {
        let endpoints = (graph.step(transition.from()), graph.step(transition.to()));
        let (Some(from), Some(to)) = endpoints else {
            continue;
        };
        let curve = transition_curve_between(from, to, metrics, zoom);
        if !curve.bounding_box().inflate(half, half).contains(point) {
            continue;
        }
        let distance = distance_to_curve(point, &curve);
        if distance > half {
            continue;
        }
        if best.is_none_or(|(_, d)| distance <= d) {
            best = Some((transition.id(), distance));
        }
    }

    best.map(|(id, _)| id)
}

/// Resolve a click. Steps render above transitions and take precedence.
pub fn hit_test(
    point: Point,
    graph: &WorkflowGraph,
    metrics: &NodeMetrics,
    zoom: f64,
    pick_width: f64,
) -> Option<HitTarget> {
    if let Some(step) = hit_step(point, graph, metrics, zoom) {
        return Some(HitTarget::Step(step));
    }
    hit_transition(point, graph, metrics, zoom, pick_width).map(HitTarget::Transition)
}
