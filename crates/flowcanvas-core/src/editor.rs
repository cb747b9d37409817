//! Editing session: graph, camera, selection and interaction mode together.

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::graph::WorkflowGraph;
use crate::input::CanvasEvent;
use crate::interaction::{EditorEffect, EditorState, InteractionController, Mode};
use crate::selection::Selection;
use crate::workflow::{Condition, StepId, TransitionId, WorkflowDefinition};
use kurbo::Size;

/// Padding in screen pixels kept around content by [`EditorSession::fit_to_content`].
const FIT_PADDING: f64 = 40.0;

/// Change emitted by the property-panel operations.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PropertyChange {
    StartStep(Option<StepId>),
    StepRenamed(StepId),
    ConditionChanged(TransitionId),
}

/// One open workflow in the designer.
#[derive(Debug, Clone)]
pub struct EditorSession {
    state: EditorState,
    config: EditorConfig,
    controller: InteractionController,
    /// Whether the graph changed since the last save.
    dirty: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Start with an empty workflow.
    pub fn new(config: EditorConfig) -> Self {
        let config = config.validated();
        Self {
            state: EditorState {
                graph: WorkflowGraph::new(),
                camera: config.camera(),
                selection: Selection::None,
            },
            config,
            controller: InteractionController::new(),
            dirty: false,
        }
    }

    /// Open an existing workflow definition.
    pub fn load(definition: WorkflowDefinition, config: EditorConfig) -> Self {
        let mut session = Self::new(config);
        session.state.graph = WorkflowGraph::from_definition(definition);
        session
    }

    /// Serializable form of the current graph.
    pub fn definition(&self) -> WorkflowDefinition {
        self.state.graph.to_definition()
    }

    /// Feed one input event through the interaction state machine.
    pub fn dispatch(&mut self, event: CanvasEvent) -> Vec<EditorEffect> {
        let effects = self.controller.dispatch(&mut self.state, &self.config, event);
        if effects.iter().any(|e| matches!(e, EditorEffect::GraphChanged(_))) {
            self.dirty = true;
        }
        effects
    }

    /// Feed a sequence of events, collecting every effect in order.
    pub fn dispatch_all(
        &mut self,
        events: impl IntoIterator<Item = CanvasEvent>,
    ) -> Vec<EditorEffect> {
        events.into_iter().flat_map(|event| self.dispatch(event)).collect()
    }

    pub fn mode(&self) -> &Mode {
        self.controller.mode()
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.state.graph
    }

    pub fn camera(&self) -> &Camera {
        &self.state.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.state.camera
    }

    pub fn selection(&self) -> Selection {
        self.state.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Zoom and pan so every step is visible in `viewport`.
    pub fn fit_to_content(&mut self, viewport: Size) -> Option<EditorEffect> {
        let metrics = self.config.node;
        let nominal = self.state.graph.bounds(metrics.size())?;
        self.state.camera.fit_to_bounds(nominal, viewport, FIT_PADDING);

        if self.state.camera.zoom() < metrics.min_scale {
            // Below min_scale boxes keep a fixed screen size, so only the
            // spread between step origins shrinks with zoom.
            let fit_axis = |available: f64, box_len: f64, spread: f64| {
                if spread > 0.0 {
                    (available - 2.0 * FIT_PADDING - box_len * metrics.min_scale) / spread
                } else {
                    f64::INFINITY
                }
            };
            let spread = Size::new(
                nominal.width() - metrics.width,
                nominal.height() - metrics.height,
            );
            let zoom_x = fit_axis(viewport.width, metrics.width, spread.width);
            let zoom_y = fit_axis(viewport.height, metrics.height, spread.height);
            let zoom = zoom_x.min(zoom_y);
            if zoom.is_finite() && zoom > 0.0 {
                let bounds = self.state.graph.bounds(metrics.footprint(zoom))?;
                self.state.camera.fit_to_bounds(bounds, viewport, FIT_PADDING);
            }
        }
        Some(EditorEffect::ViewChanged)
    }

    /// Flag `step` as the workflow entry point, or clear the flag with `None`.
    pub fn set_start_step(&mut self, step: Option<StepId>) -> Option<PropertyChange> {
        if self.state.graph.start_step() == step {
            return None;
        }
        match step {
            Some(id) if self.state.graph.contains_step(id) => {
                self.state.graph.push_undo();
                self.state.graph.set_start_step(id);
            }
            Some(_) => return None,
            None => {
                self.state.graph.push_undo();
                self.state.graph.clear_start_step();
            }
        }
        self.dirty = true;
        Some(PropertyChange::StartStep(step))
    }

    pub fn rename_step(&mut self, step: StepId, name: impl Into<String>) -> Option<PropertyChange> {
        let name = name.into();
        if self.state.graph.step(step)?.name == name {
            return None;
        }
        self.state.graph.push_undo();
        self.state.graph.rename_step(step, name);
        self.dirty = true;
        Some(PropertyChange::StepRenamed(step))
    }

    /// Replace the guard on a transition; `None` makes it unconditional.
    pub fn set_condition(
        &mut self,
        transition: TransitionId,
        condition: Option<Condition>,
    ) -> Option<PropertyChange> {
        if self.state.graph.transition(transition)?.condition == condition {
            return None;
        }
        self.state.graph.push_undo();
        self.state.graph.set_condition(transition, condition);
        self.dirty = true;
        Some(PropertyChange::ConditionChanged(transition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{screen_to_world, world_to_screen};
    use crate::input::Key;
    use crate::interaction::ModeKind;
    use crate::workflow::StepKind;
    use kurbo::{Point, Vec2};
    use serde_json::json;

    fn drop_step(session: &mut EditorSession, kind: StepKind, at: Point) -> StepId {
        session.dispatch(CanvasEvent::Dropped { kind, position: at });
        session.graph().steps_ordered().last().unwrap().id()
    }

    fn connect(session: &mut EditorSession, from: StepId, to_screen: Point) {
        session.dispatch(CanvasEvent::StartConnection { step: from });
        session.dispatch(CanvasEvent::pointer_down(to_screen));
    }

    #[test]
    fn test_transform_round_trip() {
        let pans = [Vec2::ZERO, Vec2::new(120.0, -45.5), Vec2::new(-3000.0, 800.25)];
        let zooms = [0.1, 0.37, 1.0, 2.5, 10.0];
        let points = [Point::new(0.0, 0.0), Point::new(27.0, 53.0), Point::new(-812.4, 1999.9)];
        for pan in pans {
            for zoom in zooms {
                for p in points {
                    let back = screen_to_world(world_to_screen(p, zoom, pan), zoom, pan);
                    assert!((back - p).hypot() < 1e-9, "{p:?} at zoom {zoom} pan {pan:?}");
                }
            }
        }
    }

    #[test]
    fn test_no_dangling_transitions_after_edits() {
        let mut session = EditorSession::default();
        let a = drop_step(&mut session, StepKind::Task, Point::new(0.0, 0.0));
        let b = drop_step(&mut session, StepKind::Approval, Point::new(400.0, 0.0));
        let c = drop_step(&mut session, StepKind::Notification, Point::new(400.0, 300.0));
        connect(&mut session, a, Point::new(420.0, 20.0));
        connect(&mut session, b, Point::new(420.0, 320.0));
        connect(&mut session, a, Point::new(420.0, 320.0));
        assert_eq!(session.graph().transition_count(), 3);

        session.dispatch(CanvasEvent::pointer_down(Point::new(420.0, 20.0)));
        session.dispatch(CanvasEvent::key(Key::Delete));
        assert!(session.graph().dangling_transitions().is_empty());
        assert_eq!(session.graph().transition_count(), 1);

        session.dispatch(CanvasEvent::Key {
            key: Key::Char('z'),
            modifiers: crate::input::Modifiers::CTRL,
        });
        assert!(session.graph().dangling_transitions().is_empty());
        assert_eq!(session.graph().transition_count(), 3);
        assert!(session.graph().contains_step(c));
    }

    #[test]
    fn test_dirty_tracking() {
        let mut session = EditorSession::default();
        assert!(!session.is_dirty());

        session.dispatch(CanvasEvent::pointer_down(Point::new(500.0, 500.0)));
        session.dispatch(CanvasEvent::PointerMove { position: Point::new(520.0, 500.0) });
        session.dispatch(CanvasEvent::PointerUp { position: Point::new(520.0, 500.0) });
        assert!(!session.is_dirty());

        drop_step(&mut session, StepKind::Task, Point::new(0.0, 0.0));
        assert!(session.is_dirty());
        session.mark_saved();
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_load_repairs_definition() {
        let a = uuid::Uuid::new_v4();
        let missing = uuid::Uuid::new_v4();
        let definition: WorkflowDefinition = serde_json::from_value(json!({
            "id": "wf-1",
            "name": "Onboarding",
            "steps": [
                {
                    "id": a,
                    "type": "task",
                    "name": "Collect",
                    "position": { "x": 0.0, "y": 0.0 },
                    "isStart": true
                }
            ],
            "transitions": [
                { "id": uuid::Uuid::new_v4(), "from": a, "to": missing }
            ]
        }))
        .unwrap();

        let session = EditorSession::load(definition, EditorConfig::default());
        assert_eq!(session.graph().step_count(), 1);
        assert_eq!(session.graph().transition_count(), 0);
        assert_eq!(session.graph().start_step(), Some(a));
        assert_eq!(session.definition().name, "Onboarding");
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_property_edits_are_undoable() {
        let mut session = EditorSession::default();
        let a = drop_step(&mut session, StepKind::Task, Point::new(0.0, 0.0));
        let b = drop_step(&mut session, StepKind::Condition, Point::new(400.0, 0.0));
        connect(&mut session, a, Point::new(420.0, 20.0));
        let t = session.graph().transitions_ordered().next().unwrap().id();

        assert_eq!(session.set_start_step(Some(b)), Some(PropertyChange::StartStep(Some(b))));
        assert_eq!(session.set_start_step(Some(b)), None);
        assert_eq!(session.set_start_step(Some(a)), Some(PropertyChange::StartStep(Some(a))));
        assert_eq!(session.graph().start_step(), Some(a));

        assert!(session.rename_step(a, "Review").is_some());
        assert!(session.rename_step(a, "Review").is_none());

        let guard = Condition::new("amount", ">", json!(1000));
        assert!(session.set_condition(t, Some(guard.clone())).is_some());
        assert_eq!(session.graph().transition(t).unwrap().condition, Some(guard));

        session.dispatch(CanvasEvent::Key {
            key: Key::Char('z'),
            modifiers: crate::input::Modifiers::CTRL,
        });
        assert_eq!(session.graph().transition(t).unwrap().condition, None);
        assert_eq!(session.graph().step(a).unwrap().name, "Review");
    }

    #[test]
    fn test_fit_to_content() {
        let mut session = EditorSession::default();
        assert_eq!(session.fit_to_content(Size::new(800.0, 600.0)), None);

        drop_step(&mut session, StepKind::Task, Point::new(0.0, 0.0));
        drop_step(&mut session, StepKind::Task, Point::new(2000.0, 1000.0));
        assert_eq!(
            session.fit_to_content(Size::new(800.0, 600.0)),
            Some(EditorEffect::ViewChanged)
        );
        assert!(session.camera().zoom() < 1.0);
    }

    #[test]
    fn test_fit_keeps_clamped_boxes_inside_viewport() {
        let mut session = EditorSession::default();
        drop_step(&mut session, StepKind::Task, Point::new(0.0, 0.0));
        drop_step(&mut session, StepKind::Task, Point::new(4000.0, 200.0));
        let viewport = Size::new(800.0, 600.0);
        session.fit_to_content(viewport);

        let zoom = session.camera().zoom();
        let metrics = session.config().node;
        assert!(zoom < metrics.min_scale);

        let footprint = metrics.footprint(zoom);
        for step in session.graph().steps_ordered() {
            let far = step.position + Vec2::new(footprint.width, footprint.height);
            let top_left = session.camera().world_to_screen(step.position);
            let bottom_right = session.camera().world_to_screen(far);
            assert!(top_left.x >= FIT_PADDING - 1e-6 && top_left.y >= 0.0);
            assert!(bottom_right.x <= viewport.width - FIT_PADDING + 1e-6);
            assert!(bottom_right.y <= viewport.height);
        }
    }

    #[test]
    fn test_escape_returns_to_idle_from_every_mode() {
        let mut session = EditorSession::default();
        let a = drop_step(&mut session, StepKind::Task, Point::new(0.0, 0.0));

        session.dispatch(CanvasEvent::StartConnection { step: a });
        session.dispatch(CanvasEvent::key(Key::Escape));
        assert_eq!(session.mode().kind(), ModeKind::Idle);

        session.dispatch(CanvasEvent::DragStarted { kind: StepKind::Task });
        session.dispatch(CanvasEvent::key(Key::Escape));
        assert_eq!(session.mode().kind(), ModeKind::Idle);

        session.dispatch(CanvasEvent::pointer_down(Point::new(-200.0, -200.0)));
        session.dispatch(CanvasEvent::key(Key::Escape));
        assert_eq!(session.mode().kind(), ModeKind::Idle);
        assert_eq!(session.graph().step_count(), 1);
    }
}
