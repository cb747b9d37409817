//! Interaction state machine for the designer canvas.
//!
//! [`InteractionController::dispatch`] turns one [`CanvasEvent`] into graph,
//! camera and selection updates and reports what changed as [`EditorEffect`]s.
//! Every dispatch either applies completely or leaves the state untouched.

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::graph::WorkflowGraph;
use crate::hit::{HitTarget, hit_step, hit_test};
use crate::input::{CanvasEvent, Key, Modifiers, MouseButton};
use crate::selection::Selection;
use crate::snap::snap_point;
use crate::workflow::{StepId, StepKind, TransitionId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// The state a gesture acts on: the graph, the camera and the selection.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    pub graph: WorkflowGraph,
    pub camera: Camera,
    pub selection: Selection,
}

/// Current interaction mode. Only one gesture is live at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    #[default]
    Idle,
    /// Dragging the background. `last` is the previous screen position.
    Panning { last: Point },
    /// Waiting for the target of a new transition from `source`.
    /// `cursor` is the last pointer position in world space.
    Connecting { source: StepId, cursor: Option<Point> },
    /// A palette item is being dragged over the canvas.
    /// `position` is the last screen position of the ghost.
    PlacingFromPalette { kind: StepKind, position: Option<Point> },
    /// A step is being repositioned.
    DraggingStep {
        step: StepId,
        /// Pointer position minus step position, in world units.
        grab_offset: Vec2,
        /// Position before the drag, restored on Escape.
        origin: Point,
        moved: bool,
    },
}

/// Mode without its payload, for change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeKind {
    Idle,
    Panning,
    Connecting,
    PlacingFromPalette,
    DraggingStep,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Idle => ModeKind::Idle,
            Mode::Panning { .. } => ModeKind::Panning,
            Mode::Connecting { .. } => ModeKind::Connecting,
            Mode::PlacingFromPalette { .. } => ModeKind::PlacingFromPalette,
            Mode::DraggingStep { .. } => ModeKind::DraggingStep,
        }
    }
}

/// A structural change to the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphChange {
    StepAdded(StepId),
    StepMoved(StepId),
    StepRemoved {
        step: StepId,
        /// Transitions removed by the cascade.
        transitions: Vec<TransitionId>,
    },
    TransitionAdded(TransitionId),
    TransitionRemoved(TransitionId),
    /// The whole graph was replaced by undo or redo.
    Restored,
}

/// Notifications produced by a dispatch, in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEffect {
    SelectionChanged(Selection),
    GraphChanged(GraphChange),
    /// Pan or zoom changed.
    ViewChanged,
    ModeChanged(ModeKind),
}

/// Owns the interaction mode and applies events to an [`EditorState`].
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    mode: Mode,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Abandon any live gesture without touching the graph.
    pub fn reset(&mut self) {
        self.mode = Mode::Idle;
    }

    /// Apply one event.
    pub fn dispatch(
        &mut self,
        state: &mut EditorState,
        config: &EditorConfig,
        event: CanvasEvent,
    ) -> Vec<EditorEffect> {
        let before = self.mode.kind();
        let mut effects = Vec::new();

        match event {
            CanvasEvent::PointerDown { position, button } => {
                self.pointer_down(state, config, position, button, &mut effects)
            }
            CanvasEvent::PointerMove { position } => {
                self.pointer_move(state, config, position, &mut effects)
            }
            CanvasEvent::PointerUp { .. } | CanvasEvent::PointerLeave => self.pointer_release(),
            CanvasEvent::Scroll { position, delta } => {
                self.scroll(state, config, position, delta, &mut effects)
            }
            CanvasEvent::StartConnection { step } => {
                self.start_connection(state, step, &mut effects)
            }
            CanvasEvent::BeginStepDrag { step, position } => {
                self.begin_step_drag(state, step, position, &mut effects)
            }
            CanvasEvent::Key { key, modifiers } => self.key(state, key, modifiers, &mut effects),
            CanvasEvent::DragStarted { kind } => {
                if self.mode == Mode::Idle {
                    self.mode = Mode::PlacingFromPalette { kind, position: None };
                }
            }
            CanvasEvent::DragMoved { position } => {
                if let Mode::PlacingFromPalette { position: ghost, .. } = &mut self.mode {
                    *ghost = Some(position);
                }
            }
            CanvasEvent::Dropped { kind, position } => {
                if matches!(self.mode, Mode::Idle | Mode::PlacingFromPalette { .. }) {
                    place_step(state, config, kind, position, &mut effects);
                    self.mode = Mode::Idle;
                }
            }
            CanvasEvent::DragCancelled => {
                if matches!(self.mode, Mode::PlacingFromPalette { .. }) {
                    self.mode = Mode::Idle;
                }
            }
        }

        let after = self.mode.kind();
        if before != after {
            log::debug!("Interaction mode {:?} -> {:?}", before, after);
            effects.push(EditorEffect::ModeChanged(after));
        }
        effects
    }

    fn pointer_down(
        &mut self,
        state: &mut EditorState,
        config: &EditorConfig,
        position: Point,
        button: MouseButton,
        effects: &mut Vec<EditorEffect>,
    ) {
        match button {
            MouseButton::Left => {}
            MouseButton::Middle => {
                // Middle button pans from anywhere, even over a step
                if self.mode == Mode::Idle {
                    set_selection(state, Selection::None, effects);
                    self.mode = Mode::Panning { last: position };
                }
                return;
            }
            MouseButton::Right => return,
        }

        let zoom = state.camera.zoom();
        let world = state.camera.screen_to_world(position);

        match self.mode {
            Mode::Idle => {
                let hit = hit_test(world, &state.graph, &config.node, zoom, config.pick_width);
                match hit {
                    Some(HitTarget::Step(id)) => set_selection(state, Selection::Step(id), effects),
                    Some(HitTarget::Transition(id)) => {
                        set_selection(state, Selection::Transition(id), effects)
                    }
                    None => {
                        set_selection(state, Selection::None, effects);
                        self.mode = Mode::Panning { last: position };
                    }
                }
            }
            Mode::Connecting { source, .. } => {
                match hit_step(world, &state.graph, &config.node, zoom) {
                    Some(target) if target != source => connect(state, source, target, effects),
                    Some(_) => log::debug!("Ignoring connection from {} onto itself", source),
                    None => log::debug!("Connection from {} discarded", source),
                }
                self.mode = Mode::Idle;
            }
            _ => {}
        }
    }

    fn pointer_move(
        &mut self,
        state: &mut EditorState,
        config: &EditorConfig,
        position: Point,
        effects: &mut Vec<EditorEffect>,
    ) {
        match &mut self.mode {
            Mode::Idle => {}
            Mode::Panning { last } => {
                let delta = position - *last;
                *last = position;
                if delta != Vec2::ZERO {
                    state.camera.pan(delta);
                    effects.push(EditorEffect::ViewChanged);
                }
            }
            Mode::Connecting { cursor, .. } => {
                *cursor = Some(state.camera.screen_to_world(position));
            }
            Mode::PlacingFromPalette { position: ghost, .. } => {
                *ghost = Some(position);
            }
            Mode::DraggingStep {
                step,
                grab_offset,
                moved,
                ..
            } => {
                let world = state.camera.screen_to_world(position);
                let target = snap_point(world - *grab_offset, config.snap, config.grid_size).point;
                let current = state.graph.step(*step).map(|s| s.position);
                if current.is_some_and(|p| p != target) {
                    if !*moved {
                        state.graph.push_undo();
                        *moved = true;
                    }
                    state.graph.move_step(*step, target);
                    effects.push(EditorEffect::GraphChanged(GraphChange::StepMoved(*step)));
                }
            }
        }
    }

    fn pointer_release(&mut self) {
        if matches!(self.mode, Mode::Panning { .. } | Mode::DraggingStep { .. }) {
            self.mode = Mode::Idle;
        }
    }

    fn scroll(
        &mut self,
        state: &mut EditorState,
        config: &EditorConfig,
        position: Point,
        delta: Vec2,
        effects: &mut Vec<EditorEffect>,
    ) {
        if !matches!(self.mode, Mode::Idle | Mode::Panning { .. }) {
            return;
        }
        let factor = if delta.y < 0.0 {
            config.zoom_step
        } else if delta.y > 0.0 {
            1.0 / config.zoom_step
        } else {
            return;
        };
        if state.camera.zoom_at(position, factor) {
            effects.push(EditorEffect::ViewChanged);
        }
    }

    fn start_connection(
        &mut self,
        state: &mut EditorState,
        step: StepId,
        effects: &mut Vec<EditorEffect>,
    ) {
        if self.mode != Mode::Idle || !state.graph.contains_step(step) {
            return;
        }
        set_selection(state, Selection::None, effects);
        self.mode = Mode::Connecting { source: step, cursor: None };
    }

    fn begin_step_drag(
        &mut self,
        state: &mut EditorState,
        step: StepId,
        position: Point,
        effects: &mut Vec<EditorEffect>,
    ) {
        if self.mode != Mode::Idle {
            return;
        }
        let Some(origin) = state.graph.step(step).map(|s| s.position) else {
            return;
        };
        set_selection(state, Selection::Step(step), effects);
        let grab_offset = state.camera.screen_to_world(position) - origin;
        self.mode = Mode::DraggingStep {
            step,
            grab_offset,
            origin,
            moved: false,
        };
    }

    fn key(
        &mut self,
        state: &mut EditorState,
        key: Key,
        modifiers: Modifiers,
        effects: &mut Vec<EditorEffect>,
    ) {
        match key {
            k if k.is_delete() => {
                if delete_selection(state, effects) {
                    self.mode = Mode::Idle;
                }
            }
            Key::Escape => self.cancel(state, effects),
            Key::Char(c) if modifiers.command() && self.mode == Mode::Idle => {
                let restored = match c.to_ascii_lowercase() {
                    'z' if modifiers.shift => state.graph.redo(),
                    'z' => state.graph.undo(),
                    'y' => state.graph.redo(),
                    _ => false,
                };
                if restored {
                    effects.push(EditorEffect::GraphChanged(GraphChange::Restored));
                    if state.selection.retain_existing(&state.graph) {
                        effects.push(EditorEffect::SelectionChanged(state.selection));
                    }
                }
            }
            _ => {}
        }
    }

    fn cancel(&mut self, state: &mut EditorState, effects: &mut Vec<EditorEffect>) {
        match std::mem::take(&mut self.mode) {
            Mode::Idle | Mode::Connecting { .. } => set_selection(state, Selection::None, effects),
            Mode::DraggingStep {
                step, origin, moved, ..
            } => {
                if moved {
                    state.graph.move_step(step, origin);
                    state.graph.discard_undo();
                    effects.push(EditorEffect::GraphChanged(GraphChange::StepMoved(step)));
                }
            }
            Mode::Panning { .. } | Mode::PlacingFromPalette { .. } => {}
        }
    }
}

fn set_selection(state: &mut EditorState, next: Selection, effects: &mut Vec<EditorEffect>) {
    let changed = match next {
        Selection::None => state.selection.clear(),
        Selection::Step(id) => state.selection.select_step(id),
        Selection::Transition(id) => state.selection.select_transition(id),
    };
    if changed {
        effects.push(EditorEffect::SelectionChanged(state.selection));
    }
}

fn connect(state: &mut EditorState, from: StepId, to: StepId, effects: &mut Vec<EditorEffect>) {
    if !state.graph.can_connect(from, to) {
        return;
    }
    state.graph.push_undo();
    if let Some(id) = state.graph.add_transition(from, to) {
        log::debug!("Connected {} -> {} as {}", from, to, id);
        effects.push(EditorEffect::GraphChanged(GraphChange::TransitionAdded(id)));
    }
}

fn place_step(
    state: &mut EditorState,
    config: &EditorConfig,
    kind: StepKind,
    screen: Point,
    effects: &mut Vec<EditorEffect>,
) {
    let world = state.camera.screen_to_world(screen);
    let position = snap_point(world, config.snap, config.grid_size).point;
    state.graph.push_undo();
    let id = state.graph.add_step(kind, position);
    log::debug!("Placed {:?} step {} at ({}, {})", kind, id, position.x, position.y);
    effects.push(EditorEffect::GraphChanged(GraphChange::StepAdded(id)));
}

/// Delete whatever is selected. Returns true if the graph changed.
fn delete_selection(state: &mut EditorState, effects: &mut Vec<EditorEffect>) -> bool {
    let change = match state.selection {
        Selection::None => return false,
        Selection::Step(id) if state.graph.contains_step(id) => {
            state.graph.push_undo();
            state.graph.remove_step(id).map(|removed| GraphChange::StepRemoved {
                step: id,
                transitions: removed.transitions.iter().map(|t| t.id()).collect(),
            })
        }
        Selection::Transition(id) if state.graph.contains_transition(id) => {
            state.graph.push_undo();
            state
                .graph
                .remove_transition(id)
                .map(|_| GraphChange::TransitionRemoved(id))
        }
        _ => None,
    };
    set_selection(state, Selection::None, effects);
    match change {
        Some(change) => {
            effects.push(EditorEffect::GraphChanged(change));
            true
        }
        None => false,
    }
}
