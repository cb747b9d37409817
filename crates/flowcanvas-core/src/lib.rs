//! FlowCanvas Core Library
//!
//! Platform-agnostic model and interaction logic for the workflow designer
//! canvas: the step/transition graph, the pan/zoom camera, hit-testing and the
//! event-driven interaction state machine.

pub mod camera;
pub mod config;
pub mod editor;
pub mod geometry;
pub mod graph;
pub mod hit;
pub mod input;
pub mod interaction;
pub mod selection;
pub mod snap;
pub mod storage;
pub mod workflow;

pub use camera::{Camera, screen_to_world, world_to_screen};
pub use config::EditorConfig;
pub use editor::{EditorSession, PropertyChange};
pub use geometry::{NodeMetrics, step_rect, transition_curve, transition_curve_between};
pub use graph::{RemovedStep, WorkflowGraph};
pub use hit::{HitTarget, hit_step, hit_test, hit_transition};
pub use input::{CanvasEvent, Key, Modifiers, MouseButton};
pub use interaction::{
    EditorEffect, EditorState, GraphChange, InteractionController, Mode, ModeKind,
};
pub use selection::Selection;
pub use snap::{GRID_SIZE, SnapMode, SnapResult, snap_point, snap_to_grid};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use workflow::{Condition, Step, StepId, StepKind, Transition, TransitionId, WorkflowDefinition};
