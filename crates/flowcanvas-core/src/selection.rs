//! Single-target selection: one step, one transition, or nothing.

use crate::graph::WorkflowGraph;
use crate::workflow::{StepId, TransitionId};
use serde::{Deserialize, Serialize};

/// Current selection. A step and a transition are never selected together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Step(StepId),
    Transition(TransitionId),
}

impl Selection {
    /// Select a step, replacing any transition selection.
    /// Returns true if the selection changed.
    pub fn select_step(&mut self, id: StepId) -> bool {
        self.replace(Selection::Step(id))
    }

    /// Select a transition, replacing any step selection.
    /// Returns true if the selection changed.
    pub fn select_transition(&mut self, id: TransitionId) -> bool {
        self.replace(Selection::Transition(id))
    }

    /// Clear the selection. Returns true if something was selected.
    pub fn clear(&mut self) -> bool {
        self.replace(Selection::None)
    }

    fn replace(&mut self, next: Selection) -> bool {
        let changed = *self != next;
        *self = next;
        changed
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn selected_step(&self) -> Option<StepId> {
        match self {
            Selection::Step(id) => Some(*id),
            _ => None,
        }
    }

    pub fn selected_transition(&self) -> Option<TransitionId> {
        match self {
            Selection::Transition(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_step_selected(&self, id: StepId) -> bool {
        self.selected_step() == Some(id)
    }

    pub fn is_transition_selected(&self, id: TransitionId) -> bool {
        self.selected_transition() == Some(id)
    }

    /// Drop the selection if its target is no longer in `graph`.
    /// Returns true if the selection was cleared.
    pub fn retain_existing(&mut self, graph: &WorkflowGraph) -> bool {
        let exists = match *self {
            Selection::None => true,
            Selection::Step(id) => graph.contains_step(id),
            Selection::Transition(id) => graph.contains_transition(id),
        };
        if exists { false } else { self.clear() }
    }
}
