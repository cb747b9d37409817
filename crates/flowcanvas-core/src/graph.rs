//! The workflow graph and its invariant-preserving mutation API.
//!
//! Every transition endpoint refers to a step that exists. Removing a step
//! removes the transitions attached to it in the same call.

use crate::workflow::{
    Condition, Step, StepId, StepKind, Transition, TransitionId, WorkflowDefinition,
};
use kurbo::{Point, Rect, Size};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Maximum number of undo states to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// A snapshot of graph state for undo/redo.
#[derive(Debug, Clone)]
struct GraphSnapshot {
    steps: HashMap<StepId, Step>,
    step_order: Vec<StepId>,
    transitions: HashMap<TransitionId, Transition>,
    transition_order: Vec<TransitionId>,
}

/// History displaced by the most recent [`WorkflowGraph::push_undo`].
#[derive(Debug, Clone)]
struct DisplacedHistory {
    redo_stack: Vec<GraphSnapshot>,
    /// Oldest undo state, dropped when the stack was full.
    evicted: Option<GraphSnapshot>,
}

/// What [`WorkflowGraph::remove_step`] took out of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedStep {
    pub step: Step,
    /// Transitions removed along with the step, in graph order.
    pub transitions: Vec<Transition>,
}

/// In-memory directed graph of workflow steps and transitions.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    /// Workflow identifier (carried through load/save).
    pub id: String,
    /// Workflow name.
    pub name: String,
    /// Top-level definition keys the editor does not interpret.
    pub extra: Map<String, Value>,
    steps: HashMap<StepId, Step>,
    /// Step order (back to front); later steps render on top.
    step_order: Vec<StepId>,
    transitions: HashMap<TransitionId, Transition>,
    transition_order: Vec<TransitionId>,
    undo_stack: Vec<GraphSnapshot>,
    redo_stack: Vec<GraphSnapshot>,
    displaced: Option<DisplacedHistory>,
}

impl WorkflowGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a loaded definition.
    ///
    /// Malformed input is repaired rather than rejected: duplicate ids,
    /// transitions with a missing endpoint and self-loops are dropped, and only
    /// the first step flagged as start keeps the flag.
    pub fn from_definition(definition: WorkflowDefinition) -> Self {
        let mut graph = Self {
            id: definition.id,
            name: definition.name,
            extra: definition.extra,
            ..Self::default()
        };

        let mut has_start = false;
        for mut step in definition.steps {
            if graph.steps.contains_key(&step.id) {
                log::warn!("Dropping step with duplicate id {}", step.id);
                continue;
            }
            if step.is_start {
                if has_start {
                    log::warn!("Clearing extra start flag on step {}", step.id);
                    step.is_start = false;
                }
                has_start = true;
            }
            graph.step_order.push(step.id);
            graph.steps.insert(step.id, step);
        }

        for transition in definition.transitions {
            if graph.transitions.contains_key(&transition.id) {
                log::warn!("Dropping transition with duplicate id {}", transition.id);
                continue;
            }
            if !graph.contains_step(transition.from) || !graph.contains_step(transition.to) {
                log::warn!(
                    "Dropping orphaned transition {} ({} -> {})",
                    transition.id,
                    transition.from,
                    transition.to
                );
                continue;
            }
            if transition.from == transition.to {
                log::warn!(
                    "Dropping self-loop transition {} on {}",
                    transition.id,
                    transition.from
                );
                continue;
            }
            graph.transition_order.push(transition.id);
            graph.transitions.insert(transition.id, transition);
        }

        log::info!(
            "Loaded workflow '{}' with {} steps and {} transitions",
            graph.name,
            graph.steps.len(),
            graph.transitions.len()
        );
        graph
    }

    /// Serialize back to the definition shape, preserving order.
    pub fn to_definition(&self) -> WorkflowDefinition {
        WorkflowDefinition {
            id: self.id.clone(),
            name: self.name.clone(),
            steps: self.steps_ordered().cloned().collect(),
            transitions: self.transitions_ordered().cloned().collect(),
            extra: self.extra.clone(),
        }
    }

    /// Serialize the graph to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.to_definition().to_json()
    }

    /// Deserialize a graph from JSON, repairing malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        WorkflowDefinition::from_json(json).map(Self::from_definition)
    }

    fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            steps: self.steps.clone(),
            step_order: self.step_order.clone(),
            transitions: self.transitions.clone(),
            transition_order: self.transition_order.clone(),
        }
    }

    fn restore(&mut self, snapshot: GraphSnapshot) {
        self.steps = snapshot.steps;
        self.step_order = snapshot.step_order;
        self.transitions = snapshot.transitions;
        self.transition_order = snapshot.transition_order;
    }

    /// Push current state to undo stack (call before making changes).
    pub fn push_undo(&mut self) {
        let snapshot = self.snapshot();
        self.undo_stack.push(snapshot);
        let redo_stack = std::mem::take(&mut self.redo_stack);

        let evicted = if self.undo_stack.len() > MAX_UNDO_HISTORY {
            Some(self.undo_stack.remove(0))
        } else {
            None
        };
        self.displaced = Some(DisplacedHistory { redo_stack, evicted });
    }

    /// Take back the most recent [`push_undo`](Self::push_undo) without
    /// applying it, restoring the redo history it cleared.
    pub(crate) fn discard_undo(&mut self) {
        if self.undo_stack.pop().is_none() {
            return;
        }
        if let Some(displaced) = self.displaced.take() {
            self.redo_stack = displaced.redo_stack;
            if let Some(oldest) = displaced.evicted {
                self.undo_stack.insert(0, oldest);
            }
        }
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.displaced = None;
        if let Some(snapshot) = self.undo_stack.pop() {
            let current = self.snapshot();
            self.redo_stack.push(current);
            self.restore(snapshot);
            true
        } else {
            false
        }
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.displaced = None;
        if let Some(snapshot) = self.redo_stack.pop() {
            let current = self.snapshot();
            self.undo_stack.push(current);
            self.restore(snapshot);
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Add a new step. Never fails.
    pub fn add_step(&mut self, kind: StepKind, position: Point) -> StepId {
        self.insert_step(Step::new(kind, position))
    }

    /// Insert a fully built step, replacing any step with the same id.
    pub fn insert_step(&mut self, step: Step) -> StepId {
        let id = step.id;
        if self.steps.insert(id, step).is_none() {
            self.step_order.push(id);
        }
        id
    }

    /// Move a step to a new world position. Returns false for unknown ids.
    pub fn move_step(&mut self, id: StepId, position: Point) -> bool {
        match self.steps.get_mut(&id) {
            Some(step) => {
                step.position = position;
                true
            }
            None => false,
        }
    }

    /// Remove a step and every transition attached to it.
    pub fn remove_step(&mut self, id: StepId) -> Option<RemovedStep> {
        let step = self.steps.remove(&id)?;
        self.step_order.retain(|&step_id| step_id != id);

        let attached: Vec<TransitionId> = self
            .transition_order
            .iter()
            .copied()
            .filter(|tid| self.transitions.get(tid).is_some_and(|t| t.touches(id)))
            .collect();
        let transitions = attached
            .iter()
            .filter_map(|tid| self.transitions.remove(tid))
            .collect();
        self.transition_order.retain(|tid| !attached.contains(tid));

        Some(RemovedStep { step, transitions })
    }

    /// Whether a transition from `from` to `to` would be accepted.
    pub fn can_connect(&self, from: StepId, to: StepId) -> bool {
        from != to && self.contains_step(from) && self.contains_step(to)
    }

    /// Add an unguarded transition.
    ///
    /// Returns `None` when either endpoint is missing or `from == to`.
    pub fn add_transition(&mut self, from: StepId, to: StepId) -> Option<TransitionId> {
        if !self.can_connect(from, to) {
            return None;
        }
        let transition = Transition::new(from, to);
        let id = transition.id;
        self.transition_order.push(id);
        self.transitions.insert(id, transition);
        Some(id)
    }

    /// Remove a single transition. Steps are left untouched.
    pub fn remove_transition(&mut self, id: TransitionId) -> Option<Transition> {
        let transition = self.transitions.remove(&id)?;
        self.transition_order.retain(|&tid| tid != id);
        Some(transition)
    }

    /// Mark `id` as the entry step, clearing the flag everywhere else.
    pub fn set_start_step(&mut self, id: StepId) -> bool {
        if !self.contains_step(id) {
            return false;
        }
        for step in self.steps.values_mut() {
            step.is_start = step.id == id;
        }
        true
    }

    /// Clear the entry flag from all steps.
    pub fn clear_start_step(&mut self) {
        for step in self.steps.values_mut() {
            step.is_start = false;
        }
    }

    /// The entry step, if one is flagged.
    pub fn start_step(&self) -> Option<StepId> {
        self.steps_ordered().find(|s| s.is_start).map(|s| s.id)
    }

    /// Rename a step. Returns false for unknown ids.
    pub fn rename_step(&mut self, id: StepId, name: impl Into<String>) -> bool {
        match self.steps.get_mut(&id) {
            Some(step) => {
                step.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Replace the guard on a transition. Returns false for unknown ids.
    pub fn set_condition(&mut self, id: TransitionId, condition: Option<Condition>) -> bool {
        match self.transitions.get_mut(&id) {
            Some(transition) => {
                transition.condition = condition;
                true
            }
            None => false,
        }
    }

    pub fn contains_step(&self, id: StepId) -> bool {
        self.steps.contains_key(&id)
    }

    pub fn contains_transition(&self, id: TransitionId) -> bool {
        self.transitions.contains_key(&id)
    }

    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.get(&id)
    }

    /// Mutable access to a step's display data.
    pub fn step_mut(&mut self, id: StepId) -> Option<&mut Step> {
        self.steps.get_mut(&id)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.get(&id)
    }

    /// Steps in render order (back to front).
    pub fn steps_ordered(&self) -> impl DoubleEndedIterator<Item = &Step> {
        self.step_order.iter().filter_map(|id| self.steps.get(id))
    }

    /// Transitions in creation order.
    pub fn transitions_ordered(&self) -> impl DoubleEndedIterator<Item = &Transition> {
        self.transition_order.iter().filter_map(|id| self.transitions.get(id))
    }

    /// Transitions that start or end at `step`.
    pub fn transitions_of(&self, step: StepId) -> impl Iterator<Item = &Transition> {
        self.transitions_ordered().filter(move |t| t.touches(step))
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Transitions whose endpoints do not resolve. Always empty unless the
    /// graph was corrupted from inside the crate.
    pub fn dangling_transitions(&self) -> Vec<TransitionId> {
        self.transitions_ordered()
            .filter(|t| !self.contains_step(t.from) || !self.contains_step(t.to))
            .map(|t| t.id)
            .collect()
    }

    /// Bounding box of all steps at the given box size.
    pub fn bounds(&self, step_size: Size) -> Option<Rect> {
        self.steps_ordered()
            .map(|s| Rect::from_origin_size(s.position, step_size))
            .reduce(|acc, r| acc.union(r))
    }

    /// Ids of all steps, for set comparisons.
    pub fn step_ids(&self) -> HashSet<StepId> {
        self.steps.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn two_steps() -> (WorkflowGraph, StepId, StepId) {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_step(StepKind::Task, Point::new(0.0, 0.0));
        let b = graph.add_step(StepKind::Approval, Point::new(300.0, 0.0));
        (graph, a, b)
    }

    #[test]
    fn test_add_and_move_step() {
        let mut graph = WorkflowGraph::new();
        let id = graph.add_step(StepKind::Task, Point::new(10.0, 10.0));
        assert_eq!(graph.step_count(), 1);

        assert!(graph.move_step(id, Point::new(40.0, 80.0)));
        assert_eq!(graph.step(id).unwrap().position, Point::new(40.0, 80.0));
        assert!(!graph.move_step(Uuid::new_v4(), Point::ZERO));
    }

    #[test]
    fn test_cascading_delete() {
        let (mut graph, a, b) = two_steps();
        let t = graph.add_transition(a, b).unwrap();

        let removed = graph.remove_step(a).unwrap();
        assert_eq!(removed.step.id(), a);
        assert_eq!(removed.transitions.len(), 1);
        assert_eq!(removed.transitions[0].id(), t);

        assert!(graph.contains_step(b));
        assert_eq!(graph.transition_count(), 0);
        assert_eq!(graph.transitions_of(a).count(), 0);
    }

    #[test]
    fn test_remove_step_keeps_unrelated_transitions() {
        let (mut graph, a, b) = two_steps();
        let c = graph.add_step(StepKind::Automation, Point::new(600.0, 0.0));
        graph.add_transition(a, b).unwrap();
        let kept = graph.add_transition(b, c).unwrap();
        graph.add_transition(c, a).unwrap();

        graph.remove_step(a);
        let remaining: Vec<_> = graph.transitions_ordered().map(|t| t.id()).collect();
        assert_eq!(remaining, vec![kept]);
    }

    #[test]
    fn test_add_transition_rejects_self_loop_and_missing() {
        let (mut graph, a, _) = two_steps();
        assert!(graph.add_transition(a, a).is_none());
        assert!(graph.add_transition(a, Uuid::new_v4()).is_none());
        assert!(graph.add_transition(Uuid::new_v4(), a).is_none());
        assert_eq!(graph.transition_count(), 0);
    }

    #[test]
    fn test_remove_transition_does_not_cascade() {
        let (mut graph, a, b) = two_steps();
        let t = graph.add_transition(a, b).unwrap();
        assert!(graph.remove_transition(t).is_some());
        assert!(graph.remove_transition(t).is_none());
        assert_eq!(graph.step_count(), 2);
    }

    #[test]
    fn test_no_dangling_transitions_under_random_edits() {
        // Deterministic pseudo-random sequence over all four mutations
        let mut graph = WorkflowGraph::new();
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for _ in 0..500 {
            let steps: Vec<StepId> = graph.steps_ordered().map(|s| s.id()).collect();
            let transitions: Vec<TransitionId> =
                graph.transitions_ordered().map(|t| t.id()).collect();
            match next() % 4 {
                0 => {
                    graph.add_step(StepKind::Task, Point::new((next() % 1000) as f64, 0.0));
                }
                1 if !steps.is_empty() => {
                    graph.remove_step(steps[(next() as usize) % steps.len()]);
                }
                2 if !steps.is_empty() => {
                    let from = steps[(next() as usize) % steps.len()];
                    let to = steps[(next() as usize) % steps.len()];
                    graph.add_transition(from, to);
                }
                3 if !transitions.is_empty() => {
                    graph.remove_transition(transitions[(next() as usize) % transitions.len()]);
                }
                _ => {}
            }
            assert!(graph.dangling_transitions().is_empty());
        }
    }

    #[test]
    fn test_single_start_step() {
        let (mut graph, a, b) = two_steps();
        assert!(graph.set_start_step(a));
        assert!(graph.set_start_step(b));
        assert_eq!(graph.start_step(), Some(b));
        assert!(!graph.step(a).unwrap().is_start());
        assert!(!graph.set_start_step(Uuid::new_v4()));
        assert_eq!(graph.start_step(), Some(b));

        graph.clear_start_step();
        assert_eq!(graph.start_step(), None);
    }

    #[test]
    fn test_rename_and_condition() {
        let (mut graph, a, b) = two_steps();
        let t = graph.add_transition(a, b).unwrap();
        assert!(graph.rename_step(a, "Submit request"));
        assert_eq!(graph.step(a).unwrap().name, "Submit request");

        let cond = Condition::new("amount", ">", json!(500));
        assert!(graph.set_condition(t, Some(cond.clone())));
        assert_eq!(graph.transition(t).unwrap().condition, Some(cond));
        assert!(!graph.set_condition(Uuid::new_v4(), None));
    }

    #[test]
    fn test_load_drops_orphans_self_loops_and_duplicates() {
        let a = Step::new(StepKind::Task, Point::ZERO);
        let b = Step::new(StepKind::Task, Point::new(200.0, 0.0));
        let (a_id, b_id) = (a.id(), b.id());
        let good = Transition::new(a_id, b_id);
        let mut duplicate = Transition::new(b_id, a_id);
        duplicate.id = good.id;

        let definition = WorkflowDefinition {
            id: "wf-1".into(),
            name: "Expenses".into(),
            steps: vec![a.clone(), b, a],
            transitions: vec![
                good.clone(),
                duplicate,
                Transition::new(a_id, Uuid::new_v4()),
                Transition::new(b_id, b_id),
            ],
            ..Default::default()
        };

        let graph = WorkflowGraph::from_definition(definition);
        assert_eq!(graph.step_count(), 2);
        assert_eq!(graph.transition_count(), 1);
        assert_eq!(graph.transition(good.id()), Some(&good));
        assert!(graph.dangling_transitions().is_empty());
    }

    #[test]
    fn test_load_keeps_first_start_flag() {
        let mut a = Step::new(StepKind::Task, Point::ZERO);
        let mut b = Step::new(StepKind::Task, Point::new(200.0, 0.0));
        a.is_start = true;
        b.is_start = true;
        let a_id = a.id();

        let graph = WorkflowGraph::from_definition(WorkflowDefinition {
            steps: vec![a, b],
            ..Default::default()
        });
        assert_eq!(graph.start_step(), Some(a_id));
        assert_eq!(graph.steps_ordered().filter(|s| s.is_start()).count(), 1);
    }

    #[test]
    fn test_json_round_trip_after_edits() {
        let (mut graph, a, b) = two_steps();
        graph.name = "Onboarding".into();
        let c = graph.add_step(StepKind::Notification, Point::new(600.0, 120.0));
        let t = graph.add_transition(a, b).unwrap();
        graph.add_transition(b, c).unwrap();
        graph.set_condition(t, Some(Condition::new("approved", "==", json!(true))));
        graph.set_start_step(a);
        graph.step_mut(c).unwrap().metadata.insert("channel".into(), json!("email"));
        graph.remove_step(b);

        let json = graph.to_json().unwrap();
        let reloaded = WorkflowGraph::from_json(&json).unwrap();
        assert_eq!(reloaded.to_definition(), graph.to_definition());
    }

    #[test]
    fn test_unrecognized_keys_survive_edit_and_save() {
        let json = r#"{
            "id": "wf-9",
            "revision": "r12",
            "steps": [
                { "id": "6f9619ff-8b86-d011-b42d-00c04fc964ff", "type": "task",
                  "position": { "x": 0.0, "y": 0.0 }, "sla": "2d" },
                { "id": "7f9619ff-8b86-d011-b42d-00c04fc964ff", "type": "approval",
                  "position": { "x": 300.0, "y": 0.0 } }
            ],
            "transitions": [
                { "id": "8f9619ff-8b86-d011-b42d-00c04fc964ff",
                  "from": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
                  "to": "7f9619ff-8b86-d011-b42d-00c04fc964ff",
                  "condition": {
                      "field": "amount", "operator": ">", "value": 5, "valueType": "number"
                  } }
            ]
        }"#;
        let mut graph = WorkflowGraph::from_json(json).unwrap();
        let first = graph.steps_ordered().next().unwrap().id();
        graph.move_step(first, Point::new(40.0, 20.0));

        let saved: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
        assert_eq!(saved["revision"], json!("r12"));
        assert_eq!(saved["steps"][0]["sla"], json!("2d"));
        assert_eq!(
            saved["transitions"][0]["condition"],
            json!({ "field": "amount", "operator": ">", "value": 5, "valueType": "number" })
        );
    }

    #[test]
    fn test_undo_redo() {
        let mut graph = WorkflowGraph::new();
        graph.push_undo();
        let id = graph.add_step(StepKind::Task, Point::ZERO);
        assert!(graph.can_undo());

        assert!(graph.undo());
        assert!(graph.is_empty());
        assert!(graph.can_redo());

        assert!(graph.redo());
        assert!(graph.contains_step(id));
    }

    #[test]
    fn test_discard_undo_restores_redo_history() {
        let (mut graph, a, _) = two_steps();
        graph.push_undo();
        graph.move_step(a, Point::new(100.0, 0.0));
        assert!(graph.undo());
        assert!(graph.can_redo());

        graph.push_undo();
        graph.move_step(a, Point::new(40.0, 40.0));
        assert!(!graph.can_redo());
        graph.move_step(a, Point::ZERO);
        graph.discard_undo();

        assert!(graph.can_redo());
        assert!(!graph.can_undo());
        assert!(graph.redo());
        assert_eq!(graph.step(a).unwrap().position, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_discard_undo_at_capacity_keeps_oldest_state() {
        let mut graph = WorkflowGraph::new();
        for i in 0..MAX_UNDO_HISTORY {
            graph.push_undo();
            graph.add_step(StepKind::Task, Point::new(i as f64 * 200.0, 0.0));
        }
        graph.push_undo();
        graph.discard_undo();

        let mut undone = 0;
        while graph.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_HISTORY);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_undo_restores_cascaded_transitions() {
        let (mut graph, a, b) = two_steps();
        let t = graph.add_transition(a, b).unwrap();

        graph.push_undo();
        graph.remove_step(a);
        assert!(graph.undo());
        assert!(graph.contains_step(a));
        assert!(graph.contains_transition(t));
    }

    #[test]
    fn test_undo_history_is_capped() {
        let mut graph = WorkflowGraph::new();
        for _ in 0..(MAX_UNDO_HISTORY + 10) {
            graph.push_undo();
            graph.add_step(StepKind::Task, Point::ZERO);
        }
        let mut undone = 0;
        while graph.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_HISTORY);
        assert_eq!(graph.step_count(), 10);
    }

    #[test]
    fn test_bounds() {
        let (graph, _, _) = two_steps();
        let bounds = graph.bounds(Size::new(180.0, 64.0)).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 480.0, 64.0));
        assert!(WorkflowGraph::new().bounds(Size::new(1.0, 1.0)).is_none());
    }
}
