//! Workflow step and transition definitions.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier for workflow steps.
pub type StepId = Uuid;

/// Unique identifier for transitions.
pub type TransitionId = Uuid;

/// The closed set of step kinds. Only affects labels and icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Task,
    Approval,
    Notification,
    Condition,
    Automation,
}

impl StepKind {
    /// All step kinds in palette order.
    pub const ALL: [StepKind; 5] = [
        StepKind::Task,
        StepKind::Approval,
        StepKind::Notification,
        StepKind::Condition,
        StepKind::Automation,
    ];

    /// Default display label for new steps of this kind.
    pub fn label(self) -> &'static str {
        match self {
            StepKind::Task => "Task",
            StepKind::Approval => "Approval",
            StepKind::Notification => "Notification",
            StepKind::Condition => "Condition",
            StepKind::Automation => "Automation",
        }
    }
}

/// A workflow step (graph node).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub(crate) id: StepId,
    /// Step kind.
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Top-left corner in world coordinates.
    pub position: Point,
    /// Entry point flag. At most one step per graph carries it.
    #[serde(default)]
    pub(crate) is_start: bool,
    /// Backend-owned data, carried through untouched.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Unrecognized keys, written back on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    /// Create a new step with a fresh id.
    pub fn new(kind: StepKind, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: kind.label().to_string(),
            position,
            is_start: false,
            metadata: Map::new(),
            extra: Map::new(),
        }
    }

    /// Reconstruct a step with a specific id (for loading and tests).
    pub fn with_id(id: StepId, kind: StepKind, position: Point) -> Self {
        Self {
            id,
            ..Self::new(kind, position)
        }
    }

    pub fn id(&self) -> StepId {
        self.id
    }

    pub fn is_start(&self) -> bool {
        self.is_start
    }
}

/// Guard attached to a transition.
///
/// The payload belongs to the backend and is stored as-is; the editor only
/// derives a display label from it and never evaluates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition(Value);

impl Condition {
    /// Build the common `{ field, operator, value }` guard.
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        let mut map = Map::new();
        map.insert("field".into(), Value::String(field.into()));
        map.insert("operator".into(), Value::String(operator.into()));
        map.insert("value".into(), value);
        Self(Value::Object(map))
    }

    /// Wrap an arbitrary guard payload.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Short human-readable form, e.g. `amount > 1000`.
    ///
    /// Guards that are not in `{ field, operator, value }` shape fall back to
    /// their compact JSON text, or the string itself for string guards.
    pub fn label(&self) -> String {
        let field = self.0.get("field").and_then(Value::as_str);
        let operator = self.0.get("operator").and_then(Value::as_str);
        match (field, operator) {
            (Some(field), Some(operator)) => match self.0.get("value") {
                None | Some(Value::Null) => format!("{} {}", field, operator),
                Some(Value::String(s)) => format!("{} {} {}", field, operator, s),
                Some(other) => format!("{} {} {}", field, operator, other),
            },
            _ => match &self.0 {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }
}

/// A directed transition between two steps (graph edge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub(crate) id: TransitionId,
    pub(crate) from: StepId,
    pub(crate) to: StepId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Unrecognized keys, written back on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transition {
    /// Create a new unguarded transition with a fresh id.
    pub fn new(from: StepId, to: StepId) -> Self {
        Self::with_id(Uuid::new_v4(), from, to)
    }

    /// Reconstruct a transition with a specific id (for loading and tests).
    pub fn with_id(id: TransitionId, from: StepId, to: StepId) -> Self {
        Self {
            id,
            from,
            to,
            condition: None,
            extra: Map::new(),
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn from(&self) -> StepId {
        self.from
    }

    pub fn to(&self) -> StepId {
        self.to
    }

    /// Whether this transition starts or ends at `step`.
    pub fn touches(&self, step: StepId) -> bool {
        self.from == step || self.to == step
    }
}

/// Serialized workflow as exchanged with the load/save boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Workflow identifier assigned by the backend.
    #[serde(default)]
    pub id: String,
    /// Workflow name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    /// Unrecognized top-level keys, written back on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowDefinition {
    /// Serialize the definition to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
