//! Input events delivered to the designer canvas.
//!
//! Any input system (mouse, touch, a scripted harness) can produce these.
//! Positions are in screen coordinates unless stated otherwise.

use crate::workflow::{StepId, StepKind};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Platform command modifier (Ctrl, or Cmd on macOS).
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Keys the canvas reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    /// A printable character.
    Char(char),
}

impl Key {
    /// Parse a key name as reported by windowing toolkits ("Delete", "Escape", "z").
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Delete" | "Del" => Some(Key::Delete),
            "Backspace" => Some(Key::Backspace),
            "Escape" | "Esc" => Some(Key::Escape),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c.to_ascii_lowercase())),
                    _ => None,
                }
            }
        }
    }

    /// Whether this key deletes the current selection.
    pub fn is_delete(&self) -> bool {
        matches!(self, Key::Delete | Key::Backspace)
    }
}

/// An event fed to the designer canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    PointerDown {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    PointerMove {
        position: Point,
    },
    PointerUp {
        position: Point,
    },
    /// The pointer left the canvas surface.
    PointerLeave,
    /// Wheel or trackpad scroll; `delta.y < 0` zooms in.
    Scroll {
        position: Point,
        delta: Vec2,
    },
    /// Node-local "connect" affordance was activated on `step`.
    StartConnection {
        step: StepId,
    },
    /// Node body was grabbed for repositioning at `position`.
    BeginStepDrag {
        step: StepId,
        position: Point,
    },
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// A palette item started dragging.
    DragStarted {
        kind: StepKind,
    },
    /// The palette ghost moved over the canvas.
    DragMoved {
        position: Point,
    },
    /// A palette item was dropped on the canvas.
    Dropped {
        kind: StepKind,
        position: Point,
    },
    /// The palette drag ended outside the canvas.
    DragCancelled,
}

impl CanvasEvent {
    /// Key press without modifiers.
    pub fn key(key: Key) -> Self {
        CanvasEvent::Key {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Primary-button press.
    pub fn pointer_down(position: Point) -> Self {
        CanvasEvent::PointerDown {
            position,
            button: MouseButton::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("Delete"), Some(Key::Delete));
        assert_eq!(Key::from_name("Esc"), Some(Key::Escape));
        assert_eq!(Key::from_name("Z"), Some(Key::Char('z')));
        assert_eq!(Key::from_name("F12"), None);
        assert!(Key::Backspace.is_delete());
        assert!(!Key::Escape.is_delete());
    }

    #[test]
    fn test_event_script_format() {
        let json = r#"[
            { "type": "pointer_down", "position": { "x": 5.0, "y": 6.0 } },
            { "type": "key", "key": "escape" },
            { "type": "key", "key": { "char": "z" }, "modifiers": { "ctrl": true } },
            { "type": "dropped", "kind": "approval", "position": { "x": 27.0, "y": 53.0 } },
            { "type": "pointer_leave" }
        ]"#;
        let events: Vec<CanvasEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events[0], CanvasEvent::pointer_down(Point::new(5.0, 6.0)));
        assert_eq!(events[1], CanvasEvent::key(Key::Escape));
        assert_eq!(
            events[2],
            CanvasEvent::Key {
                key: Key::Char('z'),
                modifiers: Modifiers::CTRL,
            }
        );
        assert_eq!(
            events[3],
            CanvasEvent::Dropped {
                kind: StepKind::Approval,
                position: Point::new(27.0, 53.0),
            }
        );
        assert_eq!(events[4], CanvasEvent::PointerLeave);
    }

    #[test]
    fn test_command_modifier() {
        assert!(Modifiers::CTRL.command());
        assert!(Modifiers { meta: true, ..Modifiers::NONE }.command());
        assert!(!Modifiers::NONE.command());
    }
}
