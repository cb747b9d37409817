//! Keyboard shortcut registry and documentation.

use flowcanvas_core::input::{CanvasEvent, Key, Modifiers};

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// The canvas event this shortcut produces.
    pub fn event(&self) -> Option<CanvasEvent> {
        let key = Key::from_name(self.key)?;
        Some(CanvasEvent::Key {
            key,
            modifiers: Modifiers {
                ctrl: self.ctrl,
                shift: self.shift,
                ..Modifiers::NONE
            },
        })
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("Delete", false, false, "Delete selected step or transition"),
            Shortcut::new("Backspace", false, false, "Delete selected step or transition"),
            Shortcut::new(
                "Escape",
                false,
                false,
                "Cancel connection, drag or placement; clear selection",
            ),
        ]
    }

    /// Render the shortcut table as text.
    pub fn describe() -> String {
        let mut out = String::from("Keyboard shortcuts:\n");
        for shortcut in Self::all() {
            out.push_str(&format!("  {:20} {}\n", shortcut.format(), shortcut.description));
        }
        out
    }
}
