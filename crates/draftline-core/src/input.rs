//! Raw pointer/keyboard events and the state tracked between them.

use crate::tools::ToolKind;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Held modifier keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    Scroll {
        position: Point,
        delta: Vec2,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Scroll { position, .. } => *position,
        }
    }
}

/// Key transition. Keys use DOM-style names ("Shift", "Delete", "z").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Keyboard command recognised by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Tool(ToolKind),
    Delete,
    Undo,
    Redo,
}

impl Shortcut {
    /// Map a pressed key to a command.
    pub fn from_key(key: &str, modifiers: Modifiers) -> Option<Self> {
        if modifiers.command() {
            return match key {
                "z" | "Z" => Some(Shortcut::Undo),
                "y" | "Y" => Some(Shortcut::Redo),
                _ => None,
            };
        }
        match key {
            "Delete" | "Backspace" => Some(Shortcut::Delete),
            "v" => Some(Shortcut::Tool(ToolKind::Select)),
            "l" => Some(Shortcut::Tool(ToolKind::Wall)),
            "w" => Some(Shortcut::Tool(ToolKind::Window)),
            "d" => Some(Shortcut::Tool(ToolKind::Door)),
            _ => None,
        }
    }
}

/// Tracks pointer, buttons and modifiers between events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    cursor: Point,
    last_cursor: Point,
    buttons: HashSet<MouseButton>,
    held: HashSet<String>,
    pub modifiers: Modifiers,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        self.last_cursor = std::mem::replace(&mut self.cursor, event.position());
        match event {
            PointerEvent::Down { button, .. } => {
                self.buttons.insert(*button);
            }
            PointerEvent::Up { button, .. } => {
                self.buttons.remove(button);
            }
            PointerEvent::Move { .. } | PointerEvent::Scroll { .. } => {}
        }
    }

    /// Record a key transition. Modifier names also update [`Modifiers`].
    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        let (key, down) = match event {
            KeyEvent::Pressed(key) => (key, true),
            KeyEvent::Released(key) => (key, false),
        };
        let flag = match key.as_str() {
            "Shift" => Some(&mut self.modifiers.shift),
            "Control" => Some(&mut self.modifiers.ctrl),
            "Alt" => Some(&mut self.modifiers.alt),
            "Meta" => Some(&mut self.modifiers.meta),
            _ => None,
        };
        if let Some(flag) = flag {
            *flag = down;
        }
        if down {
            self.held.insert(key.clone());
        } else {
            self.held.remove(key);
        }
    }

    /// Overwrite modifiers from a platform snapshot.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    /// Last known pointer position, in screen pixels.
    pub fn pointer(&self) -> Point {
        self.cursor
    }

    /// Screen-space movement between the last two pointer events.
    pub fn pointer_delta(&self) -> Vec2 {
        self.cursor - self.last_cursor
    }
}
