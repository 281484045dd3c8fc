//! Input events for canvas interaction.
//!
//! Pointer coordinates are in display pixels relative to the canvas
//! origin, i.e. already scaled by the current zoom. The editor converts
//! them to unscaled canvas units using the viewport's current scale.

use serde::{Deserialize, Serialize};

use crate::Point;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved (button may or may not be held).
    Move,
    /// Button released.
    Up,
}

/// A single pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// X position in display pixels.
    pub x: f32,
    /// Y position in display pixels.
    pub y: f32,
}

impl PointerEvent {
    /// Pointer pressed at `(x, y)`.
    #[must_use]
    pub const fn down(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Down,
            x,
            y,
        }
    }

    /// Pointer moved to `(x, y)`.
    #[must_use]
    pub const fn moved(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Move,
            x,
            y,
        }
    }

    /// Pointer released at `(x, y)`.
    #[must_use]
    pub const fn up(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Up,
            x,
            y,
        }
    }

    /// Position as a point in display pixels.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A keyboard event relevant to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    /// Key name as reported by the host (`"Delete"`, `"Backspace"`, ...).
    pub key: String,
    /// Whether a text input currently has keyboard focus.
    #[serde(default)]
    pub input_focused: bool,
}

impl KeyEvent {
    /// A key press with no text input focused.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            input_focused: false,
        }
    }

    /// Whether this key deletes the selected element.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        !self.input_focused && matches!(self.key.as_str(), "Delete" | "Backspace")
    }
}

/// Unified input event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    /// Pointer input (mouse, pen, single touch).
    Pointer(PointerEvent),
    /// Double click at a display position.
    DoubleClick {
        /// X position in display pixels.
        x: f32,
        /// Y position in display pixels.
        y: f32,
    },
    /// Keyboard input.
    Key(KeyEvent),
}
