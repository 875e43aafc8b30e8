//! Pointer and keyboard events delivered by the host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Pointer event in scene coordinates.
///
/// The position is optional because some hosts emit events that cannot be
/// mapped onto the scene (e.g. synthetic events without an originating
/// pointer). Those are ignored where a position is needed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Option<Point>,
        button: MouseButton,
    },
    Move {
        position: Option<Point>,
    },
    Up {
        position: Option<Point>,
        button: MouseButton,
    },
}

impl PointerEvent {
    /// Left-button press at `position`.
    pub fn down(position: Point) -> Self {
        PointerEvent::Down {
            position: Some(position),
            button: MouseButton::Left,
        }
    }

    pub fn moved(position: Point) -> Self {
        PointerEvent::Move {
            position: Some(position),
        }
    }

    /// Left-button release at `position`.
    pub fn up(position: Point) -> Self {
        PointerEvent::Up {
            position: Some(position),
            button: MouseButton::Left,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. } => *position,
        }
    }
}

/// Keys the session reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Other(String),
}

impl Key {
    /// Map a DOM-style key name (`"Delete"`, `"Backspace"`, ...).
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }

    /// Keys that delete the current selection.
    pub fn is_delete(&self) -> bool {
        matches!(self, Key::Delete | Key::Backspace)
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(Key),
    Released(Key),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_position() {
        assert_eq!(
            PointerEvent::down(Point::new(1.0, 2.0)).position(),
            Some(Point::new(1.0, 2.0))
        );
        let bare = PointerEvent::Down {
            position: None,
            button: MouseButton::Left,
        };
        assert_eq!(bare.position(), None);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("Delete"), Key::Delete);
        assert!(Key::from_name("Backspace").is_delete());
        assert!(!Key::from_name("Escape").is_delete());
        assert_eq!(Key::from_name("a"), Key::Other("a".to_string()));
    }
}
