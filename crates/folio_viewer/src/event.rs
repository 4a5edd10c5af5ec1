use crate::geometry::Point;

/// Identifier the platform assigns to one contact (mouse, pen or finger).
pub type PointerId = i32;

/// A pointer contact sample in client (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub position: Point,
    /// Monotonic timestamp in milliseconds
    pub timestamp_ms: f64,
}

impl PointerEvent {
    pub fn new(id: PointerId, x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
            timestamp_ms,
        }
    }
}

/// Mouse wheel input over the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub position: Point,
    pub delta_y: f32,
    pub modifiers: Modifiers,
}

/// Keyboard keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Key {
        if key == "Escape" {
            return Key::Escape;
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::Char(c),
            _ => Key::Other,
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl or Cmd held: the browser would treat a wheel as page zoom.
    pub fn is_zoom_chord(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_dom() {
        assert_eq!(Key::from_dom("Escape"), Key::Escape);
        assert_eq!(Key::from_dom("+"), Key::Char('+'));
        assert_eq!(Key::from_dom("0"), Key::Char('0'));
        assert_eq!(Key::from_dom("ArrowLeft"), Key::Other);
        assert_eq!(Key::from_dom(""), Key::Other);
    }

    #[test]
    fn test_zoom_chord() {
        assert!(!Modifiers::default().is_zoom_chord());
        assert!(Modifiers { ctrl: true, ..Default::default() }.is_zoom_chord());
        assert!(Modifiers { meta: true, ..Default::default() }.is_zoom_chord());
    }
}
