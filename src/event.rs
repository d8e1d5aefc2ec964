//! Normalized, backend-independent events.
//!
//! Everything downstream of the sampler sees only these types. A new value is
//! built per emission and handed over by value; nothing here is mutated after
//! it leaves the sampler.

use std::fmt;

use bitflags::bitflags;

/// All events funnelled from the sampler to the consumer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Event {
    /// Placeholder for raw input the sampler does not understand.
    /// Consumers ignore it.
    #[default]
    None,
    /// The terminal was resized. The consumer re-queries the size itself.
    Resize,
    /// A decoded key press.
    Key(KeyPress),
    /// A decoded mouse report.
    Mouse(MouseEvent),
}

/// Tag of an [`Event`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    None,
    Resize,
    Key,
    Mouse,
}

impl Event {
    pub fn kind(&self) -> EventType {
        match self {
            Event::None => EventType::None,
            Event::Resize => EventType::Resize,
            Event::Key(_) => EventType::Key,
            Event::Mouse(_) => EventType::Mouse,
        }
    }

    /// The key payload, if this is a key event.
    pub fn key(&self) -> Option<KeyPress> {
        match self {
            Event::Key(key) => Some(*key),
            _ => None,
        }
    }

    /// The mouse payload, if this is a mouse event.
    pub fn mouse(&self) -> Option<MouseEvent> {
        match self {
            Event::Mouse(mouse) => Some(*mouse),
            _ => None,
        }
    }
}

bitflags! {
    /// Modifier keys held during a key or mouse event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifier: u8 {
        const SHIFT  = 1 << 0;
        const ALT    = 1 << 1;
        const CTRL   = 1 << 2;
        /// Mouse moved with a button held (drag).
        const MOTION = 1 << 3;
    }
}

/// Symbolic code for keys that are not plain characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// Function key, `F(1)` through `F(12)`.
    F(u8),
    /// Control chord on a letter, reported alongside the letter rune.
    Ctrl(char),
}

/// One key press: a modifier set plus a rune, a symbolic code, or both.
///
/// A plain character has `code == None`; a named key has `rune == None`.
/// Control chords are the one case where the backend reports both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyPress {
    pub modifier: Modifier,
    pub rune: Option<char>,
    pub code: Option<KeyCode>,
}

impl KeyPress {
    /// A plain character with no modifiers.
    pub const fn rune(rune: char) -> Self {
        Self {
            modifier: Modifier::empty(),
            rune: Some(rune),
            code: None,
        }
    }

    /// A named key with no modifiers.
    pub const fn code(code: KeyCode) -> Self {
        Self {
            modifier: Modifier::empty(),
            rune: None,
            code: Some(code),
        }
    }

    pub const fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }

    /// Add `ALT` to whatever modifiers are already set.
    pub fn with_alt(mut self) -> Self {
        self.modifier |= Modifier::ALT;
        self
    }

    /// `true` for exactly `c`, with no modifier and no symbolic code.
    pub fn is_rune(&self, c: char) -> bool {
        self.rune == Some(c) && self.code.is_none() && self.modifier.is_empty()
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, flag) in [
            ("Ctrl", Modifier::CTRL),
            ("Alt", Modifier::ALT),
            ("Shift", Modifier::SHIFT),
        ] {
            if self.modifier.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        match (self.code, self.rune) {
            (Some(KeyCode::Ctrl(c)), _) => write!(f, "{c}"),
            (Some(KeyCode::F(n)), _) => write!(f, "F{n}"),
            (Some(code), _) => write!(f, "{code:?}"),
            (None, Some(' ')) => write!(f, "Space"),
            (None, Some(c)) => write!(f, "{c}"),
            (None, None) => write!(f, "?"),
        }
    }
}

/// Mouse buttons and wheel directions, as reported after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Release,
    WheelUp,
    WheelDown,
}

/// A mouse report at a 0-indexed cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub x: u16,
    pub y: u16,
    pub button: MouseButton,
    pub modifier: Modifier,
}
