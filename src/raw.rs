//! Raw events as handed over by a backend adapter.
//!
//! The layout follows the classic termbox event shape: a key event carries a
//! 16-bit key code, a decoded rune and a byte of modifier bits. Named keys sit
//! at the top of the `u16` range, control codes at their ASCII values, and a
//! plain character is `key == 0` with `rune` set.

/// Raw 16-bit key (or mouse button) code.
pub type RawKey = u16;

/// One event as reported by the backend, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    /// The terminal changed size.
    Resize { width: u16, height: u16 },
    /// A key press. `rune` is set when the backend decoded a character.
    Key {
        key: RawKey,
        rune: Option<char>,
        modifiers: u8,
    },
    /// A mouse report at a 0-indexed cell position.
    Mouse {
        x: u16,
        y: u16,
        button: RawKey,
        modifiers: u8,
    },
    /// A block of text pasted in one go (bracketed paste).
    Paste(String),
    /// Something the adapter received but has no raw shape for.
    Unknown,
    /// The backend failed and will produce nothing further.
    Error(String),
}

impl RawEvent {
    /// A plain character with no modifier bits.
    pub fn rune(rune: char) -> Self {
        Self::Key {
            key: key::NONE,
            rune: Some(rune),
            modifiers: 0,
        }
    }

    /// A key code with no rune and no modifier bits.
    pub fn key(key: RawKey) -> Self {
        Self::Key {
            key,
            rune: None,
            modifiers: 0,
        }
    }

    /// A lone ESC byte.
    pub fn esc() -> Self {
        Self::key(key::ESC)
    }

    pub fn resize(width: u16, height: u16) -> Self {
        Self::Resize { width, height }
    }
}

/// Raw key codes.
pub mod key {
    use super::RawKey;

    pub const NONE: RawKey = 0x00;
    pub const CTRL_A: RawKey = 0x01;
    pub const CTRL_Z: RawKey = 0x1A;
    pub const BACKSPACE: RawKey = 0x08;
    pub const TAB: RawKey = 0x09;
    pub const ENTER: RawKey = 0x0D;
    pub const ESC: RawKey = 0x1B;
    pub const CTRL_BACKSLASH: RawKey = 0x1C;
    pub const CTRL_UNDERSCORE: RawKey = 0x1F;
    pub const SPACE: RawKey = 0x20;
    pub const BACKSPACE2: RawKey = 0x7F;

    pub const F1: RawKey = 0xFFFF;
    pub const F2: RawKey = 0xFFFF - 1;
    pub const F3: RawKey = 0xFFFF - 2;
    pub const F4: RawKey = 0xFFFF - 3;
    pub const F5: RawKey = 0xFFFF - 4;
    pub const F6: RawKey = 0xFFFF - 5;
    pub const F7: RawKey = 0xFFFF - 6;
    pub const F8: RawKey = 0xFFFF - 7;
    pub const F9: RawKey = 0xFFFF - 8;
    pub const F10: RawKey = 0xFFFF - 9;
    pub const F11: RawKey = 0xFFFF - 10;
    pub const F12: RawKey = 0xFFFF - 11;
    pub const INSERT: RawKey = 0xFFFF - 12;
    pub const DELETE: RawKey = 0xFFFF - 13;
    pub const HOME: RawKey = 0xFFFF - 14;
    pub const END: RawKey = 0xFFFF - 15;
    pub const PGUP: RawKey = 0xFFFF - 16;
    pub const PGDN: RawKey = 0xFFFF - 17;
    pub const ARROW_UP: RawKey = 0xFFFF - 18;
    pub const ARROW_DOWN: RawKey = 0xFFFF - 19;
    pub const ARROW_LEFT: RawKey = 0xFFFF - 20;
    pub const ARROW_RIGHT: RawKey = 0xFFFF - 21;
    pub const MOUSE_LEFT: RawKey = 0xFFFF - 22;
    pub const MOUSE_MIDDLE: RawKey = 0xFFFF - 23;
    pub const MOUSE_RIGHT: RawKey = 0xFFFF - 24;
    pub const MOUSE_RELEASE: RawKey = 0xFFFF - 25;
    pub const MOUSE_WHEEL_UP: RawKey = 0xFFFF - 26;
    pub const MOUSE_WHEEL_DOWN: RawKey = 0xFFFF - 27;
    pub const BACK_TAB: RawKey = 0xFFFF - 28;
}

/// Raw modifier bits.
pub mod modifier {
    pub const ALT: u8 = 0x01;
    pub const MOTION: u8 = 0x02;
    pub const CTRL: u8 = 0x04;
    pub const SHIFT: u8 = 0x08;
}
