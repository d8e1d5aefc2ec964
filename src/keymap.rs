//! Translation tables from raw backend codes to normalized values.
//!
//! The raw modifier layout differs between backends, so it lives in a table
//! that can be swapped per backend instead of being hard-coded in the sampler.
//! The escape-sequence decoders at the bottom cover terminals that deliver
//! cursor and function keys as `ESC [ …` / `ESC O …` rune streams.

use std::collections::HashMap;

use crate::event::{KeyCode, KeyPress, Modifier, MouseButton, MouseEvent};
use crate::raw::{key, modifier, RawKey};

const DEFAULT_KEYS: &[(RawKey, KeyCode)] = &[
    (key::ESC, KeyCode::Escape),
    (key::ENTER, KeyCode::Enter),
    (key::TAB, KeyCode::Tab),
    (key::BACK_TAB, KeyCode::BackTab),
    (key::BACKSPACE, KeyCode::Backspace),
    (key::BACKSPACE2, KeyCode::Backspace),
    (key::INSERT, KeyCode::Insert),
    (key::DELETE, KeyCode::Delete),
    (key::HOME, KeyCode::Home),
    (key::END, KeyCode::End),
    (key::PGUP, KeyCode::PageUp),
    (key::PGDN, KeyCode::PageDown),
    (key::ARROW_UP, KeyCode::Up),
    (key::ARROW_DOWN, KeyCode::Down),
    (key::ARROW_LEFT, KeyCode::Left),
    (key::ARROW_RIGHT, KeyCode::Right),
    (key::F1, KeyCode::F(1)),
    (key::F2, KeyCode::F(2)),
    (key::F3, KeyCode::F(3)),
    (key::F4, KeyCode::F(4)),
    (key::F5, KeyCode::F(5)),
    (key::F6, KeyCode::F(6)),
    (key::F7, KeyCode::F(7)),
    (key::F8, KeyCode::F(8)),
    (key::F9, KeyCode::F(9)),
    (key::F10, KeyCode::F(10)),
    (key::F11, KeyCode::F(11)),
    (key::F12, KeyCode::F(12)),
];

const DEFAULT_MODIFIERS: &[(u8, Modifier)] = &[
    (modifier::ALT, Modifier::ALT),
    (modifier::MOTION, Modifier::MOTION),
    (modifier::CTRL, Modifier::CTRL),
    (modifier::SHIFT, Modifier::SHIFT),
];

const DEFAULT_MOUSE: &[(RawKey, MouseButton)] = &[
    (key::MOUSE_LEFT, MouseButton::Left),
    (key::MOUSE_MIDDLE, MouseButton::Middle),
    (key::MOUSE_RIGHT, MouseButton::Right),
    (key::MOUSE_RELEASE, MouseButton::Release),
    (key::MOUSE_WHEEL_UP, MouseButton::WheelUp),
    (key::MOUSE_WHEEL_DOWN, MouseButton::WheelDown),
];

/// Backend-specific translation table.
#[derive(Debug, Clone)]
pub struct KeyTable {
    keys: HashMap<RawKey, KeyCode>,
    modifiers: Vec<(u8, Modifier)>,
    mouse: HashMap<RawKey, MouseButton>,
}

impl Default for KeyTable {
    fn default() -> Self {
        Self {
            keys: DEFAULT_KEYS.iter().copied().collect(),
            modifiers: DEFAULT_MODIFIERS.to_vec(),
            mouse: DEFAULT_MOUSE.iter().copied().collect(),
        }
    }
}

impl KeyTable {
    /// Map (or remap) a raw key code to a named key.
    pub fn with_key(mut self, raw: RawKey, code: KeyCode) -> Self {
        self.keys.insert(raw, code);
        self
    }

    /// Map a raw modifier bit to a normalized modifier, replacing any prior
    /// mapping for that bit.
    pub fn with_modifier(mut self, bit: u8, modifier: Modifier) -> Self {
        self.modifiers.retain(|(b, _)| *b != bit);
        self.modifiers.push((bit, modifier));
        self
    }

    pub fn with_mouse(mut self, raw: RawKey, button: MouseButton) -> Self {
        self.mouse.insert(raw, button);
        self
    }

    /// Translate raw modifier bits. Unmapped bits are ignored.
    pub fn modifier(&self, bits: u8) -> Modifier {
        self.modifiers
            .iter()
            .filter(|(bit, _)| bits & bit != 0)
            .fold(Modifier::empty(), |acc, (_, m)| acc | *m)
    }

    pub fn mouse(&self, raw: RawKey) -> Option<MouseButton> {
        self.mouse.get(&raw).copied()
    }

    /// Translate a raw key report. `None` means the code is unknown.
    pub fn key(&self, raw: RawKey, rune: Option<char>, bits: u8) -> Option<KeyPress> {
        let modifier = self.modifier(bits);

        if raw == key::NONE {
            return Some(match rune {
                Some(c) => KeyPress::rune(c).with_modifier(modifier),
                // NUL with no rune is Ctrl-Space.
                None => KeyPress::rune(' ').with_modifier(modifier | Modifier::CTRL),
            });
        }

        if let Some(code) = self.keys.get(&raw) {
            return Some(KeyPress::code(*code).with_modifier(modifier));
        }

        match raw {
            key::SPACE => Some(KeyPress::rune(' ').with_modifier(modifier)),
            key::CTRL_A..=key::CTRL_Z => {
                let letter = char::from(b'a' + (raw - key::CTRL_A) as u8);
                Some(KeyPress {
                    modifier: modifier | Modifier::CTRL,
                    rune: Some(letter),
                    code: Some(KeyCode::Ctrl(letter)),
                })
            }
            key::CTRL_BACKSLASH..=key::CTRL_UNDERSCORE => {
                let c = ['\\', ']', '^', '_'][(raw - key::CTRL_BACKSLASH) as usize];
                Some(KeyPress::rune(c).with_modifier(modifier | Modifier::CTRL))
            }
            _ => None,
        }
    }
}

/// Outcome of feeding a finished escape sequence to a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Key(KeyPress),
    Unknown,
}

/// `true` if `c` ends a CSI sequence whose body so far is `body`.
///
/// The Linux console sends `ESC [ [ A` for F1, so a `[` right after the
/// introducer is an intermediate, not a final.
pub fn is_csi_final(body: &str, c: char) -> bool {
    if body.is_empty() && c == '[' {
        return false;
    }
    ('@'..='~').contains(&c)
}

/// Decode `ESC [ <body> <fin>`.
pub fn decode_csi(body: &str, fin: char) -> Decoded {
    if let Some(rest) = body.strip_prefix('[') {
        // Linux console F1-F5.
        return match (rest.is_empty(), fin) {
            (true, 'A'..='E') => key_decoded(KeyCode::F(fin as u8 - b'A' + 1), Modifier::empty()),
            _ => Decoded::Unknown,
        };
    }

    let Some(params) = parse_params(body) else {
        return Decoded::Unknown;
    };
    let modifier = match params.get(1) {
        Some(m) => xterm_modifier(*m),
        None => Modifier::empty(),
    };

    let code = match fin {
        'A' => KeyCode::Up,
        'B' => KeyCode::Down,
        'C' => KeyCode::Right,
        'D' => KeyCode::Left,
        'H' => KeyCode::Home,
        'F' => KeyCode::End,
        'P' => KeyCode::F(1),
        'Q' => KeyCode::F(2),
        'R' => KeyCode::F(3),
        'S' => KeyCode::F(4),
        'Z' => KeyCode::BackTab,
        '~' => match params.first().and_then(|n| tilde_code(*n)) {
            Some(code) => code,
            None => return Decoded::Unknown,
        },
        _ => return Decoded::Unknown,
    };
    key_decoded(code, modifier)
}

/// Decode `ESC O <fin>`.
pub fn decode_ss3(fin: char) -> Decoded {
    let code = match fin {
        'A' => KeyCode::Up,
        'B' => KeyCode::Down,
        'C' => KeyCode::Right,
        'D' => KeyCode::Left,
        'H' => KeyCode::Home,
        'F' => KeyCode::End,
        'P' => KeyCode::F(1),
        'Q' => KeyCode::F(2),
        'R' => KeyCode::F(3),
        'S' => KeyCode::F(4),
        _ => return Decoded::Unknown,
    };
    key_decoded(code, Modifier::empty())
}

/// `true` if `ESC [ <body> <c>` opens an X10 mouse report rather than ending
/// a key sequence. Three payload runes follow the `M`.
pub fn is_x10_mouse(body: &str, c: char) -> bool {
    body.is_empty() && c == 'M'
}

/// Decode the payload of `ESC [ M Cb Cx Cy`.
///
/// Every field is offset by 32 and coordinates are 1-based. Returns `None`
/// for a payload that does not fit, which the caller drops.
pub fn decode_x10([cb, cx, cy]: [char; 3]) -> Option<MouseEvent> {
    let field = |c: char| u32::from(c).checked_sub(32);
    let cb = field(cb)?;
    let x = u16::try_from(field(cx)?.checked_sub(1)?).ok()?;
    let y = u16::try_from(field(cy)?.checked_sub(1)?).ok()?;

    let button = match (cb & 64 != 0, cb & 3) {
        (true, 0) => MouseButton::WheelUp,
        (true, 1) => MouseButton::WheelDown,
        (true, _) => return None,
        (false, 0) => MouseButton::Left,
        (false, 1) => MouseButton::Middle,
        (false, 2) => MouseButton::Right,
        (false, _) => MouseButton::Release,
    };
    let mut modifier = Modifier::empty();
    for (bit, flag) in [
        (4, Modifier::SHIFT),
        (8, Modifier::ALT),
        (16, Modifier::CTRL),
        (32, Modifier::MOTION),
    ] {
        if cb & bit != 0 {
            modifier |= flag;
        }
    }
    Some(MouseEvent {
        x,
        y,
        button,
        modifier,
    })
}

fn key_decoded(code: KeyCode, modifier: Modifier) -> Decoded {
    Decoded::Key(KeyPress::code(code).with_modifier(modifier))
}

/// Split `"1;5"` into numbers. An empty body has no parameters; any other
/// character makes the whole body invalid.
fn parse_params(body: &str) -> Option<Vec<u16>> {
    if body.is_empty() {
        return Some(Vec::new());
    }
    body.split(';')
        .map(|p| if p.is_empty() { Some(1) } else { p.parse().ok() })
        .collect()
}

/// The xterm modifier parameter is `1 + bits` with shift=1, alt=2, ctrl=4, meta=8.
fn xterm_modifier(param: u16) -> Modifier {
    let bits = param.saturating_sub(1);
    let mut modifier = Modifier::empty();
    if bits & 1 != 0 {
        modifier |= Modifier::SHIFT;
    }
    if bits & (2 | 8) != 0 {
        modifier |= Modifier::ALT;
    }
    if bits & 4 != 0 {
        modifier |= Modifier::CTRL;
    }
    modifier
}

fn tilde_code(n: u16) -> Option<KeyCode> {
    Some(match n {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11..=15 => KeyCode::F((n - 10) as u8),
        17..=21 => KeyCode::F((n - 11) as u8),
        23 | 24 => KeyCode::F((n - 12) as u8),
        _ => return None,
    })
}
