//! Backend adapters: the only code that knows which terminal library is in use.
//!
//! An adapter turns whatever its library reports into [`RawEvent`]s and
//! nothing more. Raw mode, resize signals and UTF-8 decoding stay on the
//! library's side of the line.

use std::io;
use std::time::Duration;

use crossterm::event::{
    self as ct_event, KeyCode as CtKeyCode, KeyEvent as CtKeyEvent, KeyEventKind, KeyModifiers,
    MouseButton as CtMouseButton, MouseEvent as CtMouseEvent, MouseEventKind,
};

use crate::raw::{key, modifier, RawEvent, RawKey};

/// A source of raw terminal events.
pub trait Backend: Send {
    /// Wait up to `timeout` for the next raw event.
    ///
    /// `Ok(None)` means nothing arrived in time. An `Err` means the source is
    /// gone for good.
    fn poll_raw(&mut self, timeout: Duration) -> io::Result<Option<RawEvent>>;
}

/// Adapter over crossterm's global event reader.
///
/// The terminal must already be in raw mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermBackend;

impl Backend for CrosstermBackend {
    fn poll_raw(&mut self, timeout: Duration) -> io::Result<Option<RawEvent>> {
        if !ct_event::poll(timeout)? {
            return Ok(None);
        }
        Ok(translate(ct_event::read()?))
    }
}

/// Map one crossterm event to its raw shape. Key releases, which crossterm
/// reports on enhanced keyboards, are skipped.
pub fn translate(event: ct_event::Event) -> Option<RawEvent> {
    match event {
        ct_event::Event::Key(key) => translate_key(key),
        ct_event::Event::Mouse(mouse) => Some(translate_mouse(mouse)),
        ct_event::Event::Resize(width, height) => Some(RawEvent::resize(width, height)),
        ct_event::Event::Paste(text) => Some(RawEvent::Paste(text)),
        ct_event::Event::FocusGained | ct_event::Event::FocusLost => Some(RawEvent::Unknown),
    }
}

fn translate_key(event: CtKeyEvent) -> Option<RawEvent> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    let mods = modifier_bits(event.modifiers);
    let named = |key: RawKey| RawEvent::Key {
        key,
        rune: None,
        modifiers: mods,
    };

    let raw = match event.code {
        CtKeyCode::Char(c) => return Some(translate_char(c, event.modifiers)),
        CtKeyCode::Null => named(key::NONE),
        CtKeyCode::Esc => named(key::ESC),
        CtKeyCode::Enter => named(key::ENTER),
        CtKeyCode::Tab => named(key::TAB),
        CtKeyCode::BackTab => RawEvent::Key {
            key: key::BACK_TAB,
            rune: None,
            // BackTab already implies shift.
            modifiers: mods & !modifier::SHIFT,
        },
        CtKeyCode::Backspace => named(key::BACKSPACE2),
        CtKeyCode::Insert => named(key::INSERT),
        CtKeyCode::Delete => named(key::DELETE),
        CtKeyCode::Home => named(key::HOME),
        CtKeyCode::End => named(key::END),
        CtKeyCode::PageUp => named(key::PGUP),
        CtKeyCode::PageDown => named(key::PGDN),
        CtKeyCode::Up => named(key::ARROW_UP),
        CtKeyCode::Down => named(key::ARROW_DOWN),
        CtKeyCode::Left => named(key::ARROW_LEFT),
        CtKeyCode::Right => named(key::ARROW_RIGHT),
        CtKeyCode::F(n @ 1..=12) => named(key::F1 - RawKey::from(n - 1)),
        _ => RawEvent::Unknown,
    };
    Some(raw)
}

/// Characters follow the termbox convention: control chords arrive as their
/// control code with the CTRL bit folded in, and shift is already in the rune.
fn translate_char(c: char, modifiers: KeyModifiers) -> RawEvent {
    let mut mods = modifier_bits(modifiers) & !modifier::SHIFT;

    if modifiers.contains(KeyModifiers::CONTROL) {
        let control = match c.to_ascii_lowercase() {
            l @ 'a'..='z' => Some(key::CTRL_A + (l as RawKey - 'a' as RawKey)),
            ' ' | '@' | '2' => Some(key::NONE),
            '\\' | '4' => Some(key::CTRL_BACKSLASH),
            ']' | '5' => Some(key::CTRL_BACKSLASH + 1),
            '^' | '6' => Some(key::CTRL_BACKSLASH + 2),
            '_' | '7' => Some(key::CTRL_UNDERSCORE),
            _ => None,
        };
        if let Some(code) = control {
            mods &= !modifier::CTRL;
            return RawEvent::Key {
                key: code,
                rune: None,
                modifiers: mods,
            };
        }
    }

    RawEvent::Key {
        key: key::NONE,
        rune: Some(c),
        modifiers: mods,
    }
}

fn translate_mouse(event: CtMouseEvent) -> RawEvent {
    let mut mods = modifier_bits(event.modifiers);
    let button = match event.kind {
        MouseEventKind::Down(button) => mouse_button(button),
        MouseEventKind::Drag(button) => {
            mods |= modifier::MOTION;
            mouse_button(button)
        }
        MouseEventKind::Up(_) => key::MOUSE_RELEASE,
        MouseEventKind::ScrollUp => key::MOUSE_WHEEL_UP,
        MouseEventKind::ScrollDown => key::MOUSE_WHEEL_DOWN,
        // No raw code; the sampler drops these.
        MouseEventKind::Moved | MouseEventKind::ScrollLeft | MouseEventKind::ScrollRight => {
            key::NONE
        }
    };
    RawEvent::Mouse {
        x: event.column,
        y: event.row,
        button,
        modifiers: mods,
    }
}

fn mouse_button(button: CtMouseButton) -> RawKey {
    match button {
        CtMouseButton::Left => key::MOUSE_LEFT,
        CtMouseButton::Middle => key::MOUSE_MIDDLE,
        CtMouseButton::Right => key::MOUSE_RIGHT,
    }
}

fn modifier_bits(modifiers: KeyModifiers) -> u8 {
    [
        (KeyModifiers::ALT, modifier::ALT),
        (KeyModifiers::META, modifier::ALT),
        (KeyModifiers::CONTROL, modifier::CTRL),
        (KeyModifiers::SHIFT, modifier::SHIFT),
    ]
    .into_iter()
    .filter(|(flag, _)| modifiers.contains(*flag))
    .fold(0, |bits, (_, bit)| bits | bit)
}
