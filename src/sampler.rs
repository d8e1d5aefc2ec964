//! Raw event → normalized event state machine.
//!
//! Most raw events translate one-to-one. The exception is a bare ESC: it may
//! be the Escape key, an Alt prefix for the next key, or the start of a
//! `ESC [ …` / `ESC O …` sequence from a terminal that does not decode cursor
//! and function keys itself. The sampler holds the ESC for [`ESCAPE_WINDOW`]
//! and decides once the next event arrives or the window elapses.
//!
//! Only [`Sampler::sample`] reads the clock. Everything else takes the
//! instant from the caller ([`Sampler::sample_at`], [`Sampler::expire`]), and
//! the input loop sizes its backend wait from [`Sampler::deadline`].

use std::mem;
use std::time::{Duration, Instant};

use crate::event::{Event, KeyCode, KeyPress, MouseEvent};
use crate::keymap::{self, Decoded, KeyTable};
use crate::raw::{RawEvent, RawKey};

/// How long a bare ESC waits for a continuation.
pub const ESCAPE_WINDOW: Duration = Duration::from_millis(25);

/// Sequence bodies longer than this many characters are abandoned.
const MAX_SEQUENCE: usize = 16;

/// Payload runes after `ESC [ M`.
const X10_PAYLOAD: usize = 3;

/// Decoding state carried between raw events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Pending {
    #[default]
    Idle,
    /// A bare ESC was seen at `at`.
    Escape { at: Instant },
    /// `ESC <intro> <body>` seen so far, last part received at `at`.
    Sequence {
        at: Instant,
        intro: char,
        body: String,
    },
    /// `ESC [ M` plus part of its payload.
    Mouse { at: Instant, payload: Vec<char> },
}

impl Pending {
    fn since(&self) -> Option<Instant> {
        match self {
            Pending::Idle => None,
            Pending::Escape { at } | Pending::Sequence { at, .. } | Pending::Mouse { at, .. } => {
                Some(*at)
            }
        }
    }
}

/// Stateful translator from [`RawEvent`]s to [`Event`]s.
///
/// Feed it raw events in arrival order from a single caller. Output order
/// always matches input order.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    table: KeyTable,
    pending: Pending,
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sampler using a backend-specific translation table.
    pub fn with_table(table: KeyTable) -> Self {
        Self {
            table,
            pending: Pending::Idle,
        }
    }

    /// Translate one raw event, using the current time for the ESC window.
    pub fn sample(&mut self, raw: RawEvent) -> Vec<Event> {
        self.sample_at(raw, Instant::now())
    }

    /// Translate one raw event observed at `now`.
    ///
    /// Returns zero events while an ESC is held, one for most input, and
    /// several when held state is resolved or a paste is split into keys.
    pub fn sample_at(&mut self, raw: RawEvent, now: Instant) -> Vec<Event> {
        tracing::trace!(?raw, "raw event");

        // A continuation that shows up after the window belongs on its own.
        let mut out = self.expire(now);

        match raw {
            RawEvent::Resize { .. } => {
                out.extend(self.flush());
                out.push(Event::Resize);
            }
            RawEvent::Key {
                key,
                rune,
                modifiers,
            } => match self.table.key(key, rune, modifiers) {
                Some(press) => self.key(press, now, &mut out),
                None => {
                    tracing::debug!(key, "unknown raw key code");
                    out.extend(self.flush());
                    out.push(Event::None);
                }
            },
            RawEvent::Mouse {
                x,
                y,
                button,
                modifiers,
            } => {
                out.extend(self.flush());
                if let Some(mouse) = self.mouse(x, y, button, modifiers) {
                    out.push(Event::Mouse(mouse));
                }
            }
            RawEvent::Paste(text) => {
                out.extend(self.flush());
                out.extend(split_paste(&text));
            }
            RawEvent::Unknown => {
                out.extend(self.flush());
                out.push(Event::None);
            }
            RawEvent::Error(reason) => {
                // The input loop reports the loss; keys typed before it still count.
                tracing::debug!(%reason, "backend error reached sampler");
                out.extend(self.flush());
            }
        }
        out
    }

    /// When the held ESC window elapses, if anything is held.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.since().map(|at| at + ESCAPE_WINDOW)
    }

    pub fn is_pending(&self) -> bool {
        self.pending != Pending::Idle
    }

    /// Resolve held state if its window has elapsed by `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<Event> {
        match self.deadline() {
            Some(deadline) if deadline <= now => {
                tracing::debug!("escape window elapsed");
                self.flush()
            }
            _ => Vec::new(),
        }
    }

    /// Resolve held state now, with the best interpretation available.
    ///
    /// A bare ESC becomes the Escape key. A truncated sequence becomes Alt
    /// plus its first rune, followed by the remaining runes as plain keys. A
    /// partial mouse report is dropped.
    pub fn flush(&mut self) -> Vec<Event> {
        match mem::take(&mut self.pending) {
            Pending::Idle => Vec::new(),
            Pending::Escape { .. } => vec![Event::Key(KeyPress::code(KeyCode::Escape))],
            Pending::Sequence { intro, body, .. } => {
                tracing::debug!(%intro, %body, "truncated escape sequence");
                std::iter::once(KeyPress::rune(intro).with_alt())
                    .chain(body.chars().map(KeyPress::rune))
                    .map(Event::Key)
                    .collect()
            }
            Pending::Mouse { payload, .. } => {
                tracing::debug!(?payload, "truncated mouse report dropped");
                Vec::new()
            }
        }
    }

    /// Drop held state without emitting anything.
    pub fn cancel(&mut self) {
        if self.is_pending() {
            tracing::debug!("discarding held escape state");
        }
        self.pending = Pending::Idle;
    }

    fn key(&mut self, press: KeyPress, now: Instant, out: &mut Vec<Event>) {
        match mem::take(&mut self.pending) {
            Pending::Idle => {
                if is_bare_escape(&press) {
                    self.pending = Pending::Escape { at: now };
                } else {
                    out.push(Event::Key(press));
                }
            }
            Pending::Escape { .. } => {
                if is_bare_escape(&press) {
                    out.push(Event::Key(press));
                    self.pending = Pending::Escape { at: now };
                } else if let Some(intro @ ('[' | 'O')) = plain_rune(&press) {
                    self.pending = Pending::Sequence {
                        at: now,
                        intro,
                        body: String::new(),
                    };
                } else {
                    tracing::debug!(%press, "escape combined as alt");
                    out.push(Event::Key(press.with_alt()));
                }
            }
            Pending::Sequence { at, intro, body } => match plain_rune(&press) {
                Some(c) => out.extend(self.continue_sequence(intro, body, c, now)),
                None => {
                    // Not part of a sequence: resolve what we have, then start over.
                    self.pending = Pending::Sequence { at, intro, body };
                    out.extend(self.flush());
                    self.key(press, now, out);
                }
            },
            Pending::Mouse { at, mut payload } => match plain_rune(&press) {
                Some(c) => {
                    payload.push(c);
                    if payload.len() < X10_PAYLOAD {
                        self.pending = Pending::Mouse { at: now, payload };
                    } else if let Some(mouse) = x10_payload(&payload).and_then(keymap::decode_x10)
                    {
                        out.push(Event::Mouse(mouse));
                    } else {
                        tracing::debug!(?payload, "malformed mouse report dropped");
                    }
                }
                None => {
                    self.pending = Pending::Mouse { at, payload };
                    out.extend(self.flush());
                    self.key(press, now, out);
                }
            },
        }
    }

    fn continue_sequence(
        &mut self,
        intro: char,
        mut body: String,
        c: char,
        now: Instant,
    ) -> Option<Event> {
        let decoded = match intro {
            'O' => keymap::decode_ss3(c),
            _ if keymap::is_x10_mouse(&body, c) => {
                self.pending = Pending::Mouse {
                    at: now,
                    payload: Vec::with_capacity(X10_PAYLOAD),
                };
                return None;
            }
            _ if keymap::is_csi_final(&body, c) => keymap::decode_csi(&body, c),
            _ if body.chars().count() >= MAX_SEQUENCE => {
                tracing::debug!(%body, "escape sequence too long, abandoned");
                return Some(Event::None);
            }
            _ => {
                body.push(c);
                self.pending = Pending::Sequence { at: now, intro, body };
                return None;
            }
        };

        match decoded {
            Decoded::Key(press) => Some(Event::Key(press)),
            Decoded::Unknown => {
                tracing::debug!(%intro, %body, fin = %c, "unrecognized escape sequence");
                Some(Event::None)
            }
        }
    }

    fn mouse(&self, x: u16, y: u16, button: RawKey, modifiers: u8) -> Option<MouseEvent> {
        let Some(button) = self.table.mouse(button) else {
            tracing::warn!(x, y, button, "dropping unsupported mouse report");
            return None;
        };
        Some(MouseEvent {
            x,
            y,
            button,
            modifier: self.table.modifier(modifiers),
        })
    }
}

fn is_bare_escape(press: &KeyPress) -> bool {
    press.code == Some(KeyCode::Escape) && press.modifier.is_empty()
}

/// The rune of an unmodified character key.
fn plain_rune(press: &KeyPress) -> Option<char> {
    match (press.rune, press.code) {
        (Some(c), None) if press.modifier.is_empty() => Some(c),
        _ => None,
    }
}

fn x10_payload(payload: &[char]) -> Option<[char; X10_PAYLOAD]> {
    payload.try_into().ok()
}

/// One key press per pasted character. Control characters never come out
/// as runes: the ones with a key of their own map to it, the rest to `None`.
fn split_paste(text: &str) -> Vec<Event> {
    if text.is_empty() {
        return vec![Event::None];
    }
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let press = match c {
            '\r' => {
                // CRLF is one line break.
                let _ = chars.next_if_eq(&'\n');
                KeyPress::code(KeyCode::Enter)
            }
            '\n' => KeyPress::code(KeyCode::Enter),
            '\t' => KeyPress::code(KeyCode::Tab),
            '\x1b' => KeyPress::code(KeyCode::Escape),
            '\x08' | '\x7f' => KeyPress::code(KeyCode::Backspace),
            c if c.is_ascii_control() => {
                out.push(Event::None);
                continue;
            }
            c => KeyPress::rune(c),
        };
        out.push(Event::Key(press));
    }
    out
}
