//! Terminal input event sampler.
//!
//! Turns raw, backend-specific terminal events into one stable stream of
//! normalized [`Event`]s:
//!
//! ```text
//! Backend ──RawEvent──▶ Sampler ──Event──▶ queue ──▶ consumer loop
//!    └──────────── input thread ───────────┘
//! ```
//!
//! The [`Sampler`] can also be driven directly, one raw event at a time:
//!
//! ```
//! use term_sampler::{Event, KeyPress, RawEvent, Sampler};
//!
//! let mut sampler = Sampler::new();
//! assert_eq!(sampler.sample(RawEvent::resize(80, 24)), vec![Event::Resize]);
//! assert_eq!(
//!     sampler.sample(RawEvent::rune('a')),
//!     vec![Event::Key(KeyPress::rune('a'))]
//! );
//! ```

pub mod backend;
pub mod error;
pub mod event;
pub mod keymap;
pub mod pump;
pub mod queue;
pub mod raw;
pub mod sampler;

pub use backend::{Backend, CrosstermBackend};
pub use error::{InputError, Result};
pub use event::{Event, EventType, KeyCode, KeyPress, Modifier, MouseButton, MouseEvent};
pub use keymap::KeyTable;
pub use pump::{Pump, PumpHandle, Shutdown};
pub use queue::{EventReceiver, EventSender};
pub use raw::RawEvent;
pub use sampler::{Sampler, ESCAPE_WINDOW};
