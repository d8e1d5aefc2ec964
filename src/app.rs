use std::collections::VecDeque;
use std::time::Instant;

use term_sampler::{Event, EventType, KeyCode, KeyPress};

/// One received event, as shown in the log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// 1-based position in the stream, counting ignored events too.
    pub seq: u64,
    pub event: Event,
    pub at: Instant,
}

/// Central application state — owned exclusively by the main thread.
pub struct App {
    /// Whether the app should exit on the next loop iteration.
    pub should_quit: bool,
    /// Most recent events, oldest first.
    pub log: VecDeque<LogEntry>,
    /// Maximum number of entries kept in `log`.
    pub history: usize,
    /// Events received so far, including cleared and ignored ones.
    pub received: u64,
    /// `Event::None` placeholders received and ignored.
    pub ignored: u64,
    pub started_at: Instant,
}

impl App {
    pub fn new(history: usize) -> Self {
        Self {
            should_quit: false,
            log: VecDeque::with_capacity(history.min(1024)),
            history: history.max(1),
            received: 0,
            ignored: 0,
            started_at: Instant::now(),
        }
    }

    /// Apply one normalized event.
    pub fn handle(&mut self, event: Event) {
        self.received += 1;

        match event {
            Event::None => {
                self.ignored += 1;
                return;
            }
            Event::Key(key) if is_quit(&key) => self.should_quit = true,
            Event::Key(key) if key.is_rune('c') => {
                self.log.clear();
                return;
            }
            Event::Key(_) | Event::Mouse(_) | Event::Resize => {}
        }

        self.log.push_back(LogEntry {
            seq: self.received,
            event,
            at: Instant::now(),
        });
        while self.log.len() > self.history {
            self.log.pop_front();
        }
    }

    /// Logged entries of one type.
    pub fn count(&self, kind: EventType) -> usize {
        self.log.iter().filter(|e| e.event.kind() == kind).count()
    }
}

/// Ctrl-C or a plain `q`.
fn is_quit(key: &KeyPress) -> bool {
    key.code == Some(KeyCode::Ctrl('c')) || key.is_rune('q')
}
