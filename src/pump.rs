//! The producer side: backend → sampler → queue, on its own thread.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::backend::Backend;
use crate::error::{InputError, Result};
use crate::queue::EventSender;
use crate::raw::RawEvent;
use crate::sampler::Sampler;

/// Upper bound on a single backend wait, so the shutdown flag is seen promptly.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shared stop flag for the input loop.
#[derive(Debug, Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Input loop state. Owns the sampler exclusively.
#[derive(Debug)]
pub struct Pump<B> {
    backend: B,
    sampler: Sampler,
    sender: EventSender,
}

impl<B: Backend> Pump<B> {
    pub fn new(backend: B, sampler: Sampler, sender: EventSender) -> Self {
        Self {
            backend,
            sampler,
            sender,
        }
    }

    /// Run until `shutdown` fires, the consumer hangs up, or the backend dies.
    ///
    /// Returns `Ok` for the first two and [`InputError::SourceLost`] for the
    /// last; the consumer sees the same loss on its end of the queue.
    pub fn run(mut self, shutdown: &Shutdown) -> Result<()> {
        tracing::info!("input loop started");
        loop {
            if shutdown.is_triggered() {
                self.sampler.cancel();
                tracing::info!("input loop stopped");
                return Ok(());
            }

            let timeout = self.poll_timeout(Instant::now());
            let raw = match self.backend.poll_raw(timeout) {
                Ok(raw) => raw,
                Err(err) => return self.lose(err.to_string()),
            };

            let now = Instant::now();
            let events = match raw {
                Some(RawEvent::Error(reason)) => return self.lose(reason),
                Some(raw) => self.sampler.sample_at(raw, now),
                None => self.sampler.expire(now),
            };

            if self.sender.push_all(events).is_err() {
                self.sampler.cancel();
                tracing::info!("consumer gone, input loop stopped");
                return Ok(());
            }
        }
    }

    /// Wait no longer than the held ESC window allows.
    fn poll_timeout(&self, now: Instant) -> Duration {
        match self.sampler.deadline() {
            Some(deadline) => deadline.saturating_duration_since(now).min(POLL_INTERVAL),
            None => POLL_INTERVAL,
        }
    }

    fn lose(mut self, reason: String) -> Result<()> {
        tracing::warn!(%reason, "input source lost");
        let held = self.sampler.flush();
        // Keys already typed are still delivered ahead of the loss.
        let _ = self.sender.push_all(held);
        self.sender.lost(reason.clone());
        Err(InputError::lost(reason))
    }
}

/// A running input thread.
#[derive(Debug)]
pub struct PumpHandle {
    shutdown: Shutdown,
    handle: JoinHandle<Result<()>>,
}

/// Start the input loop on a thread named `term-sampler-input`.
pub fn spawn<B>(backend: B, sampler: Sampler, sender: EventSender) -> io::Result<PumpHandle>
where
    B: Backend + 'static,
{
    let shutdown = Shutdown::new();
    let flag = shutdown.clone();
    let handle = thread::Builder::new()
        .name("term-sampler-input".to_string())
        .spawn(move || Pump::new(backend, sampler, sender).run(&flag))?;
    Ok(PumpHandle { shutdown, handle })
}

impl PumpHandle {
    /// Stop the loop and wait for it.
    ///
    /// The loop may be blocked pushing into a full queue; drop or drain the
    /// receiver first.
    pub fn shutdown(self) -> Result<()> {
        self.shutdown.trigger();
        self.join()
    }

    /// Wait for the loop to end on its own.
    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .unwrap_or_else(|_| Err(InputError::lost("input thread panicked")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::event::{Event, KeyCode, KeyPress};
    use crate::queue;

    enum Step {
        Raw(RawEvent),
        Fail(&'static str),
        Stop,
    }

    /// Replays a script, then idles until told to stop.
    struct Scripted {
        steps: VecDeque<Step>,
        shutdown: Shutdown,
    }

    impl Scripted {
        fn new(steps: Vec<Step>, shutdown: &Shutdown) -> Self {
            Self {
                steps: steps.into(),
                shutdown: shutdown.clone(),
            }
        }
    }

    impl Backend for Scripted {
        fn poll_raw(&mut self, timeout: Duration) -> io::Result<Option<RawEvent>> {
            match self.steps.pop_front() {
                Some(Step::Raw(raw)) => Ok(Some(raw)),
                Some(Step::Fail(msg)) => Err(io::Error::other(msg)),
                Some(Step::Stop) => {
                    self.shutdown.trigger();
                    Ok(None)
                }
                None => {
                    thread::sleep(timeout.min(Duration::from_millis(5)));
                    Ok(None)
                }
            }
        }
    }

    #[test]
    fn delivers_in_order_and_expires_escape() {
        let (tx, mut rx) = queue::bounded(8);
        let shutdown = Shutdown::new();
        let backend = Scripted::new(
            vec![
                Step::Raw(RawEvent::rune('a')),
                Step::Raw(RawEvent::resize(10, 10)),
                Step::Raw(RawEvent::esc()),
            ],
            &shutdown,
        );
        let handle = spawn(backend, Sampler::new(), tx).unwrap();

        assert_eq!(rx.recv(), Ok(Event::Key(KeyPress::rune('a'))));
        assert_eq!(rx.recv(), Ok(Event::Resize));
        assert_eq!(rx.recv(), Ok(Event::Key(KeyPress::code(KeyCode::Escape))));

        handle.shutdown().unwrap();
        assert_eq!(rx.recv(), Err(InputError::Closed));
    }

    #[test]
    fn spawned_loop_reports_loss_on_join() {
        let (tx, mut rx) = queue::bounded(8);
        let shutdown = Shutdown::new();
        let backend = Scripted::new(
            vec![Step::Raw(RawEvent::rune('a')), Step::Fail("hangup")],
            &shutdown,
        );
        let handle = spawn(backend, Sampler::new(), tx).unwrap();

        assert_eq!(handle.join(), Err(InputError::lost("hangup")));
        assert_eq!(rx.recv(), Ok(Event::Key(KeyPress::rune('a'))));
        assert_eq!(rx.recv(), Err(InputError::lost("hangup")));
    }

    #[test]
    fn backend_failure_flushes_then_reports_loss() {
        let (tx, mut rx) = queue::bounded(8);
        let shutdown = Shutdown::new();
        let backend = Scripted::new(
            vec![Step::Raw(RawEvent::esc()), Step::Fail("tty closed")],
            &shutdown,
        );

        let result = Pump::new(backend, Sampler::new(), tx).run(&shutdown);

        assert_eq!(result, Err(InputError::lost("tty closed")));
        assert_eq!(rx.recv(), Ok(Event::Key(KeyPress::code(KeyCode::Escape))));
        assert!(rx.recv().unwrap_err().is_source_lost());
    }

    #[test]
    fn in_band_error_is_source_lost() {
        let (tx, mut rx) = queue::bounded(8);
        let shutdown = Shutdown::new();
        let backend = Scripted::new(vec![Step::Raw(RawEvent::Error("eof".into()))], &shutdown);

        let result = Pump::new(backend, Sampler::new(), tx).run(&shutdown);

        assert!(result.unwrap_err().is_source_lost());
        assert_eq!(rx.recv(), Err(InputError::lost("eof")));
    }

    #[test]
    fn shutdown_discards_held_escape() {
        let (tx, mut rx) = queue::bounded(8);
        let shutdown = Shutdown::new();
        let backend = Scripted::new(vec![Step::Raw(RawEvent::esc()), Step::Stop], &shutdown);

        let result = Pump::new(backend, Sampler::new(), tx).run(&shutdown);

        assert_eq!(result, Ok(()));
        assert_eq!(rx.recv(), Err(InputError::Closed));
    }

    #[test]
    fn stops_when_consumer_hangs_up() {
        let (tx, rx) = queue::bounded(8);
        drop(rx);
        let shutdown = Shutdown::new();
        let backend = Scripted::new(vec![Step::Raw(RawEvent::rune('z'))], &shutdown);

        assert_eq!(Pump::new(backend, Sampler::new(), tx).run(&shutdown), Ok(()));
    }

    #[test]
    fn poll_timeout_tracks_escape_deadline() {
        let (tx, _rx) = queue::bounded(1);
        let shutdown = Shutdown::new();
        let mut pump = Pump::new(Scripted::new(vec![], &shutdown), Sampler::new(), tx);
        let now = Instant::now();
        assert_eq!(pump.poll_timeout(now), POLL_INTERVAL);

        assert!(pump.sampler.sample_at(RawEvent::esc(), now).is_empty());
        assert_eq!(pump.poll_timeout(now), crate::sampler::ESCAPE_WINDOW);
    }
}
