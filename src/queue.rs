//! Ordered hand-off between the input thread and the consumer loop.
//!
//! A bounded `mpsc::sync_channel`: when the consumer falls behind, `push`
//! blocks the producer instead of dropping keys. The end of the stream is
//! explicit, so the consumer can tell a lost backend from a normal shutdown.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::time::Duration;

use crate::error::{InputError, Result};
use crate::event::Event;

/// Queue capacity used by the binary unless overridden.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug)]
enum Delivery {
    Event(Event),
    /// Last message after a backend failure.
    Lost(String),
}

/// Create a bounded queue. A capacity of zero is treated as one.
pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    (
        EventSender { tx },
        EventReceiver {
            rx,
            finished: None,
        },
    )
}

/// Producer half. Owned by the input thread.
#[derive(Debug)]
pub struct EventSender {
    tx: SyncSender<Delivery>,
}

impl EventSender {
    /// Enqueue one event, blocking while the queue is full.
    ///
    /// Fails with [`InputError::Closed`] once the receiver is gone.
    pub fn push(&self, event: Event) -> Result<()> {
        self.tx
            .send(Delivery::Event(event))
            .map_err(|_| InputError::Closed)
    }

    /// Enqueue every event in order.
    pub fn push_all(&self, events: impl IntoIterator<Item = Event>) -> Result<()> {
        events.into_iter().try_for_each(|event| self.push(event))
    }

    /// Report that the input source died. Nothing can be pushed afterwards.
    pub fn lost(self, reason: impl Into<String>) {
        // A consumer that already hung up doesn't need to know.
        let _ = self.tx.send(Delivery::Lost(reason.into()));
    }
}

/// Consumer half. Owned by the application loop.
#[derive(Debug)]
pub struct EventReceiver {
    rx: Receiver<Delivery>,
    /// Sticky end-of-stream reason, returned on every call after the end.
    finished: Option<InputError>,
}

impl EventReceiver {
    /// Block until the next event or the end of the stream.
    pub fn recv(&mut self) -> Result<Event> {
        if let Some(err) = &self.finished {
            return Err(err.clone());
        }
        match self.rx.recv() {
            Ok(delivery) => self.open(delivery),
            Err(_) => self.finish(InputError::Closed),
        }
    }

    /// Like [`recv`](Self::recv), but gives up after `timeout` with `Ok(None)`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if let Some(err) = &self.finished {
            return Err(err.clone());
        }
        match self.rx.recv_timeout(timeout) {
            Ok(delivery) => self.open(delivery).map(Some),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => self.finish(InputError::Closed),
        }
    }

    /// Take an event if one is ready, without blocking.
    pub fn try_recv(&mut self) -> Result<Option<Event>> {
        if let Some(err) = &self.finished {
            return Err(err.clone());
        }
        match self.rx.try_recv() {
            Ok(delivery) => self.open(delivery).map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => self.finish(InputError::Closed),
        }
    }

    /// Every event that is ready right now, in order. Stops at the end of
    /// the stream; the reason stays available from the next `recv`.
    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        std::iter::from_fn(move || self.try_recv().ok().flatten())
    }

    fn open(&mut self, delivery: Delivery) -> Result<Event> {
        match delivery {
            Delivery::Event(event) => Ok(event),
            Delivery::Lost(reason) => self.finish(InputError::lost(reason)),
        }
    }

    fn finish<T>(&mut self, err: InputError) -> Result<T> {
        self.finished = Some(err.clone());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::event::KeyPress;

    #[test]
    fn preserves_push_order() {
        let (tx, mut rx) = bounded(4);
        let keys = ['a', 'b', 'c'].map(|c| Event::Key(KeyPress::rune(c)));
        tx.push_all(keys).unwrap();
        drop(tx);

        assert_eq!(rx.drain().collect::<Vec<_>>(), keys.to_vec());
        assert_eq!(rx.recv(), Err(InputError::Closed));
    }

    #[test]
    fn full_queue_applies_backpressure_without_dropping() {
        let (tx, mut rx) = bounded(1);
        let producer = thread::spawn(move || {
            for i in 0..100u32 {
                let c = char::from_digit(i % 10, 10).unwrap();
                tx.push(Event::Key(KeyPress::rune(c))).unwrap();
            }
        });

        let mut received = Vec::new();
        while let Ok(event) = rx.recv() {
            received.push(event);
        }
        producer.join().unwrap();

        assert_eq!(received.len(), 100);
        assert_eq!(received[13], Event::Key(KeyPress::rune('3')));
    }

    #[test]
    fn lost_source_is_distinct_from_close() {
        let (tx, mut rx) = bounded(4);
        tx.push(Event::Resize).unwrap();
        tx.lost("read failed");

        assert_eq!(rx.recv(), Ok(Event::Resize));
        let err = rx.recv().unwrap_err();
        assert!(err.is_source_lost());
        // Sticky.
        assert_eq!(rx.try_recv().unwrap_err(), err);
    }

    #[test]
    fn push_fails_after_receiver_drops() {
        let (tx, rx) = bounded(4);
        drop(rx);
        assert_eq!(tx.push(Event::Resize), Err(InputError::Closed));
    }

    #[test]
    fn recv_timeout_returns_none_when_idle() {
        let (_tx, mut rx) = bounded(4);
        assert_eq!(rx.recv_timeout(Duration::from_millis(5)), Ok(None));
    }

    #[test]
    fn zero_capacity_still_delivers() {
        let (tx, mut rx) = bounded(0);
        tx.push(Event::None).unwrap();
        assert_eq!(rx.try_recv(), Ok(Some(Event::None)));
    }
}
