//! Event injection capability for activities and child machines.
//!
//! The interpreter owns a mailbox; activities and child interpreters hold
//! [`EventSender`] handles onto it. Injected events are buffered and
//! delivered with ordinary run-to-completion ordering the next time the
//! owning interpreter processes (`send`, `advance`, or `pump`). Once the
//! mailbox is closed by `stop`, or the interpreter is dropped, every send
//! through a handle becomes a no-op.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::trace;

use crate::core::event::Event;

#[derive(Debug, Default)]
struct Inner {
    queue: VecDeque<Event>,
    closed: bool,
}

/// Buffered inbox owned by one interpreter.
#[derive(Debug, Default)]
pub(crate) struct Mailbox {
    inner: Arc<Mutex<Inner>>,
}

impl Mailbox {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hand out a sender handle onto this mailbox.
    pub(crate) fn sender(&self) -> EventSender {
        EventSender {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Take every buffered event, oldest first.
    pub(crate) fn drain(&self) -> Vec<Event> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.queue.drain(..).collect()
    }

    /// Close the mailbox. Subsequent sends are dropped and anything still
    /// buffered is discarded.
    pub(crate) fn close(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.closed = true;
        inner.queue.clear();
    }
}

/// Capability to inject events into an interpreter's queue.
///
/// Cloneable and cheap. Sends after the owning interpreter stopped (or was
/// dropped) are silently discarded, so late callbacks from external
/// resources can never resurrect a stopped machine.
#[derive(Clone, Debug)]
pub struct EventSender {
    inner: Weak<Mutex<Inner>>,
}

impl EventSender {
    /// Enqueue an event for the owning interpreter.
    pub fn send(&self, event: impl Into<Event>) {
        let event = event.into();
        let Some(inner) = self.inner.upgrade() else {
            trace!(kind = event.kind(), "send to dropped interpreter discarded");
            return;
        };
        let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.closed {
            trace!(kind = event.kind(), "send to stopped interpreter discarded");
            return;
        }
        inner.queue.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sent_events_drain_in_order() {
        let mailbox = Mailbox::new();
        let sender = mailbox.sender();

        sender.send("FIRST");
        sender.send("SECOND");

        let drained = mailbox.drain();
        assert_eq!(drained, vec![Event::new("FIRST"), Event::new("SECOND")]);
        assert!(mailbox.drain().is_empty());
    }

    #[test]
    fn close_discards_buffered_and_future_events() {
        let mailbox = Mailbox::new();
        let sender = mailbox.sender();

        sender.send("BUFFERED");
        mailbox.close();
        sender.send("LATE");

        assert!(mailbox.drain().is_empty());
    }

    #[test]
    fn send_after_drop_is_a_noop() {
        let mailbox = Mailbox::new();
        let sender = mailbox.sender();
        drop(mailbox);

        sender.send("LATE");
    }

    #[test]
    fn senders_are_cloneable() {
        let mailbox = Mailbox::new();
        let sender = mailbox.sender();
        let clone = sender.clone();

        sender.send("A");
        clone.send("B");

        assert_eq!(mailbox.drain().len(), 2);
    }
}
