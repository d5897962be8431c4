//! Live stream of committed ledger events.
//!
//! Subscribers receive every event committed after they subscribed, in log
//! order. The stream ends when the publishing side is dropped.

use crate::ledger::events::EventRecord;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Stream of committed events for one subscriber.
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<EventRecord>,
}

impl EventStream {
    /// Create a stream and its publishing half.
    pub fn new() -> (Self, EventPublisher) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { receiver }, EventPublisher { sender })
    }
}

impl Stream for EventStream {
    type Item = EventRecord;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Publishing half of an [`EventStream`].
#[derive(Debug)]
pub struct EventPublisher {
    sender: mpsc::UnboundedSender<EventRecord>,
}

impl EventPublisher {
    /// Push a record; returns `false` once the subscriber has gone away.
    pub fn publish(&self, record: EventRecord) -> bool {
        self.sender.send(record).is_ok()
    }

    /// Whether the subscriber dropped its stream.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
