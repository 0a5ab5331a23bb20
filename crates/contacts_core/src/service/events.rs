//! Change notifications for presentation layers.
//!
//! Subscribers receive plain `ChangeEvent` values over a channel and decide
//! for themselves how to refresh.

use crate::model::contact::ContactId;
use std::sync::mpsc::{channel, Receiver, Sender};

/// One successful mutation of the contact set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Inserted(ContactId),
    Updated(ContactId),
    Deleted(ContactId),
    Cleared { removed: usize },
    Imported { inserted: usize },
}

/// Fan-out of change events to every live subscriber.
#[derive(Debug, Default)]
pub struct ChangeFeed {
    subscribers: Vec<Sender<ChangeEvent>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Sends `event` to all subscribers, dropping those whose receiver is gone.
    pub fn publish(&mut self, event: ChangeEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
