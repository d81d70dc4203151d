//! Broadcast channel for domain events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The negotiation
//! engine publishes a [`SwapEvent`] after every successful transition;
//! subscribers (the persistence event log, notification deliverers) consume
//! them independently. The engine never waits on a subscriber.

use tokio::sync::broadcast;

use super::SwapEvent;

/// Broadcast bus for [`SwapEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// When the ring buffer is full, the oldest events are dropped for lagging
/// receivers — the stores remain the source of truth, so a lagging
/// subscriber can always re-read current state.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SwapEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: SwapEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SwapEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
