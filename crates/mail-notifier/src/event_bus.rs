//! Lightweight event channel for observers and tests.
//!
//! The notifier emits best-effort events that a consumer may watch; a slow or
//! absent consumer never blocks the notifier — emission uses `try_send` and
//! overflow simply drops the event.

use tokio::sync::mpsc::{self, Sender};

/// Maximum buffered events before emission starts dropping.
const MAX_EVENTS: usize = 100;

/// Notifications emitted by the notifier service.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    /// A record was accepted into the buffer.
    Logged,

    /// A non-empty buffer snapshot was handed off for delivery.
    Flushed {
        /// Number of entries in the flushed snapshot.
        count: usize,
    },

    /// The mail-sending collaborator reported a failure; the batch was
    /// dropped after its single delivery attempt.
    DeliveryFailed,
}

/// Receiving side of the event channel.
pub struct EventBus {
    /// Receiver polled by the observer.
    pub rx: mpsc::Receiver<Event>,
}

impl EventBus {
    /// Creates the channel, returning the bus and the producer handle.
    #[must_use]
    pub fn run() -> (EventBus, Sender<Event>) {
        let (tx, rx) = mpsc::channel(MAX_EVENTS);
        (EventBus { rx }, tx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (mut bus, tx) = EventBus::run();

        tx.try_send(Event::Logged).unwrap();
        tx.try_send(Event::Flushed { count: 2 }).unwrap();

        assert_eq!(bus.rx.recv().await, Some(Event::Logged));
        assert_eq!(bus.rx.recv().await, Some(Event::Flushed { count: 2 }));
    }

    #[tokio::test]
    async fn test_overflow_drops_instead_of_blocking() {
        let (_bus, tx) = EventBus::run();

        // Fill the channel past capacity; try_send reports the overflow
        // without blocking the producer.
        for _ in 0..MAX_EVENTS {
            tx.try_send(Event::Logged).unwrap();
        }
        assert!(tx.try_send(Event::Logged).is_err());
    }
}
