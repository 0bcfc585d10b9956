//! Broadcast-based emitter for builder domain events.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::debug;

use builder_core::events::{BuilderEvent, DomainEvent};

/// Default broadcast channel capacity.
const DEFAULT_CAPACITY: usize = 256;

/// Global event emitter shared by every service of one builder.
///
/// `emit` never blocks; slow subscribers lag instead of holding up the
/// build.
#[derive(Debug)]
pub struct EventEmitter {
    tx: broadcast::Sender<DomainEvent>,
    emit_count: AtomicU64,
}

impl EventEmitter {
    /// Creates an emitter with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an emitter with a custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            emit_count: AtomicU64::new(0),
        }
    }

    /// Emits an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it.
    pub fn emit(&self, event: BuilderEvent) -> usize {
        self.emit_count.fetch_add(1, Ordering::Relaxed);
        let name = event.name();
        let delivered = self.tx.send(DomainEvent::new(event)).unwrap_or(0);
        debug!(event = name, subscribers = delivered, "Event emitted");
        delivered
    }

    /// Subscribes to events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Returns the total number of events emitted.
    pub fn emit_count(&self) -> u64 {
        self.emit_count.load(Ordering::Relaxed)
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers() {
        let emitter = EventEmitter::new();
        assert_eq!(emitter.emit(BuilderEvent::CompileDone { code: 0 }), 0);
        assert_eq!(emitter.emit_count(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let emitter = EventEmitter::new();
        let mut first = emitter.subscribe();
        let mut second = emitter.subscribe();
        assert_eq!(emitter.subscriber_count(), 2);

        assert_eq!(emitter.emit(BuilderEvent::CompileDone { code: 1 }), 2);

        let a = first.recv().await.unwrap();
        let b = second.recv().await.unwrap();
        assert_eq!(a.payload, BuilderEvent::CompileDone { code: 1 });
        assert_eq!(a.id, b.id);
    }
}
