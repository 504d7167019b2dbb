//! Event broadcaster for alias-change notifications.
//!
//! The `EventBroadcaster` is the event bus that the resolver publishes to
//! and external listeners subscribe to. It uses tokio's broadcast channel
//! for multi-producer, multi-consumer messaging.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::types::AliasEvent;

/// Default buffer size for the broadcast channel.
/// Events beyond this limit will cause older events to be dropped for slow receivers.
const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Broadcaster for alias-change events.
///
/// Thread-safe; can be cloned and shared across the application. Multiple
/// subscribers receive events from a single sender.
///
/// # Example
///
/// ```
/// use pathalias_core::{AliasEvent, AliasRecord, EventBroadcaster, Language};
///
/// let broadcaster = EventBroadcaster::new();
/// let mut receiver = broadcaster.subscribe();
///
/// let record = AliasRecord::new("user/42", "alice", Language::neutral()).with_id(1);
/// broadcaster.send(AliasEvent::inserted(record));
///
/// // Receive in another task
/// // let event = receiver.recv().await.unwrap();
/// ```
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<AliasEvent>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with default buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    /// Create a new broadcaster with custom buffer size.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new broadcaster wrapped in an Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Send an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns 0 if there are no active subscribers.
    pub fn send(&self, event: AliasEvent) -> usize {
        self.sender.send(event).unwrap_or_default()
    }

    /// Subscribe to events.
    ///
    /// Returns a receiver that will receive all events broadcast after
    /// subscription. Events sent before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<AliasEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers.
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBroadcaster")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
