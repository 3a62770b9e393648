//! Topic-based event bus implementation.

use tokio::sync::broadcast;

use game_core::ModelChange;

use super::types::QueueEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    /// Mutations of the game session
    Model,
    /// Presentation queue progress
    Queue,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Model(ModelChange),
    Queue(QueueEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Model(_) => Topic::Model,
            Event::Queue(_) => Topic::Queue,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Topics are fixed, so each one owns its sender
/// outright and publishing never contends on a lock.
#[derive(Clone)]
pub struct EventBus {
    model: broadcast::Sender<Event>,
    queue: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            model: broadcast::channel(capacity).0,
            queue: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Model => &self.model,
            Topic::Queue => &self.queue,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
