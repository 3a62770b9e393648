//! Event types for different topics.

use std::time::Duration;

use crate::presentation::EventKind;

/// Lifecycle of entries in the presentation queue.
///
/// `seq` increases by one for every event pushed and is shared by the
/// `Started`/`Completed` pair of the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEvent {
    /// The event was dequeued and has just run.
    Started { seq: u64, kind: EventKind },

    /// The event's completion fired; the next one may start.
    Completed {
        seq: u64,
        kind: EventKind,
        /// Time between start and completion.
        elapsed: Duration,
    },
}

impl QueueEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Started { kind, .. } | Self::Completed { kind, .. } => *kind,
        }
    }
}
