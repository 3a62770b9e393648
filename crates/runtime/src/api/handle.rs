//! Cloneable façade for issuing commands to the presentation queue.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers helpers for pushing
//! events, querying the session, or streaming events from specific topics.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::GameSession;

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::presentation::PresentationEvent;
use crate::workers::{Command, Intent};

/// Client-facing handle to the presentation queue
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::UnboundedSender<Command>,
    pending: Arc<AtomicUsize>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::UnboundedSender<Command>,
        pending: Arc<AtomicUsize>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            command_tx,
            pending,
            event_bus,
        }
    }

    /// Append one event. It starts right away if the queue is idle.
    pub fn push(&self, event: PresentationEvent) -> Result<()> {
        self.push_many(vec![event])
    }

    /// Append a batch. No other push can land between its events.
    pub fn push_many(&self, events: Vec<PresentationEvent>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let count = events.len();
        self.pending.fetch_add(count, Ordering::SeqCst);
        if self.command_tx.send(Command::Push(events)).is_err() {
            self.pending.fetch_sub(count, Ordering::SeqCst);
            return Err(RuntimeError::QueueClosed);
        }
        Ok(())
    }

    /// Events not yet completed, including the running one.
    pub fn size(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// True while an event runs or is waiting to run.
    pub fn is_draining(&self) -> bool {
        self.size() > 0
    }

    /// Selects or deselects a card in the local hand.
    ///
    /// Returns the selection after the toggle, or
    /// [`RuntimeError::NotInteractive`] outside the local turn or while
    /// events are still playing.
    pub async fn toggle_selection(&self, index: usize) -> Result<Option<usize>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::ToggleSelection {
                index,
                reply: reply_tx,
            })
            .map_err(|_| RuntimeError::QueueClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Validates an outbound intent and freezes interaction until the server
    /// answers. Returns the selected hand index for card plays.
    pub(crate) async fn commit(&self, intent: Intent) -> Result<Option<usize>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Commit {
                intent,
                reply: reply_tx,
            })
            .map_err(|_| RuntimeError::QueueClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Query a snapshot of the game session.
    ///
    /// Answered even while an event is running; the snapshot reflects every
    /// event that has started so far.
    pub async fn query_session(&self) -> Result<GameSession> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::QuerySession { reply: reply_tx })
            .map_err(|_| RuntimeError::QueueClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Model` - Session mutations ([`game_core::ModelChange`])
    /// - `Topic::Queue` - Presentation queue progress
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut model_rx = handle.subscribe(Topic::Model);
    /// while let Ok(event) = model_rx.recv().await {
    ///     // Redraw whatever changed
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Ask the worker to finish queued events and stop.
    pub(crate) fn request_shutdown(&self) {
        // Already gone means already stopped.
        let _ = self.command_tx.send(Command::Shutdown);
    }
}
