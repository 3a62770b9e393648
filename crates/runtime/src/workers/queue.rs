//! Queue worker that owns the [`game_core::GameSession`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), plays
//! presentation events strictly one at a time, and publishes model changes
//! and queue progress to the EventBus.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info};

use game_core::GameSession;

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, QueueEvent};
use crate::presentation::{
    Completion, EventKind, PresentationEvent, Presenter, RunContext, Step, Timings,
};

/// Outbound intents that must freeze interaction before they are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    PlaySelected,
    DrawCard,
}

/// Commands that can be sent to the queue worker
pub enum Command {
    /// Append events; a batch is never interleaved with other pushes.
    Push(Vec<PresentationEvent>),
    /// Query the current session (read-only snapshot).
    QuerySession { reply: oneshot::Sender<GameSession> },
    /// Toggle selection of a local hand card.
    ToggleSelection {
        index: usize,
        reply: oneshot::Sender<Result<Option<usize>>>,
    },
    /// Check an intent is allowed and enqueue `ChangeTurn(None)`.
    Commit {
        intent: Intent,
        reply: oneshot::Sender<Result<Option<usize>>>,
    },
    /// Refuse further commands, finish what is queued, then stop.
    Shutdown,
}

struct Running {
    seq: u64,
    kind: EventKind,
    started_at: Instant,
    completion: Completion,
    /// Follow-up of a multi-step event, run under the same `seq`.
    resume: Option<PresentationEvent>,
}

/// Background task that plays presentation events.
///
/// The worker is the only writer of the session. While an event's
/// completion is pending it keeps serving commands, so pushes and queries
/// never wait on animations.
pub struct QueueWorker {
    session: GameSession,
    presenter: Arc<dyn Presenter>,
    timings: Timings,
    command_rx: mpsc::UnboundedReceiver<Command>,
    pending_count: Arc<AtomicUsize>,
    event_bus: EventBus,
    pending: VecDeque<PresentationEvent>,
    running: Option<Running>,
    next_seq: u64,
    /// Set once the command channel is closed and empty.
    closing: bool,
}

impl QueueWorker {
    /// Creates a new queue worker.
    pub fn new(
        session: GameSession,
        presenter: Arc<dyn Presenter>,
        timings: Timings,
        command_rx: mpsc::UnboundedReceiver<Command>,
        pending_count: Arc<AtomicUsize>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            target: "runtime::queue",
            local = %session.local_id(),
            participants = session.participants().len(),
            "QueueWorker initialized"
        );

        Self {
            session,
            presenter,
            timings,
            command_rx,
            pending_count,
            event_bus,
            pending: VecDeque::new(),
            running: None,
            next_seq: 0,
            closing: false,
        }
    }

    /// Main worker loop.
    ///
    /// Returns the final session once every queued event has completed and
    /// no more commands can arrive.
    pub async fn run(mut self) -> GameSession {
        loop {
            self.start_next();

            if self.closing && self.running.is_none() {
                break;
            }

            tokio::select! {
                biased;

                cmd = self.command_rx.recv(), if !self.closing => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => self.closing = true,
                },
                () = wait_running(&mut self.running), if self.running.is_some() => {
                    self.finish_running();
                }
            }
        }

        debug!(target: "runtime::queue", "QueueWorker stopped");
        self.session
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Push(events) => {
                self.pending.extend(events);
            }
            Command::QuerySession { reply } => {
                if reply.send(self.session.clone()).is_err() {
                    debug!("QuerySession reply channel closed (caller dropped)");
                }
            }
            Command::ToggleSelection { index, reply } => {
                let result = self.ensure_interactive().map(|()| {
                    let selected = self.session.toggle_selection(index);
                    self.flush_changes();
                    selected
                });
                if reply.send(result).is_err() {
                    debug!("ToggleSelection reply channel closed (caller dropped)");
                }
            }
            Command::Commit { intent, reply } => {
                let result = self.handle_commit(intent);
                if reply.send(result).is_err() {
                    debug!("Commit reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => {
                // Later sends fail with `QueueClosed`; commands already
                // buffered are still received and handled.
                debug!(target: "runtime::queue", "Shutdown requested, closing command channel");
                self.command_rx.close();
            }
        }
    }

    /// Interaction needs the local turn and nothing left to play.
    fn ensure_interactive(&self) -> Result<()> {
        let idle = self.pending_count.load(Ordering::SeqCst) == 0;
        if self.session.is_local_turn() && idle {
            Ok(())
        } else {
            Err(RuntimeError::NotInteractive)
        }
    }

    fn handle_commit(&mut self, intent: Intent) -> Result<Option<usize>> {
        self.ensure_interactive()?;

        let selected = match intent {
            Intent::PlaySelected => Some(
                self.session
                    .selected()
                    .ok_or(RuntimeError::NothingSelected)?,
            ),
            Intent::DrawCard => None,
        };

        debug!(
            target: "runtime::queue",
            ?intent,
            ?selected,
            "Freezing interaction until the server answers"
        );
        self.pending_count.fetch_add(1, Ordering::SeqCst);
        self.pending.push_back(PresentationEvent::ChangeTurn {
            player: None,
            turn_end: None,
        });
        Ok(selected)
    }

    /// Dequeues and runs the next event if nothing is running.
    fn start_next(&mut self) {
        if self.running.is_some() {
            return;
        }
        let Some(event) = self.pending.pop_front() else {
            return;
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        let kind = event.kind();

        debug!(target: "runtime::queue", seq, %kind, queued = self.pending.len(), "Event started");
        self.event_bus
            .publish(Event::Queue(QueueEvent::Started { seq, kind }));

        let started_at = Instant::now();
        self.run_event(seq, kind, started_at, event);
    }

    fn run_event(&mut self, seq: u64, kind: EventKind, started_at: Instant, event: PresentationEvent) {
        let mut ctx = RunContext {
            session: &mut self.session,
            presenter: &self.presenter,
            timings: &self.timings,
        };
        let (completion, resume) = match event.run(&mut ctx) {
            Step::Done(completion) => (completion, None),
            Step::Continue(completion, next) => (completion, Some(next)),
        };
        self.flush_changes();

        self.running = Some(Running {
            seq,
            kind,
            started_at,
            completion,
            resume,
        });
    }

    fn finish_running(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        if let Some(next) = running.resume {
            self.run_event(running.seq, running.kind, running.started_at, next);
            return;
        }

        let elapsed = running.started_at.elapsed();
        debug!(
            target: "runtime::queue",
            seq = running.seq,
            kind = %running.kind,
            elapsed_ms = elapsed.as_millis() as u64,
            "Event completed"
        );
        self.pending_count.fetch_sub(1, Ordering::SeqCst);
        self.event_bus.publish(Event::Queue(QueueEvent::Completed {
            seq: running.seq,
            kind: running.kind,
            elapsed,
        }));
    }

    fn flush_changes(&mut self) {
        for change in self.session.take_changes() {
            self.event_bus.publish(Event::Model(change));
        }
    }
}

async fn wait_running(running: &mut Option<Running>) {
    match running {
        Some(running) => (&mut running.completion).await,
        None => std::future::pending().await,
    }
}
