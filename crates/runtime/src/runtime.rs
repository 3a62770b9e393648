//! High-level runtime orchestrator.
//!
//! The runtime owns the queue worker, wires up command/event channels, and
//! exposes a builder-based API for clients to feed server messages in and
//! get player actions out.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use game_core::{CardCatalog, GameConfig, GameSession, PlayerId, SessionInfo};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::presentation::{NullPresenter, Presenter, Timings};
use crate::protocol::{ClientAction, ServerMessage};
use crate::translator::Translator;
use crate::workers::{Command, Intent, QueueWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Used when the session is built from [`SessionInfo`].
    pub game_config: GameConfig,
    pub timings: Timings,
    pub event_buffer_size: usize,
}

impl RuntimeConfig {
    pub fn new(game_config: GameConfig, timings: Timings) -> Self {
        Self {
            game_config,
            timings,
            ..Self::default()
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            timings: Timings::default(),
            event_buffer_size: 100,
        }
    }
}

/// Main runtime that turns server messages into paced presentation
///
/// Design: Runtime owns the worker and the translator.
/// [`RuntimeHandle`] provides a cloneable façade for observers.
pub struct Runtime {
    handle: RuntimeHandle,
    translator: Translator,
    outbound_tx: mpsc::UnboundedSender<ClientAction>,
    worker_handle: JoinHandle<GameSession>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// True once `GameEnd` has been received.
    pub fn is_finished(&self) -> bool {
        self.translator.is_finished()
    }

    /// Decodes one text frame and queues its events.
    ///
    /// Malformed frames are logged and dropped. Returns how many events were
    /// queued.
    pub fn handle_text(&mut self, text: &str) -> Result<usize> {
        match ServerMessage::decode(text) {
            Ok(message) => self.handle_message(message),
            Err(error) => {
                warn!(target: "runtime", error = %error, frame = text, "Dropping malformed server message");
                Ok(0)
            }
        }
    }

    /// Translates one server message and queues its events as one batch.
    pub fn handle_message(&mut self, message: ServerMessage) -> Result<usize> {
        let kind = message.kind();
        let events = self.translator.translate(message);
        let count = events.len();
        self.handle.push_many(events)?;

        debug!(target: "runtime", kind, events = count, "Server message queued");
        Ok(count)
    }

    /// Selects or deselects a card in the local hand.
    pub async fn toggle_selection(&self, index: usize) -> Result<Option<usize>> {
        self.handle.toggle_selection(index).await
    }

    /// Plays the selected card on `targets`.
    ///
    /// Interaction is frozen with `ChangeTurn(None)` before the action goes
    /// out, so nothing can be clicked until the server answers.
    pub async fn play_selected(&self, targets: Vec<PlayerId>) -> Result<()> {
        let card_index = self
            .handle
            .commit(Intent::PlaySelected)
            .await?
            .ok_or(RuntimeError::NothingSelected)?;

        self.send(ClientAction::PlayCard {
            card_index,
            targets,
        })
    }

    /// Asks the server for a card, freezing interaction first.
    pub async fn draw_card(&self) -> Result<()> {
        self.handle.commit(Intent::DrawCard).await?;
        self.send(ClientAction::DrawCard {})
    }

    pub fn send_chat(&self, message: impl Into<String>) -> Result<()> {
        self.send(ClientAction::SendChatMessage {
            message: message.into(),
        })
    }

    fn send(&self, action: ClientAction) -> Result<()> {
        self.outbound_tx
            .send(action)
            .map_err(|_| RuntimeError::OutboundClosed)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Already queued events still play to completion. Returns the final
    /// session.
    pub async fn shutdown(self) -> Result<GameSession> {
        self.handle.request_shutdown();
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    session: Option<GameSession>,
    session_info: Option<(SessionInfo, Arc<CardCatalog>)>,
    presenter: Option<Arc<dyn Presenter>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            session: None,
            session_info: None,
            presenter: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide a ready-made session
    pub fn session(mut self, session: GameSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the session from the server's roster when the runtime is built
    pub fn session_info(mut self, info: SessionInfo, catalog: Arc<CardCatalog>) -> Self {
        self.session_info = Some((info, catalog));
        self
    }

    /// Set the presenter that plays cues (optional, defaults to [`NullPresenter`])
    pub fn presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Some(Arc::new(presenter));
        self
    }

    /// Build the runtime and spawn its worker
    ///
    /// Returns the runtime together with the receiver of outbound actions.
    pub async fn build(self) -> Result<(Runtime, mpsc::UnboundedReceiver<ClientAction>)> {
        let session = match (self.session, self.session_info) {
            (Some(session), _) => session,
            (None, Some((info, catalog))) => {
                GameSession::new(&info, catalog, self.config.game_config.clone())?
            }
            (None, None) => return Err(RuntimeError::MissingSession),
        };

        let (command_tx, command_rx) = mpsc::unbounded_channel::<Command>();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<ClientAction>();
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size.max(1));
        let pending = Arc::new(AtomicUsize::new(0));

        let handle = RuntimeHandle::new(command_tx, Arc::clone(&pending), event_bus.clone());
        let presenter = self
            .presenter
            .unwrap_or_else(|| Arc::new(NullPresenter));

        let worker = QueueWorker::new(
            session,
            presenter,
            self.config.timings,
            command_rx,
            pending,
            event_bus,
        );
        let worker_handle = tokio::spawn(worker.run());

        let runtime = Runtime {
            handle,
            translator: Translator::new(),
            outbound_tx,
            worker_handle,
        };
        Ok((runtime, outbound_rx))
    }
}
