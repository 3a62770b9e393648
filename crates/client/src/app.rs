//! Drives one game session from a frame source to the end of the game.
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use game_core::{CardCatalog, GameConfig, GameSession, SessionInfo};
use runtime::{ClientAction, Event, Presenter, Runtime, RuntimeConfig, ServerMessage, Timings, Topic};

use crate::input::PlayerCommand;
use crate::source::Connection;

pub struct App {
    catalog: Arc<CardCatalog>,
    config: RuntimeConfig,
}

impl App {
    pub fn new(catalog: Arc<CardCatalog>, game_config: GameConfig, timings: Timings) -> Self {
        Self {
            catalog,
            config: RuntimeConfig::new(game_config, timings),
        }
    }

    /// Plays the session carried by `connection`.
    ///
    /// Player commands are applied between frames until `commands` closes.
    /// Returns the final session, or `None` if the stream ended before the
    /// server sent `SessionInfo`.
    pub async fn run(
        self,
        connection: Connection,
        mut commands: mpsc::UnboundedReceiver<PlayerCommand>,
        presenter: impl Presenter + 'static,
    ) -> Result<Option<GameSession>> {
        let Connection {
            mut inbound,
            outbound,
        } = connection;

        let Some(info) = wait_for_session(&mut inbound).await else {
            warn!("Frame stream ended before the session started");
            return Ok(None);
        };
        info!(
            session = %info.id,
            players = info.players.len(),
            "Session started"
        );

        let (mut runtime, outbound_rx) = Runtime::builder()
            .config(self.config)
            .session_info(info, self.catalog)
            .presenter(presenter)
            .build()
            .await?;

        let forwarder = spawn_forwarder(outbound_rx, outbound);
        let model_log = spawn_model_log(runtime.subscribe(Topic::Model));

        let mut input_open = true;
        loop {
            tokio::select! {
                biased;

                command = commands.recv(), if input_open => match command {
                    Some(command) => apply(&runtime, command).await,
                    None => {
                        debug!("Player input closed");
                        input_open = false;
                    }
                },

                text = inbound.recv() => {
                    let Some(text) = text else { break };
                    runtime.handle_text(&text)?;
                    if runtime.is_finished() {
                        debug!("GameEnd received, draining the queue");
                        break;
                    }
                }
            }
        }

        let session = runtime.shutdown().await?;
        info!(phase = ?session.phase(), "Session finished");

        if let Err(error) = forwarder.await {
            warn!(%error, "Outbound forwarder failed");
        }
        if let Err(error) = model_log.await {
            warn!(%error, "Model logger failed");
        }

        Ok(Some(session))
    }
}

/// Rejected commands are reported and the session goes on.
async fn apply(runtime: &Runtime, command: PlayerCommand) {
    let result = match &command {
        PlayerCommand::Select(index) => runtime.toggle_selection(*index).await.map(|selected| {
            debug!(?selected, "Selection toggled");
        }),
        PlayerCommand::Play(targets) => runtime.play_selected(targets.clone()).await,
        PlayerCommand::Draw => runtime.draw_card().await,
        PlayerCommand::Chat(message) => runtime.send_chat(message.as_str()),
    };

    if let Err(error) = result {
        warn!(%error, ?command, "Command rejected");
    }
}

/// Drops everything until the roster arrives.
async fn wait_for_session(inbound: &mut mpsc::UnboundedReceiver<String>) -> Option<SessionInfo> {
    while let Some(text) = inbound.recv().await {
        match ServerMessage::decode(&text) {
            Ok(ServerMessage::SessionInfo(info)) => return Some(info),
            Ok(message) => {
                warn!(kind = message.kind(), "Dropping message received before SessionInfo");
            }
            Err(error) => {
                warn!(%error, frame = %text, "Dropping malformed frame before SessionInfo");
            }
        }
    }
    None
}

fn spawn_forwarder(
    mut actions: mpsc::UnboundedReceiver<ClientAction>,
    outbound: Option<mpsc::UnboundedSender<String>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(action) = actions.recv().await {
            let text = match action.encode() {
                Ok(text) => text,
                Err(error) => {
                    warn!(%error, ?action, "Dropping unencodable action");
                    continue;
                }
            };

            match &outbound {
                Some(tx) => {
                    if tx.send(text).is_err() {
                        warn!("Connection closed, dropping outbound actions");
                        break;
                    }
                }
                None => info!(frame = %text, "Replay mode, action not sent"),
            }
        }
    })
}

fn spawn_model_log(mut rx: broadcast::Receiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(Event::Model(change)) => info!(target: "randomi::model", ?change, "Model changed"),
                Ok(Event::Queue(_)) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Model log lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use game_core::{
        CardDefinition, Element, Kind, PlayerId, PlayerProfile, SessionPhase, Stars,
    };
    use runtime::NullPresenter;

    use crate::input;

    use super::*;

    fn catalog() -> Arc<CardCatalog> {
        let definitions = (0..4)
            .map(|i| CardDefinition {
                name: format!("Card {i}"),
                element: Element::Fire,
                kind: Kind::Spell,
                stars: Stars::One,
                desc: String::new(),
                attack: 2,
                heal: 0,
                draw: 0,
                targets: None,
            })
            .collect();
        Arc::new(CardCatalog::new(definitions))
    }

    fn session_info_frame() -> String {
        let info = SessionInfo {
            id: PlayerId(1),
            players: vec![
                PlayerProfile {
                    id: PlayerId(1),
                    name: "Ada".into(),
                },
                PlayerProfile {
                    id: PlayerId(2),
                    name: "Bo".into(),
                },
            ],
        };
        serde_json::to_string(&ServerMessage::SessionInfo(info)).unwrap()
    }

    fn connection(frames: &[&str]) -> (Connection, mpsc::UnboundedReceiver<String>) {
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        for frame in frames {
            inbound_tx.send((*frame).to_owned()).unwrap();
        }
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        (
            Connection {
                inbound,
                outbound: Some(outbound),
            },
            outbound_rx,
        )
    }

    fn app() -> App {
        App::new(catalog(), GameConfig::default(), Timings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn plays_until_game_end() {
        let info = session_info_frame();
        let (connection, _outbound) = connection(&[
            r#"{"type":"DrawCard","player_id":1,"card_id":0}"#,
            &info,
            r#"{"type":"DrawCard","player_id":1,"card_id":2}"#,
            "not json",
            r#"{"type":"GameEnd","winner_id":1}"#,
            r#"{"type":"DrawCard","player_id":1,"card_id":3}"#,
        ]);

        let session = app()
            .run(connection, input::none(), NullPresenter)
            .await
            .unwrap()
            .expect("session should start");

        assert_eq!(
            session.phase(),
            SessionPhase::Ended {
                winner: Some(PlayerId(1))
            }
        );
        let hand: Vec<_> = session.local().hand.iter().map(|card| card.id).collect();
        assert_eq!(hand, vec![game_core::CardId(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn stream_without_session_info_ends_quietly() {
        let (connection, _outbound) =
            connection(&[r#"{"type":"Message","message":"hello"}"#]);

        let result = app().run(connection, input::none(), NullPresenter).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn player_commands_reach_the_server() {
        let info = session_info_frame();
        let (commands_tx, commands) = mpsc::unbounded_channel();
        commands_tx.send(PlayerCommand::Chat("hi".into())).unwrap();
        commands_tx.send(PlayerCommand::Play(vec![PlayerId(2)])).unwrap();
        drop(commands_tx);
        let (connection, mut outbound) =
            connection(&[info.as_str(), r#"{"type":"GameEnd","winner_id":2}"#]);

        let session = app()
            .run(connection, commands, NullPresenter)
            .await
            .unwrap()
            .expect("session should start");

        assert_eq!(
            outbound.recv().await.unwrap(),
            r#"{"type":"SendChatMessage","message":"hi"}"#
        );
        // Nothing was selected, so the play is rejected locally.
        assert!(outbound.recv().await.is_none());
        assert_eq!(
            session.phase(),
            SessionPhase::Ended {
                winner: Some(PlayerId(2))
            }
        );
    }
}
