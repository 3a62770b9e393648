//! Headless card game client.
//!
//! Connects to a game server (or replays a recorded session), mirrors the
//! game through the presentation runtime, and narrates every visible event
//! to the log.
//!
//! ```bash
//! # Live game
//! GAME_SERVER_URL=ws://localhost:8080/ws cargo run -p randomi-client
//! # then type commands: select 0 | play 2 3 | draw | chat gl hf
//!
//! # Replay, one JSON message per line
//! REPLAY_FILE=session.jsonl cargo run -p randomi-client
//! ```
mod app;
mod config;
mod input;
mod logging;
mod presenter;
mod source;

use std::sync::Arc;

use anyhow::Result;
use game_content::{CardLoader, ConfigLoader};
use game_core::GameConfig;

use app::App;
use config::{ClientConfig, FrameSourceConfig};
use presenter::LogPresenter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    let _log_guard = logging::setup_logging(config.log_dir.as_deref())?;

    tracing::info!("Starting client");
    tracing::info!(source = ?config.source, "Frame source");

    let catalog = Arc::new(CardLoader::load(&config.card_catalog)?);
    tracing::info!(cards = catalog.len(), "Card catalog loaded");

    let game_config = match &config.game_config {
        Some(path) => ConfigLoader::load(path)?,
        None => GameConfig::default(),
    };

    let connection = source::open(&config.source).await?;
    // Stdin carries frames when replaying from it, so input is live-only.
    let commands = match &config.source {
        FrameSourceConfig::Server { .. } => input::spawn_stdin(),
        _ => input::none(),
    };
    let app = App::new(catalog, game_config, config.timings);

    match app.run(connection, commands, LogPresenter::default()).await? {
        Some(session) => tracing::info!(phase = ?session.phase(), "Client finished"),
        None => tracing::info!("Client finished without a session"),
    }

    Ok(())
}
