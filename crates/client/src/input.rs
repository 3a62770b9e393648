//! Line-based player input for live sessions.
//!
//! Each stdin line maps to one [`PlayerCommand`]; the app hands it to the
//! runtime, which decides whether the player may act right now.
use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use game_core::PlayerId;

/// High-level outcome of one input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Toggle selection of a hand card.
    Select(usize),
    /// Play the selected card on the listed players.
    Play(Vec<PlayerId>),
    Draw,
    Chat(String),
}

impl PlayerCommand {
    /// Parses `select <index>`, `play <id>...`, `draw` or `chat <text>`.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match verb {
            "select" => {
                let index = rest
                    .parse()
                    .with_context(|| format!("invalid hand index {rest:?}"))?;
                Ok(Self::Select(index))
            }
            "play" => {
                let targets = rest
                    .split_whitespace()
                    .map(|id| {
                        id.parse()
                            .map(PlayerId)
                            .with_context(|| format!("invalid player id {id:?}"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Play(targets))
            }
            "draw" => Ok(Self::Draw),
            "chat" if !rest.is_empty() => Ok(Self::Chat(rest.to_owned())),
            "chat" => bail!("chat needs a message"),
            other => bail!("unknown command {other:?}"),
        }
    }
}

/// Reads commands from stdin until it closes. Unparseable lines are logged
/// and skipped.
pub fn spawn_stdin() -> mpsc::UnboundedReceiver<PlayerCommand> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match PlayerCommand::parse(&line) {
                Ok(command) => {
                    if command_tx.send(command).is_err() {
                        break;
                    }
                }
                Err(error) => warn!(%error, "Ignoring input line"),
            }
        }
    });

    command_rx
}

/// A receiver that is already closed, for sessions without player input.
pub fn none() -> mpsc::UnboundedReceiver<PlayerCommand> {
    mpsc::unbounded_channel().1
}
