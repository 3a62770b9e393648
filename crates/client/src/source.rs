//! Inbound frame sources: a live WebSocket or a recorded session.
//!
//! Both end up as a channel of text frames so the app loop does not care
//! where they come from.
use std::path::Path;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::config::FrameSourceConfig;

/// Text frames in, and for live sessions text frames out.
pub struct Connection {
    pub inbound: mpsc::UnboundedReceiver<String>,
    /// `None` when replaying; actions are only logged then.
    pub outbound: Option<mpsc::UnboundedSender<String>>,
}

pub async fn open(source: &FrameSourceConfig) -> Result<Connection> {
    match source {
        FrameSourceConfig::Server { url } => connect(url).await,
        FrameSourceConfig::Replay { path } => replay_file(path).await,
        FrameSourceConfig::Stdin => Ok(replay(tokio::io::stdin(), "stdin")),
    }
}

async fn connect(url: &str) -> Result<Connection> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .with_context(|| format!("failed to connect to {url}"))?;
    info!(url, "Connected to game server");

    let (mut sink, mut stream) = ws_stream.split();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if let Err(error) = sink.send(Message::Text(text)).await {
                warn!(%error, "Failed to send frame, closing writer");
                break;
            }
        }
        if let Err(error) = sink.close().await {
            debug!(%error, "WebSocket close failed");
        }
    });

    tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if inbound_tx.send(text).is_err() {
                        break;
                    }
                }
                Ok(Message::Close(frame)) => {
                    info!(?frame, "Server closed the connection");
                    break;
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(%error, "WebSocket read failed");
                    break;
                }
            }
        }
    });

    Ok(Connection {
        inbound: inbound_rx,
        outbound: Some(outbound_tx),
    })
}

async fn replay_file(path: &Path) -> Result<Connection> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("failed to open replay file {}", path.display()))?;
    Ok(replay(file, "file"))
}

/// Reads one frame per non-empty line.
fn replay<R>(reader: R, origin: &'static str) -> Connection
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        let mut count = 0usize;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    count += 1;
                    if inbound_tx.send(line.to_owned()).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    warn!(%error, origin, "Replay read failed");
                    break;
                }
            }
        }
        debug!(origin, frames = count, "Replay exhausted");
    });

    Connection {
        inbound: inbound_rx,
        outbound: None,
    }
}
