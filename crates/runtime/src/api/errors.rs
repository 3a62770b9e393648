//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and session setup so clients can
//! bubble them up with consistent context. Presentation events themselves
//! never fail.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::SessionError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("presentation queue command channel closed")]
    QueueClosed,

    #[error("presentation queue reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("presentation queue worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("outbound action channel closed")]
    OutboundClosed,

    #[error("runtime requires a game session before building")]
    MissingSession,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("interaction is only allowed on the local turn while the queue is idle")]
    NotInteractive,

    #[error("no card is selected")]
    NothingSelected,
}
