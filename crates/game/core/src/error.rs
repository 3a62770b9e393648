//! Errors raised while building a [`GameSession`](crate::GameSession).
//!
//! Presentation events never fail: unresolvable references degrade to no-ops.
//! The only hard failures in this crate are roster problems detected when the
//! session is created from the server's session info.

use crate::state::PlayerId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("duplicate player id {0} in session info")]
    DuplicatePlayer(PlayerId),

    #[error("local player {0} is not part of the session roster")]
    MissingLocalPlayer(PlayerId),

    #[error("session needs at least one opponent")]
    NotEnoughOpponents,
}
