//! Visual cues emitted by presentation events.
//!
//! The runtime never draws anything itself. Each event hands one or more
//! [`Cue`]s to the injected [`Presenter`]; for explicitly completed events the
//! queue waits until [`Presenter::play`] returns.
use async_trait::async_trait;

use game_core::{Card, PlayerId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cue {
    Damage { player: PlayerId, amount: u32 },
    Heal { player: PlayerId, amount: u32 },
    /// Dice animation that must settle on `result`.
    DiceRoll { player: PlayerId, result: u8 },
    CardDrawn { player: PlayerId, card: Card },
    CardDiscarded { player: PlayerId, card: Card },
    /// A played card moves to the table. `revealed` is set when an opponent's
    /// face-down card was turned over.
    CardForward {
        player: PlayerId,
        card: Card,
        revealed: bool,
    },
    CardToPile { player: PlayerId, card: Card },
    TurnChanged { player: Option<PlayerId> },
    /// One discard card flies back to the pile during a collect round.
    CollectCard { player: PlayerId, card: Card },
    GameResult { winner: Option<PlayerId> },
    /// Everything may have changed; redraw from the model.
    Refresh,
}

/// Plays cues for the user.
///
/// `play` resolves once the cue has finished. Implementations must not block
/// the executor; cues for fixed-duration events run detached.
#[async_trait]
pub trait Presenter: Send + Sync {
    async fn play(&self, cue: Cue);
}

/// Presenter that finishes every cue immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

#[async_trait]
impl Presenter for NullPresenter {
    async fn play(&self, _cue: Cue) {}
}
