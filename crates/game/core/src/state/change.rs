use super::buff::Buff;
use super::common::{CardId, PlayerId};

/// A single mutation of the [`GameSession`](super::GameSession).
///
/// Changes are recorded in the order they happen and drained by the runtime
/// after each presentation step.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "change", rename_all = "snake_case"))]
pub enum ModelChange {
    HealthChanged { player: PlayerId, health: u32 },
    HandChanged { player: PlayerId, count: usize },
    DiscardChanged { player: PlayerId, count: usize },
    BuffsChanged { player: PlayerId, buffs: Vec<Buff> },
    PileChanged { count: u32 },
    TurnChanged {
        player: Option<PlayerId>,
        turn_end: Option<i64>,
    },
    SelectionChanged { selected: Option<usize> },
    CardRevealed { owner: PlayerId, card: CardId },
    GameEnded { winner: Option<PlayerId> },
}
