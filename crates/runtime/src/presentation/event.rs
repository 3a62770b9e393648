use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use strum::EnumDiscriminants;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use game_core::{Buff, CardId, FlightId, GameSession, PlayerId};

use super::completion::Completion;
use super::cue::{Cue, Presenter};
use crate::protocol::GameStatus;

/// Minimum on-screen time of fixed-duration events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timings {
    /// Default for damage, heal, draw, discard and card-forward events.
    pub event: Duration,
    /// A played card settling onto the pile.
    pub discard: Duration,
    pub turn_change: Duration,
    /// Pause between two rounds of collecting discard cards.
    pub collect_round_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            event: Duration::from_millis(250),
            discard: Duration::from_millis(600),
            turn_change: Duration::from_millis(100),
            collect_round_delay: Duration::from_millis(150),
        }
    }
}

/// How an event decides it is finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DurationPolicy {
    /// Completes after the given time.
    Fixed(Duration),
    /// Completes as soon as it has run.
    Immediate,
    /// Completes when its own animation or loop says so.
    Explicit,
}

/// One visible step of the game, queued and played strictly in order.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(EventKind), derive(strum::Display, Hash))]
pub enum PresentationEvent {
    DamagePlayer {
        target: PlayerId,
        amount: u32,
    },
    HealPlayer {
        target: PlayerId,
        amount: u32,
    },
    /// `result` is the face the dice must land on, 1 through 6.
    ThrowDice {
        player: PlayerId,
        result: u8,
    },
    DrawCard {
        player: PlayerId,
        card: CardId,
    },
    DiscardCard {
        player: PlayerId,
        hand_index: usize,
    },
    /// Moves a played card out of its owner's hand into `flight`.
    PutCardForward {
        owner: PlayerId,
        hand_index: usize,
        card: CardId,
        flight: FlightId,
    },
    /// Lands the card parked in `flight`.
    PutCardInPile {
        owner: PlayerId,
        flight: FlightId,
    },
    /// `player: None` means nobody may act until the server answers.
    ChangeTurn {
        player: Option<PlayerId>,
        turn_end: Option<i64>,
    },
    PlayerBuffsUpdate {
        player: PlayerId,
        buffs: Vec<Buff>,
    },
    GameUpdate(Box<GameStatus>),
    /// Returns every discard card to the pile, one card per participant per
    /// round, then sets the pile to `expected`.
    CollectDiscardCards {
        expected: u32,
        round: u32,
    },
    GameEnd {
        winner: Option<PlayerId>,
    },
}

/// What the worker should wait on after running an event.
pub(crate) enum Step {
    Done(Completion),
    /// Wait, then run the follow-up as part of the same queue entry.
    Continue(Completion, PresentationEvent),
}

pub(crate) struct RunContext<'a> {
    pub session: &'a mut GameSession,
    pub presenter: &'a Arc<dyn Presenter>,
    pub timings: &'a Timings,
}

impl PresentationEvent {
    pub fn kind(&self) -> EventKind {
        self.into()
    }

    pub fn duration_policy(&self, timings: &Timings) -> DurationPolicy {
        match self {
            Self::DamagePlayer { .. }
            | Self::HealPlayer { .. }
            | Self::DrawCard { .. }
            | Self::DiscardCard { .. }
            | Self::PutCardForward { .. } => DurationPolicy::Fixed(timings.event),
            Self::PutCardInPile { .. } => DurationPolicy::Fixed(timings.discard),
            Self::ChangeTurn { .. } => DurationPolicy::Fixed(timings.turn_change),
            Self::PlayerBuffsUpdate { .. } | Self::GameUpdate(_) => DurationPolicy::Immediate,
            Self::ThrowDice { .. } | Self::CollectDiscardCards { .. } | Self::GameEnd { .. } => {
                DurationPolicy::Explicit
            }
        }
    }

    /// Applies the event to the session and starts its cues.
    ///
    /// Never fails: references that cannot be resolved are logged and skipped.
    pub(crate) fn run(self, ctx: &mut RunContext<'_>) -> Step {
        let policy = self.duration_policy(ctx.timings);
        let mut cues = Vec::new();

        match self {
            Self::DamagePlayer { target, amount } => match ctx.session.damage(target, amount) {
                Some(_) => cues.push(Cue::Damage {
                    player: target,
                    amount,
                }),
                None => unknown_player("DamagePlayer", target),
            },
            Self::HealPlayer { target, amount } => match ctx.session.heal(target, amount) {
                Some(_) => cues.push(Cue::Heal {
                    player: target,
                    amount,
                }),
                None => unknown_player("HealPlayer", target),
            },
            Self::ThrowDice { player, result } => {
                if !ctx.session.contains(player) {
                    unknown_player("ThrowDice", player);
                    return Step::Done(Completion::ready());
                }
                return Step::Done(ctx.play_signalled(Cue::DiceRoll { player, result }));
            }
            Self::DrawCard { player, card } => match ctx.session.draw(player, card) {
                Some(card) => cues.push(Cue::CardDrawn { player, card }),
                None => warn!(
                    target: "runtime::presentation",
                    player = %player,
                    card = %card,
                    "DrawCard skipped: unknown player or missing card id"
                ),
            },
            Self::DiscardCard { player, hand_index } => {
                match ctx.session.discard(player, hand_index) {
                    Some(card) => cues.push(Cue::CardDiscarded { player, card }),
                    None => warn!(
                        target: "runtime::presentation",
                        player = %player,
                        hand_index,
                        "DiscardCard skipped: unknown player or hand index out of range"
                    ),
                }
            }
            Self::PutCardForward {
                owner,
                hand_index,
                card,
                flight,
            } => {
                let revealed = card.is_known()
                    && ctx
                        .session
                        .participant(owner)
                        .is_some_and(|p| !p.is_local());
                match ctx.session.put_card_forward(owner, hand_index, card, flight) {
                    Some(forwarded) => {
                        if !forwarded.from_hand {
                            warn!(
                                target: "runtime::presentation",
                                owner = %owner,
                                hand_index,
                                card = %card,
                                "Played card does not match local hand, showing a placeholder"
                            );
                        }
                        cues.push(Cue::CardForward {
                            player: owner,
                            card: forwarded.card,
                            revealed,
                        });
                    }
                    None => unknown_player("PutCardForward", owner),
                }
            }
            Self::PutCardInPile { owner, flight } => match ctx.session.put_card_in_pile(flight) {
                Some(landed) => cues.push(Cue::CardToPile {
                    player: landed.owner,
                    card: landed.card,
                }),
                None => warn!(
                    target: "runtime::presentation",
                    owner = %owner,
                    flight = flight.0,
                    "PutCardInPile skipped: no card in flight"
                ),
            },
            Self::ChangeTurn { player, turn_end } => {
                let player = player.filter(|&id| {
                    let known = ctx.session.contains(id);
                    if !known {
                        unknown_player("ChangeTurn", id);
                    }
                    known
                });
                ctx.session.set_turn(player, turn_end);
                cues.push(Cue::TurnChanged { player });
            }
            Self::PlayerBuffsUpdate { player, buffs } => {
                if !ctx.session.set_buffs(player, buffs) {
                    unknown_player("PlayerBuffsUpdate", player);
                }
            }
            Self::GameUpdate(status) => {
                apply_snapshot(ctx.session, &status);
                cues.push(Cue::Refresh);
            }
            Self::CollectDiscardCards { expected, round } => {
                return ctx.collect_round(expected, round);
            }
            Self::GameEnd { winner } => {
                ctx.session.end(winner);
                return Step::Done(ctx.play_signalled(Cue::GameResult { winner }));
            }
        }

        ctx.spawn_detached(cues);
        match policy {
            DurationPolicy::Fixed(duration) => Step::Done(Completion::after(duration)),
            DurationPolicy::Immediate | DurationPolicy::Explicit => Step::Done(Completion::ready()),
        }
    }
}

impl RunContext<'_> {
    fn spawn_detached(&self, cues: Vec<Cue>) {
        for cue in cues {
            let presenter = Arc::clone(self.presenter);
            tokio::spawn(async move { presenter.play(cue).await });
        }
    }

    /// Plays one cue and completes once the presenter returns.
    ///
    /// A presenter that panics drops the signal, which still completes the
    /// event.
    fn play_signalled(&self, cue: Cue) -> Completion {
        let (done_tx, done_rx) = oneshot::channel();
        let presenter = Arc::clone(self.presenter);
        tokio::spawn(async move {
            presenter.play(cue).await;
            let _ = done_tx.send(());
        });
        Completion::on_signal(done_rx)
    }

    /// Starts every cue now and resolves when all of them have finished.
    fn play_all(&self, cues: Vec<Cue>) -> impl Future<Output = ()> + Send + 'static {
        let mut cues_in_progress = JoinSet::new();
        for cue in cues {
            let presenter = Arc::clone(self.presenter);
            cues_in_progress.spawn(async move { presenter.play(cue).await });
        }

        async move {
            while let Some(result) = cues_in_progress.join_next().await {
                if let Err(error) = result {
                    warn!(target: "runtime::presentation", error = %error, "Cue task failed");
                }
            }
        }
    }

    fn collect_round(&mut self, expected: u32, round: u32) -> Step {
        let collected = self.session.collect_round();
        if collected.is_empty() {
            self.session.set_pile_count(expected);
            debug!(
                target: "runtime::presentation",
                rounds = round,
                pile = expected,
                "Discard piles collected"
            );
            return Step::Done(Completion::ready());
        }

        let cues = collected
            .into_iter()
            .map(|(player, card)| Cue::CollectCard { player, card })
            .collect();
        let animations = self.play_all(cues);
        let delay = self.timings.collect_round_delay;
        let completion = Completion::from_future(async move {
            animations.await;
            tokio::time::sleep(delay).await;
        });

        Step::Continue(
            completion,
            PresentationEvent::CollectDiscardCards {
                expected,
                round: round + 1,
            },
        )
    }
}

fn apply_snapshot(session: &mut GameSession, status: &GameStatus) {
    session.refresh_local(
        status.health,
        &status.cards,
        &status.discard_cards,
        status.buffs.clone(),
    );

    for opponent in &status.opponents {
        let refreshed = session.refresh_opponent(
            opponent.player_id,
            opponent.health,
            opponent.card_count as usize,
            &opponent.discard_cards,
            opponent.buffs.clone(),
        );
        if !refreshed {
            unknown_player("GameUpdate", opponent.player_id);
        }
    }

    session.set_pile_count(status.cards_in_pile);

    let turn = status.current_player_turn;
    let turn = if session.contains(turn) {
        Some(turn)
    } else {
        unknown_player("GameUpdate", turn);
        None
    };
    session.set_turn(turn, Some(status.current_player_turn_end.timestamp()));
}

fn unknown_player(event: &'static str, player: PlayerId) {
    warn!(
        target: "runtime::presentation",
        event,
        player = %player,
        "Event references an unknown player, skipping"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_policies_follow_event_table() {
        let timings = Timings::default();
        let flight = FlightId(0);

        assert_eq!(
            PresentationEvent::DamagePlayer {
                target: PlayerId(1),
                amount: 1
            }
            .duration_policy(&timings),
            DurationPolicy::Fixed(Duration::from_millis(250))
        );
        assert_eq!(
            PresentationEvent::PutCardInPile {
                owner: PlayerId(1),
                flight
            }
            .duration_policy(&timings),
            DurationPolicy::Fixed(Duration::from_millis(600))
        );
        assert_eq!(
            PresentationEvent::ChangeTurn {
                player: None,
                turn_end: None
            }
            .duration_policy(&timings),
            DurationPolicy::Fixed(Duration::from_millis(100))
        );
        assert_eq!(
            PresentationEvent::PlayerBuffsUpdate {
                player: PlayerId(1),
                buffs: Vec::new()
            }
            .duration_policy(&timings),
            DurationPolicy::Immediate
        );
        assert_eq!(
            PresentationEvent::GameEnd { winner: None }.duration_policy(&timings),
            DurationPolicy::Explicit
        );
    }

    #[test]
    fn kind_names_variant() {
        let event = PresentationEvent::ThrowDice {
            player: PlayerId(1),
            result: 6,
        };

        assert_eq!(event.kind(), EventKind::ThrowDice);
        assert_eq!(event.kind().to_string(), "ThrowDice");
    }
}
