//! Turns server messages into presentation events.
//!
//! The translator is pure bookkeeping: it never touches the session. Card
//! references that depend on local state (which card instance leaves which
//! hand) are resolved when the event runs, tied together by [`FlightId`].
use tracing::{debug, warn};

use game_core::{FlightId, PlayerId};

use crate::presentation::PresentationEvent;
use crate::protocol::{ActionType, PlayCard, ServerMessage};

#[derive(Debug, Default)]
pub struct Translator {
    next_flight: u64,
    finished: bool,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `GameEnd` has been translated. Later messages are dropped.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Maps one server message to the events that show it, in order.
    ///
    /// Messages that need a batch (card plays) come back as one `Vec` so the
    /// caller can enqueue them atomically.
    pub fn translate(&mut self, message: ServerMessage) -> Vec<PresentationEvent> {
        if self.finished {
            debug!(
                target: "runtime::translator",
                kind = message.kind(),
                "Game already ended, dropping message"
            );
            return Vec::new();
        }

        match message {
            ServerMessage::Message { .. } | ServerMessage::SessionInfo(_) => Vec::new(),
            ServerMessage::GameStatus(status) => {
                vec![PresentationEvent::GameUpdate(Box::new(status))]
            }
            ServerMessage::PlayCard(play) => self.translate_play(play),
            ServerMessage::DrawCard { player_id, card_id } => vec![PresentationEvent::DrawCard {
                player: player_id,
                card: card_id,
            }],
            ServerMessage::ChangeTurn {
                player_id,
                turn_end,
            } => vec![PresentationEvent::ChangeTurn {
                player: player_id,
                turn_end: turn_end.map(|t| t.timestamp()),
            }],
            ServerMessage::PlayerBuffStatus { player_id, buffs } => {
                vec![PresentationEvent::PlayerBuffsUpdate {
                    player: player_id,
                    buffs,
                }]
            }
            ServerMessage::CollectDiscardCards { cards_in_pile } => {
                vec![PresentationEvent::CollectDiscardCards {
                    expected: cards_in_pile,
                    round: 0,
                }]
            }
            ServerMessage::GameEnd { winner_id } => {
                self.finished = true;
                vec![PresentationEvent::GameEnd { winner: winner_id }]
            }
        }
    }

    fn translate_play(&mut self, play: PlayCard) -> Vec<PresentationEvent> {
        let flight = FlightId(self.next_flight);
        self.next_flight += 1;

        let owner = play.player_id;
        let mut events = vec![PresentationEvent::PutCardForward {
            owner,
            hand_index: play.hand_index,
            card: play.card_id,
            flight,
        }];

        for action in play.actions {
            if action.dice_roll > 0 {
                events.push(PresentationEvent::ThrowDice {
                    player: action.player_dice_id.unwrap_or(owner),
                    result: dice_face(action.dice_roll),
                });
            }

            for target in action.targets {
                push_target_events(&mut events, target.player_id, target.action);
            }
        }

        events.push(PresentationEvent::PutCardInPile { owner, flight });
        events
    }
}

const DICE_FACES: u8 = 6;

fn dice_face(roll: u8) -> u8 {
    if roll > DICE_FACES {
        warn!(
            target: "runtime::translator",
            roll,
            "Dice roll out of range, showing the highest face"
        );
    }
    roll.min(DICE_FACES)
}

fn push_target_events(events: &mut Vec<PresentationEvent>, player: PlayerId, action: ActionType) {
    match action {
        ActionType::Attack { amount } => events.push(PresentationEvent::DamagePlayer {
            target: player,
            amount,
        }),
        ActionType::Heal { amount } => events.push(PresentationEvent::HealPlayer {
            target: player,
            amount,
        }),
        ActionType::Draw { cards } => events.extend(
            cards
                .into_iter()
                .map(|card| PresentationEvent::DrawCard { player, card }),
        ),
        ActionType::Discard { mut cards } => {
            // Highest index first so earlier removals don't shift later ones.
            cards.sort_unstable_by(|a, b| b.cmp(a));
            cards.dedup();
            events.extend(
                cards
                    .into_iter()
                    .map(|hand_index| PresentationEvent::DiscardCard { player, hand_index }),
            );
        }
        ActionType::Unsupported => warn!(
            target: "runtime::translator",
            player = %player,
            "Skipping unsupported card action"
        ),
    }
}
