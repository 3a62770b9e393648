//! Headless presenter that narrates cues to the log.
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use game_core::Card;
use runtime::{Cue, Presenter};

/// Logs every cue and holds the dice cue for as long as the animation would
/// take on screen: a few spins, then a pause on the result.
#[derive(Clone, Debug)]
pub struct LogPresenter {
    dice_spin: Duration,
    dice_spins: u32,
    dice_hold: Duration,
}

impl Default for LogPresenter {
    fn default() -> Self {
        Self {
            dice_spin: Duration::from_millis(120),
            dice_spins: 6,
            dice_hold: Duration::from_millis(1000),
        }
    }
}

impl LogPresenter {
    fn dice_time(&self) -> Duration {
        self.dice_spin * self.dice_spins + self.dice_hold
    }
}

#[async_trait]
impl Presenter for LogPresenter {
    async fn play(&self, cue: Cue) {
        match cue {
            Cue::Damage { player, amount } => {
                info!(target: "randomi::cue", %player, amount, "Damage");
            }
            Cue::Heal { player, amount } => {
                info!(target: "randomi::cue", %player, amount, "Heal");
            }
            Cue::DiceRoll { player, result } => {
                info!(target: "randomi::cue", %player, "Rolling dice");
                tokio::time::sleep(self.dice_time()).await;
                info!(target: "randomi::cue", %player, result, "Dice settled");
            }
            Cue::CardDrawn { player, card } => {
                info!(target: "randomi::cue", %player, card = %describe(&card), "Card drawn");
            }
            Cue::CardDiscarded { player, card } => {
                info!(target: "randomi::cue", %player, card = %describe(&card), "Card discarded");
            }
            Cue::CardForward {
                player,
                card,
                revealed,
            } => {
                info!(target: "randomi::cue", %player, card = %describe(&card), revealed, "Card played");
            }
            Cue::CardToPile { player, card } => {
                info!(target: "randomi::cue", %player, card = %describe(&card), "Card to pile");
            }
            Cue::TurnChanged { player: Some(player) } => {
                info!(target: "randomi::cue", %player, "Turn changed");
            }
            Cue::TurnChanged { player: None } => {
                info!(target: "randomi::cue", "Waiting for the server");
            }
            Cue::CollectCard { player, card } => {
                info!(target: "randomi::cue", %player, card = %describe(&card), "Discard collected");
            }
            Cue::GameResult { winner: Some(winner) } => {
                info!(target: "randomi::cue", %winner, "Game over");
            }
            Cue::GameResult { winner: None } => {
                info!(target: "randomi::cue", "Game over without a winner");
            }
            Cue::Refresh => {
                info!(target: "randomi::cue", "Board refreshed");
            }
        }
    }
}

fn describe(card: &Card) -> String {
    match &card.definition {
        Some(definition) => format!("{} ({})", definition.name, card.id),
        None => card.id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use game_core::{CardId, CardKey, PlayerId};
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn dice_cue_takes_the_full_animation() {
        let presenter = LogPresenter::default();
        let start = Instant::now();

        presenter
            .play(Cue::DiceRoll {
                player: PlayerId(1),
                result: 4,
            })
            .await;

        assert_eq!(start.elapsed(), Duration::from_millis(1720));
    }

    #[tokio::test(start_paused = true)]
    async fn other_cues_return_immediately() {
        let presenter = LogPresenter::default();
        let start = Instant::now();

        presenter
            .play(Cue::CardDrawn {
                player: PlayerId(2),
                card: Card::new(CardKey(0), CardId::UNKNOWN, None),
            })
            .await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn face_down_cards_stay_hidden() {
        let card = Card::new(CardKey(3), CardId::UNKNOWN, None);
        assert_eq!(describe(&card), "face-down card");
        assert_eq!(describe(&Card::new(CardKey(4), CardId(9), None)), "card 9");
    }
}
