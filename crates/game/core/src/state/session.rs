use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::buff::Buff;
use super::card::Card;
use super::change::ModelChange;
use super::common::{CardId, CardKey, FlightId, PlayerId};
use super::participant::{Participant, Role};
use crate::catalog::{CardCatalog, TargetType};
use crate::config::GameConfig;
use crate::error::SessionError;

/// Display name and id of one seat, as announced by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
}

/// Roster announcement that opens a session.
///
/// `id` is the id of the player running this client.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionInfo {
    pub id: PlayerId,
    pub players: Vec<PlayerProfile>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    InGame,
    Ended { winner: Option<PlayerId> },
}

/// A card detached from its owner's hand while its play resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InFlight {
    pub owner: PlayerId,
    pub card: Card,
}

/// Result of moving a played card out of a hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Forwarded {
    pub card: Card,
    /// `false` when local state disagreed with the server and a placeholder
    /// was synthesized instead.
    pub from_hand: bool,
}

/// The whole client-side view of one game.
///
/// Participants are stored with the local player first, followed by
/// opponents in roster order.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: GameConfig,
    catalog: Arc<CardCatalog>,
    local_id: PlayerId,
    participants: Vec<Participant>,
    pile_count: u32,
    current_turn: Option<PlayerId>,
    turn_end: Option<i64>,
    in_flight: BTreeMap<FlightId, InFlight>,
    board_glowing: bool,
    phase: SessionPhase,
    next_card_key: u64,
    changes: Vec<ModelChange>,
}

impl GameSession {
    /// Builds a session from the server's roster.
    ///
    /// Opponents start with `opponent_hand_size` face-down cards until the
    /// first snapshot reports the real counts.
    pub fn new(
        info: &SessionInfo,
        catalog: Arc<CardCatalog>,
        config: GameConfig,
    ) -> Result<Self, SessionError> {
        let mut seen = HashSet::new();
        let mut local = None;
        let mut opponents = Vec::new();

        for profile in &info.players {
            if !seen.insert(profile.id) {
                return Err(SessionError::DuplicatePlayer(profile.id));
            }
            let role = if profile.id == info.id { Role::Local } else { Role::Opponent };
            let participant =
                Participant::new(profile.id, profile.name.clone(), role, config.starting_health);
            match role {
                Role::Local => local = Some(participant),
                Role::Opponent => opponents.push(participant),
            }
        }

        let local = local.ok_or(SessionError::MissingLocalPlayer(info.id))?;
        if opponents.is_empty() {
            return Err(SessionError::NotEnoughOpponents);
        }

        let mut session = Self {
            config,
            catalog,
            local_id: info.id,
            participants: Vec::with_capacity(opponents.len() + 1),
            pile_count: 0,
            current_turn: None,
            turn_end: None,
            in_flight: BTreeMap::new(),
            board_glowing: false,
            phase: SessionPhase::InGame,
            next_card_key: 0,
            changes: Vec::new(),
        };

        session.participants.push(local);
        let hand_size = session.config.opponent_hand_size;
        for mut opponent in opponents {
            for _ in 0..hand_size {
                let card = session.new_card(CardId::UNKNOWN);
                opponent.push_hand(card);
            }
            session.participants.push(opponent);
        }

        Ok(session)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<CardCatalog> {
        &self.catalog
    }

    pub fn local_id(&self) -> PlayerId {
        self.local_id
    }

    pub fn local(&self) -> &Participant {
        &self.participants[0]
    }

    pub fn opponents(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().skip(1)
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: PlayerId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.participant(id).is_some()
    }

    pub fn pile_count(&self) -> u32 {
        self.pile_count
    }

    pub fn current_turn(&self) -> Option<PlayerId> {
        self.current_turn
    }

    /// Unix timestamp (seconds) at which the current turn expires.
    pub fn turn_end(&self) -> Option<i64> {
        self.turn_end
    }

    pub fn in_flight(&self, flight: FlightId) -> Option<&InFlight> {
        self.in_flight.get(&flight)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn board_glowing(&self) -> bool {
        self.board_glowing
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, SessionPhase::Ended { .. })
    }

    /// True while the game runs and the turn belongs to the local player.
    pub fn is_local_turn(&self) -> bool {
        self.phase == SessionPhase::InGame && self.current_turn == Some(self.local_id)
    }

    // ========================================================================
    // Change log
    // ========================================================================

    /// Drains the changes recorded since the last call.
    pub fn take_changes(&mut self) -> Vec<ModelChange> {
        std::mem::take(&mut self.changes)
    }

    fn record(&mut self, change: ModelChange) {
        self.changes.push(change);
    }

    /// Mints a card instance with a fresh key.
    pub fn new_card(&mut self, id: CardId) -> Card {
        mint(&mut self.next_card_key, &self.catalog, id)
    }

    /// Raw access for seeding a session by hand.
    ///
    /// Edits made here bypass change recording.
    pub fn participant_mut(&mut self, id: PlayerId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    // ========================================================================
    // Mutations driven by presentation events
    // ========================================================================

    /// Returns the new health, or `None` if the player is unknown.
    pub fn damage(&mut self, player: PlayerId, amount: u32) -> Option<u32> {
        let health = self.participant_mut(player)?.damage(amount);
        self.record(ModelChange::HealthChanged { player, health });
        Some(health)
    }

    pub fn heal(&mut self, player: PlayerId, amount: u32) -> Option<u32> {
        let cap = self.config.max_health;
        let health = self.participant_mut(player)?.heal(amount, cap);
        self.record(ModelChange::HealthChanged { player, health });
        Some(health)
    }

    /// Moves one card from the pile to a hand.
    ///
    /// Opponents always receive a face-down card. Returns the drawn card, or
    /// `None` when the player is unknown or a local draw carries no id.
    pub fn draw(&mut self, player: PlayerId, card_id: CardId) -> Option<Card> {
        let is_local = self.participant(player)?.is_local();
        let id = if is_local { card_id } else { CardId::UNKNOWN };
        if is_local && !id.is_known() {
            return None;
        }

        let card = self.new_card(id);
        let participant = self.participant_mut(player)?;
        participant.push_hand(card);
        let drawn = participant.hand.last().cloned();
        let count = participant.hand.len();

        self.record(ModelChange::HandChanged { player, count });
        self.set_pile_count(self.pile_count.saturating_sub(1));
        drawn
    }

    /// Moves the hand card at `hand_index` to the discard pile.
    pub fn discard(&mut self, player: PlayerId, hand_index: usize) -> Option<Card> {
        let participant = self.participant_mut(player)?;
        let card = participant.take_from_hand(hand_index)?;
        participant.push_discard(card.clone());
        let hand = participant.hand.len();
        let discard = participant.discard.len();

        self.record(ModelChange::HandChanged { player, count: hand });
        self.record(ModelChange::DiscardChanged { player, count: discard });
        Some(card)
    }

    /// Detaches a played card from its owner's hand and parks it in flight.
    ///
    /// When the card at `hand_index` does not match `card_id`, the hand is
    /// left alone and a placeholder is used so the play can still be shown.
    /// Face-down cards are revealed as `card_id`.
    pub fn put_card_forward(
        &mut self,
        owner: PlayerId,
        hand_index: usize,
        card_id: CardId,
        flight: FlightId,
    ) -> Option<Forwarded> {
        let participant = self.participant_mut(owner)?;
        let taken = if participant.hand_card_matches(hand_index, card_id) {
            participant.take_from_hand(hand_index)
        } else {
            None
        };
        let from_hand = taken.is_some();
        let hand = participant.hand.len();

        let mut card = match taken {
            Some(card) => card,
            None => {
                let mut placeholder = self.new_card(card_id);
                placeholder.hand_index = hand_index;
                placeholder
            }
        };
        if from_hand {
            self.record(ModelChange::HandChanged { player: owner, count: hand });
        }

        if !card.is_known() && card_id.is_known() {
            card.reveal(card_id, self.catalog.get(card_id));
            self.record(ModelChange::CardRevealed { owner, card: card_id });
        }

        self.in_flight.insert(
            flight,
            InFlight {
                owner,
                card: card.clone(),
            },
        );
        Some(Forwarded { card, from_hand })
    }

    /// Lands an in-flight card. The pile count is left to the server.
    pub fn put_card_in_pile(&mut self, flight: FlightId) -> Option<InFlight> {
        self.in_flight.remove(&flight)
    }

    pub fn set_buffs(&mut self, player: PlayerId, buffs: Vec<Buff>) -> bool {
        let Some(participant) = self.participant_mut(player) else {
            return false;
        };
        participant.buffs = buffs.clone();
        self.record(ModelChange::BuffsChanged { player, buffs });
        true
    }

    pub fn set_pile_count(&mut self, count: u32) {
        self.pile_count = count;
        self.record(ModelChange::PileChanged { count });
    }

    /// Hands the turn to `player` (or to nobody while waiting on the server)
    /// and clears any selection in progress.
    pub fn set_turn(&mut self, player: Option<PlayerId>, turn_end: Option<i64>) {
        self.current_turn = player;
        self.turn_end = turn_end;
        self.clear_interaction();
        self.record(ModelChange::TurnChanged { player, turn_end });
    }

    /// Pops the top discard card of every participant that has one and puts
    /// it back in the pile. Returns what moved, in seating order.
    pub fn collect_round(&mut self) -> Vec<(PlayerId, Card)> {
        let mut collected = Vec::new();
        for participant in &mut self.participants {
            if let Some(card) = participant.pop_discard() {
                collected.push((participant.id, card));
                self.changes.push(ModelChange::DiscardChanged {
                    player: participant.id,
                    count: participant.discard.len(),
                });
            }
        }
        if !collected.is_empty() {
            let count = self.pile_count.saturating_add(collected.len() as u32);
            self.set_pile_count(count);
        }
        collected
    }

    pub fn has_discards(&self) -> bool {
        self.participants.iter().any(|p| !p.discard.is_empty())
    }

    /// Freezes the session. No further interaction is accepted.
    pub fn end(&mut self, winner: Option<PlayerId>) {
        self.phase = SessionPhase::Ended { winner };
        self.current_turn = None;
        self.turn_end = None;
        self.clear_interaction();
        self.record(ModelChange::GameEnded { winner });
    }

    // ========================================================================
    // Full refresh
    // ========================================================================

    /// Overwrites the local player's state from a server snapshot.
    pub fn refresh_local(
        &mut self,
        health: u32,
        hand: &[CardId],
        discard: &[CardId],
        buffs: Vec<Buff>,
    ) {
        let local_id = self.local_id;
        let Self {
            participants,
            next_card_key,
            catalog,
            ..
        } = self;
        let mut make = |id| mint(next_card_key, catalog, id);
        let local = &mut participants[0];
        local.health = health;
        local.reconcile_hand(hand, &mut make);
        local.reconcile_discard(discard, &mut make);
        let counts = (local.hand.len(), local.discard.len());

        self.record_refresh(local_id, health, counts);
        self.set_buffs(local_id, buffs);
    }

    /// Overwrites an opponent's state from a server snapshot.
    ///
    /// Returns `false` if the opponent is not part of this session.
    pub fn refresh_opponent(
        &mut self,
        player: PlayerId,
        health: u32,
        card_count: usize,
        discard: &[CardId],
        buffs: Vec<Buff>,
    ) -> bool {
        let Self {
            participants,
            next_card_key,
            catalog,
            ..
        } = self;
        let Some(opponent) = participants
            .iter_mut()
            .find(|p| p.id == player && !p.is_local())
        else {
            return false;
        };
        let mut make = |id| mint(next_card_key, catalog, id);
        opponent.health = health;
        opponent.set_card_count(card_count, &mut make);
        opponent.reconcile_discard(discard, &mut make);
        let counts = (opponent.hand.len(), opponent.discard.len());

        self.record_refresh(player, health, counts);
        self.set_buffs(player, buffs)
    }

    fn record_refresh(&mut self, player: PlayerId, health: u32, (hand, discard): (usize, usize)) {
        self.record(ModelChange::HealthChanged { player, health });
        self.record(ModelChange::HandChanged { player, count: hand });
        self.record(ModelChange::DiscardChanged { player, count: discard });
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Toggles selection of a local hand card and updates target highlights.
    ///
    /// Callers decide whether interaction is allowed; this only refuses once
    /// the game has ended. Returns the selection after the toggle.
    pub fn toggle_selection(&mut self, index: usize) -> Option<usize> {
        if self.is_ended() {
            return None;
        }
        let local = &mut self.participants[0];
        let before = local.selected;
        let selected = local.toggle_selection(index);
        if selected == before {
            return selected;
        }

        let target = selected
            .and_then(|index| self.participants[0].hand[index].definition.as_ref())
            .map(|definition| definition.target_type());
        self.apply_glow(selected.map(|_| target.unwrap_or(TargetType::Single)));
        self.record(ModelChange::SelectionChanged { selected });
        selected
    }

    /// Index of the selected local card, if any.
    pub fn selected(&self) -> Option<usize> {
        self.local().selected
    }

    /// Clears every selection and highlight.
    pub fn clear_interaction(&mut self) {
        let had_selection = self.local().selected.is_some();
        for participant in &mut self.participants {
            participant.clear_selection();
        }
        self.board_glowing = false;
        if had_selection {
            self.record(ModelChange::SelectionChanged { selected: None });
        }
    }

    fn apply_glow(&mut self, target: Option<TargetType>) {
        let (opponents, own, board) = match target {
            Some(target) => (
                target.targets_opponents(),
                target.targets_self(),
                target.targets_board(),
            ),
            None => (false, false, false),
        };
        for participant in &mut self.participants {
            participant.glowing = if participant.is_local() { own } else { opponents };
        }
        self.board_glowing = board;
    }
}

fn mint(next_key: &mut u64, catalog: &CardCatalog, id: CardId) -> Card {
    let key = CardKey(*next_key);
    *next_key += 1;
    Card::new(key, id, catalog.get(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CardDefinition, Element, Kind, Stars};

    fn profile(id: i32, name: &str) -> PlayerProfile {
        PlayerProfile {
            id: PlayerId(id),
            name: name.to_owned(),
        }
    }

    fn catalog() -> Arc<CardCatalog> {
        let card = |attack, heal, targets| CardDefinition {
            name: "Card".to_owned(),
            element: Element::Water,
            kind: Kind::Spell,
            stars: Stars::One,
            desc: String::new(),
            attack,
            heal,
            draw: 0,
            targets,
        };
        Arc::new(CardCatalog::new(vec![
            card(3, 0, None),
            card(0, 4, None),
            card(2, 0, Some(TargetType::All)),
        ]))
    }

    fn session() -> GameSession {
        let info = SessionInfo {
            id: PlayerId(1),
            players: vec![profile(2, "bob"), profile(1, "alice"), profile(3, "carol")],
        };
        GameSession::new(&info, catalog(), GameConfig::default()).expect("valid roster")
    }

    #[test]
    fn roster_puts_local_first() {
        let session = session();

        assert_eq!(session.local().id, PlayerId(1));
        let opponents: Vec<_> = session.opponents().map(|p| p.id).collect();
        assert_eq!(opponents, vec![PlayerId(2), PlayerId(3)]);
        assert!(session.opponents().all(|p| p.hand.len() == 5));
        assert_eq!(session.local().health, 100);
    }

    #[test]
    fn heal_is_capped_only_when_configured() {
        let info = SessionInfo {
            id: PlayerId(1),
            players: vec![profile(1, "alice"), profile(2, "bob")],
        };
        let mut uncapped = session();
        let mut capped =
            GameSession::new(&info, catalog(), GameConfig::default().with_max_health(100))
                .expect("valid roster");

        assert_eq!(uncapped.heal(PlayerId(1), 15), Some(115));
        assert_eq!(capped.heal(PlayerId(1), 15), Some(100));
        assert_eq!(capped.heal(PlayerId(7), 15), None);
    }

    #[test]
    fn roster_validation() {
        let dup = SessionInfo {
            id: PlayerId(1),
            players: vec![profile(1, "a"), profile(1, "b")],
        };
        assert_eq!(
            GameSession::new(&dup, catalog(), GameConfig::default()).unwrap_err(),
            SessionError::DuplicatePlayer(PlayerId(1))
        );

        let missing = SessionInfo {
            id: PlayerId(9),
            players: vec![profile(1, "a"), profile(2, "b")],
        };
        assert_eq!(
            GameSession::new(&missing, catalog(), GameConfig::default()).unwrap_err(),
            SessionError::MissingLocalPlayer(PlayerId(9))
        );

        let alone = SessionInfo {
            id: PlayerId(1),
            players: vec![profile(1, "a")],
        };
        assert_eq!(
            GameSession::new(&alone, catalog(), GameConfig::default()).unwrap_err(),
            SessionError::NotEnoughOpponents
        );
    }

    #[test]
    fn draw_for_opponent_is_face_down() {
        let mut session = session();
        session.set_pile_count(10);

        let card = session.draw(PlayerId(2), CardId(1)).expect("known player");

        assert!(!card.is_known());
        assert_eq!(session.participant(PlayerId(2)).unwrap().hand.len(), 6);
        assert_eq!(session.pile_count(), 9);
        assert!(session.draw(PlayerId(42), CardId(1)).is_none());
    }

    #[test]
    fn put_card_forward_reveals_opponent_card() {
        let mut session = session();

        let forwarded = session
            .put_card_forward(PlayerId(2), 0, CardId(1), FlightId(0))
            .expect("known player");

        assert!(forwarded.from_hand);
        assert_eq!(forwarded.card.id, CardId(1));
        assert!(forwarded.card.definition.is_some());
        assert_eq!(session.participant(PlayerId(2)).unwrap().hand.len(), 4);
        assert!(session.take_changes().contains(&ModelChange::CardRevealed {
            owner: PlayerId(2),
            card: CardId(1),
        }));
        assert!(session.put_card_in_pile(FlightId(0)).is_some());
        assert!(session.put_card_in_pile(FlightId(0)).is_none());
    }

    #[test]
    fn desynced_play_uses_placeholder() {
        let mut session = session();
        session.refresh_local(20, &[CardId(0)], &[], Vec::new());

        let forwarded = session
            .put_card_forward(PlayerId(1), 0, CardId(2), FlightId(7))
            .expect("known player");

        assert!(!forwarded.from_hand);
        assert_eq!(forwarded.card.id, CardId(2));
        assert_eq!(session.local().hand.len(), 1);
        assert_eq!(session.in_flight_count(), 1);
    }

    #[test]
    fn selection_sets_target_glow() {
        let mut session = session();
        session.refresh_local(20, &[CardId(0), CardId(1), CardId(2)], &[], Vec::new());

        session.toggle_selection(0);
        assert!(session.opponents().all(|p| p.glowing));
        assert!(!session.local().glowing);

        session.toggle_selection(1);
        assert!(session.opponents().all(|p| !p.glowing));
        assert!(session.local().glowing);

        session.toggle_selection(2);
        assert!(session.board_glowing());

        session.set_turn(Some(PlayerId(2)), None);
        assert_eq!(session.selected(), None);
        assert!(!session.board_glowing());
        assert!(session.participants().iter().all(|p| !p.glowing));
    }

    #[test]
    fn collect_round_moves_one_card_per_player() {
        let mut session = session();
        session.refresh_local(20, &[], &[CardId(0), CardId(1)], Vec::new());
        session.refresh_opponent(PlayerId(2), 20, 5, &[CardId(2)], Vec::new());
        session.set_pile_count(3);

        let first = session.collect_round();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].1.id, CardId(1));
        assert_eq!(session.pile_count(), 5);

        let second = session.collect_round();
        assert_eq!(second.len(), 1);
        assert!(!session.has_discards());
        assert!(session.collect_round().is_empty());
    }

    #[test]
    fn end_freezes_selection() {
        let mut session = session();
        session.refresh_local(20, &[CardId(0)], &[], Vec::new());
        session.set_turn(Some(PlayerId(1)), None);
        assert!(session.is_local_turn());

        session.end(Some(PlayerId(1)));

        assert!(!session.is_local_turn());
        assert_eq!(session.toggle_selection(0), None);
        assert_eq!(
            session.phase(),
            SessionPhase::Ended {
                winner: Some(PlayerId(1))
            }
        );
    }
}
