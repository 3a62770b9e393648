use super::buff::Buff;
use super::card::Card;
use super::common::{CardId, PlayerId};

/// Whether a participant is the player running this client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Local,
    Opponent,
}

/// One seat at the table.
///
/// The local participant holds real card ids; opponents hold face-down
/// placeholders whose count mirrors the server's reported hand size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub health: u32,
    pub hand: Vec<Card>,
    pub discard: Vec<Card>,
    pub buffs: Vec<Buff>,
    /// Hand index of the selected card. Only meaningful for the local player.
    pub selected: Option<usize>,
    /// Target highlight shown while a card is selected.
    pub glowing: bool,
}

impl Participant {
    pub fn new(id: PlayerId, name: impl Into<String>, role: Role, health: u32) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            health,
            hand: Vec::new(),
            discard: Vec::new(),
            buffs: Vec::new(),
            selected: None,
            glowing: false,
        }
    }

    pub fn is_local(&self) -> bool {
        self.role == Role::Local
    }

    /// Subtracts health, stopping at zero. Returns the new health.
    pub fn damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    /// Adds health, clamped to `cap` when one is configured.
    pub fn heal(&mut self, amount: u32, cap: Option<u32>) -> u32 {
        let healed = self.health.saturating_add(amount);
        self.health = match cap {
            Some(cap) => healed.min(cap.max(self.health)),
            None => healed,
        };
        self.health
    }

    /// Appends a card to the right end of the hand.
    pub fn push_hand(&mut self, mut card: Card) {
        card.hand_index = self.hand.len();
        self.hand.push(card);
    }

    /// Removes the card at `index`, shifting later cards left.
    pub fn take_from_hand(&mut self, index: usize) -> Option<Card> {
        if index >= self.hand.len() {
            return None;
        }
        let card = self.hand.remove(index);
        self.reindex_hand();
        self.shift_selection_after_removal(index);
        Some(card)
    }

    /// Checks whether the server's view of a played card agrees with ours.
    ///
    /// Opponents' cards are face down, so only the index is checked for them.
    pub fn hand_card_matches(&self, index: usize, id: CardId) -> bool {
        match self.hand.get(index) {
            Some(card) if self.is_local() => card.id == id,
            Some(_) => true,
            None => false,
        }
    }

    /// Places a card on top of the discard pile.
    pub fn push_discard(&mut self, card: Card) {
        self.discard.push(card);
    }

    /// Removes the top discard card.
    pub fn pop_discard(&mut self) -> Option<Card> {
        self.discard.pop()
    }

    /// Selects the card at `index`, or deselects it if it was selected.
    ///
    /// Returns the selection after the toggle. Out-of-range indices leave
    /// the selection untouched.
    pub fn toggle_selection(&mut self, index: usize) -> Option<usize> {
        if index < self.hand.len() {
            self.selected = if self.selected == Some(index) { None } else { Some(index) };
        }
        self.selected
    }

    /// Drops any selection and target highlight.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.glowing = false;
    }

    /// Rebuilds the hand to match `ids`, keeping existing instances whose id
    /// still appears so their keys survive the refresh.
    pub fn reconcile_hand(&mut self, ids: &[CardId], make: &mut impl FnMut(CardId) -> Card) {
        let previous = std::mem::take(&mut self.hand);
        self.hand = reconcile(previous, ids, make);
        self.reindex_hand();
        if self.selected.is_some_and(|index| index >= self.hand.len()) {
            self.selected = None;
        }
    }

    /// Rebuilds the discard pile to match `ids`.
    pub fn reconcile_discard(&mut self, ids: &[CardId], make: &mut impl FnMut(CardId) -> Card) {
        let previous = std::mem::take(&mut self.discard);
        self.discard = reconcile(previous, ids, make);
    }

    /// Grows or shrinks a face-down hand to `count` cards.
    pub fn set_card_count(&mut self, count: usize, make: &mut impl FnMut(CardId) -> Card) {
        self.hand.truncate(count);
        while self.hand.len() < count {
            let card = make(CardId::UNKNOWN);
            self.push_hand(card);
        }
    }

    fn reindex_hand(&mut self) {
        for (index, card) in self.hand.iter_mut().enumerate() {
            card.hand_index = index;
        }
    }

    fn shift_selection_after_removal(&mut self, removed: usize) {
        self.selected = match self.selected {
            Some(selected) if selected == removed => None,
            Some(selected) if selected > removed => Some(selected - 1),
            other => other,
        };
    }
}

fn reconcile(
    mut previous: Vec<Card>,
    ids: &[CardId],
    make: &mut impl FnMut(CardId) -> Card,
) -> Vec<Card> {
    ids.iter()
        .map(|&id| match previous.iter().position(|card| card.id == id) {
            Some(position) => previous.remove(position),
            None => make(id),
        })
        .collect()
}
