use std::sync::Arc;

use super::common::{CardId, CardKey};
use crate::catalog::CardDefinition;

/// One card instance held by a participant or in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub key: CardKey,
    pub id: CardId,
    /// Position within the owner's hand at the last hand change.
    pub hand_index: usize,
    /// `None` for face-down cards and ids missing from the catalog.
    pub definition: Option<Arc<CardDefinition>>,
}

impl Card {
    pub fn new(key: CardKey, id: CardId, definition: Option<Arc<CardDefinition>>) -> Self {
        Self {
            key,
            id,
            hand_index: 0,
            definition,
        }
    }

    pub fn is_known(&self) -> bool {
        self.id.is_known()
    }

    /// Turns a face-down card face up.
    pub fn reveal(&mut self, id: CardId, definition: Option<Arc<CardDefinition>>) {
        self.id = id;
        self.definition = definition;
    }
}
