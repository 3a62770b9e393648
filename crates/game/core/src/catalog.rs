//! Read-only card definitions keyed by [`CardId`].
//!
//! The catalog is populated once at startup from a static asset (see the
//! `game-content` loaders) and shared by every card instance through an
//! [`Arc`]. Card ids are positions in the asset's card list.

use std::sync::Arc;

use strum::{Display, EnumIter};

use crate::state::CardId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    Fire,
    Air,
    Earth,
    Water,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    Spell,
    Weapon,
    Food,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stars {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl Stars {
    /// Numeric star rating, 1 through 5.
    pub const fn value(self) -> u8 {
        self as u8 + 1
    }
}

/// Who a card may be aimed at when the local player plays it.
///
/// The `*AndSelf` variants additionally hint that the local player is a
/// valid target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetType {
    Single,
    Multiple,
    All,
    #[cfg_attr(feature = "serde", serde(rename = "Self"))]
    #[strum(serialize = "Self")]
    OnlySelf,
    SingleAndSelf,
    MultipleAndSelf,
    AllAndSelf,
}

impl TargetType {
    /// Returns true if opponents should be highlighted as targets.
    pub const fn targets_opponents(self) -> bool {
        matches!(
            self,
            Self::Single | Self::Multiple | Self::SingleAndSelf | Self::MultipleAndSelf
        )
    }

    /// Returns true if the local player should be highlighted as a target.
    pub const fn targets_self(self) -> bool {
        matches!(
            self,
            Self::OnlySelf | Self::SingleAndSelf | Self::MultipleAndSelf
        )
    }

    /// Returns true if the card hits everyone and only needs a board click.
    pub const fn targets_board(self) -> bool {
        matches!(self, Self::All | Self::AllAndSelf)
    }
}

/// Static description of one card.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardDefinition {
    pub name: String,
    pub element: Element,
    pub kind: Kind,
    pub stars: Stars,
    /// Rules text shown in the tooltip.
    #[cfg_attr(feature = "serde", serde(default))]
    pub desc: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub draw: u32,
    /// Declared target type; `None` means [`TargetType::Single`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub targets: Option<TargetType>,
}

impl CardDefinition {
    /// Target type used for selection hints.
    ///
    /// A single-target card that only heals or draws is aimed at its owner.
    pub fn target_type(&self) -> TargetType {
        let declared = self.targets.unwrap_or(TargetType::Single);
        if declared == TargetType::Single && self.attack == 0 && (self.heal > 0 || self.draw > 0) {
            TargetType::OnlySelf
        } else {
            declared
        }
    }
}

/// Immutable dictionary of card definitions.
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: Vec<Arc<CardDefinition>>,
}

impl CardCatalog {
    /// Builds a catalog where each definition's position is its card id.
    pub fn new(definitions: Vec<CardDefinition>) -> Self {
        Self {
            cards: definitions.into_iter().map(Arc::new).collect(),
        }
    }

    /// Looks up a definition. Unknown and face-down ids return `None`.
    pub fn get(&self, id: CardId) -> Option<Arc<CardDefinition>> {
        let index = usize::try_from(id.0).ok()?;
        self.cards.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterates definitions together with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (CardId, &CardDefinition)> {
        self.cards
            .iter()
            .enumerate()
            .map(|(index, def)| (CardId(index as i32), def.as_ref()))
    }
}
