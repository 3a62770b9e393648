/// How long a buff stays active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum BuffLifetime {
    /// Expires at the end of the owner's next turn, used or not.
    UntilNextTurnEnd,
    /// Expires as soon as a card consumes it.
    UntilUsed,
}

/// Transient modifier granted to a participant by a played card.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Buff {
    pub description: String,
    pub lifetime: BuffLifetime,
}

impl Buff {
    pub fn new(description: impl Into<String>, lifetime: BuffLifetime) -> Self {
        Self {
            description: description.into(),
            lifetime,
        }
    }
}
