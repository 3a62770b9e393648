use std::fmt;

/// Opaque identifier the server assigns to each participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PlayerId(pub i32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies which card definition a card shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CardId(pub i32);

impl CardId {
    /// Sentinel for face-down cards owned by a remote participant.
    pub const UNKNOWN: Self = Self(-1);

    /// Returns true unless this is the face-down sentinel.
    #[inline]
    pub const fn is_known(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "card {}", self.0)
        } else {
            f.write_str("face-down card")
        }
    }
}

/// Unique handle for one card instance in this session.
///
/// Card ids are not unique (two copies of the same card share an id), so the
/// model tracks instances by key when a card moves between zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardKey(pub u64);

/// Ties a played card that left the hand to the event that returns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlightId(pub u64);
