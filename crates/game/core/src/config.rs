/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Health every participant starts with before the first snapshot arrives.
    pub starting_health: u32,

    /// Number of face-down cards shown for each opponent until the server
    /// reports the real count.
    pub opponent_hand_size: usize,

    /// Upper bound applied when healing.
    ///
    /// `None` leaves healing unclamped; the next full snapshot from the
    /// server is authoritative either way.
    pub max_health: Option<u32>,
}

impl GameConfig {
    pub const DEFAULT_STARTING_HEALTH: u32 = 100;
    pub const DEFAULT_OPPONENT_HAND_SIZE: usize = 5;

    /// Returns a config with the given heal cap.
    #[must_use]
    pub fn with_max_health(mut self, max_health: u32) -> Self {
        self.max_health = Some(max_health);
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_health: Self::DEFAULT_STARTING_HEALTH,
            opponent_hand_size: Self::DEFAULT_OPPONENT_HAND_SIZE,
            max_health: None,
        }
    }
}
