//! Client configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use runtime::Timings;

const DEFAULT_CARD_CATALOG: &str = "crates/game/content/data/cards.ron";

/// Where inbound frames come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameSourceConfig {
    /// Live game server.
    Server { url: String },
    /// Recorded session, one JSON message per line.
    Replay { path: PathBuf },
    /// Same as `Replay`, read from stdin.
    Stdin,
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub source: FrameSourceConfig,
    pub card_catalog: PathBuf,
    /// Optional TOML overriding [`game_core::GameConfig`] defaults.
    pub game_config: Option<PathBuf>,
    /// When set, logs are also written to `client.log` in this directory.
    pub log_dir: Option<PathBuf>,
    pub timings: Timings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            source: FrameSourceConfig::Stdin,
            card_catalog: PathBuf::from(DEFAULT_CARD_CATALOG),
            game_config: None,
            log_dir: None,
            timings: Timings::default(),
        }
    }
}

impl ClientConfig {
    /// Construct client configuration from environment variables.
    ///
    /// Environment variables:
    /// - `GAME_SERVER_URL` - WebSocket URL of the game server (wins over `REPLAY_FILE`)
    /// - `REPLAY_FILE` - Recorded frames to replay (default: stdin)
    /// - `CARD_CATALOG` - Card list, `.ron` or `.json`
    /// - `GAME_CONFIG` - Game rules TOML
    /// - `LOG_DIR` - Directory for the log file
    /// - `EVENT_DURATION_MS`, `DISCARD_DURATION_MS`, `TURN_CHANGE_DURATION_MS`,
    ///   `COLLECT_ROUND_DELAY_MS` - Presentation timings
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(url) = read_env::<String>("GAME_SERVER_URL") {
            config.source = FrameSourceConfig::Server { url };
        } else if let Some(path) = read_env::<PathBuf>("REPLAY_FILE") {
            config.source = FrameSourceConfig::Replay { path };
        }

        if let Some(path) = read_env::<PathBuf>("CARD_CATALOG") {
            config.card_catalog = path;
        }
        config.game_config = read_env("GAME_CONFIG");
        config.log_dir = read_env("LOG_DIR");

        override_millis(&mut config.timings.event, "EVENT_DURATION_MS");
        override_millis(&mut config.timings.discard, "DISCARD_DURATION_MS");
        override_millis(&mut config.timings.turn_change, "TURN_CHANGE_DURATION_MS");
        override_millis(
            &mut config.timings.collect_round_delay,
            "COLLECT_ROUND_DELAY_MS",
        );

        config
    }
}

fn override_millis(slot: &mut Duration, key: &str) {
    if let Some(ms) = read_env::<u64>(key) {
        *slot = Duration::from_millis(ms);
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok().filter(|v| !v.is_empty())?.parse().ok()
}
