//! Client-side entity model shared by the presentation runtime and loaders.
//!
//! `game-core` defines the participants, cards, buffs and the per-game
//! [`GameSession`] that the presentation queue mutates. The authoritative
//! rules live on the server; this crate only mirrors what the server tells
//! the client, with the defensive reconciliation helpers needed when local
//! state drifts.
pub mod catalog;
pub mod config;
pub mod error;
pub mod state;

pub use catalog::{CardCatalog, CardDefinition, Element, Kind, Stars, TargetType};
pub use config::GameConfig;
pub use error::SessionError;
pub use state::{
    Buff, BuffLifetime, Card, CardId, CardKey, FlightId, Forwarded, GameSession, InFlight,
    ModelChange, Participant, PlayerId, PlayerProfile, Role, SessionInfo, SessionPhase,
};
