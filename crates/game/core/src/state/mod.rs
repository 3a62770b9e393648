//! Client-side mirror of the server's game state.
//!
//! [`GameSession`] owns every participant, the shared pile count, turn
//! bookkeeping and the cards currently in flight. The presentation queue is
//! its only writer; every mutation is recorded as a [`ModelChange`] so UI
//! observers can react without polling.
mod buff;
mod card;
mod change;
mod common;
mod participant;
mod session;

pub use buff::{Buff, BuffLifetime};
pub use card::Card;
pub use change::ModelChange;
pub use common::{CardId, CardKey, FlightId, PlayerId};
pub use participant::{Participant, Role};
pub use session::{Forwarded, GameSession, InFlight, PlayerProfile, SessionInfo, SessionPhase};
