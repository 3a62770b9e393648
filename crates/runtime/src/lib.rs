//! Presentation runtime for the card game client.
//!
//! This crate turns the server's authoritative updates into a paced,
//! strictly ordered sequence of visible events. Consumers embed [`Runtime`]
//! to feed server frames in, play cards, and observe the mirrored session
//! through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`presentation`] defines the events, cues and completion futures
//! - [`protocol`] and [`translator`] map wire messages to events
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod presentation;
pub mod protocol;
pub mod runtime;
pub mod translator;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{Event, EventBus, QueueEvent, Topic};
pub use presentation::{
    Completion, Cue, DurationPolicy, EventKind, NullPresenter, PresentationEvent, Presenter,
    Timings,
};
pub use protocol::{ClientAction, ProtocolError, ServerMessage};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use translator::Translator;
