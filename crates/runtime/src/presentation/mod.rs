//! Presentation events and the seams they use to reach the screen.
//!
//! A [`PresentationEvent`] mutates the [`game_core::GameSession`] when it is
//! dequeued, hands [`Cue`]s to the [`Presenter`], and returns a
//! [`Completion`] the queue waits on before starting the next event.
mod completion;
mod cue;
mod event;

pub use completion::Completion;
pub use cue::{Cue, NullPresenter, Presenter};
pub use event::{DurationPolicy, EventKind, PresentationEvent, Timings};

pub(crate) use event::{RunContext, Step};
