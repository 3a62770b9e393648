//! Worker tasks that back the runtime orchestration.
//!
//! The queue worker owns the game session and plays presentation events one
//! at a time.

mod queue;

pub use queue::{Command, Intent, QueueWorker};
