//! Data-driven content definitions and loaders.
//!
//! This crate provides loaders for the static data files the client needs
//! before a session starts:
//! - Card catalog (RON or JSON card list, position = card id)
//! - Game configuration (data-driven via TOML)
//!
//! All loaders use game-core types directly with serde for deserialization.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{CardLoader, ConfigLoader};
