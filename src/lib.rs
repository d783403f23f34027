//! gametime - Game-Time Engine for TTRPG campaign assistants
//!
//! Core library providing multi-calendar date arithmetic, narrative
//! time-passage analysis, token-budget text condensation, and NPC
//! extraction for tabletop RPG game masters.

pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
