//! Encoding core for the Solsync inverter dashboard.
//!
//! Three pure pieces live here: the status-byte flag codec, the battery
//! command encoder with its per-voltage preset table, and the fuzzy
//! state-of-health estimator. Nothing in this crate performs I/O or keeps
//! mutable state, so every function is safe to call from any thread.

pub mod command;
pub mod flags;
pub mod prelude;
pub mod profile;
pub mod soh;

pub use prelude::{CoreError, CoreResult};
