//! Domain layer for the session engine: pure state and rules, no I/O.

pub mod commands;
pub mod decay;
pub mod resolver;
pub mod resources;
pub mod rewind;
pub mod save_code;
pub mod snapshot;
pub mod state;
