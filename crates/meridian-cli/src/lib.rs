//! Meridian terminal host.
//!
//! Reads commands from stdin, renders the session as tagged transcript lines
//! on stdout, and wires the engine to the file snapshot store.

pub mod config;
pub mod error;
pub mod host;
pub mod input;
pub mod terminal;
