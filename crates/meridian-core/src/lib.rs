//! Meridian Core: shared abstractions.
//!
//! This crate defines the traits and types that the story, session and
//! storage crates depend on: time, randomness, commands, the error taxonomy
//! and the snapshot repository seam. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod repository;
pub mod rng;
