//! Meridian: story graph.
//!
//! The story graph is authored data: nodes of narrative messages joined by
//! choice edges, loaded once and never mutated. This crate owns the data
//! model, the YAML document format, and the authoring audit that flags
//! dead ends and dangling edges before a session ever reaches them.

pub mod domain;
pub mod loader;

pub use domain::audit::AuthoringIssue;
pub use domain::graph::StoryGraph;
pub use domain::node::{
    Choice, ChoiceAction, ChoiceKind, ContactUpdate, Ending, ResourceEffect, ResourcePatch,
    SignalStatus, StoryNode, Terminal,
};
