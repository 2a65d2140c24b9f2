//! Meridian: narrative session engine.
//!
//! Walks the story graph one node at a time, paces message delivery, runs the
//! background resource decay, resolves choices into resource deltas, keeps
//! the rewind stack, and produces both persistence forms: the lossy
//! twelve-digit save code and the lossless local snapshot.

pub mod application;
pub mod domain;
pub mod testing;

pub use application::config::{EngineConfig, PacingConfig};
pub use application::engine::{Flow, SessionEngine, SharedRng};
pub use application::handle::SessionHandle;
pub use application::presenter::{Presenter, Sender, SessionSummary};
pub use domain::commands::{CommandKind, SessionCommand};
pub use domain::resources::{Resource, ResourceLevels, ResourceModel};
pub use domain::save_code::SaveCode;
pub use domain::snapshot::SessionSnapshot;
pub use domain::state::SessionPhase;
