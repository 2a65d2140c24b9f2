//! Shared test doubles for the Meridian narrative session engine.

mod clock;
mod repository;
mod rng;

pub use clock::{FixedClock, SteppingClock};
pub use repository::{EmptySnapshotRepository, FailingSnapshotRepository, InMemorySnapshotRepository};
pub use rng::{MaxRng, MinRng, SequenceRng};
