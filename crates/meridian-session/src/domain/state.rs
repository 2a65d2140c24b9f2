//! Session state and its phases.

use chrono::{DateTime, Utc};
use meridian_story::Ending;
use uuid::Uuid;

use super::resources::ResourceModel;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No node has been entered yet.
    #[default]
    NotStarted,
    /// A node's messages are being delivered.
    Active {
        /// Node being delivered.
        node_id: String,
    },
    /// The node's choices are on offer.
    AwaitingChoice {
        /// Node whose choices are offered.
        node_id: String,
    },
    /// The narrative has ended; only the meta-choices remain.
    Ending {
        /// Node the ending belongs to.
        node_id: String,
        /// The resolved ending.
        ending: Ending,
    },
    /// Tearing down before a fresh start.
    Restarting,
}

/// Mutable state of one session, shared between the engine and the decay
/// timers.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Identifier of this run.
    pub session_id: Uuid,
    /// Lifecycle phase.
    pub phase: SessionPhase,
    /// Node most recently entered, or the node a taken choice leads to.
    pub current_node: String,
    /// Set between taking a choice and entering its target, whose effects
    /// have not been applied yet.
    pub effects_pending: bool,
    /// Decisions taken, net of rewinds.
    pub choices_made: u32,
    /// Decay time units elapsed since telemetry was established.
    pub elapsed_units: u64,
    /// When the run began.
    pub started_at: DateTime<Utc>,
    /// The four resources.
    pub resources: ResourceModel,
    /// Whether pacing pauses are collapsed.
    pub fast_mode: bool,
    /// Set at the telemetry milestone.
    pub decay_started: bool,
    /// Set once the elapsed counter crosses the critical threshold.
    pub critical_event_fired: bool,
    /// Set when an ending is reached. Decay never resumes in this run.
    pub decay_halted: bool,
    /// Messages currently on the presenter's transcript.
    pub transcript_len: usize,
    /// Incremented whenever decay timers are cancelled. Timers launched
    /// under an older epoch stop on their next tick.
    pub decay_epoch: u64,
}

impl SessionState {
    /// Fresh state positioned at `start_node` with canonical resources.
    #[must_use]
    pub fn new(
        session_id: Uuid,
        start_node: impl Into<String>,
        started_at: DateTime<Utc>,
        fast_mode: bool,
    ) -> Self {
        Self {
            session_id,
            phase: SessionPhase::NotStarted,
            current_node: start_node.into(),
            effects_pending: false,
            choices_made: 0,
            elapsed_units: 0,
            started_at,
            resources: ResourceModel::new(),
            fast_mode,
            decay_started: false,
            critical_event_fired: false,
            decay_halted: false,
            transcript_len: 0,
            decay_epoch: 0,
        }
    }

    /// Returns `true` while the decay timers should be running.
    #[must_use]
    pub fn decay_live(&self) -> bool {
        self.decay_started && !self.decay_halted
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::resources::ResourceLevels;

    #[test]
    fn test_new_state_is_not_started_with_canonical_resources() {
        // Arrange
        let started = Utc.with_ymd_and_hms(2026, 5, 2, 8, 0, 0).unwrap();

        // Act
        let state = SessionState::new(Uuid::new_v4(), "start", started, false);

        // Assert
        assert_eq!(state.phase, SessionPhase::NotStarted);
        assert_eq!(state.current_node, "start");
        assert_eq!(state.resources.snapshot(), ResourceLevels::CANONICAL_START);
        assert!(!state.decay_started);
        assert!(!state.decay_live());
    }

    #[test]
    fn test_halted_decay_is_not_live() {
        let mut state = SessionState::new(Uuid::new_v4(), "start", Utc::now(), false);
        state.decay_started = true;
        assert!(state.decay_live());

        state.decay_halted = true;

        assert!(!state.decay_live());
    }
}
