//! Engine configuration.

use std::time::Duration;

use crate::domain::decay::DecaySchedule;

/// Delivery pauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Fixed part of the typing pause before each contact message.
    pub typing_base: Duration,
    /// Per-character part of the typing pause.
    pub typing_per_char: Duration,
    /// Pause between consecutive messages of a node.
    pub message_gap: Duration,
    /// Pause before each prelude line.
    pub prelude_gap: Duration,
    /// Pause before choices are offered.
    pub choice_lead: Duration,
    /// Pause before an ending is shown.
    pub ending_lead: Duration,
    /// Pause between a choice and the next node.
    pub after_choice: Duration,
    /// Hold for delay actions without a duration.
    pub default_hold: Duration,
    /// What every pause collapses to in fast mode.
    pub fast_pause: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            typing_base: Duration::from_millis(2000),
            typing_per_char: Duration::from_millis(50),
            message_gap: Duration::from_millis(3000),
            prelude_gap: Duration::from_millis(2000),
            choice_lead: Duration::from_millis(1000),
            ending_lead: Duration::from_millis(2000),
            after_choice: Duration::from_millis(3000),
            default_hold: Duration::from_millis(4000),
            fast_pause: Duration::from_millis(20),
        }
    }
}

impl PacingConfig {
    /// Typing pause for a message.
    #[must_use]
    pub fn typing(&self, message: &str) -> Duration {
        let chars = u32::try_from(message.chars().count()).unwrap_or(u32::MAX);
        self.typing_base
            .saturating_add(self.typing_per_char.saturating_mul(chars))
    }

    /// The pause actually taken.
    #[must_use]
    pub fn effective(&self, pause: Duration, fast_mode: bool) -> Duration {
        if fast_mode {
            self.fast_pause.min(pause)
        } else {
            pause
        }
    }
}

/// Everything tunable about a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Delivery pauses.
    pub pacing: PacingConfig,
    /// Decay cadence.
    pub decay: DecaySchedule,
    /// Length of one decay time unit.
    pub tick_unit: Duration,
    /// Case-insensitive substring whose first delivery starts decay.
    pub telemetry_marker: String,
    /// Write a snapshot after every node.
    pub autosave: bool,
    /// Fast mode at the start of a new session.
    pub start_fast: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pacing: PacingConfig::default(),
            decay: DecaySchedule::default(),
            tick_unit: Duration::from_secs(1),
            telemetry_marker: "telemetry".to_owned(),
            autosave: true,
            start_fast: false,
        }
    }
}

impl EngineConfig {
    /// Returns `true` if `message` contains the telemetry marker.
    #[must_use]
    pub fn is_telemetry(&self, message: &str) -> bool {
        !self.telemetry_marker.is_empty()
            && message
                .to_lowercase()
                .contains(&self.telemetry_marker.to_lowercase())
    }
}
