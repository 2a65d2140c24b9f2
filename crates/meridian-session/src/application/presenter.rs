//! The presenter port: everything the engine shows the player goes through
//! this trait.

use async_trait::async_trait;
use chrono::TimeDelta;
use meridian_story::{Choice, Ending, SignalStatus};

use crate::domain::resources::ResourceLevels;
use crate::domain::save_code::SaveCode;

/// Who a transcript line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// The stranded contact.
    Character,
    /// The player's echoed choice.
    Player,
    /// Link and engine notices.
    System,
}

/// Statistics shown with an ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Decisions taken.
    pub choices_made: u32,
    /// Wall-clock time since the run began.
    pub survival: TimeDelta,
}

impl SessionSummary {
    /// Survival time as `{h}h {m}m`.
    #[must_use]
    pub fn survival_label(&self) -> String {
        let minutes = self.survival.num_minutes().max(0);
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// Renders a session. Implementations must not block.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Appends a line to the transcript.
    async fn display_message(&self, text: &str, sender: Sender);

    /// Offers choices. The previous offer, if any, is withdrawn.
    async fn display_choices(&self, choices: &[Choice]);

    /// Refreshes the resource readout.
    async fn display_status(&self, levels: &ResourceLevels);

    /// Shows an ending with the run's summary.
    async fn display_session_end(&self, ending: &Ending, summary: &SessionSummary);

    /// Updates the connection indicator.
    async fn display_connection(&self, status: SignalStatus);

    /// Updates the contact's displayed name.
    async fn display_contact(&self, name: &str);

    /// Shows a save code.
    async fn display_save_code(&self, code: &SaveCode);

    /// Removes every transcript line after the first `keep`.
    async fn retract_messages(&self, keep: usize);

    /// Clears the transcript and any offered choices.
    async fn clear(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survival_label_formats_hours_and_minutes() {
        let summary = SessionSummary {
            choices_made: 4,
            survival: TimeDelta::minutes(135) + TimeDelta::seconds(59),
        };

        assert_eq!(summary.survival_label(), "2h 15m");
    }

    #[test]
    fn test_survival_label_under_a_minute() {
        let summary = SessionSummary {
            choices_made: 0,
            survival: TimeDelta::seconds(12),
        };

        assert_eq!(summary.survival_label(), "0h 0m");
    }
}
