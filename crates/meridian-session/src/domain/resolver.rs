//! Choice resolution: maps a taken choice to resource deltas and a
//! side-effect directive for the engine.

use std::time::Duration;

use meridian_story::{Choice, ChoiceAction, ChoiceKind, ResourcePatch, SignalStatus};

/// System message shown by a delay action that carries none of its own.
pub const DEFAULT_HOLD_MESSAGE: &str = "PROCESSING...";

/// Trust and stress adjustment attached to a choice kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChoiceDelta {
    /// Trust change.
    pub trust: i32,
    /// Stress change.
    pub stress: i32,
}

impl ChoiceDelta {
    /// The delta as a resource patch. Zero components are left absent.
    #[must_use]
    pub fn as_patch(self) -> ResourcePatch {
        ResourcePatch {
            trust: (self.trust != 0).then_some(self.trust),
            stress: (self.stress != 0).then_some(self.stress),
            ..ResourcePatch::default()
        }
    }
}

/// Returns the trust and stress delta for a choice kind.
#[must_use]
pub const fn delta_for(kind: ChoiceKind) -> ChoiceDelta {
    let (trust, stress) = match kind {
        ChoiceKind::Safe => (5, 0),
        ChoiceKind::Urgent => (-3, 10),
        ChoiceKind::Technical => (3, 0),
        ChoiceKind::Supportive => (8, -5),
        ChoiceKind::Professional => (2, 0),
        ChoiceKind::Military => (1, 0),
        ChoiceKind::Restart | ChoiceKind::SaveCompletion | ChoiceKind::Other => (0, 0),
    };
    ChoiceDelta { trust, stress }
}

/// Side effect the engine must carry out after echoing a choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionDirective {
    /// Show `message` as a system line, then hold delivery for `duration`.
    Hold {
        /// System line.
        message: String,
        /// Hold length before fast-mode collapsing.
        duration: Duration,
    },
    /// Update the connection indicator.
    Signal(SignalStatus),
    /// Show a one-off system notice.
    Notice(String),
}

/// Outcome of resolving a choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resource delta to apply.
    pub delta: ChoiceDelta,
    /// Optional side effect.
    pub directive: Option<ActionDirective>,
}

/// Resolves a choice. `default_hold` is used by delay actions without an
/// explicit duration.
#[must_use]
pub fn resolve(choice: &Choice, default_hold: Duration) -> Resolution {
    let directive = choice.action.as_ref().map(|action| match action {
        ChoiceAction::Delay { message, duration } => ActionDirective::Hold {
            message: message
                .clone()
                .unwrap_or_else(|| DEFAULT_HOLD_MESSAGE.to_owned()),
            duration: duration.map_or(default_hold, Duration::from_millis),
        },
        ChoiceAction::SignalChange { status } => ActionDirective::Signal(*status),
        ChoiceAction::SystemMessage { message } => ActionDirective::Notice(message.clone()),
    });
    Resolution {
        delta: delta_for(choice.kind),
        directive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLD: Duration = Duration::from_millis(4000);

    #[test]
    fn test_delta_table() {
        let table = [
            (ChoiceKind::Safe, 5, 0),
            (ChoiceKind::Urgent, -3, 10),
            (ChoiceKind::Technical, 3, 0),
            (ChoiceKind::Supportive, 8, -5),
            (ChoiceKind::Professional, 2, 0),
            (ChoiceKind::Military, 1, 0),
            (ChoiceKind::Restart, 0, 0),
            (ChoiceKind::SaveCompletion, 0, 0),
            (ChoiceKind::Other, 0, 0),
        ];

        for (kind, trust, stress) in table {
            assert_eq!(delta_for(kind), ChoiceDelta { trust, stress }, "{kind:?}");
        }
    }

    #[test]
    fn test_as_patch_omits_zero_components() {
        let patch = delta_for(ChoiceKind::Safe).as_patch();

        assert_eq!(patch.trust, Some(5));
        assert_eq!(patch.stress, None);
        assert!(delta_for(ChoiceKind::Other).as_patch().is_empty());
    }

    #[test]
    fn test_delay_without_fields_uses_defaults() {
        // Arrange
        let mut choice = Choice::new("Wait.", ChoiceKind::Safe, Some("next".into()));
        choice.action = Some(ChoiceAction::Delay {
            message: None,
            duration: None,
        });

        // Act
        let resolution = resolve(&choice, HOLD);

        // Assert
        assert_eq!(
            resolution.directive,
            Some(ActionDirective::Hold {
                message: "PROCESSING...".to_owned(),
                duration: HOLD
            })
        );
    }

    #[test]
    fn test_delay_with_fields_overrides_defaults() {
        let mut choice = Choice::new("Crawl.", ChoiceKind::Safe, Some("shaft".into()));
        choice.action = Some(ChoiceAction::Delay {
            message: Some("Crawling...".into()),
            duration: Some(1500),
        });

        let resolution = resolve(&choice, HOLD);

        assert_eq!(
            resolution.directive,
            Some(ActionDirective::Hold {
                message: "Crawling...".to_owned(),
                duration: Duration::from_millis(1500)
            })
        );
    }

    #[test]
    fn test_signal_and_notice_actions() {
        let mut signal = Choice::new("Boost.", ChoiceKind::Technical, Some("a".into()));
        signal.action = Some(ChoiceAction::SignalChange {
            status: SignalStatus::Weak,
        });
        let mut notice = Choice::new("Log it.", ChoiceKind::Professional, Some("b".into()));
        notice.action = Some(ChoiceAction::SystemMessage {
            message: "LOG SAVED".into(),
        });

        assert_eq!(
            resolve(&signal, HOLD).directive,
            Some(ActionDirective::Signal(SignalStatus::Weak))
        );
        assert_eq!(
            resolve(&notice, HOLD).directive,
            Some(ActionDirective::Notice("LOG SAVED".into()))
        );
    }

    #[test]
    fn test_choice_without_action_has_no_directive() {
        let choice = Choice::new("Go.", ChoiceKind::Urgent, Some("x".into()));

        let resolution = resolve(&choice, HOLD);

        assert_eq!(resolution.delta, ChoiceDelta { trust: -3, stress: 10 });
        assert!(resolution.directive.is_none());
    }
}
