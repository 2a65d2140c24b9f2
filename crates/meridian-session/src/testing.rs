//! Test doubles that depend on the presenter port.

use std::sync::Mutex;

use async_trait::async_trait;
use meridian_story::{Choice, Ending, SignalStatus};

use crate::application::lock;
use crate::application::presenter::{Presenter, Sender, SessionSummary};
use crate::domain::resources::ResourceLevels;
use crate::domain::save_code::SaveCode;

/// One presenter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    /// `display_message`.
    Message {
        /// Line text.
        text: String,
        /// Line origin.
        sender: Sender,
    },
    /// `display_choices`.
    Choices(Vec<Choice>),
    /// `display_status`.
    Status(ResourceLevels),
    /// `display_session_end`.
    SessionEnd {
        /// Ending shown.
        ending: Ending,
        /// Summary shown.
        summary: SessionSummary,
    },
    /// `display_connection`.
    Connection(SignalStatus),
    /// `display_contact`.
    Contact(String),
    /// `display_save_code`.
    SaveCode(SaveCode),
    /// `retract_messages`.
    Retract(usize),
    /// `clear`.
    Clear,
}

/// Presenter that records every call.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<PresenterEvent> {
        lock(&self.events).clone()
    }

    /// The transcript as it currently stands, after retractions and clears.
    #[must_use]
    pub fn transcript(&self) -> Vec<(Sender, String)> {
        let mut lines = Vec::new();
        for event in lock(&self.events).iter() {
            match event {
                PresenterEvent::Message { text, sender } => lines.push((*sender, text.clone())),
                PresenterEvent::Retract(keep) => lines.truncate(*keep),
                PresenterEvent::Clear => lines.clear(),
                _ => {}
            }
        }
        lines
    }

    /// Every system line ever shown, including retracted ones.
    #[must_use]
    pub fn system_messages(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                PresenterEvent::Message {
                    text,
                    sender: Sender::System,
                } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every choice offer, oldest first.
    #[must_use]
    pub fn choice_offers(&self) -> Vec<Vec<Choice>> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                PresenterEvent::Choices(choices) => Some(choices.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of status refreshes.
    #[must_use]
    pub fn status_count(&self) -> usize {
        lock(&self.events)
            .iter()
            .filter(|event| matches!(event, PresenterEvent::Status(_)))
            .count()
    }

    /// Every ending shown.
    #[must_use]
    pub fn endings(&self) -> Vec<(Ending, SessionSummary)> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                PresenterEvent::SessionEnd { ending, summary } => {
                    Some((ending.clone(), *summary))
                }
                _ => None,
            })
            .collect()
    }

    /// Every save code shown.
    #[must_use]
    pub fn save_codes(&self) -> Vec<SaveCode> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                PresenterEvent::SaveCode(code) => Some(*code),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: PresenterEvent) {
        lock(&self.events).push(event);
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn display_message(&self, text: &str, sender: Sender) {
        self.record(PresenterEvent::Message {
            text: text.to_owned(),
            sender,
        });
    }

    async fn display_choices(&self, choices: &[Choice]) {
        self.record(PresenterEvent::Choices(choices.to_vec()));
    }

    async fn display_status(&self, levels: &ResourceLevels) {
        self.record(PresenterEvent::Status(*levels));
    }

    async fn display_session_end(&self, ending: &Ending, summary: &SessionSummary) {
        self.record(PresenterEvent::SessionEnd {
            ending: ending.clone(),
            summary: *summary,
        });
    }

    async fn display_connection(&self, status: SignalStatus) {
        self.record(PresenterEvent::Connection(status));
    }

    async fn display_contact(&self, name: &str) {
        self.record(PresenterEvent::Contact(name.to_owned()));
    }

    async fn display_save_code(&self, code: &SaveCode) {
        self.record(PresenterEvent::SaveCode(*code));
    }

    async fn retract_messages(&self, keep: usize) {
        self.record(PresenterEvent::Retract(keep));
    }

    async fn clear(&self) {
        self.record(PresenterEvent::Clear);
    }
}
