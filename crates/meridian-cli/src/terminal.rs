//! Line-oriented presenter for a plain terminal.
//!
//! Every transcript line is tagged with its sender. A terminal cannot erase
//! printed lines, so a retraction prints a marker and the replayed lines
//! follow it.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use meridian_session::{Presenter, ResourceLevels, SaveCode, Sender, SessionSummary};
use meridian_story::{Choice, Ending, SignalStatus};
use tracing::warn;

/// Contact tag used until a node names the contact.
pub const DEFAULT_CONTACT: &str = "ALEX";

/// Keys accepted at the prompt.
pub const KEY_HINT: &str =
    "[1-9] choose  r rewind  f fast mode  s save code  load <code>  restart  q quit";

struct Screen<W> {
    out: W,
    contact: String,
    lines: usize,
    last_status: Option<ResourceLevels>,
}

/// Writes the session to `W` (stdout by default).
pub struct TerminalPresenter<W = io::Stdout> {
    screen: Mutex<Screen<W>>,
}

impl TerminalPresenter {
    /// Presenter writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalPresenter<W> {
    /// Presenter writing to `out`.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            screen: Mutex::new(Screen {
                out,
                contact: DEFAULT_CONTACT.to_owned(),
                lines: 0,
                last_status: None,
            }),
        }
    }

    /// Prints a host note that is not part of the transcript.
    pub fn hint(&self, text: &str) {
        self.emit(|s| writeln!(s.out, "  ({text})"));
    }

    /// Consumes the presenter and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.screen
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .out
    }

    fn emit(&self, draw: impl FnOnce(&mut Screen<W>) -> io::Result<()>) {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        let result = draw(&mut screen).and_then(|()| screen.out.flush());
        if let Err(err) = result {
            warn!(error = %err, "terminal write failed");
        }
    }
}

fn tag(sender: Sender, contact: &str) -> &str {
    match sender {
        Sender::Character => contact,
        Sender::Player => "YOU",
        Sender::System => "SYS",
    }
}

#[async_trait]
impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    async fn display_message(&self, text: &str, sender: Sender) {
        self.emit(|s| {
            s.lines += 1;
            let label = tag(sender, &s.contact).to_owned();
            writeln!(s.out, "[{label}] {text}")
        });
    }

    async fn display_choices(&self, choices: &[Choice]) {
        self.emit(|s| {
            writeln!(s.out)?;
            for (i, choice) in choices.iter().enumerate() {
                writeln!(s.out, "  {}) {}", i + 1, choice.text)?;
            }
            writeln!(s.out, "  ({KEY_HINT})")
        });
    }

    async fn display_status(&self, levels: &ResourceLevels) {
        self.emit(|s| {
            if s.last_status.as_ref() == Some(levels) {
                return Ok(());
            }
            s.last_status = Some(*levels);
            writeln!(
                s.out,
                "  O2 {}%  PWR {}%  STRESS {}%  TRUST {}%",
                levels.oxygen, levels.power, levels.stress, levels.trust
            )
        });
    }

    async fn display_session_end(&self, ending: &Ending, summary: &SessionSummary) {
        self.emit(|s| {
            writeln!(s.out)?;
            writeln!(s.out, "=== {} ===", ending.title())?;
            writeln!(s.out, "{}", ending.message())?;
            writeln!(
                s.out,
                "Survival time: {}   Choices made: {}",
                summary.survival_label(),
                summary.choices_made
            )
        });
    }

    async fn display_connection(&self, status: SignalStatus) {
        self.emit(|s| writeln!(s.out, "  <{}>", status.label()));
    }

    async fn display_contact(&self, name: &str) {
        self.emit(|s| {
            s.contact = name.to_uppercase();
            Ok(())
        });
    }

    async fn display_save_code(&self, code: &SaveCode) {
        self.emit(|s| writeln!(s.out, "  SAVE CODE: {code}"));
    }

    async fn retract_messages(&self, keep: usize) {
        self.emit(|s| {
            if keep >= s.lines {
                return Ok(());
            }
            s.lines = keep;
            writeln!(s.out, "  ~~ transmission rewound ~~")
        });
    }

    async fn clear(&self) {
        self.emit(|s| {
            s.lines = 0;
            s.last_status = None;
            s.contact = DEFAULT_CONTACT.to_owned();
            writeln!(s.out)?;
            writeln!(s.out, "==== NEW TRANSMISSION ====")
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use meridian_story::ChoiceKind;

    use super::*;

    fn output(presenter: TerminalPresenter<Vec<u8>>) -> String {
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn test_messages_are_tagged_by_sender() {
        // Arrange
        let presenter = TerminalPresenter::new(Vec::new());

        // Act
        presenter.display_message("Hello?", Sender::Character).await;
        presenter.display_message("I'm here.", Sender::Player).await;
        presenter.display_message("LINK UP", Sender::System).await;
        presenter.display_contact("Alex Chen").await;
        presenter.display_message("Thanks.", Sender::Character).await;

        // Assert
        assert_eq!(
            output(presenter),
            "[ALEX] Hello?\n[YOU] I'm here.\n[SYS] LINK UP\n[ALEX CHEN] Thanks.\n"
        );
    }

    #[tokio::test]
    async fn test_choices_are_numbered_from_one() {
        let presenter = TerminalPresenter::new(Vec::new());
        let choices = vec![
            Choice::new("Stay calm.", ChoiceKind::Supportive, None),
            Choice::new("Run!", ChoiceKind::Urgent, None),
        ];

        presenter.display_choices(&choices).await;

        let text = output(presenter);
        assert!(text.contains("  1) Stay calm.\n  2) Run!\n"));
        assert!(text.contains(KEY_HINT));
    }

    #[tokio::test]
    async fn test_status_is_printed_only_when_it_changes() {
        // Arrange
        let presenter = TerminalPresenter::new(Vec::new());
        let levels = ResourceLevels::CANONICAL_START;
        let changed = ResourceLevels {
            oxygen: 77,
            ..levels
        };

        // Act
        presenter.display_status(&levels).await;
        presenter.display_status(&levels).await;
        presenter.display_status(&changed).await;

        // Assert
        let text = output(presenter);
        assert_eq!(text.matches("STRESS").count(), 2);
        assert!(text.contains("O2 77%"));
    }

    #[tokio::test]
    async fn test_retraction_marks_the_rewind_once() {
        // Arrange
        let presenter = TerminalPresenter::new(Vec::new());
        presenter.display_message("one", Sender::Character).await;
        presenter.display_message("two", Sender::Player).await;

        // Act
        presenter.retract_messages(1).await;
        presenter.retract_messages(1).await;

        // Assert
        assert_eq!(output(presenter).matches("rewound").count(), 1);
    }

    #[tokio::test]
    async fn test_session_end_shows_the_summary() {
        let presenter = TerminalPresenter::new(Vec::new());
        let summary = SessionSummary {
            choices_made: 7,
            survival: TimeDelta::minutes(75),
        };

        presenter
            .display_session_end(&Ending::default(), &summary)
            .await;

        let text = output(presenter);
        assert!(text.contains("=== MISSION COMPLETE ==="));
        assert!(text.contains("Communication terminated."));
        assert!(text.contains("Survival time: 1h 15m   Choices made: 7"));
    }

    #[tokio::test]
    async fn test_clear_resets_the_contact_tag() {
        let presenter = TerminalPresenter::new(Vec::new());
        presenter.display_contact("Dr. Reyes").await;

        presenter.clear().await;
        presenter.display_message("Hi.", Sender::Character).await;

        assert!(output(presenter).ends_with("[ALEX] Hi.\n"));
    }
}
