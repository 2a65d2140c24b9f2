//! Commands accepted by the session engine's inbox.

use meridian_core::command::Command;
use uuid::Uuid;

/// What the host is asking the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Take the choice at `index` in the offered list.
    SelectChoice {
        /// Zero-based position.
        index: usize,
    },
    /// Undo the latest decision.
    Rewind,
    /// Abandon the run and start over.
    Restart,
    /// Flip fast mode.
    ToggleFastMode,
    /// Display a save code for the current position.
    RequestSaveCode,
    /// Jump to the position encoded in a save code.
    LoadSaveCode {
        /// The code as the player typed it.
        code: String,
    },
    /// Persist and stop.
    Shutdown,
}

/// A command together with its correlation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCommand {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The request.
    pub kind: CommandKind,
}

impl SessionCommand {
    /// Wraps `kind` with a fresh correlation id.
    #[must_use]
    pub fn new(kind: CommandKind) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            kind,
        }
    }

    /// Returns `true` for commands serviced without abandoning a pending
    /// delivery pause.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(
            self.kind,
            CommandKind::ToggleFastMode | CommandKind::RequestSaveCode
        )
    }
}

impl Command for SessionCommand {
    fn command_type(&self) -> &'static str {
        match self.kind {
            CommandKind::SelectChoice { .. } => "session.select_choice",
            CommandKind::Rewind => "session.rewind",
            CommandKind::Restart => "session.restart",
            CommandKind::ToggleFastMode => "session.toggle_fast_mode",
            CommandKind::RequestSaveCode => "session.request_save_code",
            CommandKind::LoadSaveCode { .. } => "session.load_save_code",
            CommandKind::Shutdown => "session.shutdown",
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
