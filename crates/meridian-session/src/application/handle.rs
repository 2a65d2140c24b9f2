//! Host-side handle to a running engine.

use meridian_core::error::DomainError;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::commands::{CommandKind, SessionCommand};

/// Sends commands to a [`SessionEngine`](super::engine::SessionEngine).
/// Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(sender: mpsc::Sender<SessionCommand>) -> Self {
        Self { sender }
    }

    /// Queues a command and returns its correlation id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the engine has shut down.
    pub async fn send(&self, kind: CommandKind) -> Result<Uuid, DomainError> {
        let command = SessionCommand::new(kind);
        let correlation_id = command.correlation_id;
        self.sender.send(command).await.map_err(|_| {
            DomainError::Infrastructure("session engine has shut down".to_owned())
        })?;
        Ok(correlation_id)
    }

    /// Returns `true` once the engine has dropped its inbox.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
