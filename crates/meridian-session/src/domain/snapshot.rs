//! Lossless session snapshot for auto-save and resume.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use meridian_core::error::DomainError;
use meridian_core::repository::StoredSnapshot;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::resources::{ResourceLevels, ResourceModel};
use super::rewind::{RewindEntry, RewindManager};
use super::state::SessionState;

/// Version of the snapshot payload layout.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Everything needed to resume a session exactly where it was left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Identifier of the run.
    pub session_id: Uuid,
    /// Node most recently entered, or the target of a choice in flight.
    pub current_node: String,
    /// Whether `current_node`'s effects still have to be applied on resume.
    #[serde(default)]
    pub effects_pending: bool,
    /// Rewind stack, oldest first.
    pub rewind: Vec<RewindEntry>,
    /// Resource levels.
    pub resources: ResourceLevels,
    /// When the run began.
    pub started_at: DateTime<Utc>,
    /// Fast-mode flag.
    pub fast_mode: bool,
    /// Decisions taken.
    pub choices_made: u32,
    /// Decay units elapsed.
    pub elapsed_units: u64,
    /// Whether decay had started.
    pub decay_started: bool,
    /// Whether the critical event had fired.
    pub critical_event_fired: bool,
    /// Whether an ending had been reached.
    pub decay_halted: bool,
}

impl SessionSnapshot {
    /// Captures the state and rewind stack.
    #[must_use]
    pub fn capture(state: &SessionState, rewind: &RewindManager) -> Self {
        Self {
            session_id: state.session_id,
            current_node: state.current_node.clone(),
            effects_pending: state.effects_pending,
            rewind: rewind.entries().to_vec(),
            resources: state.resources.snapshot(),
            started_at: state.started_at,
            fast_mode: state.fast_mode,
            choices_made: state.choices_made,
            elapsed_units: state.elapsed_units,
            decay_started: state.decay_started,
            critical_event_fired: state.critical_event_fired,
            decay_halted: state.decay_halted,
        }
    }

    /// Rebuilds the state and rewind stack. The phase is left at
    /// `NotStarted`; the engine re-enters the node. Transcript marks are
    /// reset because the resumed transcript starts empty.
    #[must_use]
    pub fn restore(self) -> (SessionState, RewindManager) {
        let mut state =
            SessionState::new(self.session_id, self.current_node, self.started_at, self.fast_mode);
        state.resources = ResourceModel::from_levels(self.resources);
        state.effects_pending = self.effects_pending;
        state.choices_made = self.choices_made;
        state.elapsed_units = self.elapsed_units;
        state.decay_started = self.decay_started;
        state.critical_event_fired = self.critical_event_fired;
        state.decay_halted = self.decay_halted;

        let entries = self
            .rewind
            .into_iter()
            .map(|entry| RewindEntry {
                transcript_mark: 0,
                ..entry
            })
            .collect();
        (state, RewindManager::from_entries(entries))
    }

    /// Wraps the snapshot in a checksummed repository record.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if serialization fails.
    pub fn to_stored(&self, saved_at: DateTime<Utc>) -> Result<StoredSnapshot, DomainError> {
        let payload = serde_json::to_value(self).map_err(|e| {
            DomainError::Infrastructure(format!("snapshot serialization failed: {e}"))
        })?;
        let checksum = checksum(&payload)?;
        Ok(StoredSnapshot {
            session_id: self.session_id,
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            payload,
            checksum,
            saved_at,
        })
    }

    /// Unwraps a repository record, verifying version and checksum.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` on a schema version or checksum
    /// mismatch, and `DomainError::Infrastructure` if the payload does not
    /// deserialize.
    pub fn from_stored(stored: &StoredSnapshot) -> Result<Self, DomainError> {
        if stored.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(DomainError::Validation(format!(
                "unsupported snapshot schema version {}",
                stored.schema_version
            )));
        }
        if checksum(&stored.payload)? != stored.checksum {
            return Err(DomainError::Validation(
                "snapshot checksum mismatch".to_owned(),
            ));
        }
        serde_json::from_value(stored.payload.clone()).map_err(|e| {
            DomainError::Infrastructure(format!("snapshot deserialization failed: {e}"))
        })
    }
}

fn checksum(payload: &serde_json::Value) -> Result<String, DomainError> {
    let bytes = serde_json::to_vec(payload)
        .map_err(|e| DomainError::Infrastructure(format!("snapshot encoding failed: {e}")))?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().fold(String::with_capacity(64), |mut hex, byte| {
        let _ = write!(hex, "{byte:02x}");
        hex
    }))
}
