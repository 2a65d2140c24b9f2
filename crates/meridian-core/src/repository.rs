//! Snapshot repository abstraction.
//!
//! The full-fidelity local snapshot is stored as an opaque JSON payload with
//! a checksum. The session crate owns the payload shape; repositories only
//! move bytes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Stored representation of a session snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    /// Session the snapshot was taken from.
    pub session_id: Uuid,
    /// Payload schema version.
    pub schema_version: u32,
    /// Serialized session payload.
    pub payload: serde_json::Value,
    /// Hex-encoded SHA-256 of the serialized payload.
    pub checksum: String,
    /// Timestamp of the save.
    pub saved_at: DateTime<Utc>,
}

/// Repository trait for the single local session snapshot.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Load the stored snapshot, if any.
    async fn load_snapshot(&self) -> Result<Option<StoredSnapshot>, DomainError>;

    /// Replace the stored snapshot.
    async fn save_snapshot(&self, snapshot: &StoredSnapshot) -> Result<(), DomainError>;

    /// Remove the stored snapshot. Removing a missing snapshot succeeds.
    async fn clear_snapshot(&self) -> Result<(), DomainError>;
}
