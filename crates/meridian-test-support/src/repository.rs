//! Test repositories: mock `SnapshotRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use meridian_core::error::DomainError;
use meridian_core::repository::{SnapshotRepository, StoredSnapshot};

/// An in-memory snapshot slot that also records every save.
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    current: Mutex<Option<StoredSnapshot>>,
    saves: Mutex<Vec<StoredSnapshot>>,
}

impl InMemorySnapshotRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository that already holds `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: StoredSnapshot) -> Self {
        Self {
            current: Mutex::new(Some(snapshot)),
            saves: Mutex::new(Vec::new()),
        }
    }

    /// Returns the snapshot currently stored.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn current(&self) -> Option<StoredSnapshot> {
        self.current.lock().unwrap().clone()
    }

    /// Returns every snapshot saved so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_snapshots(&self) -> Vec<StoredSnapshot> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn load_snapshot(&self) -> Result<Option<StoredSnapshot>, DomainError> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn save_snapshot(&self, snapshot: &StoredSnapshot) -> Result<(), DomainError> {
        *self.current.lock().unwrap() = Some(snapshot.clone());
        self.saves.lock().unwrap().push(snapshot.clone());
        Ok(())
    }

    async fn clear_snapshot(&self) -> Result<(), DomainError> {
        *self.current.lock().unwrap() = None;
        Ok(())
    }
}

/// A repository that never holds a snapshot and silently accepts writes.
#[derive(Debug)]
pub struct EmptySnapshotRepository;

#[async_trait]
impl SnapshotRepository for EmptySnapshotRepository {
    async fn load_snapshot(&self) -> Result<Option<StoredSnapshot>, DomainError> {
        Ok(None)
    }

    async fn save_snapshot(&self, _snapshot: &StoredSnapshot) -> Result<(), DomainError> {
        Ok(())
    }

    async fn clear_snapshot(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// A repository that always returns an infrastructure error. Useful for
/// testing that storage failures never interrupt a session.
#[derive(Debug)]
pub struct FailingSnapshotRepository;

#[async_trait]
impl SnapshotRepository for FailingSnapshotRepository {
    async fn load_snapshot(&self) -> Result<Option<StoredSnapshot>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn save_snapshot(&self, _snapshot: &StoredSnapshot) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn clear_snapshot(&self) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }
}
