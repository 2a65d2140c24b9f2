//! JSON file implementation of the `SnapshotRepository` trait.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use meridian_core::error::DomainError;
use meridian_core::repository::{SnapshotRepository, StoredSnapshot};

/// Stores the session snapshot as one JSON file.
#[derive(Debug, Clone)]
pub struct FileSnapshotRepository {
    path: PathBuf,
}

impl FileSnapshotRepository {
    /// Creates a repository writing to `path`. Parent directories are created
    /// on the first save.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

fn io_error(action: &str, path: &Path, err: &std::io::Error) -> DomainError {
    DomainError::Infrastructure(format!("failed to {action} {}: {err}", path.display()))
}

#[async_trait]
impl SnapshotRepository for FileSnapshotRepository {
    async fn load_snapshot(&self) -> Result<Option<StoredSnapshot>, DomainError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error("read", &self.path, &err)),
        };

        let snapshot: StoredSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::Infrastructure(format!(
                "malformed snapshot file {}: {e}",
                self.path.display()
            ))
        })?;

        debug!(
            session_id = %snapshot.session_id,
            path = %self.path.display(),
            "Loaded session snapshot"
        );
        Ok(Some(snapshot))
    }

    async fn save_snapshot(&self, snapshot: &StoredSnapshot) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory", parent, &e))?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| DomainError::Infrastructure(format!("snapshot serialization: {e}")))?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, bytes)
            .await
            .map_err(|e| io_error("write", &temp_path, &e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| io_error("replace", &self.path, &e))?;

        debug!(
            session_id = %snapshot.session_id,
            path = %self.path.display(),
            "Saved session snapshot"
        );
        Ok(())
    }

    async fn clear_snapshot(&self) -> Result<(), DomainError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Cleared session snapshot");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error("remove", &self.path, &err)),
        }
    }
}
