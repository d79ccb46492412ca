//! File-backed session persistence
//!
//! The session is written as JSON to a sibling temp file and renamed into
//! place, so a crash mid-write never leaves a truncated session behind. On
//! Unix the file is readable by the owner only.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use studyhub_core::SessionStorage;
use studyhub_domain::{Result, Session, StudyHubError};
use tracing::debug;
use uuid::Uuid;

use crate::errors::InfraError;

/// Persists the current session to a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self.path.file_name().and_then(|n| n.to_str()).unwrap_or("session.json");
        self.path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn store(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(InfraError::from)?;
        }

        let json = serde_json::to_vec_pretty(session).map_err(InfraError::from)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await.map_err(InfraError::from)?;
        restrict_permissions(&temp).await?;

        if let Err(err) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(InfraError::from(err).into());
        }

        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    async fn retrieve(&self) -> Result<Option<Session>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(InfraError::from(err).into()),
        };

        let mut session: Session = serde_json::from_slice(&bytes).map_err(|e| {
            StudyHubError::Serialization(format!(
                "persisted session at {} is unreadable: {e}",
                self.path.display()
            ))
        })?;
        session.refresh_expiry_timestamp();
        Ok(Some(session))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "persisted session removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .map_err(|e| InfraError::from(e).into())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
