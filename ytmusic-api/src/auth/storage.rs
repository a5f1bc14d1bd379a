//! Persistence for OAuth tokens.
//!
//! [`FileTokenStorage`] keeps the token in `~/.config/ytmusic/oauth.json`;
//! [`MemoryTokenStorage`] keeps it for the lifetime of the process.

use crate::auth::oauth::RefreshableToken;
use crate::config::config_path;
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Where a session's OAuth token lives between runs.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn save(&self, token: &RefreshableToken) -> Result<()>;

    /// `None` when nothing has been saved.
    async fn load(&self) -> Result<Option<RefreshableToken>>;

    async fn clear(&self) -> Result<()>;
}

/// JSON file storage, readable by the owner only on unix.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Storage at the default location.
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: config_path("oauth.json")?,
        })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn save(&self, token: &RefreshableToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(token)?).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, perms).await?;
        }

        debug!(path = %self.path.display(), "saved oauth token");
        Ok(())
    }

    async fn load(&self) -> Result<Option<RefreshableToken>> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-process storage; nothing touches disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<RefreshableToken>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: RefreshableToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<RefreshableToken>> {
        self.token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn save(&self, token: &RefreshableToken) -> Result<()> {
        *self.slot() = Some(token.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<RefreshableToken>> {
        Ok(self.slot().clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> RefreshableToken {
        RefreshableToken {
            access_token: "a".into(),
            refresh_token: "r".into(),
            scope: String::new(),
            token_type: "Bearer".into(),
            expires_at: 1_900_000_000,
            expires_in: 3600,
        }
    }

    #[tokio::test]
    async fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::with_path(dir.path().join("sub").join("oauth.json"));

        assert!(storage.load().await.unwrap().is_none());
        storage.clear().await.unwrap();

        storage.save(&token()).await.unwrap();
        let loaded = storage.load().await.unwrap().unwrap();
        assert_eq!(loaded.refresh_token, "r");
        assert_eq!(loaded.expires_at, 1_900_000_000);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(storage.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        storage.clear().await.unwrap();
        assert!(storage.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_storage_round_trip() {
        let storage = MemoryTokenStorage::new();
        assert!(storage.load().await.unwrap().is_none());
        storage.save(&token()).await.unwrap();
        assert_eq!(storage.load().await.unwrap().unwrap().access_token, "a");
        storage.clear().await.unwrap();
        assert!(storage.load().await.unwrap().is_none());
    }
}
