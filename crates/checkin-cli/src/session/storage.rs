//! File-backed credential storage for persisting login state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use checkin_core::error::AuthError;
use checkin_core::{ApiUrl, CredentialKey, CredentialStore};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoredSession {
    pub api_url: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl StoredSession {
    fn slot(&mut self, key: CredentialKey) -> &mut Option<String> {
        match key {
            CredentialKey::AccessToken => &mut self.access_token,
            CredentialKey::RefreshToken => &mut self.refresh_token,
        }
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Get the session file path.
pub fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "checkin").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("session.json"))
}

/// Read the stored session, if any.
pub fn load_session(path: &Path) -> Result<Option<StoredSession>> {
    read(path).with_context(|| format!("Failed to read session file {}", path.display()))
}

fn read(path: &Path) -> io::Result<Option<StoredSession>> {
    match fs::read_to_string(path) {
        Ok(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Persist through a sibling temp file so readers never see a partial file.
fn write(path: &Path, session: &StoredSession) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(session)?;
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, json)?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&temp_path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&temp_path, perms)?;
    }

    fs::rename(&temp_path, path)
}

/// Tokens kept in a JSON file, tagged with the backend they belong to.
///
/// The file is removed once both tokens are gone.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    api_url: ApiUrl,
    // Held for every read and read-modify-write within this process.
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf, api_url: ApiUrl) -> Self {
        Self {
            path,
            api_url,
            lock: Mutex::new(()),
        }
    }

    fn locked(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self) -> io::Result<Option<StoredSession>> {
        let _guard = self.locked();
        read(&self.path)
    }

    /// Apply `change` to the stored session and persist the result.
    fn update(&self, change: impl FnOnce(&mut StoredSession)) -> io::Result<()> {
        let _guard = self.locked();

        let mut session = read(&self.path)?.unwrap_or_default();
        change(&mut session);

        if session.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            };
        }

        session.api_url = Some(self.api_url.to_string());
        write(&self.path, &session)
    }
}

fn store_error(err: io::Error) -> checkin_core::Error {
    AuthError::Store {
        message: err.to_string(),
    }
    .into()
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: CredentialKey) -> checkin_core::Result<Option<String>> {
        let session = self.load().map_err(store_error)?;
        Ok(session.and_then(|mut s| s.slot(key).take()))
    }

    async fn set(&self, key: CredentialKey, value: &str) -> checkin_core::Result<()> {
        self.update(|session| *session.slot(key) = Some(value.to_string()))
            .map_err(store_error)
    }

    async fn remove(&self, key: CredentialKey) -> checkin_core::Result<()> {
        self.update(|session| *session.slot(key) = None)
            .map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileCredentialStore {
        FileCredentialStore::new(
            dir.path().join("nested").join("session.json"),
            ApiUrl::new("https://checkin.example.com").unwrap(),
        )
    }

    #[tokio::test]
    async fn set_get_and_persist_api_url() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(store.get(CredentialKey::AccessToken).await.unwrap().is_none());
        store.set(CredentialKey::AccessToken, "access-1").await.unwrap();
        store.set(CredentialKey::RefreshToken, "refresh-1").await.unwrap();

        assert_eq!(
            store.get(CredentialKey::AccessToken).await.unwrap().as_deref(),
            Some("access-1")
        );
        let saved = load_session(&store.path).unwrap().unwrap();
        assert_eq!(saved.api_url.as_deref(), Some("https://checkin.example.com"));
        assert_eq!(saved.refresh_token.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.set(CredentialKey::AccessToken, "access-1").await.unwrap();
        store.set(CredentialKey::RefreshToken, "refresh-1").await.unwrap();

        store.remove(CredentialKey::AccessToken).await.unwrap();
        assert!(store.path.exists());

        store.clear().await.unwrap();
        assert!(!store.path.exists());
        // Clearing again is not an error.
        store.clear().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_is_private() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.set(CredentialKey::AccessToken, "access-1").await.unwrap();

        let mode = fs::metadata(&store.path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path.parent().unwrap()).unwrap();
        fs::write(&store.path, "not json").unwrap();

        let err = store.get(CredentialKey::AccessToken).await.unwrap_err();
        assert!(matches!(
            err,
            checkin_core::Error::Auth(AuthError::Store { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reads_never_see_a_partial_write() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(store(&dir));
        store.set(CredentialKey::RefreshToken, "refresh-1").await.unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..500 {
                    store
                        .set(CredentialKey::AccessToken, &format!("access-{i}"))
                        .await
                        .unwrap();
                }
            })
        };
        let reader = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..1000 {
                    let refresh = store.get(CredentialKey::RefreshToken).await.unwrap();
                    assert_eq!(refresh.as_deref(), Some("refresh-1"));
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
        assert!(!store.path.with_extension("tmp").exists());
    }
}
