//! Credential persistence abstraction.
//!
//! The client reads the access token before every request and writes tokens
//! on login, refresh and logout. Where they live is up to the embedder: the
//! CLI keeps them in a file, tests keep them in memory.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::Result;
use crate::error::AuthError;

/// Keys under which credentials are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
}

impl CredentialKey {
    /// Returns the storage key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "accessToken",
            CredentialKey::RefreshToken => "refreshToken",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value storage for access and refresh tokens.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a stored value.
    async fn get(&self, key: CredentialKey) -> Result<Option<String>>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: CredentialKey, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, key: CredentialKey) -> Result<()>;

    /// Remove both tokens.
    async fn clear(&self) -> Result<()> {
        self.remove(CredentialKey::AccessToken).await?;
        self.remove(CredentialKey::RefreshToken).await
    }
}

/// In-memory credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<CredentialKey, String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with tokens.
    pub fn with_tokens(access_token: &str, refresh_token: Option<&str>) -> Self {
        let mut values = HashMap::new();
        values.insert(CredentialKey::AccessToken, access_token.to_string());
        if let Some(refresh_token) = refresh_token {
            values.insert(CredentialKey::RefreshToken, refresh_token.to_string());
        }
        Self {
            values: RwLock::new(values),
        }
    }

    fn poisoned() -> AuthError {
        AuthError::Store {
            message: "credential store lock poisoned".to_string(),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        let values = self.values.read().map_err(|_| Self::poisoned())?;
        Ok(values.get(&key).cloned())
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        values.insert(key, value.to_string());
        Ok(())
    }

    async fn remove(&self, key: CredentialKey) -> Result<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        values.remove(&key);
        Ok(())
    }
}

impl fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("values", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.get(CredentialKey::AccessToken).await.unwrap(), None);

        store.set(CredentialKey::AccessToken, "a1").await.unwrap();
        assert_eq!(
            store.get(CredentialKey::AccessToken).await.unwrap().as_deref(),
            Some("a1")
        );

        store.remove(CredentialKey::AccessToken).await.unwrap();
        store.remove(CredentialKey::AccessToken).await.unwrap();
        assert_eq!(store.get(CredentialKey::AccessToken).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_removes_both_tokens() {
        let store = MemoryCredentialStore::with_tokens("a1", Some("r1"));
        store.clear().await.unwrap();
        assert!(store.get(CredentialKey::AccessToken).await.unwrap().is_none());
        assert!(store.get(CredentialKey::RefreshToken).await.unwrap().is_none());
    }

    #[test]
    fn key_names_match_browser_storage() {
        assert_eq!(CredentialKey::AccessToken.as_str(), "accessToken");
        assert_eq!(CredentialKey::RefreshToken.to_string(), "refreshToken");
    }

    #[test]
    fn debug_hides_values() {
        let store = MemoryCredentialStore::with_tokens("secret-access", None);
        assert!(!format!("{:?}", store).contains("secret-access"));
    }
}
