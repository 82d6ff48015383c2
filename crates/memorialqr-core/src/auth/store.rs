//! Persistent storage for the single session credential.
//!
//! Three backends share the `TokenStore` trait:
//! - `FileTokenStore`: `session.json` in the data directory (default)
//! - `KeyringTokenStore`: the OS keychain
//! - `MemoryTokenStore`: process-local, for tests and throwaway runs

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Keychain service name
const SERVICE_NAME: &str = "memorialqr";

/// Keychain account holding the token
const KEYRING_ACCOUNT: &str = "session-token";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse session file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Refusing to store an empty token")]
    EmptyToken,
}

/// Holds at most one opaque credential.
///
/// An empty stored string counts as no credential.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, StoreError>;

    fn save(&self, token: &str) -> Result<(), StoreError>;

    /// Remove the credential. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StoreError>;

    fn has_credential(&self) -> bool {
        matches!(self.load(), Ok(Some(ref t)) if !t.is_empty())
    }
}

// ============================================================================
// File backend
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

pub struct FileTokenStore {
    data_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.session_path(),
            source,
        }
    }

    /// Load the full session record, including when it was saved.
    pub fn load_data(&self) -> Result<Option<SessionData>, StoreError> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| self.io_error(e))?;
        let data: SessionData = serde_json::from_str(&contents)?;
        Ok(Some(data))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load_data()?.map(|d| d.token).filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        if token.is_empty() {
            return Err(StoreError::EmptyToken);
        }
        std::fs::create_dir_all(&self.data_dir).map_err(|e| self.io_error(e))?;
        let data = SessionData {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&data)?;
        std::fs::write(self.session_path(), contents).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }
}

// ============================================================================
// Keychain backend
// ============================================================================

pub struct KeyringTokenStore {
    account: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self {
            account: KEYRING_ACCOUNT.to_string(),
        }
    }

    /// Store under a different keychain account (one per API host, for example).
    pub fn with_account(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<Entry, StoreError> {
        Ok(Entry::new(SERVICE_NAME, &self.account)?)
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match self.entry()?.get_password() {
            Ok(token) if token.is_empty() => Ok(None),
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        if token.is_empty() {
            return Err(StoreError::EmptyToken);
        }
        self.entry()?.set_password(token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot().clone().filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        if token.is_empty() {
            return Err(StoreError::EmptyToken);
        }
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested"));

        assert_eq!(store.load().unwrap(), None);
        assert!(!store.has_credential());

        store.save("abc123").unwrap();
        assert!(store.session_path().exists());
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));
        assert!(store.has_credential());
        assert!(store.load_data().unwrap().unwrap().saved_at <= Utc::now());

        store.clear().unwrap();
        assert!(!store.session_path().exists());
        assert!(!store.has_credential());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_empty_token_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        std::fs::write(
            store.session_path(),
            r#"{"token":"","saved_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(matches!(store.save(""), Err(StoreError::EmptyToken)));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        std::fs::write(store.session_path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Parse(_))));
        assert!(!store.has_credential());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert!(!store.has_credential());
        store.save("t").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("t"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);

        assert!(!MemoryTokenStore::with_token("").has_credential());
        assert!(MemoryTokenStore::with_token("x").has_credential());
    }
}
