//! Durable key-value storage for the access and refresh tokens
//!
//! The session is kept as two independent string values. Nothing here makes the
//! pair atomic: callers write `token` and `refresh` one after the other.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::warn;
use thiserror::Error;

/// Key holding the access token
pub const ACCESS_TOKEN_KEY: &str = "token";

/// Key holding the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh";

/// Errors raised while writing to a token store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode token file: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage for session tokens
pub trait TokenStore: Send + Sync {
    /// Read a value, `None` when the key is not set
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process token store; contents are lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        let read_guard = self.values.read().unwrap_or_else(|e| e.into_inner());
        read_guard.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut write_guard = self.values.write().unwrap_or_else(|e| e.into_inner());
        write_guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut write_guard = self.values.write().unwrap_or_else(|e| e.into_inner());
        write_guard.remove(key);
        Ok(())
    }
}

/// Token store backed by a JSON object on disk
///
/// Survives process restarts on the same machine. A missing or corrupt file reads
/// as an empty store; every write rewrites the whole file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    lock: RwLock<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> HashMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return HashMap::new(),
            Err(err) => {
                warn!("Cannot read token file {}: {}", self.path.display(), err);
                return HashMap::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(err) => {
                warn!("Ignoring corrupt token file {}: {}", self.path.display(), err);
                HashMap::new()
            }
        }
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(values)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        fs::write(&self.path, encoded).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.read().unwrap_or_else(|e| e.into_inner());
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let mut values = self.load();
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let mut values = self.load();
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.save(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);

        store.set(ACCESS_TOKEN_KEY, "access").unwrap();
        store.set(REFRESH_TOKEN_KEY, "refresh").unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY), Some("access".to_string()));
        assert_eq!(store.get(REFRESH_TOKEN_KEY), Some("refresh".to_string()));

        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
        assert_eq!(store.get(REFRESH_TOKEN_KEY), Some("refresh".to_string()));

        // removing twice is fine
        store.remove(ACCESS_TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileTokenStore::new(&path);
        store.set(ACCESS_TOKEN_KEY, "a1").unwrap();
        store.set(REFRESH_TOKEN_KEY, "r1").unwrap();
        drop(store);

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY), Some("a1".to_string()));
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY), Some("r1".to_string()));

        reopened.remove(REFRESH_TOKEN_KEY).unwrap();
        assert_eq!(FileTokenStore::new(&path).get(REFRESH_TOKEN_KEY), None);
    }

    #[test]
    fn test_file_store_missing_and_corrupt_files_read_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileTokenStore::new(&path);
        assert_eq!(store.get(REFRESH_TOKEN_KEY), None);
        store.remove(REFRESH_TOKEN_KEY).unwrap();
        assert!(!path.exists());

        fs::write(&path, "not json").unwrap();
        assert_eq!(store.get(REFRESH_TOKEN_KEY), None);

        store.set(REFRESH_TOKEN_KEY, "r2").unwrap();
        assert_eq!(store.get(REFRESH_TOKEN_KEY), Some("r2".to_string()));
    }
}
