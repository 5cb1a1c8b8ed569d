// src/storage.rs
// Persisted client storage, one file per key under the data directory

use crate::error::Result;
use std::path::PathBuf;
use tracing::debug;

/// Storage key for the persisted bearer token
pub const TOKEN_KEY: &str = "token";

/// Durable client-side key/value storage.
///
/// The browser-localStorage analog: opaque string values keyed by name,
/// written as individual files so a cleared directory means a clean slate.
/// Writes are serialized through discrete user actions; no locking.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Open storage rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Read the value for `key`, if present
    pub fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.dir.join(key)).ok()
    }

    /// Write the value for `key`
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.dir.join(key), value)?;
        Ok(())
    }

    /// Remove `key`; missing keys are not an error
    pub fn remove(&self, key: &str) {
        if let Err(e) = std::fs::remove_file(self.dir.join(key))
            && e.kind() != std::io::ErrorKind::NotFound
        {
            debug!(key, error = %e, "Failed to remove storage key");
        }
    }

    /// The persisted bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY)
    }

    /// Persist the bearer token
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.set(TOKEN_KEY, token)
    }

    /// Purge the persisted bearer token
    pub fn clear_token(&self) {
        self.remove(TOKEN_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_set_get_roundtrip() {
        let (_dir, storage) = temp_storage();
        storage.set("greeting", "hej").unwrap();
        assert_eq!(storage.get("greeting").as_deref(), Some("hej"));
    }

    #[test]
    fn test_get_missing_key() {
        let (_dir, storage) = temp_storage();
        assert_eq!(storage.get("missing"), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, storage) = temp_storage();
        storage.set("key", "value").unwrap();
        storage.remove("key");
        storage.remove("key");
        assert_eq!(storage.get("key"), None);
    }

    #[test]
    fn test_token_helpers() {
        let (_dir, storage) = temp_storage();
        assert_eq!(storage.token(), None);
        storage.set_token("abc").unwrap();
        assert_eq!(storage.token().as_deref(), Some("abc"));
        storage.clear_token();
        assert_eq!(storage.token(), None);
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("client").join("state");
        let storage = Storage::open(&nested).unwrap();
        storage.set("token", "abc").unwrap();
        assert!(nested.join("token").exists());
    }
}
