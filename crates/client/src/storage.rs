//! Local persisted state.
//!
//! The browser-style contract: a handful of well-known keys, each holding one
//! JSON document, readable and writable only by this client. Keys map to
//! files under the configured storage directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use vexa_core::UserId;

/// Storage key for the authenticated-session credential token.
pub const TOKEN_KEY: &str = "token";

/// Storage key for a user's serialized cart line items.
///
/// Carts are scoped per owner so a different account logging in on the same
/// machine never inherits another user's items.
#[must_use]
pub fn cart_key(user_id: &UserId) -> String {
    format!("cart-{user_id}")
}

/// Errors raised by local persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored document could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Key-value store backed by one JSON file per key.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read and deserialize the value under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.path(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Serialize and write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or written.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string(value)?;
        fs::write(self.path(key), contents)?;
        Ok(())
    }

    /// Remove the value under `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// The directory backing this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        let value: Option<String> = storage.get("absent").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.set(TOKEN_KEY, &"abc123".to_string()).unwrap();
        let token: Option<String> = storage.get(TOKEN_KEY).unwrap();
        assert_eq!(token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_cart_keys_are_per_user() {
        let john = cart_key(&UserId::new("user1"));
        let admin = cart_key(&UserId::new("admin1"));
        assert_ne!(john, admin);
        assert_eq!(john, "cart-user1");
    }

    #[test]
    fn test_set_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.set("k", &vec![1, 2, 3]).unwrap();
        storage.set("k", &vec![4]).unwrap();
        let value: Option<Vec<i32>> = storage.get("k").unwrap();
        assert_eq!(value, Some(vec![4]));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.set("k", &1).unwrap();
        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        let value: Option<i32> = storage.get("k").unwrap();
        assert!(value.is_none());
    }
}
