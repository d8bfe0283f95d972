//! Key-value storage backend for client-side state.
//!
//! Carts and cached tokens are owned by store objects that write through a
//! [`Storage`] backend. Tests use [`MemoryStorage`]; the client crate ships a
//! durable file-backed implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Largest value a backend accepts, mirroring browser local storage quotas.
pub const MAX_ENTRY_BYTES: usize = 5 * 1024 * 1024;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the underlying medium failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The value exceeds [`MAX_ENTRY_BYTES`].
    #[error("entry of {size} bytes exceeds the {max} byte limit")]
    TooLarge {
        /// Size of the rejected value.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A stored value could not be decoded or encoded.
    #[error("corrupted entry: {0}")]
    Corrupt(String),

    /// The key is not usable with this backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Synchronous key-value storage.
///
/// Implementations must make `save` atomic with respect to `load`: a reader
/// sees either the previous value or the new one, never a partial write.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is too large or cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Reject values larger than [`MAX_ENTRY_BYTES`].
///
/// # Errors
///
/// Returns [`StorageError::TooLarge`] for oversized values.
pub const fn check_size(value: &str) -> Result<(), StorageError> {
    if value.len() > MAX_ENTRY_BYTES {
        return Err(StorageError::TooLarge {
            size: value.len(),
            max: MAX_ENTRY_BYTES,
        });
    }
    Ok(())
}

/// In-memory storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_size(value)?;
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}
