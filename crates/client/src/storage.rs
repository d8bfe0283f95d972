//! Durable file-backed storage.
//!
//! One file per key inside a data directory. Writes go to a temporary file in
//! the same directory and are renamed over the target, so a concurrent
//! reader sees either the old value or the new one.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tradepost_core::{Storage, StorageError, storage::check_size};

/// [`Storage`] over plain files.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(StorageError::Corrupt(format!(
                "{} is not valid UTF-8",
                path.display()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_size(value)?;
        let path = self.path_for(key)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StorageError::Io(e.error))?;

        tracing::debug!(key, bytes = value.len(), "Saved storage entry");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use tradepost_core::{CART_STORAGE_KEY, Cart, CartLine, storage::MAX_ENTRY_BYTES};

    use super::*;

    #[test]
    fn test_save_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert!(storage.load("tradepost.cart").unwrap().is_none());
        storage.save("tradepost.cart", "{}").unwrap();
        assert_eq!(storage.load("tradepost.cart").unwrap().as_deref(), Some("{}"));

        storage.delete("tradepost.cart").unwrap();
        storage.delete("tradepost.cart").unwrap();
        assert!(storage.load("tradepost.cart").unwrap().is_none());
    }

    #[test]
    fn test_keys_cannot_escape_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        for key in ["../escape", "a/b", "", ".hidden"] {
            assert!(
                matches!(storage.save(key, "x"), Err(StorageError::InvalidKey(_))),
                "{key:?}"
            );
        }
    }

    #[test]
    fn test_oversized_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.save("k", "old").unwrap();

        let big = "x".repeat(MAX_ENTRY_BYTES + 1);
        assert!(matches!(
            storage.save("k", &big),
            Err(StorageError::TooLarge { .. })
        ));
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn test_no_temporary_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.save("k", "one").unwrap();
        storage.save("k", "two").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["k.json".to_string()]);
    }

    #[test]
    fn test_cart_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut cart = Cart::load(FileStorage::open(dir.path()).unwrap());
            cart.add(CartLine::new("A", "Widget", Decimal::from(10), 2))
                .unwrap();
        }

        let cart = Cart::load(FileStorage::open(dir.path()).unwrap());
        assert_eq!(cart.total_items(), 2);
        assert!(dir.path().join(format!("{CART_STORAGE_KEY}.json")).exists());
    }
}
