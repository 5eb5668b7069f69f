//! File-backed cart persistence.
//!
//! Each storage key maps to one JSON file under a root directory. Writes go
//! to a sibling temp file first and are renamed into place, so a crash never
//! leaves a half-written cart behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use brightwire_core::cart::{CartStorage, StorageError};

const FILE_EXTENSION: &str = "json";
const MAX_KEY_LENGTH: usize = 64;

/// [`CartStorage`] that keeps one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory files are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] unless the key is 1 to 64
    /// characters of ASCII letters, digits, `-` or `_`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key.len() <= MAX_KEY_LENGTH
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key).with_extension(FILE_EXTENSION))
    }
}

impl CartStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Removes the key's file, then the root directory if nothing is left in it.
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.prune_root();
        Ok(())
    }
}

impl FileStorage {
    fn prune_root(&self) {
        let is_empty = fs::read_dir(&self.root).is_ok_and(|mut entries| entries.next().is_none());
        if !is_empty {
            return;
        }
        if let Err(e) = fs::remove_dir(&self.root) {
            tracing::debug!(root = %self.root.display(), error = %e, "left empty storage directory in place");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brightwire_core::cart::{CART_STORAGE_KEY, CartProduct, CartStore};
    use brightwire_core::{ProductId, ProductType};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_round_trip_and_remove() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("cart-1");
        let storage = FileStorage::new(&root);

        assert!(storage.load("cart").unwrap().is_none());
        storage.save("cart", "[]").unwrap();
        assert_eq!(storage.load("cart").unwrap().as_deref(), Some("[]"));
        assert!(root.join("cart.json").exists());
        assert!(!root.join("cart.json.tmp").exists());

        storage.remove("cart").unwrap();
        assert!(storage.load("cart").unwrap().is_none());
        assert!(!root.exists());
        storage.remove("cart").unwrap();

        storage.save("cart", "[]").unwrap();
        assert!(root.join("cart.json").exists());
    }

    #[test]
    fn test_remove_keeps_directory_with_other_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.save("cart", "[]").unwrap();
        storage.save("wishlist", "[]").unwrap();

        storage.remove("cart").unwrap();
        assert!(dir.path().exists());
        assert_eq!(storage.load("wishlist").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let storage = FileStorage::new("carts");
        let long = "k".repeat(65);
        for key in ["", "../etc/passwd", "a/b", "cart.json", long.as_str()] {
            assert!(
                matches!(storage.path_for(key), Err(StorageError::InvalidKey(_))),
                "{key}"
            );
        }
    }

    #[test]
    fn test_cart_survives_reopen() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("cart-1");
        {
            let mut cart = CartStore::open(FileStorage::new(&root));
            cart.add(CartProduct::new(
                ProductId::new(1),
                ProductType::Service,
                "Website Audit",
                "$300",
            ));
            cart.add(CartProduct::new(
                ProductId::new(1),
                ProductType::Service,
                "Website Audit",
                "$300",
            ));
        }

        let mut cart = CartStore::open(FileStorage::new(&root));
        assert_eq!(cart.count(), 2);

        cart.clear();
        assert!(!root.join(CART_STORAGE_KEY).with_extension("json").exists());
        assert!(!root.exists());
    }
}
