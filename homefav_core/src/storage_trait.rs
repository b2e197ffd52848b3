// Storage abstraction - allows file-based (native), localStorage (WASM) and in-memory backends

use crate::error::CoreError;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, CoreError>;

/// Abstract key-value storage backend.
///
/// Mirrors the browser storage contract: string keys, string values, and
/// synchronous access. Values written by the favorites store are JSON text,
/// view preferences are bare strings.
pub trait StorageBackend {
    /// Read the raw value stored under `key`, `None` when absent
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Check if key exists
    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get_item(key)?.is_some())
    }

    /// List all keys (optional, may not be supported by all backends)
    fn list_keys(&self) -> StorageResult<Vec<String>> {
        Ok(Vec::new())
    }
}

impl<S: StorageBackend + ?Sized> StorageBackend for &S {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }

    fn list_keys(&self) -> StorageResult<Vec<String>> {
        (**self).list_keys()
    }
}

impl<S: StorageBackend + ?Sized> StorageBackend for std::rc::Rc<S> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }

    fn list_keys(&self) -> StorageResult<Vec<String>> {
        (**self).list_keys()
    }
}

/// In-memory storage backend.
///
/// Used by tests and as a fallback when no persistent store is available.
/// Writes can be made to fail to exercise the quota-exceeded path.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
    fail_writes: RefCell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-seeded with one raw value
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.items.borrow_mut().insert(key.to_string(), value.to_string());
        storage
    }

    /// Make every subsequent `set_item`/`remove_item` fail
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.borrow_mut() = fail;
    }

    fn check_writable(&self) -> StorageResult<()> {
        if *self.fail_writes.borrow() {
            return Err(CoreError::Storage("quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_writable()?;
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.check_writable()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn list_keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.items.borrow().keys().cloned().collect())
    }
}

/// Standard storage keys used across the site
pub mod keys {
    pub const FAVORITES: &str = "favorites";
    pub const FAVORITES_VIEW: &str = "favoritesView";
    pub const PROPERTY_VIEW_TYPE: &str = "propertyViewType";
    pub const RETURN_TO_MAP_VIEW: &str = "returnToMapView";
}
