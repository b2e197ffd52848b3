// WASM localStorage-based storage implementation

use crate::storage_trait::{StorageBackend, StorageResult};
use crate::error::CoreError;
use web_sys::window;
use log::debug;

/// LocalStorage-based storage backend for WASM mode
pub struct LocalStorageBackend {
    prefix: String,
}

impl LocalStorageBackend {
    /// Create a new localStorage backend with the specified key prefix
    pub fn new(prefix: String) -> Self {
        Self { prefix }
    }

    /// Unprefixed instance; the site's scripts read the bare keys (`favorites`, ...)
    pub fn default_instance() -> Self {
        Self::new(String::new())
    }

    /// Get the full key with prefix
    fn get_full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Get localStorage instance
    fn get_storage(&self) -> StorageResult<web_sys::Storage> {
        window()
            .ok_or_else(|| CoreError::Init("No window object available".to_string()))?
            .local_storage()
            .map_err(|e| CoreError::Storage(format!("Failed to access localStorage: {:?}", e)))?
            .ok_or_else(|| CoreError::Init("localStorage not available".to_string()))
    }
}

impl StorageBackend for LocalStorageBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let full_key = self.get_full_key(key);
        debug!("Loading data from localStorage: {}", full_key);

        self.get_storage()?
            .get_item(&full_key)
            .map_err(|e| CoreError::Storage(format!("Failed to read from localStorage: {:?}", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let full_key = self.get_full_key(key);
        debug!("Saving data to localStorage: {}", full_key);

        // Quota exceeded surfaces here as a DOMException
        self.get_storage()?
            .set_item(&full_key, value)
            .map_err(|e| CoreError::Storage(format!("Failed to save to localStorage: {:?}", e)))
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let full_key = self.get_full_key(key);
        debug!("Removing from localStorage: {}", full_key);

        self.get_storage()?
            .remove_item(&full_key)
            .map_err(|e| CoreError::Storage(format!("Failed to remove from localStorage: {:?}", e)))
    }

    fn list_keys(&self) -> StorageResult<Vec<String>> {
        debug!("Listing keys from localStorage with prefix: {}", self.prefix);

        let storage = self.get_storage()?;
        let length = storage.length()
            .map_err(|e| CoreError::Storage(format!("Failed to get localStorage length: {:?}", e)))?;

        let mut keys = Vec::new();
        for i in 0..length {
            if let Ok(Some(key)) = storage.key(i) {
                // Only include keys with our prefix
                if let Some(stripped) = key.strip_prefix(&self.prefix) {
                    keys.push(stripped.to_string());
                }
            }
        }

        debug!("Found {} keys with prefix {}", keys.len(), self.prefix);
        Ok(keys)
    }
}
