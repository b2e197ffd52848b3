// Native file-based storage implementation

use crate::storage_trait::{StorageBackend, StorageResult};
use crate::error::CoreError;
use std::path::PathBuf;
use log::debug;

/// File-based storage backend for native (CLI) mode.
///
/// Each key is a `<key>.json` file under `base_dir` holding the raw value.
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    /// Create a new file storage backend with the specified base directory
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the full path for a storage key
    fn get_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(CoreError::InvalidInput(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.base_dir.join(format!("{}.json", key)))
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.get_path(key)?;
        debug!("Loading data from file: {:?}", path);

        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("File does not exist: {:?}", path);
                Ok(None)
            }
            Err(e) => Err(CoreError::Io(format!("Failed to read file: {}", e))),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.get_path(key)?;
        debug!("Saving data to file: {:?}", path);

        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CoreError::Io(format!("Failed to create directory: {}", e)))?;

        // Single replace: temp file renamed over the target
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .map_err(|e| CoreError::Io(format!("Failed to write file: {}", e)))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| CoreError::Io(format!("Failed to replace file: {}", e)))?;

        debug!("Data saved successfully to {:?}", path);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let path = self.get_path(key)?;
        debug!("Removing file: {:?}", path);

        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("File removed successfully: {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("File does not exist, nothing to remove: {:?}", path);
                Ok(())
            }
            Err(e) => Err(CoreError::Io(format!("Failed to remove file: {}", e))),
        }
    }

    fn list_keys(&self) -> StorageResult<Vec<String>> {
        debug!("Listing keys in directory: {:?}", self.base_dir);

        let entries = match std::fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::Io(format!("Failed to read directory: {}", e))),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| CoreError::Io(format!("Failed to read directory entry: {}", e)))?
                .path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();

        debug!("Found {} keys", keys.len());
        Ok(keys)
    }
}
