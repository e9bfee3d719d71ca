//! # JSON File Store
//!
//! File-based key-value storage. Each key is stored as `<key>.json` in the
//! data directory.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── hydration_config.yaml
//! ├── profile.json
//! ├── goals.json
//! ├── ledger.2025-01-19.json
//! └── ledger.2025-01-20.json
//! ```
//!
//! ## Features
//!
//! - Atomic writes through a temp file and rename
//! - Optional byte quota across all stored values
//! - Any I/O failure is reported as `StoreError::Unavailable`

use anyhow::Result;
use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::storage::traits::{validate_key, KeyValueStore, StoreError};

const VALUE_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "json.tmp";

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    base_directory: PathBuf,
    quota_bytes: Option<u64>,
}

impl JsonFileStore {
    /// Open a store in `base_directory`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }
        if !base_path.is_dir() {
            return Err(anyhow::anyhow!("Data path is not a directory: {}", base_path.display()));
        }

        Ok(Self {
            base_directory: base_path,
            quota_bytes: None,
        })
    }

    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.base_directory.join(format!("{}.{}", key, VALUE_EXTENSION))
    }

    /// Bytes used by every stored value except `excluded_key`
    fn used_bytes_excluding(&self, excluded_key: &str) -> Result<u64, StoreError> {
        let mut total = 0;
        for key in self.keys()? {
            if key == excluded_key {
                continue;
            }
            let metadata = fs::metadata(self.value_path(&key)).map_err(unavailable)?;
            total += metadata.len();
        }
        Ok(total)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        let path = self.value_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!("Read {} bytes from {:?}", contents.len(), path);
                Ok(Some(contents))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;

        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_excluding(key)? + value.len() as u64;
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        let path = self.value_path(key);
        let temp_path = path.with_extension(TEMP_EXTENSION);

        // Write to a temp file first, then swap it in
        fs::write(&temp_path, value).map_err(unavailable)?;
        fs::rename(&temp_path, &path).map_err(unavailable)?;

        debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        match fs::remove_file(self.value_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable(e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base_directory).map_err(unavailable)? {
            let path = entry.map_err(unavailable)?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_key(key).is_ok() {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }
}

fn unavailable(error: io::Error) -> StoreError {
    StoreError::Unavailable(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (JsonFileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::new(temp_dir.path()).expect("Failed to create store");
        (store, temp_dir)
    }

    #[test]
    fn test_set_and_get() {
        let (store, _temp_dir) = setup_store();
        assert_eq!(store.get("profile").unwrap(), None);

        store.set("profile", r#"{"age":30}"#).unwrap();
        assert_eq!(store.get("profile").unwrap().as_deref(), Some(r#"{"age":30}"#));
        assert!(store.base_directory().join("profile.json").exists());
        assert!(!store.base_directory().join("profile.json.tmp").exists());
    }

    #[test]
    fn test_keys_ignore_foreign_files() {
        let (store, temp_dir) = setup_store();
        store.set("goals", "{}").unwrap();
        store.set("ledger.2025-01-20", "{}").unwrap();
        fs::write(temp_dir.path().join("hydration_config.yaml"), "retention_days: 30").unwrap();

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["goals".to_string(), "ledger.2025-01-20".to_string()]);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let (store, _temp_dir) = setup_store();
        store.set("goals", "{}").unwrap();
        store.remove("goals").unwrap();
        store.remove("goals").unwrap();
        assert_eq!(store.get("goals").unwrap(), None);
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let (store, _temp_dir) = setup_store();
        let store = store.with_quota(Some(8));
        store.set("a", "1234").unwrap();
        store.set("a", "12345678").unwrap();

        let err = store.set("b", "1").unwrap_err();
        assert_eq!(err, StoreError::QuotaExceeded { needed: 9, quota: 8 });
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("data");
        let store = JsonFileStore::new(&nested).unwrap();
        store.set("profile", "{}").unwrap();
        assert!(nested.join("profile.json").exists());
    }

    #[test]
    fn test_rejects_file_as_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("not_a_dir");
        fs::write(&file_path, "x").unwrap();
        assert!(JsonFileStore::new(&file_path).is_err());
    }
}
