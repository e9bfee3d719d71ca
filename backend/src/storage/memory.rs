//! In-memory key-value store.
//!
//! Backs memory-only mode when the data directory cannot be used, and gives
//! tests a store with an adjustable byte quota.

use log::debug;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{validate_key, KeyValueStore, StoreError};

#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<BTreeMap<String, String>>>,
    quota_bytes: Arc<Mutex<Option<u64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that refuses writes once stored values exceed `quota_bytes`
    pub fn with_quota(quota_bytes: u64) -> Self {
        let store = Self::new();
        store.set_quota(Some(quota_bytes));
        store
    }

    pub fn set_quota(&self, quota_bytes: Option<u64>) {
        *self.quota_bytes.lock().unwrap_or_else(|p| p.into_inner()) = quota_bytes;
    }

    /// Total bytes of all stored values
    pub fn used_bytes(&self) -> u64 {
        self.lock().values().map(|v| v.len() as u64).sum()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let quota = *self.quota_bytes.lock().unwrap_or_else(|p| p.into_inner());
        let mut values = self.lock();

        if let Some(quota) = quota {
            let others: u64 = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len() as u64)
                .sum();
            let needed = others + value.len() as u64;
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        values.insert(key.to_string(), value.to_string());
        debug!("Stored {} bytes under '{}' (memory)", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock().keys().cloned().collect())
    }
}
