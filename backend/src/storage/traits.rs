//! # Storage Traits
//!
//! This module defines the storage abstraction the state repository is built
//! on, so different backends can be used interchangeably.

/// Failures a key-value backend can report
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The backend cannot be read or written at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Writing would exceed the backend's capacity
    #[error("storage quota exceeded: {needed} bytes needed, {quota} bytes allowed")]
    QuotaExceeded { needed: u64, quota: u64 },
    /// Keys may only contain ASCII letters, digits, '.', '-' and '_'
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Trait defining durable string storage with get/set semantics
///
/// Values are opaque strings; the state repository stores JSON in them.
/// Implementations use interior mutability so a store can be shared.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` if the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Create or replace a value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// All keys currently stored, in no particular order
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Check a key against the characters every backend can represent
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
