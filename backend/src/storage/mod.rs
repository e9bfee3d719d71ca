//! # Storage Module
//!
//! Handles all data persistence for the hydration tracker.
//!
//! The domain never touches files directly. It talks to a [`StateRepository`],
//! which reads and writes JSON values through the [`KeyValueStore`] trait.
//! Any backend with get/set semantics can sit behind that trait.
//!
//! ## Key Layout
//!
//! ```text
//! profile                 Profile (JSON)
//! goals                   Goals (JSON)
//! ledger.2025-01-20       DailyLedger (JSON), one key per calendar day
//! ```
//!
//! ## Implementations
//!
//! - **JsonFileStore**: one `<key>.json` file per key in the data directory
//! - **MemoryStore**: process memory only; used when the data directory is
//!   unusable and in tests
//!
//! ## Failure Handling
//!
//! - Missing or corrupt values load as defaults and are logged
//! - Quota exhaustion triggers one retention sweep and a single retry
//! - An unavailable backend is swapped for a memory store for the rest of the
//!   session

pub mod traits;
pub mod memory;
pub mod json;
pub mod state_repository;

#[cfg(test)]
pub mod test_utils;

pub use traits::{KeyValueStore, StoreError};
pub use memory::MemoryStore;
pub use json::JsonFileStore;
pub use state_repository::{StateRepository, GOALS_KEY, LEDGER_KEY_PREFIX, PROFILE_KEY};
