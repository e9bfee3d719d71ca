//! Test utilities for sessions backed by a temporary directory or memory
//!
//! The temporary directory is removed when the environment is dropped, even
//! if the test panics.

use anyhow::Result;
use shared::{HealthFlags, ProfileInput};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use crate::config::TrackerConfig;
use crate::domain::clock::FixedClock;
use crate::session::HydrationSession;
use crate::storage::{JsonFileStore, MemoryStore};

/// Start of every test clock: a Monday morning in UTC
pub const TEST_NOW: &str = "2025-01-20T08:00:00+00:00";

pub struct TestEnvironment {
    pub session: HydrationSession,
    pub clock: FixedClock,
    /// Data directory for manual inspection; empty for in-memory environments
    pub base_path: PathBuf,
    _temp_dir: Option<TempDir>,
}

impl TestEnvironment {
    /// Session over a JSON store in a fresh temporary directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let clock = FixedClock::at(TEST_NOW)?;
        let base_path = temp_dir.path().to_path_buf();
        let store = JsonFileStore::new(&base_path)?;
        let session = HydrationSession::open_with_store(Box::new(store), Arc::new(clock.clone()), TrackerConfig::default());

        Ok(Self {
            session,
            clock,
            base_path,
            _temp_dir: Some(temp_dir),
        })
    }

    /// Session over a [`MemoryStore`]
    pub fn in_memory() -> Self {
        let clock = FixedClock::at(TEST_NOW).unwrap();
        let session = HydrationSession::open_with_store(
            Box::new(MemoryStore::new()),
            Arc::new(clock.clone()),
            TrackerConfig::default(),
        );

        Self {
            session,
            clock,
            base_path: PathBuf::new(),
            _temp_dir: None,
        }
    }

    /// Another session over the same directory and clock, as after a relaunch
    pub fn open_session(&self) -> HydrationSession {
        let store = JsonFileStore::new(&self.base_path).unwrap();
        HydrationSession::open_with_store(Box::new(store), Arc::new(self.clock.clone()), TrackerConfig::default())
    }
}

/// 70 kg, 30 year old sedentary male at sea level: 2450 ml
pub fn profile_input() -> ProfileInput {
    ProfileInput {
        weight: "70".to_string(),
        weight_unit: "kg".to_string(),
        age: "30".to_string(),
        gender: "male".to_string(),
        activity_level: "sedentary".to_string(),
        exercise_minutes: "0".to_string(),
        exercise_intensity: "medium".to_string(),
        climate: "moderate".to_string(),
        altitude: "sea-level".to_string(),
        flags: HealthFlags::default(),
    }
}
