//! # State Repository
//!
//! Loads and saves [`PersistedState`] through a [`KeyValueStore`].
//!
//! Every read-modify-write runs under one mutex, so two operations on the
//! same ledger can never interleave their load and save.
//!
//! ## Recovery Rules
//!
//! - Absent keys load as `None` / no ledger
//! - Values that fail to parse are logged and treated as absent
//! - A failed read inside `update_ledger` fails the update with
//!   `TrackerError::StorageUnavailable`; nothing is written over the ledger
//! - `QuotaExceeded` on write: prune ledgers older than the retention cutoff,
//!   retry once, then fail with `TrackerError::StorageQuotaExceeded`
//! - `Unavailable` on write: copy whatever is still readable into a
//!   [`MemoryStore`] and continue there for the rest of the session

use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{DailyLedger, Goals, PersistedState, Profile};
use std::sync::{Mutex, MutexGuard};

use crate::domain::models::errors::TrackerError;
use crate::domain::models::intake::backfill_entry_ids;
use crate::storage::memory::MemoryStore;
use crate::storage::traits::{KeyValueStore, StoreError};

pub const PROFILE_KEY: &str = "profile";
pub const GOALS_KEY: &str = "goals";
pub const LEDGER_KEY_PREFIX: &str = "ledger.";

pub fn ledger_key(date: &str) -> String {
    format!("{}{}", LEDGER_KEY_PREFIX, date)
}

struct RepositoryInner {
    store: Box<dyn KeyValueStore>,
    memory_only: bool,
}

pub struct StateRepository {
    inner: Mutex<RepositoryInner>,
}

impl StateRepository {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            inner: Mutex::new(RepositoryInner {
                store,
                memory_only: false,
            }),
        }
    }

    /// Repository that never touches disk
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(RepositoryInner {
                store: Box::new(MemoryStore::new()),
                memory_only: true,
            }),
        }
    }

    /// True once the repository has given up on its durable backend
    pub fn is_memory_only(&self) -> bool {
        self.lock().memory_only
    }

    fn lock(&self) -> MutexGuard<'_, RepositoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load the full state; never fails, falls back to defaults
    pub fn load(&self) -> PersistedState {
        let inner = self.lock();
        let mut state = PersistedState {
            profile: read_value(inner.store.as_ref(), PROFILE_KEY),
            goals: read_value(inner.store.as_ref(), GOALS_KEY),
            ..Default::default()
        };

        for date in ledger_dates(inner.store.as_ref()) {
            if let Some(ledger) = read_ledger(inner.store.as_ref(), &date) {
                state.ledgers.insert(date, ledger);
            }
        }

        debug!(
            "Loaded state: profile={}, goals={}, ledgers={}",
            state.profile.is_some(),
            state.goals.is_some(),
            state.ledgers.len()
        );
        state
    }

    pub fn load_profile(&self) -> Option<Profile> {
        read_value(self.lock().store.as_ref(), PROFILE_KEY)
    }

    pub fn load_goals(&self) -> Option<Goals> {
        read_value(self.lock().store.as_ref(), GOALS_KEY)
    }

    pub fn load_ledger(&self, date: &str) -> Option<DailyLedger> {
        read_ledger(self.lock().store.as_ref(), date)
    }

    /// Replace everything in the store with `state`
    pub fn save(&self, state: &PersistedState, retention_cutoff: &str) -> Result<(), TrackerError> {
        let mut inner = self.lock();

        match &state.profile {
            Some(profile) => write_value(&mut inner, PROFILE_KEY, profile, retention_cutoff)?,
            None => remove_key(&mut inner, PROFILE_KEY)?,
        }
        match &state.goals {
            Some(goals) => write_value(&mut inner, GOALS_KEY, goals, retention_cutoff)?,
            None => remove_key(&mut inner, GOALS_KEY)?,
        }

        for date in ledger_dates(inner.store.as_ref()) {
            if !state.ledgers.contains_key(&date) {
                remove_key(&mut inner, &ledger_key(&date))?;
            }
        }
        for (date, ledger) in &state.ledgers {
            write_value(&mut inner, &ledger_key(date), ledger, retention_cutoff)?;
        }

        Ok(())
    }

    /// Store a fresh calculation, then run the retention sweep
    ///
    /// Returns the number of ledgers pruned.
    pub fn save_calculation(
        &self,
        profile: &Profile,
        goals: &Goals,
        retention_cutoff: &str,
    ) -> Result<usize, TrackerError> {
        let mut inner = self.lock();
        write_value(&mut inner, PROFILE_KEY, profile, retention_cutoff)?;
        write_value(&mut inner, GOALS_KEY, goals, retention_cutoff)?;
        let pruned = prune_before(&mut inner, retention_cutoff)?;
        info!("Saved profile and goals (water goal {} ml)", goals.water_ml);
        Ok(pruned)
    }

    /// Store goals without touching the profile or running the sweep
    pub fn save_goals(&self, goals: &Goals, retention_cutoff: &str) -> Result<(), TrackerError> {
        let mut inner = self.lock();
        write_value(&mut inner, GOALS_KEY, goals, retention_cutoff)
    }

    /// Load-modify-save one day's ledger atomically
    ///
    /// The closure sees `None` when no ledger exists for `date`. Leaving it
    /// `None` deletes the stored ledger; `Some` is written back. Nothing is
    /// written if the closure returns an error.
    pub fn update_ledger<F, R>(&self, date: &str, retention_cutoff: &str, update: F) -> Result<R, TrackerError>
    where
        F: FnOnce(&mut Option<DailyLedger>) -> Result<R, TrackerError>,
    {
        let mut inner = self.lock();
        let key = ledger_key(date);
        let original = fetch_ledger(inner.store.as_ref(), date).map_err(|e| {
            error!("Could not read ledger for {}: {}. Leaving it untouched.", date, e);
            TrackerError::StorageUnavailable(format!("could not read '{}': {}", key, e))
        })?;
        let mut ledger = original.clone();

        let result = update(&mut ledger)?;

        match &ledger {
            Some(updated) if original.as_ref() != Some(updated) => {
                write_value(&mut inner, &key, updated, retention_cutoff)?
            }
            Some(_) => {}
            None if original.is_some() => remove_key(&mut inner, &key)?,
            None => {}
        }

        Ok(result)
    }

    /// Remove ledgers dated before `cutoff` (lexical YYYY-MM-DD comparison)
    pub fn prune_ledgers_before(&self, cutoff: &str) -> Result<usize, TrackerError> {
        let mut inner = self.lock();
        prune_before(&mut inner, cutoff)
    }

    /// Delete profile, goals and every ledger
    pub fn clear_all(&self) -> Result<(), TrackerError> {
        let mut inner = self.lock();
        remove_key(&mut inner, PROFILE_KEY)?;
        remove_key(&mut inner, GOALS_KEY)?;
        for date in ledger_dates(inner.store.as_ref()) {
            remove_key(&mut inner, &ledger_key(&date))?;
        }
        info!("Cleared all stored state");
        Ok(())
    }
}

fn ledger_dates(store: &dyn KeyValueStore) -> Vec<String> {
    match store.keys() {
        Ok(keys) => {
            let mut dates: Vec<String> = keys
                .into_iter()
                .filter_map(|key| key.strip_prefix(LEDGER_KEY_PREFIX).map(str::to_string))
                .collect();
            dates.sort();
            dates
        }
        Err(e) => {
            warn!("Could not list stored keys: {}", e);
            Vec::new()
        }
    }
}

fn read_value<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    fetch_value(store, key).unwrap_or_else(|e| {
        warn!("Could not read '{}': {}. Using default.", key, e);
        None
    })
}

/// Like [`read_value`], but store failures are returned instead of read as absent
fn fetch_value<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Stored value for '{}' is corrupt: {}. Using default.", key, e);
            Ok(None)
        }
    }
}

fn read_ledger(store: &dyn KeyValueStore, date: &str) -> Option<DailyLedger> {
    fetch_ledger(store, date).unwrap_or_else(|e| {
        warn!("Could not read ledger for {}: {}. Treating it as absent.", date, e);
        None
    })
}

fn fetch_ledger(store: &dyn KeyValueStore, date: &str) -> Result<Option<DailyLedger>, StoreError> {
    let Some(mut ledger) = fetch_value::<DailyLedger>(store, &ledger_key(date))? else {
        return Ok(None);
    };
    if ledger.date != date {
        warn!("Ledger stored under {} claims date {}; using key date", date, ledger.date);
        ledger.date = date.to_string();
    }
    backfill_entry_ids(&mut ledger);
    Ok(Some(ledger))
}

fn prune_before(inner: &mut RepositoryInner, cutoff: &str) -> Result<usize, TrackerError> {
    let stale: Vec<String> = ledger_dates(inner.store.as_ref())
        .into_iter()
        .filter(|date| date.as_str() < cutoff)
        .collect();

    for date in &stale {
        remove_key(inner, &ledger_key(date))?;
    }
    if !stale.is_empty() {
        info!("Retention sweep removed {} ledger(s) before {}", stale.len(), cutoff);
    }
    Ok(stale.len())
}

fn write_value<T: Serialize>(
    inner: &mut RepositoryInner,
    key: &str,
    value: &T,
    retention_cutoff: &str,
) -> Result<(), TrackerError> {
    let json = serde_json::to_string(value)
        .map_err(|e| TrackerError::StorageUnavailable(format!("could not serialize '{}': {}", key, e)))?;

    match inner.store.set(key, &json) {
        Ok(()) => Ok(()),
        Err(StoreError::QuotaExceeded { needed, quota }) => {
            warn!(
                "Quota exceeded writing '{}' ({} of {} bytes); pruning old ledgers and retrying",
                key, needed, quota
            );
            prune_before(inner, retention_cutoff)?;
            match inner.store.set(key, &json) {
                Ok(()) => Ok(()),
                Err(StoreError::QuotaExceeded { .. }) => {
                    error!("Still over quota writing '{}' after retention sweep", key);
                    Err(TrackerError::StorageQuotaExceeded)
                }
                Err(StoreError::Unavailable(reason)) => {
                    fall_back_to_memory(inner, &reason);
                    inner.store.set(key, &json).map_err(TrackerError::from)
                }
                Err(other) => Err(other.into()),
            }
        }
        Err(StoreError::Unavailable(reason)) => {
            fall_back_to_memory(inner, &reason);
            inner.store.set(key, &json).map_err(TrackerError::from)
        }
        Err(other) => Err(other.into()),
    }
}

fn remove_key(inner: &mut RepositoryInner, key: &str) -> Result<(), TrackerError> {
    match inner.store.remove(key) {
        Ok(()) => Ok(()),
        Err(StoreError::Unavailable(reason)) => {
            fall_back_to_memory(inner, &reason);
            inner.store.remove(key).map_err(TrackerError::from)
        }
        Err(other) => Err(other.into()),
    }
}

/// Swap the durable store for memory, carrying over what is still readable
fn fall_back_to_memory(inner: &mut RepositoryInner, reason: &str) {
    error!("Storage unavailable ({}); continuing in memory-only mode", reason);

    let memory = MemoryStore::new();
    if let Ok(keys) = inner.store.keys() {
        for key in keys {
            if let Ok(Some(value)) = inner.store.get(&key) {
                let _ = memory.set(&key, &value);
            }
        }
    }

    inner.store = Box::new(memory);
    inner.memory_only = true;
}
