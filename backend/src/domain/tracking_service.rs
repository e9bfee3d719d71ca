//! Daily intake tracking domain logic.
//!
//! Owns the rules for today's ledger: recording and deleting drinks, totals,
//! goal attainment and the day boundary.
//!
//! ## Ledger States
//!
//! ```text
//! Absent --add_intake--> Active --reset_today--> Absent
//!                          |
//!                          +--delete_intake--> Active (possibly empty)
//! ```
//!
//! ## Business Rules
//!
//! - A single drink is 1..=5000 ml, independent of the daily total
//! - "Today" is the clock's local date at the moment of each call; there is
//!   no timer, so a new day starts lazily on the first access after midnight
//! - GoalReached is edge-triggered: it is reported only by the add that moves
//!   the total from below the goal to at or above it
//! - Deletion is by stable entry ID; positional deletion addresses the
//!   newest-first display list and is resolved to an ID first
//! - Resetting today never touches the goal

use log::{debug, info, warn};
use shared::{AddIntakeResponse, DailyLedger, IntakeEntry, LedgerState, TrackingSummary, ValidationError};
use std::sync::{Arc, Mutex};

use crate::domain::clock::{Clock, TIME_LABEL_FORMAT};
use crate::domain::models::errors::TrackerError;
use crate::domain::models::intake::{display_order, entries_for_display, progress_percent, MAX_SINGLE_INTAKE_ML};
use crate::storage::StateRepository;

/// Reported when an access happens on a different day than the previous one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRollover {
    pub previous_date: String,
    pub current_date: String,
}

#[derive(Clone)]
pub struct TrackingService {
    repository: Arc<StateRepository>,
    clock: Arc<dyn Clock>,
    retention_days: u32,
    last_seen_date: Arc<Mutex<String>>,
}

impl TrackingService {
    pub fn new(repository: Arc<StateRepository>, clock: Arc<dyn Clock>, retention_days: u32) -> Self {
        let today = clock.today();
        Self {
            repository,
            clock,
            retention_days,
            last_seen_date: Arc::new(Mutex::new(today)),
        }
    }

    /// Today's local date, YYYY-MM-DD
    pub fn today(&self) -> String {
        self.clock.today()
    }

    /// Ledgers dated before this are removed by the retention sweep
    pub fn retention_cutoff(&self) -> String {
        self.clock.date_days_ago(self.retention_days)
    }

    fn goal_ml(&self) -> Option<u32> {
        self.repository.load_goals().map(|goals| goals.water_ml)
    }

    /// Record a drink in today's ledger
    pub fn add_intake(&self, amount_ml: i64) -> Result<AddIntakeResponse, TrackerError> {
        if amount_ml <= 0 || amount_ml > MAX_SINGLE_INTAKE_ML {
            return Err(TrackerError::validation(ValidationError::IntakeAmountOutOfRange(amount_ml)));
        }
        let amount_ml = amount_ml as u32;

        let now = self.clock.now();
        let today = now.date_naive().format(crate::domain::clock::DATE_FORMAT).to_string();
        let entry = IntakeEntry {
            id: IntakeEntry::generate_id(),
            amount_ml,
            time_label: now.format(TIME_LABEL_FORMAT).to_string(),
            created_at: now.to_rfc3339(),
        };

        let goal_ml = self.goal_ml();
        let cutoff = self.retention_cutoff();
        let stored_entry = entry.clone();
        let (before, after) = self.repository.update_ledger(&today, &cutoff, |slot| {
            let ledger = slot.get_or_insert_with(|| DailyLedger::new(today.clone()));
            let before = ledger.total_ml();
            ledger.entries.push(stored_entry);
            Ok((before, ledger.total_ml()))
        })?;

        let goal_reached = matches!(goal_ml, Some(goal) if before < goal && after >= goal);
        if goal_reached {
            info!("Daily goal reached on {}: {} ml", today, after);
        }
        debug!("Recorded {} ml on {} (total {} ml)", amount_ml, today, after);

        Ok(AddIntakeResponse {
            entry,
            total_ml: after,
            goal_ml,
            progress_percent: progress_percent(after, goal_ml),
            goal_reached,
        })
    }

    /// Parse free-text amount input, then record it
    pub fn add_intake_input(&self, amount_input: &str) -> Result<AddIntakeResponse, TrackerError> {
        let trimmed = amount_input.trim();
        let amount = trimmed.parse::<i64>().map_err(|_| {
            TrackerError::validation(ValidationError::NotANumber {
                field: "amount".to_string(),
                input: trimmed.to_string(),
            })
        })?;
        self.add_intake(amount)
    }

    /// Delete one of today's entries by its stable ID
    pub fn delete_intake(&self, entry_id: &str) -> Result<TrackingSummary, TrackerError> {
        let today = self.today();
        let cutoff = self.retention_cutoff();

        self.repository.update_ledger(&today, &cutoff, |slot| {
            let ledger = slot
                .as_mut()
                .ok_or_else(|| TrackerError::EntryNotFound(entry_id.to_string()))?;
            let position = ledger
                .entries
                .iter()
                .position(|entry| entry.id == entry_id)
                .ok_or_else(|| TrackerError::EntryNotFound(entry_id.to_string()))?;
            let removed = ledger.entries.remove(position);
            info!("Deleted {} ml entry {} from {}", removed.amount_ml, removed.id, today);
            Ok(())
        })?;

        Ok(self.summary())
    }

    /// Delete the entry at `display_index` in the newest-first list
    pub fn delete_intake_at(&self, display_index: usize) -> Result<TrackingSummary, TrackerError> {
        let today = self.today();
        let cutoff = self.retention_cutoff();

        self.repository.update_ledger(&today, &cutoff, |slot| {
            let missing = || TrackerError::EntryNotFound(format!("display position {}", display_index));
            let ledger = slot.as_mut().ok_or_else(missing)?;
            let storage_index = *display_order(&ledger.entries).get(display_index).ok_or_else(missing)?;
            let removed = ledger.entries.remove(storage_index);
            info!(
                "Deleted {} ml entry {} (display position {}) from {}",
                removed.amount_ml, removed.id, display_index, today
            );
            Ok(())
        })?;

        Ok(self.summary())
    }

    /// Clear today's ledger back to the absent state
    pub fn reset_today(&self) -> Result<(), TrackerError> {
        let today = self.today();
        let cutoff = self.retention_cutoff();
        self.repository.update_ledger(&today, &cutoff, |slot| {
            *slot = None;
            Ok(())
        })?;
        info!("Reset intake for {}", today);
        Ok(())
    }

    pub fn today_ledger(&self) -> Option<DailyLedger> {
        self.repository.load_ledger(&self.today())
    }

    /// Sum of today's entries; 0 when nothing was recorded
    pub fn total_today(&self) -> u32 {
        self.today_ledger().map(|ledger| ledger.total_ml()).unwrap_or(0)
    }

    pub fn ledger_state(&self) -> LedgerState {
        match self.today_ledger() {
            Some(_) => LedgerState::Active,
            None => LedgerState::Absent,
        }
    }

    pub fn summary(&self) -> TrackingSummary {
        let date = self.today();
        let ledger = self.repository.load_ledger(&date);
        let goal_ml = self.goal_ml();
        let total_ml = ledger.as_ref().map(|l| l.total_ml()).unwrap_or(0);

        TrackingSummary {
            state: if ledger.is_some() { LedgerState::Active } else { LedgerState::Absent },
            entries: ledger.as_ref().map(entries_for_display).unwrap_or_default(),
            total_ml,
            goal_ml,
            progress_percent: progress_percent(total_ml, goal_ml),
            date,
        }
    }

    /// Compare today's date with the last one observed
    ///
    /// Called when the application becomes visible again. Nothing is carried
    /// over from the previous day.
    pub fn check_day_boundary(&self) -> Option<DayRollover> {
        let today = self.today();
        let mut last_seen = self.last_seen_date.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if *last_seen == today {
            return None;
        }
        if today < *last_seen {
            warn!("Clock moved backwards from {} to {}", last_seen, today);
        }

        let rollover = DayRollover {
            previous_date: std::mem::replace(&mut *last_seen, today.clone()),
            current_date: today,
        };
        info!("Day changed from {} to {}", rollover.previous_date, rollover.current_date);
        Some(rollover)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::Duration;
    use shared::Goals;

    fn setup(goal_ml: Option<u32>) -> (TrackingService, Arc<StateRepository>, FixedClock) {
        let repository = Arc::new(StateRepository::new(Box::new(MemoryStore::new())));
        if let Some(water_ml) = goal_ml {
            let goals = Goals {
                water_ml,
                sodium_mg: 2000,
                potassium_mg: 3400,
                magnesium_mg: 420,
                calcium_mg: 1000,
                calculated_at: None,
            };
            repository
                .save(
                    &shared::PersistedState {
                        goals: Some(goals),
                        ..Default::default()
                    },
                    "2000-01-01",
                )
                .unwrap();
        }
        let clock = FixedClock::at("2025-01-20T08:00:00+00:00").unwrap();
        let service = TrackingService::new(repository.clone(), Arc::new(clock.clone()), 30);
        (service, repository, clock)
    }

    #[test]
    fn test_add_intake_updates_total() {
        let (service, _repo, _clock) = setup(Some(2000));
        assert_eq!(service.total_today(), 0);
        assert_eq!(service.ledger_state(), LedgerState::Absent);

        let response = service.add_intake(250).unwrap();
        assert_eq!(response.total_ml, 250);
        assert_eq!(response.entry.time_label, "08:00");
        assert_eq!(response.progress_percent, 13);
        assert_eq!(service.total_today(), 250);
        assert_eq!(service.ledger_state(), LedgerState::Active);
    }

    #[test]
    fn test_add_intake_rejects_out_of_range() {
        let (service, _repo, _clock) = setup(Some(2000));
        service.add_intake(500).unwrap();

        for amount in [0, -1, 5001] {
            let err = service.add_intake(amount).unwrap_err();
            assert!(matches!(
                err.validation_errors(),
                [ValidationError::IntakeAmountOutOfRange(a)] if *a == amount
            ));
        }
        assert_eq!(service.total_today(), 500);

        service.add_intake(5000).unwrap();
        assert_eq!(service.total_today(), 5500);
    }

    #[test]
    fn test_add_intake_input_rejects_text() {
        let (service, _repo, _clock) = setup(None);
        let err = service.add_intake_input("a glass").unwrap_err();
        assert!(matches!(err.validation_errors(), [ValidationError::NotANumber { .. }]));
        assert_eq!(service.add_intake_input(" 330 ").unwrap().total_ml, 330);
    }

    #[test]
    fn test_goal_reached_fires_once() {
        let (service, _repo, _clock) = setup(Some(2000));
        let fired: Vec<bool> = [1000, 1000, 500]
            .into_iter()
            .map(|amount| service.add_intake(amount).unwrap().goal_reached)
            .collect();
        assert_eq!(fired, vec![false, true, false]);
    }

    #[test]
    fn test_goal_reached_again_after_dropping_below() {
        let (service, _repo, _clock) = setup(Some(1000));
        let first = service.add_intake(1000).unwrap();
        assert!(first.goal_reached);

        service.delete_intake(&first.entry.id).unwrap();
        assert!(service.add_intake(1200).unwrap().goal_reached);
    }

    #[test]
    fn test_no_goal_never_fires() {
        let (service, _repo, _clock) = setup(None);
        let response = service.add_intake(5000).unwrap();
        assert!(!response.goal_reached);
        assert_eq!(response.goal_ml, None);
        assert_eq!(response.progress_percent, 0);
    }

    #[test]
    fn test_delete_to_empty_stays_active() {
        let (service, _repo, _clock) = setup(Some(2000));
        let added = service.add_intake(300).unwrap();

        let summary = service.delete_intake(&added.entry.id).unwrap();
        assert_eq!(summary.total_ml, 0);
        assert!(summary.entries.is_empty());
        assert_eq!(summary.state, LedgerState::Active);
    }

    #[test]
    fn test_delete_unknown_entry() {
        let (service, _repo, _clock) = setup(Some(2000));
        assert!(matches!(service.delete_intake("nope"), Err(TrackerError::EntryNotFound(_))));

        service.add_intake(300).unwrap();
        assert!(matches!(service.delete_intake("nope"), Err(TrackerError::EntryNotFound(_))));
        assert_eq!(service.total_today(), 300);
    }

    #[test]
    fn test_delete_by_display_position_maps_to_storage_entry() {
        let (service, _repo, clock) = setup(Some(2000));
        service.add_intake(100).unwrap();
        clock.advance(Duration::hours(2));
        service.add_intake(200).unwrap();
        clock.advance(Duration::hours(2));
        service.add_intake(300).unwrap();

        // Display: 300, 200, 100. Position 1 is the 200 ml entry.
        let summary = service.delete_intake_at(1).unwrap();
        let remaining: Vec<u32> = summary.entries.iter().map(|e| e.amount_ml).collect();
        assert_eq!(remaining, vec![300, 100]);

        assert!(service.delete_intake_at(5).is_err());
    }

    #[test]
    fn test_delete_by_display_position_with_shared_timestamp() {
        let (service, _repo, _clock) = setup(Some(2000));
        service.add_intake(100).unwrap();
        service.add_intake(200).unwrap();

        let summary = service.summary();
        assert_eq!(summary.entries[0].amount_ml, 200);

        let summary = service.delete_intake_at(0).unwrap();
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.entries[0].amount_ml, 100);
    }

    #[test]
    fn test_reset_today_keeps_goal() {
        let (service, repo, _clock) = setup(Some(2000));
        service.add_intake(800).unwrap();

        service.reset_today().unwrap();
        assert_eq!(service.total_today(), 0);
        assert_eq!(service.ledger_state(), LedgerState::Absent);
        assert_eq!(repo.load_goals().map(|g| g.water_ml), Some(2000));
        assert_eq!(service.summary().goal_ml, Some(2000));
    }

    #[test]
    fn test_new_day_starts_fresh_ledger() {
        let (service, repo, clock) = setup(Some(2000));
        service.add_intake(1500).unwrap();

        clock.advance(Duration::days(1));
        assert_eq!(service.total_today(), 0);
        assert_eq!(service.ledger_state(), LedgerState::Absent);

        // Goal edge is evaluated against the new day's total
        assert!(!service.add_intake(1000).unwrap().goal_reached);
        assert!(service.add_intake(1000).unwrap().goal_reached);

        assert_eq!(repo.load_ledger("2025-01-20").unwrap().total_ml(), 1500);
        assert_eq!(repo.load_ledger("2025-01-21").unwrap().total_ml(), 2000);
    }

    #[test]
    fn test_check_day_boundary() {
        let (service, _repo, clock) = setup(None);
        assert_eq!(service.check_day_boundary(), None);

        clock.advance(Duration::hours(20));
        assert_eq!(
            service.check_day_boundary(),
            Some(DayRollover {
                previous_date: "2025-01-20".to_string(),
                current_date: "2025-01-21".to_string(),
            })
        );
        assert_eq!(service.check_day_boundary(), None);
    }

    #[test]
    fn test_clock_moving_backwards_rolls_over() {
        let (service, repo, clock) = setup(None);
        service.add_intake(500).unwrap();
        assert_eq!(service.check_day_boundary(), None);

        clock.set(chrono::DateTime::parse_from_rfc3339("2025-01-19T23:30:00+00:00").unwrap());
        assert_eq!(
            service.check_day_boundary(),
            Some(DayRollover {
                previous_date: "2025-01-20".to_string(),
                current_date: "2025-01-19".to_string(),
            })
        );
        assert_eq!(service.check_day_boundary(), None);
        assert_eq!(service.total_today(), 0);
        assert_eq!(repo.load_ledger("2025-01-20").unwrap().total_ml(), 500);
    }

    #[test]
    fn test_retention_cutoff() {
        let (service, _repo, _clock) = setup(None);
        assert_eq!(service.retention_cutoff(), "2024-12-21");
    }
}
