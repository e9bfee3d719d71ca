//! # Hydration Session
//!
//! Wires the domain services to one store and one clock for the lifetime of
//! an application window, and collects the one-shot notices the presentation
//! layer shows (goal reached, new day, storage degraded).
//!
//! The day boundary is evaluated lazily: every operation first compares the
//! clock's date with the last one the session saw.

use anyhow::Result;
use log::{info, warn};
use shared::{AddIntakeResponse, CalculationResult, Goals, Notice, ProfileInput, ReportSnapshot, TrackingSummary};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::TrackerConfig;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::{ProfileService, ReportService, TrackerError, TrackingService};
use crate::storage::{JsonFileStore, KeyValueStore, StateRepository};

const MEMORY_ONLY_REASON: &str = "Storage is unavailable; changes are kept for this session only";

pub struct HydrationSession {
    repository: Arc<StateRepository>,
    config: TrackerConfig,
    profile_service: ProfileService,
    tracking_service: TrackingService,
    report_service: ReportService,
    last_calculation: Option<CalculationResult>,
    notices: Vec<Notice>,
    degraded_reported: bool,
}

impl HydrationSession {
    /// Load the config from the default location and open a session on it
    pub fn open_default() -> Result<Self> {
        let (config, config_dir) = TrackerConfig::load_default()?;
        Ok(Self::open(config, &config_dir))
    }

    /// Open a session over the JSON store in the configured data directory
    ///
    /// Never fails: an unusable directory degrades to memory-only mode.
    pub fn open(config: TrackerConfig, config_dir: &Path) -> Self {
        let data_dir = config.resolve_data_directory(config_dir);
        info!("Opening hydration session in {}", data_dir.display());

        let repository = match JsonFileStore::new(&data_dir) {
            Ok(store) => StateRepository::new(Box::new(store.with_quota(config.storage_quota_bytes))),
            Err(e) => {
                warn!("Could not open data directory {}: {}. Using memory-only mode.", data_dir.display(), e);
                StateRepository::in_memory()
            }
        };

        Self::with_repository(Arc::new(repository), Arc::new(SystemClock), config)
    }

    /// Open a session over an injected store and clock
    pub fn open_with_store(store: Box<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: TrackerConfig) -> Self {
        Self::with_repository(Arc::new(StateRepository::new(store)), clock, config)
    }

    fn with_repository(repository: Arc<StateRepository>, clock: Arc<dyn Clock>, config: TrackerConfig) -> Self {
        let retention_days = config.retention_days;
        let profile_service = ProfileService::new(repository.clone(), clock.clone(), retention_days);
        let tracking_service = TrackingService::new(repository.clone(), clock.clone(), retention_days);
        let report_service = ReportService::new(
            repository.clone(),
            clock,
            profile_service.clone(),
            tracking_service.clone(),
        );

        let last_calculation = profile_service.restore().unwrap_or_else(|e| {
            warn!("Could not restore goals: {}", e);
            profile_service.stored_result()
        });

        let mut session = Self {
            repository,
            config,
            last_calculation,
            profile_service,
            tracking_service,
            report_service,
            notices: Vec::new(),
            degraded_reported: false,
        };

        session.note_storage_state();
        session
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn is_memory_only(&self) -> bool {
        self.repository.is_memory_only()
    }

    /// Most recent calculation, restored from the stored profile and goals on open
    pub fn last_calculation(&self) -> Option<&CalculationResult> {
        self.last_calculation.as_ref()
    }

    pub fn goals(&self) -> Option<Goals> {
        self.profile_service.current_goals()
    }

    /// Validate the form, calculate targets and store them as the new goals
    pub fn calculate(&mut self, input: &ProfileInput) -> Result<CalculationResult, TrackerError> {
        self.observe_day();
        let result = self.profile_service.calculate(input);
        self.note_storage_state();

        let result = result?;
        self.last_calculation = Some(result.clone());
        Ok(result)
    }

    /// Record a drink from the raw amount field
    pub fn add_intake(&mut self, amount_input: &str) -> Result<AddIntakeResponse, TrackerError> {
        self.observe_day();
        let response = self.tracking_service.add_intake_input(amount_input);
        self.note_storage_state();

        let response = response?;
        if response.goal_reached {
            if let Some(goal_ml) = response.goal_ml {
                self.notices.push(Notice::GoalReached {
                    date: self.tracking_service.today(),
                    total_ml: response.total_ml,
                    goal_ml,
                });
            }
        }
        Ok(response)
    }

    pub fn delete_intake(&mut self, entry_id: &str) -> Result<TrackingSummary, TrackerError> {
        self.observe_day();
        let summary = self.tracking_service.delete_intake(entry_id);
        self.note_storage_state();
        summary
    }

    /// Delete by position in the newest-first list
    pub fn delete_intake_at(&mut self, display_index: usize) -> Result<TrackingSummary, TrackerError> {
        self.observe_day();
        let summary = self.tracking_service.delete_intake_at(display_index);
        self.note_storage_state();
        summary
    }

    pub fn reset_today(&mut self) -> Result<TrackingSummary, TrackerError> {
        self.observe_day();
        let reset = self.tracking_service.reset_today();
        self.note_storage_state();
        reset?;
        Ok(self.tracking_service.summary())
    }

    /// Forget the profile, goals and all intake history
    pub fn reset_all(&mut self) -> Result<(), TrackerError> {
        let cleared = self.repository.clear_all();
        self.note_storage_state();
        cleared?;

        self.last_calculation = None;
        info!("Session reset to a blank state");
        Ok(())
    }

    /// The application became visible again; re-check the date
    pub fn visibility_resumed(&mut self) -> TrackingSummary {
        self.observe_day();
        self.tracking_service.summary()
    }

    pub fn summary(&mut self) -> TrackingSummary {
        self.observe_day();
        self.tracking_service.summary()
    }

    pub fn snapshot(&mut self) -> ReportSnapshot {
        self.observe_day();
        self.report_service.snapshot()
    }

    pub fn export_history_csv<W: Write>(&self, writer: W) -> Result<usize> {
        self.report_service.export_history_csv(writer)
    }

    pub fn export_to_path(&self, directory: Option<&Path>) -> Result<PathBuf> {
        self.report_service.export_to_path(directory)
    }

    /// Drain pending notices, oldest first
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn close(self) {
        info!(
            "Closing hydration session ({} undelivered notice(s), memory only: {})",
            self.notices.len(),
            self.repository.is_memory_only()
        );
    }

    fn observe_day(&mut self) {
        if let Some(rollover) = self.tracking_service.check_day_boundary() {
            self.notices.push(Notice::DayRolledOver {
                previous_date: rollover.previous_date,
                current_date: rollover.current_date,
            });
        }
    }

    fn note_storage_state(&mut self) {
        if !self.degraded_reported && self.repository.is_memory_only() {
            self.degraded_reported = true;
            self.notices.push(Notice::StorageDegraded {
                reason: MEMORY_ONLY_REASON.to_string(),
            });
        }
    }
}
