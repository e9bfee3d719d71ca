//! Report and export domain logic.
//!
//! Read-only views over the persisted state for the report collaborator:
//! a snapshot of profile, goals and today's progress, and a CSV export of
//! every retained intake entry.

use anyhow::{Context, Result};
use log::{error, info};
use serde::Serialize;
use shared::ReportSnapshot;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::profile_service::ProfileService;
use crate::domain::tracking_service::TrackingService;
use crate::storage::StateRepository;

pub const HISTORY_CSV_HEADER: [&str; 5] = ["date", "time", "amount_ml", "entry_id", "created_at"];

#[derive(Serialize)]
struct HistoryRow<'a> {
    date: &'a str,
    time: &'a str,
    amount_ml: u32,
    entry_id: &'a str,
    created_at: &'a str,
}

#[derive(Clone)]
pub struct ReportService {
    repository: Arc<StateRepository>,
    clock: Arc<dyn Clock>,
    profile_service: ProfileService,
    tracking_service: TrackingService,
}

impl ReportService {
    pub fn new(
        repository: Arc<StateRepository>,
        clock: Arc<dyn Clock>,
        profile_service: ProfileService,
        tracking_service: TrackingService,
    ) -> Self {
        Self {
            repository,
            clock,
            profile_service,
            tracking_service,
        }
    }

    /// Current profile, goals and today's progress
    pub fn snapshot(&self) -> ReportSnapshot {
        let (recommendations, warnings) = match self.profile_service.stored_result() {
            Some(result) => (result.recommendations, result.warnings),
            None => (Vec::new(), Vec::new()),
        };

        ReportSnapshot {
            generated_at: self.clock.now().to_rfc3339(),
            profile: self.profile_service.current_profile(),
            goals: self.profile_service.current_goals(),
            recommendations,
            warnings,
            today: self.tracking_service.summary(),
        }
    }

    /// Write every retained entry as CSV, oldest day first
    ///
    /// Entries keep their recording order within a day. Returns the number
    /// of rows written, excluding the header.
    pub fn export_history_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let state = self.repository.load();
        let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        csv_writer.write_record(HISTORY_CSV_HEADER)?;

        let mut rows = 0;
        for ledger in state.ledgers.values() {
            for entry in &ledger.entries {
                csv_writer.serialize(HistoryRow {
                    date: &ledger.date,
                    time: &entry.time_label,
                    amount_ml: entry.amount_ml,
                    entry_id: &entry.id,
                    created_at: &entry.created_at,
                })?;
                rows += 1;
            }
        }

        csv_writer.flush()?;
        info!("Exported {} intake entries across {} day(s)", rows, state.ledgers.len());
        Ok(rows)
    }

    /// File name used by [`ReportService::export_to_path`]
    pub fn export_filename(&self) -> String {
        format!("hydration_history_{}.csv", self.clock.now().format("%Y%m%d"))
    }

    /// Export history into `directory`, or the user's documents folder
    pub fn export_to_path(&self, directory: Option<&Path>) -> Result<PathBuf> {
        let export_dir = match directory {
            Some(dir) => dir.to_path_buf(),
            None => default_export_directory().context("Could not determine default export directory")?,
        };

        if !export_dir.exists() {
            fs::create_dir_all(&export_dir)
                .with_context(|| format!("Failed to create export directory {:?}", export_dir))?;
        }

        let file_path = export_dir.join(self.export_filename());
        let file = fs::File::create(&file_path).map_err(|e| {
            error!("Failed to create export file {:?}: {}", file_path, e);
            e
        })?;
        let rows = self.export_history_csv(file)?;

        info!("Wrote {} rows to {:?}", rows, file_path);
        Ok(file_path)
    }
}

fn default_export_directory() -> Option<PathBuf> {
    dirs::document_dir().or_else(dirs::home_dir)
}
