//! # User Action Dispatch
//!
//! Translates presentation-layer actions into session operations and domain
//! results into a serializable [`ViewState`], the way a REST handler maps a
//! request to a service call and a status code.

use log::{error, info};
use serde::{Deserialize, Serialize};
use shared::{CalculationResult, Notice, ProfileInput, TrackingSummary, ValidationError};

use crate::domain::TrackerError;
use crate::session::HydrationSession;

/// Everything a user can do from the main screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "kebab-case")]
pub enum UserAction {
    Calculate(ProfileInput),
    /// Raw text of the amount field
    AddIntake(String),
    DeleteIntake(String),
    /// Position in the newest-first entry list
    DeleteIntakeAt(usize),
    ResetToday,
    ResetAll,
    VisibilityResumed,
}

/// What the screen should show after an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub calculation: Option<CalculationResult>,
    pub tracking: TrackingSummary,
    pub notices: Vec<Notice>,
    pub memory_only: bool,
}

/// A failed action; the previous view stays valid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionError {
    pub message: String,
    /// Per-field problems to highlight; empty for storage errors
    pub validation_errors: Vec<ValidationError>,
    /// Notices raised before the failure, e.g. storage degradation
    pub notices: Vec<Notice>,
}

pub struct ActionDispatcher {
    session: HydrationSession,
}

impl ActionDispatcher {
    pub fn new(session: HydrationSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &HydrationSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut HydrationSession {
        &mut self.session
    }

    /// Initial view on application start
    pub fn view(&mut self) -> ViewState {
        let tracking = self.session.summary();
        self.build_view(tracking)
    }

    pub fn dispatch(&mut self, action: UserAction) -> Result<ViewState, ActionError> {
        info!("Dispatching {:?}", action);

        let outcome = match action {
            UserAction::Calculate(input) => self.session.calculate(&input).map(|_| self.session.summary()),
            UserAction::AddIntake(amount) => self.session.add_intake(&amount).map(|_| self.session.summary()),
            UserAction::DeleteIntake(entry_id) => self.session.delete_intake(&entry_id),
            UserAction::DeleteIntakeAt(display_index) => self.session.delete_intake_at(display_index),
            UserAction::ResetToday => self.session.reset_today(),
            UserAction::ResetAll => self.session.reset_all().map(|_| self.session.summary()),
            UserAction::VisibilityResumed => Ok(self.session.visibility_resumed()),
        };

        match outcome {
            Ok(tracking) => Ok(self.build_view(tracking)),
            Err(e) => {
                error!("Action failed: {}", e);
                Err(self.build_error(e))
            }
        }
    }

    pub fn close(self) {
        self.session.close();
    }

    fn build_view(&mut self, tracking: TrackingSummary) -> ViewState {
        ViewState {
            calculation: self.session.last_calculation().cloned(),
            tracking,
            notices: self.session.take_notices(),
            memory_only: self.session.is_memory_only(),
        }
    }

    fn build_error(&mut self, error: TrackerError) -> ActionError {
        let message = match &error {
            TrackerError::Validation(errors) => errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
            TrackerError::StorageQuotaExceeded => {
                "Storage is full. Old history was removed but there is still not enough space.".to_string()
            }
            other => other.to_string(),
        };

        ActionError {
            message,
            validation_errors: error.validation_errors().to_vec(),
            notices: self.session.take_notices(),
        }
    }
}
