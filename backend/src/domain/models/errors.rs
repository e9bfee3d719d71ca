use shared::ValidationError;

use crate::storage::StoreError;

/// Errors surfaced by the tracker's domain operations
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// User input was out of range or not a number; blocks only this operation
    #[error("Invalid input: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    /// Still over quota after one retention sweep
    #[error("Storage quota exceeded even after removing old ledgers")]
    StorageQuotaExceeded,
    #[error("Intake entry not found: {0}")]
    EntryNotFound(String),
}

impl TrackerError {
    pub fn validation(error: ValidationError) -> Self {
        TrackerError::Validation(vec![error])
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            TrackerError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<StoreError> for TrackerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::QuotaExceeded { .. } => TrackerError::StorageQuotaExceeded,
            other => TrackerError::StorageUnavailable(other.to_string()),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
