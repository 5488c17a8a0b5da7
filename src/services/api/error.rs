// API error taxonomy
// Maps HTTP/application failures onto the calendar's recovery paths

use thiserror::Error;

use super::contracts::{ConflictItem, ErrorBody};

/// Application error code the backend uses for scheduling conflicts
pub const OVERLAP_ERROR_CODE: &str = "APPOINTMENT_OVERLAP";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested time change overlaps existing appointments.
    /// Recoverable: the UI lists the blockers and leaves local state alone.
    #[error("time slot conflicts with another appointment")]
    Conflict { conflicts: Vec<ConflictItem> },

    /// Session is no longer valid; no further mutations may be attempted.
    #[error("session expired, please sign in again")]
    AuthExpired,

    /// Any other non-success response, with the backend's best message
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success response.
    ///
    /// 401 means the session died; 409 is a scheduling conflict whether or
    /// not the body carried the `APPOINTMENT_OVERLAP` code (older backends
    /// only set the status).
    pub fn from_response(status: u16, body: ErrorBody, fallback: &str) -> Self {
        match status {
            401 => ApiError::AuthExpired,
            409 => ApiError::Conflict {
                conflicts: body.conflict_items(),
            },
            _ => ApiError::Status {
                status,
                message: body.best_message(fallback),
            },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict { .. })
    }
}
