// Wire contracts for the CRM REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::appointment::{Appointment, AppointmentStatus};

/// Response envelope for the calendar-range endpoint
#[derive(Debug, Deserialize)]
pub struct CalendarResponse {
    pub items: Vec<Appointment>,
}

/// Standard paginated list envelope
#[derive(Debug, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

/// Partial update carrying only a rescheduled time window
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentTimesPatch {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Full appointment payload for create and form-edit submits
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentPayload {
    pub customer_id: String,
    pub location_id: String,
    pub service_id: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub cancelled_reason: Option<String>,
    pub notes: Option<String>,
}

/// An appointment that blocked a requested time change
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConflictItem {
    pub id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Error body shape shared by all endpoints.
///
/// The backend normalizes errors to `{error, message, detail, details,
/// conflicts}` but individual fields are frequently absent; everything is
/// optional and conflicts are validated per entry.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
    pub detail: Option<serde_json::Value>,
    pub details: Option<ErrorDetails>,
    #[serde(default)]
    pub conflicts: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorDetails {
    pub message: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message, by the dashboard's precedence:
    /// `details.message`, then `message`, then `detail`, then `error`.
    pub fn best_message(&self, fallback: &str) -> String {
        if let Some(message) = self.details.as_ref().and_then(|details| details.message.as_deref()) {
            if !message.is_empty() {
                return message.to_string();
            }
        }
        if let Some(message) = self.message.as_deref() {
            if !message.is_empty() {
                return message.to_string();
            }
        }
        if let Some(detail) = self.detail.as_ref().and_then(|value| value.as_str()) {
            if !detail.is_empty() {
                return detail.to_string();
            }
        }
        if let Some(error) = self.error.as_deref() {
            if !error.is_empty() {
                return error.to_string();
            }
        }
        fallback.to_string()
    }

    /// Well-formed conflict entries; malformed ones are dropped rather
    /// than failing the whole response.
    pub fn conflict_items(&self) -> Vec<ConflictItem> {
        self.conflicts
            .iter()
            .filter_map(|value| serde_json::from_value(value.clone()).ok())
            .collect()
    }
}
