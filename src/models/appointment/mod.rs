// Appointment module
// Read-mostly cached copy of the backend's appointment record

use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an appointment, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// All statuses, in the order the form presents them
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Booked,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    /// Human-readable label for form dropdowns
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "Booked",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::NoShow => "No show",
        }
    }
}

/// Display-only customer reference attached to an appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
}

/// Display-only service reference; also used for the service catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: String,
    pub name: String,
    pub duration_min: Option<i64>,
    pub price: Option<f64>,
}

/// Salon appointment as served by the calendar-range endpoint.
///
/// Timestamps are UTC on the wire and converted to local time for all
/// display and day-bucketing purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub cancelled_reason: Option<String>,
    pub notes: Option<String>,
    pub customer: Customer,
    pub service: Option<ServiceSummary>,
    pub location_id: String,
}

impl Appointment {
    /// Start time converted to the local timezone
    pub fn local_start(&self) -> DateTime<Local> {
        self.starts_at.with_timezone(&Local)
    }

    /// End time converted to the local timezone
    pub fn local_end(&self) -> DateTime<Local> {
        self.ends_at.with_timezone(&Local)
    }

    pub fn duration(&self) -> Duration {
        self.ends_at - self.starts_at
    }

    /// Duration in whole minutes, falling back to the service's configured
    /// duration (or 60) when the stored times are degenerate.
    pub fn duration_minutes_or_default(&self) -> i64 {
        let minutes = self.duration().num_minutes();
        if minutes > 0 {
            minutes
        } else {
            self.service
                .as_ref()
                .and_then(|service| service.duration_min)
                .filter(|minutes| *minutes > 0)
                .unwrap_or(60)
        }
    }
}
