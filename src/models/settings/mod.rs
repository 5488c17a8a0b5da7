// Settings module
// Read-only tenant and location inputs consumed at load time

use serde::Deserialize;

/// Which calendar layout the view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarViewType {
    #[default]
    Week,
    Day,
}

impl CalendarViewType {
    /// Parse the backend's `calendar_default_view` value; anything
    /// unrecognized falls back to the week view.
    pub fn parse(value: &str) -> Self {
        match value {
            "day" => CalendarViewType::Day,
            _ => CalendarViewType::Week,
        }
    }
}

/// Tenant-level settings; the calendar only consumes the default view,
/// the rest is kept for display headers.
#[derive(Debug, Clone, Deserialize)]
pub struct TenantSettings {
    pub tenant_id: String,
    pub business_name: Option<String>,
    pub default_timezone: String,
    pub currency: String,
    pub calendar_default_view: String,
    pub default_location_id: Option<String>,
}

/// The tenant's default location; all calendar queries are scoped to it.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultLocation {
    pub id: String,
    pub name: String,
    pub timezone: String,
    pub allow_overlaps: bool,
    /// Opaque business-hours blob, not interpreted by the client
    pub hours_json: Option<serde_json::Value>,
}
