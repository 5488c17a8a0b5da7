// CRM REST API client
// Blocking client; callers run requests on worker threads so the UI
// thread never waits on the network.

pub mod contracts;
pub mod error;

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::models::appointment::{Appointment, ServiceSummary};
use crate::models::settings::{DefaultLocation, TenantSettings};
use crate::services::config::AppConfig;

use self::contracts::{
    AppointmentPayload, AppointmentTimesPatch, CalendarResponse, ErrorBody, Paginated,
};
use self::error::ApiError;

/// Thin wrapper over the CRM endpoints the calendar consumes.
///
/// Cheap to clone; worker threads each take their own copy.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    tenant_id: Option<String>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to build CRM API HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            tenant_id: config.tenant_id.clone(),
        })
    }

    /// Appointments intersecting `[from, to)` at one location
    pub fn calendar_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        location_id: &str,
    ) -> Result<Vec<Appointment>, ApiError> {
        let request = self
            .client
            .get(self.url("/crm/calendar"))
            .query(&[
                ("from_dt", from.to_rfc3339()),
                ("to_dt", to.to_rfc3339()),
                ("location_id", location_id.to_string()),
            ]);

        let response: CalendarResponse =
            self.execute(request, "Unable to load calendar.")?;
        Ok(response.items)
    }

    /// Reschedule an appointment; only the time window changes
    pub fn patch_appointment_times(
        &self,
        appointment_id: &str,
        patch: &AppointmentTimesPatch,
        fallback: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .patch(self.url(&format!("/crm/appointments/{appointment_id}")))
            .json(patch);
        self.execute_expecting_body_ignored(request, fallback)
    }

    pub fn create_appointment(&self, payload: &AppointmentPayload) -> Result<(), ApiError> {
        let request = self.client.post(self.url("/crm/appointments")).json(payload);
        self.execute_expecting_body_ignored(request, "Unable to create appointment.")
    }

    pub fn update_appointment(
        &self,
        appointment_id: &str,
        payload: &AppointmentPayload,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .patch(self.url(&format!("/crm/appointments/{appointment_id}")))
            .json(payload);
        self.execute_expecting_body_ignored(request, "Unable to save appointment.")
    }

    /// Full service catalog for the appointment form, sorted by name
    pub fn list_services(&self) -> Result<Vec<ServiceSummary>, ApiError> {
        let request = self.client.get(self.url("/crm/services")).query(&[
            ("page", "1"),
            ("page_size", "200"),
            ("include_inactive", "true"),
            ("sort", "name"),
            ("order", "asc"),
        ]);

        let response: Paginated<ServiceSummary> =
            self.execute(request, "Unable to load services.")?;
        Ok(response.items)
    }

    pub fn tenant_settings(&self) -> Result<TenantSettings, ApiError> {
        let request = self.client.get(self.url("/crm/settings"));
        self.execute(request, "Unable to load settings.")
    }

    pub fn default_location(&self) -> Result<DefaultLocation, ApiError> {
        let request = self.client.get(self.url("/crm/locations/default"));
        self.execute(request, "Unable to load default location.")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request;
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        if let Some(tenant) = &self.tenant_id {
            request = request.header("X-Tenant-ID", tenant);
        }
        request
    }

    fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = self.with_auth(request).send()?;
        let response = Self::check_status(response, fallback)?;
        response
            .json::<T>()
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// For mutations: the success body (the updated record) is ignored
    /// beyond confirming the request landed; callers reload instead.
    fn execute_expecting_body_ignored(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<(), ApiError> {
        let response = self.with_auth(request).send()?;
        Self::check_status(response, fallback)?;
        Ok(())
    }

    fn check_status(response: Response, fallback: &str) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<ErrorBody>().unwrap_or_default();
        Err(ApiError::from_response(status.as_u16(), body, fallback))
    }
}
