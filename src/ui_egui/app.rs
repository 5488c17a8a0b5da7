// Application shell
// Owns all calendar state, drains schedule events once per frame and
// routes grid interactions to the schedule service. Mutations are
// optimistic only in feedback (the source block dims); appointment data
// changes exclusively by reloading the visible range after the backend
// confirms.

use chrono::{Duration, Local, NaiveDate, Utc};
use egui_extras::DatePickerButton;

use crate::models::appointment::{Appointment, ServiceSummary};
use crate::models::settings::{CalendarViewType, TenantSettings};
use crate::services::api::error::ApiError;
use crate::services::api::ApiClient;
use crate::services::config::AppConfig;
use crate::services::schedule::{MutationKind, ScheduleEvent, ScheduleService};
use crate::ui_egui::appointment_form::{
    render_appointment_form, AppointmentFormState, FormAction, FormMode,
};
use crate::ui_egui::conflict::ConflictBanner;
use crate::ui_egui::toast::ToastManager;
use crate::ui_egui::views::calendar_view::{CalendarGrid, TimeChangeRequest};
use crate::utils::date::{day_start, format_range_label, start_of_week};

const CONFLICT_HEADLINE: &str = "That time overlaps other appointments.";

pub struct CalendarApp {
    schedule: Option<ScheduleService>,
    init_error: Option<String>,
    web_base_url: String,

    appointments: Vec<Appointment>,
    services: Vec<ServiceSummary>,
    settings: Option<TenantSettings>,
    /// Config override wins; otherwise filled from the default location
    location_id: Option<String>,
    location_error: Option<String>,

    view: CalendarViewType,
    /// Once the user picks a view, tenant defaults stop applying
    view_overridden: bool,
    anchor_day: NaiveDate,

    grid: CalendarGrid,
    toasts: ToastManager,
    conflicts: ConflictBanner,
    form: Option<AppointmentFormState>,

    needs_reload: bool,
    loading: bool,
    load_error: Option<String>,
    auth_expired: bool,
}

impl CalendarApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let (schedule, init_error) = match ApiClient::new(&config) {
            Ok(api) => {
                let schedule = ScheduleService::new(api);
                schedule.begin_bootstrap();
                (Some(schedule), None)
            }
            Err(err) => {
                log::error!("Failed to initialize API client: {err:#}");
                (None, Some(format!("{err:#}")))
            }
        };

        Self {
            schedule,
            init_error,
            web_base_url: config.web_base_url.clone(),
            appointments: Vec::new(),
            services: Vec::new(),
            settings: None,
            location_id: config.location_id.clone(),
            location_error: None,
            view: CalendarViewType::default(),
            view_overridden: false,
            anchor_day: Local::now().date_naive(),
            grid: CalendarGrid::new(),
            toasts: ToastManager::new(),
            conflicts: ConflictBanner::default(),
            form: None,
            needs_reload: true,
            loading: false,
            load_error: None,
            auth_expired: false,
        }
    }

    /// Days currently on screen, left to right
    fn visible_days(&self) -> Vec<NaiveDate> {
        match self.view {
            CalendarViewType::Week => {
                let monday = start_of_week(self.anchor_day);
                (0..7).map(|offset| monday + Duration::days(offset)).collect()
            }
            CalendarViewType::Day => vec![self.anchor_day],
        }
    }

    fn apply_event(&mut self, event: ScheduleEvent) {
        match event {
            ScheduleEvent::CalendarLoaded { result, .. } => {
                self.loading = false;
                match result {
                    Ok(appointments) => {
                        self.appointments = appointments;
                        self.load_error = None;
                        self.close_form_for_vanished_appointment();
                    }
                    Err(ApiError::AuthExpired) => self.auth_expired = true,
                    Err(err) => self.load_error = Some(err.to_string()),
                }
            }
            ScheduleEvent::MutationFinished { kind, result, .. } => match result {
                Ok(()) => self.needs_reload = true,
                Err(ApiError::Conflict { conflicts }) => {
                    // Local state was never patched; listing the blockers
                    // is the whole rollback.
                    self.conflicts.show_conflict(CONFLICT_HEADLINE, conflicts);
                }
                Err(ApiError::AuthExpired) => self.auth_expired = true,
                Err(err) => {
                    log::warn!("{kind:?} failed: {err}");
                    self.toasts.error(err.to_string());
                }
            },
            ScheduleEvent::AppointmentCreated { result } => {
                self.finish_form_submit(result, "Appointment created");
            }
            ScheduleEvent::AppointmentSaved { result, .. } => {
                self.finish_form_submit(result, "Appointment saved");
            }
            ScheduleEvent::ServicesLoaded { result } => match result {
                Ok(services) => self.services = services,
                Err(err) => log::warn!("Service catalog load failed: {err}"),
            },
            ScheduleEvent::SettingsLoaded { result } => match result {
                Ok(settings) => {
                    if !self.view_overridden {
                        self.view = CalendarViewType::parse(&settings.calendar_default_view);
                    }
                    self.settings = Some(settings);
                }
                Err(err) => log::warn!("Settings load failed: {err}"),
            },
            ScheduleEvent::DefaultLocationLoaded { result } => match result {
                Ok(location) => {
                    if self.location_id.is_none() {
                        self.location_id = Some(location.id);
                        self.needs_reload = true;
                    }
                }
                Err(err) => {
                    if self.location_id.is_none() {
                        log::warn!("Default location load failed: {err}");
                        self.location_error =
                            Some("Default location is not available.".to_string());
                    }
                }
            },
        }
    }

    fn finish_form_submit(&mut self, result: Result<(), ApiError>, success_message: &str) {
        match result {
            Ok(()) => {
                self.toasts.success(success_message);
                self.form = None;
                self.needs_reload = true;
            }
            Err(ApiError::AuthExpired) => self.auth_expired = true,
            Err(err) => {
                let message = if err.is_conflict() {
                    if let ApiError::Conflict { conflicts } = &err {
                        self.conflicts
                            .show_conflict(CONFLICT_HEADLINE, conflicts.clone());
                    }
                    CONFLICT_HEADLINE.to_string()
                } else {
                    err.to_string()
                };
                if let Some(form) = &mut self.form {
                    form.submitting = false;
                    form.error_message = Some(message);
                } else {
                    self.toasts.error(message);
                }
            }
        }
    }

    /// An edit form for an appointment the reload no longer returned has
    /// nothing to save into; close it unless a submit is pending.
    fn close_form_for_vanished_appointment(&mut self) {
        let vanished = match &self.form {
            Some(form) if !form.submitting => match &form.mode {
                FormMode::Edit { appointment_id } => !self
                    .appointments
                    .iter()
                    .any(|appointment| &appointment.id == appointment_id),
                FormMode::Create => false,
            },
            _ => false,
        };
        if vanished {
            self.form = None;
            self.toasts.info("Appointment no longer exists");
        }
    }

    fn reload_if_needed(&mut self) {
        if !self.needs_reload || self.auth_expired {
            return;
        }
        let Some(location_id) = self.location_id.clone() else {
            return;
        };

        let days = self.visible_days();
        let (Some(first), Some(last)) = (days.first(), days.last()) else {
            return;
        };
        let from = day_start(*first).with_timezone(&Utc);
        let to = (day_start(*last) + Duration::days(1)).with_timezone(&Utc);

        let Some(schedule) = &mut self.schedule else {
            return;
        };
        schedule.begin_reload(from, to, &location_id);
        self.needs_reload = false;
        self.loading = true;
    }

    fn submit_time_change(&mut self, request: TimeChangeRequest, kind: MutationKind) {
        let Some(schedule) = &mut self.schedule else {
            return;
        };
        let accepted = schedule.begin_time_patch(
            &request.appointment_id,
            request.starts_at,
            request.ends_at,
            kind,
        );
        if !accepted {
            self.toasts.info("Still saving the previous change");
        }
    }

    fn submit_form(&mut self) {
        let Some(location_id) = self.location_id.clone() else {
            if let Some(form) = &mut self.form {
                form.error_message = Some("No location available yet".to_string());
            }
            return;
        };
        let Some(form) = &mut self.form else {
            return;
        };

        match form.payload(&location_id) {
            Ok(payload) => {
                let Some(schedule) = &mut self.schedule else {
                    return;
                };
                match form.mode.clone() {
                    FormMode::Create => {
                        schedule.begin_create(payload);
                        form.submitting = true;
                        form.error_message = None;
                    }
                    FormMode::Edit { appointment_id } => {
                        if schedule.begin_save(&appointment_id, payload) {
                            form.submitting = true;
                            form.error_message = None;
                        } else {
                            form.error_message =
                                Some("Still saving the previous change".to_string());
                        }
                    }
                }
            }
            Err(message) => form.error_message = Some(message),
        }
    }

    fn render_navigation(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let step = match self.view {
                CalendarViewType::Week => 7,
                CalendarViewType::Day => 1,
            };

            if ui.button("◀").clicked() {
                self.anchor_day -= Duration::days(step);
                self.needs_reload = true;
            }
            if ui.button("Today").clicked() {
                self.anchor_day = Local::now().date_naive();
                self.needs_reload = true;
                self.grid.reset_scroll();
            }
            if ui.button("▶").clicked() {
                self.anchor_day += Duration::days(step);
                self.needs_reload = true;
            }

            let picker = ui.add(DatePickerButton::new(&mut self.anchor_day).id_source("nav_date"));
            if picker.changed() {
                self.needs_reload = true;
            }

            ui.separator();

            if ui
                .selectable_label(self.view == CalendarViewType::Week, "Week")
                .clicked()
                && self.view != CalendarViewType::Week
            {
                self.view = CalendarViewType::Week;
                self.view_overridden = true;
                self.needs_reload = true;
            }
            if ui
                .selectable_label(self.view == CalendarViewType::Day, "Day")
                .clicked()
                && self.view != CalendarViewType::Day
            {
                self.view = CalendarViewType::Day;
                self.view_overridden = true;
                self.needs_reload = true;
            }

            ui.separator();
            ui.label(format_range_label(&self.visible_days()));

            if self.loading {
                ui.spinner();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(settings) = &self.settings {
                    if let Some(name) = &settings.business_name {
                        ui.label(name);
                    }
                }
            });
        });
    }

    fn render_blocking_error(ctx: &egui::Context, headline: &str, detail: &str) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.heading(headline);
                ui.label(detail);
            });
        });
    }
}

impl eframe::App for CalendarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(schedule) = &mut self.schedule {
            let events = schedule.drain();
            for event in events {
                self.apply_event(event);
            }
        }
        self.reload_if_needed();

        if let Some(error) = &self.init_error {
            let error = error.clone();
            Self::render_blocking_error(ctx, "Unable to start", &error);
            return;
        }
        if self.auth_expired {
            Self::render_blocking_error(
                ctx,
                "Session expired",
                "Sign in again from the CRM dashboard, then restart the calendar.",
            );
            return;
        }

        self.conflicts.render(ctx, &self.web_base_url);

        egui::TopBottomPanel::top("navigation").show(ctx, |ui| {
            self.render_navigation(ui);
        });

        let interaction = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(error) = &self.location_error {
                    ui.colored_label(egui::Color32::RED, error);
                }
                if let Some(error) = &self.load_error {
                    ui.colored_label(egui::Color32::RED, error);
                }

                let days = self.visible_days();
                let schedule = &self.schedule;
                let mutating = |appointment_id: &str| {
                    schedule
                        .as_ref()
                        .is_some_and(|s| s.is_mutating(appointment_id))
                };
                self.grid.render(ui, &days, &self.appointments, &mutating)
            })
            .inner;

        if let Some((day, minute)) = interaction.open_create_at {
            if self.form.is_none() {
                self.form = Some(AppointmentFormState::for_create(day, minute));
            }
        }
        if let Some(appointment_id) = interaction.open_edit {
            if self.form.is_none() {
                if let Some(appointment) = self
                    .appointments
                    .iter()
                    .find(|appointment| appointment.id == appointment_id)
                {
                    self.form = Some(AppointmentFormState::for_edit(appointment));
                }
            }
        }
        if let Some(request) = interaction.move_request {
            self.submit_time_change(request, MutationKind::Move);
        }
        if let Some(request) = interaction.resize_request {
            self.submit_time_change(request, MutationKind::Resize);
        }

        if let Some(form) = &mut self.form {
            match render_appointment_form(ctx, form, &self.services) {
                FormAction::Submit => self.submit_form(),
                FormAction::Close => self.form = None,
                FormAction::None => {}
            }
        }

        self.toasts.render(ctx);

        // Worker results arrive between frames; poll on a short timer
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::{AppointmentStatus, Customer};
    use crate::services::api::contracts::ConflictItem;
    use chrono::TimeZone;

    fn test_app() -> CalendarApp {
        let config = AppConfig::default();
        let api = ApiClient::new(&config).unwrap();
        CalendarApp {
            schedule: Some(ScheduleService::new(api)),
            init_error: None,
            web_base_url: config.web_base_url.clone(),
            appointments: Vec::new(),
            services: Vec::new(),
            settings: None,
            location_id: None,
            location_error: None,
            view: CalendarViewType::default(),
            view_overridden: false,
            anchor_day: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            grid: CalendarGrid::new(),
            toasts: ToastManager::new(),
            conflicts: ConflictBanner::default(),
            form: None,
            needs_reload: true,
            loading: false,
            load_error: None,
            auth_expired: false,
        }
    }

    fn appointment(id: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            starts_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap(),
            status: AppointmentStatus::Booked,
            cancelled_reason: None,
            notes: None,
            customer: Customer {
                id: "cust-1".to_string(),
                name: "Dana".to_string(),
                phone: None,
            },
            service: None,
            location_id: "loc-1".to_string(),
        }
    }

    #[test]
    fn test_week_view_shows_monday_through_sunday() {
        let app = test_app();
        let days = app.visible_days();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(days[6], NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
    }

    #[test]
    fn test_day_view_shows_anchor_only() {
        let mut app = test_app();
        app.view = CalendarViewType::Day;
        assert_eq!(app.visible_days(), vec![app.anchor_day]);
    }

    #[test]
    fn test_successful_mutation_triggers_reload() {
        let mut app = test_app();
        app.needs_reload = false;

        app.apply_event(ScheduleEvent::MutationFinished {
            appointment_id: "appt-1".to_string(),
            kind: MutationKind::Move,
            result: Ok(()),
        });
        assert!(app.needs_reload);
    }

    #[test]
    fn test_conflict_shows_notice_without_reload() {
        let mut app = test_app();
        app.needs_reload = false;

        app.apply_event(ScheduleEvent::MutationFinished {
            appointment_id: "appt-1".to_string(),
            kind: MutationKind::Move,
            result: Err(ApiError::Conflict {
                conflicts: vec![ConflictItem {
                    id: "other".to_string(),
                    starts_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
                    ends_at: Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap(),
                }],
            }),
        });

        assert!(app.conflicts.is_visible());
        assert!(!app.needs_reload);
    }

    #[test]
    fn test_auth_expiry_blocks_further_work() {
        let mut app = test_app();
        app.apply_event(ScheduleEvent::CalendarLoaded {
            generation: 0,
            result: Err(ApiError::AuthExpired),
        });
        assert!(app.auth_expired);

        app.needs_reload = true;
        app.location_id = Some("loc-1".to_string());
        app.reload_if_needed();
        // Still pending: auth expiry suppresses reloads
        assert!(app.needs_reload);
        assert!(!app.loading);
    }

    #[test]
    fn test_tenant_default_view_applies_until_overridden() {
        let mut app = test_app();
        let settings = TenantSettings {
            tenant_id: "t-1".to_string(),
            business_name: None,
            default_timezone: "Europe/London".to_string(),
            currency: "GBP".to_string(),
            calendar_default_view: "day".to_string(),
            default_location_id: None,
        };

        app.apply_event(ScheduleEvent::SettingsLoaded {
            result: Ok(settings.clone()),
        });
        assert_eq!(app.view, CalendarViewType::Day);

        app.view = CalendarViewType::Week;
        app.view_overridden = true;
        app.apply_event(ScheduleEvent::SettingsLoaded { result: Ok(settings) });
        assert_eq!(app.view, CalendarViewType::Week);
    }

    #[test]
    fn test_config_location_beats_default_location() {
        let mut app = test_app();
        app.location_id = Some("loc-from-config".to_string());

        app.apply_event(ScheduleEvent::DefaultLocationLoaded {
            result: Ok(crate::models::settings::DefaultLocation {
                id: "loc-default".to_string(),
                name: "Main".to_string(),
                timezone: "Europe/London".to_string(),
                allow_overlaps: false,
                hours_json: None,
            }),
        });
        assert_eq!(app.location_id.as_deref(), Some("loc-from-config"));
    }

    #[test]
    fn test_edit_form_closes_when_appointment_vanishes() {
        let mut app = test_app();
        app.form = Some(AppointmentFormState::for_edit(&appointment("appt-1")));

        app.apply_event(ScheduleEvent::CalendarLoaded {
            generation: 0,
            result: Ok(vec![appointment("appt-2")]),
        });
        assert!(app.form.is_none());
    }

    #[test]
    fn test_create_success_closes_form_and_reloads() {
        let mut app = test_app();
        app.needs_reload = false;
        app.form = Some(AppointmentFormState::for_create(app.anchor_day, 9 * 60));

        app.apply_event(ScheduleEvent::AppointmentCreated { result: Ok(()) });
        assert!(app.form.is_none());
        assert!(app.needs_reload);
        assert!(app.toasts.has_toasts());
    }

    #[test]
    fn test_create_conflict_keeps_form_open_with_error() {
        let mut app = test_app();
        let mut form = AppointmentFormState::for_create(app.anchor_day, 9 * 60);
        form.submitting = true;
        app.form = Some(form);

        app.apply_event(ScheduleEvent::AppointmentCreated {
            result: Err(ApiError::Conflict { conflicts: vec![] }),
        });

        let form = app.form.as_ref().expect("form should stay open");
        assert!(!form.submitting);
        assert!(form.error_message.is_some());
        assert!(app.conflicts.is_visible());
    }
}
