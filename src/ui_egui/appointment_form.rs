//! Appointment create/edit dialog.
//!
//! Opened by clicking an empty slot (create, pre-filled with the clicked
//! time) or an existing block (edit). Submits build a full appointment
//! payload; the calendar reloads from the backend after a successful
//! save rather than patching local state.

use chrono::{Duration, Local, NaiveDate, NaiveTime, Timelike, Utc};
use egui::{Color32, RichText};
use egui_extras::DatePickerButton;

use crate::models::appointment::{Appointment, AppointmentStatus, ServiceSummary};
use crate::services::api::contracts::AppointmentPayload;
use crate::ui_egui::views::time_grid::MIN_EVENT_MINUTES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { appointment_id: String },
}

/// What the dialog asked for this frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Close,
}

pub struct AppointmentFormState {
    pub mode: FormMode,
    pub customer_id: String,
    /// Shown read-only when editing; the dashboard owns customer records
    pub customer_name: Option<String>,
    pub service_id: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
    pub cancelled_reason: String,
    pub notes: String,
    pub error_message: Option<String>,
    /// Set while the submit is in flight; the form stays open until the
    /// backend answers
    pub submitting: bool,
}

impl AppointmentFormState {
    /// Blank form for the clicked slot
    pub fn for_create(date: NaiveDate, minute: i64) -> Self {
        let start_time = NaiveTime::from_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0)
            .unwrap_or(NaiveTime::MIN);
        Self {
            mode: FormMode::Create,
            customer_id: String::new(),
            customer_name: None,
            service_id: None,
            date,
            start_time,
            duration_minutes: 60,
            status: AppointmentStatus::Booked,
            cancelled_reason: String::new(),
            notes: String::new(),
            error_message: None,
            submitting: false,
        }
    }

    pub fn for_edit(appointment: &Appointment) -> Self {
        let start = appointment.local_start();
        Self {
            mode: FormMode::Edit {
                appointment_id: appointment.id.clone(),
            },
            customer_id: appointment.customer.id.clone(),
            customer_name: Some(appointment.customer.name.clone()),
            service_id: appointment.service.as_ref().map(|s| s.id.clone()),
            date: start.date_naive(),
            start_time: start.time(),
            duration_minutes: appointment.duration_minutes_or_default(),
            status: appointment.status,
            cancelled_reason: appointment.cancelled_reason.clone().unwrap_or_default(),
            notes: appointment.notes.clone().unwrap_or_default(),
            error_message: None,
            submitting: false,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    fn validate(&self) -> Result<(), String> {
        if self.customer_id.trim().is_empty() {
            return Err("Customer is required".to_string());
        }
        if self.duration_minutes < MIN_EVENT_MINUTES {
            return Err(format!(
                "Appointments must be at least {MIN_EVENT_MINUTES} minutes"
            ));
        }
        if self.status == AppointmentStatus::Cancelled && self.cancelled_reason.trim().is_empty() {
            return Err("A cancellation reason is required".to_string());
        }
        Ok(())
    }

    /// Build the submit payload, or an error message for the dialog
    pub fn payload(&self, location_id: &str) -> Result<AppointmentPayload, String> {
        self.validate()?;

        let start_local = self
            .date
            .and_time(self.start_time)
            .and_local_timezone(Local)
            .earliest()
            .ok_or_else(|| "Start time does not exist on that date".to_string())?;
        let starts_at = start_local.with_timezone(&Utc);
        let ends_at = starts_at + Duration::minutes(self.duration_minutes);

        Ok(AppointmentPayload {
            customer_id: self.customer_id.trim().to_string(),
            location_id: location_id.to_string(),
            service_id: self.service_id.clone(),
            starts_at,
            ends_at,
            status: self.status,
            cancelled_reason: if self.status == AppointmentStatus::Cancelled {
                Some(self.cancelled_reason.trim().to_string())
            } else {
                None
            },
            notes: {
                let notes = self.notes.trim();
                (!notes.is_empty()).then(|| notes.to_string())
            },
        })
    }
}

/// Render the dialog and report what the user asked for
pub fn render_appointment_form(
    ctx: &egui::Context,
    state: &mut AppointmentFormState,
    services: &[ServiceSummary],
) -> FormAction {
    let mut action = FormAction::None;
    let title = if state.is_edit() {
        "Edit Appointment"
    } else {
        "New Appointment"
    };

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .default_width(380.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            if let Some(error) = &state.error_message {
                ui.colored_label(Color32::RED, RichText::new(error).strong());
                ui.add_space(8.0);
            }

            match &state.customer_name {
                Some(name) => {
                    ui.horizontal(|ui| {
                        ui.label("Customer:");
                        ui.label(RichText::new(name).strong());
                    });
                }
                None => {
                    ui.horizontal(|ui| {
                        ui.label("Customer ID:");
                        ui.text_edit_singleline(&mut state.customer_id);
                    });
                }
            }

            ui.horizontal(|ui| {
                ui.label("Service:");
                let selected = state
                    .service_id
                    .as_ref()
                    .and_then(|id| services.iter().find(|s| &s.id == id))
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| "None".to_string());
                egui::ComboBox::from_id_source("service_combo")
                    .width(220.0)
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        if ui
                            .selectable_label(state.service_id.is_none(), "None")
                            .clicked()
                        {
                            state.service_id = None;
                        }
                        for service in services {
                            let chosen = state.service_id.as_deref() == Some(service.id.as_str());
                            if ui.selectable_label(chosen, &service.name).clicked() {
                                state.service_id = Some(service.id.clone());
                                // New selection drives the default duration
                                if let Some(duration) = service.duration_min {
                                    state.duration_minutes = duration;
                                }
                            }
                        }
                    });
            });

            ui.add_space(4.0);

            ui.horizontal(|ui| {
                ui.label("Date:");
                ui.add(DatePickerButton::new(&mut state.date).id_source("form_date"));
            });

            ui.horizontal(|ui| {
                ui.label("Start:");
                render_time_picker(ui, &mut state.start_time);
                ui.label("Duration:");
                ui.add(
                    egui::DragValue::new(&mut state.duration_minutes)
                        .range(MIN_EVENT_MINUTES..=480)
                        .speed(15)
                        .suffix(" min"),
                );
            });

            ui.add_space(4.0);

            ui.horizontal(|ui| {
                ui.label("Status:");
                egui::ComboBox::from_id_source("status_combo")
                    .selected_text(state.status.label())
                    .show_ui(ui, |ui| {
                        for status in AppointmentStatus::ALL {
                            ui.selectable_value(&mut state.status, status, status.label());
                        }
                    });
            });

            if state.status == AppointmentStatus::Cancelled {
                ui.horizontal(|ui| {
                    ui.label("Reason:");
                    ui.text_edit_singleline(&mut state.cancelled_reason);
                });
            }

            ui.label("Notes:");
            ui.text_edit_multiline(&mut state.notes);

            ui.add_space(8.0);
            ui.separator();

            ui.horizontal(|ui| {
                let submit_label = if state.is_edit() { "Save" } else { "Create" };
                let submit = ui.add_enabled(!state.submitting, egui::Button::new(submit_label));
                if submit.clicked() {
                    action = FormAction::Submit;
                }
                if ui.button("Cancel").clicked() {
                    action = FormAction::Close;
                }
                if state.submitting {
                    ui.spinner();
                }
            });
        });

    action
}

fn render_time_picker(ui: &mut egui::Ui, time: &mut NaiveTime) {
    let mut hour = time.hour();
    let mut minute = time.minute();

    egui::ComboBox::from_id_source("form_hour")
        .width(56.0)
        .selected_text(format!("{:02}", hour))
        .show_ui(ui, |ui| {
            for h in 0..24 {
                ui.selectable_value(&mut hour, h, format!("{:02}", h));
            }
        });
    ui.label(":");
    egui::ComboBox::from_id_source("form_minute")
        .width(56.0)
        .selected_text(format!("{:02}", minute))
        .show_ui(ui, |ui| {
            for m in (0..60).step_by(15) {
                ui.selectable_value(&mut minute, m, format!("{:02}", m));
            }
        });

    if let Some(new_time) = NaiveTime::from_hms_opt(hour, minute, 0) {
        *time = new_time;
    }
}
