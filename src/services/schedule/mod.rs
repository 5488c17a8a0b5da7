// Schedule service
// Runs API calls on short-lived worker threads and feeds results back to
// the UI thread through a channel. Owns the two consistency guards the
// calendar relies on: the reload generation (late responses for a stale
// range are dropped) and the per-appointment in-flight mutation set.

use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use chrono::{DateTime, Utc};

use crate::models::appointment::{Appointment, ServiceSummary};
use crate::models::settings::{DefaultLocation, TenantSettings};
use crate::services::api::contracts::{AppointmentPayload, AppointmentTimesPatch};
use crate::services::api::error::ApiError;
use crate::services::api::ApiClient;

/// Which gesture produced a time-window mutation; selects the fallback
/// error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Move,
    Resize,
}

impl MutationKind {
    pub fn fallback_message(&self) -> &'static str {
        match self {
            MutationKind::Move => "Unable to move appointment.",
            MutationKind::Resize => "Unable to resize appointment.",
        }
    }
}

/// Completion events delivered to the UI thread, one drain per frame
#[derive(Debug)]
pub enum ScheduleEvent {
    CalendarLoaded {
        generation: u64,
        result: Result<Vec<Appointment>, ApiError>,
    },
    MutationFinished {
        appointment_id: String,
        kind: MutationKind,
        result: Result<(), ApiError>,
    },
    AppointmentCreated {
        result: Result<(), ApiError>,
    },
    AppointmentSaved {
        appointment_id: String,
        result: Result<(), ApiError>,
    },
    ServicesLoaded {
        result: Result<Vec<ServiceSummary>, ApiError>,
    },
    SettingsLoaded {
        result: Result<TenantSettings, ApiError>,
    },
    DefaultLocationLoaded {
        result: Result<DefaultLocation, ApiError>,
    },
}

pub struct ScheduleService {
    api: ApiClient,
    tx: Sender<ScheduleEvent>,
    rx: Receiver<ScheduleEvent>,
    generation: u64,
    in_flight: HashSet<String>,
}

impl ScheduleService {
    pub fn new(api: ApiClient) -> Self {
        let (tx, rx) = channel();
        Self {
            api,
            tx,
            rx,
            generation: 0,
            in_flight: HashSet::new(),
        }
    }

    /// Start a fresh load of the visible range, superseding any load still
    /// in flight. Returns the new generation.
    pub fn begin_reload(
        &mut self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        location_id: &str,
    ) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        let api = self.api.clone();
        let tx = self.tx.clone();
        let location_id = location_id.to_string();

        thread::spawn(move || {
            let result = api.calendar_range(from, to, &location_id);
            // Receiver may be gone if the app closed mid-request
            let _ = tx.send(ScheduleEvent::CalendarLoaded { generation, result });
        });

        generation
    }

    /// Kick off the one-time startup loads (settings, default location,
    /// service catalog).
    pub fn begin_bootstrap(&self) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ScheduleEvent::SettingsLoaded {
                result: api.tenant_settings(),
            });
        });

        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ScheduleEvent::DefaultLocationLoaded {
                result: api.default_location(),
            });
        });

        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ScheduleEvent::ServicesLoaded {
                result: api.list_services(),
            });
        });
    }

    /// Send a drag/resize time change. Returns false (and does nothing)
    /// when a previous mutation for the same appointment is still in
    /// flight; concurrent edits per element are serialized by refusal.
    pub fn begin_time_patch(
        &mut self,
        appointment_id: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        kind: MutationKind,
    ) -> bool {
        if !self.in_flight.insert(appointment_id.to_string()) {
            log::debug!("Ignoring {kind:?} for {appointment_id}: mutation already in flight");
            return false;
        }

        let api = self.api.clone();
        let tx = self.tx.clone();
        let appointment_id = appointment_id.to_string();
        let patch = AppointmentTimesPatch { starts_at, ends_at };

        thread::spawn(move || {
            let result =
                api.patch_appointment_times(&appointment_id, &patch, kind.fallback_message());
            let _ = tx.send(ScheduleEvent::MutationFinished {
                appointment_id,
                kind,
                result,
            });
        });

        true
    }

    pub fn begin_create(&self, payload: AppointmentPayload) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(ScheduleEvent::AppointmentCreated {
                result: api.create_appointment(&payload),
            });
        });
    }

    pub fn begin_save(&mut self, appointment_id: &str, payload: AppointmentPayload) -> bool {
        if !self.in_flight.insert(appointment_id.to_string()) {
            return false;
        }

        let api = self.api.clone();
        let tx = self.tx.clone();
        let appointment_id = appointment_id.to_string();
        thread::spawn(move || {
            let result = api.update_appointment(&appointment_id, &payload);
            let _ = tx.send(ScheduleEvent::AppointmentSaved {
                appointment_id,
                result,
            });
        });

        true
    }

    /// True while a mutation for this appointment is awaiting its response;
    /// the UI refuses new gestures on it until then.
    pub fn is_mutating(&self, appointment_id: &str) -> bool {
        self.in_flight.contains(appointment_id)
    }

    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    /// Drain completed work. Stale calendar loads (superseded generation)
    /// are dropped here so callers only ever observe the newest range.
    pub fn drain(&mut self) -> Vec<ScheduleEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            match &event {
                ScheduleEvent::CalendarLoaded { generation, .. }
                    if *generation != self.generation =>
                {
                    log::debug!(
                        "Discarding stale calendar load (generation {} < {})",
                        generation,
                        self.generation
                    );
                    continue;
                }
                ScheduleEvent::MutationFinished { appointment_id, .. }
                | ScheduleEvent::AppointmentSaved { appointment_id, .. } => {
                    self.in_flight.remove(appointment_id);
                }
                _ => {}
            }
            events.push(event);
        }
        events
    }

    #[cfg(test)]
    fn inject(&self, event: ScheduleEvent) {
        self.tx.send(event).unwrap();
    }
}
