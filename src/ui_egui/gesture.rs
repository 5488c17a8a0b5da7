//! Pointer-gesture state machine for the calendar grid.
//!
//! Exactly one gesture is active at a time: moving a block, resizing its
//! bottom edge, or nothing. Click-to-create needs no transient state and
//! goes straight to the form. Gesture state lives on the calendar
//! component and is cleared on every pointer-up, whatever the outcome.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::appointment::Appointment;
use crate::ui_egui::views::time_grid::{snapped_resize_end, MIN_EVENT_MINUTES, PIXELS_PER_MINUTE};
use crate::utils::date::combine_day_and_minutes;

/// Move-drag: the block follows the pointer, duration is preserved
#[derive(Debug, Clone)]
pub struct DragContext {
    pub appointment_id: String,
    pub original_start: DateTime<Utc>,
    pub original_end: DateTime<Utc>,
    pub duration: Duration,
}

impl DragContext {
    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            appointment_id: appointment.id.clone(),
            original_start: appointment.starts_at,
            original_end: appointment.ends_at,
            duration: appointment.duration(),
        }
    }

    /// Times that would result from dropping at `minute` on `day`,
    /// preserving the original duration (floored at the minimum).
    pub fn dropped_times(&self, day: NaiveDate, minute: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let starts_at = combine_day_and_minutes(day, minute).with_timezone(&Utc);
        let duration_minutes = self.duration.num_minutes().max(MIN_EVENT_MINUTES);
        let ends_at = starts_at + Duration::minutes(duration_minutes);
        (starts_at, ends_at)
    }

    /// A drop resolving to the current slot is a no-op and sends nothing
    pub fn is_noop_drop(&self, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> bool {
        starts_at == self.original_start && ends_at == self.original_end
    }
}

/// Resize-drag: the start stays fixed, the end tracks the pointer
#[derive(Debug, Clone)]
pub struct ResizeState {
    pub appointment_id: String,
    pub day: NaiveDate,
    pub start_min: i64,
    pub initial_end_min: i64,
    /// Pointer Y at drag start; deltas are relative to it
    pub start_y: f32,
}

impl ResizeState {
    /// Snapped, clamped candidate end for the current pointer position.
    /// Recomputed on every pointer move, not just on drop.
    pub fn candidate_end(&self, pointer_y: f32) -> i64 {
        let delta_minutes = (pointer_y - self.start_y) / PIXELS_PER_MINUTE;
        let raw_end = self.initial_end_min as f32 + delta_minutes;
        snapped_resize_end(raw_end, self.start_min)
    }

    /// True when releasing at `end_min` requires no backend call
    pub fn is_noop_release(&self, end_min: i64) -> bool {
        end_min == self.initial_end_min
    }
}

#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragContext),
    Resizing(ResizeState),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// Begin a move-drag; refused unless idle
    pub fn begin_drag(&mut self, context: DragContext) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = Gesture::Dragging(context);
        true
    }

    /// Begin a resize; refused unless idle
    pub fn begin_resize(&mut self, state: ResizeState) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = Gesture::Resizing(state);
        true
    }

    pub fn dragging(&self) -> Option<&DragContext> {
        match self {
            Gesture::Dragging(context) => Some(context),
            _ => None,
        }
    }

    pub fn resizing(&self) -> Option<&ResizeState> {
        match self {
            Gesture::Resizing(state) => Some(state),
            _ => None,
        }
    }

    /// Id of the appointment the active gesture is acting on
    pub fn appointment_id(&self) -> Option<&str> {
        match self {
            Gesture::Idle => None,
            Gesture::Dragging(context) => Some(&context.appointment_id),
            Gesture::Resizing(state) => Some(&state.appointment_id),
        }
    }

    /// True when this gesture is acting on the given appointment
    pub fn involves(&self, appointment_id: &str) -> bool {
        self.appointment_id() == Some(appointment_id)
    }

    /// End the active gesture, returning what it was
    pub fn clear(&mut self) -> Gesture {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::{AppointmentStatus, Customer};
    use crate::utils::date::day_start;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn appointment(start_min: i64, end_min: i64) -> Appointment {
        let base = day_start(day());
        Appointment {
            id: "appt-1".to_string(),
            starts_at: (base + Duration::minutes(start_min)).with_timezone(&Utc),
            ends_at: (base + Duration::minutes(end_min)).with_timezone(&Utc),
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
    fn test_only_one_gesture_at_a_time() {
        let mut gesture = Gesture::default();
        let context = DragContext::from_appointment(&appointment(9 * 60, 10 * 60));

        assert!(gesture.begin_drag(context.clone()));
        assert!(!gesture.begin_drag(context));
        assert!(!gesture.begin_resize(ResizeState {
            appointment_id: "appt-2".to_string(),
            day: day(),
            start_min: 11 * 60,
            initial_end_min: 12 * 60,
            start_y: 0.0,
        }));

        gesture.clear();
        assert!(gesture.is_idle());
    }

    #[test]
    fn test_drop_preserves_duration() {
        let context = DragContext::from_appointment(&appointment(9 * 60, 10 * 60 + 30));
        let (starts_at, ends_at) = context.dropped_times(day(), 14 * 60);

        assert_eq!(
            starts_at,
            combine_day_and_minutes(day(), 14 * 60).with_timezone(&Utc)
        );
        assert_eq!((ends_at - starts_at).num_minutes(), 90);
    }

    #[test]
    fn test_drop_at_current_slot_is_noop() {
        let source = appointment(9 * 60, 10 * 60);
        let context = DragContext::from_appointment(&source);
        let (starts_at, ends_at) = context.dropped_times(day(), 9 * 60);

        assert!(context.is_noop_drop(starts_at, ends_at));

        let (moved_start, moved_end) = context.dropped_times(day(), 9 * 60 + 30);
        assert!(!context.is_noop_drop(moved_start, moved_end));
    }

    #[test]
    fn test_resize_candidate_tracks_pointer() {
        let state = ResizeState {
            appointment_id: "appt-1".to_string(),
            day: day(),
            start_min: 9 * 60,
            initial_end_min: 10 * 60,
            start_y: 400.0,
        };

        // 22 minutes of pixels below the grab point snaps down to 10:15
        let pointer_y = 400.0 + 22.0 * PIXELS_PER_MINUTE;
        assert_eq!(state.candidate_end(pointer_y), 10 * 60 + 15);

        // Dragging up clamps at the minimum duration
        let far_up = 400.0 - 500.0 * PIXELS_PER_MINUTE;
        assert_eq!(state.candidate_end(far_up), 9 * 60 + MIN_EVENT_MINUTES);

        assert!(state.is_noop_release(10 * 60));
        assert!(!state.is_noop_release(10 * 60 + 15));
    }

    #[test]
    fn test_involves_matches_gesture_target() {
        let mut gesture = Gesture::default();
        gesture.begin_drag(DragContext::from_appointment(&appointment(9 * 60, 10 * 60)));
        assert!(gesture.involves("appt-1"));
        assert!(!gesture.involves("appt-2"));
    }
}
