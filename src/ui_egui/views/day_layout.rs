//! Column layout for overlapping appointments within one day.
//!
//! Appointments intersecting a day are clipped to it, sorted
//! deterministically, grouped into maximal overlap clusters by a
//! start/end sweep, and assigned the smallest free column within their
//! cluster. Every event in a cluster shares the cluster's column count so
//! the whole cluster renders at a uniform width.

use chrono::NaiveDate;

use super::time_grid::{MIN_EVENT_MINUTES, TOTAL_MINUTES};
use crate::models::appointment::Appointment;
use crate::utils::date::{is_same_local_day, minutes_since_day_start};

/// One appointment's placement within a day column, recomputed from the
/// appointment set on every render and never persisted.
#[derive(Debug, Clone)]
pub struct DayLayoutEvent<'a> {
    pub appointment: &'a Appointment,
    pub day: NaiveDate,
    /// Minutes since local midnight, clamped to the displayed day
    pub start_min: i64,
    pub end_min: i64,
    /// Assigned column within the overlap group
    pub col: usize,
    /// Total columns in the overlap group
    pub cols: usize,
    /// Edge-drag resize is only offered when the appointment starts and
    /// ends on the displayed day
    pub can_resize: bool,
}

/// Lay out all appointments intersecting `day`.
///
/// Deterministic: the same input set always produces the same
/// `(col, cols)` assignment, independent of fetch order.
pub fn layout_events_for_day<'a>(
    appointments: &'a [Appointment],
    day: NaiveDate,
) -> Vec<DayLayoutEvent<'a>> {
    let mut clipped: Vec<DayLayoutEvent<'a>> = appointments
        .iter()
        .filter_map(|appointment| clip_to_day(appointment, day))
        .collect();

    clipped.sort_by(|a, b| {
        a.start_min
            .cmp(&b.start_min)
            .then(a.end_min.cmp(&b.end_min))
            .then_with(|| a.appointment.id.cmp(&b.appointment.id))
    });

    let mut result = Vec::with_capacity(clipped.len());

    let mut group: Vec<DayLayoutEvent<'a>> = Vec::new();
    let mut group_end = i64::MIN;

    for event in clipped {
        // A new maximal overlap group starts once the next event begins at
        // or after the running max end of the current one.
        if !group.is_empty() && event.start_min >= group_end {
            assign_columns(std::mem::take(&mut group), &mut result);
            group_end = i64::MIN;
        }
        group_end = group_end.max(event.end_min);
        group.push(event);
    }
    if !group.is_empty() {
        assign_columns(group, &mut result);
    }

    result
}

fn clip_to_day<'a>(appointment: &'a Appointment, day: NaiveDate) -> Option<DayLayoutEvent<'a>> {
    let raw_start = minutes_since_day_start(appointment.starts_at, day);
    let raw_end = minutes_since_day_start(appointment.ends_at, day);

    // Keep only appointments overlapping [day start, day end)
    if raw_start >= TOTAL_MINUTES || raw_end <= 0 {
        return None;
    }

    let start_min = raw_start.clamp(0, TOTAL_MINUTES);
    let end_min = raw_end
        .clamp(0, TOTAL_MINUTES)
        .max(start_min + MIN_EVENT_MINUTES)
        .min(TOTAL_MINUTES);
    // Starts in the last slot keep the minimum span by shifting up
    let start_min = start_min.min(end_min - MIN_EVENT_MINUTES);

    Some(DayLayoutEvent {
        appointment,
        day,
        start_min,
        end_min,
        col: 0,
        cols: 1,
        can_resize: is_same_local_day(appointment.starts_at, day)
            && is_same_local_day(appointment.ends_at, day),
    })
}

/// Assign columns within one overlap group: smallest non-negative column
/// not held by a still-active event, with the group's width applied
/// uniformly to every member.
fn assign_columns<'a>(group: Vec<DayLayoutEvent<'a>>, result: &mut Vec<DayLayoutEvent<'a>>) {
    let mut active: Vec<(i64, usize)> = Vec::new(); // (end_min, col)
    let mut placed: Vec<DayLayoutEvent<'a>> = Vec::with_capacity(group.len());
    let mut max_cols = 1;

    for mut event in group {
        active.retain(|(end_min, _)| *end_min > event.start_min);

        let mut col = 0;
        while active.iter().any(|(_, used)| *used == col) {
            col += 1;
        }

        active.push((event.end_min, col));
        max_cols = max_cols.max(col + 1);
        event.col = col;
        placed.push(event);
    }

    for mut event in placed {
        event.cols = max_cols;
        result.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use crate::models::appointment::{AppointmentStatus, Customer};
    use crate::utils::date::day_start;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    /// Appointment on the test day spanning [start_min, end_min) in local time
    fn appointment(id: &str, start_min: i64, end_min: i64) -> Appointment {
        let base = day_start(day());
        Appointment {
            id: id.to_string(),
            starts_at: (base + Duration::minutes(start_min)).with_timezone(&Utc),
            ends_at: (base + Duration::minutes(end_min)).with_timezone(&Utc),
            status: AppointmentStatus::Booked,
            cancelled_reason: None,
            notes: None,
            customer: Customer {
                id: format!("cust-{id}"),
                name: format!("Customer {id}"),
                phone: None,
            },
            service: None,
            location_id: "loc-1".to_string(),
        }
    }

    fn placement(layout: &[DayLayoutEvent<'_>], id: &str) -> (usize, usize) {
        let event = layout
            .iter()
            .find(|event| event.appointment.id == id)
            .unwrap_or_else(|| panic!("no layout event for {id}"));
        (event.col, event.cols)
    }

    #[test]
    fn test_chained_overlap_group_shares_width() {
        // A [09:00,10:00), B [09:30,10:30), C [10:00,11:00): C joins the
        // group because it starts before the running max end (10:30), and
        // reuses column 0 freed by A.
        let appointments = vec![
            appointment("a", 9 * 60, 10 * 60),
            appointment("b", 9 * 60 + 30, 10 * 60 + 30),
            appointment("c", 10 * 60, 11 * 60),
        ];

        let layout = layout_events_for_day(&appointments, day());
        assert_eq!(layout.len(), 3);
        assert_eq!(placement(&layout, "a"), (0, 2));
        assert_eq!(placement(&layout, "b"), (1, 2));
        assert_eq!(placement(&layout, "c"), (0, 2));
    }

    #[test]
    fn test_isolated_event_gets_full_width() {
        let appointments = vec![
            appointment("a", 9 * 60, 10 * 60),
            appointment("b", 13 * 60, 14 * 60),
        ];

        let layout = layout_events_for_day(&appointments, day());
        assert_eq!(placement(&layout, "a"), (0, 1));
        assert_eq!(placement(&layout, "b"), (0, 1));
    }

    #[test]
    fn test_back_to_back_events_do_not_group() {
        // [09:00,10:00) and [10:00,11:00) touch but do not overlap
        let appointments = vec![
            appointment("a", 9 * 60, 10 * 60),
            appointment("b", 10 * 60, 11 * 60),
        ];

        let layout = layout_events_for_day(&appointments, day());
        assert_eq!(placement(&layout, "a"), (0, 1));
        assert_eq!(placement(&layout, "b"), (0, 1));
    }

    #[test]
    fn test_overlapping_events_never_share_a_column() {
        let appointments = vec![
            appointment("a", 9 * 60, 11 * 60),
            appointment("b", 9 * 60 + 15, 10 * 60),
            appointment("c", 9 * 60 + 30, 10 * 60 + 30),
            appointment("d", 10 * 60 + 15, 11 * 60),
        ];

        let layout = layout_events_for_day(&appointments, day());
        for first in &layout {
            for second in &layout {
                if first.appointment.id == second.appointment.id {
                    continue;
                }
                let overlaps =
                    first.start_min < second.end_min && second.start_min < first.end_min;
                if overlaps {
                    assert_ne!(
                        first.col, second.col,
                        "{} and {} overlap but share column {}",
                        first.appointment.id, second.appointment.id, first.col
                    );
                }
            }
        }
    }

    #[test]
    fn test_layout_is_deterministic_regardless_of_input_order() {
        let mut appointments = vec![
            appointment("a", 9 * 60, 10 * 60),
            appointment("b", 9 * 60, 10 * 60),
            appointment("c", 9 * 60 + 30, 10 * 60 + 30),
        ];

        fn collect(layout: Vec<DayLayoutEvent<'_>>) -> Vec<(String, usize, usize)> {
            let mut placements: Vec<(String, usize, usize)> = layout
                .iter()
                .map(|event| (event.appointment.id.clone(), event.col, event.cols))
                .collect();
            placements.sort();
            placements
        }

        let first = collect(layout_events_for_day(&appointments, day()));
        appointments.reverse();
        let second = collect(layout_events_for_day(&appointments, day()));
        assert_eq!(first, second);

        // Equal times tie-break on id, so "a" always precedes "b"
        let layout = layout_events_for_day(&appointments, day());
        assert_eq!(placement(&layout, "a").0, 0);
        assert_eq!(placement(&layout, "b").0, 1);
    }

    #[test]
    fn test_minimum_visible_span() {
        let appointments = vec![appointment("a", 9 * 60, 9 * 60 + 5)];
        let layout = layout_events_for_day(&appointments, day());
        assert_eq!(layout[0].end_min - layout[0].start_min, MIN_EVENT_MINUTES);
    }

    #[test]
    fn test_multi_day_appointment_is_clipped_and_not_resizable() {
        // Starts the prior evening, ends mid-morning on the displayed day
        let appointments = vec![appointment("a", -3 * 60, 9 * 60)];
        let layout = layout_events_for_day(&appointments, day());

        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].start_min, 0);
        assert_eq!(layout[0].end_min, 9 * 60);
        assert!(!layout[0].can_resize);
    }

    #[test]
    fn test_same_day_appointment_is_resizable() {
        let appointments = vec![appointment("a", 9 * 60, 10 * 60)];
        let layout = layout_events_for_day(&appointments, day());
        assert!(layout[0].can_resize);
    }

    #[test]
    fn test_minimum_span_never_leaves_the_day() {
        // Starts 5 minutes before midnight; the minimum span shifts the
        // block up instead of spilling past the end of the grid
        let appointments = vec![appointment("a", 24 * 60 - 5, 24 * 60)];
        let layout = layout_events_for_day(&appointments, day());
        assert_eq!(layout[0].end_min, TOTAL_MINUTES);
        assert_eq!(layout[0].start_min, TOTAL_MINUTES - MIN_EVENT_MINUTES);
    }

    #[test]
    fn test_appointments_outside_day_are_excluded() {
        let appointments = vec![
            appointment("before", -10 * 60, -9 * 60),
            appointment("after", 25 * 60, 26 * 60),
            appointment("ends-at-midnight", -60, 0),
        ];
        let layout = layout_events_for_day(&appointments, day());
        assert!(layout.is_empty());
    }

    #[test]
    fn test_spanning_appointment_fills_whole_day() {
        let appointments = vec![appointment("a", -2 * 60, 26 * 60)];
        let layout = layout_events_for_day(&appointments, day());
        assert_eq!(layout[0].start_min, 0);
        assert_eq!(layout[0].end_min, TOTAL_MINUTES);
    }
}
