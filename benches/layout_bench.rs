// Benchmark for day-column layout
// Measures clipping, grouping and column assignment over busy days

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use salon_calendar::models::appointment::{Appointment, AppointmentStatus, Customer};
use salon_calendar::ui_egui::views::day_layout::layout_events_for_day;

fn bench_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

/// Build a day of appointments with heavy pairwise overlap: staggered
/// 45-minute bookings every 15 minutes across working hours.
fn busy_day(count: usize) -> Vec<Appointment> {
    let base = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let starts_at = base + Duration::minutes((i as i64 * 15) % (10 * 60));
            Appointment {
                id: format!("appt-{i}"),
                starts_at,
                ends_at: starts_at + Duration::minutes(45),
                status: AppointmentStatus::Booked,
                cancelled_reason: None,
                notes: None,
                customer: Customer {
                    id: format!("cust-{i}"),
                    name: format!("Customer {i}"),
                    phone: None,
                },
                service: None,
                location_id: "loc-1".to_string(),
            }
        })
        .collect()
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("day_layout");

    for count in [10, 50, 200].iter() {
        let appointments = busy_day(*count);
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &appointments,
            |b, appointments| {
                b.iter(|| layout_events_for_day(black_box(appointments), black_box(bench_day())));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
