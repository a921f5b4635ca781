use chrono::{Duration, TimeZone, Utc};
use chrono_tz::Tz;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rekur_core::cadence::{self, Cadence};
use rekur_core::config::SchedulerConfig;
use rekur_core::models::{TaskCategory, TaskDefinition, TaskDraft};
use rekur_core::repository::MemoryTaskStore;
use rekur_core::scheduler::TaskScheduler;
use rekur_core::series::{plan_series, shift_series};
use uuid::Uuid;

fn root_draft(cadence: Cadence) -> TaskDraft {
    TaskDraft {
        owner_id: Uuid::now_v7(),
        title: "Benchmark Task".to_string(),
        description: None,
        category: TaskCategory::Other,
        due_at: Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap(),
        reminder_minutes: 60,
        is_recurring: true,
        recurring_type: Some(cadence),
        series_id: None,
        ordinal: 1,
        planned_occurrences: 1,
    }
}

fn bench_advance(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap();
    let mut group = c.benchmark_group("advance");

    for cadence in [Cadence::Daily, Cadence::Weekly, Cadence::Monthly] {
        group.bench_with_input(BenchmarkId::new("utc", cadence), &cadence, |b, &cadence| {
            b.iter(|| cadence::advance_utc(black_box(start), cadence, Tz::UTC))
        });
        group.bench_with_input(BenchmarkId::new("new_york", cadence), &cadence, |b, &cadence| {
            b.iter(|| cadence::advance_utc(black_box(start), cadence, chrono_tz::America::New_York))
        });
    }

    group.finish();
}

fn bench_plan_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_series");

    for count in [12u32, 100] {
        group.bench_with_input(BenchmarkId::new("monthly", count), &count, |b, &count| {
            b.iter(|| plan_series(black_box(root_draft(Cadence::Monthly)), count, Tz::UTC).unwrap())
        });
    }

    group.finish();
}

fn bench_shift_series(c: &mut Criterion) {
    let plan = plan_series(root_draft(Cadence::Weekly), 100, Tz::UTC).unwrap();
    let members: Vec<_> = plan
        .into_iter()
        .map(|draft| draft.into_instance(Uuid::now_v7(), Utc::now()))
        .collect();

    c.bench_function("shift_series_100", |b| {
        b.iter(|| shift_series(black_box(&members), Duration::hours(36)).unwrap())
    });
}

fn bench_create_series_in_memory(c: &mut Criterion) {
    c.bench_function("create_series_in_memory_52", |b| {
        b.iter(|| {
            let scheduler = TaskScheduler::new(MemoryTaskStore::new(), SchedulerConfig::default());
            let definition = TaskDefinition {
                title: "Weekly backup check".to_string(),
                category: TaskCategory::Maintenance,
                recurring_type: Some(Cadence::Weekly),
                occurrences: 52,
                ..Default::default()
            };
            tokio_test::block_on(scheduler.create_task(Uuid::now_v7(), definition)).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_advance,
    bench_plan_series,
    bench_shift_series,
    bench_create_series_in_memory
);
criterion_main!(benches);
