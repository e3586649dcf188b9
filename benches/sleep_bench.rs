//! Benchmarks for night aggregation
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ownmyhealth::records::{HealthRecord, ReportZone};
use ownmyhealth::sleep::NightAggregator;

/// Sleep segments spread over `count / 4` nights, plus heart rate noise
fn create_test_records(count: usize) -> Vec<HealthRecord> {
    let base = Utc.with_ymd_and_hms(2023, 1, 1, 22, 0, 0).unwrap();

    (0..count)
        .map(|i| {
            let night = (i / 4) as i64;
            let start = base + Duration::days(night) + Duration::minutes((i % 4) as i64 * 90);
            let end = start + Duration::minutes(80);

            match i % 5 {
                0 => HealthRecord::point("HeartRate", 60.0 + (i % 20) as f64, start.to_rfc3339()),
                1 => HealthRecord::sleep("HKCategoryValueSleepAnalysisInBed", start.to_rfc3339(), end.to_rfc3339()),
                _ => HealthRecord::sleep("HKCategoryValueSleepAnalysisAsleepCore", start.to_rfc3339(), end.to_rfc3339()),
            }
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let aggregator = NightAggregator::new().with_zone(ReportZone::Utc);

    for size in [1_000, 10_000, 100_000] {
        let records = create_test_records(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("records_{}", size), |b| {
            b.iter(|| aggregator.aggregate(black_box(&records)))
        });
    }

    group.finish();
}

fn bench_apple_timestamps(c: &mut Criterion) {
    let records: Vec<HealthRecord> = (0..10_000)
        .map(|i| {
            let day = 1 + (i % 28);
            HealthRecord::sleep(
                "Asleep",
                format!("2024-02-{:02} 23:{:02}:00 -0500", day, i % 60),
                format!("2024-02-{:02} 06:{:02}:00 -0500", day.min(27) + 1, i % 60),
            )
        })
        .collect();

    let aggregator = NightAggregator::new().with_zone(ReportZone::Utc);

    c.bench_function("aggregate_apple_format_10000", |b| {
        b.iter(|| aggregator.aggregate(black_box(&records)))
    });
}

criterion_group!(benches, bench_aggregate, bench_apple_timestamps);
criterion_main!(benches);
