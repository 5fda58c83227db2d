use chrono::TimeZone;
use chrono_tz::Africa::Dakar;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use weather_station::models::{CityProfile, SampleBucket};
use weather_station::processors::{
    AggregationEngine, DateRangeStreamer, DurationParser, RunningStats, TemperatureSynthesizer,
};
use weather_station::store::{MemoryReadingStore, StaticCityCatalog};

// One bucket per anchor day of every month
fn create_test_city() -> CityProfile {
    let mut samples = Vec::new();
    for month in 1..=12 {
        for day in [1, 10, 20, 30] {
            if month == 2 && day == 30 {
                continue;
            }
            let base = 10 + (month as i32 % 6) * 3;
            samples.push(SampleBucket::new(month, day, base, base + 7));
        }
    }
    CityProfile::new("Dakar", "DKR", "Africa/Dakar", samples)
}

fn create_engine() -> AggregationEngine {
    let catalog = Arc::new(StaticCityCatalog::new(vec![create_test_city()]));
    let store = Arc::new(MemoryReadingStore::new());
    let synth = TemperatureSynthesizer::new(catalog, store).with_seed(42);
    AggregationEngine::new(Arc::new(synth))
}

fn benchmark_duration_parser(c: &mut Criterion) {
    let inputs = ["1Y2M3D", "3M", "10D", "2Y", "0D"];

    c.bench_function("duration_parser", |b| {
        b.iter(|| {
            let mut days = 0;
            for input in &inputs {
                if let Ok(offset) = DurationParser::parse(black_box(input)) {
                    days += offset.days;
                }
            }
            black_box(days)
        })
    });
}

fn benchmark_date_range(c: &mut Criterion) {
    let end = Dakar.with_ymd_and_hms(2015, 4, 16, 13, 0, 0).unwrap();
    let streamer = DateRangeStreamer::new();

    c.bench_function("date_range_one_year", |b| {
        b.iter(|| {
            let batches = streamer.stream(&end, "1Y").unwrap();
            black_box(batches.map(|batch| batch.map(|d| d.len()).unwrap_or(0)).sum::<usize>())
        })
    });
}

fn benchmark_running_stats(c: &mut Criterion) {
    let temps: Vec<i32> = (0..1000).map(|i| (i % 40) - 10).collect();

    c.bench_function("running_stats_merge", |b| {
        b.iter(|| {
            let mut stats = RunningStats::new();
            for chunk in temps.chunks(5) {
                stats.merge(chunk);
            }
            black_box(stats.average())
        })
    });
}

fn benchmark_aggregation_by_duration(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation_by_duration");
    let end = Dakar.with_ymd_and_hms(2015, 4, 16, 13, 0, 0).unwrap();

    for duration in ["10D", "3M", "1Y"] {
        group.bench_with_input(
            BenchmarkId::new("fresh_store", duration),
            &duration,
            |b, &duration| {
                b.iter(|| {
                    let engine = create_engine();
                    let result = engine.aggregate_period("DKR", &end, duration, None).unwrap();
                    black_box(result.average)
                })
            },
        );

        let warm = create_engine();
        warm.aggregate_period("DKR", &end, duration, None).unwrap();
        group.bench_with_input(
            BenchmarkId::new("stored_readings", duration),
            &duration,
            |b, &duration| {
                b.iter(|| {
                    let result = warm.aggregate_period("DKR", &end, duration, None).unwrap();
                    black_box(result.average)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_duration_parser,
    benchmark_date_range,
    benchmark_running_stats,
    benchmark_aggregation_by_duration
);
criterion_main!(benches);
