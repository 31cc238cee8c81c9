//! Benchmarks for the per-lookup hot path: bucketing, recording and
//! configuration handling.

use clap::Parser;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dnsperf::{
    bucket_for,
    cli::Cli,
    metrics::LookupMetrics,
    models::{Config, ProbeOutcome, ProbeTarget},
    stats::LatencyAggregator,
    utils::parse_duration_ms,
};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

fn sample_durations(count: usize) -> Vec<Duration> {
    (0..count)
        .map(|i| Duration::from_micros(50 + (i as u64 * 7919) % 2_000_000))
        .collect()
}

fn benchmark_bucketing(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucketing");

    for micros in [50_u64, 1_600, 250_000, 5_000_000] {
        let duration = Duration::from_micros(micros);
        group.bench_with_input(BenchmarkId::new("bucket_for", micros), &duration, |b, duration| {
            b.iter(|| black_box(bucket_for(black_box(*duration))));
        });
    }

    group.finish();
}

fn benchmark_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("recording");

    for size in [100, 1_000, 10_000] {
        let durations = sample_durations(size);
        group.bench_with_input(BenchmarkId::new("aggregator_record", size), &durations, |b, durations| {
            b.iter(|| {
                let aggregator = LatencyAggregator::new();
                for (i, duration) in durations.iter().enumerate() {
                    aggregator.record_duration(i % 10 != 0, *duration);
                }
                black_box(aggregator.totals())
            });
        });
    }

    group.bench_function("metrics_observe", |b| {
        let metrics = LookupMetrics::new().unwrap();
        let outcome = ProbeOutcome::success(&ProbeTarget::new("bench.example"), Duration::from_millis(3), Vec::new());
        b.iter(|| metrics.observe(black_box(&outcome)));
    });

    group.bench_function("concurrent_record", |b| {
        let durations = Arc::new(sample_durations(1_000));
        b.iter(|| {
            let aggregator = Arc::new(LatencyAggregator::new());
            let threads: Vec<_> = (0..4)
                .map(|_| {
                    let aggregator = aggregator.clone();
                    let durations = durations.clone();
                    std::thread::spawn(move || {
                        for duration in durations.iter() {
                            aggregator.record_duration(true, *duration);
                        }
                    })
                })
                .collect();
            for thread in threads {
                thread.join().unwrap();
            }
            black_box(aggregator.snapshot())
        });
    });

    group.finish();
}

fn benchmark_report(c: &mut Criterion) {
    let aggregator = LatencyAggregator::new();
    for duration in sample_durations(10_000) {
        aggregator.record_duration(true, duration);
    }

    c.bench_function("report", |b| b.iter(|| black_box(aggregator.report())));
}

fn benchmark_config(c: &mut Criterion) {
    let mut group = c.benchmark_group("config");

    group.bench_function("parse_cli_args", |b| {
        let args = ["dnsperf", "--rps", "500", "--names", "a.com,b.com", "--timeout", "250ms", "--duration", "1m30s"];
        b.iter(|| black_box(Cli::try_parse_from(black_box(args)).unwrap()));
    });

    group.bench_function("validate_config", |b| {
        let config = Config::default();
        b.iter(|| black_box(config.validate().is_ok()));
    });

    group.bench_function("parse_duration", |b| {
        b.iter(|| black_box(parse_duration_ms(black_box("1h2m3.5s")).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, benchmark_bucketing, benchmark_recording, benchmark_report, benchmark_config);
criterion_main!(benches);
