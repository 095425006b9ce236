//! Benchmarks for station processing.
//!
//! Run with: `cargo bench --bench station_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hmdf::projection::transform_many;
use hmdf::{Date, Station, Timepoint};

/// Station with `n` ten-minute samples, every tenth repeated.
fn synthetic_station(n: usize) -> Station {
    let t0 = Date::new(2019, 2, 5, 0, 0, 0).unwrap();
    let mut s = Station::new(0, -90.0, 29.0);
    for i in 0..n {
        let t = t0 + (i as i64 * 600);
        let value = (i as f64 * 0.01).sin();
        s.push(Timepoint::scalar(t, value));
        if i % 10 == 0 {
            s.push(Timepoint::scalar(t, value));
        }
    }
    s
}

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");
    for n in [1_000, 10_000, 100_000] {
        let station = synthetic_station(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &station, |b, s| {
            b.iter(|| {
                let mut s = s.clone();
                s.sanitize();
                black_box(s.len())
            })
        });
    }
    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let station = synthetic_station(100_000);
    c.bench_function("median_100k", |b| b.iter(|| black_box(station.median(0))));
    c.bench_function("minmax_100k", |b| b.iter(|| black_box(station.minmax(0))));
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform_many");
    for n in [100, 10_000] {
        let lon: Vec<f64> = (0..n).map(|i| -94.0 + 6.0 * i as f64 / n as f64).collect();
        let lat: Vec<f64> = (0..n).map(|i| 25.0 + 5.0 * i as f64 / n as f64).collect();
        group.bench_with_input(BenchmarkId::new("4326_to_26915", n), &(lon, lat), |b, (x, y)| {
            b.iter(|| black_box(transform_many(4326, 26915, x, y).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sanitize, bench_statistics, bench_transform);
criterion_main!(benches);
