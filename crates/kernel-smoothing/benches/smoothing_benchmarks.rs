//! Benchmarks for the kernel smoothing pipeline.
//!
//! Run with: cargo bench --package kernel-smoothing --bench smoothing_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kernel_smoothing::{
    materialize, plan_grid, DensityEstimator, ExtentPolicy, GaussianKde, KernelSmoothingStyle,
    SmoothingConfig, WeightedSample,
};
use rand::Rng;
use smoothing_common::{Cell, GridPlan, ViewState};
use test_utils::{create_blob_cells, RecordingContext, VALUE_FIELD};

/// Generate random weighted samples inside a square extent.
fn generate_samples(count: usize, extent: f64) -> Vec<WeightedSample> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| WeightedSample {
            x: rng.gen_range(0.0..extent),
            y: rng.gen_range(0.0..extent),
            weight: rng.gen_range(0.0..100.0),
        })
        .collect()
}

// =============================================================================
// DENSITY ESTIMATION BENCHMARKS
// =============================================================================

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaussian_kde");
    let kde = GaussianKde::new();

    for bins in [64usize, 256, 512] {
        let plan = GridPlan::new(0.0, 0.0, 1.0, bins, bins);
        let samples = generate_samples(bins * bins / 4, bins as f64);

        group.throughput(Throughput::Elements((bins * bins) as u64));
        group.bench_with_input(BenchmarkId::new("bins", bins), &bins, |b, _| {
            b.iter(|| kde.estimate(black_box(&samples), black_box(4.0), &plan));
        });
    }

    group.finish();
}

fn bench_bandwidth(c: &mut Criterion) {
    let mut group = c.benchmark_group("kde_bandwidth");
    let kde = GaussianKde::new();
    let plan = GridPlan::new(0.0, 0.0, 1.0, 256, 256);
    let samples = generate_samples(10_000, 256.0);

    for sigma in [1.0, 4.0, 16.0] {
        group.bench_with_input(BenchmarkId::new("sigma", sigma), &sigma, |b, &sigma| {
            b.iter(|| kde.estimate(black_box(&samples), sigma, &plan));
        });
    }

    group.finish();
}

// =============================================================================
// MATERIALIZATION BENCHMARKS
// =============================================================================

fn bench_materialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize");
    let plan = GridPlan::new(0.0, 0.0, 1.0, 512, 512);
    let grid: Vec<f64> = (0..plan.len()).map(|i| (i % 97) as f64).collect();
    let keep = |v: f64| v > 10.0;

    group.throughput(Throughput::Elements(plan.len() as u64));
    group.bench_function("unfiltered", |b| {
        b.iter(|| materialize(black_box(&grid), &plan, None).map(|cells| cells.count()));
    });
    group.bench_function("filtered", |b| {
        b.iter(|| materialize(black_box(&grid), &plan, Some(&keep)).map(|cells| cells.count()));
    });

    group.finish();
}

// =============================================================================
// FULL PIPELINE BENCHMARKS
// =============================================================================

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for size in [50usize, 200] {
        let cells = create_blob_cells(size, size, 1000.0, VALUE_FIELD, 500.0);
        let extent = size as f64 * 1000.0;
        let view = ViewState::from_center(extent / 2.0, extent / 2.0, extent / 512.0, 512, 512);

        let config = SmoothingConfig::new(
            |c: &Cell| c.value(VALUE_FIELD).unwrap_or(0.0),
            |resolution, _zoom| resolution * 2.0,
        );
        let style = match KernelSmoothingStyle::new(config) {
            Ok(style) => style,
            Err(e) => panic!("invalid benchmark config: {}", e),
        };

        group.throughput(Throughput::Elements(cells.len() as u64));
        group.bench_with_input(BenchmarkId::new("cells", size * size), &size, |b, _| {
            b.iter(|| {
                let mut ctx = RecordingContext::new();
                style.draw(black_box(&cells), &view, 1000.0, &mut ctx)
            });
        });
    }

    let cells = create_blob_cells(100, 100, 1.0, VALUE_FIELD, 1.0);
    let view = ViewState::from_center(50.0, 50.0, 0.25, 400, 400);
    group.bench_function("plan_data_bound_10k", |b| {
        b.iter(|| {
            plan_grid(
                1.0,
                &view,
                black_box(&cells),
                &|r, _z| r / 2.0,
                ExtentPolicy::DataBound,
            )
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_estimate,
    bench_bandwidth,
    bench_materialize,
    bench_pipeline,
);

criterion_main!(benches);
