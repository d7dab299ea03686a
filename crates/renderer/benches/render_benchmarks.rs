//! Benchmarks for rasterizing smoothed layers.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kernel_smoothing::{composite, DelegateStyle};
use rand::Rng;
use renderer::{ColorRamp, PixmapCanvas, SquareStyle};
use smoothing_common::{SmoothedCell, SmoothedLayer, ViewState};

/// Generate a dense smoothed layer with random values.
fn generate_layer(side: usize, cell_size: f64) -> SmoothedLayer {
    let mut rng = rand::thread_rng();
    let cells = (0..side * side)
        .map(|i| SmoothedCell {
            x: (i % side) as f64 * cell_size,
            y: (i / side) as f64 * cell_size,
            value: rng.gen_range(0.0..1.0),
        })
        .collect();
    SmoothedLayer::new("ksmval", cell_size, cells)
}

fn bench_square_style(c: &mut Criterion) {
    let mut group = c.benchmark_group("square_style");
    let styles: Vec<Box<dyn DelegateStyle>> =
        vec![Box::new(SquareStyle::new("heat", ColorRamp::heat()))];

    for side in [64usize, 256] {
        let layer = generate_layer(side, 1.0);
        let extent = side as f64;
        let view = ViewState::from_center(extent / 2.0, extent / 2.0, extent / 512.0, 512, 512);

        group.throughput(Throughput::Elements(layer.len() as u64));
        group.bench_with_input(BenchmarkId::new("cells", side * side), &side, |b, _| {
            b.iter(|| {
                let mut canvas = match PixmapCanvas::for_view(&view) {
                    Ok(canvas) => canvas,
                    Err(e) => panic!("canvas allocation failed: {}", e),
                };
                composite(black_box(&layer), &styles, &view, &mut canvas)
            });
        });
    }

    group.finish();
}

fn bench_png_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encode");
    let layer = generate_layer(128, 1.0);
    let view = ViewState::from_center(64.0, 64.0, 0.25, 512, 512);
    let styles: Vec<Box<dyn DelegateStyle>> =
        vec![Box::new(SquareStyle::new("heat", ColorRamp::heat()))];

    let mut canvas = match PixmapCanvas::for_view(&view) {
        Ok(canvas) => canvas,
        Err(e) => panic!("canvas allocation failed: {}", e),
    };
    if let Err(e) = composite(&layer, &styles, &view, &mut canvas) {
        panic!("composite failed: {}", e);
    }

    group.bench_function("512x512", |b| {
        b.iter(|| black_box(&canvas).encode_png());
    });

    group.finish();
}

criterion_group!(benches, bench_square_style, bench_png_encode);
criterion_main!(benches);
