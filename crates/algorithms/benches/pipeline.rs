//! Benchmarks for the per-pixel hot path: masking, accumulation, anomaly

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lstanom_algorithms::aggregate::MeanAccumulator;
use lstanom_algorithms::anomaly::{absolute_anomaly, percentage_anomaly};
use lstanom_algorithms::quality::{mask_lst, QaBits};
use lstanom_core::{GeoTransform, Raster};

fn create_lst(size: usize, base: f64) -> Raster<f64> {
    let mut r = Raster::new(size, size);
    r.set_transform(GeoTransform::north_up(0.0, size as f64 * 30.0, 30.0));
    for row in 0..size {
        for col in 0..size {
            let v = base + ((row * 7 + col * 13) % 40) as f64 * 0.25;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn create_qa(size: usize) -> Raster<u16> {
    let mut r = Raster::new(size, size);
    r.set_transform(GeoTransform::north_up(0.0, size as f64 * 30.0, 30.0));
    for row in 0..size {
        for col in 0..size {
            let flags = if (row * 31 + col * 17) % 11 == 0 { 1 << 3 } else { 1 << 6 };
            r.set(row, col, flags).unwrap();
        }
    }
    r
}

fn bench_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("quality/mask_lst");
    for size in [256, 512, 1024] {
        let lst = create_lst(size, 290.0);
        let qa = create_qa(size);
        let bits = QaBits::default();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| mask_lst(black_box(&lst), black_box(&qa), &bits).unwrap())
        });
    }
    group.finish();
}

fn bench_accumulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate/accumulate_10_scenes");
    for size in [256, 512, 1024] {
        let layers: Vec<Raster<f64>> = (0..10).map(|i| create_lst(size, 285.0 + i as f64)).collect();
        let grid = layers[0].grid_spec();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut acc = MeanAccumulator::new(grid.clone());
                for layer in &layers {
                    acc.add(black_box(layer)).unwrap();
                }
                acc.finish().unwrap()
            })
        });
    }
    group.finish();
}

fn bench_anomaly(c: &mut Criterion) {
    let mut group = c.benchmark_group("anomaly/absolute_and_percentage");
    for size in [256, 512, 1024, 2048] {
        let historical = create_lst(size, 20.0);
        let target = create_lst(size, 22.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let abs = absolute_anomaly(black_box(&target), black_box(&historical)).unwrap();
                percentage_anomaly(&abs, &historical).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_mask, bench_accumulate, bench_anomaly);
criterion_main!(benches);
