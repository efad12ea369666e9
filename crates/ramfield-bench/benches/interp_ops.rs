//! Criterion micro-benchmarks for table interpolation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::{Array1, ArrayD};
use ramfield_bench::cooling_like_interpolator;

fn query(n: usize, lo: f64, hi: f64, stride: u64) -> ArrayD<f64> {
    Array1::from_shape_fn(n, |i| {
        let u = ((i as u64).wrapping_mul(stride) % 10_007) as f64 / 10_007.0;
        lo + (hi - lo) * u
    })
    .into_dyn()
}

/// Benchmark: 100K lookups in a 91x161 table, all in range.
fn bench_bilinear_100k(c: &mut Criterion) {
    let interp = cooling_like_interpolator(91, 161);
    let x = query(100_000, -6.0, 4.0, 6_364_136_223_846_793_007);
    let y = query(100_000, 1.0, 9.0, 1_442_695_040_888_963_407);

    c.bench_function("bilinear_100k", |b| {
        b.iter(|| black_box(interp.evaluate(&x, &y).unwrap()));
    });
}

/// Benchmark: 100K lookups, half of them clamped at the table edges.
fn bench_bilinear_clamped_100k(c: &mut Criterion) {
    let interp = cooling_like_interpolator(91, 161);
    let x = query(100_000, -11.0, 9.0, 6_364_136_223_846_793_007);
    let y = query(100_000, -3.0, 13.0, 1_442_695_040_888_963_407);

    c.bench_function("bilinear_clamped_100k", |b| {
        b.iter(|| black_box(interp.evaluate(&x, &y).unwrap()));
    });
}

/// Benchmark: single-point lookups.
fn bench_bilinear_point(c: &mut Criterion) {
    let interp = cooling_like_interpolator(91, 161);
    c.bench_function("bilinear_point", |b| {
        b.iter(|| black_box(interp.evaluate_point(black_box(0.3), black_box(4.7)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_bilinear_100k,
    bench_bilinear_clamped_100k,
    bench_bilinear_point
);
criterion_main!(benches);
