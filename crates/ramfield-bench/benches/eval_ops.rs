//! Criterion benchmarks for field resolution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ramfield_bench::{chain_registry, hydro_params, SyntheticLoader};
use ramfield_core::{Chunk, FieldKey};
use ramfield_eval::Evaluator;
use ramfield_ramses::FieldSetBuilder;

/// Benchmark: resolve the tip of a 32-deep derived chain over 10K cells.
fn bench_chain_depth_32(c: &mut Criterion) {
    let reg = chain_registry(32);
    let loader = ones_loader();
    let ev = Evaluator::new(&reg, &loader);
    let key = FieldKey::new("bench", "f32");

    c.bench_function("chain_depth_32_10k", |b| {
        b.iter(|| black_box(ev.get(&key, Chunk::new(0, 10_000)).unwrap()));
    });
}

/// Loader serving `("bench", "f0")` for the chain benchmark.
fn ones_loader() -> impl ramfield_core::RawLoader {
    struct Ones;
    impl ramfield_core::RawLoader for Ones {
        fn load(
            &self,
            _: &FieldKey,
            chunk: &Chunk,
        ) -> Result<ndarray::ArrayD<f64>, ramfield_core::FieldError> {
            Ok(ndarray::ArrayD::ones(vec![chunk.len]))
        }
    }
    Ones
}

/// Benchmark: temperature (fallback path) over 64 chunks with 4 workers.
fn bench_temperature_chunks(c: &mut Criterion) {
    let fields = match FieldSetBuilder::new(hydro_params()).build() {
        Ok(f) => f,
        Err(e) => panic!("bench field set: {e}"),
    };
    let loader = SyntheticLoader;
    let ev = fields.evaluator(&loader);
    let chunks: Vec<Chunk> = (0..64).map(|i| Chunk::new(i, 4_096)).collect();
    let key = FieldKey::new("gas", "temperature");

    c.bench_function("temperature_64_chunks_4_workers", |b| {
        b.iter(|| black_box(ev.evaluate_chunks(&key, &chunks, 4).unwrap()));
    });
}

criterion_group!(benches, bench_chain_depth_32, bench_temperature_chunks);
criterion_main!(benches);
