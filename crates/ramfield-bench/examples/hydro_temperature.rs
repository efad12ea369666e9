//! Build a field set for a synthetic hydro dataset and print gas
//! temperatures per chunk.
//!
//! Run with `RUST_LOG=debug` to see the registration passes.

use ramfield_bench::{hydro_params, SyntheticLoader};
use ramfield_core::{Chunk, FieldKey};
use ramfield_ramses::FieldSetBuilder;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let fields = FieldSetBuilder::new(hydro_params()).build()?;
    println!("{fields:?}");

    let loader = SyntheticLoader;
    let ev = fields.evaluator(&loader);
    let chunks: Vec<Chunk> = (0..4).map(|i| Chunk::new(i, 8)).collect();
    let key = FieldKey::new("gas", "temperature");
    let unit = ev.unit_of(&key)?;
    for (chunk, t) in chunks.iter().zip(ev.evaluate_chunks(&key, &chunks, 2)?) {
        let max = t.values().iter().copied().fold(f64::MIN, f64::max);
        println!("chunk {}: max temperature {max:.3e} {unit}", chunk.id);
    }
    for d in fields.diagnostics.entries() {
        println!("warning [{}]: {}", d.topic, d.message);
    }
    Ok(())
}
