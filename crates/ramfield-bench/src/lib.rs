//! Benchmark profiles and utilities for the Ramfield field engine.
//!
//! - [`SyntheticLoader`]: a raw loader that fabricates smooth hydro data
//!   for any chunk length
//! - [`hydro_params`]: dataset parameters listing the fields it supplies
//! - [`chain_registry`]: a linear chain of derived fields of given depth
//! - [`cooling_like_interpolator`]: a table shaped like a cooling table

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ndarray::{Array1, Array2, ArrayD};
use ramfield_core::{Chunk, FieldError, FieldKey, RawLoader};
use ramfield_eval::{EvalContext, FieldDefinition, FieldRegistry};
use ramfield_interp::{BilinearInterpolator, BoundsPolicy};
use ramfield_ramses::DatasetParams;
use ramfield_units::UnitSymbols;

/// Fabricates deterministic raw data for the hydro fields of
/// [`hydro_params`] and for cell geometry.
pub struct SyntheticLoader;

impl RawLoader for SyntheticLoader {
    fn load(&self, key: &FieldKey, chunk: &Chunk) -> Result<ArrayD<f64>, FieldError> {
        let n = chunk.len;
        let offset = chunk.id.0 as f64;
        let ramp = |lo: f64, hi: f64| {
            Array1::from_shape_fn(n, |i| {
                let t = (i as f64 + offset) / (n.max(1) as f64 + offset);
                lo + (hi - lo) * t
            })
            .into_dyn()
        };
        let values = match (key.category.as_str(), key.name.as_str()) {
            ("ramses", "Density") => ramp(1e-26, 1e-22),
            ("ramses", "Pressure") => ramp(1e-14, 1e-12),
            ("ramses", "Metallicity") => ramp(0.0, 0.04),
            ("index", "dx") | ("index", "cell_volume") => ArrayD::ones(vec![n]),
            ("index", "grid_level") => ArrayD::zeros(vec![n]),
            _ => {
                return Err(FieldError::DataNotFound {
                    key: key.clone(),
                    chunk: chunk.id,
                })
            }
        };
        Ok(values)
    }
}

/// Parameters for a CGS hydro dataset with density, pressure, and
/// metallicity on disk.
pub fn hydro_params() -> DatasetParams {
    DatasetParams::default().with_fields([
        ("ramses", "Density"),
        ("ramses", "Pressure"),
        ("ramses", "Metallicity"),
    ])
}

/// A registry with one raw field `("bench", "f0")` and `depth` derived
/// fields, each doubling the previous one.
pub fn chain_registry(depth: usize) -> FieldRegistry {
    let cgs = UnitSymbols::cgs();
    let unit = cgs.parse("g/cm**3").unwrap_or_default();
    let mut reg = FieldRegistry::new();
    reg.register(FieldDefinition::raw(("bench", "f0"), unit.clone()));
    for i in 1..=depth {
        let prev = FieldKey::new("bench", format!("f{}", i - 1));
        reg.register(FieldDefinition::derived(
            ("bench", format!("f{i}")),
            unit.clone(),
            move |ctx: &mut EvalContext<'_>| Ok(ctx.get(&prev)?.scale(2.0)),
        ));
    }
    reg
}

/// A smooth `n1 × n2` table over `lognH ∈ [-6, 4]`, `logT ∈ [1, 9]`.
pub fn cooling_like_interpolator(n1: usize, n2: usize) -> BilinearInterpolator {
    let axis = |lo: f64, hi: f64, n: usize| -> Vec<f64> {
        (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n.max(2) - 1) as f64)
            .collect()
    };
    let x = axis(-6.0, 4.0, n1);
    let y = axis(1.0, 9.0, n2);
    let table = Array2::from_shape_fn((n1, n2), |(i, j)| -22.0 - 0.1 * x[i] + (y[j] - 5.0).sin());
    match BilinearInterpolator::new(x, y, table, BoundsPolicy::Clamp) {
        Ok(interp) => interp,
        Err(e) => panic!("bench table is malformed: {e}"),
    }
}
