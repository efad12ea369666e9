//! Radiative-transfer parameters and fields.
//!
//! RT outputs carry an `info_rt_XXXXX.txt` file with the number of photon
//! groups, the reduced speed of light fraction (one value, or one per
//! level), and the photon density and flux units. Photon densities are
//! stored scaled by the reduced speed of light of the cell's level.

use std::fs;
use std::path::Path;

use ndarray::{ArrayD, Zip};
use ramfield_core::{FieldArray, FieldError, FieldKey};
use ramfield_eval::{EvalContext, FieldDefinition, FieldRegistry};
use ramfield_units::{Quantity, UnitExpr};

use crate::constants::{SPEED_OF_LIGHT_CGS, TEMPERATURE_OVER_MU_FACTOR};
use crate::error::{ConfigError, FrontendError};
use crate::params::{parse_fortran_f64, parse_fortran_list, parse_key_values, DatasetParams};
use crate::units::UnitSystem;

/// Ionisation species with stored fractions.
pub const RT_SPECIES: [&str; 3] = ["H_p1", "He_p1", "He_p2"];

/// Parsed `info_rt_XXXXX.txt`.
#[derive(Clone, Debug, PartialEq)]
pub struct RtParams {
    /// Number of photon groups.
    pub n_groups: usize,
    /// Reduced speed of light fraction per level, padded to cover every
    /// level of the dataset.
    pub rt_c_frac: Vec<f64>,
    /// Photon number density unit in cm⁻³.
    pub unit_np: f64,
    /// Photon flux unit in cm⁻² s⁻¹.
    pub unit_pf: f64,
}

impl RtParams {
    /// Read the RT parameter file at `path`.
    pub fn read(path: &Path, max_level: u32) -> Result<Self, FrontendError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text, path, max_level)?)
    }

    /// Parse RT parameters from file text. `path` is used in errors only.
    pub fn parse(text: &str, path: &Path, max_level: u32) -> Result<Self, ConfigError> {
        let kv = parse_key_values(text);
        let raw = |key: &str| {
            kv.get(key).ok_or_else(|| ConfigError::MissingKey {
                file: path.to_path_buf(),
                key: key.to_string(),
            })
        };
        let bad = |key: &str, value: &str| ConfigError::BadValue {
            file: path.to_path_buf(),
            key: key.to_string(),
            value: value.to_string(),
        };
        let real = |key: &str| -> Result<f64, ConfigError> {
            let v = raw(key)?;
            parse_fortran_f64(v).ok_or_else(|| bad(key, v))
        };

        let groups = raw("nGroups")?;
        let n_groups = groups.trim().parse().map_err(|_| bad("nGroups", groups))?;
        let frac_text = raw("rt_c_frac")?;
        let frac = parse_fortran_list(frac_text)
            .filter(|f| !f.is_empty() && f.iter().all(|v| *v > 0.0))
            .ok_or_else(|| bad("rt_c_frac", frac_text))?;

        Ok(Self {
            n_groups,
            rt_c_frac: pad_c_frac(frac, max_level),
            unit_np: real("unit_np")?,
            unit_pf: real("unit_pf")?,
        })
    }

    /// Factor taking stored photon densities on each level to cm⁻³.
    pub fn density_conversion(&self, params: &DatasetParams) -> Vec<f64> {
        let code_velocity = params.unit_l / params.unit_t;
        self.rt_c_frac
            .iter()
            .map(|f| self.unit_np / (f * SPEED_OF_LIGHT_CGS / code_velocity))
            .collect()
    }
}

/// Extend `frac` to `max_level + 1` entries: a single value is repeated,
/// a per-level list is padded with 1.
pub fn pad_c_frac(mut frac: Vec<f64>, max_level: u32) -> Vec<f64> {
    let want = max_level as usize + 1;
    if frac.len() < want {
        let fill = if frac.len() == 1 { frac[0] } else { 1.0 };
        frac.resize(want, fill);
    }
    frac
}

/// Photon density on each cell's level.
struct PhotonDensity {
    raw: FieldKey,
    conversion: Vec<f64>,
    unit: UnitExpr,
}

impl ramfield_eval::DerivedField for PhotonDensity {
    fn evaluate(&self, ctx: &mut EvalContext<'_>) -> Result<FieldArray, FieldError> {
        let stored = ctx.get(&self.raw)?;
        let levels = ctx.field("index", "grid_level")?;
        let stored = stored.values();
        let levels = levels.values();
        if stored.shape() != levels.shape() {
            return Err(FieldError::ShapeMismatch {
                left: stored.shape().to_vec(),
                right: levels.shape().to_vec(),
            });
        }
        let mut out = ArrayD::zeros(stored.raw_dim());
        let mut bad_level = None;
        Zip::from(&mut out)
            .and(stored)
            .and(levels)
            .for_each(|o, &v, &level| {
                match self.conversion.get(level.max(0.0) as usize) {
                    Some(k) if level >= 0.0 => *o = v * k,
                    _ => {
                        bad_level.get_or_insert(level);
                    }
                }
            });
        if let Some(level) = bad_level {
            return Err(FieldError::Evaluation {
                key: self.raw.clone(),
                reason: format!(
                    "grid level {level} outside the {} levels with a light-speed fraction",
                    self.conversion.len()
                ),
            });
        }
        Ok(FieldArray::new(out, self.unit.clone()))
    }
}

/// Register the RT family.
pub fn register_rt_fields(
    registry: &mut FieldRegistry,
    rt: &RtParams,
    params: &DatasetParams,
    units: &UnitSystem,
) -> Result<(), FrontendError> {
    let (pressure, density, kelvin) = (
        units.pressure.clone(),
        units.density.clone(),
        units.temperature.clone(),
    );
    registry.register(FieldDefinition::derived(
        ("gas", "temp_IR"),
        units.temperature.clone(),
        move |ctx: &mut EvalContext<'_>| {
            let p = ctx.get_in(&FieldKey::new("gas", "pres_IR"), &pressure)?;
            let rho = ctx.get_in(&FieldKey::new("gas", "density"), &density)?;
            Ok(FieldArray::new(p / rho * TEMPERATURE_OVER_MU_FACTOR, kelvin.clone()))
        },
    ));

    for species in RT_SPECIES {
        let fraction = FieldKey::new("gas", format!("{species}_fraction"));
        let species_density = FieldKey::new("gas", format!("{species}_density"));
        registry.register(FieldDefinition::derived(
            ("gas", format!("{species}_density")),
            units.density.clone(),
            move |ctx: &mut EvalContext<'_>| {
                let x = ctx.get(&fraction)?;
                let rho = ctx.field("gas", "density")?;
                x.mul(&rho)
            },
        ));
        registry.register(FieldDefinition::derived(
            ("gas", format!("{species}_mass")),
            units.mass.clone(),
            move |ctx: &mut EvalContext<'_>| {
                let rho = ctx.get(&species_density)?;
                let volume = ctx.field("gas", "cell_volume")?;
                rho.mul(&volume)
            },
        ));
    }

    let conversion = rt.density_conversion(params);
    let flux_unit = units.photon_flux()?;
    for group in 1..=rt.n_groups {
        registry.register(FieldDefinition::derived_with(
            ("rt", format!("photon_density_{group}")),
            units.number_density.clone(),
            std::sync::Arc::new(PhotonDensity {
                raw: FieldKey::new("ramses-rt", format!("Photon_density_{group}")),
                conversion: conversion.clone(),
                unit: units.number_density.clone(),
            }),
        ));
        for axis in &params.axis_order {
            let raw = FieldKey::new("ramses-rt", format!("Photon_flux_{axis}_{group}"));
            let scale = Quantity::new(rt.unit_pf, flux_unit.clone());
            registry.register(FieldDefinition::derived(
                ("rt", format!("photon_flux_{axis}_{group}")),
                flux_unit.clone(),
                move |ctx: &mut EvalContext<'_>| {
                    let stored = ctx.get(&raw)?;
                    stored.mul_quantity(&scale)
                },
            ));
        }
    }
    tracing::info!(groups = rt.n_groups, "registered radiative-transfer fields");
    Ok(())
}
