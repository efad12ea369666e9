//! Cell-centred magnetic field and its divergence.
//!
//! RAMSES stores face-centred components `B_{x,y,z}_{left,right}`.

use ramfield_core::{FieldArray, FieldKey};
use ramfield_eval::{EvalContext, FieldDefinition, FieldRegistry};

use crate::error::FrontendError;
use crate::units::UnitSystem;

/// Key whose presence enables the magnetic family.
pub fn gate() -> FieldKey {
    FieldKey::new("gas", "magnetic_field_x_left")
}

/// Register `magnetic_field_{axis}` for each axis and
/// `magnetic_field_divergence`.
pub fn register_magnetic_fields(
    registry: &mut FieldRegistry,
    units: &UnitSystem,
    axes: &[String],
) -> Result<(), FrontendError> {
    for axis in axes {
        let left = FieldKey::new("gas", format!("magnetic_field_{axis}_left"));
        let right = FieldKey::new("gas", format!("magnetic_field_{axis}_right"));
        registry.register(FieldDefinition::derived(
            ("gas", format!("magnetic_field_{axis}")),
            units.magnetic_field.clone(),
            move |ctx: &mut EvalContext<'_>| {
                let l = ctx.get(&left)?;
                let r = ctx.get(&right)?;
                Ok(l.add(&r)?.scale(0.5))
            },
        ));
    }

    let faces: Vec<(FieldKey, FieldKey)> = axes
        .iter()
        .map(|a| {
            (
                FieldKey::new("gas", format!("magnetic_field_{a}_left")),
                FieldKey::new("gas", format!("magnetic_field_{a}_right")),
            )
        })
        .collect();
    let unit = units.magnetic_field.divide(&units.length)?;
    registry.register(FieldDefinition::derived(
        ("gas", "magnetic_field_divergence"),
        unit,
        move |ctx: &mut EvalContext<'_>| {
            let dx = ctx.field("gas", "dx")?;
            let mut total: Option<FieldArray> = None;
            for (left, right) in &faces {
                let l = ctx.get(left)?;
                let r = ctx.get(right)?;
                let term = r.sub(&l)?.div(&dx)?;
                total = Some(match total {
                    Some(acc) => acc.add(&term)?,
                    None => term,
                });
            }
            Ok(total.unwrap_or_else(|| FieldArray::dimensionless(ndarray::ArrayD::zeros(dx.shape()))))
        },
    ));
    tracing::debug!(axes = axes.len(), "registered magnetic fields");
    Ok(())
}
