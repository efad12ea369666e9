//! Gas temperature.

use ramfield_core::{Diagnostics, FieldArray, FieldKey};
use ramfield_eval::{EvalContext, FieldDefinition, FieldRegistry};
use ramfield_units::UnitSymbols;

use crate::constants::TEMPERATURE_OVER_MU_FACTOR;
use crate::error::FrontendError;
use crate::units::UnitSystem;

/// Register `("gas", "temperature_over_mu")`: `P/ρ · m_H/k_B`.
pub fn register_temperature_over_mu(registry: &mut FieldRegistry, units: &UnitSystem) {
    let (pressure, density, kelvin) = (
        units.pressure.clone(),
        units.density.clone(),
        units.temperature.clone(),
    );
    registry.register(FieldDefinition::derived(
        ("gas", "temperature_over_mu"),
        units.temperature.clone(),
        move |ctx: &mut EvalContext<'_>| {
            let p = ctx.get_in(&FieldKey::new("gas", "pressure"), &pressure)?;
            let rho = ctx.get_in(&FieldKey::new("gas", "density"), &density)?;
            let t = p / rho * TEMPERATURE_OVER_MU_FACTOR;
            Ok(FieldArray::new(t, kelvin.clone()))
        },
    ));
}

/// Register `("gas", "temperature")`.
///
/// With a cooling table this is `T/μ · μ`. Without one, `μ` is unknown and
/// the field falls back to `T/μ`, warning the first time it is evaluated.
pub fn register_temperature(
    registry: &mut FieldRegistry,
    units: &UnitSystem,
    have_mu: bool,
    diagnostics: &Diagnostics,
) -> Result<(), FrontendError> {
    let kelvin = UnitSymbols::cgs().parse("K")?;
    if have_mu {
        registry.register(FieldDefinition::derived(
            ("gas", "temperature"),
            units.temperature.clone(),
            |ctx: &mut EvalContext<'_>| {
                let t = ctx.field("gas", "temperature_over_mu")?;
                let mu = ctx.field("gas", "mu")?;
                t.mul(&mu)
            },
        ));
    } else {
        let diagnostics = diagnostics.clone();
        registry.register(FieldDefinition::derived(
            ("gas", "temperature"),
            units.temperature.clone(),
            move |ctx: &mut EvalContext<'_>| {
                let t = ctx.get_in(&FieldKey::new("gas", "temperature_over_mu"), &kelvin)?;
                diagnostics.warn_once(
                    "temperature-fallback",
                    "no cooling table; temperature is T/mu with mu = 1",
                );
                Ok(FieldArray::new(t, kelvin.clone()))
            },
        ));
    }
    Ok(())
}
