//! Gravitational potential energy.

use ramfield_core::FieldKey;
use ramfield_eval::{EvalContext, FieldDefinition, FieldRegistry};

use crate::units::UnitSystem;

/// Key whose presence enables the gravity family.
pub fn gate() -> FieldKey {
    FieldKey::new("gravity", "Potential")
}

/// Register `("gas", "potential_energy")`: potential times cell mass.
pub fn register_gravity_fields(registry: &mut FieldRegistry, units: &UnitSystem) {
    registry.register(FieldDefinition::derived(
        ("gas", "potential_energy"),
        units.energy.clone(),
        |ctx: &mut EvalContext<'_>| {
            let phi = ctx.field("gas", "potential")?;
            let mass = ctx.field("gas", "cell_mass")?;
            phi.mul(&mass)
        },
    ));
}
