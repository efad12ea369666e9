//! Known on-disk fields and the seeding pass that registers them.
//!
//! Each known field is registered raw under its on-disk key in code units.
//! Its aliases are registered as alias fields in the dataset's output unit
//! system, under `"gas"` for fluid fields and under the particle type for
//! particle fields. Fields found on disk that are not known here are
//! registered raw with whatever unit the loader reports.

use ramfield_core::{FieldKey, SamplingType};
use ramfield_eval::{DeclaredUnit, FieldDefinition, FieldRegistry};
use ramfield_units::{UnitExpr, UnitSymbols};

use crate::error::FrontendError;
use crate::params::DatasetParams;
use crate::units::UnitSystem;

/// An on-disk field with a known unit and display aliases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KnownField {
    /// On-disk name.
    pub name: &'static str,
    /// Unit in the dataset's symbol table; empty for dimensionless.
    pub unit: &'static str,
    /// Alias names.
    pub aliases: &'static [&'static str],
}

const fn known(name: &'static str, unit: &'static str, aliases: &'static [&'static str]) -> KnownField {
    KnownField {
        name,
        unit,
        aliases,
    }
}

const ANG_MOM: &str = "code_mass * code_velocity * code_length";
const ENERGY: &str = "code_mass * code_velocity**2";
const RATE: &str = "code_mass / code_time";

/// Fluid fields, in the `ramses`, `gravity`, and `ramses-rt` categories.
pub const KNOWN_FLUID_FIELDS: &[KnownField] = &[
    known("Density", "code_density", &["density"]),
    known("x-velocity", "code_velocity", &["velocity_x"]),
    known("y-velocity", "code_velocity", &["velocity_y"]),
    known("z-velocity", "code_velocity", &["velocity_z"]),
    known("Pres_IR", "code_pressure", &["pres_IR", "pressure_IR"]),
    known("Pressure", "code_pressure", &["pressure"]),
    known("Metallicity", "", &["metallicity"]),
    known("HII", "", &["H_p1_fraction"]),
    known("HeII", "", &["He_p1_fraction"]),
    known("HeIII", "", &["He_p2_fraction"]),
    known("x-acceleration", "code_length / code_time**2", &["acceleration_x"]),
    known("y-acceleration", "code_length / code_time**2", &["acceleration_y"]),
    known("z-acceleration", "code_length / code_time**2", &["acceleration_z"]),
    known("Potential", "code_velocity**2", &["potential"]),
    known("B_x_left", "code_magnetic", &["magnetic_field_x_left"]),
    known("B_x_right", "code_magnetic", &["magnetic_field_x_right"]),
    known("B_y_left", "code_magnetic", &["magnetic_field_y_left"]),
    known("B_y_right", "code_magnetic", &["magnetic_field_y_right"]),
    known("B_z_left", "code_magnetic", &["magnetic_field_z_left"]),
    known("B_z_right", "code_magnetic", &["magnetic_field_z_right"]),
];

/// Fields of ordinary particle types.
pub const KNOWN_PARTICLE_FIELDS: &[KnownField] = &[
    known("particle_position_x", "code_length", &[]),
    known("particle_position_y", "code_length", &[]),
    known("particle_position_z", "code_length", &[]),
    known("particle_velocity_x", "code_velocity", &[]),
    known("particle_velocity_y", "code_velocity", &[]),
    known("particle_velocity_z", "code_velocity", &[]),
    known("particle_mass", "code_mass", &[]),
    known("particle_identity", "", &["particle_index"]),
    known("particle_refinement_level", "", &[]),
    known("particle_birth_time", "code_time", &["age"]),
    known("conformal_birth_time", "", &[]),
    known("particle_metallicity", "", &[]),
    known("particle_family", "", &[]),
    known("particle_tag", "", &[]),
    // Sink data written as ordinary particles.
    known("particle_angular_momentum_x", ANG_MOM, &[]),
    known("particle_angular_momentum_y", ANG_MOM, &[]),
    known("particle_angular_momentum_z", ANG_MOM, &[]),
    known("particle_formation_time", "code_time", &[]),
    known("particle_accretion_rate", RATE, &[]),
    known("particle_delta_mass", "code_mass", &[]),
    known("particle_rho_gas", "code_density", &[]),
    known("particle_cs**2", "code_velocity**2", &[]),
    known("particle_etherm", ENERGY, &[]),
    known("particle_velocity_x_gas", "code_velocity", &[]),
    known("particle_velocity_y_gas", "code_velocity", &[]),
    known("particle_velocity_z_gas", "code_velocity", &[]),
    known("particle_mass_bh", "code_mass", &[]),
    known("particle_level", "", &[]),
    known("particle_radius_star", "code_length", &[]),
];

/// Fields of the `sink` particle type.
pub const KNOWN_SINK_FIELDS: &[KnownField] = &[
    known("particle_position_x", "code_length", &[]),
    known("particle_position_y", "code_length", &[]),
    known("particle_position_z", "code_length", &[]),
    known("particle_velocity_x", "code_velocity", &[]),
    known("particle_velocity_y", "code_velocity", &[]),
    known("particle_velocity_z", "code_velocity", &[]),
    known("particle_mass", "code_mass", &[]),
    known("particle_identifier", "", &["particle_index"]),
    known("particle_birth_time", "code_time", &["age"]),
    known("BH_real_accretion", RATE, &[]),
    known("BH_bondi_accretion", RATE, &[]),
    known("BH_eddington_accretion", RATE, &[]),
    known("BH_esave", ENERGY, &[]),
    known("gas_spin_x", ANG_MOM, &[]),
    known("gas_spin_y", ANG_MOM, &[]),
    known("gas_spin_z", ANG_MOM, &[]),
    known("BH_spin_x", "", &[]),
    known("BH_spin_y", "", &[]),
    known("BH_spin_z", "", &[]),
    known("BH_spin", ANG_MOM, &[]),
    known("BH_efficiency", "", &[]),
];

/// Categories holding on-disk fluid fields.
pub const FLUID_CATEGORIES: [&str; 3] = ["ramses", "gravity", "ramses-rt"];

/// Known fields for an on-disk category, and the category their aliases
/// are registered under.
fn table_for<'p>(category: &'p str, params: &DatasetParams) -> Option<(&'static [KnownField], &'p str, SamplingType)> {
    if FLUID_CATEGORIES.contains(&category) {
        Some((KNOWN_FLUID_FIELDS, "gas", SamplingType::Cell))
    } else if params.particle_types.iter().any(|p| p == category) {
        let table = if category == "sink" {
            KNOWN_SINK_FIELDS
        } else {
            KNOWN_PARTICLE_FIELDS
        };
        Some((table, category, SamplingType::Particle))
    } else {
        None
    }
}

fn declared(unit: UnitExpr) -> DeclaredUnit {
    if unit.is_dimensionless() && unit.scale() == 1.0 {
        DeclaredUnit::Dimensionless
    } else {
        DeclaredUnit::Expr(unit)
    }
}

/// Register cell geometry: `dx`, `cell_volume`, and `grid_level`, supplied
/// by the loader in code units, with `"gas"` aliases in output units.
pub fn register_geometry(
    registry: &mut FieldRegistry,
    symbols: &UnitSymbols,
    units: &UnitSystem,
) -> Result<(), FrontendError> {
    let length = symbols.parse("code_length")?;
    let volume = length.powi(3)?;
    registry.register(FieldDefinition::raw(("index", "dx"), length));
    registry.register(FieldDefinition::raw(("index", "cell_volume"), volume));
    registry.register(FieldDefinition::raw(("index", "grid_level"), DeclaredUnit::Dimensionless));
    registry.register(FieldDefinition::alias(("gas", "dx"), units.length.clone(), ("index", "dx")));
    registry.register(FieldDefinition::alias(
        ("gas", "cell_volume"),
        units.length.powi(3)?,
        ("index", "cell_volume"),
    ));
    Ok(())
}

/// Register every on-disk field listed in `params`.
pub fn seed_known_fields(
    registry: &mut FieldRegistry,
    params: &DatasetParams,
    symbols: &UnitSymbols,
    units: &UnitSystem,
) -> Result<(), FrontendError> {
    register_geometry(registry, symbols, units)?;

    let mut unknown = 0usize;
    for key in &params.fields {
        let Some((table, alias_category, sampling)) = table_for(&key.category, params) else {
            registry.register(FieldDefinition::raw(key.clone(), DeclaredUnit::FromRaw));
            unknown += 1;
            continue;
        };
        let Some(field) = table.iter().find(|f| f.name == key.name) else {
            registry.register(
                FieldDefinition::raw(key.clone(), DeclaredUnit::FromRaw).with_sampling(sampling),
            );
            unknown += 1;
            continue;
        };

        let code_unit = symbols.parse(field.unit)?;
        let out_unit = units.express(code_unit.dims())?;
        registry.register(
            FieldDefinition::raw(key.clone(), declared(code_unit))
                .with_aliases(field.aliases.iter().copied())
                .with_sampling(sampling),
        );
        for alias in field.aliases {
            let alias_key = FieldKey::new(alias_category, *alias);
            if alias_key == *key {
                continue;
            }
            registry.register(
                FieldDefinition::alias(alias_key, declared(out_unit.clone()), key.clone())
                    .with_sampling(sampling),
            );
        }
    }
    tracing::debug!(
        on_disk = params.fields.len(),
        unknown,
        "seeded known fields"
    );
    Ok(())
}
