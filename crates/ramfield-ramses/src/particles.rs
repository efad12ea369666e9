//! Particle fields: stellar ages.
//!
//! How a star's age is computed depends on how its birth epoch was stored:
//!
//! | run | stored | age |
//! |-----|--------|-----|
//! | cosmological, conformal | τ (`conformal_birth_time`) | `now − clock(τ)` |
//! | cosmological, physical | `H0·t` offset (`conformal_birth_time`) | `now − (t0·H0 + τ)/H0` |
//! | non-cosmological | `particle_birth_time` | `now − birth` |

use std::sync::Arc;

use ndarray::Zip;
use ramfield_core::{FieldArray, FieldError, FieldKey};
use ramfield_eval::{DerivedField, EvalContext, FieldDefinition, FieldRegistry};
use ramfield_units::UnitExpr;

use crate::cosmology::CosmicClock;
use crate::params::DatasetParams;

/// How stellar ages are computed for a dataset.
#[derive(Clone)]
pub enum StarAge {
    /// Birth epochs are super-conformal times.
    Conformal {
        /// Converts τ to an age since the Big Bang.
        clock: Arc<dyn CosmicClock>,
    },
    /// Birth epochs are proper-time offsets from today in units of 1/H0.
    PhysicalCosmological {
        /// Age of the universe today in s.
        age_today: f64,
        /// Hubble constant in s⁻¹.
        h0: f64,
    },
    /// Birth times are simulation times.
    NonCosmological,
}

impl std::fmt::Debug for StarAge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conformal { .. } => f.write_str("Conformal"),
            Self::PhysicalCosmological { age_today, h0 } => f
                .debug_struct("PhysicalCosmological")
                .field("age_today", age_today)
                .field("h0", h0)
                .finish(),
            Self::NonCosmological => f.write_str("NonCosmological"),
        }
    }
}

impl StarAge {
    /// Pick the variant for a dataset. `clock` is required for
    /// cosmological runs.
    pub fn for_dataset(params: &DatasetParams, clock: Option<&Arc<dyn CosmicClock>>) -> Option<Self> {
        if !params.cosmological_simulation {
            return Some(Self::NonCosmological);
        }
        let clock = clock?;
        Some(if params.use_conformal_time {
            Self::Conformal {
                clock: Arc::clone(clock),
            }
        } else {
            Self::PhysicalCosmological {
                age_today: clock.age_at_redshift(0.0),
                h0: clock.hubble_per_second(),
            }
        })
    }

    /// Birth-time field this variant reads for particle type `ptype`.
    pub fn input(&self, ptype: &str) -> FieldKey {
        match self {
            Self::NonCosmological => FieldKey::new(ptype, "particle_birth_time"),
            _ => FieldKey::new(ptype, "conformal_birth_time"),
        }
    }
}

/// `star_age` for one particle type, with the current time fixed at
/// registration.
pub struct StarAgeField {
    variant: StarAge,
    input: FieldKey,
    /// Age of the universe (cosmological) or simulation time, in s.
    current_time: f64,
    unit: UnitExpr,
}

impl DerivedField for StarAgeField {
    fn evaluate(&self, ctx: &mut EvalContext<'_>) -> Result<FieldArray, FieldError> {
        let now = self.current_time;
        let ages = match &self.variant {
            StarAge::NonCosmological => {
                let birth = ctx.get_in(&self.input, &self.unit)?;
                birth.mapv(|b| now - b)
            }
            StarAge::Conformal { clock } => {
                let tau = ctx.get_in(&self.input, &UnitExpr::dimensionless())?;
                let mut birth = clock.conformal_to_physical(&tau);
                Zip::from(&mut birth).for_each(|b| *b = now - b.clamp(0.0, now));
                birth
            }
            StarAge::PhysicalCosmological { age_today, h0 } => {
                let tau = ctx.get_in(&self.input, &UnitExpr::dimensionless())?;
                let offset = age_today * h0;
                tau.mapv(|t| now - (offset + t) / h0)
            }
        };
        Ok(FieldArray::new(ages, self.unit.clone()))
    }
}

/// Register `(ptype, "star_age")` for each particle type.
pub fn register_star_age(
    registry: &mut FieldRegistry,
    ptypes: &[String],
    variant: &StarAge,
    current_time: f64,
    time_unit: &UnitExpr,
) {
    for ptype in ptypes {
        let field = StarAgeField {
            variant: variant.clone(),
            input: variant.input(ptype),
            current_time,
            unit: time_unit.clone(),
        };
        registry.register(
            FieldDefinition::derived_with((ptype.as_str(), "star_age"), time_unit.clone(), Arc::new(field))
                .particle(),
        );
    }
    tracing::debug!(ptypes = ptypes.len(), variant = ?variant, "registered star_age");
}

/// Current time in s: the age of the universe at `aexp` for cosmological
/// runs, otherwise `time · unit_t`.
pub fn current_time(params: &DatasetParams, clock: Option<&Arc<dyn CosmicClock>>) -> f64 {
    match clock {
        Some(clock) if params.cosmological_simulation => clock.age_at_scale(params.aexp),
        _ => params.time * params.unit_t,
    }
}
