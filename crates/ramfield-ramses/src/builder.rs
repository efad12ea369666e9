//! Field-set construction for one dataset.
//!
//! [`FieldSetBuilder`] validates the dataset parameters, builds the unit
//! tables, and runs an ordered list of [`RegistrationPass`]es over a single
//! registry:
//!
//! 1. known on-disk fields and geometry
//! 2. universal fluid fields (`cell_mass`)
//! 3. fluid families (temperature, cooling, RT, magnetic, gravity)
//! 4. particle fields (`star_age`)
//!
//! Later passes read what earlier passes registered; a later registration
//! of the same key replaces the earlier one.

use std::sync::Arc;

use ramfield_core::{Diagnostics, RawLoader};
use ramfield_eval::{EvalContext, Evaluator, FieldDefinition, FieldRegistry};
use ramfield_units::UnitSymbols;

use crate::cooling::{self, CoolingProbe};
use crate::cosmology::{CosmicClock, FriedmannClock};
use crate::error::FrontendError;
use crate::gravity;
use crate::known;
use crate::magnetic;
use crate::params::DatasetParams;
use crate::particles::{self, StarAge};
use crate::rt::{self, RtParams};
use crate::thermal;
use crate::units::{dataset_symbols, UnitSystem};

/// Which optional field families a dataset supports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// A cooling table was read.
    pub cooling: bool,
    /// RT parameters were read.
    pub rt: bool,
    /// Face-centred magnetic fields are on disk.
    pub magnetic: bool,
    /// A gravitational potential is on disk.
    pub gravity: bool,
}

/// Read-only inputs shared by every registration pass.
pub struct BuildEnv<'a> {
    /// Dataset parameters.
    pub params: &'a DatasetParams,
    /// Dataset unit symbols.
    pub symbols: &'a UnitSymbols,
    /// Output unit system.
    pub units: &'a UnitSystem,
    /// Warning sink shared with the registry.
    pub diagnostics: &'a Diagnostics,
    /// Cosmic clock, present for cosmological runs.
    pub clock: Option<&'a Arc<dyn CosmicClock>>,
    /// Current time in s.
    pub current_time: f64,
}

/// One step of field-set construction.
///
/// # Contract
///
/// - A pass may read the registry as left by earlier passes.
/// - A pass reports optional families it enabled through `caps`.
/// - Missing optional inputs disable a family; only unexpected failures
///   are returned as errors.
///
/// # Object safety
///
/// This trait is object-safe; the builder stores passes as
/// `Vec<Box<dyn RegistrationPass>>`.
pub trait RegistrationPass: Send + Sync {
    /// Name for logging.
    fn name(&self) -> &str;

    /// Register this pass's fields.
    fn apply(
        &self,
        env: &BuildEnv<'_>,
        registry: &mut FieldRegistry,
        caps: &mut Capabilities,
    ) -> Result<(), FrontendError>;
}

// ── Passes ─────────────────────────────────────────────────────────

/// Registers on-disk fields, their aliases, and cell geometry.
pub struct KnownFieldsPass;

impl RegistrationPass for KnownFieldsPass {
    fn name(&self) -> &str {
        "known"
    }

    fn apply(
        &self,
        env: &BuildEnv<'_>,
        registry: &mut FieldRegistry,
        _: &mut Capabilities,
    ) -> Result<(), FrontendError> {
        known::seed_known_fields(registry, env.params, env.symbols, env.units)
    }
}

/// Registers fields every fluid dataset has.
pub struct UniversalPass;

impl RegistrationPass for UniversalPass {
    fn name(&self) -> &str {
        "universal"
    }

    fn apply(
        &self,
        env: &BuildEnv<'_>,
        registry: &mut FieldRegistry,
        _: &mut Capabilities,
    ) -> Result<(), FrontendError> {
        registry.register(FieldDefinition::derived(
            ("gas", "cell_mass"),
            env.units.mass.clone(),
            |ctx: &mut EvalContext<'_>| {
                let rho = ctx.field("gas", "density")?;
                let volume = ctx.field("gas", "cell_volume")?;
                rho.mul(&volume)
            },
        ));
        Ok(())
    }
}

/// Registers temperature and the optional fluid families.
pub struct FluidPass;

impl FluidPass {
    fn cooling(
        &self,
        env: &BuildEnv<'_>,
        registry: &mut FieldRegistry,
    ) -> Result<bool, FrontendError> {
        let path = env.params.cooling_path();
        match cooling::probe(&path)? {
            CoolingProbe::Found(table) => {
                cooling::register_cooling_fields(
                    registry,
                    &table,
                    env.units,
                    env.params.self_shielding,
                    env.diagnostics,
                )?;
                Ok(true)
            }
            CoolingProbe::Missing => {
                env.diagnostics.warn(
                    "cooling-table",
                    format!("{} not found; cooling fields disabled", path.display()),
                );
                Ok(false)
            }
            CoolingProbe::Unusable(e) => {
                env.diagnostics.warn(
                    "cooling-table",
                    format!("{}: {e}; cooling fields disabled", path.display()),
                );
                Ok(false)
            }
        }
    }

    fn rt(&self, env: &BuildEnv<'_>, registry: &mut FieldRegistry) -> Result<bool, FrontendError> {
        let path = env.params.rt_info_path();
        if !path.exists() {
            return Ok(false);
        }
        match RtParams::read(&path, env.params.max_level) {
            Ok(params) => {
                rt::register_rt_fields(registry, &params, env.params, env.units)?;
                Ok(true)
            }
            Err(FrontendError::Config(e)) => {
                env.diagnostics
                    .warn("rt-params", format!("{e}; radiative-transfer fields disabled"));
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

impl RegistrationPass for FluidPass {
    fn name(&self) -> &str {
        "fluid"
    }

    fn apply(
        &self,
        env: &BuildEnv<'_>,
        registry: &mut FieldRegistry,
        caps: &mut Capabilities,
    ) -> Result<(), FrontendError> {
        thermal::register_temperature_over_mu(registry, env.units);
        caps.cooling = self.cooling(env, registry)?;
        thermal::register_temperature(registry, env.units, caps.cooling, env.diagnostics)?;
        caps.rt = self.rt(env, registry)?;

        if registry.contains(&magnetic::gate()) {
            magnetic::register_magnetic_fields(registry, env.units, &env.params.axis_order)?;
            caps.magnetic = true;
        }
        if registry.contains(&gravity::gate()) {
            gravity::register_gravity_fields(registry, env.units);
            caps.gravity = true;
        }
        Ok(())
    }
}

/// Registers per-particle-type derived fields.
pub struct ParticlePass;

impl RegistrationPass for ParticlePass {
    fn name(&self) -> &str {
        "particle"
    }

    fn apply(
        &self,
        env: &BuildEnv<'_>,
        registry: &mut FieldRegistry,
        _: &mut Capabilities,
    ) -> Result<(), FrontendError> {
        let Some(variant) = StarAge::for_dataset(env.params, env.clock) else {
            env.diagnostics
                .warn("star-age", "cosmological dataset without a clock; star_age disabled");
            return Ok(());
        };
        particles::register_star_age(
            registry,
            &env.params.particle_types,
            &variant,
            env.current_time,
            &env.units.time,
        );
        Ok(())
    }
}

// ── Builder ────────────────────────────────────────────────────────

/// Builds a dataset's [`RamsesFields`].
pub struct FieldSetBuilder {
    params: DatasetParams,
    clock: Option<Arc<dyn CosmicClock>>,
    passes: Vec<Box<dyn RegistrationPass>>,
}

impl FieldSetBuilder {
    /// A builder with the standard passes.
    pub fn new(params: DatasetParams) -> Self {
        Self {
            params,
            clock: None,
            passes: vec![
                Box::new(KnownFieldsPass),
                Box::new(UniversalPass),
                Box::new(FluidPass),
                Box::new(ParticlePass),
            ],
        }
    }

    /// Use `clock` instead of a [`FriedmannClock`] built from the
    /// parameters.
    pub fn with_clock(mut self, clock: Arc<dyn CosmicClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Append a pass after the standard ones.
    pub fn with_pass(mut self, pass: Box<dyn RegistrationPass>) -> Self {
        self.passes.push(pass);
        self
    }

    /// Validate, run every pass, and return the field set.
    pub fn build(self) -> Result<RamsesFields, FrontendError> {
        let Self {
            params,
            clock,
            passes,
        } = self;
        params.validate()?;

        let symbols = dataset_symbols(&params)?;
        let units = UnitSystem::cgs(&symbols)?;
        let clock = match clock {
            Some(c) => Some(c),
            None if params.cosmological_simulation => {
                Some(Arc::new(FriedmannClock::from_params(&params)?) as Arc<dyn CosmicClock>)
            }
            None => None,
        };
        let current_time = particles::current_time(&params, clock.as_ref());

        let diagnostics = Diagnostics::new();
        let mut registry = FieldRegistry::with_diagnostics(diagnostics.clone());
        let mut capabilities = Capabilities::default();
        {
            let env = BuildEnv {
                params: &params,
                symbols: &symbols,
                units: &units,
                diagnostics: &diagnostics,
                clock: clock.as_ref(),
                current_time,
            };
            for pass in &passes {
                let before = registry.len();
                pass.apply(&env, &mut registry, &mut capabilities)?;
                tracing::debug!(
                    pass = pass.name(),
                    added = registry.len().saturating_sub(before),
                    "registration pass done"
                );
            }
        }
        tracing::info!(
            output = params.output,
            fields = registry.len(),
            ?capabilities,
            "field set built"
        );

        Ok(RamsesFields {
            params,
            registry,
            symbols,
            units,
            diagnostics,
            capabilities,
            current_time,
        })
    }
}

/// A dataset's complete field set.
pub struct RamsesFields {
    /// Parameters the set was built from.
    pub params: DatasetParams,
    /// Every registered field.
    pub registry: FieldRegistry,
    /// Dataset unit symbols, including `code_*` units.
    pub symbols: UnitSymbols,
    /// Output unit system.
    pub units: UnitSystem,
    /// Warnings raised while building and evaluating.
    pub diagnostics: Diagnostics,
    /// Optional families present.
    pub capabilities: Capabilities,
    /// Current time in s.
    pub current_time: f64,
}

impl RamsesFields {
    /// An evaluator reading raw data from `loader`.
    pub fn evaluator<'a>(&'a self, loader: &'a dyn RawLoader) -> Evaluator<'a> {
        Evaluator::new(&self.registry, loader)
    }
}

impl std::fmt::Debug for RamsesFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RamsesFields")
            .field("output", &self.params.output)
            .field("fields", &self.registry.len())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
