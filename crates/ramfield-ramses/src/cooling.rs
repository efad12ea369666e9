//! Cooling tables and the cooling/heating field family.
//!
//! A RAMSES cooling table (`cooling_XXXXX.out`) holds log10 rates sampled
//! on a `(lognH, logT)` grid. Fields are looked up at each cell's hydrogen
//! number density and `T/μ`, with optional self-shielding.
//!
//! # File layout
//!
//! Fortran sequential records:
//!
//! ```text
//! [n1, n2]            i32 x 2
//! lognH               f64 x n1
//! logT                f64 x n2
//! 11 tables           f64 x n1*n2 each, Fortran order
//! abundances          f64 x n1*n2*6, Fortran order
//! ```
//!
//! A first table of only `n1` values marks the unsupported pre-2010 layout.
//! With a single temperature bin (`n2 = 1`) every table has `n1` values, so
//! such files also read as legacy.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use ndarray::{Array2, Array3, ArrayD, ShapeBuilder, Zip};
use ramfield_core::{Diagnostics, FieldArray, FieldError, FieldKey};
use ramfield_eval::{DeclaredUnit, DerivedField, EvalContext, FieldDefinition, FieldRegistry};
use ramfield_interp::{BilinearInterpolator, BoundsPolicy, TableStack};
use ramfield_units::{Quantity, UnitExpr, UnitSymbols};

use crate::constants::{
    HELIUM_FRACTION, MASS_HYDROGEN_CGS, MASS_PROTON_CGS, SELF_SHIELDING_DENSITY,
    SELF_SHIELDING_FLOOR, SOLAR_METALLICITY,
};
use crate::error::{FrontendError, TableError};
use crate::record::FortranReader;
use crate::units::UnitSystem;

/// Unit of tabulated cooling functions.
pub const COOLING_FUNCTION_UNITS: &str = " erg * cm**3 /s";

/// Unit of tabulated cooling-function temperature derivatives.
pub const COOLING_FUNCTION_PRIME_UNITS: &str = " erg * cm**3 /s/K";

/// The 2-D tables in file order, with their units (`None` for `mu`).
pub const TABLES: [(&str, Option<&str>); 11] = [
    ("cooling_primordial", Some(COOLING_FUNCTION_UNITS)),
    ("heating_primordial", Some(COOLING_FUNCTION_UNITS)),
    ("cooling_compton", Some(COOLING_FUNCTION_UNITS)),
    ("heating_compton", Some(COOLING_FUNCTION_UNITS)),
    ("cooling_metal", Some(COOLING_FUNCTION_UNITS)),
    ("cooling_primordial_prime", Some(COOLING_FUNCTION_PRIME_UNITS)),
    ("heating_primordial_prime", Some(COOLING_FUNCTION_PRIME_UNITS)),
    ("cooling_compton_prime", Some(COOLING_FUNCTION_PRIME_UNITS)),
    ("heating_compton_prime", Some(COOLING_FUNCTION_PRIME_UNITS)),
    ("cooling_metal_prime", Some(COOLING_FUNCTION_PRIME_UNITS)),
    ("mu", None),
];

/// Species of the abundance stack, in stack order.
pub const SPECIES: [&str; 6] = [
    "Electron_number_density",
    "HI_number_density",
    "HII_number_density",
    "HeI_number_density",
    "HeII_number_density",
    "HeIII_number_density",
];

/// A parsed cooling table.
#[derive(Clone, Debug)]
pub struct CoolingTable {
    /// log10 hydrogen number density samples (cm⁻³).
    pub lognh: Vec<f64>,
    /// log10 `T/μ` samples (K).
    pub logt: Vec<f64>,
    /// 2-D tables by name, in file order.
    pub tables: IndexMap<String, Array2<f64>>,
    /// Species abundance tables, one layer per entry of [`SPECIES`].
    pub abundances: Option<TableStack>,
}

fn corrupt(reason: impl Into<String>) -> TableError {
    TableError::Corrupt {
        reason: reason.into(),
    }
}

impl CoolingTable {
    /// Read a cooling table file.
    pub fn read(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path)?;
        let mut r = FortranReader::new(BufReader::new(file));

        let header = r.read_i32s()?;
        let (n1, n2) = match header.as_slice() {
            [a, b] if *a > 0 && *b > 0 => (*a as usize, *b as usize),
            other => return Err(corrupt(format!("bad table header {other:?}"))),
        };
        let lognh = r.read_f64s()?;
        let logt = r.read_f64s()?;
        if lognh.len() != n1 || logt.len() != n2 {
            return Err(corrupt(format!(
                "axes of length {} and {} do not match header ({n1}, {n2})",
                lognh.len(),
                logt.len()
            )));
        }

        let plane = n1 * n2;
        let mut tables = IndexMap::new();
        let mut abundances = None;
        let names = TABLES.iter().map(|(n, _)| *n).chain(["abundances"]);
        for (i, name) in names.enumerate() {
            let var = r.read_f64s()?;
            if i == 0 && var.len() == n1 {
                return Err(TableError::LegacyFormat);
            }
            if var.len() == plane {
                let table = Array2::from_shape_vec((n1, n2).f(), var)
                    .map_err(|e| corrupt(format!("{name}: {e}")))?;
                tables.insert(name.to_string(), table);
            } else if !var.is_empty() && var.len() % plane == 0 {
                let k = var.len() / plane;
                if k != SPECIES.len() {
                    tracing::debug!(table = name, layers = k, "unexpected species count");
                }
                let stack = Array3::from_shape_vec((n1, n2, k).f(), var)
                    .map_err(|e| corrupt(format!("{name}: {e}")))?;
                let stack = TableStack::new(lognh.clone(), logt.clone(), stack)
                    .map_err(|e| corrupt(format!("{name}: {e}")))?;
                abundances = Some(stack);
            } else {
                return Err(corrupt(format!(
                    "{name}: {} values do not tile a {n1}x{n2} grid",
                    var.len()
                )));
            }
        }
        if !tables.contains_key("mu") {
            return Err(corrupt("no mu table"));
        }
        Ok(Self {
            lognh,
            logt,
            tables,
            abundances,
        })
    }

    /// A clamping interpolator over `table`.
    pub fn interpolator(&self, table: &Array2<f64>) -> Result<BilinearInterpolator, TableError> {
        BilinearInterpolator::new(
            self.lognh.clone(),
            self.logt.clone(),
            table.clone(),
            BoundsPolicy::Clamp,
        )
        .map_err(|e| corrupt(e.to_string()))
    }
}

/// Outcome of looking for a dataset's cooling table.
#[derive(Debug)]
pub enum CoolingProbe {
    /// The table was read.
    Found(CoolingTable),
    /// No file exists.
    Missing,
    /// A file exists but cannot be used.
    Unusable(TableError),
}

/// Look for and read the cooling table at `path`.
///
/// Absent, legacy, and corrupt files are reported as outcomes; other I/O
/// failures are errors.
pub fn probe(path: &Path) -> Result<CoolingProbe, TableError> {
    if !path.exists() {
        return Ok(CoolingProbe::Missing);
    }
    match CoolingTable::read(path) {
        Ok(table) => Ok(CoolingProbe::Found(table)),
        Err(e) if e.is_malformed() => Ok(CoolingProbe::Unusable(e)),
        Err(e) => Err(e),
    }
}

/// How a looked-up table value becomes a field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupKind {
    /// Stored linearly; used as-is.
    Mu,
    /// Stored as log10; exponentiated.
    Rate,
    /// Exponentiated, then scaled by metallicity over solar.
    Metal,
    /// Exponentiated per-volume rate, divided by the number density.
    Compton,
}

impl LookupKind {
    /// Classify a table by the words in its name.
    pub fn for_table(name: &str) -> Self {
        let mut words = name.split('_');
        if name == "mu" {
            Self::Mu
        } else if words.clone().any(|w| w == "metal") {
            Self::Metal
        } else if words.any(|w| w == "compton") {
            Self::Compton
        } else {
            Self::Rate
        }
    }
}

/// What a lookup does when the dataset has no metallicity field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingMetallicity {
    /// Fail with [`FieldError::UnknownField`] naming `("gas", "metallicity")`.
    Fail,
    /// Take Z = 0 when computing nH and record a one-time
    /// `missing-metallicity` warning.
    AssumeZero,
}

impl MissingMetallicity {
    /// Rate tables need metallicity; `mu` and the species abundances
    /// degrade to Z = 0 in nH.
    pub fn for_kind(kind: LookupKind) -> Self {
        match kind {
            LookupKind::Mu => Self::AssumeZero,
            LookupKind::Rate | LookupKind::Metal | LookupKind::Compton => Self::Fail,
        }
    }
}

/// Cell-wise lookup in one cooling table.
pub struct TableLookup {
    key: FieldKey,
    kind: LookupKind,
    missing_z: MissingMetallicity,
    interp: BilinearInterpolator,
    /// Unit of the exponentiated table value.
    unit: UnitExpr,
    self_shielding: bool,
    diagnostics: Diagnostics,
}

/// Metallicity per cell. Without a metallicity field this either fails or
/// yields zeros, per `policy`.
fn metallicity(
    ctx: &mut EvalContext<'_>,
    policy: MissingMetallicity,
    shape: &[usize],
    diagnostics: &Diagnostics,
) -> Result<ArrayD<f64>, FieldError> {
    let key = FieldKey::new("gas", "metallicity");
    if policy == MissingMetallicity::Fail || ctx.contains(&key) {
        return ctx.get_in(&key, &UnitExpr::dimensionless());
    }
    diagnostics.warn_once(
        "missing-metallicity",
        "no metallicity field; mu and species abundances assume Z = 0 in nH",
    );
    Ok(ArrayD::zeros(shape))
}

impl TableLookup {
    fn lookup(&self, ctx: &mut EvalContext<'_>) -> Result<(ArrayD<f64>, ArrayD<f64>), FieldError> {
        let cgs = UnitSymbols::cgs();
        let t_over_mu = ctx.get_in(&FieldKey::new("gas", "temperature_over_mu"), &cgs.parse("K")?)?;
        let rho = ctx.get_in(&FieldKey::new("gas", "density"), &cgs.parse("g/cm**3")?)?;
        let z = metallicity(ctx, self.missing_z, rho.shape(), &self.diagnostics)?;
        if rho.shape() != z.shape() || rho.shape() != t_over_mu.shape() {
            return Err(FieldError::ShapeMismatch {
                left: rho.shape().to_vec(),
                right: z.shape().to_vec(),
            });
        }

        let mut lognh = ArrayD::zeros(rho.raw_dim());
        let shielding = self.self_shielding;
        Zip::from(&mut lognh)
            .and(&rho)
            .and(&z)
            .for_each(|out, &rho, &z| {
                let nh = (1.0 - HELIUM_FRACTION) * (1.0 - z) * rho / MASS_HYDROGEN_CGS;
                let boost = if shielding {
                    (-nh / SELF_SHIELDING_DENSITY).exp().max(SELF_SHIELDING_FLOOR)
                } else {
                    1.0
                };
                *out = (nh / boost).log10();
            });
        let logt = t_over_mu.mapv(f64::log10);

        let raw = self
            .interp
            .evaluate(&lognh, &logt)
            .map_err(|e| FieldError::Evaluation {
                key: self.key.clone(),
                reason: e.to_string(),
            })?;
        Ok((raw, z))
    }
}

impl DerivedField for TableLookup {
    fn evaluate(&self, ctx: &mut EvalContext<'_>) -> Result<FieldArray, FieldError> {
        let (raw, z) = self.lookup(ctx)?;
        match self.kind {
            LookupKind::Mu => Ok(FieldArray::dimensionless(raw)),
            LookupKind::Rate => Ok(FieldArray::new(raw.mapv(|v| 10f64.powf(v)), self.unit.clone())),
            LookupKind::Metal => {
                let mut out = raw.mapv(|v| 10f64.powf(v));
                Zip::from(&mut out)
                    .and(&z)
                    .for_each(|v, &z| *v *= z / SOLAR_METALLICITY);
                Ok(FieldArray::new(out, self.unit.clone()))
            }
            LookupKind::Compton => {
                let per_volume = self.unit.divide(&UnitSymbols::cgs().parse("cm**3")?)?;
                let rate = FieldArray::new(raw.mapv(|v| 10f64.powf(v)), per_volume);
                let n = ctx.field("gas", "number_density")?;
                rate.div(&n)
            }
        }
    }
}

/// Register the cooling family from a parsed table.
pub fn register_cooling_fields(
    registry: &mut FieldRegistry,
    table: &CoolingTable,
    units: &UnitSystem,
    self_shielding: bool,
    diagnostics: &Diagnostics,
) -> Result<(), FrontendError> {
    let cgs = UnitSymbols::cgs();
    let lookup = |name: &str,
                  kind: LookupKind,
                  unit: UnitExpr,
                  grid: &Array2<f64>|
     -> Result<Arc<dyn DerivedField>, FrontendError> {
        Ok(Arc::new(TableLookup {
            key: FieldKey::new("gas", name),
            kind,
            missing_z: MissingMetallicity::for_kind(kind),
            interp: table.interpolator(grid)?,
            unit,
            self_shielding,
            diagnostics: diagnostics.clone(),
        }))
    };

    // mu first: number_density and the Compton terms depend on it.
    let mu = table
        .tables
        .get("mu")
        .ok_or_else(|| corrupt("no mu table"))?;
    registry.register(FieldDefinition::derived_with(
        ("gas", "mu"),
        DeclaredUnit::Dimensionless,
        lookup("mu", LookupKind::Mu, UnitExpr::dimensionless(), mu)?,
    ));

    registry.register(FieldDefinition::derived(
        ("gas", "number_density"),
        units.number_density.clone(),
        |ctx: &mut EvalContext<'_>| {
            let rho = ctx.field("gas", "density")?;
            let mu = ctx.field("gas", "mu")?;
            let m_p = Quantity::new(MASS_PROTON_CGS, UnitSymbols::cgs().parse("g")?);
            rho.div_quantity(&m_p)?.div(&mu)
        },
    ));

    for (name, unit) in TABLES.iter().filter(|(n, _)| *n != "mu") {
        let Some(grid) = table.tables.get(*name) else {
            continue;
        };
        let unit = cgs.parse(unit.unwrap_or(""))?;
        registry.register(FieldDefinition::derived_with(
            ("gas", *name),
            unit.clone(),
            lookup(*name, LookupKind::for_table(name), unit, grid)?,
        ));
    }
    let species = table
        .abundances
        .as_ref()
        .map(|stack| stack.layers(BoundsPolicy::Clamp))
        .unwrap_or_default();
    for (name, interp) in SPECIES.iter().zip(species) {
        let unit = units.number_density.clone();
        registry.register(FieldDefinition::derived_with(
            ("gas", *name),
            unit.clone(),
            Arc::new(TableLookup {
                key: FieldKey::new("gas", *name),
                kind: LookupKind::Rate,
                missing_z: MissingMetallicity::AssumeZero,
                interp,
                unit,
                self_shielding,
                diagnostics: diagnostics.clone(),
            }),
        ));
    }

    let cooling_unit = cgs.parse(COOLING_FUNCTION_UNITS)?;
    registry.register(FieldDefinition::derived(
        ("gas", "cooling_total"),
        cooling_unit.clone(),
        |ctx: &mut EvalContext<'_>| {
            let primordial = ctx.field("gas", "cooling_primordial")?;
            let metal = ctx.field("gas", "cooling_metal")?;
            let compton = ctx.field("gas", "cooling_compton")?;
            primordial.add(&metal)?.add(&compton)
        },
    ));
    registry.register(FieldDefinition::derived(
        ("gas", "heating_total"),
        cooling_unit.clone(),
        |ctx: &mut EvalContext<'_>| {
            let primordial = ctx.field("gas", "heating_primordial")?;
            let compton = ctx.field("gas", "heating_compton")?;
            primordial.add(&compton)
        },
    ));
    registry.register(FieldDefinition::derived(
        ("gas", "cooling_net"),
        cooling_unit,
        |ctx: &mut EvalContext<'_>| {
            let cooling = ctx.field("gas", "cooling_total")?;
            let heating = ctx.field("gas", "heating_total")?;
            cooling.sub(&heating)
        },
    ));
    tracing::info!(
        tables = table.tables.len(),
        species = table.abundances.as_ref().map_or(0, TableStack::n_layers),
        "registered cooling fields"
    );
    Ok(())
}
