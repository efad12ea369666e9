//! Dataset unit symbols and the output unit system.

use std::f64::consts::PI;

use ramfield_units::{BaseDimension, Dimensions, UnitError, UnitExpr, UnitSymbols};

use crate::params::DatasetParams;

/// CGS symbols extended with the dataset's `code_*` units.
///
/// | symbol | value |
/// |--------|-------|
/// | `code_length` | `unit_l` cm |
/// | `code_density` | `unit_d` g/cm³ |
/// | `code_time` | `unit_t` s |
/// | `code_mass` | `unit_d · unit_l³` g |
/// | `code_velocity` | `unit_l / unit_t` cm/s |
/// | `code_pressure` | `unit_d · (unit_l / unit_t)²` dyne/cm² |
/// | `code_magnetic` | `sqrt(4π · unit_d) · unit_l / unit_t` gauss |
pub fn dataset_symbols(params: &DatasetParams) -> Result<UnitSymbols, UnitError> {
    let mut t = UnitSymbols::cgs();
    let (l, d, time) = (params.unit_l, params.unit_d, params.unit_t);
    let v = l / time;

    t.define("code_length", Dimensions::from_ints(1, 0, 0, 0), l)?;
    t.define("code_density", Dimensions::from_ints(-3, 1, 0, 0), d)?;
    t.define("code_time", Dimensions::from_ints(0, 0, 1, 0), time)?;
    t.define("code_mass", Dimensions::from_ints(0, 1, 0, 0), d * l.powi(3))?;
    t.define("code_velocity", Dimensions::from_ints(1, 0, -1, 0), v)?;
    t.define("code_pressure", Dimensions::from_ints(-1, 1, -2, 0), d * v * v)?;
    t.define(
        "code_magnetic",
        Dimensions::magnetic(),
        (4.0 * PI * d).sqrt() * v,
    )?;
    t.define("code_temperature", Dimensions::from_ints(0, 0, 0, 1), 1.0)?;
    Ok(t)
}

/// The units derived fields are delivered in.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitSystem {
    /// Name, e.g. `"cgs"`.
    pub name: String,
    /// Length.
    pub length: UnitExpr,
    /// Mass.
    pub mass: UnitExpr,
    /// Time.
    pub time: UnitExpr,
    /// Temperature.
    pub temperature: UnitExpr,
    /// Mass density.
    pub density: UnitExpr,
    /// Number density.
    pub number_density: UnitExpr,
    /// Energy.
    pub energy: UnitExpr,
    /// Pressure.
    pub pressure: UnitExpr,
    /// Velocity.
    pub velocity: UnitExpr,
    /// Magnetic field strength in Gaussian units.
    pub magnetic_field: UnitExpr,
    /// Specific energy.
    pub specific_energy: UnitExpr,
    /// Acceleration.
    pub acceleration: UnitExpr,
}

impl UnitSystem {
    /// The CGS system.
    pub fn cgs(symbols: &UnitSymbols) -> Result<Self, UnitError> {
        let p = |s: &str| symbols.parse(s);
        Ok(Self {
            name: "cgs".to_string(),
            length: p("cm")?,
            mass: p("g")?,
            time: p("s")?,
            temperature: p("K")?,
            density: p("g/cm**3")?,
            number_density: p("1/cm**3")?,
            energy: p("erg")?,
            pressure: p("dyne/cm**2")?,
            velocity: p("cm/s")?,
            magnetic_field: p("gauss")?,
            specific_energy: p("erg/g")?,
            acceleration: p("cm/s**2")?,
        })
    }

    /// The unit this system delivers quantities of dimension `dims` in.
    ///
    /// A named unit of the system is preferred; otherwise the unit is
    /// composed from the base units.
    pub fn express(&self, dims: &Dimensions) -> Result<UnitExpr, UnitError> {
        let named = [
            &self.length,
            &self.mass,
            &self.time,
            &self.temperature,
            &self.density,
            &self.number_density,
            &self.energy,
            &self.pressure,
            &self.velocity,
            &self.magnetic_field,
            &self.specific_energy,
            &self.acceleration,
        ];
        if let Some(unit) = named.into_iter().find(|u| u.dims() == dims) {
            return Ok(unit.clone());
        }
        [
            (&self.length, BaseDimension::Length),
            (&self.mass, BaseDimension::Mass),
            (&self.time, BaseDimension::Time),
            (&self.temperature, BaseDimension::Temperature),
        ]
        .into_iter()
        .try_fold(UnitExpr::dimensionless(), |acc, (unit, dim)| {
            acc.multiply(&unit.pow(dims.exponent(dim))?)
        })
    }

    /// Photon flux: per area per time.
    pub fn photon_flux(&self) -> Result<UnitExpr, UnitError> {
        self.time.multiply(&self.length.powi(2)?)?.powi(-1)
    }
}
