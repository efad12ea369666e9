//! Physical constants and RAMSES conventions, in CGS.

/// Hydrogen atom mass in g.
pub const MASS_HYDROGEN_CGS: f64 = 1.673_735_223_805_186_8e-24;

/// Proton mass in g.
pub const MASS_PROTON_CGS: f64 = 1.672_621_92e-24;

/// Boltzmann constant in erg/K.
pub const BOLTZMANN_CGS: f64 = 1.380_649e-16;

/// Speed of light in cm/s.
pub const SPEED_OF_LIGHT_CGS: f64 = 2.997_924_58e10;

/// Megaparsec in cm.
pub const MPC_CGS: f64 = 3.085_677_581_491_367_3e24;

/// Hydrogen mass fraction assumed by RAMSES.
pub const HYDROGEN_FRACTION: f64 = 0.76;

/// Helium mass fraction assumed by RAMSES.
pub const HELIUM_FRACTION: f64 = 0.24;

/// Solar metallicity used to scale metal cooling.
pub const SOLAR_METALLICITY: f64 = 0.02;

/// Hydrogen density (cm⁻³) setting the self-shielding e-folding scale.
pub const SELF_SHIELDING_DENSITY: f64 = 0.01;

/// Lower bound on the self-shielding boost factor.
pub const SELF_SHIELDING_FLOOR: f64 = 1e-20;

/// `m_H / k_B` in K·s²/cm², the factor taking P/ρ to T/μ.
pub const TEMPERATURE_OVER_MU_FACTOR: f64 = MASS_HYDROGEN_CGS / BOLTZMANN_CGS;
