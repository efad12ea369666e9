//! Dataset parameters and RAMSES key/value parameter files.
//!
//! [`DatasetParams`] is the configuration the field-set builder works from.
//! It can be filled in directly or read from an output's `info_XXXXX.txt`
//! with [`DatasetParams::from_info_file`].

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use ramfield_core::FieldKey;

use crate::error::{ConfigError, FrontendError};

/// Metadata for one RAMSES output.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetParams {
    /// Output number, e.g. 80 for `output_00080`.
    pub output: u32,
    /// Directory holding the output's files.
    pub directory: PathBuf,
    /// Code length unit in cm.
    pub unit_l: f64,
    /// Code density unit in g/cm³.
    pub unit_d: f64,
    /// Code time unit in s.
    pub unit_t: f64,
    /// Simulation time in code units (conformal for cosmological runs).
    pub time: f64,
    /// Expansion factor at this output.
    pub aexp: f64,
    /// Hubble constant in km/s/Mpc.
    pub h0: f64,
    /// Matter density parameter.
    pub omega_m: f64,
    /// Dark-energy density parameter.
    pub omega_l: f64,
    /// Deepest refinement level relative to the coarse level.
    pub max_level: u32,
    /// Whether the run is cosmological.
    pub cosmological_simulation: bool,
    /// Whether stellar birth times are stored as conformal times.
    pub use_conformal_time: bool,
    /// Whether cooling lookups apply the self-shielding density boost.
    pub self_shielding: bool,
    /// Spatial axes in order, e.g. `["x", "y", "z"]`.
    pub axis_order: Vec<String>,
    /// On-disk fields present in the output.
    pub fields: Vec<FieldKey>,
    /// Particle types present in the output, e.g. `["io", "sink"]`.
    pub particle_types: Vec<String>,
}

impl Default for DatasetParams {
    fn default() -> Self {
        Self {
            output: 1,
            directory: PathBuf::from("."),
            unit_l: 1.0,
            unit_d: 1.0,
            unit_t: 1.0,
            time: 0.0,
            aexp: 1.0,
            h0: 1.0,
            omega_m: 1.0,
            omega_l: 0.0,
            max_level: 0,
            cosmological_simulation: false,
            use_conformal_time: true,
            self_shielding: false,
            axis_order: ["x", "y", "z"].map(String::from).to_vec(),
            fields: Vec::new(),
            particle_types: Vec::new(),
        }
    }
}

const KNOWN_AXES: [&str; 3] = ["x", "y", "z"];

impl DatasetParams {
    /// Check the parameters for consistency.
    ///
    /// Called by the builder before any field is registered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("unit_l", self.unit_l),
            ("unit_d", self.unit_d),
            ("unit_t", self.unit_t),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidUnit { name, value });
            }
        }
        if self.cosmological_simulation {
            if !self.h0.is_finite() || self.h0 <= 0.0 {
                return Err(ConfigError::InvalidCosmology {
                    reason: format!("H0 must be positive, got {}", self.h0),
                });
            }
            if !(self.omega_m > 0.0 && self.omega_m.is_finite()) || !self.omega_l.is_finite() {
                return Err(ConfigError::InvalidCosmology {
                    reason: format!(
                        "omega_m = {}, omega_l = {}",
                        self.omega_m, self.omega_l
                    ),
                });
            }
            if !(self.aexp > 0.0 && self.aexp.is_finite()) {
                return Err(ConfigError::InvalidCosmology {
                    reason: format!("aexp must be positive, got {}", self.aexp),
                });
            }
        }
        let axes_ok = !self.axis_order.is_empty()
            && self.axis_order.len() <= KNOWN_AXES.len()
            && self
                .axis_order
                .iter()
                .enumerate()
                .all(|(i, a)| KNOWN_AXES.contains(&a.as_str()) && !self.axis_order[..i].contains(a));
        if !axes_ok {
            return Err(ConfigError::InvalidAxisOrder {
                axes: self.axis_order.clone(),
            });
        }
        Ok(())
    }

    /// Read `info_XXXXX.txt`.
    ///
    /// Takes the output number from the file name and the directory from its
    /// parent. Field and particle lists are not part of this file and are
    /// left empty.
    pub fn from_info_file(path: &Path) -> Result<Self, FrontendError> {
        let output = parse_output_number(path)?;
        let text = fs::read_to_string(path)?;
        let kv = parse_key_values(&text);
        let get = |key: &str| -> Result<f64, ConfigError> {
            let raw = kv.get(key).ok_or_else(|| ConfigError::MissingKey {
                file: path.to_path_buf(),
                key: key.to_string(),
            })?;
            parse_fortran_f64(raw).ok_or_else(|| ConfigError::BadValue {
                file: path.to_path_buf(),
                key: key.to_string(),
                value: raw.clone(),
            })
        };

        let time = get("time")?;
        let aexp = get("aexp")?;
        let h0 = get("H0")?;
        let levelmin = get("levelmin")?;
        let levelmax = get("levelmax")?;
        let ndim = kv
            .get("ndim")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(3)
            .clamp(1, 3);

        let params = Self {
            output,
            directory: path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            unit_l: get("unit_l")?,
            unit_d: get("unit_d")?,
            unit_t: get("unit_t")?,
            time,
            aexp,
            h0,
            omega_m: get("omega_m")?,
            omega_l: get("omega_l")?,
            max_level: (levelmax - levelmin).max(0.0) as u32,
            cosmological_simulation: !(time >= 0.0 && h0 == 1.0 && aexp == 1.0),
            axis_order: KNOWN_AXES[..ndim].iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        };
        tracing::debug!(
            output,
            cosmological = params.cosmological_simulation,
            max_level = params.max_level,
            "read info file"
        );
        Ok(params)
    }

    /// Builder: set the on-disk field list.
    pub fn with_fields<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<FieldKey>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set the particle types.
    pub fn with_particle_types<I, S>(mut self, ptypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.particle_types = ptypes.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `key` is listed as on disk.
    pub fn has_field(&self, key: &FieldKey) -> bool {
        self.fields.contains(key)
    }

    /// Path of this output's cooling table.
    pub fn cooling_path(&self) -> PathBuf {
        self.directory.join(format!("cooling_{:05}.out", self.output))
    }

    /// Path of this output's radiative-transfer parameter file.
    pub fn rt_info_path(&self) -> PathBuf {
        self.directory.join(format!("info_rt_{:05}.txt", self.output))
    }

    /// Hubble constant in s⁻¹.
    pub fn h0_per_second(&self) -> f64 {
        self.h0 * 1e5 / crate::constants::MPC_CGS
    }
}

/// Parse `key = value` lines. Lines without `=` are skipped; later keys
/// overwrite earlier ones.
pub fn parse_key_values(text: &str) -> IndexMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

/// Parse a Fortran-formatted real, accepting `D` exponents.
pub fn parse_fortran_f64(s: &str) -> Option<f64> {
    s.trim().replace(['D', 'd'], "E").parse().ok()
}

/// Parse a whitespace-separated list of Fortran reals.
pub fn parse_fortran_list(s: &str) -> Option<Vec<f64>> {
    s.split_whitespace().map(parse_fortran_f64).collect()
}

/// Output number from a name like `info_00080.txt` or `output_00080`.
pub fn parse_output_number(path: &Path) -> Result<u32, ConfigError> {
    let err = || ConfigError::OutputNumber {
        path: path.to_path_buf(),
    };
    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(err)?;
    let stem = name.split('.').next().unwrap_or(name);
    stem.rsplit('_')
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        DatasetParams::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_units_and_axes() {
        let p = DatasetParams {
            unit_d: 0.0,
            ..DatasetParams::default()
        };
        assert_eq!(
            p.validate(),
            Err(ConfigError::InvalidUnit {
                name: "unit_d",
                value: 0.0
            })
        );
        let p = DatasetParams {
            axis_order: vec!["x".into(), "x".into()],
            ..DatasetParams::default()
        };
        assert!(matches!(p.validate(), Err(ConfigError::InvalidAxisOrder { .. })));
    }

    #[test]
    fn cosmological_params_need_positive_h0() {
        let p = DatasetParams {
            cosmological_simulation: true,
            h0: -1.0,
            ..DatasetParams::default()
        };
        assert!(matches!(p.validate(), Err(ConfigError::InvalidCosmology { .. })));
    }

    #[test]
    fn cosmological_params_need_matter() {
        // An empty universe has no Friedmann solution to integrate.
        let p = DatasetParams {
            cosmological_simulation: true,
            omega_m: 0.0,
            omega_l: 1.0,
            ..DatasetParams::default()
        };
        assert!(matches!(p.validate(), Err(ConfigError::InvalidCosmology { .. })));
        assert!(crate::cosmology::FriedmannClock::new(p.h0, p.omega_m, p.omega_l).is_err());
        let p = DatasetParams {
            omega_m: 0.3,
            ..p
        };
        p.validate().unwrap();
    }

    #[test]
    fn key_values_and_fortran_reals() {
        let kv = parse_key_values("ncpu        =          4\nunit_l      =  0.1D+01\n\nordering type=hilbert\n");
        assert_eq!(kv["ncpu"], "4");
        assert_eq!(parse_fortran_f64(&kv["unit_l"]), Some(1.0));
        assert_eq!(kv["ordering type"], "hilbert");
        assert_eq!(
            parse_fortran_list(" 0.1E-01  0.2E-01 "),
            Some(vec![0.01, 0.02])
        );
        assert_eq!(parse_fortran_list("0.1 abc"), None);
    }

    #[test]
    fn output_numbers() {
        assert_eq!(parse_output_number(Path::new("out/info_00080.txt")), Ok(80));
        assert_eq!(parse_output_number(Path::new("output_00002")), Ok(2));
        assert!(parse_output_number(Path::new("info.txt")).is_err());
    }

    #[test]
    fn paths_use_five_digit_output() {
        let p = DatasetParams {
            output: 42,
            directory: PathBuf::from("/data/output_00042"),
            ..DatasetParams::default()
        };
        assert_eq!(
            p.cooling_path(),
            PathBuf::from("/data/output_00042/cooling_00042.out")
        );
        assert_eq!(
            p.rt_info_path(),
            PathBuf::from("/data/output_00042/info_rt_00042.txt")
        );
    }
}
