//! RAMSES frontend for the Ramfield field engine.
//!
//! Given a dataset's parameters and the list of fields present on disk,
//! [`FieldSetBuilder`] produces a [`RamsesFields`]: a registry of raw and
//! derived fields with their units, plus the dataset's unit tables and a
//! record of which optional field families are available.
//!
//! ```no_run
//! use ramfield_ramses::{DatasetParams, FieldSetBuilder};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), ramfield_ramses::FrontendError> {
//! let params = DatasetParams::from_info_file(Path::new("output_00080/info_00080.txt"))?
//!     .with_fields([("ramses", "Density"), ("ramses", "Pressure")]);
//! let fields = FieldSetBuilder::new(params).build()?;
//! assert!(fields.registry.contains(&("gas", "temperature").into()));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod constants;
pub mod cooling;
pub mod cosmology;
pub mod error;
pub mod gravity;
pub mod known;
pub mod magnetic;
pub mod params;
pub mod particles;
pub mod record;
pub mod rt;
pub mod thermal;
pub mod units;

pub use builder::{
    BuildEnv, Capabilities, FieldSetBuilder, FluidPass, KnownFieldsPass, ParticlePass,
    RamsesFields, RegistrationPass, UniversalPass,
};
pub use cooling::{CoolingProbe, CoolingTable};
pub use cosmology::{ClockConfig, CosmicClock, FriedmannClock};
pub use error::{ConfigError, FrontendError, TableError};
pub use params::DatasetParams;
pub use particles::StarAge;
pub use rt::RtParams;
pub use units::{dataset_symbols, UnitSystem};
