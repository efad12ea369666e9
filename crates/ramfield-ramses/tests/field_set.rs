//! End-to-end field-set construction and evaluation against on-disk
//! fixtures.

use std::f64::consts::PI;
use std::path::Path;
use std::sync::Arc;

use ramfield_core::{Chunk, FieldError, FieldKey};
use ramfield_eval::{EvalContext, FieldDefinition, FieldRegistry};
use ramfield_ramses::constants::{
    HELIUM_FRACTION, MASS_HYDROGEN_CGS, MASS_PROTON_CGS, SELF_SHIELDING_DENSITY,
    SPEED_OF_LIGHT_CGS, TEMPERATURE_OVER_MU_FACTOR,
};
use ramfield_ramses::{
    BuildEnv, Capabilities, CosmicClock, DatasetParams, FieldSetBuilder, FrontendError,
    RamsesFields, RegistrationPass,
};
use ramfield_test_utils::{
    init_test_logging, write_cooling_table, write_info_file, write_rt_info_file,
    CoolingTableFixture, MockLoader,
};
use ramfield_units::UnitSymbols;

fn params(dir: &Path) -> DatasetParams {
    DatasetParams {
        directory: dir.to_path_buf(),
        ..DatasetParams::default()
    }
}

fn with_geometry(loader: MockLoader, n: usize) -> MockLoader {
    loader
        .with_field(("index", "dx"), vec![1.0; n])
        .with_field(("index", "cell_volume"), vec![1.0; n])
        .with_field(("index", "grid_level"), vec![0.0; n])
}

fn values(fields: &RamsesFields, loader: &MockLoader, category: &str, name: &str, n: usize) -> Vec<f64> {
    let ev = fields.evaluator(loader);
    let out = ev
        .get(&FieldKey::new(category, name), Chunk::new(0, n))
        .unwrap_or_else(|e| panic!("({category}, {name}): {e}"));
    out.values().iter().copied().collect()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        let tol = 1e-9 * e.abs().max(1e-300);
        assert!((a - e).abs() <= tol, "{actual:?} vs {expected:?}");
    }
}

/// Pressure giving `T/μ = t_over_mu` at density `rho`.
fn pressure_for(rho: f64, t_over_mu: f64) -> f64 {
    t_over_mu * rho / TEMPERATURE_OVER_MU_FACTOR
}

fn hydro_params(dir: &Path) -> DatasetParams {
    params(dir).with_fields([("ramses", "Density"), ("ramses", "Pressure")])
}

// ── Temperature without a cooling table ────────────────────────────

#[test]
fn temperature_over_mu_from_pressure_and_density() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let fields = FieldSetBuilder::new(hydro_params(dir.path())).build().unwrap();
    let loader = with_geometry(MockLoader::new(), 2)
        .with_field(("ramses", "Density"), vec![1e-24, 2e-24])
        .with_field(("ramses", "Pressure"), vec![1e-12, 1e-12]);

    let t = values(&fields, &loader, "gas", "temperature_over_mu", 2);
    let expected: Vec<f64> = [1e-24, 2e-24]
        .iter()
        .map(|rho| 1e-12 / rho * MASS_HYDROGEN_CGS / 1.380649e-16)
        .collect();
    assert_close(&t, &expected);
}

#[test]
fn missing_cooling_table_falls_back_with_one_warning() {
    let dir = tempfile::tempdir().unwrap();
    let fields = FieldSetBuilder::new(hydro_params(dir.path())).build().unwrap();
    assert!(!fields.capabilities.cooling);
    assert!(!fields.registry.contains(&FieldKey::new("gas", "mu")));

    let rho = 1e-24;
    let loader = with_geometry(MockLoader::new(), 1)
        .with_field(("ramses", "Density"), vec![rho])
        .with_field(("ramses", "Pressure"), vec![pressure_for(rho, 1e4)]);

    let first = values(&fields, &loader, "gas", "temperature", 1);
    let second = values(&fields, &loader, "gas", "temperature", 1);
    assert_close(&first, &[1e4]);
    assert_eq!(first, second);
    assert_eq!(fields.diagnostics.count_for("temperature-fallback"), 1);
}

#[test]
fn temperature_without_pressure_is_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let fields = FieldSetBuilder::new(params(dir.path()).with_fields([("ramses", "Density")]))
        .build()
        .unwrap();
    let loader = with_geometry(MockLoader::new(), 1).with_field(("ramses", "Density"), vec![1.0]);
    let err = fields
        .evaluator(&loader)
        .get(&FieldKey::new("gas", "temperature"), Chunk::new(0, 1))
        .unwrap_err();
    assert!(
        matches!(err, FieldError::UnknownField { ref key } if key.name == "pressure"),
        "{err}"
    );
    // The mu = 1 fallback never ran, so it is not reported.
    assert_eq!(fields.diagnostics.count_for("temperature-fallback"), 0);
}

// ── Cooling ────────────────────────────────────────────────────────

/// Density at which the hydrogen number density is `10^lognh` cm⁻³.
fn density_for(lognh: f64, z: f64) -> f64 {
    10f64.powf(lognh) * MASS_HYDROGEN_CGS / ((1.0 - HELIUM_FRACTION) * (1.0 - z))
}

#[test]
fn mu_and_temperature_from_cooling_table() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    write_cooling_table(dir.path(), 1, &CoolingTableFixture::two_by_two()).unwrap();
    let fields = FieldSetBuilder::new(hydro_params(dir.path())).build().unwrap();
    assert!(fields.capabilities.cooling);

    // lognH = 0, 1, and 2 (clamped to the table edge).
    let rho: Vec<f64> = [0.0, 1.0, 2.0].iter().map(|l| density_for(*l, 0.0)).collect();
    let pressure = rho.iter().map(|r| pressure_for(*r, 1e4)).collect();
    let loader = with_geometry(MockLoader::new(), 3)
        .with_field(("ramses", "Density"), rho.clone())
        .with_field(("ramses", "Pressure"), pressure);

    let mu = values(&fields, &loader, "gas", "mu", 3);
    assert_close(&mu, &[1.0, 1.2, 1.2]);
    let t = values(&fields, &loader, "gas", "temperature", 3);
    assert_close(&t, &[1e4, 1.2e4, 1.2e4]);
    assert_eq!(fields.diagnostics.count_for("temperature-fallback"), 0);
    assert_eq!(fields.diagnostics.count_for("missing-metallicity"), 1);

    let n = values(&fields, &loader, "gas", "number_density", 3);
    let expected_n: Vec<f64> = rho.iter().zip(&mu).map(|(r, m)| r / MASS_PROTON_CGS / m).collect();
    assert_close(&n, &expected_n);
}

#[test]
fn cooling_totals_combine_their_terms() {
    let dir = tempfile::tempdir().unwrap();
    write_cooling_table(dir.path(), 1, &CoolingTableFixture::two_by_two()).unwrap();
    let params = hydro_params(dir.path()).with_fields([
        ("ramses", "Density"),
        ("ramses", "Pressure"),
        ("ramses", "Metallicity"),
    ]);
    let fields = FieldSetBuilder::new(params).build().unwrap();

    let z = 0.02;
    let rho = density_for(0.0, z);
    let loader = with_geometry(MockLoader::new(), 1)
        .with_field(("ramses", "Density"), vec![rho])
        .with_field(("ramses", "Pressure"), vec![pressure_for(rho, 1e4)])
        .with_field(("ramses", "Metallicity"), vec![z]);

    let rate = 1e-23;
    // Z = 0.02 is solar, so the metal term is the table value.
    assert_close(&values(&fields, &loader, "gas", "cooling_metal", 1), &[rate]);
    let n = rho / MASS_PROTON_CGS;
    assert_close(&values(&fields, &loader, "gas", "cooling_compton", 1), &[rate / n]);
    assert_close(
        &values(&fields, &loader, "gas", "cooling_total", 1),
        &[rate + rate + rate / n],
    );
    assert_close(&values(&fields, &loader, "gas", "heating_total", 1), &[rate + rate / n]);
    assert_close(&values(&fields, &loader, "gas", "cooling_net", 1), &[rate]);
    assert_eq!(fields.diagnostics.count_for("missing-metallicity"), 0);

    let ev = fields.evaluator(&loader);
    let unit = ev.unit_of(&FieldKey::new("gas", "cooling_total")).unwrap();
    assert!(unit.is_equivalent(&UnitSymbols::cgs().parse("erg*cm**3/s").unwrap()));
    let unit = ev.unit_of(&FieldKey::new("gas", "HI_number_density")).unwrap();
    assert_eq!(unit.to_string(), "1/cm**3");
}

#[test]
fn rate_terms_need_metallicity() {
    let dir = tempfile::tempdir().unwrap();
    write_cooling_table(dir.path(), 1, &CoolingTableFixture::two_by_two()).unwrap();
    let fields = FieldSetBuilder::new(hydro_params(dir.path())).build().unwrap();
    let rho = density_for(0.0, 0.0);
    let loader = with_geometry(MockLoader::new(), 1)
        .with_field(("ramses", "Density"), vec![rho])
        .with_field(("ramses", "Pressure"), vec![pressure_for(rho, 1e4)]);

    let ev = fields.evaluator(&loader);
    for name in ["cooling_metal", "cooling_compton", "cooling_total", "heating_total", "cooling_net"] {
        let err = ev
            .get(&FieldKey::new("gas", name), Chunk::new(0, 1))
            .unwrap_err();
        assert!(
            matches!(err, FieldError::UnknownField { ref key }
                if key.category == "gas" && key.name == "metallicity"),
            "{name}: {err}"
        );
    }
    // mu and the species abundances take Z = 0 in nH instead.
    assert_close(&values(&fields, &loader, "gas", "mu", 1), &[1.0]);
    assert_close(&values(&fields, &loader, "gas", "HI_number_density", 1), &[1e-2]);
    assert_eq!(fields.diagnostics.count_for("missing-metallicity"), 1);
}

#[test]
fn self_shielding_boosts_the_lookup_density() {
    let dir = tempfile::tempdir().unwrap();
    write_cooling_table(dir.path(), 1, &CoolingTableFixture::two_by_two()).unwrap();
    let nh = [0.05_f64, 1.0];
    let rho: Vec<f64> = nh.iter().map(|n| density_for(n.log10(), 0.0)).collect();
    let pressure = rho.iter().map(|r| pressure_for(*r, 1e4)).collect();
    let loader = with_geometry(MockLoader::new(), 2)
        .with_field(("ramses", "Density"), rho)
        .with_field(("ramses", "Pressure"), pressure);

    // Unshielded, both cells sit on or below the first lognH row.
    let plain = FieldSetBuilder::new(hydro_params(dir.path())).build().unwrap();
    assert_close(&values(&plain, &loader, "gas", "mu", 2), &[1.0, 1.0]);

    let params = DatasetParams {
        self_shielding: true,
        ..hydro_params(dir.path())
    };
    let shielded = FieldSetBuilder::new(params).build().unwrap();
    // nH = 0.05 looks up at nH / exp(-nH / 0.01), between the rows. At
    // nH = 1 the boost hits its floor and the lookup clamps to the top.
    let effective = (nh[0] / (-nh[0] / SELF_SHIELDING_DENSITY).exp()).log10();
    assert!(effective > 0.0 && effective < 1.0, "{effective}");
    assert_close(
        &values(&shielded, &loader, "gas", "mu", 2),
        &[1.0 + 0.2 * effective, 1.2],
    );
}

#[test]
fn species_number_densities_are_abundance_layers() {
    let dir = tempfile::tempdir().unwrap();
    let mut fixture = CoolingTableFixture::two_by_two();
    // Layers run electrons, HI, HII, HeI, HeII, HeIII; each is 2x2.
    fixture.abundances[4..8].fill(-1.0);
    fixture.abundances[20..24].fill(-3.5);
    write_cooling_table(dir.path(), 1, &fixture).unwrap();
    let params = hydro_params(dir.path()).with_fields([
        ("ramses", "Density"),
        ("ramses", "Pressure"),
        ("ramses", "Metallicity"),
    ]);
    let fields = FieldSetBuilder::new(params).build().unwrap();

    let z = 0.01;
    let rho = density_for(0.5, z);
    let loader = with_geometry(MockLoader::new(), 1)
        .with_field(("ramses", "Density"), vec![rho])
        .with_field(("ramses", "Pressure"), vec![pressure_for(rho, 1e4)])
        .with_field(("ramses", "Metallicity"), vec![z]);

    let density = |name: &str| values(&fields, &loader, "gas", name, 1);
    assert_close(&density("Electron_number_density"), &[1e-2]);
    assert_close(&density("HI_number_density"), &[1e-1]);
    assert_close(&density("HII_number_density"), &[1e-2]);
    assert_close(&density("HeIII_number_density"), &[10f64.powf(-3.5)]);
    assert_eq!(fields.diagnostics.count_for("missing-metallicity"), 0);
}

#[test]
fn legacy_cooling_table_disables_cooling() {
    let dir = tempfile::tempdir().unwrap();
    write_cooling_table(dir.path(), 1, &CoolingTableFixture::two_by_two().legacy()).unwrap();
    let fields = FieldSetBuilder::new(hydro_params(dir.path())).build().unwrap();
    assert!(!fields.capabilities.cooling);
    assert_eq!(fields.diagnostics.count_for("cooling-table"), 1);
    assert!(fields.registry.contains(&FieldKey::new("gas", "temperature")));
    assert!(!fields.registry.contains(&FieldKey::new("gas", "cooling_total")));
}

// ── Magnetic and gravity ───────────────────────────────────────────

#[test]
fn magnetic_field_is_face_average_and_divergence_is_face_difference() {
    let dir = tempfile::tempdir().unwrap();
    let faces: Vec<(String, String)> = ["x", "y", "z"]
        .iter()
        .flat_map(|a| ["left", "right"].map(|s| ("ramses".to_string(), format!("B_{a}_{s}"))))
        .collect();
    // code_magnetic is one gauss when 4π·unit_d = 1.
    let params = DatasetParams {
        unit_d: 1.0 / (4.0 * PI),
        ..params(dir.path())
    }
    .with_fields(faces);
    let fields = FieldSetBuilder::new(params).build().unwrap();
    assert!(fields.capabilities.magnetic);

    let loader = MockLoader::new()
        .with_field(("index", "dx"), vec![2.0])
        .with_field(("ramses", "B_x_left"), vec![1.0])
        .with_field(("ramses", "B_x_right"), vec![3.0])
        .with_field(("ramses", "B_y_left"), vec![0.5])
        .with_field(("ramses", "B_y_right"), vec![0.5])
        .with_field(("ramses", "B_z_left"), vec![0.0])
        .with_field(("ramses", "B_z_right"), vec![0.0]);

    assert_close(&values(&fields, &loader, "gas", "magnetic_field_x", 1), &[2.0]);
    assert_close(&values(&fields, &loader, "gas", "magnetic_field_y", 1), &[0.5]);
    assert_close(&values(&fields, &loader, "gas", "magnetic_field_divergence", 1), &[1.0]);
}

#[test]
fn magnetic_family_needs_face_fields() {
    let dir = tempfile::tempdir().unwrap();
    let fields = FieldSetBuilder::new(hydro_params(dir.path())).build().unwrap();
    assert!(!fields.capabilities.magnetic);
    assert!(!fields.registry.contains(&FieldKey::new("gas", "magnetic_field_divergence")));
}

#[test]
fn potential_energy_is_potential_times_cell_mass() {
    let dir = tempfile::tempdir().unwrap();
    let params = params(dir.path()).with_fields([("ramses", "Density"), ("gravity", "Potential")]);
    let fields = FieldSetBuilder::new(params).build().unwrap();
    assert!(fields.capabilities.gravity);

    let loader = MockLoader::new()
        .with_field(("index", "cell_volume"), vec![4.0])
        .with_field(("ramses", "Density"), vec![3.0])
        .with_field(("gravity", "Potential"), vec![-2.0]);
    assert_close(&values(&fields, &loader, "gas", "potential_energy", 1), &[-24.0]);
}

// ── Radiative transfer ─────────────────────────────────────────────

fn rt_fixture(dir: &Path) -> DatasetParams {
    write_rt_info_file(
        dir,
        1,
        &[
            ("nGroups", "1".to_string()),
            ("rt_c_frac", "0.5 0.25".to_string()),
            ("unit_np", "0.2E+01".to_string()),
            ("unit_pf", "0.3E+01".to_string()),
        ],
    )
    .unwrap();
    DatasetParams {
        unit_l: SPEED_OF_LIGHT_CGS,
        max_level: 1,
        ..params(dir)
    }
    .with_fields([
        ("ramses", "Density"),
        ("ramses", "HII"),
        ("ramses-rt", "Photon_density_1"),
        ("ramses-rt", "Photon_flux_x_1"),
    ])
}

#[test]
fn photon_density_uses_per_level_light_speed() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let fields = FieldSetBuilder::new(rt_fixture(dir.path())).build().unwrap();
    assert!(fields.capabilities.rt);

    let loader = MockLoader::new()
        .with_field(("index", "grid_level"), vec![0.0, 1.0])
        .with_field(("ramses-rt", "Photon_density_1"), vec![1.0, 1.0])
        .with_field(("ramses-rt", "Photon_flux_x_1"), vec![2.0, 2.0]);
    assert_close(&values(&fields, &loader, "rt", "photon_density_1", 2), &[4.0, 8.0]);
    assert_close(&values(&fields, &loader, "rt", "photon_flux_x_1", 2), &[6.0, 6.0]);
}

#[test]
fn photon_flux_is_registered_per_axis() {
    let dir = tempfile::tempdir().unwrap();
    let mut params = rt_fixture(dir.path());
    params.fields.extend([
        FieldKey::new("ramses-rt", "Photon_flux_y_1"),
        FieldKey::new("ramses-rt", "Photon_flux_z_1"),
    ]);
    let fields = FieldSetBuilder::new(params).build().unwrap();

    let loader = MockLoader::new()
        .with_field(("ramses-rt", "Photon_flux_x_1"), vec![2.0])
        .with_field(("ramses-rt", "Photon_flux_y_1"), vec![1.0])
        .with_field(("ramses-rt", "Photon_flux_z_1"), vec![-4.0]);
    // unit_pf = 3
    assert_close(&values(&fields, &loader, "rt", "photon_flux_x_1", 1), &[6.0]);
    assert_close(&values(&fields, &loader, "rt", "photon_flux_y_1", 1), &[3.0]);
    assert_close(&values(&fields, &loader, "rt", "photon_flux_z_1", 1), &[-12.0]);

    let ev = fields.evaluator(&loader);
    let unit = ev.unit_of(&FieldKey::new("rt", "photon_flux_z_1")).unwrap();
    assert!(unit.is_equivalent(&UnitSymbols::cgs().parse("1/(cm**2*s)").unwrap()));
}

#[test]
fn photon_density_rejects_levels_beyond_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let fields = FieldSetBuilder::new(rt_fixture(dir.path())).build().unwrap();
    let loader = MockLoader::new()
        .with_field(("index", "grid_level"), vec![5.0])
        .with_field(("ramses-rt", "Photon_density_1"), vec![1.0]);
    let err = fields
        .evaluator(&loader)
        .get(&FieldKey::new("rt", "photon_density_1"), Chunk::new(0, 1))
        .unwrap_err();
    assert!(matches!(err, FieldError::Evaluation { .. }), "{err}");
}

#[test]
fn ionised_species_density_and_mass() {
    let dir = tempfile::tempdir().unwrap();
    let fields = FieldSetBuilder::new(rt_fixture(dir.path())).build().unwrap();
    // Code density is one g/cm³ and code length is c, so use the code
    // volume directly.
    let volume = SPEED_OF_LIGHT_CGS.powi(3);
    let loader = MockLoader::new()
        .with_field(("index", "cell_volume"), vec![1.0])
        .with_field(("ramses", "Density"), vec![2.0])
        .with_field(("ramses", "HII"), vec![0.25]);
    assert_close(&values(&fields, &loader, "gas", "H_p1_density", 1), &[0.5]);
    assert_close(&values(&fields, &loader, "gas", "H_p1_mass", 1), &[0.5 * volume]);
}

#[test]
fn malformed_rt_info_disables_rt() {
    let dir = tempfile::tempdir().unwrap();
    write_rt_info_file(dir.path(), 1, &[("unit_np", "1.0".to_string())]).unwrap();
    let fields = FieldSetBuilder::new(hydro_params(dir.path())).build().unwrap();
    assert!(!fields.capabilities.rt);
    assert_eq!(fields.diagnostics.count_for("rt-params"), 1);
}

// ── Particles ──────────────────────────────────────────────────────

#[test]
fn star_age_in_a_non_cosmological_run() {
    let dir = tempfile::tempdir().unwrap();
    let params = DatasetParams {
        time: 10.0,
        ..params(dir.path())
    }
    .with_particle_types(["io"])
    .with_fields([("io", "particle_birth_time"), ("io", "particle_mass")]);
    let fields = FieldSetBuilder::new(params).build().unwrap();
    let loader = MockLoader::new().with_field(("io", "particle_birth_time"), vec![3.0]);

    assert_close(&values(&fields, &loader, "io", "star_age", 1), &[7.0]);
    // The on-disk alias resolves within the particle type.
    assert_close(&values(&fields, &loader, "io", "age", 1), &[3.0]);
    let ev = fields.evaluator(&loader);
    assert_eq!(ev.unit_of(&FieldKey::new("io", "star_age")).unwrap().to_string(), "s");
}

struct FixedClock;

impl CosmicClock for FixedClock {
    fn conformal_to_physical(&self, tau: &ndarray::ArrayD<f64>) -> ndarray::ArrayD<f64> {
        tau.mapv(|t| 50.0 + t)
    }
    fn age_at_redshift(&self, z: f64) -> f64 {
        100.0 / (1.0 + z)
    }
    fn hubble_per_second(&self) -> f64 {
        1.0
    }
}

#[test]
fn star_age_with_an_injected_clock() {
    let dir = tempfile::tempdir().unwrap();
    let params = DatasetParams {
        cosmological_simulation: true,
        aexp: 0.5,
        ..params(dir.path())
    }
    .with_particle_types(["io"])
    .with_fields([("io", "conformal_birth_time")]);
    let fields = FieldSetBuilder::new(params)
        .with_clock(Arc::new(FixedClock))
        .build()
        .unwrap();
    // aexp = 0.5 is z = 1, so the current age is 50.
    assert_close(&[fields.current_time], &[50.0]);
    let loader = MockLoader::new().with_field(("io", "conformal_birth_time"), vec![-20.0]);
    assert_close(&values(&fields, &loader, "io", "star_age", 1), &[20.0]);
}

#[test]
fn star_age_from_physical_cosmological_birth_times() {
    let dir = tempfile::tempdir().unwrap();
    let params = DatasetParams {
        cosmological_simulation: true,
        use_conformal_time: false,
        aexp: 0.5,
        ..params(dir.path())
    }
    .with_particle_types(["io"])
    .with_fields([("io", "conformal_birth_time")]);
    let fields = FieldSetBuilder::new(params)
        .with_clock(Arc::new(FixedClock))
        .build()
        .unwrap();
    assert_close(&[fields.current_time], &[50.0]);
    // Birth epochs are offsets from today (age 100) in units of 1/H0 = 1 s,
    // so tau = -60 is born at t = 40 and is now 10 s old.
    let loader = MockLoader::new().with_field(("io", "conformal_birth_time"), vec![-60.0, -90.0]);
    assert_close(&values(&fields, &loader, "io", "star_age", 2), &[10.0, 40.0]);
}

// ── Info files and cosmology ───────────────────────────────────────

fn info_entries(cosmological: bool) -> Vec<(&'static str, String)> {
    let (time, aexp, h0) = if cosmological {
        ("-0.25E+01", "0.5E+00", "0.7E+02")
    } else {
        ("0.1E+02", "0.1E+01", "0.1E+01")
    };
    vec![
        ("ncpu", "1".to_string()),
        ("ndim", "3".to_string()),
        ("levelmin", "7".to_string()),
        ("levelmax", "10".to_string()),
        ("time", time.to_string()),
        ("aexp", aexp.to_string()),
        ("H0", h0.to_string()),
        ("omega_m", "0.3E+00".to_string()),
        ("omega_l", "0.7E+00".to_string()),
        ("unit_l", "0.3D+22".to_string()),
        ("unit_d", "0.2E-23".to_string()),
        ("unit_t", "0.4E+16".to_string()),
    ]
}

#[test]
fn params_from_info_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_info_file(dir.path(), 80, &info_entries(false)).unwrap();
    let params = DatasetParams::from_info_file(&path).unwrap();
    assert_eq!(params.output, 80);
    assert_eq!(params.directory, dir.path());
    assert_eq!(params.max_level, 3);
    assert_eq!(params.unit_l, 3e21);
    assert!(!params.cosmological_simulation);
    assert_eq!(params.cooling_path(), dir.path().join("cooling_00080.out"));
}

#[test]
fn cosmological_build_uses_friedmann_age() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_info_file(dir.path(), 3, &info_entries(true)).unwrap();
    let params = DatasetParams::from_info_file(&path).unwrap();
    assert!(params.cosmological_simulation);
    let fields = FieldSetBuilder::new(params).build().unwrap();
    // Flat LCDM(70, 0.3, 0.7) at z = 1 is about 5.75 Gyr old.
    let gyr = 3.15576e16;
    let age = fields.current_time / gyr;
    assert!((age - 5.75).abs() < 0.05, "{age}");
}

#[test]
fn missing_info_key_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut entries = info_entries(false);
    entries.retain(|(k, _)| *k != "unit_t");
    let path = write_info_file(dir.path(), 1, &entries).unwrap();
    let err = DatasetParams::from_info_file(&path).unwrap_err();
    assert!(err.to_string().contains("unit_t"), "{err}");
}

#[test]
fn invalid_params_abort_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let params = DatasetParams {
        unit_t: -1.0,
        ..params(dir.path())
    };
    assert!(matches!(
        FieldSetBuilder::new(params).build(),
        Err(FrontendError::Config(_))
    ));
}

// ── Overrides ──────────────────────────────────────────────────────

struct Override {
    unit: &'static str,
}

impl RegistrationPass for Override {
    fn name(&self) -> &str {
        "override"
    }

    fn apply(
        &self,
        _: &BuildEnv<'_>,
        registry: &mut FieldRegistry,
        _: &mut Capabilities,
    ) -> Result<(), FrontendError> {
        let unit = UnitSymbols::cgs().parse(self.unit)?;
        registry.register(FieldDefinition::derived(
            ("gas", "temperature"),
            unit.clone(),
            move |ctx: &mut EvalContext<'_>| {
                let t = ctx.field("gas", "temperature_over_mu")?;
                Ok(t.scale(2.0).with_unit(unit.clone()))
            },
        ));
        Ok(())
    }
}

#[test]
fn later_registration_wins_and_unit_change_warns() {
    let dir = tempfile::tempdir().unwrap();
    let same = FieldSetBuilder::new(hydro_params(dir.path()))
        .with_pass(Box::new(Override { unit: "K" }))
        .build()
        .unwrap();
    assert_eq!(same.diagnostics.count_for("field-override"), 0);
    let rho = 1.0;
    let loader = with_geometry(MockLoader::new(), 1)
        .with_field(("ramses", "Density"), vec![rho])
        .with_field(("ramses", "Pressure"), vec![pressure_for(rho, 100.0)]);
    assert_close(&values(&same, &loader, "gas", "temperature", 1), &[200.0]);

    let changed = FieldSetBuilder::new(hydro_params(dir.path()))
        .with_pass(Box::new(Override { unit: "erg" }))
        .build()
        .unwrap();
    assert_eq!(changed.diagnostics.count_for("field-override"), 1);
}
