//! Cosmic time: conformal-to-physical conversion for cosmological runs.
//!
//! RAMSES records stellar birth epochs in cosmological runs as
//! super-conformal time τ, defined by `dτ = H0 dt / a²` with τ = 0 today.
//! [`FriedmannClock`] tabulates τ(a) and the proper time t(a) (both in units
//! of 1/H0, zero at a = 1 and negative in the past) and inverts the table
//! to map τ to an age since the Big Bang.

use ndarray::{ArrayD, Zip};
use ramfield_interp::Axis;

use crate::constants::MPC_CGS;
use crate::error::ConfigError;
use crate::params::DatasetParams;

/// Converts cosmological time coordinates.
///
/// Times are returned in seconds.
pub trait CosmicClock: Send + Sync {
    /// Age of the universe (since a = 0) at each super-conformal time.
    fn conformal_to_physical(&self, tau: &ArrayD<f64>) -> ArrayD<f64>;

    /// Age of the universe at redshift `z`.
    fn age_at_redshift(&self, z: f64) -> f64;

    /// Age of the universe at expansion factor `a`.
    fn age_at_scale(&self, a: f64) -> f64 {
        self.age_at_redshift(1.0 / a - 1.0)
    }

    /// Hubble constant in s⁻¹.
    fn hubble_per_second(&self) -> f64;
}

/// Friedmann integration parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockConfig {
    /// Smallest tabulated expansion factor.
    pub a_min: f64,
    /// Number of table samples.
    pub samples: usize,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            a_min: 1e-6,
            samples: 4096,
        }
    }
}

/// ΛCDM clock for flat or curved cosmologies.
#[derive(Clone, Debug)]
pub struct FriedmannClock {
    h0: f64,
    /// ln a, increasing.
    ln_a: Vec<f64>,
    /// τ(a), increasing.
    tau: Axis,
    /// t(a), aligned with `tau`.
    t: Vec<f64>,
}

impl FriedmannClock {
    /// Build from H0 in km/s/Mpc and the density parameters.
    pub fn new(h0_kms_mpc: f64, omega_m: f64, omega_l: f64) -> Result<Self, ConfigError> {
        Self::with_config(h0_kms_mpc, omega_m, omega_l, ClockConfig::default())
    }

    /// Build with explicit integration settings.
    pub fn with_config(
        h0_kms_mpc: f64,
        omega_m: f64,
        omega_l: f64,
        config: ClockConfig,
    ) -> Result<Self, ConfigError> {
        if !(h0_kms_mpc > 0.0) || !(omega_m > 0.0) || !omega_l.is_finite() {
            return Err(ConfigError::InvalidCosmology {
                reason: format!("H0 = {h0_kms_mpc}, omega_m = {omega_m}, omega_l = {omega_l}"),
            });
        }
        if !(config.a_min > 0.0 && config.a_min < 1.0) || config.samples < 2 {
            return Err(ConfigError::InvalidCosmology {
                reason: format!("bad integration settings {config:?}"),
            });
        }
        let omega_k = 1.0 - omega_m - omega_l;
        let e2 = |a: f64| omega_m + omega_l * a.powi(3) + omega_k * a;
        // Integrands with respect to ln a.
        let dtau = |a: f64| a / (a.powi(3) * e2(a)).sqrt();
        let dt = |a: f64| a / (e2(a) / a).sqrt();

        let n = config.samples;
        let u0 = config.a_min.ln();
        let h = -u0 / (n - 1) as f64;
        let ln_a: Vec<f64> = (0..n).map(|i| u0 + h * i as f64).collect();

        // Integrate from a = 1 backwards with Simpson steps.
        let mut tau = vec![0.0; n];
        let mut t = vec![0.0; n];
        for i in (0..n - 1).rev() {
            let (lo, hi) = (ln_a[i], ln_a[i + 1]);
            let mid = 0.5 * (lo + hi);
            let simpson = |f: &dyn Fn(f64) -> f64| {
                (hi - lo) / 6.0 * (f(lo.exp()) + 4.0 * f(mid.exp()) + f(hi.exp()))
            };
            tau[i] = tau[i + 1] - simpson(&dtau);
            t[i] = t[i + 1] - simpson(&dt);
        }
        if tau.iter().chain(&t).any(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidCosmology {
                reason: "expansion history is not finite over the tabulated range".into(),
            });
        }
        let tau = Axis::new(tau, 0).map_err(|e| ConfigError::InvalidCosmology {
            reason: e.to_string(),
        })?;

        Ok(Self {
            h0: h0_kms_mpc * 1e5 / MPC_CGS,
            ln_a,
            tau,
            t,
        })
    }

    /// Build from dataset parameters.
    pub fn from_params(params: &DatasetParams) -> Result<Self, ConfigError> {
        Self::new(params.h0, params.omega_m, params.omega_l)
    }

    /// Proper time at a = 0 relative to today, in 1/H0.
    fn t_origin(&self) -> f64 {
        self.t[0]
    }

    /// t(τ) in 1/H0, clamped to the table.
    fn t_of_tau(&self, tau: f64) -> f64 {
        if tau.is_nan() {
            return f64::NAN;
        }
        let (i, w) = self.tau.locate(tau);
        if w == 0.0 {
            self.t[i]
        } else {
            (1.0 - w) * self.t[i] + w * self.t[i + 1]
        }
    }

    /// t(a) in 1/H0, clamped to the table.
    fn t_of_scale(&self, a: f64) -> f64 {
        let u = a.ln();
        let n = self.ln_a.len();
        if !(u > self.ln_a[0]) {
            return self.t[0];
        }
        if u >= self.ln_a[n - 1] {
            return self.t[n - 1];
        }
        let h = self.ln_a[1] - self.ln_a[0];
        let i = (((u - self.ln_a[0]) / h) as usize).min(n - 2);
        let w = (u - self.ln_a[i]) / h;
        (1.0 - w) * self.t[i] + w * self.t[i + 1]
    }

    /// Raw proper time in 1/H0 (zero today, negative in the past) to an age
    /// since the Big Bang in seconds.
    pub fn proper_time_to_age(&self, t_h0: f64) -> f64 {
        (t_h0 - self.t_origin()) / self.h0
    }
}

impl CosmicClock for FriedmannClock {
    fn conformal_to_physical(&self, tau: &ArrayD<f64>) -> ArrayD<f64> {
        let mut out = ArrayD::zeros(tau.raw_dim());
        Zip::from(&mut out)
            .and(tau)
            .for_each(|o, &x| *o = self.proper_time_to_age(self.t_of_tau(x)));
        out
    }

    fn age_at_redshift(&self, z: f64) -> f64 {
        self.proper_time_to_age(self.t_of_scale(1.0 / (1.0 + z)))
    }

    fn hubble_per_second(&self) -> f64 {
        self.h0
    }
}
