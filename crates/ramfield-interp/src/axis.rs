//! Monotone sample axes and bracketing search.

use std::sync::Arc;

use crate::error::InterpError;

/// A non-decreasing sequence of finite sample coordinates.
///
/// Cheap to clone; interpolators built from a [`TableStack`](crate::TableStack)
/// share their axes.
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    samples: Arc<[f64]>,
}

impl Axis {
    /// Validate and wrap samples. `index` identifies the axis in errors.
    pub fn new(samples: Vec<f64>, index: usize) -> Result<Self, InterpError> {
        if samples.is_empty() {
            return Err(InterpError::EmptyAxis { axis: index });
        }
        if let Some(bad) = samples.iter().position(|v| !v.is_finite()) {
            return Err(InterpError::NonMonotonicAxis {
                axis: index,
                index: bad,
            });
        }
        if let Some(w) = samples.windows(2).position(|w| w[1] < w[0]) {
            return Err(InterpError::NonMonotonicAxis {
                axis: index,
                index: w + 1,
            });
        }
        Ok(Self {
            samples: samples.into(),
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; construction rejects empty axes.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The sample coordinates.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// First sample.
    pub fn min(&self) -> f64 {
        self.samples[0]
    }

    /// Last sample.
    pub fn max(&self) -> f64 {
        self.samples[self.samples.len() - 1]
    }

    /// Whether `x` lies inside `[min, max]`.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.min() && x <= self.max()
    }

    /// Bracketing cell and fractional offset for `x`, clamped to the axis.
    ///
    /// Returns `(i, t)` with `0 <= t <= 1` such that the interpolated value is
    /// `(1 - t) * v[i] + t * v[i + 1]`. A single-sample axis yields `(0, 0.0)`
    /// and callers must not read `v[i + 1]`. Zero-width cells also yield
    /// `t = 0`.
    pub fn locate(&self, x: f64) -> (usize, f64) {
        let n = self.samples.len();
        if n == 1 || x <= self.min() {
            return (0, 0.0);
        }
        if x >= self.max() {
            return (n - 2, 1.0);
        }
        let above = self.samples.partition_point(|&v| v <= x);
        let i = above.saturating_sub(1).min(n - 2);
        let (lo, hi) = (self.samples[i], self.samples[i + 1]);
        let width = hi - lo;
        if width <= 0.0 {
            return (i, 0.0);
        }
        (i, ((x - lo) / width).clamp(0.0, 1.0))
    }
}
