//! Bilinear interpolation over a 2-D table.

use ndarray::{Array2, ArrayD};

use crate::axis::Axis;
use crate::error::InterpError;

/// What to do with query coordinates outside the sampled range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundsPolicy {
    /// Use the nearest edge sample. Never extrapolates.
    #[default]
    Clamp,
    /// Fail with [`InterpError::OutOfBounds`].
    Reject,
}

/// Bilinear interpolator over `(x, y)` sample axes.
///
/// `table[[i, j]]` is the value at `(x[i], y[j])`.
#[derive(Clone, Debug)]
pub struct BilinearInterpolator {
    x: Axis,
    y: Axis,
    table: Array2<f64>,
    policy: BoundsPolicy,
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t == 0.0 {
        a
    } else if t == 1.0 {
        b
    } else {
        (1.0 - t) * a + t * b
    }
}

impl BilinearInterpolator {
    /// Build from raw axis samples and a table of shape `(x.len(), y.len())`.
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        table: Array2<f64>,
        policy: BoundsPolicy,
    ) -> Result<Self, InterpError> {
        Self::from_axes(Axis::new(x, 0)?, Axis::new(y, 1)?, table, policy)
    }

    /// Build from already validated axes.
    pub fn from_axes(
        x: Axis,
        y: Axis,
        table: Array2<f64>,
        policy: BoundsPolicy,
    ) -> Result<Self, InterpError> {
        let expected = vec![x.len(), y.len()];
        if table.shape() != expected.as_slice() {
            return Err(InterpError::ShapeMismatch {
                what: "table",
                expected,
                found: table.shape().to_vec(),
            });
        }
        Ok(Self {
            x,
            y,
            table,
            policy,
        })
    }

    /// The first axis.
    pub fn x_axis(&self) -> &Axis {
        &self.x
    }

    /// The second axis.
    pub fn y_axis(&self) -> &Axis {
        &self.y
    }

    /// The sampled values.
    pub fn table(&self) -> &Array2<f64> {
        &self.table
    }

    /// The out-of-range policy.
    pub fn policy(&self) -> BoundsPolicy {
        self.policy
    }

    fn check_bounds(&self, axis: usize, a: &Axis, v: f64) -> Result<(), InterpError> {
        if self.policy == BoundsPolicy::Reject && !a.contains(v) {
            return Err(InterpError::OutOfBounds {
                axis,
                value: v,
                min: a.min(),
                max: a.max(),
            });
        }
        Ok(())
    }

    /// Interpolate at a single point. NaN coordinates give NaN.
    pub fn evaluate_point(&self, x: f64, y: f64) -> Result<f64, InterpError> {
        if x.is_nan() || y.is_nan() {
            return Ok(f64::NAN);
        }
        self.check_bounds(0, &self.x, x)?;
        self.check_bounds(1, &self.y, y)?;

        let (i, t) = self.x.locate(x);
        let (j, u) = self.y.locate(y);
        let i1 = if self.x.len() == 1 { i } else { i + 1 };
        let j1 = if self.y.len() == 1 { j } else { j + 1 };

        let lo = lerp(self.table[[i, j]], self.table[[i, j1]], u);
        let hi = lerp(self.table[[i1, j]], self.table[[i1, j1]], u);
        Ok(lerp(lo, hi, t))
    }

    /// Interpolate element-wise over paired coordinate arrays.
    ///
    /// `x` and `y` must have the same shape; the result has that shape.
    pub fn evaluate(&self, x: &ArrayD<f64>, y: &ArrayD<f64>) -> Result<ArrayD<f64>, InterpError> {
        if x.shape() != y.shape() {
            return Err(InterpError::ShapeMismatch {
                what: "query coordinates",
                expected: x.shape().to_vec(),
                found: y.shape().to_vec(),
            });
        }
        let mut out = ArrayD::zeros(x.raw_dim());
        for ((o, &xv), &yv) in out.iter_mut().zip(x.iter()).zip(y.iter()) {
            *o = self.evaluate_point(xv, yv)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array2};
    use proptest::prelude::*;

    fn mu_table(policy: BoundsPolicy) -> BilinearInterpolator {
        BilinearInterpolator::new(
            vec![0.0, 1.0],
            vec![4.0, 5.0],
            arr2(&[[1.0, 1.0], [1.2, 1.2]]),
            policy,
        )
        .unwrap()
    }

    #[test]
    fn exact_sample_and_clamped_query() {
        let interp = mu_table(BoundsPolicy::Clamp);
        assert_eq!(interp.evaluate_point(0.0, 4.0).unwrap(), 1.0);
        assert_eq!(interp.evaluate_point(2.0, 4.0).unwrap(), 1.2);
        assert_eq!(interp.evaluate_point(-3.0, 9.0).unwrap(), 1.0);
    }

    #[test]
    fn reject_policy_reports_axis() {
        let interp = mu_table(BoundsPolicy::Reject);
        let err = interp.evaluate_point(0.5, 6.0).unwrap_err();
        assert_eq!(
            err,
            InterpError::OutOfBounds {
                axis: 1,
                value: 6.0,
                min: 4.0,
                max: 5.0
            }
        );
        assert!(interp.evaluate_point(1.0, 5.0).is_ok());
    }

    #[test]
    fn midpoint_averages_corners() {
        let interp = BilinearInterpolator::new(
            vec![0.0, 2.0],
            vec![0.0, 2.0],
            arr2(&[[0.0, 1.0], [2.0, 3.0]]),
            BoundsPolicy::Clamp,
        )
        .unwrap();
        assert!((interp.evaluate_point(1.0, 1.0).unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn preserves_query_shape() {
        let interp = mu_table(BoundsPolicy::Clamp);
        let x = ArrayD::from_elem(vec![2, 3], 0.5);
        let y = ArrayD::from_elem(vec![2, 3], 4.5);
        let out = interp.evaluate(&x, &y).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert!(out.iter().all(|v| (v - 1.1).abs() < 1e-12));
    }

    #[test]
    fn mismatched_query_shapes_fail() {
        let interp = mu_table(BoundsPolicy::Clamp);
        let err = interp
            .evaluate(&arr1(&[0.0, 1.0]).into_dyn(), &arr1(&[4.0]).into_dyn())
            .unwrap_err();
        assert!(matches!(err, InterpError::ShapeMismatch { .. }));
    }

    #[test]
    fn wrong_table_shape_fails() {
        let err = BilinearInterpolator::new(
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.0],
            Array2::zeros((2, 2)),
            BoundsPolicy::Clamp,
        )
        .unwrap_err();
        assert_eq!(
            err,
            InterpError::ShapeMismatch {
                what: "table",
                expected: vec![3, 2],
                found: vec![2, 2]
            }
        );
    }

    #[test]
    fn degenerate_axes() {
        let interp = BilinearInterpolator::new(
            vec![3.0],
            vec![0.0, 1.0],
            arr2(&[[2.0, 4.0]]),
            BoundsPolicy::Clamp,
        )
        .unwrap();
        assert_eq!(interp.evaluate_point(100.0, 0.5).unwrap(), 3.0);

        let single = BilinearInterpolator::new(
            vec![3.0],
            vec![7.0],
            arr2(&[[9.5]]),
            BoundsPolicy::Clamp,
        )
        .unwrap();
        assert_eq!(single.evaluate_point(-1.0, 1e9).unwrap(), 9.5);
    }

    #[test]
    fn nan_query_gives_nan() {
        let interp = mu_table(BoundsPolicy::Reject);
        assert!(interp.evaluate_point(f64::NAN, 4.0).unwrap().is_nan());
    }

    fn grid() -> impl Strategy<Value = (Vec<f64>, Vec<f64>, Array2<f64>)> {
        (2usize..6, 2usize..6).prop_flat_map(|(n1, n2)| {
            (
                prop::collection::vec(0.1f64..2.0, n1),
                prop::collection::vec(0.1f64..2.0, n2),
                prop::collection::vec(-10.0f64..10.0, n1 * n2),
            )
                .prop_map(move |(dx, dy, vals)| {
                    let xs: Vec<f64> = dx
                        .iter()
                        .scan(0.0, |acc, d| {
                            *acc += d;
                            Some(*acc)
                        })
                        .collect();
                    let ys: Vec<f64> = dy
                        .iter()
                        .scan(-1.0, |acc, d| {
                            *acc += d;
                            Some(*acc)
                        })
                        .collect();
                    let table = Array2::from_shape_vec((n1, n2), vals).unwrap();
                    (xs, ys, table)
                })
        })
    }

    proptest! {
        #[test]
        fn grid_points_are_reproduced((xs, ys, table) in grid()) {
            let interp = BilinearInterpolator::new(xs.clone(), ys.clone(), table.clone(), BoundsPolicy::Clamp).unwrap();
            for (i, &x) in xs.iter().enumerate() {
                for (j, &y) in ys.iter().enumerate() {
                    let v = interp.evaluate_point(x, y).unwrap();
                    prop_assert!((v - table[[i, j]]).abs() <= 1e-12 * table[[i, j]].abs().max(1.0));
                }
            }
        }

        #[test]
        fn results_stay_within_table_range((xs, ys, table) in grid(), qx in -5.0f64..15.0, qy in -5.0f64..15.0) {
            let interp = BilinearInterpolator::new(xs, ys, table.clone(), BoundsPolicy::Clamp).unwrap();
            let v = interp.evaluate_point(qx, qy).unwrap();
            let lo = table.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = table.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(v.is_finite());
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }
}
