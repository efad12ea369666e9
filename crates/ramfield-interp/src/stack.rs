//! Several tables sharing one pair of axes.

use ndarray::{s, Array3};

use crate::axis::Axis;
use crate::bilinear::{BilinearInterpolator, BoundsPolicy};
use crate::error::InterpError;

/// An `(n1, n2, k)` block of `k` tables over shared axes.
#[derive(Clone, Debug)]
pub struct TableStack {
    x: Axis,
    y: Axis,
    layers: Array3<f64>,
}

impl TableStack {
    /// Build from raw axes and a 3-D block whose first two extents match the
    /// axis lengths.
    pub fn new(x: Vec<f64>, y: Vec<f64>, layers: Array3<f64>) -> Result<Self, InterpError> {
        let x = Axis::new(x, 0)?;
        let y = Axis::new(y, 1)?;
        let (n1, n2, k) = layers.dim();
        if n1 != x.len() || n2 != y.len() {
            return Err(InterpError::ShapeMismatch {
                what: "table stack",
                expected: vec![x.len(), y.len(), k],
                found: vec![n1, n2, k],
            });
        }
        Ok(Self { x, y, layers })
    }

    /// Number of tables.
    pub fn n_layers(&self) -> usize {
        self.layers.dim().2
    }

    /// An interpolator over table `k`, or `None` if out of range.
    pub fn layer(&self, k: usize, policy: BoundsPolicy) -> Option<BilinearInterpolator> {
        if k >= self.n_layers() {
            return None;
        }
        let table = self.layers.slice(s![.., .., k]).to_owned();
        BilinearInterpolator::from_axes(self.x.clone(), self.y.clone(), table, policy).ok()
    }

    /// Interpolators for every table, in order.
    pub fn layers(&self, policy: BoundsPolicy) -> Vec<BilinearInterpolator> {
        (0..self.n_layers())
            .filter_map(|k| self.layer(k, policy))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_share_axes() {
        let block = Array3::from_shape_fn((2, 2, 3), |(i, j, k)| (i + 2 * j + 10 * k) as f64);
        let stack = TableStack::new(vec![0.0, 1.0], vec![0.0, 1.0], block).unwrap();
        assert_eq!(stack.n_layers(), 3);
        let third = stack.layer(2, BoundsPolicy::Clamp).unwrap();
        assert_eq!(third.evaluate_point(1.0, 1.0).unwrap(), 23.0);
        assert!(stack.layer(3, BoundsPolicy::Clamp).is_none());
        assert_eq!(stack.layers(BoundsPolicy::Clamp).len(), 3);
    }

    #[test]
    fn mismatched_block_fails() {
        let err = TableStack::new(vec![0.0], vec![0.0, 1.0], Array3::zeros((2, 2, 1))).unwrap_err();
        assert!(matches!(err, InterpError::ShapeMismatch { .. }));
    }
}
