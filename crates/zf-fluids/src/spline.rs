//! Piecewise linear property tables.

use crate::error::{FluidError, FluidResult};

/// Linear interpolation over strictly increasing sample points.
///
/// Values outside the sampled range are clamped to the end values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearSpline {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearSpline {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> FluidResult<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(FluidError::InvalidArg {
                what: "spline needs equally sized, non-empty x and y",
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(FluidError::NonPhysical {
                what: "spline sample",
            });
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FluidError::InvalidArg {
                what: "spline x values must be strictly increasing",
            });
        }
        Ok(Self { x, y })
    }

    /// Table known to be valid at compile time.
    pub(crate) fn from_sorted(x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert!(x.len() == y.len() && x.windows(2).all(|w| w[0] < w[1]));
        Self { x, y }
    }

    /// Constant spline, a single sample.
    pub fn constant(value: f64) -> Self {
        Self {
            x: vec![0.0],
            y: vec![value],
        }
    }

    pub fn value(&self, x: f64) -> f64 {
        let n = self.x.len();
        if n == 1 || x <= self.x[0] {
            return self.y[0];
        }
        if x >= self.x[n - 1] {
            return self.y[n - 1];
        }
        // first sample strictly greater than x; in 1..n here
        let i = self.x.partition_point(|&xi| xi <= x);
        let (x0, x1) = (self.x[i - 1], self.x[i]);
        let (y0, y1) = (self.y[i - 1], self.y[i]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_and_clamps() {
        let s = LinearSpline::new(vec![0.0, 10.0, 20.0], vec![1.0, 2.0, 4.0]).unwrap();
        assert_eq!(s.value(-5.0), 1.0);
        assert_eq!(s.value(5.0), 1.5);
        assert_eq!(s.value(10.0), 2.0);
        assert_eq!(s.value(15.0), 3.0);
        assert_eq!(s.value(100.0), 4.0);
    }

    #[test]
    fn rejects_unsorted() {
        assert!(LinearSpline::new(vec![0.0, 0.0], vec![1.0, 2.0]).is_err());
        assert!(LinearSpline::new(vec![], vec![]).is_err());
        assert!(LinearSpline::new(vec![1.0], vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn constant_spline() {
        let s = LinearSpline::constant(3.5);
        assert_eq!(s.value(-1e9), 3.5);
        assert_eq!(s.value(1e9), 3.5);
    }
}
