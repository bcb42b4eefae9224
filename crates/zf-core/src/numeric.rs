use crate::ZfError;

/// Floating point type used throughout the solver core.
pub type Real = f64;

/// Absolute/relative tolerance pair.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, ZfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ZfError::NonFinite { what, value: v })
    }
}

/// Ensure a parameter is strictly positive and finite.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, ZfError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(ZfError::invalid_arg(format!("{what} must be positive (got {v})")))
    }
}

/// Mass-weighted mean of `(weight, value)` pairs; `None` when the weights sum
/// to (almost) nothing.
pub fn weighted_mean(
    pairs: impl IntoIterator<Item = (Real, Real)>,
    min_weight: Real,
) -> Option<Real> {
    let (weight, sum) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(w, s), (wi, vi)| (w + wi, s + wi * vi));
    if weight > min_weight {
        Some(sum / weight)
    } else {
        None
    }
}
