//! Common utilities for component calculations.

use crate::error::{ComponentError, ComponentResult};
use zf_core::numeric::ensure_finite;

/// Mass flux below which an element is treated as stagnant (kg/s).
pub const EPSILON_MDOT: f64 = 1e-9;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Ensure a parameter is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::InvalidArg { what })
    }
}

/// Flow cross section of a circular duct [m²].
pub fn circle_area(diameter: f64) -> f64 {
    std::f64::consts::PI * diameter * diameter / 4.0
}

/// Signed dynamic pressure `0.5 * rho * v * |v|` for a mass flux through `area`.
pub fn signed_dynamic_pressure(rho: f64, area: f64, mdot: f64) -> f64 {
    let v = mdot / (rho * area);
    0.5 * rho * v * v.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn test_check_positive() {
        assert_eq!(check_positive(2.0, "x").unwrap(), 2.0);
        assert!(check_positive(0.0, "x").is_err());
        assert!(check_positive(f64::NAN, "x").is_err());
    }

    #[test]
    fn dynamic_pressure_keeps_sign() {
        let a = circle_area(0.1);
        let fwd = signed_dynamic_pressure(1000.0, a, 2.0);
        let rev = signed_dynamic_pressure(1000.0, a, -2.0);
        assert!(fwd > 0.0);
        assert_eq!(fwd, -rev);
    }
}
