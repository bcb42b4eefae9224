//! Hydraulic transport fluid.

use crate::error::{FluidError, FluidResult};
use crate::spline::LinearSpline;
use crate::{SpecEnthalpy, SpecHeatCapacity};
use zf_core::units::Temperature;

/// Incompressible transport fluid.
///
/// Density, heat capacity and thermal conductivity are constant; kinematic
/// viscosity [m²/s] depends on temperature [K].
#[derive(Debug, Clone, PartialEq)]
pub struct HydraulicFluid {
    pub name: String,
    /// Density [kg/m³]
    pub density: f64,
    pub heat_capacity: SpecHeatCapacity,
    /// Thermal conductivity [W/(m·K)]
    pub conductivity: f64,
    kinematic_viscosity: LinearSpline,
}

impl HydraulicFluid {
    pub fn new(
        name: impl Into<String>,
        density: f64,
        heat_capacity: SpecHeatCapacity,
        conductivity: f64,
        kinematic_viscosity: LinearSpline,
    ) -> FluidResult<Self> {
        if !(density.is_finite() && density > 0.0) {
            return Err(FluidError::NonPhysical { what: "density" });
        }
        if !(heat_capacity.is_finite() && heat_capacity > 0.0) {
            return Err(FluidError::NonPhysical {
                what: "heat capacity",
            });
        }
        if !(conductivity.is_finite() && conductivity >= 0.0) {
            return Err(FluidError::NonPhysical {
                what: "thermal conductivity",
            });
        }
        Ok(Self {
            name: name.into(),
            density,
            heat_capacity,
            conductivity,
            kinematic_viscosity,
        })
    }

    /// Liquid water between 0 and 100 °C.
    pub fn water() -> Self {
        let t = [273.15, 283.15, 293.15, 313.15, 333.15, 353.15, 373.15];
        let nu = [1.792e-6, 1.307e-6, 1.004e-6, 0.658e-6, 0.475e-6, 0.365e-6, 0.294e-6];
        Self {
            name: "Water".into(),
            density: 998.0,
            heat_capacity: 4180.0,
            conductivity: 0.6,
            kinematic_viscosity: LinearSpline::from_sorted(t.to_vec(), nu.to_vec()),
        }
    }

    /// Kinematic viscosity [m²/s] at temperature `t_k` [K].
    pub fn kinematic_viscosity(&self, t_k: f64) -> f64 {
        self.kinematic_viscosity.value(t_k)
    }

    pub fn kinematic_viscosity_at(&self, t: Temperature) -> f64 {
        self.kinematic_viscosity(t.value)
    }

    /// Dynamic viscosity [Pa·s] at temperature `t_k` [K].
    pub fn dynamic_viscosity(&self, t_k: f64) -> f64 {
        self.density * self.kinematic_viscosity(t_k)
    }

    pub fn specific_enthalpy(&self, t_k: f64) -> SpecEnthalpy {
        self.heat_capacity * t_k
    }

    /// Inverse of [`specific_enthalpy`](Self::specific_enthalpy).
    pub fn temperature(&self, h: SpecEnthalpy) -> f64 {
        h / self.heat_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zf_core::units::k;

    #[test]
    fn water_viscosity_decreases_with_temperature() {
        let w = HydraulicFluid::water();
        assert!(w.kinematic_viscosity(293.15) > w.kinematic_viscosity(333.15));
        assert!((w.kinematic_viscosity_at(k(293.15)) - 1.004e-6).abs() < 1e-12);
        assert!((w.dynamic_viscosity(293.15) - 998.0 * 1.004e-6).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_physical() {
        let nu = LinearSpline::constant(1e-6);
        assert_eq!(
            HydraulicFluid::new("x", -1.0, 4000.0, 0.5, nu.clone()).unwrap_err(),
            FluidError::NonPhysical { what: "density" }
        );
        assert!(HydraulicFluid::new("x", 1000.0, 0.0, 0.5, nu).is_err());
    }
}
