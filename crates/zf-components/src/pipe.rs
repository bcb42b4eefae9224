//! Pipe component with friction using Darcy-Weisbach correlation.

use crate::common::{check_finite, check_positive, circle_area};
use crate::error::ComponentResult;
use crate::traits::{FlowContext, HydraulicComponent};
use zf_core::units::Length;

/// Upper Reynolds number of the laminar regime.
pub const RE_LAMINAR: f64 = 2300.0;
/// Lower Reynolds number of the fully turbulent regime.
pub const RE_TURBULENT: f64 = 4000.0;

/// Darcy friction factor.
///
/// Laminar `64/Re` below 2300, Swamee-Jain above 4000 and a linear blend of
/// both in between, so the factor is continuous in `Re`.
pub fn friction_factor(reynolds: f64, relative_roughness: f64) -> f64 {
    let laminar = 64.0 / reynolds;
    if reynolds <= RE_LAMINAR {
        return laminar;
    }
    let a = relative_roughness / 3.7;
    let b = 5.74 / reynolds.powf(0.9);
    let turbulent = (0.25 / (a + b).log10().powi(2)).max(1e-4);
    if reynolds >= RE_TURBULENT {
        return turbulent;
    }
    let w = (reynolds - RE_LAMINAR) / (RE_TURBULENT - RE_LAMINAR);
    (1.0 - w) * laminar + w * turbulent
}

/// Straight pipe with wall friction.
#[derive(Debug, Clone)]
pub struct Pipe {
    name: String,
    pub length: Length,
    /// Inner diameter
    pub diameter: Length,
    /// Absolute surface roughness
    pub roughness: Length,
}

impl Pipe {
    pub fn new(
        name: impl Into<String>,
        length: Length,
        diameter: Length,
        roughness: Length,
    ) -> ComponentResult<Self> {
        check_positive(length.value, "pipe length must be positive")?;
        check_positive(diameter.value, "pipe diameter must be positive")?;
        if !(roughness.value.is_finite() && roughness.value >= 0.0) {
            return Err(crate::ComponentError::InvalidArg {
                what: "pipe roughness must be non-negative",
            });
        }
        Ok(Self {
            name: name.into(),
            length,
            diameter,
            roughness,
        })
    }

    pub fn reynolds(&self, ctx: FlowContext<'_>, mdot: f64) -> f64 {
        let d = self.diameter.value;
        let v = mdot / (ctx.fluid.density * circle_area(d));
        v.abs() * d / ctx.fluid.kinematic_viscosity(ctx.temperature_k)
    }
}

impl HydraulicComponent for Pipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn pressure_loss(&self, ctx: FlowContext<'_>, mdot: f64) -> ComponentResult<f64> {
        let rho = ctx.fluid.density;
        let nu = ctx.fluid.kinematic_viscosity(ctx.temperature_k);
        let d = self.diameter.value;
        let l = self.length.value;
        let v = mdot / (rho * circle_area(d));
        let re = v.abs() * d / nu;
        check_finite(re, "Reynolds number")?;

        // Hagen-Poiseuille form stays finite at zero flow
        let dp = if re <= RE_LAMINAR {
            32.0 * nu * rho * l * v / (d * d)
        } else {
            let f = friction_factor(re, self.roughness.value / d);
            f * l / d * 0.5 * rho * v * v.abs()
        };
        check_finite(dp, "pipe pressure loss")?;
        Ok(dp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zf_core::units::m;
    use zf_fluids::HydraulicFluid;

    fn pipe() -> Pipe {
        Pipe::new("test", m(100.0), m(0.05), m(7e-6)).unwrap()
    }

    #[test]
    fn zero_flow_zero_loss() {
        let water = HydraulicFluid::water();
        let ctx = FlowContext {
            fluid: &water,
            temperature_k: 313.15,
        };
        assert_eq!(pipe().pressure_loss(ctx, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn loss_is_odd_in_mass_flux() {
        let water = HydraulicFluid::water();
        let ctx = FlowContext {
            fluid: &water,
            temperature_k: 313.15,
        };
        for mdot in [1e-4, 0.05, 0.5, 3.0] {
            let fwd = pipe().pressure_loss(ctx, mdot).unwrap();
            let rev = pipe().pressure_loss(ctx, -mdot).unwrap();
            assert!(fwd > 0.0);
            assert!((fwd + rev).abs() <= 1e-9 * fwd);
        }
    }

    #[test]
    fn friction_factor_continuous_at_regime_bounds() {
        let eps = 1e-4;
        let below = friction_factor(RE_LAMINAR - 1e-6, eps);
        let above = friction_factor(RE_LAMINAR + 1e-6, eps);
        assert!((below - above).abs() < 1e-6);

        let below = friction_factor(RE_TURBULENT - 1e-6, eps);
        let above = friction_factor(RE_TURBULENT + 1e-6, eps);
        assert!((below - above).abs() < 1e-6);
    }

    #[test]
    fn invalid_geometry_rejected() {
        assert!(Pipe::new("bad", m(0.0), m(0.05), m(0.0)).is_err());
        assert!(Pipe::new("bad", m(1.0), m(-0.05), m(0.0)).is_err());
        assert!(Pipe::new("bad", m(1.0), m(0.05), m(-1.0)).is_err());
    }

    #[test]
    fn warmer_water_lower_laminar_loss() {
        let water = HydraulicFluid::water();
        let cold = FlowContext {
            fluid: &water,
            temperature_k: 283.15,
        };
        let warm = FlowContext {
            fluid: &water,
            temperature_k: 343.15,
        };
        let p = pipe();
        assert!(p.reynolds(cold, 0.01) < RE_LAMINAR);
        assert!(p.pressure_loss(warm, 0.01).unwrap() < p.pressure_loss(cold, 0.01).unwrap());
    }
}
