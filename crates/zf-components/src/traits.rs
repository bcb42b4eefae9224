//! Core trait for hydraulic element models.

use crate::error::{ComponentError, ComponentResult};
use zf_fluids::HydraulicFluid;

/// Fluid state an element is evaluated at.
#[derive(Debug, Clone, Copy)]
pub struct FlowContext<'a> {
    pub fluid: &'a HydraulicFluid,
    /// Mean fluid temperature inside the element [K], used for viscosity.
    pub temperature_k: f64,
}

/// A network element that relates its mass flux to the pressure difference
/// across it.
///
/// Positive mass flux means inlet → outlet; `dp` is always `p_inlet - p_outlet`.
/// Components are deterministic functions of state and parameters.
pub trait HydraulicComponent: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Residual of the element equation, zero when `mdot` and `dp` are consistent.
    ///
    /// The default is `dp - pressure_loss(mdot)`.
    fn residual(&self, ctx: FlowContext<'_>, mdot: f64, dp: f64) -> ComponentResult<f64> {
        Ok(dp - self.pressure_loss(ctx, mdot)?)
    }

    /// Pressure loss `p_inlet - p_outlet` [Pa] required to drive `mdot`.
    ///
    /// Components that fix their mass flux instead return NotSupported.
    fn pressure_loss(&self, _ctx: FlowContext<'_>, _mdot: f64) -> ComponentResult<f64> {
        Err(ComponentError::NotSupported {
            what: "pressure_loss not defined for this component",
        })
    }

    /// Mass flux used to seed the network solve.
    fn initial_mass_flux(&self) -> f64 {
        0.1
    }
}
