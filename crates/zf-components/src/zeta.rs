//! Pressure loss expressed through a loss coefficient.

use crate::common::{check_finite, check_positive, circle_area, signed_dynamic_pressure};
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{FlowContext, HydraulicComponent};

/// `dp = zeta * 0.5 * rho * v|v|` with `v` taken in a reference diameter.
///
/// Used for heat exchangers and heat pumps.
#[derive(Debug, Clone)]
pub struct ZetaLoss {
    name: String,
    pub zeta: f64,
    /// Hydraulic diameter the velocity refers to [m]
    pub diameter: f64,
}

impl ZetaLoss {
    pub fn new(name: impl Into<String>, zeta: f64, diameter: f64) -> ComponentResult<Self> {
        if !(zeta.is_finite() && zeta >= 0.0) {
            return Err(ComponentError::InvalidArg {
                what: "zeta must be non-negative",
            });
        }
        check_positive(diameter, "hydraulic diameter must be positive")?;
        Ok(Self {
            name: name.into(),
            zeta,
            diameter,
        })
    }
}

impl HydraulicComponent for ZetaLoss {
    fn name(&self) -> &str {
        &self.name
    }

    fn pressure_loss(&self, ctx: FlowContext<'_>, mdot: f64) -> ComponentResult<f64> {
        let dp = self.zeta
            * signed_dynamic_pressure(ctx.fluid.density, circle_area(self.diameter), mdot);
        check_finite(dp, "zeta pressure loss")?;
        Ok(dp)
    }
}
