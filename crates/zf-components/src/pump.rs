//! Pump component models.

use crate::common::check_finite;
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{FlowContext, HydraulicComponent};
use zf_core::units::{MassRate, Pressure};

/// Pump that raises the pressure by a fixed head regardless of flow.
///
/// `p_outlet = p_inlet + head`, so the pressure loss is `-head`.
#[derive(Clone, Debug)]
pub struct ConstantPressurePump {
    name: String,
    /// Pressure rise [Pa]
    pub head: Pressure,
}

impl ConstantPressurePump {
    pub fn new(name: impl Into<String>, head: Pressure) -> ComponentResult<Self> {
        check_finite(head.value, "pump head")?;
        if head.value < 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "pump head cannot be negative",
            });
        }
        Ok(Self {
            name: name.into(),
            head,
        })
    }

    /// Update the pressure rise (typically from a controller).
    pub fn set_head(&mut self, head: Pressure) {
        self.head = head.max(Pressure::new::<uom::si::pressure::pascal>(0.0));
    }
}

impl HydraulicComponent for ConstantPressurePump {
    fn name(&self) -> &str {
        &self.name
    }

    fn pressure_loss(&self, _ctx: FlowContext<'_>, _mdot: f64) -> ComponentResult<f64> {
        Ok(-self.head.value)
    }
}

/// Pump that enforces a mass flux; the pressure difference follows from the rest
/// of the network.
#[derive(Clone, Debug)]
pub struct ConstantMassFluxPump {
    name: String,
    pub mass_flux: MassRate,
}

impl ConstantMassFluxPump {
    pub fn new(name: impl Into<String>, mass_flux: MassRate) -> ComponentResult<Self> {
        check_finite(mass_flux.value, "pump mass flux")?;
        Ok(Self {
            name: name.into(),
            mass_flux,
        })
    }
}

impl HydraulicComponent for ConstantMassFluxPump {
    fn name(&self) -> &str {
        &self.name
    }

    fn residual(&self, _ctx: FlowContext<'_>, mdot: f64, _dp: f64) -> ComponentResult<f64> {
        Ok(mdot - self.mass_flux.value)
    }

    fn initial_mass_flux(&self) -> f64 {
        self.mass_flux.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zf_core::units::{kgps, pa};
    use zf_fluids::HydraulicFluid;

    #[test]
    fn pressure_pump_residual() {
        let water = HydraulicFluid::water();
        let ctx = FlowContext {
            fluid: &water,
            temperature_k: 300.0,
        };
        let pump = ConstantPressurePump::new("p", pa(20_000.0)).unwrap();
        // outlet 20 kPa above inlet
        assert_eq!(pump.residual(ctx, 0.7, -20_000.0).unwrap(), 0.0);
        assert!(ConstantPressurePump::new("p", pa(-1.0)).is_err());
    }

    #[test]
    fn mass_flux_pump_ignores_pressure() {
        let water = HydraulicFluid::water();
        let ctx = FlowContext {
            fluid: &water,
            temperature_k: 300.0,
        };
        let pump = ConstantMassFluxPump::new("p", kgps(1.0)).unwrap();
        assert_eq!(pump.residual(ctx, 1.0, 5.0e5).unwrap(), 0.0);
        assert_eq!(pump.residual(ctx, 0.5, 0.0).unwrap(), -0.5);
        assert_eq!(pump.initial_mass_flux(), 1.0);
        assert!(pump.pressure_loss(ctx, 1.0).is_err());
    }

    #[test]
    fn set_head_clamps() {
        let mut pump = ConstantPressurePump::new("p", pa(1.0)).unwrap();
        pump.set_head(pa(-5.0));
        assert_eq!(pump.head.value, 0.0);
    }
}
