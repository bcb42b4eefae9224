//! Thermal flow elements: the per-element energy balances of a network.
//!
//! Every element stores the internal energy `U = rho V h` of one or more
//! well-mixed fluid volumes. Flow enters at the end the mass flux comes from;
//! the leaving fluid carries the enthalpy of the volume next to the other end.

use std::f64::consts::PI;

use zf_model::{ModelError, ModelResult};

use super::heat_exchange::HeatExchange;

/// Energy balance of one network element.
pub trait ThermalFlowElement: std::fmt::Debug {
    fn n_internal_states(&self) -> usize;

    fn initial_internal_states(&self, y: &mut [f64]);

    fn set_internal_states(&mut self, y: &[f64]);

    /// Current states, the inverse of `set_internal_states`.
    fn internal_states(&self, y: &mut [f64]);

    /// Specific enthalpy [J/kg] of the fluid at the inlet end.
    fn inlet_end_specific_enthalpy(&self) -> f64;

    /// Specific enthalpy [J/kg] of the fluid at the outlet end.
    fn outlet_end_specific_enthalpy(&self) -> f64;

    fn mean_specific_enthalpy(&self) -> f64;

    /// Mass flux through the element (positive inlet to outlet) and the
    /// specific enthalpy of the fluid entering it.
    fn set_inflow(&mut self, mass_flux: f64, inflow_specific_enthalpy: f64);

    fn heat_exchange(&self) -> &HeatExchange;

    fn heat_exchange_mut(&mut self) -> &mut HeatExchange;

    /// Heat [W] the element loses to its surroundings.
    fn heat_loss(&self) -> f64;

    /// Derivative of every internal state: advected enthalpy minus heat loss.
    fn internal_heat_losses(&self, ydot: &mut [f64]);

    /// Enthalpy leaving the element for the current flow direction.
    fn leaving_specific_enthalpy(&self, mass_flux: f64) -> f64 {
        if mass_flux >= 0.0 {
            self.outlet_end_specific_enthalpy()
        } else {
            self.inlet_end_specific_enthalpy()
        }
    }
}

fn check_volume(what: &str, volume_m3: f64) -> ModelResult<f64> {
    if volume_m3.is_finite() && volume_m3 > 0.0 {
        Ok(volume_m3)
    } else {
        Err(ModelError::invalid_arg(
            what,
            format!("fluid volume must be positive, got {volume_m3}"),
        ))
    }
}

/// Inner volume of a pipe [m3].
pub fn pipe_volume(diameter_inside_m: f64, length_m: f64) -> f64 {
    PI / 4.0 * diameter_inside_m * diameter_inside_m * length_m
}

/// One well-mixed fluid volume.
#[derive(Debug, Clone)]
pub struct MixedVolume {
    mass: f64,
    heat_capacity: f64,
    initial_specific_enthalpy: f64,
    specific_enthalpy: f64,
    mass_flux: f64,
    inflow_specific_enthalpy: f64,
    heat_exchange: HeatExchange,
}

impl MixedVolume {
    fn new(
        what: &str,
        density: f64,
        heat_capacity: f64,
        volume_m3: f64,
        initial_temperature_k: f64,
        heat_exchange: HeatExchange,
    ) -> ModelResult<Self> {
        let volume = check_volume(what, volume_m3)?;
        let h = heat_capacity * initial_temperature_k;
        Ok(Self {
            mass: density * volume,
            heat_capacity,
            initial_specific_enthalpy: h,
            specific_enthalpy: h,
            mass_flux: 0.0,
            inflow_specific_enthalpy: h,
            heat_exchange,
        })
    }
}

impl ThermalFlowElement for MixedVolume {
    fn n_internal_states(&self) -> usize {
        1
    }

    fn initial_internal_states(&self, y: &mut [f64]) {
        y[0] = self.mass * self.initial_specific_enthalpy;
    }

    fn set_internal_states(&mut self, y: &[f64]) {
        self.specific_enthalpy = y[0] / self.mass;
    }

    fn internal_states(&self, y: &mut [f64]) {
        y[0] = self.mass * self.specific_enthalpy;
    }

    fn inlet_end_specific_enthalpy(&self) -> f64 {
        self.specific_enthalpy
    }

    fn outlet_end_specific_enthalpy(&self) -> f64 {
        self.specific_enthalpy
    }

    fn mean_specific_enthalpy(&self) -> f64 {
        self.specific_enthalpy
    }

    fn set_inflow(&mut self, mass_flux: f64, inflow_specific_enthalpy: f64) {
        self.mass_flux = mass_flux;
        self.inflow_specific_enthalpy = inflow_specific_enthalpy;
    }

    fn heat_exchange(&self) -> &HeatExchange {
        &self.heat_exchange
    }

    fn heat_exchange_mut(&mut self) -> &mut HeatExchange {
        &mut self.heat_exchange
    }

    fn heat_loss(&self) -> f64 {
        self.heat_exchange.heat_loss(self.specific_enthalpy / self.heat_capacity)
    }

    fn internal_heat_losses(&self, ydot: &mut [f64]) {
        let dh = self.inflow_specific_enthalpy - self.specific_enthalpy;
        ydot[0] = self.mass_flux.abs() * dh - self.heat_loss();
    }
}

/// Pipe modelled as a single well-mixed volume.
pub fn simple_pipe(
    element_id: u32,
    density: f64,
    heat_capacity: f64,
    diameter_inside_m: f64,
    length_m: f64,
    initial_temperature_k: f64,
    heat_exchange: HeatExchange,
) -> ModelResult<MixedVolume> {
    MixedVolume::new(
        &format!("SimplePipe #{element_id}"),
        density,
        heat_capacity,
        pipe_volume(diameter_inside_m, length_m),
        initial_temperature_k,
        heat_exchange,
    )
}

/// Pump or other element without heat exchange.
pub fn adiabatic(
    element_id: u32,
    density: f64,
    heat_capacity: f64,
    volume_m3: f64,
    initial_temperature_k: f64,
) -> ModelResult<MixedVolume> {
    MixedVolume::new(
        &format!("Adiabatic #{element_id}"),
        density,
        heat_capacity,
        volume_m3,
        initial_temperature_k,
        HeatExchange::None,
    )
}

/// Heat exchanger extracting a constant heat flux from the fluid.
pub fn heat_exchanger(
    element_id: u32,
    density: f64,
    heat_capacity: f64,
    volume_m3: f64,
    initial_temperature_k: f64,
    heat_exchange: HeatExchange,
) -> ModelResult<MixedVolume> {
    MixedVolume::new(
        &format!("HeatExchanger #{element_id}"),
        density,
        heat_capacity,
        volume_m3,
        initial_temperature_k,
        heat_exchange,
    )
}

/// Pipe split into `n` volumes of equal length along the flow path.
///
/// Heat exchange is distributed evenly over the volumes.
#[derive(Debug, Clone)]
pub struct DynamicPipeElement {
    volume_mass: f64,
    heat_capacity: f64,
    initial_specific_enthalpy: f64,
    specific_enthalpies: Vec<f64>,
    mass_flux: f64,
    inflow_specific_enthalpy: f64,
    heat_exchange: HeatExchange,
}

impl DynamicPipeElement {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        element_id: u32,
        density: f64,
        heat_capacity: f64,
        diameter_inside_m: f64,
        length_m: f64,
        discretization_length_m: f64,
        initial_temperature_k: f64,
        heat_exchange: HeatExchange,
    ) -> ModelResult<Self> {
        let what = format!("DynamicPipe #{element_id}");
        if !(discretization_length_m > 0.0) {
            return Err(ModelError::invalid_arg(what, "discretization length must be positive"));
        }
        let n = ((length_m / discretization_length_m).ceil() as usize).max(1);
        let volume = check_volume(&what, pipe_volume(diameter_inside_m, length_m))?;
        let h = heat_capacity * initial_temperature_k;
        Ok(Self {
            volume_mass: density * volume / n as f64,
            heat_capacity,
            initial_specific_enthalpy: h,
            specific_enthalpies: vec![h; n],
            mass_flux: 0.0,
            inflow_specific_enthalpy: h,
            heat_exchange,
        })
    }

    fn volume_heat_loss(&self, h: f64) -> f64 {
        self.heat_exchange.heat_loss(h / self.heat_capacity) / self.specific_enthalpies.len() as f64
    }
}

impl ThermalFlowElement for DynamicPipeElement {
    fn n_internal_states(&self) -> usize {
        self.specific_enthalpies.len()
    }

    fn initial_internal_states(&self, y: &mut [f64]) {
        y.fill(self.volume_mass * self.initial_specific_enthalpy);
    }

    fn set_internal_states(&mut self, y: &[f64]) {
        for (h, u) in self.specific_enthalpies.iter_mut().zip(y) {
            *h = u / self.volume_mass;
        }
    }

    fn internal_states(&self, y: &mut [f64]) {
        for (u, h) in y.iter_mut().zip(&self.specific_enthalpies) {
            *u = self.volume_mass * h;
        }
    }

    fn inlet_end_specific_enthalpy(&self) -> f64 {
        self.specific_enthalpies.first().copied().unwrap_or(self.initial_specific_enthalpy)
    }

    fn outlet_end_specific_enthalpy(&self) -> f64 {
        self.specific_enthalpies.last().copied().unwrap_or(self.initial_specific_enthalpy)
    }

    fn mean_specific_enthalpy(&self) -> f64 {
        self.specific_enthalpies.iter().sum::<f64>() / self.specific_enthalpies.len() as f64
    }

    fn set_inflow(&mut self, mass_flux: f64, inflow_specific_enthalpy: f64) {
        self.mass_flux = mass_flux;
        self.inflow_specific_enthalpy = inflow_specific_enthalpy;
    }

    fn heat_exchange(&self) -> &HeatExchange {
        &self.heat_exchange
    }

    fn heat_exchange_mut(&mut self) -> &mut HeatExchange {
        &mut self.heat_exchange
    }

    fn heat_loss(&self) -> f64 {
        self.specific_enthalpies.iter().map(|&h| self.volume_heat_loss(h)).sum()
    }

    fn internal_heat_losses(&self, ydot: &mut [f64]) {
        let h = &self.specific_enthalpies;
        let n = h.len();
        let m = self.mass_flux.abs();
        for i in 0..n {
            // upwind neighbour along the current flow direction
            let upstream = if self.mass_flux >= 0.0 {
                if i == 0 { self.inflow_specific_enthalpy } else { h[i - 1] }
            } else if i + 1 == n {
                self.inflow_specific_enthalpy
            } else {
                h[i + 1]
            };
            ydot[i] = m * (upstream - h[i]) - self.volume_heat_loss(h[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CP: f64 = 4180.0;
    const RHO: f64 = 998.0;

    #[test]
    fn states_round_trip() {
        let hx = HeatExchange::None;
        let mut pipe = DynamicPipeElement::new(1, RHO, CP, 0.02, 25.0, 10.0, 313.15, hx).unwrap();
        assert_eq!(pipe.n_internal_states(), 3);

        let mut y0 = vec![0.0; 3];
        pipe.initial_internal_states(&mut y0);
        pipe.set_internal_states(&y0);
        let mut y1 = vec![0.0; 3];
        pipe.internal_states(&mut y1);
        for (a, b) in y0.iter().zip(&y1) {
            assert!((a - b).abs() <= 1e-12 * a.abs());
        }
        assert!((pipe.mean_specific_enthalpy() - CP * 313.15).abs() < 1e-6);
    }

    #[test]
    fn dynamic_pipe_upwinds_in_both_directions() {
        let hx = HeatExchange::None;
        let mut pipe = DynamicPipeElement::new(1, RHO, CP, 0.02, 20.0, 10.0, 313.15, hx).unwrap();
        let h0 = CP * 313.15;
        let h_in = CP * 333.15;
        let mut ydot = [0.0; 2];

        pipe.set_inflow(0.5, h_in);
        pipe.internal_heat_losses(&mut ydot);
        assert!((ydot[0] - 0.5 * (h_in - h0)).abs() < 1e-6);
        assert_eq!(ydot[1], 0.0);

        pipe.set_inflow(-0.5, h_in);
        pipe.internal_heat_losses(&mut ydot);
        assert_eq!(ydot[0], 0.0);
        assert!((ydot[1] - 0.5 * (h_in - h0)).abs() < 1e-6);
    }

    #[test]
    fn constant_heat_flux_is_removed_from_the_fluid() {
        let hx = HeatExchange::HeatFlux { heat_flux_w: 500.0 };
        let mut hx = heat_exchanger(3, RHO, CP, 0.005, 313.15, hx).unwrap();
        hx.set_inflow(0.1, CP * 313.15);
        let mut ydot = [0.0];
        hx.internal_heat_losses(&mut ydot);
        assert!((ydot[0] + 500.0).abs() < 1e-9);
        assert_eq!(hx.heat_loss(), 500.0);
    }

    #[test]
    fn zero_volume_is_rejected() {
        assert!(adiabatic(2, RHO, CP, 0.0, 313.15).is_err());
    }
}
