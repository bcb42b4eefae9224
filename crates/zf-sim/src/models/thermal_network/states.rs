use zf_model::{
    ModelError, ModelResult, QuantityDescription, ResultAllocator, ResultSet, ValueRef, ValueStore,
};

use super::model_impl::ThermalNetworkModelImpl;
use crate::quantities as q;

/// State side of the thermal network: takes over the integrator's states and
/// publishes the state-derived fluid temperatures.
#[derive(Debug, Default)]
pub struct ThermalNetworkStatesModel {
    y_ref: Option<ValueRef>,
    fluid_temperatures: Option<ValueRef>,
    temperatures: Vec<f64>,
}

impl ThermalNetworkStatesModel {
    pub fn init_results(
        &mut self,
        network: &ThermalNetworkModelImpl,
        alloc: &mut ResultAllocator<'_>,
        results: &mut ResultSet,
    ) {
        let n = network.n_states();
        self.temperatures = vec![0.0; network.element_count()];

        let r = alloc.state_derived(n);
        self.y_ref = Some(results.push(
            QuantityDescription::whole_only(q::Y, "J", "Internal energies of all fluid volumes", n),
            r,
        ));
        let r = alloc.state_derived(network.element_count());
        self.fluid_temperatures = Some(results.push(
            QuantityDescription::keyed(
                q::FLUID_TEMPERATURES,
                "K",
                "Mean fluid temperature per flow element",
                network.topology().element_ids(),
            ),
            r,
        ));
        // all elements start at the initial fluid temperature
        network.fluid_temperatures(&mut self.temperatures);
        if let Some(&t0) = self.temperatures.first() {
            alloc.fill(r, t0);
        }
    }

    /// Distribute `y` to the flow elements and publish the fluid temperatures.
    pub fn set_states(
        &mut self,
        model: &str,
        network: &mut ThermalNetworkModelImpl,
        y: &[f64],
        store: &mut ValueStore,
    ) -> ModelResult<()> {
        if let Some(pos) = y.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::Recoverable {
                model: model.to_string(),
                what: format!("non-finite state {} at position {pos}", y[pos]),
            });
        }
        network.set_states(y);
        network.fluid_temperatures(&mut self.temperatures);
        if let Some(r) = self.y_ref {
            store.write(r, y);
        }
        if let Some(r) = self.fluid_temperatures {
            store.write(r, &self.temperatures);
        }
        Ok(())
    }
}
