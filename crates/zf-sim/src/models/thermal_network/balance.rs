use zf_core::ObjectId;
use zf_model::{
    InputReference, ModelError, ModelResult, QuantityDescription, QuantityName, ReferenceType,
    ResultAllocator, ResultSet, ValueRef, ValueStore, check_input_order,
};

use super::model_impl::ThermalNetworkModelImpl;
use crate::quantities as q;

/// Balance side of the thermal network: mixes the nodes for the current mass
/// fluxes and computes the energy derivatives and the heat exchanged.
#[derive(Debug, Default)]
pub struct ThermalNetworkBalanceModel {
    ydot: Option<ValueRef>,
    heat_flux: Option<ValueRef>,
    ambient_heat_flux: Option<ValueRef>,
    zone_heat_load: Option<ValueRef>,
    refs: Vec<InputReference>,
    mass_fluxes: Option<ValueRef>,
    /// Air temperature ref per entry of `zone_ids`
    zone_temperatures: Vec<Option<ValueRef>>,
    ydot_buffer: Vec<f64>,
    zone_buffer: Vec<f64>,
}

impl ThermalNetworkBalanceModel {
    pub fn init_results(
        &mut self,
        network: &ThermalNetworkModelImpl,
        alloc: &mut ResultAllocator<'_>,
        results: &mut ResultSet,
    ) {
        let n = network.n_states();
        self.ydot_buffer = vec![0.0; n];
        self.zone_buffer = vec![0.0; network.zone_ids().len()];

        let r = alloc.algebraic(n);
        self.ydot = Some(results.push(
            QuantityDescription::whole_only(
                q::YDOT,
                "W",
                "Derivatives of the fluid internal energies",
                n,
            ),
            r,
        ));
        let r = alloc.algebraic(network.element_count());
        self.heat_flux = Some(results.push(
            QuantityDescription::keyed(
                q::HEAT_FLUX,
                "W",
                "Enthalpy flow given up by the fluid per flow element",
                network.topology().element_ids(),
            ),
            r,
        ));
        let r = alloc.algebraic(network.element_count());
        self.ambient_heat_flux = Some(results.push(
            QuantityDescription::keyed(
                q::AMBIENT_HEAT_FLUX,
                "W",
                "Heat lost by the fluid to the surroundings per flow element",
                network.topology().element_ids(),
            ),
            r,
        ));
        let r = alloc.algebraic(network.zone_ids().len());
        self.zone_heat_load = Some(results.push(
            QuantityDescription::keyed(
                q::NETWORK_ZONE_HEAT_LOAD,
                "W",
                "Heat released into each coupled zone",
                network.zone_ids().to_vec(),
            ),
            r,
        ));
    }

    /// Mass fluxes of the hydraulic network, then the air temperature of every
    /// coupled zone.
    pub fn init_input_references(&mut self, network_id: ObjectId, zone_ids: &[ObjectId]) {
        self.refs = std::iter::once(InputReference::required(
            ReferenceType::Network,
            network_id,
            QuantityName::new(q::MASS_FLUXES),
        ))
        .chain(
            zone_ids
                .iter()
                .map(|&z| InputReference::required(
                    ReferenceType::Zone,
                    z,
                    QuantityName::new(q::AIR_TEMPERATURE),
                )),
        )
        .collect();
    }

    pub fn input_references(&self) -> &[InputReference] {
        &self.refs
    }

    pub fn set_input_value_refs(
        &mut self,
        model: &str,
        network: &ThermalNetworkModelImpl,
        refs: &[InputReference],
        resolved: &[Option<ValueRef>],
    ) -> ModelResult<()> {
        check_input_order(model, &self.refs, refs, resolved)?;
        self.mass_fluxes = resolved[0];
        if let Some(r) = self.mass_fluxes {
            if r.len != network.element_count() {
                return Err(ModelError::invalid_arg(
                    model,
                    format!("expected {} mass fluxes, got {}", network.element_count(), r.len),
                ));
            }
        }
        self.zone_temperatures = resolved[1..].to_vec();
        Ok(())
    }

    pub fn state_dependencies(&self, out: &mut Vec<(ValueRef, ValueRef)>) {
        let Some(m) = self.mass_fluxes else { return };
        let results = [self.ydot, self.heat_flux, self.ambient_heat_flux, self.zone_heat_load];
        for r in results.into_iter().flatten() {
            out.push((r, m));
        }
    }

    pub fn update(
        &mut self,
        network: &mut ThermalNetworkModelImpl,
        store: &mut ValueStore,
    ) -> ModelResult<()> {
        if let Some(r) = self.mass_fluxes {
            network.set_mass_fluxes(store.slice(r));
        }
        for (element, zone) in network.zone_couplings() {
            let Some(k) = network.zone_ids().iter().position(|&z| z == zone) else {
                continue;
            };
            if let Some(r) = self.zone_temperatures.get(k).copied().flatten() {
                network.set_ambient_temperature(element, store.get(r));
            }
        }

        network.update_states();
        network.update_fluxes();

        network.ydot(&mut self.ydot_buffer);
        if let Some(pos) = self.ydot_buffer.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::Recoverable {
                model: format!("ThermalNetworkModel(#{})", network.topology().network_id),
                what: format!("non-finite energy derivative at position {pos}"),
            });
        }
        if let Some(r) = self.ydot {
            store.write(r, &self.ydot_buffer);
        }
        if let Some(r) = self.heat_flux {
            store.write(r, network.heat_fluxes());
        }
        if let Some(r) = self.ambient_heat_flux {
            store.write(r, network.ambient_heat_losses());
        }
        network.zone_heat_loads(&mut self.zone_buffer);
        if let Some(r) = self.zone_heat_load {
            store.write(r, &self.zone_buffer);
        }
        Ok(())
    }

    pub fn ydot(&self, store: &ValueStore, out: &mut [f64]) {
        if let Some(r) = self.ydot {
            out.copy_from_slice(store.slice(r));
        }
    }
}
