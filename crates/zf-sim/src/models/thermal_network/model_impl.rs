//! Flow elements and nodal mixing of one thermal network.

use tracing::trace;
use zf_core::ObjectId;
use zf_graph::PortKind;
use zf_model::{ModelError, ModelResult};
use zf_project::{ComponentModelType, NetworkDef, NetworkElementDef};

use super::flow_elements::{
    DynamicPipeElement, ThermalFlowElement, adiabatic, heat_exchanger, simple_pipe,
};
use super::heat_exchange::resolve_heat_exchange;
use crate::models::network::{NetworkTopology, network_fluid};

/// Total inflow below which a node counts as stagnant [kg/s].
pub const STAGNANT_MASS_FLUX: f64 = 1e-12;

/// Shared state of the thermal network: the flow elements, the nodal
/// enthalpies and the mass fluxes they were computed for.
#[derive(Debug)]
pub struct ThermalNetworkModelImpl {
    topology: NetworkTopology,
    heat_capacity: f64,
    elements: Vec<Box<dyn ThermalFlowElement>>,
    /// First state of each element in the network state vector
    offsets: Vec<usize>,
    n: usize,
    node_enthalpies: Vec<f64>,
    mass_fluxes: Vec<f64>,
    /// Enthalpy flow given up by the fluid passing each element [W]
    heat_fluxes: Vec<f64>,
    ambient_heat_losses: Vec<f64>,
    zone_ids: Vec<ObjectId>,
}

impl ThermalNetworkModelImpl {
    /// Build one flow element per network element, in graph order.
    pub fn new(
        model: &str,
        def: &NetworkDef,
        topology: NetworkTopology,
        initial_zone_temperature_k: f64,
    ) -> ModelResult<Self> {
        let fluid = network_fluid(def)?;
        let elements = def
            .elements
            .iter()
            .map(|element| {
                flow_element(
                    model,
                    def,
                    element,
                    fluid.density,
                    fluid.heat_capacity,
                    initial_zone_temperature_k,
                )
            })
            .collect::<ModelResult<Vec<_>>>()?;

        let mut offsets = Vec::with_capacity(elements.len());
        let mut n = 0;
        for element in &elements {
            offsets.push(n);
            n += element.n_internal_states();
        }

        let mut zone_ids: Vec<ObjectId> = Vec::new();
        for zone in elements.iter().filter_map(|e| e.heat_exchange().zone_id()) {
            if !zone_ids.contains(&zone) {
                zone_ids.push(zone);
            }
        }

        let h0 = fluid.specific_enthalpy(def.initial_fluid_temperature_k);
        Ok(Self {
            node_enthalpies: vec![h0; topology.node_count()],
            mass_fluxes: vec![0.0; elements.len()],
            heat_fluxes: vec![0.0; elements.len()],
            ambient_heat_losses: vec![0.0; elements.len()],
            topology,
            heat_capacity: fluid.heat_capacity,
            elements,
            offsets,
            n,
            zone_ids,
        })
    }

    pub fn topology(&self) -> &NetworkTopology {
        &self.topology
    }

    /// Length of the network state vector.
    pub fn n_states(&self) -> usize {
        self.n
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn element(&self, index: usize) -> Option<&dyn ThermalFlowElement> {
        self.elements.get(index).map(|e| &**e)
    }

    /// Zones exchanging heat with the network, in order of first appearance.
    pub fn zone_ids(&self) -> &[ObjectId] {
        &self.zone_ids
    }

    /// `(element index, zone id)` of every zone-coupled element.
    pub fn zone_couplings(&self) -> Vec<(usize, ObjectId)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.heat_exchange().zone_id().map(|z| (i, z)))
            .collect()
    }

    fn element_states<'a>(&self, i: usize, y: &'a [f64]) -> &'a [f64] {
        &y[self.offsets[i]..self.offsets[i] + self.elements[i].n_internal_states()]
    }

    pub fn y_initial(&self, y: &mut [f64]) {
        for (i, element) in self.elements.iter().enumerate() {
            let start = self.offsets[i];
            element.initial_internal_states(&mut y[start..start + element.n_internal_states()]);
        }
    }

    /// Hand each element its slice of `y`.
    pub fn set_states(&mut self, y: &[f64]) {
        for i in 0..self.elements.len() {
            let states = self.element_states(i, y);
            self.elements[i].set_internal_states(states);
        }
    }

    /// Current states of all elements, the inverse of `set_states`.
    pub fn states(&self, y: &mut [f64]) {
        for (i, element) in self.elements.iter().enumerate() {
            let start = self.offsets[i];
            element.internal_states(&mut y[start..start + element.n_internal_states()]);
        }
    }

    /// Mean fluid temperature [K] per element.
    pub fn fluid_temperatures(&self, out: &mut [f64]) {
        for (t, element) in out.iter_mut().zip(&self.elements) {
            *t = element.mean_specific_enthalpy() / self.heat_capacity;
        }
    }

    pub fn set_mass_fluxes(&mut self, mass_fluxes: &[f64]) {
        self.mass_fluxes.copy_from_slice(mass_fluxes);
    }

    pub fn set_ambient_temperature(&mut self, element: usize, t_k: f64) {
        if let Some(e) = self.elements.get_mut(element) {
            e.heat_exchange_mut().set_ambient_temperature(t_k);
        }
    }

    pub fn node_specific_enthalpy(&self, node: usize) -> Option<f64> {
        self.node_enthalpies.get(node).copied()
    }

    /// `|m| (h_entering - h_leaving)` per element.
    pub fn heat_fluxes(&self) -> &[f64] {
        &self.heat_fluxes
    }

    /// Heat each element gives off to its ambient.
    pub fn ambient_heat_losses(&self) -> &[f64] {
        &self.ambient_heat_losses
    }

    /// Mix the fluid arriving at every node, weighted by mass flux.
    ///
    /// An element delivers into a node when the node is its outlet and the
    /// flux is positive, or its inlet and the flux is negative. Stagnant nodes
    /// take the mean enthalpy of the attached element ends.
    pub fn update_states(&mut self) {
        let graph = &self.topology.graph;
        for node in graph.nodes() {
            let mut total = 0.0;
            let mut weighted = 0.0;
            let mut count = 0;
            let mut last = 0.0;
            for port in graph.node_ports(node.id) {
                let e = port.element.idx();
                let m = self.mass_fluxes[e];
                let inflow = match port.kind {
                    PortKind::Outlet => m > 0.0,
                    PortKind::Inlet => m < 0.0,
                };
                if inflow {
                    let h = self.elements[e].leaving_specific_enthalpy(m);
                    total += m.abs();
                    weighted += m.abs() * h;
                    count += 1;
                    last = h;
                }
            }

            let h = if count == 1 {
                last
            } else if total >= STAGNANT_MASS_FLUX {
                weighted / total
            } else {
                let ports = graph.node_ports(node.id);
                let sum: f64 = ports
                    .iter()
                    .map(|p| {
                        let element = &self.elements[p.element.idx()];
                        match p.kind {
                            PortKind::Outlet => element.outlet_end_specific_enthalpy(),
                            PortKind::Inlet => element.inlet_end_specific_enthalpy(),
                        }
                    })
                    .sum();
                trace!(
                    node = node.object_id,
                    total,
                    "stagnant node, mean enthalpy of attached elements"
                );
                if ports.is_empty() {
                    self.node_enthalpies[node.id.idx()]
                } else {
                    sum / ports.len() as f64
                }
            };
            self.node_enthalpies[node.id.idx()] = h;
        }
    }

    /// Upwind the nodal enthalpies into the elements and record the heat
    /// carried off by the flow and lost to the ambient.
    pub fn update_fluxes(&mut self) {
        for (i, fe) in self.topology.graph.elements().iter().enumerate() {
            let m = self.mass_fluxes[i];
            let h_in = if m >= 0.0 {
                self.node_enthalpies[fe.inlet.idx()]
            } else {
                self.node_enthalpies[fe.outlet.idx()]
            };
            let element = &mut self.elements[i];
            element.set_inflow(m, h_in);
            self.heat_fluxes[i] = m.abs() * (h_in - element.leaving_specific_enthalpy(m));
            self.ambient_heat_losses[i] = element.heat_loss();
        }
    }

    /// Derivatives of all element states.
    pub fn ydot(&self, out: &mut [f64]) {
        for (i, element) in self.elements.iter().enumerate() {
            let start = self.offsets[i];
            element.internal_heat_losses(&mut out[start..start + element.n_internal_states()]);
        }
    }

    /// Heat released into every coupled zone, parallel to `zone_ids`.
    pub fn zone_heat_loads(&self, out: &mut [f64]) {
        out.fill(0.0);
        for (i, element) in self.elements.iter().enumerate() {
            let Some(zone) = element.heat_exchange().zone_id() else {
                continue;
            };
            if let Some(k) = self.zone_ids.iter().position(|&z| z == zone) {
                out[k] += self.ambient_heat_losses[i];
            }
        }
    }
}

fn flow_element(
    model: &str,
    def: &NetworkDef,
    element: &NetworkElementDef,
    density: f64,
    heat_capacity: f64,
    initial_zone_temperature_k: f64,
) -> ModelResult<Box<dyn ThermalFlowElement>> {
    let component = def.component(element.component_id).ok_or_else(|| ModelError::MissingReference {
        model: model.to_string(),
        what: format!("component #{} of flow element #{}", element.component_id, element.id),
    })?;
    let t0 = def.initial_fluid_temperature_k;
    let volume = || {
        component.volume_m3.ok_or_else(|| {
            ModelError::missing_parameter(
                model,
                format!("volume_m3 of component #{} ({})", component.id, component.name),
            )
        })
    };

    let built: Box<dyn ThermalFlowElement> = match component.model_type {
        ComponentModelType::SimplePipe | ComponentModelType::DynamicPipe => {
            let pipe_id = element.pipe_id.ok_or_else(|| ModelError::MissingReference {
                model: model.to_string(),
                what: format!("pipe properties of flow element #{}", element.id),
            })?;
            let pipe = def.pipe(pipe_id).ok_or_else(|| ModelError::MissingReference {
                model: model.to_string(),
                what: format!("pipe #{pipe_id} of flow element #{}", element.id),
            })?;
            let length = element
                .length_m
                .ok_or_else(|| {
                    let what = format!("length of flow element #{}", element.id);
                    ModelError::missing_parameter(model, what)
                })?;
            let hx = resolve_heat_exchange(
                model,
                element,
                component.model_type,
                Some((pipe, length)),
                initial_zone_temperature_k,
            )?;
            if component.model_type == ComponentModelType::SimplePipe {
                Box::new(simple_pipe(
                    element.id,
                    density,
                    heat_capacity,
                    pipe.diameter_inside_m,
                    length,
                    t0,
                    hx,
                )?)
            } else {
                let dx = element.discretization_length_m.ok_or_else(|| {
                    ModelError::missing_parameter(
                        model,
                        format!("discretization length of flow element #{}", element.id),
                    )
                })?;
                Box::new(DynamicPipeElement::new(
                    element.id,
                    density,
                    heat_capacity,
                    pipe.diameter_inside_m,
                    length,
                    dx,
                    t0,
                    hx,
                )?)
            }
        }
        ComponentModelType::ConstantPressurePump | ComponentModelType::ConstantMassFluxPump => {
            resolve_heat_exchange(
                model,
                element,
                component.model_type,
                None,
                initial_zone_temperature_k,
            )?;
            Box::new(adiabatic(element.id, density, heat_capacity, volume()?, t0)?)
        }
        ComponentModelType::HeatExchanger => {
            let hx = resolve_heat_exchange(
                model,
                element,
                component.model_type,
                None,
                initial_zone_temperature_k,
            )?;
            Box::new(heat_exchanger(element.id, density, heat_capacity, volume()?, t0, hx)?)
        }
        ComponentModelType::HeatPumpIdealCarnot => {
            return Err(ModelError::UnsupportedModelType {
                model: model.to_string(),
                model_type: component.model_type.name().to_string(),
            });
        }
    };
    Ok(built)
}
