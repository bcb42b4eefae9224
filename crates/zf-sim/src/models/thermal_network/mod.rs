//! Thermal network: energy transport of the fluid through a hydraulic network.
//!
//! The mass fluxes come from the [`HydraulicNetworkModel`](super::HydraulicNetworkModel)
//! of the same network id. Every flow element carries one or more fluid
//! volumes whose internal energies [J] are integrated. Nodes have no storage;
//! their enthalpy is the mass-flux weighted mix of the arriving fluid.

mod balance;
mod flow_elements;
mod heat_exchange;
mod model_impl;
mod states;

use tracing::debug;
use zf_core::ObjectId;
use zf_model::{
    BalanceModel, InputReference, Model, ModelInfo, ModelKind, ModelResult, QuantityDescription,
    QuantityName, ReferenceType, ResultAllocator, ResultSet, StateDependency, StateModel, ValueRef,
    ValueStore,
};
use zf_project::NetworkDef;

pub use balance::ThermalNetworkBalanceModel;
pub use flow_elements::{DynamicPipeElement, MixedVolume, ThermalFlowElement, pipe_volume};
pub use heat_exchange::{HeatExchange, pipe_conductance};
pub use model_impl::{STAGNANT_MASS_FLUX, ThermalNetworkModelImpl};
pub use states::ThermalNetworkStatesModel;

use super::network::NetworkTopology;

/// One thermal network, acting as its own state and balance model.
#[derive(Debug)]
pub struct ThermalNetworkModel {
    id: ObjectId,
    network: ThermalNetworkModelImpl,
    states: ThermalNetworkStatesModel,
    balance: ThermalNetworkBalanceModel,
    results: ResultSet,
}

impl ThermalNetworkModel {
    /// `initial_zone_temperature_k` is the ambient of zone-coupled elements
    /// until the first update.
    pub fn new(
        def: &NetworkDef,
        topology: NetworkTopology,
        initial_zone_temperature_k: f64,
    ) -> ModelResult<Self> {
        let model = format!("ThermalNetworkModel(#{})", def.id);
        let network = ThermalNetworkModelImpl::new(
            &model,
            def,
            topology,
            initial_zone_temperature_k,
        )?;
        debug!(
            network = def.id,
            elements = network.element_count(),
            states = network.n_states(),
            zones = network.zone_ids().len(),
            "thermal network built"
        );
        Ok(Self {
            id: def.id,
            network,
            states: ThermalNetworkStatesModel::default(),
            balance: ThermalNetworkBalanceModel::default(),
            results: ResultSet::new(),
        })
    }

    pub fn network(&self) -> &ThermalNetworkModelImpl {
        &self.network
    }
}

impl Model for ThermalNetworkModel {
    fn reference_type(&self) -> Option<ReferenceType> {
        Some(ReferenceType::Network)
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn display_name(&self) -> String {
        format!("ThermalNetworkModel(#{})", self.id)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::ThermalNetwork {
            network_id: self.id,
            zone_ids: self.network.zone_ids().to_vec(),
        }
    }

    fn init_results(
        &mut self,
        _models: &[ModelInfo],
        alloc: &mut ResultAllocator<'_>,
    ) -> ModelResult<()> {
        self.states.init_results(&self.network, alloc, &mut self.results);
        self.balance.init_results(&self.network, alloc, &mut self.results);
        Ok(())
    }

    fn result_descriptions(&self, out: &mut Vec<QuantityDescription>) {
        self.results.descriptions(out);
    }

    fn result_value_refs(&self, out: &mut Vec<ValueRef>) {
        self.results.value_refs(out);
    }

    fn result_value_ref(&self, quantity: &QuantityName) -> Option<ValueRef> {
        self.results.lookup(quantity)
    }

    fn as_state_dependency(&self) -> Option<&dyn StateDependency> {
        Some(self)
    }

    fn as_state_dependency_mut(&mut self) -> Option<&mut dyn StateDependency> {
        Some(self)
    }

    fn as_state_model(&self) -> Option<&dyn StateModel> {
        Some(self)
    }

    fn as_state_model_mut(&mut self) -> Option<&mut dyn StateModel> {
        Some(self)
    }

    fn as_balance_model(&self) -> Option<&dyn BalanceModel> {
        Some(self)
    }
}

impl StateDependency for ThermalNetworkModel {
    fn init_input_references(&mut self, _models: &[ModelInfo]) -> ModelResult<()> {
        self.balance.init_input_references(self.id, self.network.zone_ids());
        Ok(())
    }

    fn input_references(&self, out: &mut Vec<InputReference>) {
        out.clear();
        out.extend(self.balance.input_references().iter().cloned());
    }

    fn set_input_value_refs(
        &mut self,
        refs: &[InputReference],
        resolved: &[Option<ValueRef>],
    ) -> ModelResult<()> {
        let model = self.display_name();
        self.balance.set_input_value_refs(&model, &self.network, refs, resolved)
    }

    fn state_dependencies(&self, out: &mut Vec<(ValueRef, ValueRef)>) {
        self.balance.state_dependencies(out);
    }

    fn update(&mut self, store: &mut ValueStore) -> ModelResult<()> {
        self.balance.update(&mut self.network, store)
    }
}

impl StateModel for ThermalNetworkModel {
    fn n(&self) -> usize {
        self.network.n_states()
    }

    fn state_key(&self) -> (ReferenceType, ObjectId) {
        (ReferenceType::Network, self.id)
    }

    fn y_initial(&self, y: &mut [f64]) {
        self.network.y_initial(y);
    }

    fn set_states(&mut self, y: &[f64], store: &mut ValueStore) -> ModelResult<()> {
        let model = self.display_name();
        self.states.set_states(&model, &mut self.network, y, store)
    }
}

impl BalanceModel for ThermalNetworkModel {
    fn state_key(&self) -> (ReferenceType, ObjectId) {
        (ReferenceType::Network, self.id)
    }

    fn ydot(&self, store: &ValueStore, out: &mut [f64]) {
        self.balance.ydot(store, out);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use zf_model::ModelError;
    use zf_project::{
        ComponentDef, ComponentModelType, FluidDef, HeatExchangeDef, HeatExchangeType,
        NetworkElementDef, NetworkNodeDef, NetworkNodeKind, PipeDef,
    };

    use super::*;
    use crate::quantities as q;

    fn component(id: ObjectId, model_type: ComponentModelType) -> ComponentDef {
        ComponentDef {
            id,
            name: model_type.name().into(),
            model_type,
            pressure_head_pa: None,
            mass_flux_kg_s: Some(0.1),
            zeta: Some(2.0),
            hydraulic_diameter_m: Some(0.02),
            volume_m3: Some(0.001),
            carnot_efficiency: None,
        }
    }

    fn element(
        id: ObjectId,
        inlet: ObjectId,
        outlet: ObjectId,
        component_id: ObjectId,
    ) -> NetworkElementDef {
        NetworkElementDef {
            id,
            name: format!("element {id}"),
            inlet_node_id: inlet,
            outlet_node_id: outlet,
            component_id,
            pipe_id: Some(1),
            length_m: Some(10.0),
            discretization_length_m: Some(2.5),
            heat_exchange: HeatExchangeDef::default(),
        }
    }

    /// Pump 1->2, simple pipe 2->3, dynamic pipe 3->1.
    fn ring() -> NetworkDef {
        NetworkDef {
            id: 7,
            name: "ring".into(),
            fluid: FluidDef::Water,
            reference_node_id: 1,
            reference_pressure_pa: 101_325.0,
            initial_fluid_temperature_k: 313.15,
            nodes: (1..=3)
                .map(|id| NetworkNodeDef {
                    id,
                    name: String::new(),
                    kind: NetworkNodeKind::Mixer,
                })
                .collect(),
            pipes: vec![PipeDef {
                id: 1,
                name: "PE 25".into(),
                diameter_inside_m: 0.02,
                diameter_outside_m: 0.025,
                roughness_m: 7e-6,
                u_value_wall_w_mk: 2.0,
            }],
            components: vec![
                component(1, ComponentModelType::ConstantMassFluxPump),
                component(2, ComponentModelType::SimplePipe),
                component(3, ComponentModelType::DynamicPipe),
                component(4, ComponentModelType::HeatPumpIdealCarnot),
                component(5, ComponentModelType::HeatExchanger),
            ],
            elements: vec![element(10, 1, 2, 1), element(11, 2, 3, 2), element(12, 3, 1, 3)],
        }
    }

    fn build(def: &NetworkDef) -> ModelResult<ThermalNetworkModel> {
        ThermalNetworkModel::new(def, NetworkTopology::from_def(def)?, 293.15)
    }

    /// Wire the model to a mass flux slot and zone temperature slots owned by
    /// a fake producer.
    fn wire(model: &mut ThermalNetworkModel, store: &mut ValueStore, zone_t: f64) -> ValueRef {
        model.init_results(&[], &mut store.allocator(0)).unwrap();
        model.init_input_references(&[]).unwrap();
        let mut refs = Vec::new();
        model.input_references(&mut refs);

        let mut alloc = store.allocator(1);
        let m = alloc.algebraic(model.network().element_count());
        let mut resolved = vec![Some(m)];
        for _ in 1..refs.len() {
            let t = alloc.state_derived(1);
            alloc.fill(t, zone_t);
            resolved.push(Some(t));
        }
        model.set_input_value_refs(&refs, &resolved).unwrap();
        m
    }

    fn ydot(model: &ThermalNetworkModel, store: &ValueStore) -> Vec<f64> {
        let mut out = vec![0.0; model.n()];
        BalanceModel::ydot(model, store, &mut out);
        out
    }

    #[test]
    fn ring_layout_and_results() {
        let model = build(&ring()).unwrap();
        // pump and simple pipe one volume each, 10 m / 2.5 m dynamic pipe
        assert_eq!(model.n(), 6);
        assert_eq!(model.display_name(), "ThermalNetworkModel(#7)");

        let mut model = model;
        let mut store = ValueStore::new();
        wire(&mut model, &mut store, 293.15);
        let t = model.result_value_ref(&QuantityName::indexed(q::FLUID_TEMPERATURES, 11)).unwrap();
        assert!((store.get(t) - 313.15).abs() < 1e-9);
        assert!(model.result_value_ref(&QuantityName::indexed(q::Y, 0)).is_none());
        assert!(model.result_value_ref(&QuantityName::new(q::Y)).is_some());
    }

    #[test]
    fn heat_pump_is_not_supported() {
        let mut def = ring();
        def.elements[0].component_id = 4;
        match build(&def) {
            Err(ModelError::UnsupportedModelType { model_type, .. }) => {
                assert_eq!(model_type, "HeatPumpIdealCarnot");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn heat_exchanger_needs_its_volume() {
        let mut def = ring();
        def.components[4].volume_m3 = None;
        def.elements[0].component_id = 5;
        assert!(matches!(build(&def), Err(ModelError::MissingParameter { .. })));
    }

    #[test]
    fn single_inflow_is_taken_over_exactly() {
        let mut model = build(&ring()).unwrap();
        let mut store = ValueStore::new();
        let m = wire(&mut model, &mut store, 293.15);

        let mut y = vec![0.0; model.n()];
        model.y_initial(&mut y);
        // heat the simple pipe
        y[1] *= 1.05;
        model.set_states(&y, &mut store).unwrap();
        store.write(m, &[0.1, 0.1, 0.1]);
        model.update(&mut store).unwrap();

        let network = model.network();
        let pipe = network.element(1).unwrap();
        // node 3 is fed by the simple pipe only
        assert_eq!(network.node_specific_enthalpy(2), Some(pipe.outlet_end_specific_enthalpy()));
    }

    #[test]
    fn stagnant_network_has_no_derivative() {
        let mut model = build(&ring()).unwrap();
        let mut store = ValueStore::new();
        wire(&mut model, &mut store, 293.15);
        let mut y = vec![0.0; model.n()];
        model.y_initial(&mut y);
        model.set_states(&y, &mut store).unwrap();
        model.update(&mut store).unwrap();
        assert!(ydot(&model, &store).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn zone_coupled_pipe_heats_the_zone() {
        let mut def = ring();
        def.elements[1].heat_exchange = HeatExchangeDef {
            kind: HeatExchangeType::TemperatureZone,
            heat_transfer_coefficient_w_m2k: Some(8.0),
            zone_id: Some(3),
            ..HeatExchangeDef::default()
        };
        let mut model = build(&def).unwrap();
        assert_eq!(
            model.kind(),
            ModelKind::ThermalNetwork {
                network_id: 7,
                zone_ids: vec![3]
            }
        );

        let mut store = ValueStore::new();
        let m = wire(&mut model, &mut store, 293.15);
        let mut y = vec![0.0; model.n()];
        model.y_initial(&mut y);
        model.set_states(&y, &mut store).unwrap();
        store.write(m, &[0.1, 0.1, 0.1]);
        model.update(&mut store).unwrap();

        let load = QuantityName::indexed(q::NETWORK_ZONE_HEAT_LOAD, 3);
        let load = store.get(model.result_value_ref(&load).unwrap());
        let flux = QuantityName::indexed(q::AMBIENT_HEAT_FLUX, 11);
        let flux = store.get(model.result_value_ref(&flux).unwrap());
        let p = &def.pipes[0];
        let expected = pipe_conductance(p, 10.0, 8.0) * 20.0;
        assert!((load - expected).abs() < 1e-9 * expected);
        assert_eq!(load, flux);
        // the fluid loses what the zone gains
        let sum: f64 = ydot(&model, &store).iter().sum();
        assert!((sum + load).abs() < 1e-9 * load);
    }

    #[test]
    fn states_read_back_what_was_set() {
        let mut model = build(&ring()).unwrap();
        let mut store = ValueStore::new();
        wire(&mut model, &mut store, 293.15);
        let mut y = vec![0.0; model.n()];
        model.y_initial(&mut y);
        for (i, v) in y.iter_mut().enumerate() {
            *v *= 1.0 + 0.01 * i as f64;
        }
        model.set_states(&y, &mut store).unwrap();

        let mut back = vec![0.0; model.n()];
        model.network().states(&mut back);
        for (b, v) in back.iter().zip(&y) {
            assert!((b - v).abs() <= 1e-12 * v.abs());
        }
    }

    #[test]
    fn warm_pipe_hands_its_heat_to_the_next_element() {
        let mut model = build(&ring()).unwrap();
        let mut store = ValueStore::new();
        let m = wire(&mut model, &mut store, 293.15);
        let mut y = vec![0.0; model.n()];
        model.y_initial(&mut y);
        y[1] *= 1.02;
        model.set_states(&y, &mut store).unwrap();
        store.write(m, &[0.1, 0.1, 0.1]);
        model.update(&mut store).unwrap();

        let network = model.network();
        let pipe = network.element(1).unwrap();
        let h_in = network.node_specific_enthalpy(1).unwrap();
        let expected = 0.1 * (h_in - pipe.outlet_end_specific_enthalpy());
        let flux = store.get(model.result_value_ref(&QuantityName::indexed(
            q::HEAT_FLUX,
            11,
        )).unwrap());
        assert!(flux < 0.0);
        assert!((flux - expected).abs() <= 1e-9 * expected.abs());
        // adiabatic ring: no ambient exchange at all
        let ambient = model.result_value_ref(&QuantityName::new(q::AMBIENT_HEAT_FLUX)).unwrap();
        let ambient = store.slice(ambient);
        assert!(ambient.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn non_finite_states_are_recoverable() {
        let mut model = build(&ring()).unwrap();
        let mut store = ValueStore::new();
        wire(&mut model, &mut store, 293.15);
        let mut y = vec![0.0; model.n()];
        model.y_initial(&mut y);
        y[3] = f64::NAN;
        assert!(model.set_states(&y, &mut store).unwrap_err().is_recoverable());
    }

    proptest! {
        #[test]
        fn adiabatic_ring_conserves_energy(
            scale in prop::collection::vec(0.9f64..1.1, 6),
            m in -0.5f64..0.5,
        ) {
            let mut model = build(&ring()).unwrap();
            let mut store = ValueStore::new();
            let mr = wire(&mut model, &mut store, 293.15);
            let mut y = vec![0.0; model.n()];
            model.y_initial(&mut y);
            for (v, s) in y.iter_mut().zip(&scale) {
                *v *= s;
            }
            model.set_states(&y, &mut store).unwrap();
            store.write(mr, &[m, m, m]);
            model.update(&mut store).unwrap();

            let ydot = ydot(&model, &store);
            let sum: f64 = ydot.iter().sum();
            let scale = ydot.iter().map(|v| v.abs()).sum::<f64>().max(1.0);
            prop_assert!(sum.abs() <= 1e-9 * scale);
        }

        #[test]
        fn adiabatic_ring_heat_fluxes_cancel(
            scale in prop::collection::vec(0.9f64..1.1, 6),
            m in -0.5f64..0.5,
        ) {
            let mut model = build(&ring()).unwrap();
            let mut store = ValueStore::new();
            let mr = wire(&mut model, &mut store, 293.15);
            let mut y = vec![0.0; model.n()];
            model.y_initial(&mut y);
            for (v, s) in y.iter_mut().zip(&scale) {
                *v *= s;
            }
            model.set_states(&y, &mut store).unwrap();
            store.write(mr, &[m, m, m]);
            model.update(&mut store).unwrap();

            let flux = model.result_value_ref(&QuantityName::new(q::HEAT_FLUX)).unwrap();
            let flux = store.slice(flux);
            let sum: f64 = flux.iter().sum();
            let scale = flux.iter().map(|v| v.abs()).sum::<f64>().max(1.0);
            prop_assert!(sum.abs() <= 1e-9 * scale);
        }
    }
}
