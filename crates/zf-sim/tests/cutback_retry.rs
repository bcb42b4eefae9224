//! Recoverable model failures cut the step back instead of aborting the run.

use zf_core::ObjectId;
use zf_model::{
    InputReference, Model, ModelError, ModelGraph, ModelInfo, ModelKind, ModelResult,
    QuantityDescription, QuantityName, ReferenceType, ResultAllocator, ResultSet, StateDependency,
    ValueRef, ValueStore,
};
use zf_sim::models::{RoomBalanceModel, RoomStatesModel};
use zf_sim::quantities as q;
use zf_sim::{IntegratorType, SimError, SimOptions, run_sim};

const HEATER_W: f64 = 1000.0;

/// Convective equipment load for zone 1 whose first `failures_left` updates
/// fail recoverably.
struct FlakyHeater {
    failures_left: usize,
    results: ResultSet,
}

impl Model for FlakyHeater {
    fn reference_type(&self) -> Option<ReferenceType> {
        Some(ReferenceType::Model)
    }

    fn id(&self) -> ObjectId {
        90
    }

    fn kind(&self) -> ModelKind {
        ModelKind::InternalLoads { zone_ids: vec![1] }
    }

    fn init_results(
        &mut self,
        _models: &[ModelInfo],
        alloc: &mut ResultAllocator<'_>,
    ) -> ModelResult<()> {
        for (name, value) in [
            (q::CONVECTIVE_EQUIPMENT_HEAT_LOAD, HEATER_W),
            (q::CONVECTIVE_PERSON_HEAT_LOAD, 0.0),
            (q::CONVECTIVE_LIGHTING_HEAT_LOAD, 0.0),
        ] {
            let r = alloc.algebraic(1);
            alloc.fill(r, value);
            self.results.push(QuantityDescription::keyed(name, "W", "heater", vec![1]), r);
        }
        Ok(())
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
}

impl StateDependency for FlakyHeater {
    fn init_input_references(&mut self, _models: &[ModelInfo]) -> ModelResult<()> {
        Ok(())
    }

    fn input_references(&self, _out: &mut Vec<InputReference>) {}

    fn set_input_value_refs(
        &mut self,
        _refs: &[InputReference],
        _resolved: &[Option<ValueRef>],
    ) -> ModelResult<()> {
        Ok(())
    }

    fn update(&mut self, _store: &mut ValueStore) -> ModelResult<()> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(ModelError::Recoverable {
                model: "FlakyHeater".to_string(),
                what: "controller did not settle".to_string(),
            });
        }
        Ok(())
    }
}

fn heated_zone(failures: usize) -> (ModelGraph, usize) {
    let mut graph = ModelGraph::new();
    graph.add(Box::new(RoomStatesModel::new(1, 50.0, false, 293.15, 0.5).unwrap())).unwrap();
    graph.add(Box::new(RoomBalanceModel::new(1, false, 0.5))).unwrap();
    let heater = graph
        .add(Box::new(FlakyHeater {
            failures_left: failures,
            results: ResultSet::new(),
        }))
        .unwrap();
    graph.setup().unwrap();
    (graph, heater)
}

fn options() -> SimOptions {
    SimOptions {
        dt: 60.0,
        t_end: 120.0,
        max_steps: 100,
        record_every: 1,
        integrator: IntegratorType::RK4,
        min_dt: 1.0,
        max_retries: 8,
        cutback_factor: 0.5,
        grow_factor: 2.0,
    }
}

#[test]
fn failed_heater_update_halves_the_first_step() {
    let (mut graph, heater) = heated_zone(1);
    let u0 = graph.y_initial()[0];

    let record = run_sim(&mut graph, &options()).unwrap();

    assert_eq!(record.cutback_retries, 1);
    assert_eq!(record.t, vec![0.0, 30.0, 90.0, 120.0]);
    assert_eq!(graph.downcast_ref::<FlakyHeater>(heater).unwrap().failures_left, 0);

    // constant load: the retried run gains exactly heater power x time
    let u_end = record.x.last().unwrap()[0];
    assert!((u_end - u0 - HEATER_W * 120.0).abs() < 1e-6 * u0);
}

#[test]
fn persistent_failure_exhausts_the_retries() {
    let (mut graph, _) = heated_zone(usize::MAX);
    match run_sim(&mut graph, &options()) {
        Err(SimError::RetriesExhausted { t, message, .. }) => {
            assert_eq!(t, 0.0);
            assert!(message.contains("FlakyHeater"));
        }
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("run succeeded"),
    }
}
