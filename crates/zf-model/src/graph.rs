//! The model graph: wiring and evaluation of all models of a run.

use std::any::Any;

use tracing::debug;
use zf_core::ObjectId;

use crate::error::{ModelError, ModelResult};
use crate::model::{Model, ModelIndex, ModelInfo};
use crate::order::evaluation_order;
use crate::quantity::{InputReference, QuantityName, ReferenceType};
use crate::value_store::{SlotOrigin, ValueRef, ValueStore};

const GRAPH: &str = "ModelGraph";

/// Where a state model's states live in the global state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateBlock {
    pub state_model: ModelIndex,
    pub balance_model: ModelIndex,
    pub offset: usize,
    pub len: usize,
}

/// Owns every model and the value arena they publish into.
///
/// `setup` wires the models once; the evaluation order computed there is
/// reused by every `evaluate` call.
#[derive(Default)]
pub struct ModelGraph {
    models: Vec<Box<dyn Model>>,
    store: ValueStore,
    infos: Vec<ModelInfo>,
    order: Vec<ModelIndex>,
    state_blocks: Vec<StateBlock>,
    time_models: Vec<ModelIndex>,
    n: usize,
    is_setup: bool,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model; returns its registration index.
    pub fn add(&mut self, model: Box<dyn Model>) -> ModelResult<ModelIndex> {
        if self.is_setup {
            return Err(ModelError::invalid_arg(GRAPH, "cannot add models after setup"));
        }
        self.models.push(model);
        Ok(self.models.len() - 1)
    }

    /// Wire all models:
    /// 1. snapshot model infos and allocate results,
    /// 2. collect input references and resolve them against all producers,
    /// 3. deliver the resolved refs,
    /// 4. order the models and lay out the state vector.
    pub fn setup(&mut self) -> ModelResult<()> {
        if self.is_setup {
            return Err(ModelError::invalid_arg(GRAPH, "setup called twice"));
        }
        let Self {
            models,
            store,
            infos,
            ..
        } = self;

        *infos = models
            .iter()
            .enumerate()
            .map(|(index, m)| ModelInfo {
                index,
                reference_type: m.reference_type(),
                id: m.id(),
                display_name: m.display_name(),
                kind: m.kind(),
            })
            .collect();

        for (i, model) in models.iter_mut().enumerate() {
            model.init_results(infos, &mut store.allocator(i))?;
        }

        for model in models.iter_mut() {
            if let Some(sd) = model.as_state_dependency_mut() {
                sd.init_input_references(infos)?;
            }
        }

        let mut edges = Vec::new();
        let mut refs = Vec::new();
        for consumer in 0..models.len() {
            let Some(sd) = models[consumer].as_state_dependency() else {
                continue;
            };
            sd.input_references(&mut refs);
            let consumer_name = &infos[consumer].display_name;
            let resolved = refs
                .iter()
                .map(|r| resolve_reference(models, consumer_name, r))
                .collect::<ModelResult<Vec<_>>>()?;

            edges.extend(
                resolved
                    .iter()
                    .flatten()
                    .filter_map(|v| dependency_edge(store, *v, consumer)),
            );

            if let Some(sd) = models[consumer].as_state_dependency_mut() {
                sd.set_input_value_refs(&refs, &resolved)?;
            }
        }

        let mut declared = Vec::new();
        for model in models.iter() {
            if let Some(sd) = model.as_state_dependency() {
                sd.state_dependencies(&mut declared);
            }
        }
        edges.extend(declared.iter().filter_map(|(result, input)| {
            let consumer = store.owner(result.offset)?;
            dependency_edge(store, *input, consumer)
        }));

        let nodes: Vec<(ModelIndex, i32)> = models
            .iter()
            .enumerate()
            .filter(|(_, m)| m.as_state_dependency().is_some())
            .map(|(i, m)| (i, m.priority_of_model_evaluation()))
            .collect();
        let order = evaluation_order(&nodes, &edges).map_err(|stuck| ModelError::CyclicDependency {
            models: stuck.iter().map(|&i| infos[i].display_name.clone()).collect(),
        })?;
        debug!(
            order = ?order.iter().map(|&i| infos[i].display_name.as_str()).collect::<Vec<_>>(),
            "model evaluation order"
        );

        let state_blocks = layout_states(models, infos)?;
        let time_models = models
            .iter_mut()
            .enumerate()
            .filter_map(|(i, m)| m.as_time_dependency_mut().map(|_| i))
            .collect();

        self.n = state_blocks.iter().map(|b| b.len).sum();
        self.order = order;
        self.state_blocks = state_blocks;
        self.time_models = time_models;
        self.is_setup = true;
        Ok(())
    }

    /// Evaluate all models at time `t` and states `y`, writing derivatives to `ydot`.
    ///
    /// Time first, then states, then `update()` in evaluation order, then
    /// the derivatives are gathered from the balance models.
    pub fn evaluate(&mut self, t: f64, y: &[f64], ydot: &mut [f64]) -> ModelResult<()> {
        if !self.is_setup {
            return Err(ModelError::invalid_arg(GRAPH, "evaluate called before setup"));
        }
        if y.len() != self.n || ydot.len() != self.n {
            return Err(ModelError::invalid_arg(
                GRAPH,
                format!(
                    "state vector length mismatch: expected {}, got y={} ydot={}",
                    self.n,
                    y.len(),
                    ydot.len()
                ),
            ));
        }

        for &i in &self.time_models {
            if let Some(td) = self.models[i].as_time_dependency_mut() {
                td.set_time(t)?;
            }
        }

        for block in &self.state_blocks {
            if let Some(sm) = self.models[block.state_model].as_state_model_mut() {
                sm.set_states(&y[block.offset..block.offset + block.len], &mut self.store)?;
            }
        }

        for &i in &self.order {
            if let Some(sd) = self.models[i].as_state_dependency_mut() {
                sd.update(&mut self.store)?;
            }
        }

        for block in &self.state_blocks {
            if let Some(bm) = self.models[block.balance_model].as_balance_model() {
                bm.ydot(&self.store, &mut ydot[block.offset..block.offset + block.len]);
            }
        }
        Ok(())
    }

    /// Initial global state vector.
    pub fn y_initial(&self) -> Vec<f64> {
        let mut y = vec![0.0; self.n];
        for block in &self.state_blocks {
            if let Some(sm) = self.models[block.state_model].as_state_model() {
                sm.y_initial(&mut y[block.offset..block.offset + block.len]);
            }
        }
        y
    }

    pub fn n_states(&self) -> usize {
        self.n
    }

    pub fn is_setup(&self) -> bool {
        self.is_setup
    }

    pub fn evaluation_order(&self) -> &[ModelIndex] {
        &self.order
    }

    pub fn state_blocks(&self) -> &[StateBlock] {
        &self.state_blocks
    }

    pub fn infos(&self) -> &[ModelInfo] {
        &self.infos
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn model(&self, index: ModelIndex) -> Option<&dyn Model> {
        self.models.get(index).map(|m| &**m)
    }

    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    pub fn value(&self, r: ValueRef) -> f64 {
        self.store.get(r)
    }

    /// Look up a published quantity like a consumer would.
    pub fn find(
        &self,
        reference_type: ReferenceType,
        id: ObjectId,
        quantity: QuantityName,
    ) -> ModelResult<Option<ValueRef>> {
        let r = InputReference::optional(reference_type, id, quantity);
        resolve_reference(&self.models, GRAPH, &r)
    }

    pub fn downcast_ref<T: Model>(&self, index: ModelIndex) -> Option<&T> {
        let model: &dyn Model = &**self.models.get(index)?;
        let any: &dyn Any = model;
        any.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Model>(&mut self, index: ModelIndex) -> Option<&mut T> {
        let model: &mut dyn Model = &mut **self.models.get_mut(index)?;
        let any: &mut dyn Any = model;
        any.downcast_mut::<T>()
    }
}

/// Find the single producer of `r`.
fn resolve_reference(
    models: &[Box<dyn Model>],
    consumer: &str,
    r: &InputReference,
) -> ModelResult<Option<ValueRef>> {
    let mut found = None;
    for producer in models {
        if producer.reference_type() != Some(r.reference_type) || producer.id() != r.id {
            continue;
        }
        if let Some(v) = producer.result_value_ref(&r.name) {
            if found.is_some() {
                return Err(ModelError::DuplicateDefinition {
                    model: consumer.to_string(),
                    quantity: r.name.to_string(),
                    target: format!("{}(#{})", r.reference_type, r.id),
                });
            }
            found = Some(v);
        }
    }
    match found {
        Some(v) => Ok(Some(v)),
        None if r.required => Err(ModelError::UnresolvedInput {
            model: consumer.to_string(),
            reference: r.to_string(),
        }),
        None => {
            debug!(consumer, reference = %r, "optional input not resolved");
            Ok(None)
        }
    }
}

/// `(producer, consumer)` ordering edge implied by reading `input`.
///
/// State-derived slots are written before any update runs and impose no order.
fn dependency_edge(
    store: &ValueStore,
    input: ValueRef,
    consumer: ModelIndex,
) -> Option<(ModelIndex, ModelIndex)> {
    if store.origin(input.offset)? == SlotOrigin::StateDerived {
        return None;
    }
    let producer = store.owner(input.offset)?;
    (producer != consumer).then_some((producer, consumer))
}

/// Pair every state model with exactly one balance model and lay out the
/// global state vector in registration order.
fn layout_states(models: &[Box<dyn Model>], infos: &[ModelInfo]) -> ModelResult<Vec<StateBlock>> {
    let balances: Vec<(ModelIndex, (ReferenceType, ObjectId))> = models
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.as_balance_model().map(|b| (i, b.state_key())))
        .collect();

    let mut blocks = Vec::new();
    let mut offset = 0;
    for (i, model) in models.iter().enumerate() {
        let Some(sm) = model.as_state_model() else {
            continue;
        };
        let key = sm.state_key();
        let mut matching = balances.iter().filter(|(_, k)| *k == key);
        let Some(&(balance_model, _)) = matching.next() else {
            return Err(ModelError::MissingReference {
                model: infos[i].display_name.clone(),
                what: format!("balance model for {}(#{})", key.0, key.1),
            });
        };
        if matching.next().is_some() {
            return Err(ModelError::DuplicateDefinition {
                model: infos[i].display_name.clone(),
                quantity: "ydot".into(),
                target: format!("{}(#{})", key.0, key.1),
            });
        }
        blocks.push(StateBlock {
            state_model: i,
            balance_model,
            offset,
            len: sm.n(),
        });
        offset += sm.n();
    }

    for (i, key) in &balances {
        if !blocks.iter().any(|b| b.balance_model == *i) {
            return Err(ModelError::MissingReference {
                model: infos[*i].display_name.clone(),
                what: format!("state model for {}(#{})", key.0, key.1),
            });
        }
    }
    Ok(blocks)
}
