//! The model contract and its optional capabilities.

use std::any::Any;

use zf_core::ObjectId;

use crate::error::{ModelError, ModelResult};
use crate::quantity::{InputReference, QuantityDescription, QuantityName, ReferenceType};
use crate::value_store::{ResultAllocator, ValueRef, ValueStore};

/// Registration index of a model inside a `ModelGraph`.
pub type ModelIndex = usize;

/// Evaluation priority of output-like consumers, after every physical model.
pub const PRIORITY_OUTPUT_TAIL: i32 = 1000;

/// What kind of model this is, with the identity data other models select on.
///
/// Consumers scan the [`ModelInfo`] list once and match on this tag instead of
/// probing concrete types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelKind {
    RoomStates,
    RoomBalance,
    /// Wall/floor/ceiling between two sides; `None` is the outside.
    ConstructionBalance {
        zone_a: Option<ObjectId>,
        zone_b: Option<ObjectId>,
    },
    /// Window hosted in a construction.
    EmbeddedObject {
        zone_a: Option<ObjectId>,
        zone_b: Option<ObjectId>,
    },
    SolarLoads {
        zone_ids: Vec<ObjectId>,
    },
    NaturalVentilation {
        zone_ids: Vec<ObjectId>,
    },
    InternalLoads {
        zone_ids: Vec<ObjectId>,
    },
    HydraulicNetwork {
        network_id: ObjectId,
    },
    ThermalNetwork {
        network_id: ObjectId,
        zone_ids: Vec<ObjectId>,
    },
    Output,
}

/// Snapshot of a registered model, handed to `init_results` and
/// `init_input_references`.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub index: ModelIndex,
    pub reference_type: Option<ReferenceType>,
    pub id: ObjectId,
    pub display_name: String,
    pub kind: ModelKind,
}

/// Every simulated entity.
///
/// Result storage is defined once in `init_results`; afterwards
/// `result_descriptions`, `result_value_refs` and `result_value_ref` must agree
/// in count, name and order for the rest of the run.
pub trait Model: Any {
    /// Address under which results are published; `None` publishes nothing.
    fn reference_type(&self) -> Option<ReferenceType>;

    /// Unique within the reference type.
    fn id(&self) -> ObjectId;

    fn display_name(&self) -> String {
        match self.reference_type() {
            Some(rt) => format!("{}(#{})", rt, self.id()),
            None => format!("#{}", self.id()),
        }
    }

    fn kind(&self) -> ModelKind;

    /// Allocate and describe all results.
    fn init_results(
        &mut self,
        _models: &[ModelInfo],
        _alloc: &mut ResultAllocator<'_>,
    ) -> ModelResult<()> {
        Ok(())
    }

    /// Fully repopulates `out`. Not meant for hot loops.
    fn result_descriptions(&self, out: &mut Vec<QuantityDescription>) {
        out.clear();
    }

    /// Refs parallel to `result_descriptions`.
    fn result_value_refs(&self, out: &mut Vec<ValueRef>) {
        out.clear();
    }

    /// `None` means "not published here", not an error.
    fn result_value_ref(&self, _quantity: &QuantityName) -> Option<ValueRef> {
        None
    }

    /// Soft rank used to break ties in the evaluation order.
    fn priority_of_model_evaluation(&self) -> i32 {
        0
    }

    fn as_state_dependency(&self) -> Option<&dyn StateDependency> {
        None
    }

    fn as_state_dependency_mut(&mut self) -> Option<&mut dyn StateDependency> {
        None
    }

    fn as_state_model(&self) -> Option<&dyn StateModel> {
        None
    }

    fn as_state_model_mut(&mut self) -> Option<&mut dyn StateModel> {
        None
    }

    fn as_balance_model(&self) -> Option<&dyn BalanceModel> {
        None
    }

    fn as_time_dependency_mut(&mut self) -> Option<&mut dyn TimeDependency> {
        None
    }
}

/// Models that consume other models' results.
pub trait StateDependency {
    /// Build the ordered input reference list. Called exactly once, after
    /// every model exists.
    fn init_input_references(&mut self, models: &[ModelInfo]) -> ModelResult<()>;

    fn input_references(&self, out: &mut Vec<InputReference>);

    /// Receive the resolved refs in exactly the order of `refs`, which must
    /// equal the list returned by `input_references`. Unresolved optional
    /// references are `None`.
    fn set_input_value_refs(
        &mut self,
        refs: &[InputReference],
        resolved: &[Option<ValueRef>],
    ) -> ModelResult<()>;

    /// `(result, input)` pairs: `result` is computed from `input`. Used only
    /// for ordering.
    fn state_dependencies(&self, _out: &mut Vec<(ValueRef, ValueRef)>) {}

    /// Recompute own results from the current input values.
    ///
    /// `ModelError::Recoverable` asks the integrator to retry with a smaller
    /// step; results must not be left worse than before on failure.
    fn update(&mut self, store: &mut ValueStore) -> ModelResult<()>;
}

/// Models owning a slice of the global state vector.
pub trait StateModel {
    fn n(&self) -> usize;

    /// Pairing key with the balance model providing the derivatives.
    fn state_key(&self) -> (ReferenceType, ObjectId);

    fn y_initial(&self, y: &mut [f64]);

    /// Take over the current states and write state-derived results.
    fn set_states(&mut self, y: &[f64], store: &mut ValueStore) -> ModelResult<()>;
}

/// Models providing the time derivative of a state model's states.
pub trait BalanceModel {
    fn state_key(&self) -> (ReferenceType, ObjectId);

    /// Copy the cached derivatives into `out` (same length as the states).
    fn ydot(&self, store: &ValueStore, out: &mut [f64]);
}

/// Models with explicitly time-dependent behavior (schedules, climate).
pub trait TimeDependency {
    /// Simulation time in seconds since the start of the year.
    fn set_time(&mut self, t: f64) -> ModelResult<()>;
}

/// Validate that `refs`/`resolved` match the list a model requested.
pub fn check_input_order(
    model: &str,
    expected: &[InputReference],
    refs: &[InputReference],
    resolved: &[Option<ValueRef>],
) -> ModelResult<()> {
    if refs.len() != expected.len() || resolved.len() != expected.len() {
        return Err(ModelError::InputOrderMismatch {
            model: model.to_string(),
            what: format!(
                "expected {} references, got {} references and {} value refs",
                expected.len(),
                refs.len(),
                resolved.len()
            ),
        });
    }
    if let Some(pos) = expected.iter().zip(refs).position(|(a, b)| a != b) {
        return Err(ModelError::InputOrderMismatch {
            model: model.to_string(),
            what: format!(
                "position {}: expected {}, got {}",
                pos, expected[pos], refs[pos]
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(name: &str) -> InputReference {
        InputReference::required(ReferenceType::Zone, 1, QuantityName::new(name))
    }

    #[test]
    fn order_check_accepts_identical_lists() {
        let expected = vec![r("A"), r("B")];
        check_input_order("m", &expected, &expected.clone(), &[None, None]).unwrap();
    }

    #[test]
    fn order_check_rejects_swaps_and_length() {
        let expected = vec![r("A"), r("B")];
        let swapped = vec![r("B"), r("A")];
        let err = check_input_order("m", &expected, &swapped, &[None, None]).unwrap_err();
        assert!(matches!(err, ModelError::InputOrderMismatch { .. }));
        assert!(err.to_string().contains("position 0"));

        let err = check_input_order("m", &expected, &expected, &[None]).unwrap_err();
        assert!(matches!(err, ModelError::InputOrderMismatch { .. }));
    }
}
