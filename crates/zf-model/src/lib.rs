//! zf-model: model-evaluation framework for zoneflow.
//!
//! Contains:
//! - quantity (reference types, quantity names and descriptions, input references)
//! - value_store (the value arena every published result lives in)
//! - results (per-model published result tables)
//! - model (the `Model` contract and its optional capabilities)
//! - order (priority-aware topological evaluation order)
//! - graph (`ModelGraph`: wiring, cached evaluation order, two-phase evaluation)
//!
//! # Lifecycle
//!
//! 1. Register every model with [`ModelGraph::add`].
//! 2. [`ModelGraph::setup`] allocates results, collects and resolves input
//!    references, hands the resolved refs back and computes the evaluation order.
//! 3. [`ModelGraph::evaluate`] is called by the integrator for every right-hand
//!    side evaluation.

pub mod error;
pub mod graph;
pub mod model;
pub mod order;
pub mod quantity;
pub mod results;
pub mod value_store;

pub use error::{ModelError, ModelResult};
pub use graph::ModelGraph;
pub use model::{
    BalanceModel, Model, ModelIndex, ModelInfo, ModelKind, PRIORITY_OUTPUT_TAIL, StateDependency,
    StateModel, TimeDependency, check_input_order,
};
pub use quantity::{IndexKeyType, InputReference, QuantityDescription, QuantityName, ReferenceType};
pub use results::ResultSet;
pub use value_store::{ResultAllocator, SlotOrigin, ValueRef, ValueStore};
