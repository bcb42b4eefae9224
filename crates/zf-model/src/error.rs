//! Error taxonomy of the model layer.

use thiserror::Error;
use zf_core::{ObjectId, ZfError};

pub type ModelResult<T> = Result<T, ModelError>;

/// Model construction and evaluation errors.
///
/// Everything except `Recoverable` is fatal for the run. `model` fields hold
/// the display name of the offending model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("{model}: unsupported model type '{model_type}'")]
    UnsupportedModelType { model: String, model_type: String },

    #[error("{model}: unsupported heat exchange type '{heat_exchange}' for element #{element}")]
    UnsupportedHeatExchange {
        model: String,
        element: ObjectId,
        heat_exchange: String,
    },

    #[error("{model}: missing parameter '{parameter}'")]
    MissingParameter { model: String, parameter: String },

    #[error("{model}: missing reference to {what}")]
    MissingReference { model: String, what: String },

    #[error("{model}: duplicate definition of {quantity} for {target}")]
    DuplicateDefinition {
        model: String,
        quantity: String,
        target: String,
    },

    #[error("{model}: input references delivered out of order: {what}")]
    InputOrderMismatch { model: String, what: String },

    #[error("{model}: required input {reference} could not be resolved")]
    UnresolvedInput { model: String, reference: String },

    #[error(
        "{model}: equipment, person and lighting loads for zone #{zone} must all be present or all be absent"
    )]
    PartialInternalLoads { model: String, zone: ObjectId },

    #[error("Cyclic dependency between models: {}", models.join(", "))]
    CyclicDependency { models: Vec<String> },

    #[error("{model}: invalid argument: {what}")]
    InvalidArg { model: String, what: String },

    /// Per-step failure the integrator may retry with a smaller step.
    #[error("{model}: {what}")]
    Recoverable { model: String, what: String },
}

impl ModelError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ModelError::Recoverable { .. })
    }

    pub fn invalid_arg(model: impl Into<String>, what: impl Into<String>) -> Self {
        ModelError::InvalidArg {
            model: model.into(),
            what: what.into(),
        }
    }

    pub fn missing_parameter(model: impl Into<String>, parameter: impl Into<String>) -> Self {
        ModelError::MissingParameter {
            model: model.into(),
            parameter: parameter.into(),
        }
    }
}

impl From<ModelError> for ZfError {
    fn from(e: ModelError) -> Self {
        ZfError::invariant(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_recoverable_is_recoverable() {
        let e = ModelError::Recoverable {
            model: "Network #1".into(),
            what: "no convergence".into(),
        };
        assert!(e.is_recoverable());
        assert!(!ModelError::invalid_arg("m", "x").is_recoverable());
    }

    #[test]
    fn messages_name_the_model() {
        let e = ModelError::PartialInternalLoads {
            model: "RoomBalanceModel #4".into(),
            zone: 4,
        };
        let msg = e.to_string();
        assert!(msg.contains("RoomBalanceModel #4"));
        assert!(msg.contains("#4"));

        let e = ModelError::CyclicDependency {
            models: vec!["A".into(), "B".into()],
        };
        assert!(e.to_string().contains("A, B"));
    }
}
