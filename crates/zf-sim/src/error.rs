//! Error types for simulation operations.

use thiserror::Error;
use zf_model::ModelError;

/// Errors encountered while building or integrating a simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Failure of the current step that may disappear with a smaller step.
    #[error("Retryable failure: {message}")]
    Retryable { message: String },

    #[error("Step failed at t={t} s after cutting back to dt={dt} s: {message}")]
    RetriesExhausted { t: f64, dt: f64, message: String },

    #[error("Model error: {0}")]
    Model(ModelError),

    #[error("Project error: {0}")]
    Project(#[from] zf_project::ProjectError),

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<ModelError> for SimError {
    fn from(e: ModelError) -> Self {
        if e.is_recoverable() {
            SimError::Retryable {
                message: e.to_string(),
            }
        } else {
            SimError::Model(e)
        }
    }
}

impl From<zf_solver::SolverError> for SimError {
    fn from(e: zf_solver::SolverError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<zf_graph::GraphError> for SimError {
    fn from(e: zf_graph::GraphError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<zf_core::ZfError> for SimError {
    fn from(e: zf_core::ZfError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
