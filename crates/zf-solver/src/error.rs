//! Error types for solver operations.

use thiserror::Error;
use zf_components::ComponentError;
use zf_core::error::ZfError;
use zf_fluids::FluidError;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Graph error: {0}")]
    Graph(#[from] zf_graph::GraphError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// Failures that may go away with different inputs (e.g. a smaller time step).
    pub fn is_convergence_failure(&self) -> bool {
        matches!(
            self,
            SolverError::ConvergenceFailed { .. } | SolverError::Numeric { .. }
        )
    }
}

impl From<SolverError> for ZfError {
    fn from(e: SolverError) -> Self {
        ZfError::invalid_arg(e.to_string())
    }
}
