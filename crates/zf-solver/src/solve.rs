//! High-level solver interface.

use crate::error::SolverResult;
use crate::jacobian::finite_difference_jacobian;
use crate::newton::{NewtonConfig, newton_solve};
use crate::problem::HydraulicProblem;
use nalgebra::DVector;
use tracing::trace;

/// Converged state of a hydraulic network.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSolution {
    /// Mass flux per element [kg/s], positive inlet → outlet
    pub mass_fluxes: Vec<f64>,
    /// Pressure per node [Pa]
    pub pressures: Vec<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
}

impl NetworkSolution {
    /// `p_inlet - p_outlet` per element.
    pub fn pressure_differences(&self, problem: &HydraulicProblem<'_>) -> Vec<f64> {
        problem
            .graph
            .elements()
            .iter()
            .map(|e| self.pressures[e.inlet.idx()] - self.pressures[e.outlet.idx()])
            .collect()
    }
}

const JACOBIAN_EPSILON: f64 = 1e-7;

/// Solve the network, optionally warm-started from a previous solution.
///
/// A warm start whose dimensions don't match the problem is ignored.
pub fn solve_network(
    problem: &HydraulicProblem<'_>,
    config: &NewtonConfig,
    warm_start: Option<&NetworkSolution>,
) -> SolverResult<NetworkSolution> {
    let ne = problem.element_count();
    let x0 = match warm_start {
        Some(prev)
            if prev.mass_fluxes.len() == ne && prev.pressures.len() == problem.node_count() =>
        {
            DVector::from_iterator(
                problem.dimension(),
                prev.mass_fluxes.iter().chain(prev.pressures.iter()).copied(),
            )
        }
        _ => problem.initial_guess(),
    };

    let residual = |x: &DVector<f64>| problem.residuals(x);
    let jacobian = |x: &DVector<f64>| finite_difference_jacobian(x, residual, JACOBIAN_EPSILON);
    let result = newton_solve(x0, residual, jacobian, config)?;

    trace!(
        iterations = result.iterations,
        residual = result.residual_norm,
        "hydraulic network converged"
    );

    Ok(NetworkSolution {
        mass_fluxes: result.x.rows(0, ne).iter().copied().collect(),
        pressures: result.x.rows(ne, problem.node_count()).iter().copied().collect(),
        residual_norm: result.residual_norm,
        iterations: result.iterations,
    })
}
