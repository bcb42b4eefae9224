//! zf-solver: hydraulic network solver for zoneflow.
//!
//! Unknowns are the mass flux of every flow element followed by the pressure
//! of every node. Equations:
//! - one per element, supplied by its `HydraulicComponent`
//! - one mass balance per node, except the reference node whose pressure is fixed
//!
//! The system is solved with a damped Newton iteration using a
//! finite-difference Jacobian and a dense LU factorization.

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod problem;
pub mod solve;

pub use error::{SolverError, SolverResult};
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
pub use problem::HydraulicProblem;
pub use solve::{NetworkSolution, solve_network};
