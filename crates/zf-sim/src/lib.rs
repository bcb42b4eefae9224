//! Transient building-energy simulation for zoneflow.
//!
//! Provides:
//! - Zone air states and the zone energy/moisture balance
//! - Constructions, windows, internal loads, natural ventilation and solar loads
//! - Hydraulic network model (mass fluxes and pressures)
//! - Thermal network layer (fluid energy transport, zone coupling)
//! - Output sampling as a regular model-graph consumer
//! - Project-to-model-graph builder and fixed-step integration with cut-back

pub mod builder;
pub mod error;
pub mod integrator;
pub mod model;
pub mod models;
pub mod quantities;
pub mod sim;
pub mod simulation;

// Re-exports for public API
pub use builder::{BuiltGraph, build_model_graph};
pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, RK4};
pub use model::TransientModel;
pub use sim::{IntegratorType, SimOptions, SimProgress, SimRecord, run_sim, run_sim_with_progress};
pub use simulation::Simulation;
