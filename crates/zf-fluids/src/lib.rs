//! zf-fluids: transport fluid properties for hydraulic networks.
//!
//! Provides:
//! - `HydraulicFluid`: constant density, heat capacity and conductivity plus a
//!   temperature-dependent kinematic viscosity
//! - `LinearSpline`: piecewise linear tabulated property with clamped ends
//!
//! Specific enthalpy is `cp * T` with T in Kelvin throughout zoneflow.
//!
//! # Example
//!
//! ```
//! use zf_fluids::HydraulicFluid;
//!
//! let water = HydraulicFluid::water();
//! let h = water.specific_enthalpy(333.15);
//! assert!((water.temperature(h) - 333.15).abs() < 1e-9);
//! ```

pub mod error;
pub mod fluid;
pub mod spline;

pub use error::{FluidError, FluidResult};
pub use fluid::HydraulicFluid;
pub use spline::LinearSpline;

/// Specific enthalpy [J/kg].
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type SpecEnthalpy = f64;

/// Specific heat capacity [J/(kg·K)].
pub type SpecHeatCapacity = f64;
