//! zf-components: flow characteristics of hydraulic network elements.
//!
//! Provides:
//! - Pipes with Darcy-Weisbach friction (laminar, Swamee-Jain turbulent,
//!   linear blend in the transition range)
//! - Constant-pressure and constant-mass-flux pumps
//! - Zeta-value pressure loss for heat exchangers and heat pumps
//!
//! All components implement the `HydraulicComponent` trait. Each element
//! contributes one residual equation relating its mass flux to the pressure
//! difference between its inlet and outlet node.
//!
//! # Example
//!
//! ```
//! use zf_components::{FlowContext, HydraulicComponent, Pipe};
//! use zf_core::units::m;
//! use zf_fluids::HydraulicFluid;
//!
//! let water = HydraulicFluid::water();
//! let pipe = Pipe::new("supply", m(50.0), m(0.05), m(7e-6)).unwrap();
//! let ctx = FlowContext { fluid: &water, temperature_k: 333.15 };
//!
//! let dp = pipe.pressure_loss(ctx, 1.0).unwrap();
//! assert!(dp > 0.0);
//! assert!(pipe.residual(ctx, 1.0, dp).unwrap().abs() < 1e-9);
//! ```

pub mod common;
pub mod error;
pub mod pipe;
pub mod pump;
pub mod traits;
pub mod zeta;

pub use error::{ComponentError, ComponentResult};
pub use pipe::{Pipe, friction_factor};
pub use pump::{ConstantMassFluxPump, ConstantPressurePump};
pub use traits::{FlowContext, HydraulicComponent};
pub use zeta::ZetaLoss;
