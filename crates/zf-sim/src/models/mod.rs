//! Physical models and the output consumer.

mod construction;
mod hydraulic_network;
mod internal_loads;
mod natural_ventilation;
mod network;
mod outputs;
mod room_balance;
mod room_states;
mod solar_loads;
pub mod thermal_network;
mod window;

pub use construction::ConstructionBalanceModel;
pub use hydraulic_network::HydraulicNetworkModel;
pub use internal_loads::InternalLoadsModel;
pub use natural_ventilation::{NaturalVentilationModel, OutsideAir};
pub use network::{NetworkTopology, network_fluid};
pub use outputs::{OutputColumn, OutputHandler};
pub use room_balance::{RoomBalanceModel, RoomResult};
pub use room_states::{RoomStatesModel, vapour_density};
pub use solar_loads::SolarLoadsModel;
pub use thermal_network::ThermalNetworkModel;
pub use window::WindowModel;
