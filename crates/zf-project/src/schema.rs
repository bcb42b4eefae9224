//! Project schema definitions.

use serde::{Deserialize, Serialize};
use zf_core::ObjectId;

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub simulation: SimulationDef,
    #[serde(default)]
    pub zones: Vec<ZoneDef>,
    #[serde(default)]
    pub constructions: Vec<ConstructionDef>,
    #[serde(default)]
    pub windows: Vec<WindowDef>,
    #[serde(default)]
    pub internal_loads: Vec<InternalLoadsDef>,
    #[serde(default)]
    pub natural_ventilation: Vec<NaturalVentilationDef>,
    #[serde(default)]
    pub solar_loads: Vec<SolarLoadsDef>,
    #[serde(default)]
    pub networks: Vec<NetworkDef>,
    #[serde(default)]
    pub outputs: Vec<OutputDef>,
    #[serde(default)]
    pub integrator: IntegratorDef,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            simulation: SimulationDef::default(),
            zones: Vec::new(),
            constructions: Vec::new(),
            windows: Vec::new(),
            internal_loads: Vec::new(),
            natural_ventilation: Vec::new(),
            solar_loads: Vec::new(),
            networks: Vec::new(),
            outputs: Vec::new(),
            integrator: IntegratorDef::default(),
        }
    }

    pub fn zone(&self, id: ObjectId) -> Option<&ZoneDef> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn construction(&self, id: ObjectId) -> Option<&ConstructionDef> {
        self.constructions.iter().find(|c| c.id == id)
    }
}

/// Global simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationDef {
    #[serde(default)]
    pub moisture_balance: bool,
    /// Share of the transmitted solar radiation that goes directly into the
    /// zone air.
    #[serde(default = "default_radiation_load_fraction_zone")]
    pub radiation_load_fraction_zone: f64,
    #[serde(default = "default_initial_temperature_k")]
    pub initial_temperature_k: f64,
    #[serde(default = "default_initial_relative_humidity")]
    pub initial_relative_humidity: f64,
    #[serde(default = "default_outside_temperature_k")]
    pub outside_temperature_k: f64,
    #[serde(default = "default_outside_moisture_density")]
    pub outside_moisture_density_kg_m3: f64,
}

impl Default for SimulationDef {
    fn default() -> Self {
        Self {
            moisture_balance: false,
            radiation_load_fraction_zone: default_radiation_load_fraction_zone(),
            initial_temperature_k: default_initial_temperature_k(),
            initial_relative_humidity: default_initial_relative_humidity(),
            outside_temperature_k: default_outside_temperature_k(),
            outside_moisture_density_kg_m3: default_outside_moisture_density(),
        }
    }
}

fn default_radiation_load_fraction_zone() -> f64 {
    0.5
}

fn default_initial_temperature_k() -> f64 {
    293.15
}

fn default_initial_relative_humidity() -> f64 {
    0.5
}

fn default_outside_temperature_k() -> f64 {
    273.15
}

fn default_outside_moisture_density() -> f64 {
    0.004
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneDef {
    pub id: ObjectId,
    pub name: String,
    pub volume_m3: f64,
    /// Net floor area, the base of area-specific internal loads
    pub area_m2: f64,
    /// Overrides `simulation.initial_temperature_k`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_temperature_k: Option<f64>,
}

/// Wall, floor or ceiling between two sides. A side without zone is the
/// outside.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstructionDef {
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_a: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_b: Option<ObjectId>,
    pub area_m2: f64,
    /// Heat capacity per wall area [J/m2K]
    pub areal_heat_capacity_j_m2k: f64,
    /// Conduction resistance of all layers [m2K/W]
    pub thermal_resistance_m2k_w: f64,
    #[serde(default = "default_inside_surface_coefficient")]
    pub surface_coefficient_a_w_m2k: f64,
    #[serde(default = "default_outside_surface_coefficient")]
    pub surface_coefficient_b_w_m2k: f64,
}

fn default_inside_surface_coefficient() -> f64 {
    7.7
}

fn default_outside_surface_coefficient() -> f64 {
    25.0
}

/// Window hosted in a construction; it connects the same two sides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowDef {
    pub id: ObjectId,
    pub name: String,
    pub construction_id: ObjectId,
    pub area_m2: f64,
    pub u_value_w_m2k: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InternalLoadsDef {
    pub id: ObjectId,
    pub name: String,
    pub zone_ids: Vec<ObjectId>,
    #[serde(default)]
    pub equipment_w_m2: f64,
    #[serde(default)]
    pub person_w_m2: f64,
    #[serde(default)]
    pub lighting_w_m2: f64,
    #[serde(default = "default_convective_fraction")]
    pub equipment_convective_fraction: f64,
    #[serde(default = "default_convective_fraction")]
    pub person_convective_fraction: f64,
    #[serde(default = "default_convective_fraction")]
    pub lighting_convective_fraction: f64,
    /// 24 hourly multipliers; constant 1 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_schedule: Option<Vec<f64>>,
}

fn default_convective_fraction() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NaturalVentilationDef {
    pub id: ObjectId,
    pub name: String,
    pub zone_ids: Vec<ObjectId>,
    /// Air changes per hour
    pub air_change_rate_per_h: f64,
}

/// Solar gains of a location, as a daily half-sine per zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolarLoadsDef {
    pub id: ObjectId,
    pub name: String,
    pub zone_ids: Vec<ObjectId>,
    /// Transmitted solar flux at solar noon, per zone [W]
    pub peak_flux_w: f64,
    #[serde(default = "default_sunrise_h")]
    pub sunrise_h: f64,
    #[serde(default = "default_sunset_h")]
    pub sunset_h: f64,
}

fn default_sunrise_h() -> f64 {
    6.0
}

fn default_sunset_h() -> f64 {
    18.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    pub id: ObjectId,
    pub name: String,
    pub fluid: FluidDef,
    pub reference_node_id: ObjectId,
    #[serde(default = "default_reference_pressure")]
    pub reference_pressure_pa: f64,
    #[serde(default = "default_fluid_temperature")]
    pub initial_fluid_temperature_k: f64,
    #[serde(default)]
    pub nodes: Vec<NetworkNodeDef>,
    #[serde(default)]
    pub pipes: Vec<PipeDef>,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub elements: Vec<NetworkElementDef>,
}

fn default_reference_pressure() -> f64 {
    101_325.0
}

fn default_fluid_temperature() -> f64 {
    313.15
}

impl NetworkDef {
    pub fn component(&self, id: ObjectId) -> Option<&ComponentDef> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn pipe(&self, id: ObjectId) -> Option<&PipeDef> {
        self.pipes.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum FluidDef {
    Water,
    Custom {
        name: String,
        density_kg_m3: f64,
        heat_capacity_j_kgk: f64,
        conductivity_w_mk: f64,
        kinematic_viscosity_m2_s: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkNodeDef {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    pub kind: NetworkNodeKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NetworkNodeKind {
    Source,
    Building,
    Mixer,
}

/// Entry of the pipe-property catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipeDef {
    pub id: ObjectId,
    pub name: String,
    pub diameter_inside_m: f64,
    pub diameter_outside_m: f64,
    pub roughness_m: f64,
    /// Heat transfer through the pipe wall per length [W/mK]
    pub u_value_wall_w_mk: f64,
}

/// Entry of the component catalog. Which parameters are needed depends on
/// the model type; missing ones are reported when the models are built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDef {
    pub id: ObjectId,
    pub name: String,
    pub model_type: ComponentModelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_head_pa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_flux_kg_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zeta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydraulic_diameter_m: Option<f64>,
    /// Fluid volume of non-pipe components [m3]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carnot_efficiency: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ComponentModelType {
    SimplePipe,
    DynamicPipe,
    ConstantPressurePump,
    ConstantMassFluxPump,
    HeatExchanger,
    HeatPumpIdealCarnot,
}

impl ComponentModelType {
    pub fn name(self) -> &'static str {
        match self {
            ComponentModelType::SimplePipe => "SimplePipe",
            ComponentModelType::DynamicPipe => "DynamicPipe",
            ComponentModelType::ConstantPressurePump => "ConstantPressurePump",
            ComponentModelType::ConstantMassFluxPump => "ConstantMassFluxPump",
            ComponentModelType::HeatExchanger => "HeatExchanger",
            ComponentModelType::HeatPumpIdealCarnot => "HeatPumpIdealCarnot",
        }
    }

    pub fn is_pipe(self) -> bool {
        matches!(
            self,
            ComponentModelType::SimplePipe | ComponentModelType::DynamicPipe
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkElementDef {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    pub inlet_node_id: ObjectId,
    pub outlet_node_id: ObjectId,
    pub component_id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipe_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_m: Option<f64>,
    /// Volume length of dynamic pipes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discretization_length_m: Option<f64>,
    #[serde(default)]
    pub heat_exchange: HeatExchangeDef,
}

/// Heat exchange of a flow element with its surroundings.
///
/// Parameters are optional on purpose: the required set depends on `kind`
/// and is checked when the thermal network is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HeatExchangeDef {
    #[serde(rename = "type", default)]
    pub kind: HeatExchangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_k: Option<f64>,
    /// External heat transfer coefficient [W/m2K]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_transfer_coefficient_w_m2k: Option<f64>,
    /// Heat extracted from the fluid [W]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_flux_w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<ObjectId>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum HeatExchangeType {
    #[default]
    None,
    TemperatureConstant,
    TemperatureZone,
    HeatFluxConstant,
}

impl HeatExchangeType {
    pub fn name(self) -> &'static str {
        match self {
            HeatExchangeType::None => "None",
            HeatExchangeType::TemperatureConstant => "TemperatureConstant",
            HeatExchangeType::TemperatureZone => "TemperatureZone",
            HeatExchangeType::HeatFluxConstant => "HeatFluxConstant",
        }
    }
}

/// Address of an output quantity, mirroring the reference types models
/// publish under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputReferenceType {
    Location,
    Zone,
    ConstructionInstance,
    EmbeddedObject,
    Model,
    Network,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputDef {
    pub reference_type: OutputReferenceType,
    pub id: ObjectId,
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    /// Unresolvable optional outputs are dropped instead of failing the run
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum IntegratorKind {
    #[default]
    Rk4,
    ForwardEuler,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegratorDef {
    #[serde(default)]
    pub method: IntegratorKind,
    #[serde(default = "default_dt_s")]
    pub dt_s: f64,
    #[serde(default = "default_t_end_s")]
    pub t_end_s: f64,
    /// Sampling interval of the outputs
    #[serde(default = "default_output_interval_s")]
    pub output_interval_s: f64,
    #[serde(default = "default_min_dt_s")]
    pub min_dt_s: f64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_cutback_factor")]
    pub cutback_factor: f64,
    #[serde(default = "default_grow_factor")]
    pub grow_factor: f64,
}

impl Default for IntegratorDef {
    fn default() -> Self {
        Self {
            method: IntegratorKind::default(),
            dt_s: default_dt_s(),
            t_end_s: default_t_end_s(),
            output_interval_s: default_output_interval_s(),
            min_dt_s: default_min_dt_s(),
            max_retries: default_max_retries(),
            cutback_factor: default_cutback_factor(),
            grow_factor: default_grow_factor(),
        }
    }
}

fn default_dt_s() -> f64 {
    60.0
}

fn default_t_end_s() -> f64 {
    86_400.0
}

fn default_output_interval_s() -> f64 {
    3600.0
}

fn default_min_dt_s() -> f64 {
    1e-3
}

fn default_max_retries() -> usize {
    8
}

fn default_cutback_factor() -> f64 {
    0.5
}

fn default_grow_factor() -> f64 {
    2.0
}
