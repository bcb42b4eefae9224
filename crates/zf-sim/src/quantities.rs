//! Names of the quantities models publish and request.

pub const YDOT: &str = "ydot";
pub const Y: &str = "y";

// zone states
pub const AIR_TEMPERATURE: &str = "AirTemperature";
pub const MOISTURE_MASS_DENSITY: &str = "MoistureMassDensity";
pub const RELATIVE_HUMIDITY: &str = "RelativeHumidity";

// zone balance
pub const CONSTRUCTION_HEAT_CONDUCTION_LOAD: &str = "ConstructionHeatConductionLoad";
pub const WINDOW_HEAT_CONDUCTION_LOAD: &str = "WindowHeatConductionLoad";
pub const WINDOW_SOLAR_RADIATION_LOAD: &str = "WindowSolarRadiationLoad";
pub const INFILTRATION_HEAT_LOAD: &str = "InfiltrationHeatLoad";
pub const CONVECTIVE_EQUIPMENT_HEAT_LOAD: &str = "ConvectiveEquipmentHeatLoad";
pub const CONVECTIVE_PERSON_HEAT_LOAD: &str = "ConvectivePersonHeatLoad";
pub const CONVECTIVE_LIGHTING_HEAT_LOAD: &str = "ConvectiveLightingHeatLoad";
pub const NETWORK_HEAT_LOAD: &str = "NetworkHeatLoad";
pub const COMPLETE_THERMAL_LOAD: &str = "CompleteThermalLoad";
pub const INFILTRATION_MOISTURE_LOAD: &str = "InfiltrationMoistureLoad";
pub const COMPLETE_MOISTURE_LOAD: &str = "CompleteMoistureLoad";

// constructions and windows
pub const FLUX_HEAT_CONDUCTION_A: &str = "FluxHeatConductionA";
pub const FLUX_HEAT_CONDUCTION_B: &str = "FluxHeatConductionB";
pub const WALL_TEMPERATURE: &str = "WallTemperature";

// loads
pub const WINDOW_SOLAR_RADIATION_FLUX_SUM: &str = "WindowSolarRadiationFluxSum";
pub const INFILTRATION_HEAT_FLUX: &str = "InfiltrationHeatFlux";
pub const INFILTRATION_MOISTURE_MASS_FLUX: &str = "InfiltrationMoistureMassFlux";

// networks
pub const MASS_FLUXES: &str = "MassFluxes";
pub const PRESSURE_DIFFERENCES: &str = "PressureDifferences";
pub const NODAL_PRESSURES: &str = "NodalPressures";
pub const FLUID_TEMPERATURES: &str = "FluidTemperatures";
pub const HEAT_FLUX: &str = "HeatFlux";
pub const AMBIENT_HEAT_FLUX: &str = "AmbientHeatFlux";
pub const NETWORK_ZONE_HEAT_LOAD: &str = "NetworkZoneHeatLoad";
