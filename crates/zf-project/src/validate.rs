//! Project validation logic.

use crate::schema::{
    ConstructionDef, IntegratorDef, InternalLoadsDef, NetworkDef, Project, SimulationDef,
    LATEST_VERSION,
};
use std::collections::HashSet;
use zf_core::ObjectId;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_simulation(&project.simulation)?;
    validate_integrator(&project.integrator)?;

    let zone_ids = unique_ids(project.zones.iter().map(|z| z.id), "zones")?;
    for zone in &project.zones {
        let ctx = format!("zone '{}'", zone.name);
        positive_finite(&ctx, "volume_m3", zone.volume_m3)?;
        non_negative_finite(&ctx, "area_m2", zone.area_m2)?;
        if let Some(t) = zone.initial_temperature_k {
            positive_finite(&ctx, "initial_temperature_k", t)?;
        }
    }

    let construction_ids = unique_ids(project.constructions.iter().map(|c| c.id), "constructions")?;
    for construction in &project.constructions {
        validate_construction(construction, &zone_ids)?;
    }

    unique_ids(project.windows.iter().map(|w| w.id), "windows")?;
    for window in &project.windows {
        let ctx = format!("window '{}'", window.name);
        if !construction_ids.contains(&window.construction_id) {
            return Err(ValidationError::MissingReference {
                id: window.construction_id.to_string(),
                context: format!("{ctx} construction_id"),
            });
        }
        positive_finite(&ctx, "area_m2", window.area_m2)?;
        positive_finite(&ctx, "u_value_w_m2k", window.u_value_w_m2k)?;
    }

    // internal loads and ventilation are both addressed as `Model`
    unique_ids(
        project
            .internal_loads
            .iter()
            .map(|m| m.id)
            .chain(project.natural_ventilation.iter().map(|m| m.id)),
        "internal_loads/natural_ventilation",
    )?;
    for loads in &project.internal_loads {
        validate_internal_loads(loads, &zone_ids)?;
    }
    for vent in &project.natural_ventilation {
        let ctx = format!("natural ventilation '{}'", vent.name);
        zone_refs(&ctx, &vent.zone_ids, &zone_ids)?;
        non_negative_finite(&ctx, "air_change_rate_per_h", vent.air_change_rate_per_h)?;
    }

    unique_ids(project.solar_loads.iter().map(|s| s.id), "solar_loads")?;
    for solar in &project.solar_loads {
        let ctx = format!("solar loads '{}'", solar.name);
        zone_refs(&ctx, &solar.zone_ids, &zone_ids)?;
        non_negative_finite(&ctx, "peak_flux_w", solar.peak_flux_w)?;
        if !(0.0..=24.0).contains(&solar.sunrise_h)
            || !(0.0..=24.0).contains(&solar.sunset_h)
            || solar.sunset_h <= solar.sunrise_h
        {
            return Err(ValidationError::InvalidValue {
                field: format!("{ctx} sunrise_h/sunset_h"),
                value: format!("{}/{}", solar.sunrise_h, solar.sunset_h),
                reason: "must satisfy 0 <= sunrise < sunset <= 24".to_string(),
            });
        }
    }

    unique_ids(project.networks.iter().map(|n| n.id), "networks")?;
    for network in &project.networks {
        validate_network(network, &zone_ids)?;
    }

    for (i, output) in project.outputs.iter().enumerate() {
        if output.quantity.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("outputs[{i}] quantity"),
                value: output.quantity.clone(),
                reason: "must not be empty".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_simulation(sim: &SimulationDef) -> Result<(), ValidationError> {
    let ctx = "simulation";
    unit_interval(ctx, "radiation_load_fraction_zone", sim.radiation_load_fraction_zone)?;
    unit_interval(ctx, "initial_relative_humidity", sim.initial_relative_humidity)?;
    positive_finite(ctx, "initial_temperature_k", sim.initial_temperature_k)?;
    positive_finite(ctx, "outside_temperature_k", sim.outside_temperature_k)?;
    non_negative_finite(ctx, "outside_moisture_density_kg_m3", sim.outside_moisture_density_kg_m3)?;
    Ok(())
}

fn validate_integrator(integrator: &IntegratorDef) -> Result<(), ValidationError> {
    let ctx = "integrator";
    positive_finite(ctx, "dt_s", integrator.dt_s)?;
    non_negative_finite(ctx, "t_end_s", integrator.t_end_s)?;
    positive_finite(ctx, "output_interval_s", integrator.output_interval_s)?;
    positive_finite(ctx, "min_dt_s", integrator.min_dt_s)?;
    if !(integrator.cutback_factor > 0.0 && integrator.cutback_factor < 1.0) {
        return Err(ValidationError::InvalidValue {
            field: "integrator cutback_factor".to_string(),
            value: integrator.cutback_factor.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }
    if !(integrator.grow_factor.is_finite() && integrator.grow_factor >= 1.0) {
        return Err(ValidationError::InvalidValue {
            field: "integrator grow_factor".to_string(),
            value: integrator.grow_factor.to_string(),
            reason: "must be finite and >= 1".to_string(),
        });
    }
    Ok(())
}

fn validate_construction(
    construction: &ConstructionDef,
    zone_ids: &HashSet<ObjectId>,
) -> Result<(), ValidationError> {
    let ctx = format!("construction '{}'", construction.name);
    if construction.zone_a.is_none() && construction.zone_b.is_none() {
        return Err(ValidationError::InvalidValue {
            field: format!("{ctx} zone_a/zone_b"),
            value: "none".to_string(),
            reason: "at least one side must reference a zone".to_string(),
        });
    }
    for (side, zone) in [("zone_a", construction.zone_a), ("zone_b", construction.zone_b)] {
        if let Some(id) = zone
            && !zone_ids.contains(&id)
        {
            return Err(ValidationError::MissingReference {
                id: id.to_string(),
                context: format!("{ctx} {side}"),
            });
        }
    }
    positive_finite(&ctx, "area_m2", construction.area_m2)?;
    positive_finite(&ctx, "areal_heat_capacity_j_m2k", construction.areal_heat_capacity_j_m2k)?;
    non_negative_finite(&ctx, "thermal_resistance_m2k_w", construction.thermal_resistance_m2k_w)?;
    positive_finite(&ctx, "surface_coefficient_a_w_m2k", construction.surface_coefficient_a_w_m2k)?;
    positive_finite(&ctx, "surface_coefficient_b_w_m2k", construction.surface_coefficient_b_w_m2k)?;
    Ok(())
}

fn validate_internal_loads(
    loads: &InternalLoadsDef,
    zone_ids: &HashSet<ObjectId>,
) -> Result<(), ValidationError> {
    let ctx = format!("internal loads '{}'", loads.name);
    zone_refs(&ctx, &loads.zone_ids, zone_ids)?;
    non_negative_finite(&ctx, "equipment_w_m2", loads.equipment_w_m2)?;
    non_negative_finite(&ctx, "person_w_m2", loads.person_w_m2)?;
    non_negative_finite(&ctx, "lighting_w_m2", loads.lighting_w_m2)?;
    unit_interval(&ctx, "equipment_convective_fraction", loads.equipment_convective_fraction)?;
    unit_interval(&ctx, "person_convective_fraction", loads.person_convective_fraction)?;
    unit_interval(&ctx, "lighting_convective_fraction", loads.lighting_convective_fraction)?;
    if let Some(schedule) = &loads.daily_schedule {
        if schedule.len() != 24 {
            return Err(ValidationError::InvalidValue {
                field: format!("{ctx} daily_schedule"),
                value: format!("{} values", schedule.len()),
                reason: "must have 24 hourly values".to_string(),
            });
        }
        for v in schedule {
            non_negative_finite(&ctx, "daily_schedule", *v)?;
        }
    }
    Ok(())
}

fn validate_network(
    network: &NetworkDef,
    zone_ids: &HashSet<ObjectId>,
) -> Result<(), ValidationError> {
    let ctx = format!("network '{}'", network.name);
    positive_finite(&ctx, "reference_pressure_pa", network.reference_pressure_pa)?;
    positive_finite(&ctx, "initial_fluid_temperature_k", network.initial_fluid_temperature_k)?;

    let node_ids = unique_ids(network.nodes.iter().map(|n| n.id), &format!("{ctx} nodes"))?;
    if !node_ids.contains(&network.reference_node_id) {
        return Err(ValidationError::MissingReference {
            id: network.reference_node_id.to_string(),
            context: format!("{ctx} reference_node_id"),
        });
    }

    let pipe_ids = unique_ids(network.pipes.iter().map(|p| p.id), &format!("{ctx} pipes"))?;
    for pipe in &network.pipes {
        let pctx = format!("{ctx} pipe '{}'", pipe.name);
        positive_finite(&pctx, "diameter_inside_m", pipe.diameter_inside_m)?;
        positive_finite(&pctx, "diameter_outside_m", pipe.diameter_outside_m)?;
        non_negative_finite(&pctx, "roughness_m", pipe.roughness_m)?;
        non_negative_finite(&pctx, "u_value_wall_w_mk", pipe.u_value_wall_w_mk)?;
        if pipe.diameter_outside_m < pipe.diameter_inside_m {
            return Err(ValidationError::InvalidValue {
                field: format!("{pctx} diameter_outside_m"),
                value: pipe.diameter_outside_m.to_string(),
                reason: "must not be smaller than diameter_inside_m".to_string(),
            });
        }
    }

    let component_ids = unique_ids(
        network.components.iter().map(|c| c.id),
        &format!("{ctx} components"),
    )?;
    for component in &network.components {
        let cctx = format!("{ctx} component '{}'", component.name);
        for (field, value) in [
            ("zeta", component.zeta),
            ("hydraulic_diameter_m", component.hydraulic_diameter_m),
            ("volume_m3", component.volume_m3),
            ("carnot_efficiency", component.carnot_efficiency),
        ] {
            if let Some(v) = value {
                positive_finite(&cctx, field, v)?;
            }
        }
        for (field, value) in [
            ("pressure_head_pa", component.pressure_head_pa),
            ("mass_flux_kg_s", component.mass_flux_kg_s),
        ] {
            if let Some(v) = value
                && !v.is_finite()
            {
                return Err(ValidationError::InvalidValue {
                    field: format!("{cctx} {field}"),
                    value: v.to_string(),
                    reason: "must be finite".to_string(),
                });
            }
        }
    }

    unique_ids(network.elements.iter().map(|e| e.id), &format!("{ctx} elements"))?;
    for element in &network.elements {
        let ectx = format!("{ctx} element #{}", element.id);
        for (field, node) in [
            ("inlet_node_id", element.inlet_node_id),
            ("outlet_node_id", element.outlet_node_id),
        ] {
            if !node_ids.contains(&node) {
                return Err(ValidationError::MissingReference {
                    id: node.to_string(),
                    context: format!("{ectx} {field}"),
                });
            }
        }
        if !component_ids.contains(&element.component_id) {
            return Err(ValidationError::MissingReference {
                id: element.component_id.to_string(),
                context: format!("{ectx} component_id"),
            });
        }
        if let Some(pipe) = element.pipe_id
            && !pipe_ids.contains(&pipe)
        {
            return Err(ValidationError::MissingReference {
                id: pipe.to_string(),
                context: format!("{ectx} pipe_id"),
            });
        }
        if let Some(l) = element.length_m {
            positive_finite(&ectx, "length_m", l)?;
        }
        if let Some(dx) = element.discretization_length_m {
            positive_finite(&ectx, "discretization_length_m", dx)?;
        }
        if let Some(zone) = element.heat_exchange.zone_id
            && !zone_ids.contains(&zone)
        {
            return Err(ValidationError::MissingReference {
                id: zone.to_string(),
                context: format!("{ectx} heat_exchange zone_id"),
            });
        }
    }

    Ok(())
}

fn unique_ids(
    ids: impl Iterator<Item = ObjectId>,
    context: &str,
) -> Result<HashSet<ObjectId>, ValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId {
                id: id.to_string(),
                context: context.to_string(),
            });
        }
    }
    Ok(seen)
}

fn zone_refs(
    ctx: &str,
    refs: &[ObjectId],
    zone_ids: &HashSet<ObjectId>,
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for id in refs {
        if !zone_ids.contains(id) {
            return Err(ValidationError::MissingReference {
                id: id.to_string(),
                context: format!("{ctx} zone_ids"),
            });
        }
        if !seen.insert(*id) {
            return Err(ValidationError::DuplicateId {
                id: id.to_string(),
                context: format!("{ctx} zone_ids"),
            });
        }
    }
    Ok(())
}

fn positive_finite(ctx: &str, field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{ctx} {field}"),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}

fn non_negative_finite(ctx: &str, field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{ctx} {field}"),
            value: value.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }
    Ok(())
}

fn unit_interval(ctx: &str, field: &str, value: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::InvalidValue {
            field: format!("{ctx} {field}"),
            value: value.to_string(),
            reason: "must be in [0, 1]".to_string(),
        });
    }
    Ok(())
}
