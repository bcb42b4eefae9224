//! Turns a project description into a wired [`ModelGraph`].

use tracing::{debug, info};
use zf_core::ObjectId;
use zf_model::{ModelError, ModelGraph, ModelIndex};
use zf_project::{Project, ZoneDef};

use crate::error::SimResult;
use crate::models::{
    ConstructionBalanceModel, HydraulicNetworkModel, InternalLoadsModel, NaturalVentilationModel,
    NetworkTopology, OutputHandler, OutsideAir, RoomBalanceModel, RoomStatesModel, SolarLoadsModel,
    ThermalNetworkModel, WindowModel,
};

const BUILDER: &str = "ProjectBuilder";

/// A wired model graph plus the position of its output handler.
pub struct BuiltGraph {
    pub graph: ModelGraph,
    pub output: ModelIndex,
}

fn zone<'a>(project: &'a Project, id: ObjectId, what: &str) -> Result<&'a ZoneDef, ModelError> {
    project.zone(id).ok_or_else(|| ModelError::MissingReference {
        model: BUILDER.to_string(),
        what: format!("zone #{id} of {what}"),
    })
}

/// Register one model per project entity, then wire the graph.
///
/// Zones, constructions, windows, loads, networks and finally the output
/// handler; registration order is the tie breaker of the evaluation order.
pub fn build_model_graph(project: &Project) -> SimResult<BuiltGraph> {
    let sim = &project.simulation;
    let outside = OutsideAir {
        temperature_k: sim.outside_temperature_k,
        moisture_density_kg_m3: sim.outside_moisture_density_kg_m3,
    };
    let mut graph = ModelGraph::new();

    for z in &project.zones {
        let t0 = z.initial_temperature_k.unwrap_or(sim.initial_temperature_k);
        graph.add(Box::new(RoomStatesModel::new(
            z.id,
            z.volume_m3,
            sim.moisture_balance,
            t0,
            sim.initial_relative_humidity,
        )?))?;
        graph.add(Box::new(RoomBalanceModel::new(
            z.id,
            sim.moisture_balance,
            sim.radiation_load_fraction_zone,
        )))?;
    }

    for c in &project.constructions {
        graph.add(Box::new(ConstructionBalanceModel::new(
            c,
            sim.outside_temperature_k,
            sim.initial_temperature_k,
        )?))?;
    }

    for w in &project.windows {
        let host = project
            .construction(w.construction_id)
            .ok_or_else(|| ModelError::MissingReference {
                model: BUILDER.to_string(),
                what: format!("construction #{} of window #{}", w.construction_id, w.id),
            })?;
        graph.add(Box::new(WindowModel::new(
            w,
            host.zone_a,
            host.zone_b,
            sim.outside_temperature_k,
        )?))?;
    }

    for loads in &project.internal_loads {
        let what = format!("internal loads #{}", loads.id);
        let zones = loads
            .zone_ids
            .iter()
            .map(|&id| zone(project, id, &what).map(|z| (z.id, z.area_m2)))
            .collect::<Result<Vec<_>, _>>()?;
        graph.add(Box::new(InternalLoadsModel::new(loads, zones)?))?;
    }

    for vent in &project.natural_ventilation {
        let what = format!("natural ventilation #{}", vent.id);
        let zones = vent
            .zone_ids
            .iter()
            .map(|&id| zone(project, id, &what).map(|z| (z.id, z.volume_m3)))
            .collect::<Result<Vec<_>, _>>()?;
        graph.add(Box::new(NaturalVentilationModel::new(
            vent,
            zones,
            sim.moisture_balance,
            outside,
        )?))?;
    }

    for solar in &project.solar_loads {
        graph.add(Box::new(SolarLoadsModel::new(solar)?))?;
    }

    for network in &project.networks {
        let topology = NetworkTopology::from_def(network)?;
        graph.add(Box::new(HydraulicNetworkModel::new(network, topology.clone())?))?;
        graph.add(Box::new(ThermalNetworkModel::new(
            network,
            topology,
            sim.initial_temperature_k,
        )?))?;
    }

    let output = graph.add(Box::new(OutputHandler::new(&project.outputs)))?;
    debug!(models = graph.len(), "models registered");

    graph.setup()?;
    info!(
        project = %project.name,
        models = graph.len(),
        states = graph.n_states(),
        "model graph wired"
    );
    Ok(BuiltGraph { graph, output })
}
