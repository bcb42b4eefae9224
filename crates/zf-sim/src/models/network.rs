//! Topology and fluid shared by the hydraulic and thermal network models.

use zf_core::{NodeId, ObjectId};
use zf_fluids::{HydraulicFluid, LinearSpline};
use zf_graph::{Graph, GraphBuilder, IndexMap, NodeKind, check_connected_graph};
use zf_model::{ModelError, ModelResult};
use zf_project::{FluidDef, NetworkDef, NetworkNodeKind};

/// Validated graph of one network plus the project-id maps.
#[derive(Debug, Clone)]
pub struct NetworkTopology {
    pub network_id: ObjectId,
    pub graph: Graph,
    pub index: IndexMap,
    pub reference_node: NodeId,
}

impl NetworkTopology {
    /// Build the graph of `def` in file order and check it is connected.
    pub fn from_def(def: &NetworkDef) -> ModelResult<Self> {
        let model = format!("Network(#{})", def.id);
        let mut builder = GraphBuilder::new();
        for node in &def.nodes {
            let kind = match node.kind {
                NetworkNodeKind::Source => NodeKind::Source,
                NetworkNodeKind::Building => NodeKind::Building,
                NetworkNodeKind::Mixer => NodeKind::Mixer,
            };
            builder.add_node(node.id, node.name.clone(), kind);
        }
        for element in &def.elements {
            let node = |id: ObjectId| {
                builder.node_by_object_id(id).ok_or_else(|| ModelError::MissingReference {
                    model: model.clone(),
                    what: format!("node #{id} of flow element #{}", element.id),
                })
            };
            let inlet = node(element.inlet_node_id)?;
            let outlet = node(element.outlet_node_id)?;
            builder.add_element(element.id, element.name.clone(), inlet, outlet);
        }

        let graph = builder
            .build()
            .map_err(|e| ModelError::invalid_arg(model.clone(), e.to_string()))?;
        check_connected_graph(&graph).map_err(|e| ModelError::invalid_arg(
            model.clone(),
            e.to_string(),
        ))?;

        let index = IndexMap::from_graph(&graph);
        let reference_node = index
            .node_id(def.reference_node_id)
            .map_err(|_| ModelError::MissingReference {
                model,
                what: format!("reference node #{}", def.reference_node_id),
            })?;
        Ok(Self {
            network_id: def.id,
            graph,
            index,
            reference_node,
        })
    }

    pub fn element_count(&self) -> usize {
        self.graph.elements().len()
    }

    pub fn node_count(&self) -> usize {
        self.graph.nodes().len()
    }

    pub fn element_ids(&self) -> Vec<ObjectId> {
        self.index.element_object_ids().to_vec()
    }

    pub fn node_ids(&self) -> Vec<ObjectId> {
        self.index.node_object_ids().to_vec()
    }
}

/// Transport fluid of a network definition.
pub fn network_fluid(def: &NetworkDef) -> ModelResult<HydraulicFluid> {
    match &def.fluid {
        FluidDef::Water => Ok(HydraulicFluid::water()),
        FluidDef::Custom {
            name,
            density_kg_m3,
            heat_capacity_j_kgk,
            conductivity_w_mk,
            kinematic_viscosity_m2_s,
        } => HydraulicFluid::new(
            name.clone(),
            *density_kg_m3,
            *heat_capacity_j_kgk,
            *conductivity_w_mk,
            LinearSpline::constant(*kinematic_viscosity_m2_s),
        )
        .map_err(|e| ModelError::invalid_arg(format!("Network(#{})", def.id), e.to_string())),
    }
}
