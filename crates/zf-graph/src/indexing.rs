//! Project-id based indexing for solver integration.
//!
//! Maps the ids written in a project file to the contiguous indices used
//! for the solver vectors (0..N).

use std::collections::HashMap;
use zf_core::{ElementId, NodeId, ObjectId};

use crate::error::GraphError;
use crate::graph::Graph;

/// Bidirectional lookup between project ids and graph ids.
#[derive(Debug, Clone)]
pub struct IndexMap {
    node_object_ids: Vec<ObjectId>,
    element_object_ids: Vec<ObjectId>,
    node_by_object: HashMap<ObjectId, NodeId>,
    element_by_object: HashMap<ObjectId, ElementId>,
}

impl IndexMap {
    pub fn from_graph(graph: &Graph) -> Self {
        let node_object_ids: Vec<ObjectId> = graph.nodes().iter().map(|n| n.object_id).collect();
        let element_object_ids: Vec<ObjectId> =
            graph.elements().iter().map(|e| e.object_id).collect();
        let node_by_object = graph.nodes().iter().map(|n| (n.object_id, n.id)).collect();
        let element_by_object = graph
            .elements()
            .iter()
            .map(|e| (e.object_id, e.id))
            .collect();
        Self {
            node_object_ids,
            element_object_ids,
            node_by_object,
            element_by_object,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_object_ids.len()
    }

    pub fn element_count(&self) -> usize {
        self.element_object_ids.len()
    }

    pub fn node_id(&self, object_id: ObjectId) -> Result<NodeId, GraphError> {
        self.node_by_object
            .get(&object_id)
            .copied()
            .ok_or(GraphError::IdNotFound {
                what: "Node",
                id: object_id,
            })
    }

    pub fn element_id(&self, object_id: ObjectId) -> Result<ElementId, GraphError> {
        self.element_by_object
            .get(&object_id)
            .copied()
            .ok_or(GraphError::IdNotFound {
                what: "Flow element",
                id: object_id,
            })
    }

    /// Project id of the node at a solver index.
    pub fn node_object_id(&self, node: NodeId) -> Option<ObjectId> {
        self.node_object_ids.get(node.idx()).copied()
    }

    /// Project id of the element at a solver index.
    pub fn element_object_id(&self, element: ElementId) -> Option<ObjectId> {
        self.element_object_ids.get(element.idx()).copied()
    }

    /// Element project ids in solver order.
    pub fn element_object_ids(&self) -> &[ObjectId] {
        &self.element_object_ids
    }

    /// Node project ids in solver order.
    pub fn node_object_ids(&self) -> &[ObjectId] {
        &self.node_object_ids
    }
}
