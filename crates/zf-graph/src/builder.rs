//! Incremental graph builder.

use std::collections::HashMap;
use zf_core::{ElementId, NodeId, ObjectId};

use crate::error::GraphError;
use crate::graph::{FlowElement, Graph, Node, NodeKind, Port, PortKind};
use crate::validate;

/// Builder for constructing a network incrementally.
///
/// Use `add_node` and `add_element` to build up the network,
/// then call `build()` to validate and freeze it into an immutable `Graph`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    elements: Vec<FlowElement>,
    next_node_id: u32,
    next_element_id: u32,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its ID.
    pub fn add_node(
        &mut self,
        object_id: ObjectId,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId::from_index(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.push(Node {
            id,
            object_id,
            name: name.into(),
            kind,
        });
        id
    }

    /// Add a flow element from `inlet` to `outlet` and return its ID.
    pub fn add_element(
        &mut self,
        object_id: ObjectId,
        name: impl Into<String>,
        inlet: NodeId,
        outlet: NodeId,
    ) -> ElementId {
        let id = ElementId::from_index(self.next_element_id);
        self.next_element_id += 1;
        self.elements.push(FlowElement {
            id,
            object_id,
            name: name.into(),
            inlet,
            outlet,
        });
        id
    }

    /// Look up a node added earlier by its project id.
    pub fn node_by_object_id(&self, object_id: ObjectId) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.object_id == object_id)
            .map(|n| n.id)
    }

    /// Build and validate the graph, returning an immutable `Graph`.
    pub fn build(self) -> Result<Graph, GraphError> {
        validate::validate_structure(&self.nodes, &self.elements)?;

        let (node_port_offsets, node_ports) = Self::build_adjacency(&self.nodes, &self.elements);

        validate::validate_adjacency(&self.nodes, &self.elements, &node_port_offsets, &node_ports)?;

        Ok(Graph {
            nodes: self.nodes,
            elements: self.elements,
            node_port_offsets,
            node_ports,
        })
    }

    fn build_adjacency(nodes: &[Node], elements: &[FlowElement]) -> (Vec<usize>, Vec<Port>) {
        let mut node_to_ports: HashMap<NodeId, Vec<Port>> = HashMap::new();
        for element in elements {
            node_to_ports.entry(element.inlet).or_default().push(Port {
                element: element.id,
                kind: PortKind::Inlet,
            });
            node_to_ports.entry(element.outlet).or_default().push(Port {
                element: element.id,
                kind: PortKind::Outlet,
            });
        }

        for ports in node_to_ports.values_mut() {
            ports.sort_by_key(|p| p.element.index());
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat_ports = Vec::new();
        offsets.push(0);

        for node in nodes {
            if let Some(ports) = node_to_ports.get(&node.id) {
                flat_ports.extend_from_slice(ports);
            }
            offsets.push(flat_ports.len());
        }

        (offsets, flat_ports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_basic() {
        let mut builder = GraphBuilder::new();
        let n1 = builder.add_node(1, "Node1", NodeKind::Mixer);
        let n2 = builder.add_node(2, "Node2", NodeKind::Mixer);
        let e1 = builder.add_element(5, "Pipe", n1, n2);

        assert_eq!(n1.index(), 0);
        assert_eq!(n2.index(), 1);
        assert_eq!(e1.index(), 0);
        assert_eq!(builder.node_by_object_id(2), Some(n2));
        assert_eq!(builder.node_by_object_id(9), None);
    }

    #[test]
    fn builder_build_ring() {
        let mut builder = GraphBuilder::new();
        let n1 = builder.add_node(1, "N1", NodeKind::Source);
        let n2 = builder.add_node(2, "N2", NodeKind::Building);
        let e1 = builder.add_element(10, "Supply", n1, n2);
        let e2 = builder.add_element(11, "Return", n2, n1);

        let graph = builder.build().unwrap();
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.elements().len(), 2);

        assert_eq!(graph.node_ports(n1).len(), 2);
        assert_eq!(graph.inflow_elements(n1).collect::<Vec<_>>(), vec![e2]);
        assert_eq!(graph.outflow_elements(n1).collect::<Vec<_>>(), vec![e1]);
        assert_eq!(graph.inflow_elements(n2).collect::<Vec<_>>(), vec![e1]);
    }

    #[test]
    fn build_rejects_self_loop() {
        let mut builder = GraphBuilder::new();
        let n1 = builder.add_node(1, "N1", NodeKind::Mixer);
        builder.add_element(3, "Loop", n1, n1);
        assert_eq!(builder.build().unwrap_err(), GraphError::SelfLoop { element: 3 });
    }
}
