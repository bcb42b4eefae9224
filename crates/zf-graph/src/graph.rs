//! Core graph data structures.

use zf_core::{ElementId, NodeId, ObjectId};

/// Role of a node in the hydraulic network.
///
/// The role is informative only; all nodes obey the same mass balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Supply side node, e.g. the plant connection.
    Source,
    /// Consumer side node inside a building.
    Building,
    /// Plain junction.
    Mixer,
}

/// Which end of a flow element is attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// The element's inlet end (positive flow leaves the node).
    Inlet,
    /// The element's outlet end (positive flow enters the node).
    Outlet,
}

/// A network node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// Id as written in the project file.
    pub object_id: ObjectId,
    pub name: String,
    pub kind: NodeKind,
}

/// A flow element (pipe, pump, heat exchanger, ...) between two nodes.
///
/// Positive mass flux runs from `inlet` to `outlet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowElement {
    pub id: ElementId,
    pub object_id: ObjectId,
    pub name: String,
    pub inlet: NodeId,
    pub outlet: NodeId,
}

/// One end of a flow element as seen from the node it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    pub element: ElementId,
    pub kind: PortKind,
}

/// The validated, immutable network topology.
///
/// Nodes and elements are stored in vectors indexed by their ids. For each
/// node a compact adjacency list holds the attached element ends.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) elements: Vec<FlowElement>,

    /// Node i's ports are in node_ports[node_port_offsets[i]..node_port_offsets[i+1]].
    pub(crate) node_port_offsets: Vec<usize>,

    /// Flat list of ports, sorted by node then element id for determinism.
    pub(crate) node_ports: Vec<Port>,
}

impl Graph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[FlowElement] {
        &self.elements
    }

    /// Get a node by ID (returns None if ID out of bounds).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.idx())
    }

    /// Get an element by ID (returns None if ID out of bounds).
    pub fn element(&self, id: ElementId) -> Option<&FlowElement> {
        self.elements.get(id.idx())
    }

    /// All element ends attached to a node.
    pub fn node_ports(&self, node_id: NodeId) -> &[Port] {
        let idx = node_id.idx();
        if idx >= self.nodes.len() {
            return &[];
        }
        let start = self.node_port_offsets[idx];
        let end = self.node_port_offsets[idx + 1];
        &self.node_ports[start..end]
    }

    /// Elements whose outlet ends at this node.
    pub fn inflow_elements(&self, node_id: NodeId) -> impl Iterator<Item = ElementId> + '_ {
        self.node_ports(node_id)
            .iter()
            .filter(|p| p.kind == PortKind::Outlet)
            .map(|p| p.element)
    }

    /// Elements whose inlet starts at this node.
    pub fn outflow_elements(&self, node_id: NodeId) -> impl Iterator<Item = ElementId> + '_ {
        self.node_ports(node_id)
            .iter()
            .filter(|p| p.kind == PortKind::Inlet)
            .map(|p| p.element)
    }

    pub fn element_inlet_node(&self, element_id: ElementId) -> Option<NodeId> {
        self.element(element_id).map(|e| e.inlet)
    }

    pub fn element_outlet_node(&self, element_id: ElementId) -> Option<NodeId> {
        self.element(element_id).map(|e| e.outlet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zf_core::Id;

    #[test]
    fn port_kind_equality() {
        assert_eq!(PortKind::Inlet, PortKind::Inlet);
        assert_ne!(PortKind::Inlet, PortKind::Outlet);
    }

    #[test]
    fn node_ports_out_of_range_is_empty() {
        let graph = Graph {
            nodes: vec![],
            elements: vec![],
            node_port_offsets: vec![0],
            node_ports: vec![],
        };
        assert!(graph.node_ports(Id::from_index(3)).is_empty());
        assert!(graph.element_inlet_node(Id::from_index(0)).is_none());
    }
}
