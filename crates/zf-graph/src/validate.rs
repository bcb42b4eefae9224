//! Graph validation.

use std::collections::{HashSet, VecDeque};

use crate::error::GraphError;
use crate::graph::{FlowElement, Graph, Node, Port, PortKind};

/// Element references, self loops and unique project ids.
pub(crate) fn validate_structure(
    nodes: &[Node],
    elements: &[FlowElement],
) -> Result<(), GraphError> {
    let mut seen = HashSet::new();
    for node in nodes {
        if !seen.insert(node.object_id) {
            return Err(GraphError::DuplicateObjectId {
                what: "node",
                id: node.object_id,
            });
        }
    }

    let mut seen = HashSet::new();
    for element in elements {
        if !seen.insert(element.object_id) {
            return Err(GraphError::DuplicateObjectId {
                what: "flow element",
                id: element.object_id,
            });
        }
        for node in [element.inlet, element.outlet] {
            if node.idx() >= nodes.len() {
                return Err(GraphError::InvalidNodeRef {
                    element: element.id,
                    node,
                });
            }
        }
        if element.inlet == element.outlet {
            return Err(GraphError::SelfLoop {
                element: element.object_id,
            });
        }
    }

    for (i, node) in nodes.iter().enumerate() {
        let attached = elements.iter().any(|e| e.inlet.idx() == i || e.outlet.idx() == i);
        if !attached {
            return Err(GraphError::IsolatedNode {
                node: node.object_id,
            });
        }
    }

    Ok(())
}

/// Every port in a node's list must point back at that node.
pub(crate) fn validate_adjacency(
    nodes: &[Node],
    elements: &[FlowElement],
    offsets: &[usize],
    ports: &[Port],
) -> Result<(), GraphError> {
    for (i, node) in nodes.iter().enumerate() {
        for port in &ports[offsets[i]..offsets[i + 1]] {
            let element = &elements[port.element.idx()];
            let end = match port.kind {
                PortKind::Inlet => element.inlet,
                PortKind::Outlet => element.outlet,
            };
            if end != node.id {
                return Err(GraphError::InconsistentAdjacency {
                    element: element.id,
                    node: node.id,
                });
            }
        }
    }
    Ok(())
}

/// Breadth-first walk over the undirected network starting at the first node.
///
/// Fails with the project ids of all nodes that cannot be reached.
pub fn check_connected_graph(graph: &Graph) -> Result<(), GraphError> {
    let nodes = graph.nodes();
    if nodes.is_empty() {
        return Ok(());
    }

    let mut visited = vec![false; nodes.len()];
    let mut queue = VecDeque::from([nodes[0].id]);
    visited[0] = true;

    while let Some(node) = queue.pop_front() {
        for port in graph.node_ports(node) {
            let Some(element) = graph.element(port.element) else {
                continue;
            };
            for next in [element.inlet, element.outlet] {
                if !visited[next.idx()] {
                    visited[next.idx()] = true;
                    queue.push_back(next);
                }
            }
        }
    }

    let unreachable: Vec<_> = nodes
        .iter()
        .filter(|n| !visited[n.id.idx()])
        .map(|n| n.object_id)
        .collect();
    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(GraphError::Disconnected { unreachable })
    }
}

#[cfg(test)]
mod tests {
    use crate::{GraphBuilder, GraphError, NodeKind, check_connected_graph};

    #[test]
    fn duplicate_node_id_rejected() {
        let mut b = GraphBuilder::new();
        let a = b.add_node(1, "A", NodeKind::Mixer);
        let c = b.add_node(1, "B", NodeKind::Mixer);
        b.add_element(1, "E", a, c);
        assert_eq!(
            b.build().unwrap_err(),
            GraphError::DuplicateObjectId { what: "node", id: 1 }
        );
    }

    #[test]
    fn isolated_node_rejected() {
        let mut b = GraphBuilder::new();
        let a = b.add_node(1, "A", NodeKind::Mixer);
        let c = b.add_node(2, "B", NodeKind::Mixer);
        b.add_node(3, "Lonely", NodeKind::Mixer);
        b.add_element(1, "E", a, c);
        assert_eq!(b.build().unwrap_err(), GraphError::IsolatedNode { node: 3 });
    }

    #[test]
    fn disconnected_networks_detected() {
        let mut b = GraphBuilder::new();
        let n: Vec<_> = (1..=4).map(|i| b.add_node(i, format!("N{i}"), NodeKind::Mixer)).collect();
        b.add_element(1, "E1", n[0], n[1]);
        b.add_element(2, "E2", n[1], n[0]);
        b.add_element(3, "E3", n[2], n[3]);
        let g = b.build().unwrap();
        assert_eq!(
            check_connected_graph(&g).unwrap_err(),
            GraphError::Disconnected {
                unreachable: vec![3, 4]
            }
        );
    }
}
