//! Graph-specific error types.

use zf_core::{ElementId, NodeId, ObjectId, ZfError};

/// Network construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An element refers to a node that doesn't exist.
    InvalidNodeRef { element: ElementId, node: NodeId },

    /// An element connects a node to itself.
    SelfLoop { element: ObjectId },

    /// Two nodes or two elements share a project id.
    DuplicateObjectId { what: &'static str, id: ObjectId },

    /// A node has no connected flow element.
    IsolatedNode { node: ObjectId },

    /// Parts of the network cannot be reached from the first node.
    Disconnected { unreachable: Vec<ObjectId> },

    /// Adjacency list is inconsistent (port in node's list but element doesn't reference node).
    InconsistentAdjacency { element: ElementId, node: NodeId },

    /// Project id not found in index map.
    IdNotFound { what: &'static str, id: ObjectId },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::InvalidNodeRef { element, node } => {
                write!(f, "Element {} refers to non-existent node {}", element, node)
            }
            GraphError::SelfLoop { element } => {
                write!(f, "Element #{} has identical inlet and outlet node", element)
            }
            GraphError::DuplicateObjectId { what, id } => {
                write!(f, "Duplicate {} id #{}", what, id)
            }
            GraphError::IsolatedNode { node } => {
                write!(f, "Node #{} is not connected to any flow element", node)
            }
            GraphError::Disconnected { unreachable } => {
                write!(f, "Network is not connected, unreachable nodes: {:?}", unreachable)
            }
            GraphError::InconsistentAdjacency { element, node } => {
                write!(
                    f,
                    "Element {} in node {}'s adjacency list but doesn't reference that node",
                    element, node
                )
            }
            GraphError::IdNotFound { what, id } => {
                write!(f, "{} #{} not found in index map", what, id)
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for ZfError {
    fn from(err: GraphError) -> Self {
        ZfError::invariant(err.to_string())
    }
}
