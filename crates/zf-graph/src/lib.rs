//! zf-graph: hydraulic network topology for zoneflow.
//!
//! Provides:
//! - Core graph data structures (Node, FlowElement, Port, Graph)
//! - Incremental graph builder with validation
//! - Project-id to contiguous-index maps for solver integration
//! - Connectivity check (`check_connected_graph`)
//!
//! # Example
//!
//! ```
//! use zf_graph::{GraphBuilder, NodeKind};
//!
//! let mut builder = GraphBuilder::new();
//! let supply = builder.add_node(1, "Supply", NodeKind::Source);
//! let house = builder.add_node(2, "House", NodeKind::Building);
//! builder.add_element(10, "Pipe", supply, house);
//! builder.add_element(11, "Pump", house, supply);
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.nodes().len(), 2);
//! assert_eq!(graph.elements().len(), 2);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod indexing;
pub(crate) mod validate;

pub use builder::GraphBuilder;
pub use error::GraphError;
pub use graph::{FlowElement, Graph, Node, NodeKind, Port, PortKind};
pub use indexing::IndexMap;
pub use validate::check_connected_graph;
