//! Integration tests for zf-graph.

use zf_graph::{GraphBuilder, IndexMap, NodeKind, PortKind, check_connected_graph};

#[test]
fn district_loop_topology() {
    // Supply -> [pump] -> A -> [pipe] -> B -> [return] -> Supply, with a bypass A -> Supply.
    let mut builder = GraphBuilder::new();
    let supply = builder.add_node(1, "Supply", NodeKind::Source);
    let a = builder.add_node(2, "A", NodeKind::Building);
    let b = builder.add_node(3, "B", NodeKind::Building);
    let pump = builder.add_element(10, "Pump", supply, a);
    let pipe = builder.add_element(11, "Pipe", a, b);
    let ret = builder.add_element(12, "Return", b, supply);
    let bypass = builder.add_element(13, "Bypass", a, supply);

    let graph = builder.build().unwrap();
    check_connected_graph(&graph).unwrap();

    assert_eq!(graph.element_inlet_node(pump), Some(supply));
    assert_eq!(graph.element_outlet_node(pipe), Some(b));

    let mut inflow: Vec<_> = graph.inflow_elements(supply).collect();
    inflow.sort();
    assert_eq!(inflow, vec![ret, bypass]);

    let a_ports = graph.node_ports(a);
    assert_eq!(a_ports.len(), 3);
    assert_eq!(
        a_ports.iter().filter(|p| p.kind == PortKind::Inlet).count(),
        2
    );

    let map = IndexMap::from_graph(&graph);
    assert_eq!(map.element_id(12).unwrap(), ret);
    assert_eq!(map.node_object_ids(), &[1, 2, 3]);
}

#[test]
fn graph_error_converts_to_core_error() {
    let mut builder = GraphBuilder::new();
    let n = builder.add_node(1, "N", NodeKind::Mixer);
    builder.add_element(4, "Loop", n, n);
    let err: zf_core::ZfError = builder.build().unwrap_err().into();
    assert!(matches!(err, zf_core::ZfError::Invariant { .. }));
}
