//! Evaluation order.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use crate::model::ModelIndex;

/// Topological order of `nodes` under `(producer, consumer)` edges.
///
/// Kahn's algorithm; among ready models the smallest
/// `(priority, registration index)` goes first, so the result is stable.
/// Edges touching models outside `nodes` and self edges are ignored.
/// On a cycle the models that could not be ordered are returned as error.
pub fn evaluation_order(
    nodes: &[(ModelIndex, i32)],
    edges: &[(ModelIndex, ModelIndex)],
) -> Result<Vec<ModelIndex>, Vec<ModelIndex>> {
    let priority: HashMap<ModelIndex, i32> = nodes.iter().copied().collect();

    let unique: BTreeSet<(ModelIndex, ModelIndex)> = edges
        .iter()
        .copied()
        .filter(|(from, to)| from != to && priority.contains_key(from) && priority.contains_key(to))
        .collect();

    let mut adj: HashMap<ModelIndex, Vec<ModelIndex>> = HashMap::new();
    let mut in_degree: HashMap<ModelIndex, usize> = nodes.iter().map(|&(m, _)| (m, 0)).collect();
    for &(from, to) in &unique {
        adj.entry(from).or_default().push(to);
        *in_degree.entry(to).or_default() += 1;
    }

    let mut ready: BinaryHeap<Reverse<(i32, ModelIndex)>> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(&m, _)| Reverse((priority[&m], m)))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(Reverse((_, model))) = ready.pop() {
        order.push(model);
        for next in adj.get(&model).into_iter().flatten() {
            if let Some(deg) = in_degree.get_mut(next) {
                *deg -= 1;
                if *deg == 0 {
                    ready.push(Reverse((priority[next], *next)));
                }
            }
        }
    }

    if order.len() != in_degree.len() {
        let mut stuck: Vec<ModelIndex> = in_degree
            .into_iter()
            .filter(|(_, deg)| *deg > 0)
            .map(|(m, _)| m)
            .collect();
        stuck.sort_unstable();
        return Err(stuck);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_breaks_ties() {
        let nodes = [(0, 1000), (1, 0), (2, 0)];
        assert_eq!(evaluation_order(&nodes, &[]).unwrap(), vec![1, 2, 0]);
    }

    #[test]
    fn edges_beat_priority() {
        // 0 has the tail priority but feeds 1
        let nodes = [(0, 1000), (1, 0)];
        assert_eq!(evaluation_order(&nodes, &[(0, 1)]).unwrap(), vec![0, 1]);
    }

    #[test]
    fn foreign_and_self_edges_ignored() {
        let nodes = [(3, 0), (5, 0)];
        let order = evaluation_order(&nodes, &[(9, 3), (5, 5), (5, 3)]).unwrap();
        assert_eq!(order, vec![5, 3]);
    }

    #[test]
    fn cycle_reported() {
        let nodes = [(0, 0), (1, 0), (2, 0)];
        let stuck = evaluation_order(&nodes, &[(0, 1), (1, 2), (2, 1)]).unwrap_err();
        assert_eq!(stuck, vec![1, 2]);
    }
}
