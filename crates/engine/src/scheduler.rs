//! Execution-order computation: depth-first topological sort with cycle
//! detection.
//!
//! The store recomputes the order eagerly after every structural mutation, so
//! the cached order is always consistent with the current connections by the
//! time any mutation returns.

use std::collections::HashMap;

use indexmap::IndexMap;

use graph::{Connection, ConnectionId, Node, NodeId};

/// Three-color DFS mark. Absence from the mark map means "unvisited".
#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// Computes a topological order over `nodes`.
///
/// For every connection, the source node precedes the target node in the
/// returned order. Tie-breaks among mutually independent nodes are derived
/// from node insertion order, which keeps execution results reproducible
/// across runs on an unchanged graph.
///
/// On a cycle the whole sort is abandoned; the returned `Err` carries the id
/// of the node that closed the cycle.
pub(crate) fn topological_order(
    nodes: &IndexMap<NodeId, Node>,
    connections: &IndexMap<ConnectionId, Connection>,
) -> Result<Vec<NodeId>, NodeId> {
    // Outgoing adjacency (dependents), in connection insertion order.
    let mut dependents: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for conn in connections.values() {
        dependents
            .entry(&conn.source_node_id)
            .or_default()
            .push(&conn.target_node_id);
    }

    let mut marks: HashMap<&NodeId, Mark> = HashMap::with_capacity(nodes.len());
    let mut postorder: Vec<&NodeId> = Vec::with_capacity(nodes.len());

    // Seed with true sources (no incoming connection). Seeds are visited in
    // reverse insertion order because the final list is reversed postorder;
    // this keeps independent nodes in insertion order in the result.
    let seeds: Vec<&NodeId> = nodes
        .keys()
        .filter(|id| !connections.values().any(|c| &&c.target_node_id == id))
        .collect();
    for seed in seeds.into_iter().rev() {
        visit(seed, &dependents, &mut marks, &mut postorder)?;
    }

    // A graph with no source-less entry point (or disjoint cyclic islands)
    // leaves nodes unvisited; sweep them under the same cycle check.
    let remaining: Vec<&NodeId> = nodes.keys().filter(|id| !marks.contains_key(id)).collect();
    for id in remaining.into_iter().rev() {
        visit(id, &dependents, &mut marks, &mut postorder)?;
    }

    Ok(postorder.into_iter().rev().cloned().collect())
}

fn visit<'a>(
    node: &'a NodeId,
    dependents: &HashMap<&'a NodeId, Vec<&'a NodeId>>,
    marks: &mut HashMap<&'a NodeId, Mark>,
    postorder: &mut Vec<&'a NodeId>,
) -> Result<(), NodeId> {
    match marks.get(node) {
        Some(Mark::InProgress) => return Err(node.clone()),
        Some(Mark::Done) => return Ok(()),
        None => {}
    }

    marks.insert(node, Mark::InProgress);
    if let Some(targets) = dependents.get(node) {
        for &target in targets {
            visit(target, dependents, marks, postorder)?;
        }
    }
    marks.insert(node, Mark::Done);
    postorder.push(node);
    Ok(())
}
