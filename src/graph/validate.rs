//! Graph invariants: single-entry connectivity and terminal-node convergence.
//!
//! Both checks are pure functions over any `(nodes, edges)` pair. Edges that
//! point at unknown nodes are ignored rather than rejected.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::{Dfs, EdgeRef};
use serde::{Deserialize, Serialize};

use crate::syntax::types::BlockKind;

use super::types::{FlowIndex, ResolvedEdge, ResolvedNode};

// ─── Verdicts ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityVerdict {
    pub is_valid: bool,
    /// Number of undirected components over all nodes.
    pub connected_components: usize,
    /// Entry nodes with no incident edge.
    pub isolated_entry_nodes: Vec<ResolvedNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceVerdict {
    pub is_valid: bool,
    pub conflicting_entry_nodes: Vec<ResolvedNode>,
    pub reachable_end_nodes: Vec<ResolvedNode>,
}

// ─── Components ──────────────────────────────────────────────────────────────

/// Undirected component label for every node index.
fn component_labels(index: &FlowIndex) -> Vec<usize> {
    let mut uf = UnionFind::<usize>::new(index.node_count());
    for edge in index.digraph.edge_references() {
        uf.union(edge.source().index(), edge.target().index());
    }
    uf.into_labeling()
}

fn entry_indices<'a>(index: &'a FlowIndex, nodes: &'a [ResolvedNode]) -> impl Iterator<Item = NodeIndex> + 'a {
    index.indices().filter(move |&idx| nodes[index.slot(idx)].kind.is_entry())
}

fn collect_in_order(nodes: &[ResolvedNode], slots: BTreeSet<usize>) -> Vec<ResolvedNode> {
    slots.into_iter().map(|slot| nodes[slot].clone()).collect()
}

// ─── Connectivity ────────────────────────────────────────────────────────────

/// All entry nodes (Start and triggers) must share one component.
pub fn validate_connectivity(nodes: &[ResolvedNode], edges: &[ResolvedEdge]) -> ConnectivityVerdict {
    let index = FlowIndex::build(nodes, edges);
    let labels = component_labels(&index);
    let connected_components = labels.iter().collect::<HashSet<_>>().len();

    let mut entry_components = HashSet::new();
    let mut isolated = BTreeSet::new();
    for idx in entry_indices(&index, nodes) {
        entry_components.insert(labels[idx.index()]);
        if index.digraph.neighbors_undirected(idx).next().is_none() {
            isolated.insert(index.slot(idx));
        }
    }

    ConnectivityVerdict {
        is_valid: entry_components.len() <= 1,
        connected_components,
        isolated_entry_nodes: collect_in_order(nodes, isolated),
    }
}

// ─── Convergence ─────────────────────────────────────────────────────────────

/// End nodes reachable from `start` along directed edges.
fn reachable_ends(index: &FlowIndex, nodes: &[ResolvedNode], start: NodeIndex) -> BTreeSet<usize> {
    let mut ends = BTreeSet::new();
    let mut dfs = Dfs::new(&index.digraph, start);
    while let Some(idx) = dfs.next(&index.digraph) {
        let slot = index.slot(idx);
        if nodes[slot].kind == BlockKind::End {
            ends.insert(slot);
        }
    }
    ends
}

/// Within a component, every entry node must reach the same set of End nodes.
pub fn validate_convergence(nodes: &[ResolvedNode], edges: &[ResolvedEdge]) -> ConvergenceVerdict {
    let index = FlowIndex::build(nodes, edges);
    let labels = component_labels(&index);

    let mut by_component: BTreeMap<usize, Vec<(usize, BTreeSet<usize>)>> = BTreeMap::new();
    for idx in entry_indices(&index, nodes) {
        let ends = reachable_ends(&index, nodes, idx);
        by_component
            .entry(labels[idx.index()])
            .or_default()
            .push((index.slot(idx), ends));
    }

    let mut conflicting = BTreeSet::new();
    let mut reachable = BTreeSet::new();
    for entries in by_component.values() {
        let Some((_, first)) = entries.first() else { continue };
        if entries.iter().all(|(_, ends)| ends == first) {
            continue;
        }
        for (slot, ends) in entries {
            conflicting.insert(*slot);
            reachable.extend(ends.iter().copied());
        }
    }

    ConvergenceVerdict {
        is_valid: conflicting.is_empty(),
        conflicting_entry_nodes: collect_in_order(nodes, conflicting),
        reachable_end_nodes: collect_in_order(nodes, reachable),
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_graph_validate.rs"]
mod tests;
