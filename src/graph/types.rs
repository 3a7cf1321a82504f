//! Resolved graph: what synthesis hands back to the editor.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::syntax::types::{BlockKind, Position};

// ─── Nodes and edges ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNode {
    pub id: String,
    pub kind: BlockKind,
    pub title: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub config: Map<String, Value>,
    /// Measured size from the editor, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl ResolvedNode {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: kind.default_title().to_string(),
            position: Position::default(),
            config: Map::new(),
            width: None,
            height: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMeta {
    pub source_kind: BlockKind,
    pub target_kind: BlockKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: String,
    pub target_handle: String,
    pub meta: EdgeMeta,
}

impl ResolvedEdge {
    /// Edge between two resolved nodes with the given source handle and the
    /// default target handle.
    pub fn between(source: &ResolvedNode, target: &ResolvedNode, source_handle: &str) -> Self {
        Self::with_handles(source, target, source_handle, "target")
    }

    pub fn with_handles(
        source: &ResolvedNode,
        target: &ResolvedNode,
        source_handle: &str,
        target_handle: &str,
    ) -> Self {
        Self {
            id: format!("{}-{}-{}-{}", source.id, source_handle, target.id, target_handle),
            source: source.id.clone(),
            target: target.id.clone(),
            source_handle: source_handle.to_string(),
            target_handle: target_handle.to_string(),
            meta: EdgeMeta {
                source_kind: source.kind,
                target_kind: target.kind,
            },
        }
    }
}

// ─── FlowGraph ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    #[serde(default)]
    pub nodes: Vec<ResolvedNode>,
    #[serde(default)]
    pub edges: Vec<ResolvedEdge>,
}

impl FlowGraph {
    pub fn new(nodes: Vec<ResolvedNode>, edges: Vec<ResolvedEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&ResolvedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn start_node(&self) -> Option<&ResolvedNode> {
        self.nodes.iter().find(|n| n.kind == BlockKind::Start)
    }

    /// Edges whose source or target is not among `nodes`.
    pub fn dangling_edges(&self) -> Vec<&ResolvedEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
            .collect()
    }
}

// ─── Topology index ──────────────────────────────────────────────────────────

/// Directed petgraph view over a node/edge slice.
///
/// Weights are positions in the original node slice. Duplicate node ids keep
/// their first occurrence; edges with an unknown endpoint are left out.
pub struct FlowIndex {
    pub digraph: DiGraph<usize, ()>,
    /// Maps node id → petgraph NodeIndex.
    pub node_index: HashMap<String, NodeIndex>,
}

impl FlowIndex {
    pub fn build(nodes: &[ResolvedNode], edges: &[ResolvedEdge]) -> Self {
        let mut digraph = DiGraph::new();
        let mut node_index = HashMap::new();
        for (pos, node) in nodes.iter().enumerate() {
            if !node_index.contains_key(&node.id) {
                let idx = digraph.add_node(pos);
                node_index.insert(node.id.clone(), idx);
            }
        }
        for edge in edges {
            if let (Some(&s), Some(&t)) = (node_index.get(&edge.source), node_index.get(&edge.target)) {
                digraph.add_edge(s, t, ());
            }
        }
        Self { digraph, node_index }
    }

    pub fn node_count(&self) -> usize {
        self.digraph.node_count()
    }

    /// Position in the original slice of the node at `idx`.
    pub fn slot(&self, idx: NodeIndex) -> usize {
        self.digraph[idx]
    }

    /// Indices in original slice order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.digraph.node_indices()
    }
}
