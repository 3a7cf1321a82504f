//! Branch ordering for nodes with more than one outgoing edge.
//!
//! Each outgoing edge of a branching node is routed through its own dummy
//! (`source → __branch_k → target`). The dummies of one source form a
//! [`BranchGroup`] sorted by declared branch order, so crossing minimisation
//! keeps If/Else cases and classifier classes stacked in declaration order.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::LayoutError;
use crate::graph::types::{ResolvedEdge, ResolvedNode};
use crate::syntax::types::BlockKind;

use super::sugiyama::AdjGraph;
use super::types::{BRANCH_PREFIX, BranchGroup, COMPOUND_PREFIX};

/// Rank of the "else" branch: always last.
const ELSE_RANK: usize = usize::MAX;

fn position_by_key(items: Option<&Value>, key: &str, handle: &str) -> Option<usize> {
    items?
        .as_array()?
        .iter()
        .position(|item| item.get(key).and_then(Value::as_str) == Some(handle))
}

fn array_len(items: Option<&Value>) -> usize {
    items.and_then(Value::as_array).map_or(0, Vec::len)
}

/// Declared rank of the branch leaving `source` through `handle`.
///
/// If/Else: index of the matching case, "true" first, "false" last.
/// Question classifier: index of the matching class. Unknown handles sort
/// after every declared branch; other kinds rank all edges equally.
pub fn branch_rank(source: &ResolvedNode, handle: &str) -> usize {
    match source.kind {
        BlockKind::IfElse => {
            let cases = source.config.get("cases");
            if let Some(idx) = position_by_key(cases, "case_id", handle) {
                return idx;
            }
            match handle {
                "true" => 0,
                "false" | "else" => ELSE_RANK,
                _ => array_len(cases).max(1),
            }
        }
        BlockKind::QuestionClassifier => {
            let classes = source.config.get("classes");
            position_by_key(classes, "id", handle).unwrap_or_else(|| array_len(classes))
        }
        _ => 0,
    }
}

/// Build the layout graph over `nodes`, splicing branch dummies after every
/// node with more than one outgoing edge.
pub fn build_layout_graph(
    nodes: &[ResolvedNode],
    edges: &[ResolvedEdge],
) -> Result<(AdjGraph, Vec<BranchGroup>), LayoutError> {
    let mut ag = AdjGraph::new();
    let mut by_id: HashMap<&str, &ResolvedNode> = HashMap::new();
    for node in nodes {
        if !by_id.contains_key(node.id.as_str()) {
            by_id.insert(node.id.as_str(), node);
            ag.add_node(&node.id);
        }
    }

    // Outgoing edges per source, in declaration order.
    let mut outgoing: Vec<(&str, Vec<(usize, &ResolvedEdge)>)> = Vec::new();
    let mut slot_of: HashMap<&str, usize> = HashMap::new();
    for (decl, edge) in edges.iter().enumerate() {
        for endpoint in [&edge.source, &edge.target] {
            if !by_id.contains_key(endpoint.as_str()) {
                return Err(LayoutError::MissingNode(endpoint.clone()));
            }
        }
        let slot = *slot_of.entry(edge.source.as_str()).or_insert_with(|| {
            outgoing.push((edge.source.as_str(), Vec::new()));
            outgoing.len() - 1
        });
        outgoing[slot].1.push((decl, edge));
    }

    let mut groups = Vec::new();
    for (source_id, mut out) in outgoing {
        if out.len() < 2 {
            for (_, edge) in out {
                ag.add_edge(&edge.source, &edge.target);
            }
            continue;
        }

        let source = by_id[source_id];
        out.sort_by_key(|(decl, edge)| (branch_rank(source, &edge.source_handle), *decl));

        let mut members = Vec::with_capacity(out.len());
        for (decl, edge) in out {
            let dummy = format!("{BRANCH_PREFIX}{decl}");
            ag.add_node(&dummy);
            ag.add_edge(source_id, &dummy);
            ag.add_edge(&dummy, &edge.target);
            members.push(dummy);
        }
        groups.push(BranchGroup {
            id: format!("{COMPOUND_PREFIX}{source_id}"),
            source: source_id.to_string(),
            members,
        });
    }

    Ok((ag, groups))
}

#[cfg(test)]
#[path = "../../tests/rust/test_layout_branches.rs"]
mod tests;
