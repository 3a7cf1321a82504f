//! Node/edge synthesis: draft ids become typed, defaulted, positioned nodes.
//!
//! Pipeline per call:
//!   1. resolve each draft node (template < desc < tool fields < repaired config)
//!   2. merge Start drafts into the single Start node
//!   3. rewrite cross-node references in every new config
//!   4. resolve edges and their handles
//!   5. lay out the new nodes right of the existing canvas

pub mod references;
pub mod repair;

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::Lookups;
use crate::config::EngineConfig;
use crate::error::SynthError;
use crate::graph::types::{FlowGraph, ResolvedEdge, ResolvedNode};
use crate::layout::{ExistingBounds, layout};
use crate::parsers::normalize_branch_label;
use crate::syntax::types::{BlockKind, DraftEdge, DraftGraph, DraftNode, EdgeSpec, NodeSpec};

pub use references::{RefMap, RefTarget, correct_field_name, rewrite_config, rewrite_value};
pub use repair::repair_config;

// ─── Working set ─────────────────────────────────────────────────────────────

struct Slot {
    node: ResolvedNode,
    /// Minted in this call (as opposed to a clone of an existing node).
    fresh: bool,
    explicit_position: bool,
}

#[derive(Default)]
struct WorkingSet {
    slots: Vec<Slot>,
    /// Draft id → slot index.
    by_draft: HashMap<String, usize>,
    start: Option<usize>,
}

impl WorkingSet {
    fn push(&mut self, draft_id: &str, slot: Slot) -> usize {
        let idx = self.slots.len();
        if slot.node.kind == BlockKind::Start {
            self.start.get_or_insert(idx);
        }
        self.slots.push(slot);
        self.by_draft.insert(draft_id.to_string(), idx);
        idx
    }

    fn node(&self, draft_id: &str) -> Option<&ResolvedNode> {
        self.by_draft.get(draft_id).map(|&idx| &self.slots[idx].node)
    }

    fn ref_map(&self) -> RefMap {
        self.by_draft
            .iter()
            .map(|(draft_id, &idx)| {
                let node = &self.slots[idx].node;
                (draft_id.clone(), RefTarget::new(node.id.clone(), node.kind))
            })
            .collect()
    }
}

// ─── Start merge ─────────────────────────────────────────────────────────────

/// Append `incoming` Start variables to `target`, skipping names it already
/// declares.
fn merge_start_variables(target: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    let Some(Value::Array(new_vars)) = incoming.get("variables") else {
        return;
    };
    if new_vars.is_empty() {
        return;
    }
    let slot = target
        .entry("variables")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    let Value::Array(vars) = slot else { return };
    for var in new_vars {
        let name = var.get("variable");
        if !vars.iter().any(|v| v.get("variable") == name) {
            vars.push(var.clone());
        }
    }
}

// ─── Node resolution ─────────────────────────────────────────────────────────

fn resolve_node(draft: &DraftNode, kind: BlockKind, lookups: &Lookups) -> Option<ResolvedNode> {
    let Some(template) = lookups.templates.get(kind) else {
        warn!(id = %draft.id, kind = %kind, "no default template, skipping node");
        return None;
    };

    let title = draft
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| Some(template.title.as_str()).filter(|t| !t.is_empty()))
        .unwrap_or(kind.as_str())
        .to_string();

    let tool = match kind {
        BlockKind::Tool => draft.tool_key.as_deref().and_then(|key| lookups.tools.get(key)),
        _ => None,
    };
    let desc = tool
        .map(|t| t.tool_description.as_str())
        .filter(|d| !d.is_empty())
        .unwrap_or(template.desc.as_str());

    let mut config = template.config.clone();
    config.insert("desc".into(), Value::String(desc.to_string()));
    if let Some(tool) = tool {
        config.extend(tool.node_fields());
    }
    config.extend(repair_config(
        kind,
        &draft.config,
        &template.config,
        lookups.default_model.as_ref(),
    ));

    let mut node = ResolvedNode::new(Uuid::new_v4().to_string(), kind);
    node.title = title;
    node.config = config;
    node.position = draft.position.unwrap_or_default();
    Some(node)
}

// ─── Edge resolution ─────────────────────────────────────────────────────────

/// Handle an edge leaves `source` through.
fn source_handle(source: &ResolvedNode, edge: &DraftEdge) -> String {
    if let Some(handle) = edge.source_handle.as_deref().filter(|h| !h.is_empty()) {
        return handle.to_string();
    }
    if source.kind == BlockKind::IfElse {
        match edge.label.as_deref().and_then(normalize_branch_label) {
            Some("true") => {
                return source
                    .config
                    .get("cases")
                    .and_then(|cases| cases.get(0))
                    .and_then(|case| case.get("case_id"))
                    .and_then(Value::as_str)
                    .unwrap_or("true")
                    .to_string();
            }
            Some("false") => return "false".to_string(),
            _ => {}
        }
    }
    "source".to_string()
}

fn resolve_edges(draft_edges: &[DraftEdge], work: &WorkingSet) -> Vec<ResolvedEdge> {
    let mut edges = Vec::new();
    for edge in draft_edges {
        let (Some(source), Some(target)) = (work.node(&edge.source_id), work.node(&edge.target_id)) else {
            warn!(source = %edge.source_id, target = %edge.target_id, "dropping edge with unresolved endpoint");
            continue;
        };
        let handle = source_handle(source, edge);
        let target_handle = edge.target_handle.as_deref().filter(|h| !h.is_empty()).unwrap_or("target");
        edges.push(ResolvedEdge::with_handles(source, target, &handle, target_handle));
    }
    edges
}

// ─── Layout ──────────────────────────────────────────────────────────────────

fn position_fresh_nodes(work: &mut WorkingSet, edges: &[ResolvedEdge], existing: &FlowGraph, config: &EngineConfig) {
    let fresh: Vec<usize> = (0..work.slots.len()).filter(|&i| work.slots[i].fresh).collect();
    if fresh.is_empty() || fresh.iter().all(|&i| work.slots[i].explicit_position) {
        return;
    }

    let nodes: Vec<ResolvedNode> = fresh.iter().map(|&i| work.slots[i].node.clone()).collect();
    let fresh_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let local_edges: Vec<ResolvedEdge> = edges
        .iter()
        .filter(|e| fresh_ids.contains(e.source.as_str()) && fresh_ids.contains(e.target.as_str()))
        .cloned()
        .collect();

    let cfg = &config.layout;
    let bounds = ExistingBounds::from_nodes(&existing.nodes, cfg.node_width, cfg.node_height);
    let positions = layout(&nodes, &local_edges, &bounds, cfg);
    for &i in &fresh {
        if let Some(pos) = positions.get(&work.slots[i].node.id) {
            work.slots[i].node.position = *pos;
        }
    }
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Resolve a draft graph against `lookups` and append it to `existing`.
///
/// The result holds every newly minted node, the Start node drafts were
/// merged into (a modified clone when it came from `existing`), and every
/// edge whose endpoints resolved. `existing` itself is never modified.
pub fn synthesize_draft(
    draft: &DraftGraph,
    existing: &FlowGraph,
    lookups: &Lookups,
    config: &EngineConfig,
) -> Result<FlowGraph, SynthError> {
    let mut work = WorkingSet::default();
    let existing_start = existing.start_node();

    for draft_node in &draft.nodes {
        let Some(kind) = draft_node.kind.filter(|k| lookups.kinds.contains(*k)) else {
            warn!(id = %draft_node.id, "skipping node with unavailable kind");
            continue;
        };

        if kind == BlockKind::Start {
            let start_idx = match (work.start, existing_start) {
                (Some(idx), _) => Some(idx),
                (None, Some(start)) => Some(work.push(
                    &draft_node.id,
                    Slot {
                        node: start.clone(),
                        fresh: false,
                        explicit_position: true,
                    },
                )),
                (None, None) => None,
            };
            if let Some(idx) = start_idx {
                debug!(id = %draft_node.id, start = %work.slots[idx].node.id, "merging into existing start node");
                merge_start_variables(&mut work.slots[idx].node.config, &draft_node.config);
                work.by_draft.insert(draft_node.id.clone(), idx);
                continue;
            }
        }

        if let Some(node) = resolve_node(draft_node, kind, lookups) {
            work.push(
                &draft_node.id,
                Slot {
                    node,
                    fresh: true,
                    explicit_position: draft_node.position.is_some(),
                },
            );
        }
    }

    if work.slots.is_empty() {
        return Err(SynthError::EmptyResult);
    }

    let refs = work.ref_map();
    for slot in work.slots.iter_mut().filter(|s| s.fresh) {
        slot.node.config = rewrite_config(&slot.node.config, &refs);
    }

    let edges = resolve_edges(&draft.edges, &work);
    position_fresh_nodes(&mut work, &edges, existing, config);

    let nodes = work.slots.into_iter().map(|slot| slot.node).collect();
    Ok(FlowGraph::new(nodes, edges))
}

/// Convert a structured node spec into a draft; `None` when its kind is not
/// available.
pub fn draft_from_spec(spec: &NodeSpec, lookups: &Lookups) -> Option<DraftNode> {
    let Some(kind) = lookups.kinds.resolve(&spec.kind) else {
        warn!(id = %spec.id, kind = %spec.kind, "skipping node spec with unknown kind");
        return None;
    };
    let config = spec.config.clone().unwrap_or_default();
    let tool_key = match kind {
        BlockKind::Tool => {
            let field = |name: &str| config.get(name).and_then(Value::as_str).unwrap_or("");
            let key = lookups.tools.pair_key(field("provider_id"), field("tool_name"));
            if key.is_none() {
                debug!(id = %spec.id, "tool spec matches no known tool");
            }
            key
        }
        _ => None,
    };
    Some(DraftNode {
        id: spec.id.clone(),
        kind: Some(kind),
        title: spec.title.clone(),
        tool_key,
        config,
        position: spec.position,
    })
}

/// Synthesize from structured specs instead of flowchart text.
pub fn synthesize_specs(
    nodes: &[NodeSpec],
    edges: &[EdgeSpec],
    existing: &FlowGraph,
    lookups: &Lookups,
    config: &EngineConfig,
) -> Result<FlowGraph, SynthError> {
    let draft = DraftGraph {
        nodes: nodes.iter().filter_map(|spec| draft_from_spec(spec, lookups)).collect(),
        edges: edges.iter().map(DraftEdge::from).collect(),
    };
    synthesize_draft(&draft, existing, lookups, config)
}

#[cfg(test)]
#[path = "../../tests/rust/test_synth.rs"]
mod tests;
