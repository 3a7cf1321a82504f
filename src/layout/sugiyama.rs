//! Sugiyama layered graph layout algorithm.
//!
//! Phases:
//!   1. Cycle removal (greedy-FAS)
//!   2. Rank assignment (longest path)
//!   3. Dummy node insertion
//!   4. Crossing minimisation (barycenter, honouring branch groups)
//!   5. Coordinate assignment (ranks left to right, order top to bottom)

use std::collections::{HashMap, HashSet};

use crate::config::LayoutConfig;

use super::types::{BranchGroup, DUMMY_PREFIX, LayoutNode};

// ─── Mini-graph helpers ───────────────────────────────────────────────────────

/// Lightweight string-keyed graph used by every layout phase.
/// Maps node_id → (successors, predecessors); node order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct AdjGraph {
    nodes: Vec<String>,
    successors: HashMap<String, Vec<String>>,
    predecessors: HashMap<String, Vec<String>>,
    edges: Vec<(String, String)>,
}

impl AdjGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. No-op if already present.
    pub fn add_node(&mut self, id: &str) {
        if !self.successors.contains_key(id) {
            self.nodes.push(id.to_string());
            self.successors.insert(id.to_string(), Vec::new());
            self.predecessors.insert(id.to_string(), Vec::new());
        }
    }

    pub fn add_edge(&mut self, src: &str, tgt: &str) {
        self.successors
            .entry(src.to_string())
            .or_default()
            .push(tgt.to_string());
        self.predecessors
            .entry(tgt.to_string())
            .or_default()
            .push(src.to_string());
        self.edges.push((src.to_string(), tgt.to_string()));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.successors.contains_key(id)
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.successors.get(id).map_or(0, Vec::len)
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.predecessors.get(id).map_or(0, Vec::len)
    }

    pub fn successors_of(&self, id: &str) -> &[String] {
        self.successors.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn predecessors_of(&self, id: &str) -> &[String] {
        self.predecessors.get(id).map_or(&[], Vec::as_slice)
    }
}

// ─── Cycle Removal (Greedy-FAS) ─────────────────────────────────────────────

/// Compute a node ordering using the greedy-FAS heuristic.
///
/// Candidates are scanned in insertion order so the result is deterministic.
pub fn greedy_fas_ordering(ag: &AdjGraph) -> Vec<String> {
    let mut active: HashSet<&str> = ag.nodes.iter().map(String::as_str).collect();
    let mut out_deg: HashMap<&str, i64> = HashMap::new();
    let mut in_deg: HashMap<&str, i64> = HashMap::new();
    for node in &ag.nodes {
        out_deg.insert(node, ag.out_degree(node) as i64);
        in_deg.insert(node, ag.in_degree(node) as i64);
    }

    let mut s1: Vec<String> = Vec::new();
    let mut s2: Vec<String> = Vec::new();

    while !active.is_empty() {
        loop {
            let sinks: Vec<&str> = ag
                .nodes
                .iter()
                .map(String::as_str)
                .filter(|n| active.contains(n) && out_deg[n] == 0)
                .collect();
            if sinks.is_empty() {
                break;
            }
            for sink in sinks {
                active.remove(sink);
                s2.push(sink.to_string());
                for pred in ag.predecessors_of(sink) {
                    if active.contains(pred.as_str()) {
                        *out_deg.entry(pred.as_str()).or_insert(0) -= 1;
                    }
                }
            }
        }

        loop {
            let sources: Vec<&str> = ag
                .nodes
                .iter()
                .map(String::as_str)
                .filter(|n| active.contains(n) && in_deg[n] == 0)
                .collect();
            if sources.is_empty() {
                break;
            }
            for source in sources {
                active.remove(source);
                s1.push(source.to_string());
                for succ in ag.successors_of(source) {
                    if active.contains(succ.as_str()) {
                        *in_deg.entry(succ.as_str()).or_insert(0) -= 1;
                    }
                }
            }
        }

        // Largest out-minus-in degree; first in insertion order on ties.
        let best = ag
            .nodes
            .iter()
            .map(String::as_str)
            .filter(|n| active.contains(n))
            .fold(None, |acc: Option<(&str, i64)>, n| {
                let delta = out_deg[n] - in_deg[n];
                match acc {
                    Some((_, d)) if d >= delta => acc,
                    _ => Some((n, delta)),
                }
            });
        if let Some((best, _)) = best {
            active.remove(best);
            s1.push(best.to_string());
            for succ in ag.successors_of(best) {
                if active.contains(succ.as_str()) {
                    *in_deg.entry(succ.as_str()).or_insert(0) -= 1;
                }
            }
            for pred in ag.predecessors_of(best) {
                if active.contains(pred.as_str()) {
                    *out_deg.entry(pred.as_str()).or_insert(0) -= 1;
                }
            }
        }
    }

    s2.reverse();
    s1.extend(s2);
    s1
}

/// Remove cycles using greedy-FAS. Returns (dag, reversed_edges).
/// Self-loops are dropped.
pub fn remove_cycles(ag: &AdjGraph) -> (AdjGraph, HashSet<(String, String)>) {
    if ag.nodes.is_empty() {
        return (AdjGraph::new(), HashSet::new());
    }

    let ordering = greedy_fas_ordering(ag);
    let position: HashMap<&str, usize> = ordering
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();

    let mut reversed_edges: HashSet<(String, String)> = HashSet::new();
    let mut dag = AdjGraph::new();
    for node_id in &ag.nodes {
        dag.add_node(node_id);
    }
    for (src, tgt) in &ag.edges {
        if src == tgt {
            continue;
        }
        let src_pos = position.get(src.as_str()).copied().unwrap_or(0);
        let tgt_pos = position.get(tgt.as_str()).copied().unwrap_or(0);
        if src_pos > tgt_pos {
            reversed_edges.insert((src.clone(), tgt.clone()));
            dag.add_edge(tgt, src);
        } else {
            dag.add_edge(src, tgt);
        }
    }

    (dag, reversed_edges)
}

// ─── Rank Assignment ─────────────────────────────────────────────────────────

/// Longest-path ranks: every edge spans at least one rank.
pub fn assign_ranks(dag: &AdjGraph) -> HashMap<String, usize> {
    let mut ranks: HashMap<String, usize> = dag.nodes.iter().map(|n| (n.clone(), 0)).collect();

    let mut changed = true;
    while changed {
        changed = false;
        for (src, tgt) in &dag.edges {
            let src_rank = ranks.get(src).copied().unwrap_or(0);
            let tgt_rank = ranks.entry(tgt.clone()).or_insert(0);
            if *tgt_rank < src_rank + 1 {
                *tgt_rank = src_rank + 1;
                changed = true;
            }
        }
    }
    ranks
}

// ─── Dummy Node Insertion ────────────────────────────────────────────────────

pub struct AugmentedGraph {
    pub ag: AdjGraph,
    pub ranks: HashMap<String, usize>,
    pub rank_count: usize,
}

/// Split every edge spanning more than one rank into unit segments.
pub fn insert_dummy_nodes(dag: &AdjGraph, ranks: HashMap<String, usize>) -> AugmentedGraph {
    let mut ag = AdjGraph::new();
    for node_id in &dag.nodes {
        ag.add_node(node_id);
    }

    let mut ranks = ranks;
    let mut edge_counter = 0usize;
    for (src_id, tgt_id) in &dag.edges {
        let src_rank = ranks.get(src_id).copied().unwrap_or(0);
        let tgt_rank = ranks.get(tgt_id).copied().unwrap_or(0);
        if tgt_rank <= src_rank + 1 {
            ag.add_edge(src_id, tgt_id);
            continue;
        }

        let mut chain_prev = src_id.clone();
        for step in 0..(tgt_rank - src_rank - 1) {
            let dummy_id = format!("{DUMMY_PREFIX}{edge_counter}_{step}");
            ag.add_node(&dummy_id);
            ranks.insert(dummy_id.clone(), src_rank + step + 1);
            ag.add_edge(&chain_prev, &dummy_id);
            chain_prev = dummy_id;
        }
        ag.add_edge(&chain_prev, tgt_id);
        edge_counter += 1;
    }

    let rank_count = ranks.values().copied().max().map_or(1, |m| m + 1);
    AugmentedGraph {
        ag,
        ranks,
        rank_count,
    }
}

// ─── Crossing Minimization ───────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Down,
    Up,
}

fn barycenter(node_id: &str, ag: &AdjGraph, neighbor_pos: &HashMap<&str, f64>, sweep: Sweep) -> f64 {
    let neighbors = match sweep {
        Sweep::Down => ag.predecessors_of(node_id),
        Sweep::Up => ag.successors_of(node_id),
    };
    let positions: Vec<f64> = neighbors
        .iter()
        .filter_map(|nb| neighbor_pos.get(nb.as_str()).copied())
        .collect();
    if positions.is_empty() {
        f64::INFINITY
    } else {
        positions.iter().sum::<f64>() / positions.len() as f64
    }
}

pub fn count_crossings(ordering: &[Vec<String>], ag: &AdjGraph) -> usize {
    let mut total = 0usize;
    for r_idx in 0..ordering.len().saturating_sub(1) {
        let tgt_pos: HashMap<&str, usize> = ordering[r_idx + 1]
            .iter()
            .enumerate()
            .map(|(i, nid)| (nid.as_str(), i))
            .collect();
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for (sp, src_id) in ordering[r_idx].iter().enumerate() {
            for nb in ag.successors_of(src_id) {
                if let Some(&tp) = tgt_pos.get(nb.as_str()) {
                    edges.push((sp, tp));
                }
            }
        }
        for i in 0..edges.len() {
            for j in (i + 1)..edges.len() {
                let (ei0, ei1) = edges[i];
                let (ej0, ej1) = edges[j];
                if (ei0 < ej0 && ei1 > ej1) || (ei0 > ej0 && ei1 < ej1) {
                    total += 1;
                }
            }
        }
    }
    total
}

/// Pull each group's members present in `rank` together, in group order,
/// at the slot of the first member.
pub fn enforce_groups(rank: &mut Vec<String>, groups: &[BranchGroup]) {
    for group in groups {
        let present: Vec<&String> = group.members.iter().filter(|m| rank.contains(m)).collect();
        if present.len() < 2 {
            continue;
        }
        let Some(anchor) = rank.iter().position(|id| present.contains(&id)) else {
            continue;
        };
        let members: Vec<String> = present.into_iter().cloned().collect();
        rank.retain(|id| !members.contains(id));
        for (offset, member) in members.into_iter().enumerate() {
            rank.insert(anchor + offset, member);
        }
    }
}

fn sort_rank(
    ordering: &mut [Vec<String>],
    rank_idx: usize,
    neighbor_idx: usize,
    ag: &AdjGraph,
    groups: &[BranchGroup],
    sweep: Sweep,
) {
    let neighbor_pos: HashMap<&str, f64> = ordering[neighbor_idx]
        .iter()
        .enumerate()
        .map(|(i, nid)| (nid.as_str(), i as f64))
        .collect();
    let mut keyed: Vec<(f64, String)> = ordering[rank_idx]
        .iter()
        .map(|id| (barycenter(id, ag, &neighbor_pos, sweep), id.clone()))
        .collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let mut sorted: Vec<String> = keyed.into_iter().map(|(_, id)| id).collect();
    enforce_groups(&mut sorted, groups);
    ordering[rank_idx] = sorted;
}

/// Order nodes within ranks, keeping the best ordering seen.
pub fn minimise_crossings(aug: &AugmentedGraph, groups: &[BranchGroup], max_passes: usize) -> Vec<Vec<String>> {
    let rank_count = aug.rank_count;
    let mut ordering: Vec<Vec<String>> = vec![Vec::new(); rank_count];
    for node_id in &aug.ag.nodes {
        let rank = aug.ranks.get(node_id).copied().unwrap_or(0);
        if rank < ordering.len() {
            ordering[rank].push(node_id.clone());
        }
    }
    for rank in &mut ordering {
        enforce_groups(rank, groups);
    }

    let mut best = ordering.clone();
    let mut best_crossings = count_crossings(&ordering, &aug.ag);

    for _pass in 0..max_passes {
        if best_crossings == 0 {
            break;
        }
        for rank_idx in 1..rank_count {
            sort_rank(&mut ordering, rank_idx, rank_idx - 1, &aug.ag, groups, Sweep::Down);
        }
        for rank_idx in (0..rank_count.saturating_sub(1)).rev() {
            sort_rank(&mut ordering, rank_idx, rank_idx + 1, &aug.ag, groups, Sweep::Up);
        }

        let crossings = count_crossings(&ordering, &aug.ag);
        if crossings >= best_crossings {
            break;
        }
        best_crossings = crossings;
        best = ordering.clone();
    }

    best
}

// ─── Coordinate Assignment ───────────────────────────────────────────────────

/// Place ranks left to right and stack each rank top to bottom, centring
/// every rank on a common horizontal axis. Missing sizes count as zero.
pub fn assign_coordinates(
    ordering: &[Vec<String>],
    sizes: &HashMap<String, (f64, f64)>,
    config: &LayoutConfig,
) -> Vec<LayoutNode> {
    let dims = |id: &str| sizes.get(id).copied().unwrap_or((0.0, 0.0));

    let rank_widths: Vec<f64> = ordering
        .iter()
        .map(|rank| rank.iter().map(|id| dims(id.as_str()).0).fold(0.0, f64::max))
        .collect();
    let rank_heights: Vec<f64> = ordering
        .iter()
        .map(|rank| {
            let sum: f64 = rank.iter().map(|id| dims(id.as_str()).1).sum();
            sum + rank.len().saturating_sub(1) as f64 * config.node_sep
        })
        .collect();
    let max_height = rank_heights.iter().copied().fold(0.0, f64::max);

    let mut nodes = Vec::new();
    let mut x = 0.0;
    for (rank_idx, rank) in ordering.iter().enumerate() {
        let mut y = (max_height - rank_heights[rank_idx]) / 2.0;
        for (order, id) in rank.iter().enumerate() {
            let (width, height) = dims(id.as_str());
            nodes.push(LayoutNode {
                id: id.clone(),
                rank: rank_idx,
                order,
                x: x + (rank_widths[rank_idx] - width) / 2.0,
                y,
                width,
                height,
            });
            y += height + config.node_sep;
        }
        x += rank_widths[rank_idx] + config.rank_sep;
    }
    nodes
}

#[cfg(test)]
#[path = "../../tests/rust/test_layout_sugiyama.rs"]
mod tests;
