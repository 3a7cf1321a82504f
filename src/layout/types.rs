//! Layout types: LayoutNode, BranchGroup, ExistingBounds.

use crate::graph::types::ResolvedNode;

// ─── Constants ────────────────────────────────────────────────────────────────

/// Prefix of dummies that break long edges into unit-rank segments.
pub const DUMMY_PREFIX: &str = "__dummy_";
/// Prefix of the per-edge dummies spliced after a branching node.
pub const BRANCH_PREFIX: &str = "__branch_";
/// Prefix of the virtual parent grouping one node's branch dummies.
pub const COMPOUND_PREFIX: &str = "__sg_";

/// Whether `id` names a layout-only node.
pub fn is_virtual(id: &str) -> bool {
    id.starts_with(DUMMY_PREFIX) || id.starts_with(BRANCH_PREFIX) || id.starts_with(COMPOUND_PREFIX)
}

// ─── LayoutNode ───────────────────────────────────────────────────────────────

/// A node with computed rank, order, position and size (local coordinates).
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub rank: usize,
    pub order: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutNode {
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

// ─── BranchGroup ─────────────────────────────────────────────────────────────

/// Virtual parent holding the dummies of one branching node, already sorted
/// into declared branch order. Members must stay contiguous and in this
/// order within their rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchGroup {
    pub id: String,
    pub source: String,
    pub members: Vec<String>,
}

// ─── ExistingBounds ──────────────────────────────────────────────────────────

/// Summary of the canvas a new sub-graph is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExistingBounds {
    pub node_count: usize,
    /// Right edge of the right-most node.
    pub max_x: f64,
    pub min_y: f64,
    /// Mean vertical centre of all nodes.
    pub avg_center_y: f64,
}

impl ExistingBounds {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bounds of `nodes`; sizes default to the given node size.
    pub fn from_nodes(nodes: &[ResolvedNode], default_width: f64, default_height: f64) -> Self {
        if nodes.is_empty() {
            return Self::empty();
        }
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut center_sum = 0.0;
        for node in nodes {
            let width = node.width.unwrap_or(default_width);
            let height = node.height.unwrap_or(default_height);
            max_x = max_x.max(node.position.x + width);
            min_y = min_y.min(node.position.y);
            center_sum += node.position.y + height / 2.0;
        }
        Self {
            node_count: nodes.len(),
            max_x,
            min_y,
            avg_center_y: center_sum / nodes.len() as f64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Left edge for newly placed content.
    pub fn origin_x(&self, x_offset: f64) -> f64 {
        if self.is_empty() { 0.0 } else { self.max_x + x_offset }
    }

    /// Top edge for grid-placed content.
    pub fn origin_y(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.min_y }
    }
}
