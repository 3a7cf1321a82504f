//! Layered left-to-right layout for newly synthesized nodes.
//!
//! `layout()` never fails: when the layered layout cannot run it falls back
//! to a fixed grid right of the existing canvas.

pub mod branches;
pub mod sugiyama;
pub mod types;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::graph::types::{ResolvedEdge, ResolvedNode};
use crate::syntax::types::Position;

pub use types::{BranchGroup, ExistingBounds, LayoutNode, is_virtual};

const MAX_CROSSING_PASSES: usize = 24;

/// Run the layered layout in local coordinates (origin at 0,0).
/// Only real nodes are returned.
pub fn layered_layout(
    nodes: &[ResolvedNode],
    edges: &[ResolvedEdge],
    config: &LayoutConfig,
) -> Result<Vec<LayoutNode>, LayoutError> {
    let (ag, groups) = branches::build_layout_graph(nodes, edges)?;
    if ag.node_count() > config.max_nodes {
        return Err(LayoutError::TooLarge {
            nodes: ag.node_count(),
            limit: config.max_nodes,
        });
    }

    let (dag, reversed) = sugiyama::remove_cycles(&ag);
    if !reversed.is_empty() {
        debug!(count = reversed.len(), "reversed back-edges for layering");
    }
    let ranks = sugiyama::assign_ranks(&dag);
    let aug = sugiyama::insert_dummy_nodes(&dag, ranks);
    if aug.ag.node_count() > config.max_nodes {
        return Err(LayoutError::TooLarge {
            nodes: aug.ag.node_count(),
            limit: config.max_nodes,
        });
    }

    let ordering = sugiyama::minimise_crossings(&aug, &groups, MAX_CROSSING_PASSES);

    let sizes: HashMap<String, (f64, f64)> = nodes
        .iter()
        .map(|n| {
            let size = (
                n.width.unwrap_or(config.node_width),
                n.height.unwrap_or(config.node_height),
            );
            (n.id.clone(), size)
        })
        .collect();

    let placed = sugiyama::assign_coordinates(&ordering, &sizes, config);
    Ok(placed.into_iter().filter(|n| !is_virtual(&n.id)).collect())
}

/// Shift local layout output right of the existing canvas, aligning the
/// first rank's mean centre with the existing nodes' mean centre.
fn place(local: &[LayoutNode], bounds: &ExistingBounds, config: &LayoutConfig) -> HashMap<String, Position> {
    let origin_x = bounds.origin_x(config.x_offset);
    let shift_y = if bounds.is_empty() {
        0.0
    } else {
        let first_rank = local.iter().map(|n| n.rank).min().unwrap_or(0);
        let centres: Vec<f64> = local
            .iter()
            .filter(|n| n.rank == first_rank)
            .map(LayoutNode::center_y)
            .collect();
        if centres.is_empty() {
            0.0
        } else {
            bounds.avg_center_y - centres.iter().sum::<f64>() / centres.len() as f64
        }
    };

    local
        .iter()
        .map(|n| (n.id.clone(), Position::new(origin_x + n.x, n.y + shift_y)))
        .collect()
}

/// Fixed grid: `grid_columns` per row, starting right of existing content.
pub fn grid_layout(nodes: &[ResolvedNode], bounds: &ExistingBounds, config: &LayoutConfig) -> HashMap<String, Position> {
    let origin_x = bounds.origin_x(config.x_offset);
    let origin_y = bounds.origin_y();
    let columns = config.grid_columns.max(1);
    let row_height = config.grid_row_height();

    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let row = (i / columns) as f64;
            let col = (i % columns) as f64;
            let pos = Position::new(origin_x + col * config.x_offset, origin_y + row * row_height);
            (n.id.clone(), pos)
        })
        .collect()
}

/// Compute positions for `nodes`, placed right of `bounds`.
///
/// Every edge endpoint must be among `nodes`; otherwise, or when the graph
/// exceeds `max_nodes`, the grid fallback is used.
pub fn layout(
    nodes: &[ResolvedNode],
    edges: &[ResolvedEdge],
    bounds: &ExistingBounds,
    config: &LayoutConfig,
) -> HashMap<String, Position> {
    if nodes.is_empty() {
        return HashMap::new();
    }
    match layered_layout(nodes, edges, config) {
        Ok(local) => place(&local, bounds, config),
        Err(err) => {
            warn!(error = %err, "layered layout failed, falling back to grid");
            grid_layout(nodes, bounds, config)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_layout.rs"]
mod tests;
