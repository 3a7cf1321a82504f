//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Spacing constants for the layered layout and its grid fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width assumed for nodes that carry no measured width.
    pub node_width: f64,
    pub node_height: f64,
    /// Horizontal gap between ranks.
    pub rank_sep: f64,
    /// Vertical gap between nodes of one rank.
    pub node_sep: f64,
    /// Gap between existing content and a newly placed sub-graph; also the
    /// grid fallback's column pitch.
    pub x_offset: f64,
    pub grid_columns: usize,
    /// Graphs above this many layout nodes (dummies included) use the grid.
    pub max_nodes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 240.0,
            node_height: 90.0,
            rank_sep: 60.0,
            node_sep: 40.0,
            x_offset: 300.0,
            grid_columns: 4,
            max_nodes: 2000,
        }
    }
}

impl LayoutConfig {
    /// Row pitch used by the grid fallback.
    pub fn grid_row_height(&self) -> f64 {
        (self.x_offset / 2.0).max(120.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
