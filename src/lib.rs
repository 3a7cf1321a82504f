//! flow-synth: flowchart-to-workflow synthesis, validation and layout.
//!
//! Public API: the free functions re-exported below and the [`Engine`]
//! facade, which bundles the caller's catalogs and configuration.
//!
//! Pipeline: text → `parse` → [`DraftGraph`] → `synthesize_draft` →
//! [`FlowGraph`] (ids minted, configs defaulted and repaired, references
//! rewritten, new nodes positioned). The validators run on any graph.

pub mod catalog;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod parsers;
pub mod synth;
pub mod syntax;

#[cfg(feature = "wasm")]
mod wasm;

use serde::{Deserialize, Serialize};

pub use catalog::{KindLookup, Lookups, ModelRef};
pub use catalog::tools::{ToolDescriptor, ToolLookup};
pub use config::{EngineConfig, LayoutConfig};
pub use error::{Error, LayoutError, ParseError, ParseErrorKind, Result, SynthError};
pub use graph::{ConnectivityVerdict, ConvergenceVerdict, FlowGraph, ResolvedEdge, ResolvedNode};
pub use graph::{validate_connectivity, validate_convergence};
pub use layout::{ExistingBounds, layout};
pub use parsers::parse;
pub use synth::{synthesize_draft, synthesize_specs};
pub use syntax::types::{BlockKind, DraftEdge, DraftGraph, DraftNode, EdgeSpec, NodeSpec, Position};

/// Both graph invariants for one graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphReport {
    pub connectivity: ConnectivityVerdict,
    pub convergence: ConvergenceVerdict,
}

impl GraphReport {
    pub fn is_valid(&self) -> bool {
        self.connectivity.is_valid && self.convergence.is_valid
    }
}

/// Catalogs plus configuration; every call is independent.
#[derive(Debug, Clone)]
pub struct Engine {
    pub lookups: Lookups,
    pub config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Lookups::builtin(), EngineConfig::default())
    }
}

impl Engine {
    pub fn new(lookups: Lookups, config: EngineConfig) -> Self {
        Self { lookups, config }
    }

    pub fn parse(&self, text: &str) -> Result<DraftGraph, ParseError> {
        parse(text, &self.lookups.kinds, &self.lookups.tools)
    }

    /// Parse flowchart text and synthesize it onto `existing`.
    pub fn synthesize_flowchart(&self, text: &str, existing: &FlowGraph) -> Result<FlowGraph, SynthError> {
        let draft = self.parse(text)?;
        synthesize_draft(&draft, existing, &self.lookups, &self.config)
    }

    pub fn synthesize_draft(&self, draft: &DraftGraph, existing: &FlowGraph) -> Result<FlowGraph, SynthError> {
        synthesize_draft(draft, existing, &self.lookups, &self.config)
    }

    pub fn synthesize_specs(
        &self,
        nodes: &[NodeSpec],
        edges: &[EdgeSpec],
        existing: &FlowGraph,
    ) -> Result<FlowGraph, SynthError> {
        synthesize_specs(nodes, edges, existing, &self.lookups, &self.config)
    }

    pub fn validate(&self, graph: &FlowGraph) -> GraphReport {
        GraphReport {
            connectivity: validate_connectivity(&graph.nodes, &graph.edges),
            convergence: validate_convergence(&graph.nodes, &graph.edges),
        }
    }

    /// Re-run the layout over every node of `graph`, as if placed on an
    /// empty canvas.
    pub fn relayout(&self, graph: &FlowGraph) -> FlowGraph {
        let positions = layout(&graph.nodes, &graph.edges, &ExistingBounds::empty(), &self.config.layout);
        let mut out = graph.clone();
        for node in &mut out.nodes {
            if let Some(pos) = positions.get(&node.id) {
                node.position = *pos;
            }
        }
        out
    }
}
