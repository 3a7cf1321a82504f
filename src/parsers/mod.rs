//! Flow description parsing.

pub mod base;
pub mod flowchart;

pub use base::{Parser, normalize_branch_label};
pub use flowchart::FlowchartParser;

use crate::catalog::{KindLookup, ToolLookup};
use crate::error::ParseError;
use crate::syntax::types::DraftGraph;

/// Parse a flowchart (optionally fenced) into a draft graph.
pub fn parse(src: &str, kinds: &KindLookup, tools: &ToolLookup) -> Result<DraftGraph, ParseError> {
    FlowchartParser::new(kinds, tools).parse(src)
}
