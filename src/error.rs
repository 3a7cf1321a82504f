//! Error types for each stage of the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of flowchart parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParseErrorKind {
    InvalidMermaid,
    MissingNodeType,
    UnknownNodeType,
    UnknownTool,
    MissingNodeDefinition,
    UnknownNodeId,
    UnsupportedEdgeLabel,
}

impl ParseErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseErrorKind::InvalidMermaid => "invalidMermaid",
            ParseErrorKind::MissingNodeType => "missingNodeType",
            ParseErrorKind::UnknownNodeType => "unknownNodeType",
            ParseErrorKind::UnknownTool => "unknownTool",
            ParseErrorKind::MissingNodeDefinition => "missingNodeDefinition",
            ParseErrorKind::UnknownNodeId => "unknownNodeId",
            ParseErrorKind::UnsupportedEdgeLabel => "unsupportedEdgeLabel",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parse failure with the offending token or line as `detail`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {detail}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub detail: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// No node survived kind resolution.
    #[error("invalid flowchart: no node could be resolved")]
    EmptyResult,
}

/// Raised inside the layered layout; always absorbed by the grid fallback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("layout graph too large: {nodes} nodes exceeds limit {limit}")]
    TooLarge { nodes: usize, limit: usize },
    #[error("layout references unknown node '{0}'")]
    MissingNode(String),
}

/// Error surfaced by the CLI and WASM front ends.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Synth(#[from] SynthError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
