//! Flowchart parser: lines → statements → typed draft graph.
//!
//! Parsing runs in three passes so a bare reference may appear before the
//! declaration that gives it a type:
//!
//! 1. tokenize every line into a `Statement` (`invalidMermaid` on a broken
//!    edge line),
//! 2. register nodes in order of first appearance and apply every labelled
//!    declaration (type and tool resolution),
//! 3. check that bare references were declared somewhere and that edge
//!    labels make sense for their source.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::{KindLookup, ToolLookup, normalize_key};
use crate::error::{ParseError, ParseErrorKind};
use crate::syntax::types::{BlockKind, DraftEdge, DraftGraph, DraftNode};

use super::base::{
    Cursor, EDGE_ARROW, Parser, Statement, clean_lines, extract_code, is_header,
    is_ignored_statement, normalize_branch_label, parse_label,
};

/// Parser for the compact flowchart language, bound to the caller's catalogs.
pub struct FlowchartParser<'a> {
    pub kinds: &'a KindLookup,
    pub tools: &'a ToolLookup,
}

impl<'a> FlowchartParser<'a> {
    pub fn new(kinds: &'a KindLookup, tools: &'a ToolLookup) -> Self {
        Self { kinds, tools }
    }

    fn tokenize(&self, code: &str) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        for line in clean_lines(code) {
            if is_header(line) || is_ignored_statement(line) {
                continue;
            }
            match Cursor::new(line).parse_statement() {
                Some(stmt) => statements.push(stmt),
                None if line.contains(EDGE_ARROW) => {
                    return Err(ParseError::new(ParseErrorKind::InvalidMermaid, line));
                }
                None => debug!(line, "skipping unrecognised flowchart line"),
            }
        }
        Ok(statements)
    }

    /// Resolve a declaration label into a typed draft node.
    fn declare(&self, id: &str, label: &str) -> Result<DraftNode, ParseError> {
        let info = parse_label(label);
        let Some(type_name) = info.node_type() else {
            return Err(ParseError::new(ParseErrorKind::MissingNodeType, label));
        };
        let Some(kind) = self.kinds.resolve(type_name) else {
            return Err(ParseError::new(ParseErrorKind::UnknownNodeType, type_name));
        };

        let mut node = DraftNode::new(id, kind);
        node.title = info.title().map(str::to_string);

        if kind == BlockKind::Tool {
            let Some(tool) = info.tool() else {
                return Err(ParseError::new(ParseErrorKind::UnknownTool, "tool"));
            };
            let key = normalize_key(tool);
            if self.tools.get(&key).is_none() {
                return Err(ParseError::new(ParseErrorKind::UnknownTool, tool));
            }
            node.tool_key = Some(key);
        }
        Ok(node)
    }
}

impl Parser for FlowchartParser<'_> {
    fn parse(&self, src: &str) -> Result<DraftGraph, ParseError> {
        let statements = self.tokenize(extract_code(src))?;

        // Pass 2: first-appearance order, later declarations override.
        let mut nodes: Vec<DraftNode> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for stmt in &statements {
            for node_ref in &stmt.refs {
                let idx = *index.entry(node_ref.id.clone()).or_insert_with(|| {
                    nodes.push(DraftNode::bare(node_ref.id.clone()));
                    nodes.len() - 1
                });
                if let Some(label) = &node_ref.label {
                    nodes[idx] = self.declare(&node_ref.id, label)?;
                }
            }
        }

        // Pass 3: references.
        let kind_of = |id: &str| index.get(id).and_then(|&i| nodes[i].kind);
        let mut edges = Vec::new();
        for stmt in &statements {
            for edge in &stmt.edges {
                for endpoint in [&edge.source, &edge.target] {
                    if kind_of(endpoint.as_str()).is_none() {
                        return Err(ParseError::new(ParseErrorKind::UnknownNodeId, endpoint.as_str()));
                    }
                }
                let mut draft = DraftEdge::new(edge.source.clone(), edge.target.clone());
                draft.label = edge.label.clone();
                edges.push(draft);
            }
        }
        if let Some(undeclared) = nodes.iter().find(|n| n.kind.is_none()) {
            return Err(ParseError::new(
                ParseErrorKind::MissingNodeDefinition,
                undeclared.id.as_str(),
            ));
        }
        if nodes.is_empty() {
            return Err(ParseError::new(ParseErrorKind::InvalidMermaid, ""));
        }

        for edge in &edges {
            let Some(label) = &edge.label else { continue };
            let branch_ok = kind_of(edge.source_id.as_str()) == Some(BlockKind::IfElse)
                && normalize_branch_label(label).is_some();
            if !branch_ok {
                return Err(ParseError::new(ParseErrorKind::UnsupportedEdgeLabel, label.as_str()));
            }
        }

        Ok(DraftGraph { nodes, edges })
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_parsers_flowchart.rs"]
mod tests;
