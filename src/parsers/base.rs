//! Parser trait definition and shared Cursor tokenizer.
//!
//! The cursor works one line at a time: a flowchart statement never spans
//! lines, so line boundaries double as statement boundaries.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;
use crate::syntax::types::DraftGraph;

// ─── Parser trait ────────────────────────────────────────────────────────────

/// Trait for flow description parsers.
pub trait Parser {
    /// Parse the input source string into a draft graph.
    fn parse(&self, src: &str) -> Result<DraftGraph, ParseError>;
}

// ─── Source preprocessing ────────────────────────────────────────────────────

/// The only connector the flow language understands.
pub const EDGE_ARROW: &str = "-->";

/// Statements Mermaid accepts but that carry no flow semantics.
pub const IGNORED_KEYWORDS: &[&str] = &[
    "style",
    "classDef",
    "class",
    "linkStyle",
    "click",
    "subgraph",
    "end",
    "direction",
];

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```(?:mermaid)?\s*(.*?)```").expect("fenced block pattern")
});

/// Body of the first fenced code block, or the whole text when unfenced.
pub fn extract_code(raw: &str) -> &str {
    FENCED_BLOCK
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or(raw, |m| m.as_str())
        .trim()
}

/// Split into trimmed, comment-free, non-empty lines.
pub fn clean_lines(code: &str) -> Vec<&str> {
    code.lines()
        .map(|line| match line.find("%%") {
            Some(idx) => &line[..idx],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn first_word(line: &str) -> &str {
    line.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .next()
        .unwrap_or("")
}

/// `flowchart LR` / `graph TD` header lines.
pub fn is_header(line: &str) -> bool {
    let word = first_word(line).to_ascii_lowercase();
    word == "flowchart" || word == "graph"
}

/// Styling and grouping statements that are skipped without error.
///
/// A keyword used as a node id with a label (`end[type=end]`) is a
/// declaration, not a statement to skip.
pub fn is_ignored_statement(line: &str) -> bool {
    if line.contains(EDGE_ARROW) || !IGNORED_KEYWORDS.contains(&first_word(line)) {
        return false;
    }
    match Cursor::new(line).parse_statement() {
        Some(stmt) => stmt.refs.iter().all(|r| r.label.is_none()),
        None => true,
    }
}

// ─── Node labels ─────────────────────────────────────────────────────────────

/// Flat property map parsed from a node label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelInfo {
    pub props: BTreeMap<String, String>,
}

impl LabelInfo {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.props
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn node_type(&self) -> Option<&str> {
        self.get("type")
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn tool(&self) -> Option<&str> {
        self.get("tool")
    }
}

/// Parse `type=llm|title=Summarize` style label content.
///
/// A single bare token is looked up in the alias table; on a hit it becomes
/// the title and the alias supplies the type, otherwise the token itself is
/// taken as the type.
pub fn parse_label(label: &str) -> LabelInfo {
    let tokens: Vec<&str> = label
        .split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    let mut info = LabelInfo::default();

    for token in &tokens {
        if let Some((key, value)) = token.split_once('=') {
            let key = key.trim().to_lowercase();
            if !key.is_empty() {
                info.props.insert(key, value.trim().to_string());
            }
        }
    }

    if info.node_type().is_none() && tokens.len() == 1 && !tokens[0].contains('=') {
        let token = tokens[0];
        match crate::catalog::alias_for(token) {
            Some(tag) => {
                info.props.insert("type".into(), tag.to_string());
                info.props.insert("title".into(), token.to_string());
            }
            None => {
                info.props.insert("type".into(), token.to_string());
            }
        }
    }

    if info.tool().is_none() {
        if let Some(key) = info.get("tool_key").map(str::to_string) {
            info.props.insert("tool".into(), key);
        }
    }
    info
}

/// Canonical branch of an If/Else edge label: `"true"`, `"false"`, or `None`.
pub fn normalize_branch_label(label: &str) -> Option<&'static str> {
    match label.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some("true"),
        "false" | "no" | "n" | "0" => Some("false"),
        _ => None,
    }
}

// ─── Statements ──────────────────────────────────────────────────────────────

/// `ID` optionally followed by `[label]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub id: String,
    pub label: Option<String>,
}

impl NodeRef {
    pub fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRef {
    pub source: String,
    pub target: String,
    pub label: Option<String>,
}

/// One fully parsed line: either a lone node reference or an edge chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub refs: Vec<NodeRef>,
    pub edges: Vec<EdgeRef>,
}

// ─── Cursor (stateful tokenizer) ─────────────────────────────────────────────

/// Stateful parser cursor over one line.
pub struct Cursor {
    pub src: Vec<char>,
    pub pos: usize,
}

impl Cursor {
    pub fn new(src: &str) -> Self {
        Self {
            src: src.chars().collect(),
            pos: 0,
        }
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Peek whether the next chars match the given string.
    pub fn peek(&self, s: &str) -> bool {
        let chars: Vec<char> = s.chars().collect();
        if self.pos + chars.len() > self.src.len() {
            return false;
        }
        self.src[self.pos..self.pos + chars.len()] == chars[..]
    }

    /// Consume `s` if it matches; returns true if consumed.
    pub fn consume(&mut self, s: &str) -> bool {
        if self.peek(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    /// Skip spaces and tabs.
    pub fn skip_ws(&mut self) {
        while self.pos < self.src.len() && (self.src[self.pos] == ' ' || self.src[self.pos] == '\t')
        {
            self.pos += 1;
        }
    }

    /// Match a node identifier: `[a-zA-Z_][a-zA-Z0-9_-]*`, stopping before an
    /// arrow so `A-->B` splits correctly.
    pub fn match_node_id(&mut self) -> Option<String> {
        if self.pos >= self.src.len() {
            return None;
        }
        let ch = self.src[self.pos];
        if !ch.is_ascii_alphabetic() && ch != '_' {
            return None;
        }
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.src.len() {
            let c = self.src[self.pos];
            if c == '-' && self.peek(EDGE_ARROW) {
                break;
            }
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Some(self.src[start..self.pos].iter().collect())
    }

    /// Parse a double-quoted string, handling `\n`, `\"`, `\\` escapes.
    pub fn parse_quoted_string(&mut self) -> String {
        // Caller must have verified src[pos] == '"'
        self.pos += 1;
        let mut buf = String::new();
        while self.pos < self.src.len() {
            let ch = self.src[self.pos];
            if ch == '"' {
                self.pos += 1;
                break;
            }
            if ch == '\\' && self.pos + 1 < self.src.len() {
                let nxt = self.src[self.pos + 1];
                match nxt {
                    'n' => buf.push('\n'),
                    other => buf.push(other),
                }
                self.pos += 2;
            } else {
                buf.push(ch);
                self.pos += 1;
            }
        }
        buf
    }

    /// Parse `[label]` or `["label"]`. The bracket must close and the label
    /// must be non-empty.
    pub fn parse_bracket_label(&mut self) -> Option<String> {
        let saved = self.pos;
        if !self.consume("[") {
            return None;
        }
        self.skip_ws();
        let label = if self.peek("\"") {
            let quoted = self.parse_quoted_string();
            self.skip_ws();
            quoted
        } else {
            let start = self.pos;
            while self.pos < self.src.len() && self.src[self.pos] != ']' {
                self.pos += 1;
            }
            self.src[start..self.pos].iter().collect::<String>()
        };
        let label = label.trim().to_string();
        if !self.consume("]") || label.is_empty() {
            self.pos = saved;
            return None;
        }
        Some(label)
    }

    /// Parse a node reference (id + optional label bracket).
    pub fn parse_node_ref(&mut self) -> Option<NodeRef> {
        self.skip_ws();
        let saved = self.pos;
        let id = self.match_node_id()?;
        self.skip_ws();
        if self.peek("[") {
            let Some(label) = self.parse_bracket_label() else {
                self.pos = saved;
                return None;
            };
            return Some(NodeRef {
                id,
                label: Some(label),
            });
        }
        Some(NodeRef::bare(id))
    }

    /// Try to parse the arrow connector.
    pub fn parse_edge_connector(&mut self) -> bool {
        self.skip_ws();
        self.consume(EDGE_ARROW)
    }

    /// Try to parse an edge label `|text|`. Empty text counts as no label.
    pub fn try_parse_edge_label(&mut self) -> Option<String> {
        self.skip_ws();
        let saved = self.pos;
        if !self.consume("|") {
            return None;
        }
        let start = self.pos;
        while self.pos < self.src.len() && self.src[self.pos] != '|' {
            self.pos += 1;
        }
        let text: String = self.src[start..self.pos].iter().collect();
        if !self.consume("|") {
            self.pos = saved;
            return None;
        }
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Parse an edge chain: `--> [|label|] target [--> [|label|] target ...]`.
    pub fn parse_edge_chain(&mut self) -> Vec<(Option<String>, NodeRef)> {
        let mut segments = Vec::new();
        loop {
            let saved = self.pos;
            if !self.parse_edge_connector() {
                self.pos = saved;
                break;
            }
            let label = self.try_parse_edge_label();
            let Some(node) = self.parse_node_ref() else {
                self.pos = saved;
                break;
            };
            segments.push((label, node));
        }
        segments
    }

    /// Parse the whole line as one statement. Returns None unless every
    /// character is accounted for (a trailing `;` is allowed).
    pub fn parse_statement(&mut self) -> Option<Statement> {
        let source = self.parse_node_ref()?;
        let segments = self.parse_edge_chain();
        self.skip_ws();
        self.consume(";");
        self.skip_ws();
        if !self.eof() {
            return None;
        }

        let mut refs = vec![source];
        let mut edges = Vec::with_capacity(segments.len());
        for (label, target) in segments {
            let prev = &refs[refs.len() - 1];
            edges.push(EdgeRef {
                source: prev.id.clone(),
                target: target.id.clone(),
                label,
            });
            refs.push(target);
        }
        Some(Statement { refs, edges })
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_parsers_base.rs"]
mod tests;
