//! Draft-level data structures for flow descriptions.
//!
//! These types represent a flow before synthesis: node kinds (`BlockKind`),
//! draft nodes/edges produced by the flowchart parser, and the structured
//! node/edge specs a backend can hand in directly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── BlockKind ───────────────────────────────────────────────────────────────

/// Closed set of node kinds the editor knows how to render.
///
/// Serialises to the editor's kebab-case type tag (`"if-else"`, `"llm"`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "end")]
    End,
    #[serde(rename = "answer")]
    Answer,
    #[serde(rename = "llm")]
    Llm,
    #[serde(rename = "knowledge-retrieval")]
    KnowledgeRetrieval,
    #[serde(rename = "question-classifier")]
    QuestionClassifier,
    #[serde(rename = "if-else")]
    IfElse,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "template-transform")]
    TemplateTransform,
    #[serde(rename = "http-request")]
    HttpRequest,
    #[serde(rename = "variable-assigner")]
    VariableAssigner,
    #[serde(rename = "variable-aggregator")]
    VariableAggregator,
    #[serde(rename = "assigner")]
    Assigner,
    #[serde(rename = "tool")]
    Tool,
    #[serde(rename = "parameter-extractor")]
    ParameterExtractor,
    #[serde(rename = "iteration")]
    Iteration,
    #[serde(rename = "iteration-start")]
    IterationStart,
    #[serde(rename = "loop")]
    Loop,
    #[serde(rename = "loop-start")]
    LoopStart,
    #[serde(rename = "loop-end")]
    LoopEnd,
    #[serde(rename = "document-extractor")]
    DocumentExtractor,
    #[serde(rename = "list-operator")]
    ListOperator,
    #[serde(rename = "agent")]
    Agent,
    #[serde(rename = "trigger-schedule")]
    TriggerSchedule,
    #[serde(rename = "trigger-webhook")]
    TriggerWebhook,
    #[serde(rename = "trigger-plugin")]
    TriggerPlugin,
}

impl BlockKind {
    pub const ALL: [BlockKind; 26] = [
        BlockKind::Start,
        BlockKind::End,
        BlockKind::Answer,
        BlockKind::Llm,
        BlockKind::KnowledgeRetrieval,
        BlockKind::QuestionClassifier,
        BlockKind::IfElse,
        BlockKind::Code,
        BlockKind::TemplateTransform,
        BlockKind::HttpRequest,
        BlockKind::VariableAssigner,
        BlockKind::VariableAggregator,
        BlockKind::Assigner,
        BlockKind::Tool,
        BlockKind::ParameterExtractor,
        BlockKind::Iteration,
        BlockKind::IterationStart,
        BlockKind::Loop,
        BlockKind::LoopStart,
        BlockKind::LoopEnd,
        BlockKind::DocumentExtractor,
        BlockKind::ListOperator,
        BlockKind::Agent,
        BlockKind::TriggerSchedule,
        BlockKind::TriggerWebhook,
        BlockKind::TriggerPlugin,
    ];

    /// The editor's type tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Start => "start",
            BlockKind::End => "end",
            BlockKind::Answer => "answer",
            BlockKind::Llm => "llm",
            BlockKind::KnowledgeRetrieval => "knowledge-retrieval",
            BlockKind::QuestionClassifier => "question-classifier",
            BlockKind::IfElse => "if-else",
            BlockKind::Code => "code",
            BlockKind::TemplateTransform => "template-transform",
            BlockKind::HttpRequest => "http-request",
            BlockKind::VariableAssigner => "variable-assigner",
            BlockKind::VariableAggregator => "variable-aggregator",
            BlockKind::Assigner => "assigner",
            BlockKind::Tool => "tool",
            BlockKind::ParameterExtractor => "parameter-extractor",
            BlockKind::Iteration => "iteration",
            BlockKind::IterationStart => "iteration-start",
            BlockKind::Loop => "loop",
            BlockKind::LoopStart => "loop-start",
            BlockKind::LoopEnd => "loop-end",
            BlockKind::DocumentExtractor => "document-extractor",
            BlockKind::ListOperator => "list-operator",
            BlockKind::Agent => "agent",
            BlockKind::TriggerSchedule => "trigger-schedule",
            BlockKind::TriggerWebhook => "trigger-webhook",
            BlockKind::TriggerPlugin => "trigger-plugin",
        }
    }

    /// Exact (un-normalised) tag lookup.
    pub fn from_tag(tag: &str) -> Option<BlockKind> {
        BlockKind::ALL.iter().copied().find(|k| k.as_str() == tag)
    }

    /// Human title shown in the node picker.
    pub fn default_title(self) -> &'static str {
        match self {
            BlockKind::Start => "Start",
            BlockKind::End => "End",
            BlockKind::Answer => "Answer",
            BlockKind::Llm => "LLM",
            BlockKind::KnowledgeRetrieval => "Knowledge Retrieval",
            BlockKind::QuestionClassifier => "Question Classifier",
            BlockKind::IfElse => "IF/ELSE",
            BlockKind::Code => "Code",
            BlockKind::TemplateTransform => "Template",
            BlockKind::HttpRequest => "HTTP Request",
            BlockKind::VariableAssigner => "Variable Assigner",
            BlockKind::VariableAggregator => "Variable Aggregator",
            BlockKind::Assigner => "Assigner",
            BlockKind::Tool => "Tool",
            BlockKind::ParameterExtractor => "Parameter Extractor",
            BlockKind::Iteration => "Iteration",
            BlockKind::IterationStart => "Iteration Start",
            BlockKind::Loop => "Loop",
            BlockKind::LoopStart => "Loop Start",
            BlockKind::LoopEnd => "Exit Loop",
            BlockKind::DocumentExtractor => "Doc Extractor",
            BlockKind::ListOperator => "List Operator",
            BlockKind::Agent => "Agent",
            BlockKind::TriggerSchedule => "Schedule Trigger",
            BlockKind::TriggerWebhook => "Webhook Trigger",
            BlockKind::TriggerPlugin => "Plugin Trigger",
        }
    }

    pub fn is_trigger(self) -> bool {
        matches!(
            self,
            BlockKind::TriggerSchedule | BlockKind::TriggerWebhook | BlockKind::TriggerPlugin
        )
    }

    /// Entry nodes start a run: the Start node or any trigger.
    pub fn is_entry(self) -> bool {
        self == BlockKind::Start || self.is_trigger()
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Position ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ─── DraftNode ───────────────────────────────────────────────────────────────

/// A node as described by the flowchart or a backend spec, before it has a
/// real id or merged defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DraftNode {
    /// Author-chosen identifier (e.g. "A", "fetch_weather").
    pub id: String,
    /// Absent only while the parser has seen a bare reference but no declaration.
    pub kind: Option<BlockKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Normalised tool lookup key, set for `Tool` nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_key: Option<String>,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl DraftNode {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Create a bare reference (id only, kind not yet known).
    pub fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

// ─── DraftEdge ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DraftEdge {
    pub source_id: String,
    pub target_id: String,
    /// Branch label from `-->|label|` (meaningful on If/Else sources only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl DraftEdge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

// ─── DraftGraph ──────────────────────────────────────────────────────────────

/// Parser output: every node has a resolved kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DraftGraph {
    pub nodes: Vec<DraftNode>,
    pub edges: Vec<DraftEdge>,
}

impl DraftGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&DraftNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

// ─── Backend specs ───────────────────────────────────────────────────────────

/// Structured node proposal (bypasses the flowchart parser).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    /// Free-form kind name, resolved through the kind lookup table.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: Value) -> Self {
        if let Value::Object(map) = config {
            self.config = Some(map);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub source: String,
    pub target: String,
    #[serde(default, alias = "sourceHandle", skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, alias = "targetHandle", skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EdgeSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }
}

impl From<&EdgeSpec> for DraftEdge {
    fn from(spec: &EdgeSpec) -> Self {
        DraftEdge {
            source_id: spec.source.clone(),
            target_id: spec.target.clone(),
            label: spec.label.clone(),
            source_handle: spec.source_handle.clone(),
            target_handle: spec.target_handle.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_syntax_types.rs"]
mod tests;
