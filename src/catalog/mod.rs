//! Lookup tables the engine consults: node kinds, tools, default templates.
//!
//! Everything here is plain data handed in by the caller. Nothing is global,
//! so tests can fabricate catalogs freely.

pub mod templates;
pub mod tools;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::syntax::types::BlockKind;

pub use templates::{DefaultTemplates, NodeTemplate};
pub use tools::{ToolDescriptor, ToolLookup, ToolParameter};

// ─── Key normalisation ───────────────────────────────────────────────────────

/// Fold a free-form name into a lookup key: strip diacritics, lowercase, keep
/// letters and digits only. `"If/Else"` → `"ifelse"`.
pub fn normalize_key(value: &str) -> String {
    value
        .trim()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

// ─── Bare-label aliases ──────────────────────────────────────────────────────

/// Words a flowchart author may use as a bare node label instead of `type=...`.
/// Matched case-insensitively against the whole label.
pub const NODE_TYPE_ALIASES: &[(&str, &str)] = &[
    ("start", "start"),
    ("begin", "start"),
    ("input", "start"),
    ("end", "end"),
    ("finish", "end"),
    ("output", "end"),
    ("answer", "answer"),
    ("reply", "answer"),
    ("llm", "llm"),
    ("ai", "llm"),
    ("model", "llm"),
    ("condition", "if-else"),
    ("if", "if-else"),
    ("if/else", "if-else"),
    ("branch", "if-else"),
    ("decision", "if-else"),
    ("code", "code"),
    ("script", "code"),
    ("http", "http-request"),
    ("api", "http-request"),
    ("request", "http-request"),
    ("template", "template-transform"),
    ("knowledge", "knowledge-retrieval"),
    ("retrieval", "knowledge-retrieval"),
    ("classifier", "question-classifier"),
    ("classify", "question-classifier"),
    ("extractor", "parameter-extractor"),
    ("aggregator", "variable-aggregator"),
    ("merge", "variable-aggregator"),
    ("iteration", "iteration"),
    ("foreach", "iteration"),
    ("loop", "loop"),
    ("agent", "agent"),
    ("schedule", "trigger-schedule"),
    ("cron", "trigger-schedule"),
    ("webhook", "trigger-webhook"),
];

/// Look up a bare label in the alias table.
pub fn alias_for(label: &str) -> Option<&'static str> {
    let lower = label.trim().to_lowercase();
    NODE_TYPE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, tag)| *tag)
}

// ─── KindLookup ──────────────────────────────────────────────────────────────

/// Normalised name → `BlockKind`, restricted to what the current editor
/// build offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindLookup {
    entries: HashMap<String, BlockKind>,
}

impl KindLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every known kind, keyed by tag and default title.
    pub fn builtin() -> Self {
        Self::from_kinds(BlockKind::ALL)
    }

    /// A table offering only `kinds`, keyed by tag and default title.
    pub fn from_kinds(kinds: impl IntoIterator<Item = BlockKind>) -> Self {
        let mut lookup = Self::new();
        let kinds: Vec<BlockKind> = kinds.into_iter().collect();
        // Titles first so an exact tag always wins a collision.
        for kind in &kinds {
            lookup.insert(kind.default_title(), *kind);
        }
        for kind in kinds {
            lookup.insert(kind.as_str(), kind);
            if kind == BlockKind::IfElse {
                lookup.insert("ifelse", kind);
                lookup.insert("ifelsecase", kind);
            }
        }
        lookup
    }

    /// Register `name` (normalised) as a spelling of `kind`.
    pub fn insert(&mut self, name: &str, kind: BlockKind) {
        let key = normalize_key(name);
        if !key.is_empty() {
            self.entries.insert(key, kind);
        }
    }

    pub fn resolve(&self, name: &str) -> Option<BlockKind> {
        self.entries.get(&normalize_key(name)).copied()
    }

    /// Whether `kind` is offered at all.
    pub fn contains(&self, kind: BlockKind) -> bool {
        self.entries.values().any(|k| *k == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Lookups bundle ──────────────────────────────────────────────────────────

/// The model the user actually has configured; replaces model blocks a
/// generator made up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRef {
    pub provider: String,
    pub name: String,
}

/// All caller-supplied catalogs, threaded into every entry point.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub kinds: KindLookup,
    pub tools: ToolLookup,
    pub templates: DefaultTemplates,
    pub default_model: Option<ModelRef>,
}

impl Lookups {
    /// Built-in kinds and templates, no tools, no model override.
    pub fn builtin() -> Self {
        Self {
            kinds: KindLookup::builtin(),
            tools: ToolLookup::default(),
            templates: DefaultTemplates::builtin(),
            default_model: None,
        }
    }

    pub fn with_tools(mut self, tools: ToolLookup) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_default_model(mut self, model: ModelRef) -> Self {
        self.default_model = Some(model);
        self
    }
}
