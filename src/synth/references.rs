//! Cross-node reference rewriting inside free-form node configuration.
//!
//! Draft configs refer to other nodes by their draft id, either as
//! `{{#id.field#}}` tokens inside strings or as value selectors
//! `["id", "field", ...]`. Once synthesis has minted real ids, every
//! reference is pointed at the new node and its field name is corrected for
//! the target kind.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tracing::debug;

use crate::syntax::types::BlockKind;

/// Selector roots that never name a node.
pub const RESERVED_ROOTS: [&str; 3] = ["sys", "env", "conversation"];

/// Keys whose mixed-content wrapper collapses to a plain string.
const PLAIN_STRING_KEYS: [&str; 3] = ["url", "headers", "params"];

pub static REFERENCE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{#([^.#]+)\.([^#]+)#\}\}").expect("reference token regex"));

/// Node a draft id was resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTarget {
    pub id: String,
    pub kind: BlockKind,
}

impl RefTarget {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self { id: id.into(), kind }
    }
}

/// Draft id → resolved node.
pub type RefMap = HashMap<String, RefTarget>;

// ─── Field correction ────────────────────────────────────────────────────────

/// Map a commonly hallucinated output field to the real output of `kind`.
pub fn correct_field_name(kind: BlockKind, field: &str) -> &str {
    match (kind, field) {
        (BlockKind::HttpRequest, "text" | "content" | "response") => "body",
        (BlockKind::Code, "text" | "output") => "result",
        (BlockKind::Llm, "response" | "answer" | "output") => "text",
        (BlockKind::TemplateTransform, "text" | "result") => "output",
        (BlockKind::QuestionClassifier, "class" | "category") => "class_name",
        (BlockKind::KnowledgeRetrieval, "results" | "documents") => "result",
        (BlockKind::Tool, "output" | "result") => "text",
        _ => field,
    }
}

// ─── Rewriting ───────────────────────────────────────────────────────────────

/// Rewrite every `{{#id.field#}}` token whose id is mapped.
pub fn rewrite_string(text: &str, refs: &RefMap) -> String {
    REFERENCE_TOKEN
        .replace_all(text, |caps: &Captures| match refs.get(&caps[1]) {
            Some(target) => format!("{{{{#{}.{}#}}}}", target.id, correct_field_name(target.kind, &caps[2])),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn rewrite_selector(items: &[Value], refs: &RefMap) -> Option<Value> {
    let (Some(root), Some(field)) = (items.first()?.as_str(), items.get(1)?.as_str()) else {
        return None;
    };
    match refs.get(root) {
        Some(target) => {
            let mut out = Vec::with_capacity(items.len());
            out.push(Value::String(target.id.clone()));
            out.push(Value::String(correct_field_name(target.kind, field).to_string()));
            out.extend(items[2..].iter().cloned());
            Some(Value::Array(out))
        }
        None => {
            if !RESERVED_ROOTS.contains(&root) {
                debug!(root, field, "selector references an unmapped node");
            }
            None
        }
    }
}

fn rewrite_with_parent(value: &Value, refs: &RefMap, parent_key: Option<&str>) -> Value {
    match value {
        Value::String(text) => Value::String(rewrite_string(text, refs)),
        Value::Array(items) => rewrite_selector(items, refs)
            .unwrap_or_else(|| Value::Array(items.iter().map(|item| rewrite_with_parent(item, refs, None)).collect())),
        Value::Object(obj) => {
            if let (Some("mixed"), Some(Value::String(text))) = (obj.get("type").and_then(Value::as_str), obj.get("value")) {
                let rewritten = rewrite_string(text, refs);
                if parent_key.is_some_and(|key| PLAIN_STRING_KEYS.contains(&key)) {
                    return Value::String(rewritten);
                }
                let mut out = obj.clone();
                out.insert("value".into(), Value::String(rewritten));
                return Value::Object(out);
            }
            Value::Object(
                obj.iter()
                    .map(|(key, item)| (key.clone(), rewrite_with_parent(item, refs, Some(key))))
                    .collect(),
            )
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}

/// Rewrite references anywhere in `value`. Never fails; unmapped references
/// are kept verbatim.
pub fn rewrite_value(value: &Value, refs: &RefMap) -> Value {
    rewrite_with_parent(value, refs, None)
}

/// Rewrite every property of a node config.
pub fn rewrite_config(config: &Map<String, Value>, refs: &RefMap) -> Map<String, Value> {
    config
        .iter()
        .map(|(key, item)| (key.clone(), rewrite_with_parent(item, refs, Some(key))))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/rust/test_synth_references.rs"]
mod tests;
