//! Tool catalog: descriptors keyed by several normalised spellings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::normalize_key;

/// One declared input of a tool. Everything beyond `name` is kept verbatim
/// and handed to the editor as the parameter schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(flatten)]
    pub schema: Map<String, Value>,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub provider_id: String,
    #[serde(default)]
    pub provider_type: String,
    #[serde(default)]
    pub provider_name: String,
    pub tool_name: String,
    #[serde(default)]
    pub tool_label: String,
    #[serde(default)]
    pub tool_description: String,
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
}

impl ToolDescriptor {
    pub fn new(provider_id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            tool_name: tool_name.into(),
            ..Self::default()
        }
    }

    /// Fields copied onto a synthesized Tool node.
    pub fn node_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        for (key, value) in [
            ("provider_id", &self.provider_id),
            ("provider_type", &self.provider_type),
            ("provider_name", &self.provider_name),
            ("tool_name", &self.tool_name),
            ("tool_label", &self.tool_label),
            ("tool_description", &self.tool_description),
        ] {
            fields.insert(key.to_string(), Value::String(value.clone()));
        }
        let schemas = self
            .parameters
            .iter()
            .filter_map(|p| serde_json::to_value(p).ok())
            .collect();
        fields.insert("paramSchemas".to_string(), Value::Array(schemas));
        let seeded: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), Value::String(String::new())))
            .collect();
        fields.insert("tool_parameters".to_string(), Value::Object(seeded));
        fields
    }
}

// ─── ToolLookup ──────────────────────────────────────────────────────────────

/// Normalised key → descriptor.
///
/// Each descriptor is reachable as `provider_id/tool_name`,
/// `provider_name/tool_name` and `tool_label`. The bare `tool_name` key goes
/// to whichever provider registered it first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolLookup {
    tools: Vec<ToolDescriptor>,
    keys: HashMap<String, usize>,
}

impl ToolLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tools(tools: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        let mut lookup = Self::new();
        for tool in tools {
            lookup.insert(tool);
        }
        lookup
    }

    pub fn insert(&mut self, tool: ToolDescriptor) {
        let idx = self.tools.len();
        let composite = [
            format!("{}/{}", tool.provider_id, tool.tool_name),
            format!("{}/{}", tool.provider_name, tool.tool_name),
            tool.tool_label.clone(),
        ];
        for raw in composite {
            let key = normalize_key(&raw);
            if !key.is_empty() {
                self.keys.insert(key, idx);
            }
        }
        let bare = normalize_key(&tool.tool_name);
        if !bare.is_empty() {
            self.keys.entry(bare).or_insert(idx);
        }
        self.tools.push(tool);
    }

    /// Look up by an already-normalised key.
    pub fn get(&self, key: &str) -> Option<&ToolDescriptor> {
        self.keys.get(key).map(|&idx| &self.tools[idx])
    }

    /// Normalise `raw` and look it up.
    pub fn resolve(&self, raw: &str) -> Option<&ToolDescriptor> {
        self.get(&normalize_key(raw))
    }

    /// Normalised key that structured specs resolve through: provider +
    /// tool name, then the tool name alone.
    pub fn pair_key(&self, provider_id: &str, tool_name: &str) -> Option<String> {
        if !provider_id.is_empty() {
            let key = normalize_key(&format!("{provider_id}/{tool_name}"));
            if self.keys.contains_key(&key) {
                return Some(key);
            }
        }
        let key = normalize_key(tool_name);
        self.keys.contains_key(&key).then_some(key)
    }
}
