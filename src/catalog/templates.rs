//! Per-kind default configuration templates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::syntax::types::BlockKind;

/// What a freshly dropped node of one kind looks like.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeTemplate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl NodeTemplate {
    fn new(kind: BlockKind, config: Value) -> Self {
        Self {
            title: kind.default_title().to_string(),
            desc: String::new(),
            config: match config {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DefaultTemplates {
    templates: HashMap<BlockKind, NodeTemplate>,
}

impl DefaultTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Templates for every `BlockKind`.
    pub fn builtin() -> Self {
        let mut templates = Self::new();
        for kind in BlockKind::ALL {
            templates.insert(kind, NodeTemplate::new(kind, builtin_config(kind)));
        }
        templates
    }

    pub fn insert(&mut self, kind: BlockKind, template: NodeTemplate) {
        self.templates.insert(kind, template);
    }

    pub fn get(&self, kind: BlockKind) -> Option<&NodeTemplate> {
        self.templates.get(&kind)
    }
}

fn builtin_config(kind: BlockKind) -> Value {
    match kind {
        BlockKind::Start => json!({ "variables": [] }),
        BlockKind::End => json!({ "outputs": [] }),
        BlockKind::Answer => json!({ "answer": "", "variables": [] }),
        BlockKind::Llm => json!({
            "model": { "provider": "", "name": "", "mode": "chat", "completion_params": { "temperature": 0.7 } },
            "prompt_template": [{ "role": "system", "text": "" }],
            "context": { "enabled": false, "variable_selector": [] },
            "vision": { "enabled": false },
        }),
        BlockKind::KnowledgeRetrieval => json!({
            "query_variable_selector": [],
            "dataset_ids": [],
            "retrieval_mode": "multiple",
        }),
        BlockKind::QuestionClassifier => json!({
            "query_variable_selector": [],
            "model": { "provider": "", "name": "", "mode": "chat", "completion_params": { "temperature": 0.7 } },
            "classes": [
                { "id": "1", "name": "" },
                { "id": "2", "name": "" },
            ],
            "vision": { "enabled": false },
        }),
        BlockKind::IfElse => json!({
            "cases": [{ "case_id": "true", "logical_operator": "and", "conditions": [] }],
        }),
        BlockKind::Code => json!({
            "code_language": "python3",
            "code": "",
            "variables": [],
            "outputs": {},
        }),
        BlockKind::TemplateTransform => json!({ "template": "", "variables": [] }),
        BlockKind::HttpRequest => json!({
            "variables": [],
            "method": "get",
            "url": "",
            "authorization": { "type": "no-auth", "config": null },
            "headers": "",
            "params": "",
            "body": { "type": "none", "data": [] },
            "timeout": { "max_connect_timeout": 0, "max_read_timeout": 0, "max_write_timeout": 0 },
        }),
        BlockKind::VariableAssigner | BlockKind::VariableAggregator => json!({
            "output_type": "any",
            "variables": [],
        }),
        BlockKind::Assigner => json!({ "version": "2", "items": [] }),
        BlockKind::Tool => json!({ "tool_parameters": {}, "tool_configurations": {} }),
        BlockKind::ParameterExtractor => json!({
            "model": { "provider": "", "name": "", "mode": "chat", "completion_params": { "temperature": 0.7 } },
            "query": [],
            "reasoning_mode": "prompt",
            "parameters": [],
            "vision": { "enabled": false },
        }),
        BlockKind::Iteration => json!({
            "start_node_id": "",
            "iterator_selector": [],
            "output_selector": [],
            "is_parallel": false,
            "parallel_nums": 10,
            "error_handle_mode": "terminated",
        }),
        BlockKind::Loop => json!({
            "start_node_id": "",
            "break_conditions": [],
            "loop_count": 10,
            "logical_operator": "and",
        }),
        BlockKind::DocumentExtractor => json!({ "variable_selector": [], "is_array_file": false }),
        BlockKind::ListOperator => json!({
            "variable": [],
            "filter_by": { "enabled": false, "conditions": [] },
            "order_by": { "enabled": false, "key": "", "value": "asc" },
            "limit": { "enabled": false, "size": 10 },
        }),
        BlockKind::Agent => json!({ "agent_parameters": {} }),
        BlockKind::TriggerSchedule => json!({ "mode": "visual", "frequency": "daily", "timezone": "UTC" }),
        BlockKind::TriggerWebhook => json!({ "method": "POST", "variables": [] }),
        BlockKind::TriggerPlugin => json!({ "event_parameters": {} }),
        BlockKind::IterationStart | BlockKind::LoopStart | BlockKind::LoopEnd => json!({}),
    }
}
