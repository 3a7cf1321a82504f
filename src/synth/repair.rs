//! Per-kind repairs applied to caller-supplied node config.
//!
//! Generated configs are frequently close to, but not exactly, the shape the
//! editor expects. Each rule below fixes one known class of mistake for one
//! kind; every other key is passed through untouched.

use serde_json::{Map, Value, json};

use crate::catalog::ModelRef;
use crate::syntax::types::BlockKind;

use super::references::REFERENCE_TOKEN;

/// Shallow merge of object layers, later layers winning. Non-object layers
/// are ignored.
fn layered(layers: &[Option<&Value>]) -> Map<String, Value> {
    let mut out = Map::new();
    for layer in layers.iter().flatten() {
        if let Value::Object(obj) = layer {
            out.extend(obj.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
    out
}

// ─── HTTP request ────────────────────────────────────────────────────────────

fn repair_http(caller: &Map<String, Value>, template: &Map<String, Value>, out: &mut Map<String, Value>) {
    let base_body = json!({"type": "none", "data": []});
    let mut body = layered(&[Some(&base_body), template.get("body"), caller.get("body")]);
    if !body.get("data").is_some_and(Value::is_array) {
        body.insert("data".into(), json!([]));
    }
    out.insert("body".into(), Value::Object(body));

    let base_auth = json!({"type": "no-auth"});
    let auth = layered(&[Some(&base_auth), template.get("authorization"), caller.get("authorization")]);
    out.insert("authorization".into(), Value::Object(auth));
}

// ─── End ─────────────────────────────────────────────────────────────────────

fn repair_end_output(output: &Value) -> Value {
    if output.get("value_selector").is_some_and(Value::is_array) {
        return output.clone();
    }
    let variable = output.get("variable").cloned();
    if let Some(caps) = output
        .get("value")
        .and_then(Value::as_str)
        .and_then(|text| REFERENCE_TOKEN.captures(text))
    {
        let mut repaired = Map::new();
        if let Some(variable) = variable {
            repaired.insert("variable".into(), variable);
        }
        repaired.insert("value_selector".into(), json!([&caps[1], &caps[2]]));
        return Value::Object(repaired);
    }
    json!({
        "variable": variable.unwrap_or_else(|| json!("output")),
        "value_selector": [],
    })
}

// ─── Parameter extractor / question classifier ───────────────────────────────

fn is_missing(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_null)
}

fn repair_parameter_extractor(caller: &Map<String, Value>, out: &mut Map<String, Value>) {
    if is_missing(caller.get("query")) {
        out.insert("query".into(), json!([]));
    }
    if let Some(Value::Array(params)) = caller.get("parameters") {
        let repaired = params
            .iter()
            .map(|param| match param {
                Value::Object(obj) => {
                    let mut obj = obj.clone();
                    if !obj.get("required").is_some_and(|r| !r.is_null()) {
                        obj.insert("required".into(), Value::Bool(true));
                    }
                    Value::Object(obj)
                }
                other => other.clone(),
            })
            .collect();
        out.insert("parameters".into(), Value::Array(repaired));
    }
}

fn repair_question_classifier(caller: &Map<String, Value>, out: &mut Map<String, Value>) {
    match caller.get("query") {
        None | Some(Value::Null) => {
            out.insert("query_variable_selector".into(), json!([]));
        }
        Some(query @ Value::Array(_)) => {
            out.insert("query_variable_selector".into(), query.clone());
            out.remove("query");
        }
        Some(_) => {}
    }
}

// ─── Variable aggregator ─────────────────────────────────────────────────────

/// Coerce one aggregator entry into a value selector; `None` drops it.
fn mine_selector(entry: &Value) -> Option<Value> {
    match entry {
        Value::Array(_) => Some(entry.clone()),
        Value::Object(obj) => {
            let mined = ["value_selector", "selector", "path"]
                .iter()
                .filter_map(|key| obj.get(*key))
                .find(|v| v.as_array().is_some_and(|a| !a.is_empty()));
            if let Some(selector) = mined {
                return Some(selector.clone());
            }
            let (root, field) = obj.get("name")?.as_str()?.split_once('.')?;
            let field = field.split('.').next().unwrap_or(field);
            Some(json!([root, field]))
        }
        _ => None,
    }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Caller config for a node of `kind` with every applicable repair applied.
///
/// `template` is the kind's default config, consulted for nested defaults.
/// A caller-supplied `model` is replaced by `default_model` when one is
/// configured.
pub fn repair_config(
    kind: BlockKind,
    caller: &Map<String, Value>,
    template: &Map<String, Value>,
    default_model: Option<&ModelRef>,
) -> Map<String, Value> {
    let mut out = caller.clone();

    match kind {
        BlockKind::HttpRequest => repair_http(caller, template, &mut out),
        BlockKind::End => {
            if let Some(Value::Array(outputs)) = caller.get("outputs") {
                let repaired = outputs.iter().map(repair_end_output).collect();
                out.insert("outputs".into(), Value::Array(repaired));
            }
        }
        BlockKind::ParameterExtractor => repair_parameter_extractor(caller, &mut out),
        BlockKind::QuestionClassifier => repair_question_classifier(caller, &mut out),
        BlockKind::VariableAggregator => {
            if let Some(Value::Array(entries)) = caller.get("variables") {
                let mined = entries.iter().filter_map(mine_selector).collect();
                out.insert("variables".into(), Value::Array(mined));
            }
        }
        _ => {}
    }

    if let (Some(model), Some(default)) = (caller.get("model"), default_model) {
        if !model.is_null() {
            out.insert(
                "model".into(),
                json!({"provider": default.provider, "name": default.name, "mode": "chat"}),
            );
        }
    }

    out
}

#[cfg(test)]
#[path = "../../tests/rust/test_synth_repair.rs"]
mod tests;
