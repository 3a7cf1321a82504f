use super::*;
use crate::catalog::templates::DefaultTemplates;

fn obj(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn repair(kind: BlockKind, caller: Value) -> Map<String, Value> {
    let templates = DefaultTemplates::builtin();
    let template = templates.get(kind).map(|t| t.config.clone()).unwrap_or_default();
    repair_config(kind, &obj(caller), &template, None)
}

// ── HTTP request ─────────────────────────────────────────────────────────

#[test]
fn test_http_empty_config_gets_body_and_auth() {
    let out = repair(BlockKind::HttpRequest, json!({}));
    assert_eq!(out["body"]["type"], "none");
    assert_eq!(out["body"]["data"], json!([]));
    assert_eq!(out["authorization"]["type"], "no-auth");
}

#[test]
fn test_http_body_data_coerced_to_list() {
    let out = repair(BlockKind::HttpRequest, json!({"body": {"type": "json", "data": "{\"a\": 1}"}}));
    assert_eq!(out["body"]["type"], "json");
    assert_eq!(out["body"]["data"], json!([]));
}

#[test]
fn test_http_caller_auth_wins() {
    let out = repair(
        BlockKind::HttpRequest,
        json!({"authorization": {"type": "api-key", "config": {"api_key": "k"}}, "url": "https://x"}),
    );
    assert_eq!(out["authorization"]["type"], "api-key");
    assert_eq!(out["authorization"]["config"]["api_key"], "k");
    assert_eq!(out["url"], "https://x");
}

// ── End ──────────────────────────────────────────────────────────────────

#[test]
fn test_end_outputs_repaired() {
    let out = repair(
        BlockKind::End,
        json!({"outputs": [
            {"variable": "kept", "value_selector": ["llm", "text"]},
            {"variable": "parsed", "value": "{{#llm.text#}}"},
            {"value": "not a reference"},
        ]}),
    );
    assert_eq!(
        out["outputs"],
        json!([
            {"variable": "kept", "value_selector": ["llm", "text"]},
            {"variable": "parsed", "value_selector": ["llm", "text"]},
            {"variable": "output", "value_selector": []},
        ])
    );
}

#[test]
fn test_end_without_outputs_untouched() {
    let out = repair(BlockKind::End, json!({"foo": 1}));
    assert!(!out.contains_key("outputs"));
}

// ── Parameter extractor ──────────────────────────────────────────────────

#[test]
fn test_parameter_extractor_defaults() {
    let out = repair(
        BlockKind::ParameterExtractor,
        json!({"query": null, "parameters": [{"name": "city"}, {"name": "zip", "required": false}]}),
    );
    assert_eq!(out["query"], json!([]));
    assert_eq!(out["parameters"][0]["required"], true);
    assert_eq!(out["parameters"][1]["required"], false);
}

#[test]
fn test_parameter_extractor_keeps_query() {
    let out = repair(BlockKind::ParameterExtractor, json!({"query": ["start", "q"]}));
    assert_eq!(out["query"], json!(["start", "q"]));
}

// ── Question classifier ──────────────────────────────────────────────────

#[test]
fn test_classifier_missing_query() {
    let out = repair(BlockKind::QuestionClassifier, json!({}));
    assert_eq!(out["query_variable_selector"], json!([]));
}

#[test]
fn test_classifier_array_query_renamed() {
    let out = repair(BlockKind::QuestionClassifier, json!({"query": ["start", "question"]}));
    assert_eq!(out["query_variable_selector"], json!(["start", "question"]));
    assert!(!out.contains_key("query"));
}

#[test]
fn test_classifier_string_query_left_alone() {
    let out = repair(BlockKind::QuestionClassifier, json!({"query": "text"}));
    assert_eq!(out["query"], "text");
    assert!(!out.contains_key("query_variable_selector"));
}

// ── Variable aggregator ──────────────────────────────────────────────────

#[test]
fn test_aggregator_entries_mined() {
    let out = repair(
        BlockKind::VariableAggregator,
        json!({"variables": [
            ["a", "text"],
            {"value_selector": ["b", "result"]},
            {"selector": []},
            {"path": ["c", "body"]},
            {"name": "d.output.extra"},
            {"name": "nodot"},
            "junk",
        ]}),
    );
    assert_eq!(
        out["variables"],
        json!([["a", "text"], ["b", "result"], ["c", "body"], ["d", "output"]])
    );
}

// ── Model override ───────────────────────────────────────────────────────

#[test]
fn test_model_replaced_by_default() {
    let model = ModelRef {
        provider: "openai".into(),
        name: "gpt-4o".into(),
    };
    let caller = obj(json!({"model": {"provider": "made-up", "name": "x"}}));
    let out = repair_config(BlockKind::Llm, &caller, &Map::new(), Some(&model));
    assert_eq!(out["model"], json!({"provider": "openai", "name": "gpt-4o", "mode": "chat"}));
}

#[test]
fn test_model_kept_without_default() {
    let caller = obj(json!({"model": {"provider": "p", "name": "n"}}));
    let out = repair_config(BlockKind::Llm, &caller, &Map::new(), None);
    assert_eq!(out["model"], json!({"provider": "p", "name": "n"}));
}

#[test]
fn test_other_kinds_pass_through() {
    let caller = obj(json!({"code": "print(1)", "outputs": "x"}));
    assert_eq!(repair_config(BlockKind::Code, &caller, &Map::new(), None), caller);
}
