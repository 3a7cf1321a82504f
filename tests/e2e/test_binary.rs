//! Integration tests for the flow-synth binary.
//!
//! These tests run the compiled binary over stdin and check its JSON output.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

/// Path of the binary cargo built for this test target.
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_flow-synth"))
}

/// Run the binary with the given stdin input and CLI args.
fn run(input: &str, args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            if let Some(ref mut stdin) = child.stdin {
                stdin.write_all(input.as_bytes()).ok();
            }
            child.wait_with_output()
        })
        .expect("Failed to run binary")
}

fn run_json(input: &str, args: &[&str]) -> Value {
    let output = run(input, args);
    assert!(
        output.status.success(),
        "Binary exited with {:?}:\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("flow-synth-{}-{}", std::process::id(), name));
    fs::write(&path, contents).expect("write scratch file");
    path
}

const SIMPLE: &str = "flowchart LR\nA[type=start]\nB[type=llm]\nA --> B\n";

#[test]
fn test_parse_emits_draft() {
    let draft = run_json(SIMPLE, &["parse"]);
    assert_eq!(draft["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(draft["nodes"][0]["kind"], "start");
    assert_eq!(draft["edges"][0]["source_id"], "A");
}

#[test]
fn test_parse_error_exits_nonzero() {
    let output = run("C[type=bogus-kind]", &["parse"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknownNodeType"), "stderr: {stderr}");
    assert!(stderr.contains("bogus-kind"));
}

#[test]
fn test_model_flag_requires_provider_and_name() {
    let output = run(SIMPLE, &["--model", "gpt-4o", "parse"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("provider/name"), "stderr: {stderr}");

    let draft = run_json(SIMPLE, &["--model", "openai/gpt-4o", "parse"]);
    assert_eq!(draft["nodes"].as_array().unwrap().len(), 2);
}

#[test]
fn test_synth_flowchart() {
    let graph = run_json(SIMPLE, &["synth"]);
    let nodes = graph["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(graph["edges"][0]["source"], nodes[0]["id"]);
    assert!(nodes[1]["position"]["x"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_synth_specs_onto_existing() {
    let existing = scratch_file(
        "existing.json",
        r#"{"nodes": [{"id": "s0", "kind": "start", "title": "Start", "position": {"x": 0, "y": 0}}], "edges": []}"#,
    );
    let specs = r#"{"nodes": [{"id": "s", "type": "start"}, {"id": "h", "type": "http-request"}],
                    "edges": [{"source": "s", "target": "h"}]}"#;
    let graph = run_json(specs, &["synth", "--specs", "--existing", existing.to_str().unwrap()]);
    let nodes = graph["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["id"], "s0");
    assert!(nodes[1]["config"]["body"]["data"].is_array());
    assert_eq!(graph["edges"][0]["source"], "s0");
    fs::remove_file(existing).ok();
}

#[test]
fn test_validate_reports_and_sets_exit_code() {
    let valid = r#"{"nodes": [
        {"id": "s", "kind": "start", "title": "Start"},
        {"id": "e", "kind": "end", "title": "End"}],
      "edges": [{"id": "s-source-e-target", "source": "s", "target": "e",
                 "source_handle": "source", "target_handle": "target",
                 "meta": {"source_kind": "start", "target_kind": "end"}}]}"#;
    let report = run_json(valid, &["validate"]);
    assert_eq!(report["connectivity"]["is_valid"], true);
    assert_eq!(report["convergence"]["is_valid"], true);

    let split = r#"{"nodes": [
        {"id": "s", "kind": "start", "title": "Start"},
        {"id": "t", "kind": "trigger-webhook", "title": "Webhook"}], "edges": []}"#;
    let output = run(split, &["validate"]);
    assert_eq!(output.status.code(), Some(1));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["connectivity"]["connected_components"], 2);
}

#[test]
fn test_layout_repositions() {
    let graph = r#"{"nodes": [
        {"id": "a", "kind": "start", "title": "Start", "position": {"x": 999, "y": 999}},
        {"id": "b", "kind": "end", "title": "End", "position": {"x": 999, "y": 999}}],
      "edges": [{"id": "a-source-b-target", "source": "a", "target": "b",
                 "source_handle": "source", "target_handle": "target",
                 "meta": {"source_kind": "start", "target_kind": "end"}}]}"#;
    let out = run_json(graph, &["layout"]);
    assert_eq!(out["nodes"][0]["position"]["x"], 0.0);
    assert!(out["nodes"][1]["position"]["x"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_output_flag_writes_file() {
    let mut target = std::env::temp_dir();
    target.push(format!("flow-synth-{}-out.json", std::process::id()));
    let output = run(SIMPLE, &["parse", "--output", target.to_str().unwrap()]);
    assert!(output.status.success());
    let written: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(written["nodes"][1]["kind"], "llm");
    fs::remove_file(target).ok();
}

#[test]
fn test_version_flag() {
    let output = run("", &["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("flow-synth"));
}
