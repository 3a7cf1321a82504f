//! End-to-end pipeline tests through the public API.

use flow_synth::{
    BlockKind, EdgeSpec, Engine, FlowGraph, NodeSpec, ParseErrorKind, Position, ResolvedNode, SynthError,
    validate_connectivity, validate_convergence,
};
use serde_json::json;

const SUPPORT_BOT: &str = r#"
```mermaid
flowchart LR
    %% triage incoming questions
    start[type=start|title=Question]
    classify[type=question-classifier|title=Triage]
    check[type=if-else|title=Has order id?]
    lookup[type=http-request|title=Order API]
    answer[type=llm|title=Reply]
    done[type=end]
    start --> classify
    classify --> check
    check -->|true| lookup
    check -->|false| answer
    lookup --> answer --> done
```
"#;

#[test]
fn test_flowchart_to_valid_graph() {
    let engine = Engine::default();
    let graph = engine.synthesize_flowchart(SUPPORT_BOT, &FlowGraph::default()).unwrap();
    assert_eq!(graph.nodes.len(), 6);
    assert_eq!(graph.edges.len(), 6);
    assert!(graph.dangling_edges().is_empty());

    let report = engine.validate(&graph);
    assert!(report.is_valid(), "{report:?}");

    let check = graph.nodes.iter().find(|n| n.kind == BlockKind::IfElse).unwrap();
    let handles: Vec<&str> = graph
        .edges
        .iter()
        .filter(|e| e.source == check.id)
        .map(|e| e.source_handle.as_str())
        .collect();
    assert_eq!(handles, vec!["true", "false"]);
}

#[test]
fn test_true_branch_laid_out_above_false() {
    let engine = Engine::default();
    let graph = engine.synthesize_flowchart(SUPPORT_BOT, &FlowGraph::default()).unwrap();
    let find = |title: &str| graph.nodes.iter().find(|n| n.title == title).unwrap();
    assert!(find("Order API").position.y <= find("Reply").position.y);
    assert!(find("Question").position.x < find("Triage").position.x);
}

#[test]
fn test_parse_errors_surface_through_engine() {
    let engine = Engine::default();
    let err = engine
        .synthesize_flowchart("flowchart LR\nC[type=bogus-kind]", &FlowGraph::default())
        .unwrap_err();
    match err {
        SynthError::Parse(e) => {
            assert_eq!(e.kind, ParseErrorKind::UnknownNodeType);
            assert_eq!(e.detail, "bogus-kind");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_incremental_synthesis_merges_start() {
    let engine = Engine::default();
    let first = engine
        .synthesize_specs(
            &[
                NodeSpec::new("s", "start").with_config(json!({"variables": [{"variable": "q"}]})),
                NodeSpec::new("l", "llm"),
            ],
            &[EdgeSpec::new("s", "l")],
            &FlowGraph::default(),
        )
        .unwrap();

    let second = engine
        .synthesize_specs(
            &[
                NodeSpec::new("s", "start").with_config(json!({"variables": [{"variable": "q"}, {"variable": "lang"}]})),
                NodeSpec::new("e", "end"),
            ],
            &[EdgeSpec::new("s", "e")],
            &first,
        )
        .unwrap();

    let starts: Vec<&ResolvedNode> = second.nodes.iter().filter(|n| n.kind == BlockKind::Start).collect();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].id, first.nodes[0].id);
    assert_eq!(starts[0].config["variables"].as_array().unwrap().len(), 2);

    // New content sits right of everything already on the canvas.
    let max_right = first.nodes.iter().map(|n| n.position.x + 240.0).fold(0.0, f64::max);
    let end = second.nodes.iter().find(|n| n.kind == BlockKind::End).unwrap();
    assert!(end.position.x >= max_right);
}

#[test]
fn test_all_unknown_specs_is_empty_result() {
    let engine = Engine::default();
    let err = engine
        .synthesize_specs(&[NodeSpec::new("x", "hologram")], &[], &FlowGraph::default())
        .unwrap_err();
    assert_eq!(err, SynthError::EmptyResult);
}

#[test]
fn test_validators_on_disjoint_triggers() {
    let nodes = vec![
        ResolvedNode::new("t1", BlockKind::TriggerWebhook).at(0.0, 0.0),
        ResolvedNode::new("t2", BlockKind::TriggerSchedule).at(0.0, 200.0),
    ];
    assert!(!validate_connectivity(&nodes, &[]).is_valid);
    assert!(validate_convergence(&nodes, &[]).is_valid);
}

#[test]
fn test_relayout_is_stable() {
    let engine = Engine::default();
    let graph = engine.synthesize_flowchart(SUPPORT_BOT, &FlowGraph::default()).unwrap();
    let once = engine.relayout(&graph);
    let twice = engine.relayout(&once);
    let positions = |g: &FlowGraph| g.nodes.iter().map(|n| n.position).collect::<Vec<Position>>();
    assert_eq!(positions(&once), positions(&twice));
}

#[test]
fn test_graph_json_round_trip() {
    let engine = Engine::default();
    let graph = engine.synthesize_flowchart(SUPPORT_BOT, &FlowGraph::default()).unwrap();
    let text = serde_json::to_string(&graph).unwrap();
    let back: FlowGraph = serde_json::from_str(&text).unwrap();
    assert_eq!(back, graph);
}
