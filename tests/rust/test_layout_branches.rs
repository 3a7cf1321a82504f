use super::*;
use serde_json::json;

fn node(id: &str, kind: BlockKind) -> ResolvedNode {
    ResolvedNode::new(id, kind)
}

fn find<'a>(nodes: &'a [ResolvedNode], id: &str) -> &'a ResolvedNode {
    nodes.iter().find(|n| n.id == id).unwrap()
}

fn if_else(cases: serde_json::Value) -> ResolvedNode {
    let mut n = node("check", BlockKind::IfElse);
    n.config.insert("cases".into(), cases);
    n
}

#[test]
fn test_if_else_true_first_false_last() {
    let n = if_else(json!([{"case_id": "c1"}, {"case_id": "c2"}]));
    assert_eq!(branch_rank(&n, "c1"), 0);
    assert_eq!(branch_rank(&n, "c2"), 1);
    assert_eq!(branch_rank(&n, "true"), 0);
    assert_eq!(branch_rank(&n, "false"), usize::MAX);
    assert_eq!(branch_rank(&n, "mystery"), 2);
}

#[test]
fn test_if_else_without_cases() {
    let n = node("check", BlockKind::IfElse);
    assert_eq!(branch_rank(&n, "true"), 0);
    assert!(branch_rank(&n, "other") < branch_rank(&n, "false"));
}

#[test]
fn test_classifier_follows_class_order() {
    let mut n = node("qc", BlockKind::QuestionClassifier);
    n.config.insert("classes".into(), json!([{"id": "b"}, {"id": "a"}]));
    assert_eq!(branch_rank(&n, "b"), 0);
    assert_eq!(branch_rank(&n, "a"), 1);
    assert_eq!(branch_rank(&n, "zzz"), 2);
}

#[test]
fn test_plain_nodes_rank_equal() {
    let n = node("llm", BlockKind::Llm);
    assert_eq!(branch_rank(&n, "source"), branch_rank(&n, "other"));
}

#[test]
fn test_branching_node_gets_sorted_group() {
    let nodes = vec![
        if_else(json!([{"case_id": "true"}])),
        node("no", BlockKind::End),
        node("yes", BlockKind::End),
    ];
    // Declared false-first; the group must still put the true branch first.
    let edges = vec![
        ResolvedEdge::between(&nodes[0], find(&nodes, "no"), "false"),
        ResolvedEdge::between(&nodes[0], find(&nodes, "yes"), "true"),
    ];
    let (ag, groups) = build_layout_graph(&nodes, &edges).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, "__sg_check");
    assert_eq!(groups[0].members, vec!["__branch_1", "__branch_0"]);
    assert_eq!(ag.successors_of("__branch_1"), &["yes".to_string()]);
    assert_eq!(ag.out_degree("check"), 2);
}

#[test]
fn test_single_successor_has_no_group() {
    let nodes = vec![node("a", BlockKind::Start), node("b", BlockKind::End)];
    let edges = vec![ResolvedEdge::between(&nodes[0], &nodes[1], "source")];
    let (ag, groups) = build_layout_graph(&nodes, &edges).unwrap();
    assert!(groups.is_empty());
    assert_eq!(ag.node_count(), 2);
}

#[test]
fn test_unknown_endpoint_is_error() {
    let nodes = vec![node("a", BlockKind::Start), node("b", BlockKind::End)];
    let mut edge = ResolvedEdge::between(&nodes[0], &nodes[1], "source");
    edge.target = "ghost".into();
    let err = build_layout_graph(&nodes, &[edge]).unwrap_err();
    assert_eq!(err, LayoutError::MissingNode("ghost".into()));
}
