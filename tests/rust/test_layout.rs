use super::*;
use crate::syntax::types::BlockKind;
use serde_json::json;

fn node(id: &str, kind: BlockKind) -> ResolvedNode {
    ResolvedNode::new(id, kind)
}

fn edge(nodes: &[ResolvedNode], source: &str, target: &str, handle: &str) -> ResolvedEdge {
    let s = nodes.iter().find(|n| n.id == source).unwrap();
    let t = nodes.iter().find(|n| n.id == target).unwrap();
    ResolvedEdge::between(s, t, handle)
}

fn branching() -> (Vec<ResolvedNode>, Vec<ResolvedEdge>) {
    let mut check = node("check", BlockKind::IfElse);
    check.config.insert("cases".into(), json!([{"case_id": "true"}]));
    // Targets declared false-branch first.
    let nodes = vec![
        node("start", BlockKind::Start),
        check,
        node("no", BlockKind::End),
        node("yes", BlockKind::End),
    ];
    let edges = vec![
        edge(&nodes, "start", "check", "source"),
        edge(&nodes, "check", "no", "false"),
        edge(&nodes, "check", "yes", "true"),
    ];
    (nodes, edges)
}

#[test]
fn test_chain_runs_left_to_right() {
    let nodes = vec![node("a", BlockKind::Start), node("b", BlockKind::Llm), node("c", BlockKind::End)];
    let edges = vec![edge(&nodes, "a", "b", "source"), edge(&nodes, "b", "c", "source")];
    let pos = layout(&nodes, &edges, &ExistingBounds::empty(), &LayoutConfig::default());
    assert_eq!(pos.len(), 3);
    assert_eq!(pos["a"].x, 0.0);
    assert!(pos["a"].x < pos["b"].x);
    assert!(pos["b"].x < pos["c"].x);
    assert_eq!(pos["a"].y, pos["c"].y);
}

#[test]
fn test_true_branch_above_false() {
    let (nodes, edges) = branching();
    let pos = layout(&nodes, &edges, &ExistingBounds::empty(), &LayoutConfig::default());
    assert!(pos["yes"].y < pos["no"].y);
    assert_eq!(pos["yes"].x, pos["no"].x);
}

#[test]
fn test_classifier_classes_in_order() {
    let mut qc = node("qc", BlockKind::QuestionClassifier);
    qc.config.insert("classes".into(), json!([{"id": "1"}, {"id": "2"}, {"id": "3"}]));
    let nodes = vec![qc, node("c3", BlockKind::Llm), node("c1", BlockKind::Llm), node("c2", BlockKind::Llm)];
    let edges = vec![
        edge(&nodes, "qc", "c3", "3"),
        edge(&nodes, "qc", "c1", "1"),
        edge(&nodes, "qc", "c2", "2"),
    ];
    let pos = layout(&nodes, &edges, &ExistingBounds::empty(), &LayoutConfig::default());
    assert!(pos["c1"].y < pos["c2"].y);
    assert!(pos["c2"].y < pos["c3"].y);
}

#[test]
fn test_no_virtual_nodes_in_output() {
    let (nodes, mut edges) = branching();
    edges.push(edge(&nodes, "start", "yes", "source"));
    let pos = layout(&nodes, &edges, &ExistingBounds::empty(), &LayoutConfig::default());
    assert_eq!(pos.len(), nodes.len());
    assert!(pos.keys().all(|id| !is_virtual(id)));
}

#[test]
fn test_cycle_still_laid_out() {
    let nodes = vec![node("a", BlockKind::Start), node("b", BlockKind::Llm), node("c", BlockKind::Code)];
    let edges = vec![
        edge(&nodes, "a", "b", "source"),
        edge(&nodes, "b", "c", "source"),
        edge(&nodes, "c", "b", "source"),
    ];
    let local = layered_layout(&nodes, &edges, &LayoutConfig::default()).unwrap();
    assert_eq!(local.len(), 3);
}

#[test]
fn test_placed_right_of_existing_nodes() {
    let existing = vec![node("old", BlockKind::Start).at(100.0, 200.0)];
    let config = LayoutConfig::default();
    let bounds = ExistingBounds::from_nodes(&existing, config.node_width, config.node_height);
    let nodes = vec![node("a", BlockKind::Llm), node("b", BlockKind::End)];
    let edges = vec![edge(&nodes, "a", "b", "source")];
    let pos = layout(&nodes, &edges, &bounds, &config);
    assert_eq!(pos["a"].x, 100.0 + config.node_width + config.x_offset);
    // First rank centred on the existing nodes' mean centre.
    let centre = pos["a"].y + config.node_height / 2.0;
    assert!((centre - bounds.avg_center_y).abs() < 1e-9);
}

#[test]
fn test_too_large_falls_back_to_grid() {
    let config = LayoutConfig {
        max_nodes: 2,
        ..LayoutConfig::default()
    };
    let nodes: Vec<ResolvedNode> = (0..5).map(|i| node(&format!("n{i}"), BlockKind::Code)).collect();
    assert!(matches!(
        layered_layout(&nodes, &[], &config),
        Err(LayoutError::TooLarge { nodes: 5, limit: 2 })
    ));
    let pos = layout(&nodes, &[], &ExistingBounds::empty(), &config);
    assert_eq!(pos["n0"], Position::new(0.0, 0.0));
    assert_eq!(pos["n3"], Position::new(3.0 * config.x_offset, 0.0));
    assert_eq!(pos["n4"], Position::new(0.0, config.grid_row_height()));
}

#[test]
fn test_unknown_endpoint_falls_back_to_grid() {
    let existing = vec![node("old", BlockKind::Start).at(0.0, -50.0)];
    let config = LayoutConfig::default();
    let bounds = ExistingBounds::from_nodes(&existing, config.node_width, config.node_height);
    let nodes = vec![node("a", BlockKind::Llm)];
    let edges = vec![edge(&existing, "old", "old", "source")];
    let pos = layout(&nodes, &edges, &bounds, &config);
    assert_eq!(pos["a"], Position::new(config.node_width + config.x_offset, -50.0));
}

#[test]
fn test_empty_input() {
    assert!(layout(&[], &[], &ExistingBounds::empty(), &LayoutConfig::default()).is_empty());
}

#[test]
fn test_layout_is_deterministic() {
    let (nodes, edges) = branching();
    let config = LayoutConfig::default();
    let first = layout(&nodes, &edges, &ExistingBounds::empty(), &config);
    let second = layout(&nodes, &edges, &ExistingBounds::empty(), &config);
    assert_eq!(first, second);
}
