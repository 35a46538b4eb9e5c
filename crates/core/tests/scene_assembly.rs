use std::collections::BTreeMap;

use cfgview_core::graph::{CfgGraph, NodeId};
use cfgview_core::layout::{layout, LayoutConfig, LayoutResult, SizedNode};
use cfgview_core::model::{RawCfg, RawEdge, RawNode};
use cfgview_core::scene::{Scene, SceneError};
use pretty_assertions::assert_eq;

fn chain_payload() -> RawCfg {
    let mut functions = BTreeMap::new();
    functions.insert("0x400000".to_string(), vec!["0x400000".to_string()]);
    RawCfg {
        functions,
        nodes: vec![RawNode::block(0x400000), RawNode::procedure("printf")],
        edges: vec![RawEdge { from: RawNode::block(0x400000), to: RawNode::procedure("printf") }],
    }
}

fn positions_for(graph: &CfgGraph) -> LayoutResult {
    let sized: Vec<SizedNode> = graph
        .sorted_ids()
        .into_iter()
        .map(|id| SizedNode { id, width: 100.0, height: 40.0 })
        .collect();
    layout(&sized, &graph.edges, &LayoutConfig::default())
}

#[test]
fn anchors_follow_the_entry_exit_convention() {
    let graph = CfgGraph::build(&chain_payload()).expect("build");
    let scene = Scene::assemble(&graph, &positions_for(&graph)).expect("scene");

    let block = &scene.nodes[&NodeId::from("IRSB4194304")];
    assert_eq!(block.entry_anchor, "IRSB4194304-entry");
    assert_eq!(block.exit_anchor, "IRSB4194304-exit");
    assert_eq!(block.label, "0x400000");
    assert!(block.color.is_some());

    let proc = &scene.nodes[&NodeId::from("procprintf")];
    assert_eq!(proc.entry_anchor, "procprintf-entry");
    assert_eq!(proc.label, "printf");
    assert_eq!(proc.color, None);
}

#[test]
fn connections_are_directional_and_non_detachable() {
    let graph = CfgGraph::build(&chain_payload()).expect("build");
    let scene = Scene::assemble(&graph, &positions_for(&graph)).expect("scene");

    assert_eq!(scene.connections.len(), 1);
    let connection = &scene.connections[0];
    assert_eq!(connection.from_anchor, "IRSB4194304-exit");
    assert_eq!(connection.to_anchor, "procprintf-entry");
    assert!(!connection.detachable);
}

#[test]
fn missing_positions_fail_assembly() {
    let graph = CfgGraph::build(&chain_payload()).expect("build");
    let result = Scene::assemble(&graph, &LayoutResult::new());
    assert!(matches!(result, Err(SceneError::MissingPosition(_))));
}

#[test]
fn serialized_scene_matches_the_handoff_shape() {
    let graph = CfgGraph::build(&chain_payload()).expect("build");
    let scene = Scene::assemble(&graph, &positions_for(&graph)).expect("scene");
    let json = serde_json::to_value(&scene).expect("serialize");

    let block = &json["nodes"]["IRSB4194304"];
    assert_eq!(block["entry_anchor"], "IRSB4194304-entry");
    assert!(block["color"].as_str().expect("hex color").starts_with('#'));
    assert!(block["rect"]["x"].is_number());
    assert_eq!(json["connections"][0]["detachable"], false);

    // Procedure nodes carry no color at all.
    assert!(json["nodes"]["procprintf"].get("color").is_none());
}
