use cfgview_core::graph::{NodeId, ResolvedEdge};
use cfgview_core::layout::{layout, LayoutConfig, Rect, SizedNode};
use pretty_assertions::assert_eq;

fn sized(id: &str, width: f64, height: f64) -> SizedNode {
    SizedNode { id: NodeId::from(id), width, height }
}

fn edge(from: &str, to: &str) -> ResolvedEdge {
    ResolvedEdge { from: NodeId::from(from), to: NodeId::from(to) }
}

fn center(rect: &Rect) -> (f64, f64) {
    (rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
}

fn assert_on_grid(value: f64, config: &LayoutConfig) {
    let rem = (value - config.margin).rem_euclid(config.grid_size);
    assert!(
        rem < 1e-9 || (config.grid_size - rem) < 1e-9,
        "coordinate {value} not on margin+grid lattice"
    );
}

fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
}

fn assert_no_overlaps(rects: &[(&NodeId, &Rect)]) {
    for (i, (id_a, a)) in rects.iter().enumerate() {
        for (id_b, b) in rects.iter().skip(i + 1) {
            assert!(!overlaps(a, b), "{id_a} overlaps {id_b}: {a:?} vs {b:?}");
        }
    }
}

#[test]
fn chain_ranks_follow_edge_direction() {
    let nodes = vec![sized("a", 100.0, 40.0), sized("b", 100.0, 40.0), sized("c", 100.0, 40.0)];
    let edges = vec![edge("a", "b"), edge("b", "c")];
    let config = LayoutConfig::default();
    let result = layout(&nodes, &edges, &config);

    let (_, ya) = center(&result[&NodeId::from("a")]);
    let (_, yb) = center(&result[&NodeId::from("b")]);
    let (_, yc) = center(&result[&NodeId::from("c")]);
    assert!(ya < yb && yb < yc, "ranks must follow edge direction: {ya} {yb} {yc}");
}

#[test]
fn every_center_snaps_to_the_offset_grid() {
    let nodes = vec![
        sized("a", 100.0, 40.0),
        sized("b", 80.0, 60.0),
        sized("c", 120.0, 40.0),
        sized("d", 100.0, 40.0),
    ];
    let edges = vec![edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")];
    let config = LayoutConfig::default();
    let result = layout(&nodes, &edges, &config);

    assert_eq!(result.len(), 4);
    for rect in result.values() {
        let (cx, cy) = center(rect);
        assert_on_grid(cx, &config);
        assert_on_grid(cy, &config);
        assert!(cx >= config.margin - 1e-9, "node off the left margin");
        assert!(cy >= config.margin - 1e-9, "node off the top margin");
    }
}

#[test]
fn diamond_splits_one_rank_without_overlap() {
    let nodes = vec![
        sized("a", 100.0, 40.0),
        sized("b", 100.0, 40.0),
        sized("c", 100.0, 40.0),
        sized("d", 100.0, 40.0),
    ];
    let edges = vec![edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")];
    let result = layout(&nodes, &edges, &LayoutConfig::default());

    let (_, yb) = center(&result[&NodeId::from("b")]);
    let (_, yc) = center(&result[&NodeId::from("c")]);
    assert_eq!(yb, yc, "branch blocks share a rank");

    let rects: Vec<(&NodeId, &Rect)> = result.iter().collect();
    assert_no_overlaps(&rects);
}

#[test]
fn cycles_terminate_and_keep_forward_order() {
    let nodes = vec![sized("a", 100.0, 40.0), sized("b", 100.0, 40.0), sized("c", 100.0, 40.0)];
    let edges = vec![edge("a", "b"), edge("b", "c"), edge("c", "a")];
    let result = layout(&nodes, &edges, &LayoutConfig::default());

    assert_eq!(result.len(), 3);
    let (_, ya) = center(&result[&NodeId::from("a")]);
    let (_, yb) = center(&result[&NodeId::from("b")]);
    let (_, yc) = center(&result[&NodeId::from("c")]);
    assert!(ya < yb && yb < yc, "the loop's back edge must not disturb the layering");
}

#[test]
fn self_loops_are_tolerated() {
    let nodes = vec![sized("a", 100.0, 40.0), sized("b", 100.0, 40.0)];
    let edges = vec![edge("a", "a"), edge("a", "b")];
    let result = layout(&nodes, &edges, &LayoutConfig::default());
    assert_eq!(result.len(), 2);
}

#[test]
fn long_edges_span_intermediate_ranks_cleanly() {
    let nodes = vec![
        sized("a", 100.0, 40.0),
        sized("b", 100.0, 40.0),
        sized("c", 100.0, 40.0),
    ];
    let edges = vec![edge("a", "b"), edge("b", "c"), edge("a", "c")];
    let result = layout(&nodes, &edges, &LayoutConfig::default());

    let (_, ya) = center(&result[&NodeId::from("a")]);
    let (_, yb) = center(&result[&NodeId::from("b")]);
    let (_, yc) = center(&result[&NodeId::from("c")]);
    assert!(ya < yb && yb < yc);
    let rects: Vec<(&NodeId, &Rect)> = result.iter().collect();
    assert_no_overlaps(&rects);
}

#[test]
fn disconnected_nodes_are_still_placed() {
    let nodes = vec![sized("a", 100.0, 40.0), sized("b", 100.0, 40.0), sized("lone", 60.0, 40.0)];
    let edges = vec![edge("a", "b")];
    let result = layout(&nodes, &edges, &LayoutConfig::default());
    assert_eq!(result.len(), 3);
    let rects: Vec<(&NodeId, &Rect)> = result.iter().collect();
    assert_no_overlaps(&rects);
}

#[test]
fn layout_is_idempotent_for_fixed_inputs() {
    let nodes = vec![
        sized("a", 100.0, 40.0),
        sized("b", 80.0, 60.0),
        sized("c", 120.0, 40.0),
        sized("d", 100.0, 40.0),
    ];
    let edges = vec![edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")];
    let config = LayoutConfig::default();
    let first = layout(&nodes, &edges, &config);
    let second = layout(&nodes, &edges, &config);
    assert_eq!(first, second);
}

#[test]
fn custom_grid_and_margin_are_respected() {
    let nodes = vec![sized("a", 100.0, 40.0), sized("b", 100.0, 40.0)];
    let edges = vec![edge("a", "b")];
    let config = LayoutConfig { grid_size: 10.0, margin: 50.0, ..LayoutConfig::default() };
    let result = layout(&nodes, &edges, &config);
    for rect in result.values() {
        let (cx, cy) = center(rect);
        assert_on_grid(cx, &config);
        assert_on_grid(cy, &config);
    }
}

#[test]
fn empty_input_yields_an_empty_layout() {
    let result = layout(&[], &[], &LayoutConfig::default());
    assert!(result.is_empty());
}

#[test]
fn final_rects_keep_the_measured_extents() {
    let nodes = vec![sized("a", 154.0, 46.0)];
    let result = layout(&nodes, &[], &LayoutConfig::default());
    let rect = result[&NodeId::from("a")];
    assert_eq!(rect.width, 154.0);
    assert_eq!(rect.height, 46.0);
}
