//! Rank-based layout over pre-measured nodes.
//!
//! The engine is synchronous and pure: it takes nodes with already-measured
//! extents plus a resolved edge list, assigns nodes to ranks following edge
//! direction, orders within ranks to reduce crossings, and emits grid-snapped
//! top-left rectangles. Measuring rendered node sizes is the caller's job
//! and must happen before layout runs; the engine never reads them itself.
//!
//! Exact coordinates are not a compatibility surface. Only the relative
//! rank ordering along edges and the absence of overlaps are.

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::graph::DiGraph;
use petgraph::visit::{depth_first_search, Control, DfsEvent, EdgeRef};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{NodeId, ResolvedEdge};

/// Separation and snapping constants for one layout run.
///
/// Tune-able, but must stay consistent within a run.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Border-to-border spacing between adjacent nodes in a rank.
    pub node_sep: f64,
    /// Spacing around edge routing points threaded through a rank.
    pub edge_sep: f64,
    /// Border-to-border spacing between consecutive ranks.
    pub rank_sep: f64,
    /// Centers snap to multiples of this grid.
    pub grid_size: f64,
    /// Header/margin offset keeping nodes off the viewport's top-left.
    pub margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { node_sep: 200.0, edge_sep: 200.0, rank_sep: 100.0, grid_size: 20.0, margin: 160.0 }
    }
}

/// A node with its externally measured extent.
#[derive(Debug, Clone, PartialEq)]
pub struct SizedNode {
    pub id: NodeId,
    pub width: f64,
    pub height: f64,
}

/// Final placement rectangle, top-left convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Grid-aligned placement for every input node.
pub type LayoutResult = BTreeMap<NodeId, Rect>;

/// Number of barycenter ordering sweeps (down + up per iteration).
const ORDERING_PASSES: usize = 4;

/// A slot in a rank: an input node, or a routing point of an edge spanning
/// more than one rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Member {
    Real(usize),
    Virtual(usize),
}

/// Compute a rank-based layout for the given sized nodes and edges.
///
/// Cycles are tolerated: back edges found by depth-first search are left out
/// of the layering (they still get drawn by the renderer). Deterministic for
/// fixed inputs.
pub fn layout(nodes: &[SizedNode], edges: &[ResolvedEdge], config: &LayoutConfig) -> LayoutResult {
    if nodes.is_empty() {
        return LayoutResult::new();
    }

    let index: HashMap<&NodeId, usize> =
        nodes.iter().enumerate().map(|(i, n)| (&n.id, i)).collect();

    let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(nodes.len(), edges.len());
    let petgraph_nodes: Vec<_> = (0..nodes.len()).map(|_| graph.add_node(())).collect();
    for edge in edges {
        // The builder guarantees referential integrity; unknown endpoints
        // can only appear when the engine is fed hand-rolled inputs.
        let (Some(&from), Some(&to)) = (index.get(&edge.from), index.get(&edge.to)) else {
            continue;
        };
        if from != to {
            graph.add_edge(petgraph_nodes[from], petgraph_nodes[to], ());
        }
    }

    // Classify back edges so the layering runs on a DAG.
    let mut back: HashSet<(usize, usize)> = HashSet::new();
    depth_first_search(&graph, graph.node_indices(), |event| {
        if let DfsEvent::BackEdge(u, v) = event {
            back.insert((u.index(), v.index()));
        }
        Control::<()>::Continue
    });
    let forward: Vec<(usize, usize)> = graph
        .edge_references()
        .map(|e| (e.source().index(), e.target().index()))
        .filter(|pair| !back.contains(pair))
        .collect();

    let ranks = assign_ranks(nodes.len(), &forward);
    let rank_count = ranks.iter().copied().max().unwrap_or(0) + 1;

    // Rank membership: real nodes in input order, then routing points for
    // edges spanning more than one rank.
    let mut rank_members: Vec<Vec<Member>> = vec![Vec::new(); rank_count];
    for (i, &rank) in ranks.iter().enumerate() {
        rank_members[rank].push(Member::Real(i));
    }
    let mut virtual_ranks: Vec<usize> = Vec::new();
    let mut segments: Vec<(Member, Member)> = Vec::new();
    for &(from, to) in &forward {
        let span = ranks[to] - ranks[from];
        let mut prev = Member::Real(from);
        for step in 1..span {
            let v = Member::Virtual(virtual_ranks.len());
            virtual_ranks.push(ranks[from] + step);
            rank_members[ranks[from] + step].push(v);
            segments.push((prev, v));
            prev = v;
        }
        segments.push((prev, Member::Real(to)));
    }

    order_ranks(&mut rank_members, &segments);
    let centers = place(&rank_members, nodes, config);

    let mut result = LayoutResult::new();
    for (rank, members) in rank_members.iter().enumerate() {
        for member in members {
            let Member::Real(i) = member else { continue };
            let node = &nodes[*i];
            let (cx, cy) = centers[&(rank, *member)];
            let snapped_x = snap(cx, config);
            let snapped_y = snap(cy, config);
            result.insert(
                node.id.clone(),
                Rect {
                    x: snapped_x - node.width / 2.0,
                    y: snapped_y - node.height / 2.0,
                    width: node.width,
                    height: node.height,
                },
            );
        }
    }
    debug!(nodes = nodes.len(), ranks = rank_count, back_edges = back.len(), "layout computed");
    result
}

/// Longest-path layering over the forward (acyclic) edge set.
fn assign_ranks(node_count: usize, forward: &[(usize, usize)]) -> Vec<usize> {
    let mut in_degree = vec![0usize; node_count];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for &(from, to) in forward {
        in_degree[to] += 1;
        successors[from].push(to);
    }

    let mut ranks = vec![0usize; node_count];
    let mut queue: std::collections::VecDeque<usize> =
        (0..node_count).filter(|&i| in_degree[i] == 0).collect();
    let mut processed = 0;
    while let Some(node) = queue.pop_front() {
        processed += 1;
        for &next in &successors[node] {
            ranks[next] = ranks[next].max(ranks[node] + 1);
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }
    debug_assert_eq!(processed, node_count, "forward edge set must be acyclic");
    ranks
}

/// Median-free barycenter ordering: alternate downward and upward sweeps,
/// each reordering one rank by the mean position of its neighbors in the
/// fixed adjacent rank. Ties keep the current order.
fn order_ranks(rank_members: &mut [Vec<Member>], segments: &[(Member, Member)]) {
    let mut predecessors: HashMap<Member, Vec<Member>> = HashMap::new();
    let mut successors: HashMap<Member, Vec<Member>> = HashMap::new();
    for &(from, to) in segments {
        predecessors.entry(to).or_default().push(from);
        successors.entry(from).or_default().push(to);
    }

    let mut positions: HashMap<Member, usize> = HashMap::new();
    let reindex = |members: &[Member], positions: &mut HashMap<Member, usize>| {
        for (pos, &member) in members.iter().enumerate() {
            positions.insert(member, pos);
        }
    };
    for members in rank_members.iter() {
        reindex(members, &mut positions);
    }

    for _ in 0..ORDERING_PASSES {
        for rank in 1..rank_members.len() {
            sweep(&mut rank_members[rank], &predecessors, &mut positions);
        }
        for rank in (0..rank_members.len().saturating_sub(1)).rev() {
            sweep(&mut rank_members[rank], &successors, &mut positions);
        }
    }
}

fn sweep(
    members: &mut Vec<Member>,
    neighbors: &HashMap<Member, Vec<Member>>,
    positions: &mut HashMap<Member, usize>,
) {
    let mut keyed: Vec<(f64, usize, Member)> = members
        .iter()
        .enumerate()
        .map(|(pos, &member)| {
            let barycenter = neighbors
                .get(&member)
                .map(|adjacent| {
                    let sum: f64 = adjacent.iter().map(|n| positions[n] as f64).sum();
                    sum / adjacent.len() as f64
                })
                .unwrap_or(pos as f64);
            (barycenter, pos, member)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    *members = keyed.into_iter().map(|(_, _, m)| m).collect();
    for (pos, &member) in members.iter().enumerate() {
        positions.insert(member, pos);
    }
}

/// Assign raw (pre-snap) center coordinates: border-to-border separations
/// within a rank, ranks stacked with `rank_sep`, every rank centered on the
/// widest one.
fn place(
    rank_members: &[Vec<Member>],
    nodes: &[SizedNode],
    config: &LayoutConfig,
) -> HashMap<(usize, Member), (f64, f64)> {
    let width_of = |member: Member| match member {
        Member::Real(i) => nodes[i].width,
        Member::Virtual(_) => 0.0,
    };
    let height_of = |member: Member| match member {
        Member::Real(i) => nodes[i].height,
        Member::Virtual(_) => 0.0,
    };
    let is_real = |member: Member| matches!(member, Member::Real(_));

    let mut raw_x: Vec<Vec<f64>> = Vec::with_capacity(rank_members.len());
    let mut rank_widths = Vec::with_capacity(rank_members.len());
    for members in rank_members.iter() {
        let mut xs = Vec::with_capacity(members.len());
        let mut right = 0.0f64;
        for (pos, &member) in members.iter().enumerate() {
            let half = width_of(member) / 2.0;
            let x = if pos == 0 {
                half
            } else {
                let sep = if is_real(members[pos - 1]) && is_real(member) {
                    config.node_sep
                } else {
                    config.edge_sep
                };
                right + sep + half
            };
            right = x + half;
            xs.push(x);
        }
        raw_x.push(xs);
        rank_widths.push(right);
    }

    let max_width = rank_widths.iter().copied().fold(0.0f64, f64::max);
    let mut centers: HashMap<(usize, Member), (f64, f64)> = HashMap::new();
    let mut offset = 0.0f64;
    for (rank, members) in rank_members.iter().enumerate() {
        let shift = (max_width - rank_widths[rank]) / 2.0;
        let rank_height = members.iter().map(|&m| height_of(m)).fold(0.0f64, f64::max);
        let y = offset + rank_height / 2.0;
        for (pos, &member) in members.iter().enumerate() {
            centers.insert((rank, member), (raw_x[rank][pos] + shift, y));
        }
        offset += rank_height + config.rank_sep;
    }
    centers
}

/// Snap a center coordinate to the grid and apply the margin offset.
fn snap(center: f64, config: &LayoutConfig) -> f64 {
    config.margin + config.grid_size * (center / config.grid_size).round()
}
