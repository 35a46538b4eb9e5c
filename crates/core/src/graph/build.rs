//! Graph builder: raw payload -> resolved node map + edge list.
//!
//! Node resolution completes before edge resolution, so dangling-edge
//! validation always runs against the full node set. Any error rejects the
//! whole build.

use std::collections::HashMap;

use tracing::debug;

use crate::graph::{assign_colors, BuildError, Color, NodeId};
use crate::model::{CfgNode, RawCfg};

/// A node with its derived identity and assigned color.
///
/// `color` is present only for block nodes whose address is listed under
/// some function; procedure nodes (and orphan blocks) carry none and are
/// rendered with the presentation layer's neutral fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    pub id: NodeId,
    pub node: CfgNode,
    pub color: Option<Color>,
}

impl ResolvedNode {
    pub fn label(&self) -> String {
        self.node.label()
    }
}

/// An edge with both endpoints resolved to node identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEdge {
    pub from: NodeId,
    pub to: NodeId,
}

/// Normalized CFG owned by one display session.
///
/// The node map offers keyed access only (no order contract); the edge list
/// preserves the payload's edge order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CfgGraph {
    pub nodes: HashMap<NodeId, ResolvedNode>,
    pub edges: Vec<ResolvedEdge>,
}

impl CfgGraph {
    /// Build a resolved graph from a raw payload.
    ///
    /// Deterministic: the same payload always yields the same identities,
    /// colors, and edge list.
    pub fn build(payload: &RawCfg) -> Result<Self, BuildError> {
        let functions = payload.function_blocks()?;
        let block_colors = assign_colors(&functions);

        let mut nodes: HashMap<NodeId, ResolvedNode> = HashMap::with_capacity(payload.nodes.len());
        for raw in &payload.nodes {
            let node = CfgNode::from_raw(raw)?;
            let id = NodeId::resolve(&node);
            let color = match &node {
                CfgNode::Block { addr } => block_colors.get(addr).copied(),
                CfgNode::Procedure { .. } => None,
            };
            let resolved = ResolvedNode { id: id.clone(), node, color };
            if nodes.insert(id.clone(), resolved).is_some() {
                return Err(BuildError::DuplicateIdentity(id));
            }
        }

        let mut edges = Vec::with_capacity(payload.edges.len());
        for raw in &payload.edges {
            let from = NodeId::resolve(&CfgNode::from_raw(&raw.from)?);
            let to = NodeId::resolve(&CfgNode::from_raw(&raw.to)?);
            for endpoint in [&from, &to] {
                if !nodes.contains_key(endpoint) {
                    return Err(BuildError::DanglingEdge(endpoint.clone()));
                }
            }
            edges.push(ResolvedEdge { from, to });
        }

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            functions = functions.len(),
            "normalized cfg payload"
        );
        Ok(CfgGraph { nodes, edges })
    }

    /// Node identities in a stable (sorted) order.
    ///
    /// The map itself carries no order contract; callers that need a
    /// deterministic traversal (layout, measurement) use this.
    pub fn sorted_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().cloned().collect();
        ids.sort();
        ids
    }
}
