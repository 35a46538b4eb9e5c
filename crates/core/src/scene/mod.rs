//! Rendering handoff.
//!
//! The connection renderer (external) wants a node-id-keyed set of elements,
//! each exposing `{id}-entry` and `{id}-exit` anchor identifiers plus a
//! placement rectangle, and a list of anchor-to-anchor connections it draws
//! as non-detachable directional links. This module assembles exactly that
//! shape from a resolved graph and a layout result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{CfgGraph, Color, NodeId};
use crate::layout::{LayoutResult, Rect};

/// Error type for scene assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// A graph node has no layout rectangle. The pipeline always lays out
    /// every node it builds, so this signals inconsistent manual inputs.
    #[error("no layout position for node {0}")]
    MissingPosition(NodeId),
}

/// One drawable, draggable node element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    /// Presentation label: hex address for blocks, name for procedures.
    pub label: String,
    /// Function color; absent nodes render with the neutral fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    pub rect: Rect,
    pub entry_anchor: String,
    pub exit_anchor: String,
}

/// A directional connection between two named anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from_anchor: String,
    pub to_anchor: String,
    /// Always `false`: users may drag nodes, never detach connections.
    pub detachable: bool,
}

/// Complete, positioned diagram ready for the connection renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    pub nodes: BTreeMap<NodeId, SceneNode>,
    pub connections: Vec<Connection>,
}

impl Scene {
    /// Zip a resolved graph with its layout into renderer-shaped output.
    ///
    /// Connections follow the graph's edge order, each wired from the
    /// source's exit anchor to the target's entry anchor.
    pub fn assemble(graph: &CfgGraph, positions: &LayoutResult) -> Result<Self, SceneError> {
        let mut nodes = BTreeMap::new();
        for resolved in graph.nodes.values() {
            let rect = positions
                .get(&resolved.id)
                .copied()
                .ok_or_else(|| SceneError::MissingPosition(resolved.id.clone()))?;
            nodes.insert(
                resolved.id.clone(),
                SceneNode {
                    id: resolved.id.clone(),
                    label: resolved.label(),
                    color: resolved.color,
                    rect,
                    entry_anchor: resolved.id.entry_anchor(),
                    exit_anchor: resolved.id.exit_anchor(),
                },
            );
        }

        let connections = graph
            .edges
            .iter()
            .map(|edge| Connection {
                from_anchor: edge.from.exit_anchor(),
                to_anchor: edge.to.entry_anchor(),
                detachable: false,
            })
            .collect();

        Ok(Scene { nodes, connections })
    }
}
