//! Per-session display state.
//!
//! One `SessionContext` is owned by one display tab. It holds the current
//! resolved graph and assembled scene (replaced wholesale by each completed
//! analysis run, never updated incrementally) plus the highlight sets the
//! presentation layer toggles. There is no process-wide singleton; every
//! consumer that needs shared display state gets the context passed in.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::{CfgGraph, NodeId};
use crate::model::Address;
use crate::scene::Scene;

/// Highlight selections active in one session's CFG view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighlightState {
    pub registers: BTreeSet<String>,
    pub statements: BTreeSet<u64>,
    pub addresses: BTreeSet<Address>,
    pub exits: BTreeSet<u64>,
    pub blocks: BTreeSet<NodeId>,
}

impl HighlightState {
    pub fn clear(&mut self) {
        self.registers.clear();
        self.statements.clear();
        self.addresses.clear();
        self.exits.clear();
        self.blocks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
            && self.statements.is_empty()
            && self.addresses.is_empty()
            && self.exits.is_empty()
            && self.blocks.is_empty()
    }
}

/// Display context for one session/tab.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionContext {
    pub highlight: HighlightState,
    graph: Option<CfgGraph>,
    scene: Option<Scene>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> Option<&CfgGraph> {
        self.graph.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Replace the displayed graph and scene wholesale.
    ///
    /// Highlights refer to the previous graph's contents, so they are
    /// cleared along with it.
    pub fn install(&mut self, graph: CfgGraph, scene: Scene) {
        self.graph = Some(graph);
        self.scene = Some(scene);
        self.highlight.clear();
    }

    /// Drop the displayed graph, returning the session to its empty state.
    pub fn reset(&mut self) {
        self.graph = None;
        self.scene = None;
        self.highlight.clear();
    }
}
