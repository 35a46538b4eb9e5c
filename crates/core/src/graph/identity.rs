//! Stable node identities.
//!
//! Every graph node derives exactly one string identity from its
//! discriminant: `IRSB{addr}` (decimal) for blocks, `proc{name}` for
//! procedures. Within one graph the identity uniquely determines the node;
//! collisions are rejected by the builder.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::CfgNode;

/// Stable, unique identity of a graph node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Derive the identity of a validated node.
    ///
    /// No normalization of case or whitespace is applied to procedure
    /// names; `procPrintf` and `procprintf` are distinct.
    pub fn resolve(node: &CfgNode) -> Self {
        match node {
            CfgNode::Block { addr } => NodeId(format!("IRSB{addr}")),
            CfgNode::Procedure { name } => NodeId(format!("proc{name}")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Anchor identifier the connection renderer targets on this node.
    pub fn entry_anchor(&self) -> String {
        format!("{}-entry", self.0)
    }

    /// Anchor identifier connections leave this node from.
    pub fn exit_anchor(&self) -> String {
        format!("{}-exit", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}
