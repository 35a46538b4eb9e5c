//! Graph normalization: identity resolution, function coloring, and the
//! builder that turns a raw payload into a resolved node/edge set.

pub mod build;
pub mod color;
pub mod identity;

pub use build::{CfgGraph, ResolvedEdge, ResolvedNode};
pub use color::{assign_colors, Color};
pub use identity::NodeId;

use thiserror::Error;

use crate::model::{AddressParseError, NodeShapeError};

/// Error type for graph construction.
///
/// Any of these rejects the whole build; a partial graph is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A raw node (or function-map entry) that does not validate.
    #[error("malformed payload: {0}")]
    MalformedNode(String),
    /// Two distinct raw nodes collide on the derived identity.
    #[error("duplicate node identity {0}")]
    DuplicateIdentity(NodeId),
    /// An edge endpoint does not resolve to a node in the payload's node set.
    #[error("edge endpoint {0} is not in the node set")]
    DanglingEdge(NodeId),
}

impl From<NodeShapeError> for BuildError {
    fn from(err: NodeShapeError) -> Self {
        BuildError::MalformedNode(err.to_string())
    }
}

impl From<AddressParseError> for BuildError {
    fn from(err: AddressParseError) -> Self {
        BuildError::MalformedNode(err.to_string())
    }
}
