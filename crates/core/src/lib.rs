//! cfgview-core
//!
//! Core library for visualizing control-flow graphs of binaries under
//! analysis. It consumes raw CFG payloads produced by an analysis server
//! (fetched through an asynchronous submit-then-poll protocol), normalizes
//! them into an identity-keyed node/edge set with per-function coloring,
//! computes a rank-based layout over pre-measured node sizes, and emits a
//! scene shaped for an external connection-drawing renderer.
//!
//! The goal is to keep all substantive logic here so it is fully testable
//! and reusable from multiple presentation shells.

pub mod graph;
pub mod layout;
pub mod model;
pub mod scene;
pub mod services;
pub mod session;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
