//! Coordinator tying polling, graph construction, layout, and scene
//! assembly to a display session.
//!
//! The pipeline installs results into the session only after every stage
//! succeeds; any failure leaves the session's prior (or empty) display
//! state untouched. A half-built graph is never observable.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::graph::{BuildError, CfgGraph, ResolvedNode};
use crate::layout::{layout, LayoutConfig, SizedNode};
use crate::scene::{Scene, SceneError};
use crate::services::polling::{AnalysisApi, CfgRequest, FetchError, PollingClient};
use crate::session::SessionContext;

/// Single failure signal surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Measures the rendered extent of a node.
///
/// Sizing belongs to the presentation layer (it knows fonts and templates),
/// so the pipeline takes it as an explicit input; layout never reads sizes
/// itself and thus has no mount-ordering hazard.
pub trait NodeMeasurer: Send + Sync {
    fn measure(&self, node: &ResolvedNode) -> (f64, f64);
}

/// Fixed-extent measurer for headless use and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformMeasurer {
    pub width: f64,
    pub height: f64,
}

impl Default for UniformMeasurer {
    fn default() -> Self {
        Self { width: 180.0, height: 80.0 }
    }
}

impl NodeMeasurer for UniformMeasurer {
    fn measure(&self, _node: &ResolvedNode) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// End-to-end CFG pipeline for one analysis backend and measurer.
pub struct CfgPipeline<A, M> {
    client: PollingClient<A>,
    measurer: M,
    layout_config: LayoutConfig,
}

impl<A: AnalysisApi, M: NodeMeasurer> CfgPipeline<A, M> {
    pub fn new(client: PollingClient<A>, measurer: M) -> Self {
        Self { client, measurer, layout_config: LayoutConfig::default() }
    }

    pub fn with_layout_config(mut self, config: LayoutConfig) -> Self {
        self.layout_config = config;
        self
    }

    /// Fetch, build, lay out, and install a CFG into the session.
    ///
    /// Nodes are measured and laid out in sorted-identity order so repeated
    /// runs over the same payload place everything identically.
    pub async fn run(
        &self,
        request: &CfgRequest,
        cancel: &CancellationToken,
        session: &mut SessionContext,
    ) -> Result<(), PipelineError> {
        let payload = self.client.submit_and_await(request, cancel).await?;
        let graph = CfgGraph::build(&payload)?;

        let sized: Vec<SizedNode> = graph
            .sorted_ids()
            .into_iter()
            .map(|id| {
                let node = &graph.nodes[&id];
                let (width, height) = self.measurer.measure(node);
                SizedNode { id, width, height }
            })
            .collect();
        let positions = layout(&sized, &graph.edges, &self.layout_config);
        let scene = Scene::assemble(&graph, &positions)?;

        info!(
            instance = %request.instance_id,
            nodes = scene.nodes.len(),
            connections = scene.connections.len(),
            "cfg scene installed"
        );
        session.install(graph, scene);
        Ok(())
    }
}
