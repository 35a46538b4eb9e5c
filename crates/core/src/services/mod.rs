//! Services coordinating the pipeline against the analysis server.

pub mod pipeline;
pub mod polling;
