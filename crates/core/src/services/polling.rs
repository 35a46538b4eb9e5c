//! Long-running analysis requests: submit once, then poll a token endpoint
//! until the result is ready or the caller cancels.
//!
//! The job-submission backend is an external collaborator, modelled as the
//! [`AnalysisApi`] trait so transports (HTTP, test scripts) stay out of the
//! core. The polling loop is an explicit state machine:
//!
//! `Idle -> Submitted -> (immediate Ready) | Polling -> Ready | Cancelled`
//!
//! Polls are strictly serialized: the next poll is scheduled only after the
//! previous one settles, so a slow backend never sees overlapping requests.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::model::RawCfg;

/// Contract interval between consecutive polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Opaque handle for a not-yet-complete analysis job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollToken(pub String);

/// Request to compute the CFG of one analysis instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfgRequest {
    pub instance_id: String,
}

/// Submission response: either the terminal payload directly, or a token
/// signaling asynchronous completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmitResponse {
    Pending { token: PollToken },
    Ready(Box<RawCfg>),
}

/// One poll response from the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResponse {
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawCfg>,
}

/// Transport-level failure reported by an [`AnalysisApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Error type for the submit/poll protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The initial submission failed; no polling was attempted.
    #[error("analysis submission failed: {0}")]
    SubmitFailed(TransportError),
    /// A poll failed (transport error or protocol violation). Polling stops
    /// immediately; there is no retry.
    #[error("token poll failed: {0}")]
    PollFailed(TransportError),
    /// The caller cancelled while polling. No further polls are issued.
    #[error("cfg request cancelled")]
    Cancelled,
}

/// States of one submit-and-await cycle, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Submitted,
    Polling,
    Ready,
    Cancelled,
}

impl PollState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollState::Idle => "idle",
            PollState::Submitted => "submitted",
            PollState::Polling => "polling",
            PollState::Ready => "ready",
            PollState::Cancelled => "cancelled",
        }
    }
}

/// Boundary to the job-submission/management backend.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// `POST /analysis/{instanceId}/cfg`
    async fn submit_cfg(&self, request: &CfgRequest) -> Result<SubmitResponse, TransportError>;
    /// `GET /tokens/{token}`
    async fn poll_token(&self, token: &PollToken) -> Result<PollResponse, TransportError>;
}

#[async_trait]
impl<A: AnalysisApi + ?Sized> AnalysisApi for &A {
    async fn submit_cfg(&self, request: &CfgRequest) -> Result<SubmitResponse, TransportError> {
        (**self).submit_cfg(request).await
    }

    async fn poll_token(&self, token: &PollToken) -> Result<PollResponse, TransportError> {
        (**self).poll_token(token).await
    }
}

/// Client driving the submit-then-poll protocol on a fixed interval.
pub struct PollingClient<A> {
    api: A,
    interval: Duration,
}

impl<A: AnalysisApi> PollingClient<A> {
    pub fn new(api: A) -> Self {
        Self { api, interval: DEFAULT_POLL_INTERVAL }
    }

    /// Override the poll interval (tests use a short one).
    pub fn with_interval(api: A, interval: Duration) -> Self {
        Self { api, interval }
    }

    /// Submit a CFG request and await the final payload.
    ///
    /// Cancellation is checked before every poll; an already-fired sleep is
    /// a no-op once the token trips. Explicit cancellation resolves to
    /// [`FetchError::Cancelled`] (a future must settle or be dropped, so the
    /// original protocol's forever-pending promise maps to an error the
    /// caller discards). Dropping this future cancels implicitly.
    pub async fn submit_and_await(
        &self,
        request: &CfgRequest,
        cancel: &CancellationToken,
    ) -> Result<RawCfg, FetchError> {
        debug!(
            instance = %request.instance_id,
            state = PollState::Submitted.as_str(),
            "submitting cfg request"
        );
        let submitted = self.api.submit_cfg(request).await.map_err(FetchError::SubmitFailed)?;

        let token = match submitted {
            SubmitResponse::Ready(payload) => {
                info!(
                    instance = %request.instance_id,
                    state = PollState::Ready.as_str(),
                    "cfg result returned synchronously"
                );
                return Ok(*payload);
            }
            SubmitResponse::Pending { token } => token,
        };

        debug!(token = %token.0, state = PollState::Polling.as_str(), "analysis pending");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(token = %token.0, state = PollState::Cancelled.as_str(), "poll loop cancelled");
                    return Err(FetchError::Cancelled);
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            let response = self.api.poll_token(&token).await.map_err(|err| {
                warn!(token = %token.0, error = %err, "poll transport failure, aborting wait");
                FetchError::PollFailed(err)
            })?;
            if response.ready {
                let value = response.value.ok_or_else(|| {
                    FetchError::PollFailed(TransportError(
                        "token marked ready without a payload".to_string(),
                    ))
                })?;
                info!(token = %token.0, state = PollState::Ready.as_str(), "cfg result ready");
                return Ok(value);
            }
            debug!(token = %token.0, "result not ready, scheduling next poll");
        }
    }
}
