//! Session negotiation: API key + workflow id → access URL.
//!
//! The negotiator asks the backend for a single-use access URL for one
//! workflow and refuses to hand it out unless the workflow is still
//! pristine.  It performs exactly one request per call and never retries.
//!
//! ```text
//! negotiate(uuid, config)
//!   │  GET {origin}/workflows/{uuid}/create-token   (Rem-ApiKey: …)
//!   ▼
//! TokenEndpoint ──body──▶ TokenResponse::from_json
//!                           │ status != "pristine" → WorkflowNotUsable
//!                           ▼
//!                         access_url()            → NegotiatedSession
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use workflows_core::{SessionConfig, TokenResponse, TokenResponseError, WorkflowStatus};

use crate::domain::WebviewError;

/// Transport-level failure of the token request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-2xx status.
    #[error("server answered HTTP {status}")]
    Status { status: u16 },
}

/// Performs the authenticated GET against the token endpoint.
///
/// The infrastructure implementation uses `reqwest`; tests use recording
/// fakes.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Sends `GET url` with the API key header and returns the response body.
    async fn fetch_token(&self, url: Url, api_key: &str) -> Result<String, TransportError>;
}

/// Why a negotiation failed.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("workflow identifier must not be empty")]
    EmptyWorkflowId,

    #[error("cannot build token endpoint from base URL `{0}`")]
    InvalidEndpoint(String),

    #[error("token request failed: {0}")]
    NegotiationFailed(#[from] TransportError),

    #[error("workflow status `{status}` is not loadable")]
    WorkflowNotUsable { status: WorkflowStatus },

    #[error("malformed token response: {0}")]
    MalformedResponse(#[from] TokenResponseError),
}

impl From<NegotiationError> for WebviewError {
    fn from(error: NegotiationError) -> Self {
        match error {
            NegotiationError::NegotiationFailed(e) => WebviewError::NegotiationFailed(e.to_string()),
            NegotiationError::WorkflowNotUsable { status } => WebviewError::WorkflowNotUsable {
                status: status.to_string(),
            },
            other @ (NegotiationError::EmptyWorkflowId
            | NegotiationError::InvalidEndpoint(_)
            | NegotiationError::MalformedResponse(_)) => WebviewError::Internal(other.to_string()),
        }
    }
}

/// A successful negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedSession {
    /// Raw access URL, before presentation parameters are added.
    pub access_url: String,
    /// Status reported by the backend (always pristine today).
    pub status: WorkflowStatus,
}

/// Exchanges credentials for an access URL.
pub struct SessionNegotiator {
    endpoint: Arc<dyn TokenEndpoint>,
    legacy_tunnel_host: Option<Url>,
}

impl SessionNegotiator {
    pub fn new(endpoint: Arc<dyn TokenEndpoint>, legacy_tunnel_host: Option<Url>) -> Self {
        Self {
            endpoint,
            legacy_tunnel_host,
        }
    }

    /// Resolves `/workflows/{uuid}/create-token` against the base URL.
    ///
    /// The path is absolute, so any path on the base URL is replaced:
    /// `https://h/v2/` resolves to `https://h/workflows/{uuid}/create-token`.
    /// The workflow id is a single percent-encoded path segment, so an id
    /// containing `/` or `?` cannot change the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError::InvalidEndpoint`] if the base URL cannot
    /// carry a path.
    pub fn token_endpoint_url(base_url: &Url, uuid: &str) -> Result<Url, NegotiationError> {
        let mut url = base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| NegotiationError::InvalidEndpoint(base_url.to_string()))?
            .clear()
            .extend(["workflows", uuid, "create-token"]);
        Ok(url)
    }

    /// Requests an access URL for workflow `uuid`.
    ///
    /// # Errors
    ///
    /// - [`NegotiationError::NegotiationFailed`] on any transport failure.
    /// - [`NegotiationError::WorkflowNotUsable`] if the workflow is not
    ///   pristine.
    /// - [`NegotiationError::MalformedResponse`] if the body is unusable.
    /// - [`NegotiationError::EmptyWorkflowId`] if `uuid` is empty.
    pub async fn negotiate(
        &self,
        uuid: &str,
        config: &SessionConfig,
    ) -> Result<NegotiatedSession, NegotiationError> {
        if uuid.is_empty() {
            return Err(NegotiationError::EmptyWorkflowId);
        }

        let url = Self::token_endpoint_url(config.base_url(), uuid)?;
        debug!("requesting access token from {url}");

        let body = self.endpoint.fetch_token(url, config.api_key()).await.map_err(|e| {
            warn!("token request for workflow {uuid} failed: {e}");
            e
        })?;

        let response = TokenResponse::from_json(&body)?;
        if !response.status().is_pristine() {
            warn!(
                "workflow {uuid} has status `{}`; refusing to load it",
                response.status()
            );
            return Err(NegotiationError::WorkflowNotUsable {
                status: response.status().clone(),
            });
        }

        let access_url = response.access_url(self.legacy_tunnel_host.as_ref())?;
        debug!("workflow {uuid} is pristine; access URL issued");

        Ok(NegotiatedSession {
            access_url,
            status: response.status().clone(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
