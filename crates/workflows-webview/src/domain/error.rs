//! Errors reported to host code.
//!
//! Every failure of a session start reaches the host as exactly one
//! [`WebviewError`], either as the `Err` of `start` or as the argument of the
//! completion callback.  Nothing is thrown across the async boundary and no
//! failure ever loads the embedded content.
//!
//! Failures while decoding inbound messages are NOT reported here; they are
//! logged and the message is dropped.

use thiserror::Error;
use workflows_core::ConfigError;

/// The failure taxonomy, without payloads.
///
/// Useful for hosts that switch on the kind of failure (for example to show
/// a "this link was already used" screen for [`ErrorKind::WorkflowNotUsable`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Reserved: the workflow does not exist.  Not produced today.
    WorkflowNotFound,
    /// The token request failed at the transport level.
    NegotiationFailed,
    /// The workflow was already started or consumed.
    WorkflowNotUsable,
    /// The backend response or the composed URL was unusable.
    InternalError,
    /// Reserved: a host permission (camera, location) was not granted.
    PermissionsNotGiven,
}

/// A session-start failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebviewError {
    #[error("workflow not found")]
    WorkflowNotFound,

    #[error("could not retrieve workflow access token: {0}")]
    NegotiationFailed(String),

    #[error("workflow cannot be loaded in its current status `{status}`")]
    WorkflowNotUsable { status: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("required permissions were not granted")]
    PermissionsNotGiven,
}

impl WebviewError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WebviewError::WorkflowNotFound => ErrorKind::WorkflowNotFound,
            WebviewError::NegotiationFailed(_) => ErrorKind::NegotiationFailed,
            WebviewError::WorkflowNotUsable { .. } => ErrorKind::WorkflowNotUsable,
            WebviewError::Internal(_) => ErrorKind::InternalError,
            WebviewError::PermissionsNotGiven => ErrorKind::PermissionsNotGiven,
        }
    }
}

/// Failure to construct a [`WorkflowsWebview`].
///
/// [`WorkflowsWebview`]: crate::WorkflowsWebview
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("could not build HTTP client: {0}")]
    HttpClient(String),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
