//! Token-exchange response protocol.
//!
//! `GET {base}/workflows/{uuid}/create-token` answers with a JSON document
//! that tells the host two things: the workflow's current status and where
//! the surface should navigate to.
//!
//! ```json
//! {
//!   "result": {
//!     "workflow": { "status": "pristine" },
//!     "public_url": "https://view.example.com/session/xyz"
//!   }
//! }
//! ```
//!
//! # Legacy shape
//!
//! Older backends returned `result.token_encoded` instead of
//! `result.public_url`.  The access URL was then formed by appending the
//! token to a fixed tunnel host as a path segment.  That shape is only
//! honoured when the caller configures a legacy host; `public_url` always
//! wins when both are present.
//!
//! # Field order
//!
//! The status is read first.  A response for an already started workflow is
//! reported as such even if its URL fields are missing, so callers can tell
//! "this workflow is used up" apart from "the backend sent garbage".

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::domain::entities::WorkflowStatus;

/// Header carrying the API key on the token request.
pub const API_KEY_HEADER: &str = "Rem-ApiKey";

/// Errors raised while reading a token response body.
///
/// All of these mean the backend answered 2xx with a body the host cannot
/// use.  None of them is fatal to the host process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenResponseError {
    /// The body is not JSON at all.
    #[error("token response is not valid JSON: {0}")]
    InvalidJson(String),

    /// A required field is absent.
    #[error("token response is missing `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong JSON type.
    #[error("token response field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    /// Only the legacy `token_encoded` field was present and no legacy
    /// tunnel host is configured to resolve it against.
    #[error("token response uses the legacy `token_encoded` shape but no legacy tunnel host is configured")]
    LegacyHostNotConfigured,
}

/// A parsed token response.
///
/// Holds the workflow status and the raw `result` object so the access URL
/// can be resolved after the status has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenResponse {
    status: WorkflowStatus,
    result: Map<String, Value>,
}

impl TokenResponse {
    /// Parses a response body and extracts `result.workflow.status`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenResponseError`] if the body is not JSON or if
    /// `result`, `result.workflow` or `result.workflow.status` is absent or
    /// not of the expected type.
    pub fn from_json(body: &str) -> Result<Self, TokenResponseError> {
        let root: Value =
            serde_json::from_str(body).map_err(|e| TokenResponseError::InvalidJson(e.to_string()))?;

        let root = root.as_object().ok_or(TokenResponseError::WrongType {
            field: "<root>",
            expected: "an object",
        })?;
        let result = object_field(root, "result", "result")?;
        let workflow = object_field(result, "workflow", "result.workflow")?;
        let status = match workflow.get("status") {
            None | Some(Value::Null) => {
                return Err(TokenResponseError::MissingField("result.workflow.status"))
            }
            Some(Value::String(s)) => WorkflowStatus::new(s.clone()),
            Some(_) => {
                return Err(TokenResponseError::WrongType {
                    field: "result.workflow.status",
                    expected: "a string",
                })
            }
        };

        Ok(Self {
            status,
            result: result.clone(),
        })
    }

    /// The workflow status reported by the backend.
    pub fn status(&self) -> &WorkflowStatus {
        &self.status
    }

    /// Resolves the navigable access URL.
    ///
    /// Prefers `result.public_url`.  Falls back to
    /// `{legacy_host}/{result.token_encoded}` when only the legacy field is
    /// present and `legacy_host` is `Some`.
    ///
    /// The returned string is not validated as a URL here; that happens when
    /// the load URL is composed.
    ///
    /// # Errors
    ///
    /// - [`TokenResponseError::WrongType`] if a URL field is not a string.
    /// - [`TokenResponseError::LegacyHostNotConfigured`] for a legacy body
    ///   without a configured host.
    /// - [`TokenResponseError::MissingField`] if neither field is present.
    pub fn access_url(&self, legacy_host: Option<&Url>) -> Result<String, TokenResponseError> {
        if let Some(url) = string_field(&self.result, "public_url", "result.public_url")? {
            return Ok(url.to_string());
        }

        match string_field(&self.result, "token_encoded", "result.token_encoded")? {
            Some(token) => {
                let host = legacy_host.ok_or(TokenResponseError::LegacyHostNotConfigured)?;
                warn!("backend answered with the legacy token_encoded shape; resolving against {host}");
                Ok(format!("{}/{}", host.as_str().trim_end_matches('/'), token))
            }
            None => Err(TokenResponseError::MissingField("result.public_url")),
        }
    }
}

fn object_field<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
    path: &'static str,
) -> Result<&'a Map<String, Value>, TokenResponseError> {
    match parent.get(key) {
        None | Some(Value::Null) => Err(TokenResponseError::MissingField(path)),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(TokenResponseError::WrongType {
            field: path,
            expected: "an object",
        }),
    }
}

fn string_field<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
    path: &'static str,
) -> Result<Option<&'a str>, TokenResponseError> {
    match parent.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(TokenResponseError::WrongType {
            field: path,
            expected: "a string",
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
