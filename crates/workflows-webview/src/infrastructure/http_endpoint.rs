//! `reqwest` implementation of [`TokenEndpoint`].
//!
//! One `GET` per call, the API key in the `Rem-ApiKey` header, no body, no
//! retries.  The client has no request timeout of its own; callers cancel a
//! session by dropping its future or aborting its task.

use async_trait::async_trait;
use tracing::debug;
use url::Url;
use workflows_core::API_KEY_HEADER;

use crate::application::session_negotiator::{TokenEndpoint, TransportError};

/// Token endpoint that talks HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTokenEndpoint {
    client: reqwest::Client,
}

impl HttpTokenEndpoint {
    /// Builds an endpoint with a fresh connection pool.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("workflows-webview/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client (for shared pools or custom TLS roots).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn fetch_token(&self, url: Url, api_key: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        debug!("token endpoint answered {status}");
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
