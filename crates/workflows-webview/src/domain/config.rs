//! Bridge configuration.
//!
//! [`WebviewConfig`] bundles everything a [`WorkflowsWebview`] needs at
//! construction time.  It is built once, by host code or by the
//! infrastructure layer from a config file, and never changes afterwards.
//!
//! [`WorkflowsWebview`]: crate::WorkflowsWebview

use url::Url;
use workflows_core::{DecodingOptions, SessionConfig};

/// All configuration for one bridge instance.
///
/// # Example
///
/// ```rust
/// use workflows_webview::{SessionConfig, WebviewConfig};
///
/// let cfg = WebviewConfig::new(SessionConfig::new("key-123").unwrap());
/// assert!(cfg.decoding.ignore_unknown_fields);
/// assert!(cfg.legacy_tunnel_host.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WebviewConfig {
    /// Backend location and credentials.
    pub session: SessionConfig,

    /// Unknown-field policy applied to every inbound entity.
    pub decoding: DecodingOptions,

    /// Host that legacy `token_encoded` responses are resolved against.
    ///
    /// `None` means legacy responses are treated as malformed.
    pub legacy_tunnel_host: Option<Url>,
}

impl WebviewConfig {
    pub fn new(session: SessionConfig) -> Self {
        Self {
            session,
            decoding: DecodingOptions::default(),
            legacy_tunnel_host: None,
        }
    }

    pub fn with_decoding(mut self, decoding: DecodingOptions) -> Self {
        self.decoding = decoding;
        self
    }

    pub fn with_legacy_tunnel_host(mut self, host: Url) -> Self {
        self.legacy_tunnel_host = Some(host);
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionConfig {
        SessionConfig::with_base_url("key1", "https://api.example.com").unwrap()
    }

    #[test]
    fn test_new_uses_lenient_decoding() {
        let cfg = WebviewConfig::new(session());
        assert_eq!(cfg.decoding, DecodingOptions::default());
    }

    #[test]
    fn test_builders_set_fields() {
        // Arrange
        let host = Url::parse("https://tunnel.example.com").unwrap();

        // Act
        let cfg = WebviewConfig::new(session())
            .with_decoding(DecodingOptions::strict())
            .with_legacy_tunnel_host(host.clone());

        // Assert
        assert!(!cfg.decoding.ignore_unknown_fields);
        assert_eq!(cfg.legacy_tunnel_host, Some(host));
        assert_eq!(cfg.session.api_key(), "key1");
    }
}
