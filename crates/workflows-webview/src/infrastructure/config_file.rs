//! TOML configuration for the bridge.
//!
//! The CLI (and any host that prefers a file over code) describes a
//! [`WebviewConfig`] in TOML:
//!
//! ```toml
//! [session]
//! api_key = "my-api-key"
//! base_url = "https://api.rem.tools"
//!
//! [decoding]
//! ignore_unknown_fields = true
//!
//! [legacy]
//! tunnel_host = "https://tunnel.example.com"
//! ```
//!
//! Every section and field is optional.  Missing fields fall back to the
//! same defaults the library uses (`#[serde(default = "...")]`).  The API key
//! is usually supplied on the command line or through `WORKFLOWS_API_KEY`
//! instead of being written to disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use workflows_core::{ConfigError, DecodingOptions, SessionConfig, DEFAULT_BASE_URL};

use crate::domain::WebviewConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values parsed but do not form a valid configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// `[legacy] tunnel_host` is not an absolute URL.
    #[error("invalid legacy tunnel host `{url}`: {reason}")]
    InvalidTunnelHost { url: String, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub decoding: DecodingSection,
    #[serde(default)]
    pub legacy: LegacySection,
}

/// Backend location and credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSection {
    /// API key sent as `Rem-ApiKey`.  Usually left out of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Backend base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Inbound message decoding policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecodingSection {
    /// Accept entity fields the bridge does not model.
    #[serde(default = "default_true")]
    pub ignore_unknown_fields: bool,
}

/// Legacy `token_encoded` responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LegacySection {
    /// Host that legacy tokens are appended to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tunnel_host: Option<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_true() -> bool {
    true
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

impl Default for DecodingSection {
    fn default() -> Self {
        Self {
            ignore_unknown_fields: default_true(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parses TOML text.
///
/// # Errors
///
/// Returns [`ConfigFileError::Parse`] if the TOML is malformed.
pub fn parse_config(content: &str) -> Result<FileConfig, ConfigFileError> {
    Ok(toml::from_str(content)?)
}

/// Reads and parses the file at `path`.
///
/// # Errors
///
/// Returns [`ConfigFileError::Io`] if the file cannot be read and
/// [`ConfigFileError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

impl FileConfig {
    /// Validates the file contents into a [`WebviewConfig`].
    ///
    /// `api_key_override` (from the command line or environment) takes
    /// precedence over `[session] api_key`.
    ///
    /// # Errors
    ///
    /// - [`ConfigFileError::Config`] if no API key is available or the base
    ///   URL is unusable.
    /// - [`ConfigFileError::InvalidTunnelHost`] for a bad legacy host.
    pub fn into_webview_config(
        self,
        api_key_override: Option<String>,
    ) -> Result<WebviewConfig, ConfigFileError> {
        let api_key = api_key_override.or(self.session.api_key).unwrap_or_default();
        let session = SessionConfig::with_base_url(api_key, &self.session.base_url)?;

        let decoding = DecodingOptions {
            ignore_unknown_fields: self.decoding.ignore_unknown_fields,
        };
        let mut config = WebviewConfig::new(session).with_decoding(decoding);

        if let Some(raw) = self.legacy.tunnel_host {
            let host = Url::parse(&raw).map_err(|e| ConfigFileError::InvalidTunnelHost {
                url: raw.clone(),
                reason: e.to_string(),
            })?;
            config = config.with_legacy_tunnel_host(host);
        }

        Ok(config)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
