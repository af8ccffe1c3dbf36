//! Session configuration types.
//!
//! [`SessionConfig`] holds the two values every session needs: the backend
//! base URL and the API key.  It is validated once at construction and is
//! immutable afterwards, so every later stage can rely on it being usable.
//!
//! [`DecodingOptions`] holds the single decoding policy flag applied to every
//! inbound message for the lifetime of a bridge.

use thiserror::Error;
use url::Url;

/// Backend used when the caller does not supply a base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.rem.tools";

/// Errors raised while building a [`SessionConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The API key was empty or whitespace only.
    #[error("API key must not be empty")]
    EmptyApiKey,

    /// The base URL could not be parsed as an absolute URL.
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Credentials and backend location for one bridge instance.
///
/// # Example
///
/// ```rust
/// use workflows_core::SessionConfig;
///
/// let cfg = SessionConfig::new("key-123").unwrap();
/// assert_eq!(cfg.base_url().as_str(), "https://api.rem.tools/");
/// assert_eq!(cfg.api_key(), "key-123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    base_url: Url,
    api_key: String,
}

impl SessionConfig {
    /// Builds a configuration against [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if `api_key` is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Builds a configuration against a custom backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if `api_key` is blank, or
    /// [`ConfigError::InvalidBaseUrl`] if `base_url` is not an absolute URL
    /// with a host (for example `"api.example.com"` without a scheme).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }

        let raw = base_url.as_ref();
        let base_url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() || base_url.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "URL has no host".to_string(),
            });
        }

        Ok(Self { base_url, api_key })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The credential sent with every token request.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Decoding policy applied to every inbound entity.
///
/// With `ignore_unknown_fields = true` (the default) fields the entity does
/// not model are kept verbatim in its `extra` map.  With `false` any such
/// field makes the message undecodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodingOptions {
    pub ignore_unknown_fields: bool,
}

impl Default for DecodingOptions {
    fn default() -> Self {
        Self {
            ignore_unknown_fields: true,
        }
    }
}

impl DecodingOptions {
    /// Options that reject any field the entity does not model.
    pub fn strict() -> Self {
        Self {
            ignore_unknown_fields: false,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_base_url() {
        // Arrange / Act
        let cfg = SessionConfig::new("key1").unwrap();
        // Assert
        assert_eq!(cfg.base_url().host_str(), Some("api.rem.tools"));
        assert_eq!(cfg.base_url().scheme(), "https");
    }

    #[test]
    fn test_custom_base_url_is_stored() {
        let cfg = SessionConfig::with_base_url("key1", "https://api.example.com").unwrap();
        assert_eq!(cfg.base_url().host_str(), Some("api.example.com"));
        assert_eq!(cfg.api_key(), "key1");
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        assert_eq!(SessionConfig::new(""), Err(ConfigError::EmptyApiKey));
        assert_eq!(SessionConfig::new("   "), Err(ConfigError::EmptyApiKey));
    }

    #[test]
    fn test_relative_base_url_is_rejected() {
        // Arrange: no scheme, so this is not an absolute URL
        let result = SessionConfig::with_base_url("key1", "api.example.com");

        // Assert
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_base_url_without_host_is_rejected() {
        let result = SessionConfig::with_base_url("key1", "mailto:ops@example.com");
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_decoding_options_default_ignores_unknown_fields() {
        assert!(DecodingOptions::default().ignore_unknown_fields);
        assert!(!DecodingOptions::strict().ignore_unknown_fields);
    }
}
