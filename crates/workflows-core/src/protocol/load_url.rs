//! Load-URL composition.
//!
//! The backend hands out a raw access URL.  Before the surface navigates to
//! it, the host appends presentation options as query parameters.  Today
//! there is one option, `minimal`, which tells the embedded UI to hide its
//! own navigation chrome.
//!
//! Composition is a pure function of its inputs: composing an already
//! composed URL with the same flag returns the same URL, because any
//! existing `minimal` parameter is replaced rather than appended to.

use thiserror::Error;
use url::{form_urlencoded, Url};

/// Query parameter that toggles the embedded UI's navigation chrome.
pub const MINIMAL_PARAM: &str = "minimal";

/// Errors raised while composing a load URL.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    /// The access URL is not a parseable absolute URL.
    #[error("invalid access URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Appends `minimal=true|false` to `access_url`.
///
/// Existing query parameters are kept byte-for-byte and in order.  A
/// `minimal` parameter that is already present is dropped first, so the
/// result always carries exactly one.
///
/// # Errors
///
/// Returns [`UrlError::InvalidUrl`] if `access_url` cannot be parsed.
///
/// # Example
///
/// ```rust
/// use workflows_core::compose_load_url;
///
/// let url = compose_load_url("https://view.example.com/session/xyz", true).unwrap();
/// assert_eq!(url.as_str(), "https://view.example.com/session/xyz?minimal=true");
/// ```
pub fn compose_load_url(access_url: &str, minimal: bool) -> Result<Url, UrlError> {
    let mut url = Url::parse(access_url).map_err(|e| UrlError::InvalidUrl {
        url: access_url.to_string(),
        reason: e.to_string(),
    })?;

    let mut pairs: Vec<String> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_minimal_pair(pair))
        .map(str::to_string)
        .collect();
    pairs.push(format!("{MINIMAL_PARAM}={minimal}"));

    url.set_query(Some(&pairs.join("&")));
    Ok(url)
}

/// `true` if a raw `key=value` query segment has the key `minimal`.
///
/// The key is percent-decoded first so `min%69mal=1` is recognised too.
fn is_minimal_pair(pair: &str) -> bool {
    form_urlencoded::parse(pair.as_bytes())
        .next()
        .map(|(key, _)| key == MINIMAL_PARAM)
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
