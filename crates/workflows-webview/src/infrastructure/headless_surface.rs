//! An in-process rendering surface.
//!
//! [`HeadlessSurface`] does what a web view does for the session, minus the
//! rendering: it remembers settings and navigations, keeps one handler per
//! channel, and routes posted messages to that handler.  The CLI uses it to
//! replay captured messages, and tests use it in place of a real web view.
//!
//! # For beginners: posting a message
//!
//! In a browser, page script calls something like
//! `window.webkit.messageHandlers.workflowsWebview.postMessage({...})`.
//! [`HeadlessSurface::post_message`] is the in-process equivalent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::debug;
use url::Url;
use workflows_core::ScriptMessage;

use crate::application::surface::{RenderSurface, ScriptMessageHandler, SurfaceSettings};

/// A rendering surface with no renderer.
#[derive(Default)]
pub struct HeadlessSurface {
    handlers: Mutex<HashMap<String, Arc<dyn ScriptMessageHandler>>>,
    settings: Mutex<Option<SurfaceSettings>>,
    loaded: Mutex<Vec<Url>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `body` to the handler registered under `channel`.
    ///
    /// Returns `false` if no handler is registered; the message is dropped.
    pub fn post_message(&self, channel: &str, body: Value) -> bool {
        // Clone the handler out so it runs without the map locked; a handler
        // may re-register itself.
        let handler = self.message_handler(channel);
        match handler {
            Some(handler) => {
                handler.did_receive(ScriptMessage::new(channel, body));
                true
            }
            None => {
                debug!("no handler for channel `{channel}`; message dropped");
                false
            }
        }
    }

    /// Records that navigating to `url` failed.
    ///
    /// Navigation failures after a successful start are informational only;
    /// they never change the outcome already reported for the session.
    pub fn report_navigation_failure(&self, url: &Url, reason: &str) {
        debug!("navigation to {url} failed: {reason}");
    }

    /// Every URL loaded so far, oldest first.
    pub fn loaded_urls(&self) -> Vec<Url> {
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_loaded(&self) -> Option<Url> {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// The settings most recently applied, if any.
    pub fn settings(&self) -> Option<SurfaceSettings> {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RenderSurface for HeadlessSurface {
    fn apply_settings(&self, settings: SurfaceSettings) {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = Some(settings);
    }

    fn add_message_handler(&self, channel: &str, handler: Arc<dyn ScriptMessageHandler>) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(channel.to_string(), handler);
    }

    fn remove_message_handler(&self, channel: &str) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(channel);
    }

    fn message_handler(&self, channel: &str) -> Option<Arc<dyn ScriptMessageHandler>> {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(channel)
            .cloned()
    }

    fn load(&self, url: &Url) {
        debug!("loading {url}");
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
    }
}

impl std::fmt::Debug for HeadlessSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channels: Vec<String> = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("HeadlessSurface")
            .field("channels", &channels)
            .field("settings", &self.settings())
            .field("loaded", &self.loaded_urls())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
