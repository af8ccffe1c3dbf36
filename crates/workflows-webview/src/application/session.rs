//! The host-facing entry point and the session start sequence.
//!
//! [`WorkflowsWebview`] is what host code holds.  It owns the configuration,
//! the negotiator, and the host's callbacks.  Each call to
//! [`WorkflowsWebview::start`] runs one session:
//!
//! ```text
//! 1. apply_settings      gestures off, inline media on
//! 2. attach bridge       under "workflowsWebview", replacing any previous one
//! 3. negotiate           ── Err ─▶ return mapped error, nothing loaded
//! 4. compose load URL    ── Err ─▶ InternalError, nothing loaded
//! 5. surface.load(url)
//! 6. Ok(EmbeddedSession)
//! ```
//!
//! The bridge is attached before navigation so no early message is missed.
//!
//! # For beginners: who keeps the bridge alive?
//!
//! The surface holds the bridge.  Once a session has started, the bridge
//! keeps listening for as long as the surface lives, whether or not the host
//! keeps the returned [`EmbeddedSession`].  Call
//! [`EmbeddedSession::detach`] to stop listening, or start another session
//! on the same surface to replace it.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, info_span, Instrument};
use url::Url;
use uuid::Uuid;
use workflows_core::{
    compose_load_url, SessionConfig, Step, Workflow, WorkflowStatus, CHANNEL_NAME,
};

use crate::application::message_bridge::{BridgeRegistration, HandlerRegistry, MessageBridge};
use crate::application::session_negotiator::{SessionNegotiator, TokenEndpoint};
use crate::application::surface::{RenderSurface, SurfaceSettings};
use crate::domain::{SetupError, WebviewConfig, WebviewError};
use crate::infrastructure::HttpTokenEndpoint;

// ── WorkflowsWebview ──────────────────────────────────────────────────────────

/// Embeds workflows in rendering surfaces and relays their events.
///
/// Cheap to clone; clones share configuration and callbacks.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use workflows_webview::{infrastructure::HeadlessSurface, WorkflowsWebview};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let webview = WorkflowsWebview::new("my-api-key")?;
/// webview.on_step(|step| println!("step {} done={}", step.id, step.done));
///
/// let surface = Arc::new(HeadlessSurface::new());
/// let session = webview.start("abc-123", surface, true).await?;
/// println!("loaded {}", session.load_url());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WorkflowsWebview {
    config: Arc<WebviewConfig>,
    negotiator: Arc<SessionNegotiator>,
    handlers: Arc<HandlerRegistry>,
}

impl WorkflowsWebview {
    /// Targets the default backend.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Config`] for a blank API key, or
    /// [`SetupError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, SetupError> {
        Self::from_config(WebviewConfig::new(SessionConfig::new(api_key)?))
    }

    /// Targets a custom backend.
    ///
    /// # Errors
    ///
    /// As [`WorkflowsWebview::new`], plus [`SetupError::Config`] for an
    /// unusable base URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> Result<Self, SetupError> {
        Self::from_config(WebviewConfig::new(SessionConfig::with_base_url(
            api_key, base_url,
        )?))
    }

    /// Builds a bridge that talks HTTP through `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::HttpClient`] if the HTTP client cannot be built.
    pub fn from_config(config: WebviewConfig) -> Result<Self, SetupError> {
        let endpoint =
            HttpTokenEndpoint::new().map_err(|e| SetupError::HttpClient(e.to_string()))?;
        Ok(Self::with_endpoint(config, Arc::new(endpoint)))
    }

    /// Builds a bridge over any [`TokenEndpoint`].
    pub fn with_endpoint(config: WebviewConfig, endpoint: Arc<dyn TokenEndpoint>) -> Self {
        let negotiator = SessionNegotiator::new(endpoint, config.legacy_tunnel_host.clone());
        Self {
            config: Arc::new(config),
            negotiator: Arc::new(negotiator),
            handlers: Arc::new(HandlerRegistry::default()),
        }
    }

    pub fn config(&self) -> &WebviewConfig {
        &self.config
    }

    /// Sets the callback for workflow updates, replacing any previous one.
    pub fn on_workflow<F>(&self, handler: F)
    where
        F: Fn(Workflow) + Send + Sync + 'static,
    {
        self.handlers.set_workflow(Arc::new(handler));
    }

    /// Sets the callback for step updates, replacing any previous one.
    pub fn on_step<F>(&self, handler: F)
    where
        F: Fn(Step) + Send + Sync + 'static,
    {
        self.handlers.set_step(Arc::new(handler));
    }

    /// Starts a session for workflow `uuid` on `surface`.
    ///
    /// Performs one token request.  On any failure the surface is never
    /// navigated and the bridge is detached again.  On success the bridge
    /// stays attached until [`EmbeddedSession::detach`] is called or another
    /// `start` on the same surface replaces it.
    ///
    /// # Errors
    ///
    /// - [`WebviewError::NegotiationFailed`] if the token request failed.
    /// - [`WebviewError::WorkflowNotUsable`] if the workflow is not pristine.
    /// - [`WebviewError::Internal`] for a malformed response or load URL.
    pub async fn start(
        &self,
        uuid: &str,
        surface: Arc<dyn RenderSurface>,
        minimal: bool,
    ) -> Result<EmbeddedSession, WebviewError> {
        let session_id = Uuid::new_v4();
        let span = info_span!("session", id = %session_id, workflow = %uuid);
        self.run_start(session_id, uuid, surface, minimal)
            .instrument(span)
            .await
    }

    /// Runs [`start`](Self::start) on the Tokio runtime and reports the
    /// outcome to `completion`, exactly once.
    ///
    /// Must be called from within a Tokio runtime.  Aborting the returned
    /// handle cancels the session; `completion` is then never called.
    pub fn start_with_completion<F>(
        &self,
        uuid: impl Into<String>,
        surface: Arc<dyn RenderSurface>,
        minimal: bool,
        completion: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<EmbeddedSession, WebviewError>) + Send + 'static,
    {
        let webview = self.clone();
        let uuid = uuid.into();
        tokio::spawn(async move {
            let result = webview.start(&uuid, surface, minimal).await;
            completion(result);
        })
    }

    async fn run_start(
        &self,
        session_id: Uuid,
        uuid: &str,
        surface: Arc<dyn RenderSurface>,
        minimal: bool,
    ) -> Result<EmbeddedSession, WebviewError> {
        surface.apply_settings(SurfaceSettings::embedded_workflow());

        let bridge = Arc::new(MessageBridge::new(
            CHANNEL_NAME,
            self.config.decoding,
            Arc::clone(&self.handlers),
            session_id,
        ));
        // Detach again if any step below fails.
        let mut registration = bridge.attach(Arc::clone(&surface));

        let negotiated = self
            .negotiator
            .negotiate(uuid, &self.config.session)
            .await
            .map_err(WebviewError::from)?;

        let load_url = compose_load_url(&negotiated.access_url, minimal)
            .map_err(|e| WebviewError::Internal(e.to_string()))?;

        surface.load(&load_url);
        info!("workflow loaded (minimal={minimal})");
        registration.set_detach_on_drop(false);

        Ok(EmbeddedSession {
            id: session_id,
            load_url,
            status: negotiated.status,
            registration,
        })
    }
}

impl std::fmt::Debug for WorkflowsWebview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowsWebview")
            .field("base_url", &self.config.session.base_url().as_str())
            .field("decoding", &self.config.decoding)
            .finish_non_exhaustive()
    }
}

// ── EmbeddedSession ───────────────────────────────────────────────────────────

/// A successfully started session.
///
/// Dropping it leaves the bridge listening; use [`detach`](Self::detach) to
/// stop relaying messages.
#[derive(Debug)]
pub struct EmbeddedSession {
    id: Uuid,
    load_url: Url,
    status: WorkflowStatus,
    registration: BridgeRegistration,
}

impl EmbeddedSession {
    /// Identifier used in this session's log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The URL the surface was navigated to.
    pub fn load_url(&self) -> &Url {
        &self.load_url
    }

    pub fn status(&self) -> &WorkflowStatus {
        &self.status
    }

    /// `true` while this session's bridge is installed on the surface.
    pub fn is_attached(&self) -> bool {
        self.registration.is_active()
    }

    /// Stops relaying messages for this session.
    ///
    /// Does nothing if a later session has already replaced the bridge.
    pub fn detach(self) {
        self.registration.detach();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
