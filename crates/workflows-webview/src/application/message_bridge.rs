//! The message bridge: script messages in, typed callbacks out.
//!
//! A [`MessageBridge`] is installed on a surface as the handler for one
//! channel.  For every message it receives it:
//!
//! 1. ignores it unless it arrived on the bridge's channel,
//! 2. decodes it with [`workflows_core::decode_message`],
//! 3. invokes the host's step or workflow callback, if one is set.
//!
//! A message that fails to decode is logged and dropped.  Nothing a page
//! posts can panic the host or stop later messages from being delivered.
//!
//! # Attach / detach
//!
//! [`MessageBridge::attach`] first removes whatever is registered under the
//! channel, then installs the bridge, so attaching twice never produces
//! duplicate deliveries.  It returns a [`BridgeRegistration`]; dropping that
//! (or calling [`BridgeRegistration::detach`]) removes the bridge again,
//! unless another bridge has taken the channel over in the meantime.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};
use uuid::Uuid;
use workflows_core::{
    decode_message, DecodingOptions, EntityKind, EnvelopeError, InboundEvent, ScriptMessage, Step,
    Workflow,
};

use crate::application::surface::{same_handler, RenderSurface, ScriptMessageHandler};

/// Host callback for workflow updates.
pub type WorkflowHandler = Arc<dyn Fn(Workflow) + Send + Sync>;

/// Host callback for step updates.
pub type StepHandler = Arc<dyn Fn(Step) + Send + Sync>;

// ── Handler registry ──────────────────────────────────────────────────────────

/// The host's callbacks, shared between the webview and its bridges.
///
/// Setting a handler takes effect for the next message, including messages
/// for sessions that are already running.
#[derive(Default)]
pub struct HandlerRegistry {
    workflow: RwLock<Option<WorkflowHandler>>,
    step: RwLock<Option<StepHandler>>,
}

impl HandlerRegistry {
    pub fn set_workflow(&self, handler: WorkflowHandler) {
        *self.workflow.write().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    pub fn set_step(&self, handler: StepHandler) {
        *self.step.write().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    // The lock is released before the handler runs, so a handler may
    // replace itself without deadlocking.
    fn workflow(&self) -> Option<WorkflowHandler> {
        self.workflow.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn step(&self) -> Option<StepHandler> {
        self.step.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

// ── Dispatch outcome ──────────────────────────────────────────────────────────

/// What the bridge did with one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message was for another channel.
    ForeignChannel,
    /// The message could not be decoded and was dropped.
    Dropped(EnvelopeError),
    /// The message decoded but no handler was set for its entity.
    NoHandler(EntityKind),
    /// The handler for this entity was invoked.
    Delivered(EntityKind),
}

// ── Bridge ────────────────────────────────────────────────────────────────────

/// Decodes script messages on one channel and dispatches them to host
/// callbacks.
pub struct MessageBridge {
    channel: String,
    options: DecodingOptions,
    handlers: Arc<HandlerRegistry>,
    session_id: Uuid,
}

impl MessageBridge {
    pub fn new(
        channel: impl Into<String>,
        options: DecodingOptions,
        handlers: Arc<HandlerRegistry>,
        session_id: Uuid,
    ) -> Self {
        Self {
            channel: channel.into(),
            options,
            handlers,
            session_id,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Installs this bridge on `surface` under its channel.
    ///
    /// Any handler already registered under the channel is removed first.
    pub fn attach(self: &Arc<Self>, surface: Arc<dyn RenderSurface>) -> BridgeRegistration {
        let handler: Arc<dyn ScriptMessageHandler> = Arc::clone(self) as Arc<dyn ScriptMessageHandler>;

        surface.remove_message_handler(&self.channel);
        surface.add_message_handler(&self.channel, Arc::clone(&handler));
        debug!("session {}: bridge attached on channel `{}`", self.session_id, self.channel);

        BridgeRegistration {
            surface,
            channel: self.channel.clone(),
            handler,
            detach_on_drop: true,
        }
    }

    /// Decodes and dispatches one message.
    ///
    /// Never panics and never returns an error; the outcome is reported for
    /// logging and tests.
    pub fn handle_message(&self, message: ScriptMessage) -> DispatchOutcome {
        if message.channel != self.channel {
            debug!(
                "session {}: ignoring message on foreign channel `{}`",
                self.session_id, message.channel
            );
            return DispatchOutcome::ForeignChannel;
        }

        let event = match decode_message(&message.body, &self.options) {
            Ok(event) => event,
            Err(e) => {
                warn!("session {}: dropping undecodable message: {e}", self.session_id);
                return DispatchOutcome::Dropped(e);
            }
        };

        let kind = event.kind();
        let delivered = match event {
            InboundEvent::Step(step) => match self.handlers.step() {
                Some(handler) => {
                    debug!("session {}: step `{}` received", self.session_id, step.id);
                    handler(step);
                    true
                }
                None => false,
            },
            InboundEvent::Workflow(workflow) => match self.handlers.workflow() {
                Some(handler) => {
                    debug!(
                        "session {}: workflow `{}` received (status `{}`)",
                        self.session_id, workflow.id, workflow.status
                    );
                    handler(workflow);
                    true
                }
                None => false,
            },
        };

        if delivered {
            DispatchOutcome::Delivered(kind)
        } else {
            debug!("session {}: no handler for {kind:?}; message dropped", self.session_id);
            DispatchOutcome::NoHandler(kind)
        }
    }
}

impl ScriptMessageHandler for MessageBridge {
    fn did_receive(&self, message: ScriptMessage) {
        self.handle_message(message);
    }
}

// ── Registration ──────────────────────────────────────────────────────────────

/// Keeps a bridge installed on a surface.
///
/// By default dropping the registration removes the bridge from the
/// surface, but only if the bridge is still the handler for the channel.  A
/// registration that has been superseded by a later attach leaves the newer
/// handler alone.
#[must_use = "dropping the registration detaches the bridge"]
pub struct BridgeRegistration {
    surface: Arc<dyn RenderSurface>,
    channel: String,
    handler: Arc<dyn ScriptMessageHandler>,
    detach_on_drop: bool,
}

impl BridgeRegistration {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// `true` while this registration's bridge is the surface's handler.
    pub fn is_active(&self) -> bool {
        self.surface
            .message_handler(&self.channel)
            .map(|current| same_handler(&current, &self.handler))
            .unwrap_or(false)
    }

    /// Removes the bridge from the surface now.
    pub fn detach(mut self) {
        self.detach_on_drop = false;
        self.remove_if_active();
    }

    /// Leaves the bridge installed for the lifetime of the surface.
    pub fn keep_attached(mut self) {
        self.detach_on_drop = false;
    }

    /// Whether dropping this registration removes the bridge.
    pub(crate) fn set_detach_on_drop(&mut self, detach_on_drop: bool) {
        self.detach_on_drop = detach_on_drop;
    }

    fn remove_if_active(&self) {
        if self.is_active() {
            self.surface.remove_message_handler(&self.channel);
            debug!("bridge detached from channel `{}`", self.channel);
        }
    }
}

impl Drop for BridgeRegistration {
    fn drop(&mut self) {
        if self.detach_on_drop {
            self.remove_if_active();
        }
    }
}

impl std::fmt::Debug for BridgeRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeRegistration")
            .field("channel", &self.channel)
            .field("detach_on_drop", &self.detach_on_drop)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
