//! # workflows-core
//!
//! Shared library for embedding remotely hosted workflows.  It contains the
//! pure (I/O-free) half of the system: the domain entities reported by the
//! embedded UI, session configuration, the token-response protocol, load-URL
//! composition, and the inbound script-message decoder.
//!
//! This crate has zero dependencies on HTTP clients, async runtimes, or any
//! particular rendering surface.  The `workflows-webview` crate wires these
//! pieces to a real transport and a real surface.
//!
//! # Architecture overview (for beginners)
//!
//! A host application shows a workflow UI that lives on a remote server.  To
//! do that safely it first trades an API key for a single-use access URL,
//! checks that the workflow has not been started yet, and then points a web
//! view at that URL.  While the user works through the workflow, the page
//! posts JSON messages back to the host describing what happened.
//!
//! - **`domain`** – What the host talks about: [`Workflow`], [`Step`],
//!   [`SessionConfig`] and [`DecodingOptions`].
//!
//! - **`protocol`** – How the host talks to the backend and to the page:
//!   parsing the token response, composing the final load URL, and turning
//!   a raw script message into a typed [`InboundEvent`].

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `workflows_core::Workflow` instead of `workflows_core::domain::entities::Workflow`.
pub use domain::config::{ConfigError, DecodingOptions, SessionConfig, DEFAULT_BASE_URL};
pub use domain::entities::{Entity, Step, Workflow, WorkflowStatus};
pub use protocol::envelope::{
    decode_message, EntityKind, EnvelopeError, InboundEvent, ScriptMessage, CHANNEL_NAME,
};
pub use protocol::token::{TokenResponse, TokenResponseError, API_KEY_HEADER};
pub use protocol::load_url::{compose_load_url, UrlError, MINIMAL_PARAM};
