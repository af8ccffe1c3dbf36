//! workflows-webview library crate.
//!
//! This crate embeds a remotely hosted workflow UI inside a host's rendering
//! surface (a web view) and relays the events that UI posts back to host
//! callbacks.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Host code ── on_workflow / on_step / start ──▶ WorkflowsWebview
//!                                                  │
//!   ┌───────────────────────────────────────────────┘
//!   ▼
//! [workflows-webview]
//!   ├── domain/           WebviewConfig, ErrorKind, WebviewError
//!   ├── application/
//!   │     ├── surface/            RenderSurface + ScriptMessageHandler traits
//!   │     ├── session_negotiator/ API key + uuid → access URL
//!   │     ├── message_bridge/     script message → Workflow / Step callback
//!   │     └── session/            the `start` sequence
//!   └── infrastructure/
//!         ├── http_endpoint/      reqwest implementation of TokenEndpoint
//!         ├── headless_surface/   in-process RenderSurface
//!         └── config_file/        TOML configuration
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `workflows-core`, and reaches the
//!   outside world only through the `TokenEndpoint` and `RenderSurface` traits.
//!   The one exception is `WorkflowsWebview::from_config`, which wires the
//!   default `reqwest` endpoint.
//! - `infrastructure` provides the concrete implementations of those traits.
//!
//! # For beginners: why the traits?
//!
//! The web view and the HTTP client are both owned by someone else.  Putting
//! a trait at each seam lets the session logic be tested with in-memory fakes
//! and lets a host plug in whichever web view its platform offers.

/// Domain layer: configuration and the public error taxonomy.
pub mod domain;

/// Application layer: negotiation, message bridging, and session start.
pub mod application;

/// Infrastructure layer: HTTP endpoint, headless surface, config file.
pub mod infrastructure;

pub use application::session::{EmbeddedSession, WorkflowsWebview};
pub use application::surface::{RenderSurface, ScriptMessageHandler, SurfaceSettings};
pub use domain::{ErrorKind, SetupError, WebviewConfig, WebviewError};
pub use workflows_core::{DecodingOptions, SessionConfig, Step, Workflow};
