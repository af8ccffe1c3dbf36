//! Application layer for workflows-webview.
//!
//! The application layer knows *what* a session does, and delegates *how*
//! to the traits it defines:
//!
//! - [`TokenEndpoint`] performs the authenticated GET.
//! - [`RenderSurface`] loads URLs and routes script messages.
//!
//! # Responsibilities
//!
//! - Negotiating an access URL and enforcing the "pristine" precondition
//! - Decoding inbound script messages and dispatching them to host callbacks
//! - Sequencing the session start so nothing loads before negotiation succeeds
//!
//! # What does NOT belong here?
//!
//! - Building HTTP requests by hand (that is `infrastructure::http_endpoint`)
//! - Any concrete web view implementation

pub mod message_bridge;
pub mod session;
pub mod session_negotiator;
pub mod surface;

pub use message_bridge::{BridgeRegistration, DispatchOutcome, HandlerRegistry, MessageBridge};
pub use session::{EmbeddedSession, WorkflowsWebview};
pub use session_negotiator::{
    NegotiatedSession, NegotiationError, SessionNegotiator, TokenEndpoint, TransportError,
};
pub use surface::{RenderSurface, ScriptMessageHandler, SurfaceSettings};
