//! Wire protocols spoken by the host.
//!
//! There are two conversations, one on each side of the host:
//!
//! ```text
//! backend  ──(token response JSON)──▶  token::TokenResponse
//!                                       │
//!                                       ▼
//!                              load_url::compose_load_url ──▶ surface.load()
//!
//! embedded page ──(script message)──▶  envelope::decode_message ──▶ InboundEvent
//! ```
//!
//! Every function in this module is pure: no I/O, no global state.

pub mod envelope;
pub mod load_url;
pub mod token;

pub use envelope::{
    decode_entity, decode_message, EntityKind, EnvelopeError, InboundEvent, ScriptMessage,
};
pub use load_url::{compose_load_url, UrlError};
pub use token::{TokenResponse, TokenResponseError};
