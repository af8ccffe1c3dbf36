//! Domain layer for workflows-core.
//!
//! The domain layer contains the plain data the rest of the system talks
//! about.  Nothing here performs I/O or depends on a transport.
//!
//! # What belongs in the domain layer?
//!
//! - The entities reported by the embedded workflow UI (`Workflow`, `Step`)
//! - Session configuration and the decoding policy
//!
//! # What does NOT belong here?
//!
//! - HTTP requests, web views, or Tokio types
//! - Wire-format parsing of backend responses (that is `protocol`)

pub mod config;
pub mod entities;

pub use config::{ConfigError, DecodingOptions, SessionConfig};
pub use entities::{Entity, Step, Workflow, WorkflowStatus};
