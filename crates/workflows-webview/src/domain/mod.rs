//! Domain layer for workflows-webview.
//!
//! Plain types with no I/O: the bundled bridge configuration and the error
//! taxonomy reported to host code.
//!
//! # What does NOT belong here?
//!
//! - Any `reqwest`, `tokio`, or surface types
//! - Reading config files or environment variables

pub mod config;
pub mod error;

pub use config::WebviewConfig;
pub use error::{ErrorKind, SetupError, WebviewError};
