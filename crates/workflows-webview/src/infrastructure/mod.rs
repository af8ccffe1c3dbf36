//! Infrastructure layer for workflows-webview.
//!
//! Concrete adapters for the traits the application layer defines: an HTTP
//! token endpoint built on `reqwest`, an in-process rendering surface, and
//! TOML configuration loading.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `workflows_core`.  The `application` layer only names the one adapter it
//! wires by default ([`HttpTokenEndpoint`]).

pub mod config_file;
pub mod headless_surface;
pub mod http_endpoint;

pub use config_file::{load_config, parse_config, ConfigFileError, FileConfig};
pub use headless_surface::HeadlessSurface;
pub use http_endpoint::HttpTokenEndpoint;
