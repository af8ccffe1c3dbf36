//! workflows-webview command-line driver.
//!
//! Negotiates a session for one workflow against the configured backend,
//! prints the URL a web view would load, and optionally replays captured
//! page messages through the bridge, printing every decoded entity.
//!
//! # Usage
//!
//! ```text
//! workflows-webview [OPTIONS] <WORKFLOW>
//!
//! Options:
//!   --api-key <KEY>              API key [env: WORKFLOWS_API_KEY]
//!   --base-url <URL>             Backend base URL [env: WORKFLOWS_BASE_URL]
//!   --config <PATH>              TOML config file
//!   --minimal                    Ask for the minimal UI
//!   --strict-decoding            Reject entity fields the bridge does not model
//!   --legacy-tunnel-host <URL>   Host for legacy `token_encoded` responses
//!   --replay <PATH>              JSON-lines file of message bodies to replay
//! ```
//!
//! Command-line values override the config file, which overrides the
//! library defaults.
//!
//! # Replay file format (for beginners)
//!
//! One JSON message body per line, exactly as the page would post it:
//!
//! ```text
//! {"entity":"workflow","value":{"id":"wf-1","status":"in_progress"}}
//! {"entity":"step","value":{"id":"s1","done":true}}
//! ```
//!
//! Each decoded entity is printed to stdout as `step {...}` or
//! `workflow {...}`.  Lines that are not JSON, or that the bridge cannot
//! decode, are logged and skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use workflows_webview::infrastructure::{load_config, FileConfig, HeadlessSurface};
use workflows_webview::{WebviewConfig, WorkflowsWebview};
use workflows_core::CHANNEL_NAME;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Embeds a remotely hosted workflow and relays its events.
#[derive(Debug, Parser)]
#[command(
    name = "workflows-webview",
    about = "Negotiate a workflow session and replay its page messages",
    version
)]
struct Cli {
    /// Identifier of the workflow to start.
    workflow: String,

    /// API key sent as the `Rem-ApiKey` header.
    #[arg(long, env = "WORKFLOWS_API_KEY")]
    api_key: Option<String>,

    /// Backend base URL.
    #[arg(long, env = "WORKFLOWS_BASE_URL")]
    base_url: Option<String>,

    /// TOML config file with `[session]`, `[decoding]` and `[legacy]`
    /// sections.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ask the workflow UI for its minimal presentation.
    #[arg(long)]
    minimal: bool,

    /// Reject entity fields the bridge does not model.
    #[arg(long)]
    strict_decoding: bool,

    /// Host that legacy `token_encoded` responses are resolved against.
    #[arg(long)]
    legacy_tunnel_host: Option<String>,

    /// JSON-lines file of message bodies to replay after the session starts.
    #[arg(long)]
    replay: Option<PathBuf>,
}

impl Cli {
    /// Merges the config file (if any) with command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or the merged
    /// values do not form a valid configuration.
    fn webview_config(&self) -> anyhow::Result<WebviewConfig> {
        let mut file = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("could not load config file {}", path.display()))?,
            None => FileConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            file.session.base_url = base_url.clone();
        }
        if self.strict_decoding {
            file.decoding.ignore_unknown_fields = false;
        }
        if let Some(host) = &self.legacy_tunnel_host {
            file.legacy.tunnel_host = Some(host.clone());
        }

        file.into_webview_config(self.api_key.clone())
            .context("invalid configuration (is WORKFLOWS_API_KEY set?)")
    }
}

// ── Replay ────────────────────────────────────────────────────────────────────

/// Posts every JSON line in `content` to the bridge channel on `surface`.
///
/// Returns the number of lines that reached a handler.
fn replay_lines(surface: &HeadlessSurface, content: &str) -> usize {
    let mut delivered = 0;
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(body) => {
                if surface.post_message(CHANNEL_NAME, body) {
                    delivered += 1;
                }
            }
            Err(e) => warn!("replay line {}: not JSON ({e}); skipped", index + 1),
        }
    }
    delivered
}

async fn replay_file(surface: &HeadlessSurface, path: &Path) -> anyhow::Result<usize> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("could not read replay file {}", path.display()))?;
    Ok(replay_lines(surface, &content))
}

/// Prints `label {json}` for a decoded entity.
fn print_entity<T: Serialize>(label: &str, entity: &T) {
    match serde_json::to_string(entity) {
        Ok(json) => println!("{label} {json}"),
        Err(e) => warn!("could not print {label}: {e}"),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` controls verbosity (e.g. `RUST_LOG=workflows_webview=debug`).
    // Logs go to stderr so stdout carries only the URL and replayed entities.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.webview_config()?;
    info!("using backend {}", config.session.base_url());

    let webview =
        WorkflowsWebview::from_config(config).context("could not set up the workflow bridge")?;
    webview.on_workflow(|workflow| print_entity("workflow", &workflow));
    webview.on_step(|step| print_entity("step", &step));

    let surface = Arc::new(HeadlessSurface::new());
    let session = webview
        .start(&cli.workflow, surface.clone(), cli.minimal)
        .await
        .with_context(|| format!("could not start workflow {}", cli.workflow))?;

    println!("{}", session.load_url());

    if let Some(path) = &cli.replay {
        let delivered = replay_file(&surface, path).await?;
        info!("replayed {delivered} message(s) from {}", path.display());
    }

    session.detach();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use uuid::Uuid;
    use workflows_core::DecodingOptions;
    use workflows_webview::application::{HandlerRegistry, MessageBridge};

    // ── CLI parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_cli_requires_only_workflow() {
        // Arrange / Act
        let cli = Cli::parse_from(["workflows-webview", "abc-123"]);

        // Assert
        assert_eq!(cli.workflow, "abc-123");
        assert!(!cli.minimal);
        assert!(!cli.strict_decoding);
        assert!(cli.replay.is_none());
    }

    #[test]
    fn test_cli_flags_parse() {
        let cli = Cli::parse_from([
            "workflows-webview",
            "--api-key",
            "key1",
            "--base-url",
            "https://api.example.com",
            "--minimal",
            "--strict-decoding",
            "--replay",
            "messages.jsonl",
            "abc-123",
        ]);
        assert_eq!(cli.api_key.as_deref(), Some("key1"));
        assert_eq!(cli.base_url.as_deref(), Some("https://api.example.com"));
        assert!(cli.minimal);
        assert!(cli.strict_decoding);
        assert_eq!(cli.replay, Some(PathBuf::from("messages.jsonl")));
    }

    // ── Config merging ────────────────────────────────────────────────────────

    #[test]
    fn test_cli_values_build_config() {
        // Arrange
        let cli = Cli::parse_from([
            "workflows-webview",
            "--api-key",
            "key1",
            "--base-url",
            "https://api.example.com",
            "--strict-decoding",
            "--legacy-tunnel-host",
            "https://tunnel.example.com",
            "abc-123",
        ]);

        // Act
        let config = cli.webview_config().unwrap();

        // Assert
        assert_eq!(config.session.api_key(), "key1");
        assert_eq!(config.session.base_url().host_str(), Some("api.example.com"));
        assert!(!config.decoding.ignore_unknown_fields);
        assert!(config.legacy_tunnel_host.is_some());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = Cli::parse_from([
            "workflows-webview",
            "--api-key",
            "key1",
            "--config",
            "/nonexistent/workflows.toml",
            "abc-123",
        ]);
        assert!(cli.webview_config().is_err());
    }

    // ── Replay ────────────────────────────────────────────────────────────────

    #[test]
    fn test_replay_skips_bad_lines_and_counts_deliveries() {
        // Arrange: a bridge recording step ids on a headless surface
        let surface = Arc::new(HeadlessSurface::new());
        let registry = Arc::new(HandlerRegistry::default());
        let steps = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&steps);
        registry.set_step(Arc::new(move |step: workflows_webview::Step| s.lock().unwrap().push(step.id)));
        let bridge = Arc::new(MessageBridge::new(
            CHANNEL_NAME,
            DecodingOptions::default(),
            registry,
            Uuid::new_v4(),
        ));
        let registration = bridge.attach(surface.clone());
        let content = concat!(
            "{\"entity\":\"step\",\"value\":{\"id\":\"s1\"}}\n",
            "\n",
            "not json\n",
            "{\"entity\":\"step\",\"value\":{\"id\":\"s2\"}}\n",
        );

        // Act
        let delivered = replay_lines(&surface, content);

        // Assert
        assert_eq!(delivered, 2);
        assert_eq!(*steps.lock().unwrap(), vec!["s1".to_string(), "s2".to_string()]);
        registration.detach();
    }

    #[test]
    fn test_replay_without_bridge_delivers_nothing() {
        let surface = HeadlessSurface::new();
        let delivered = replay_lines(&surface, "{\"entity\":\"step\",\"value\":{}}\n");
        assert_eq!(delivered, 0);
    }
}
