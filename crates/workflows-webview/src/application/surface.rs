//! The rendering-surface seam.
//!
//! A rendering surface is whatever the host uses to show web content: a
//! platform web view, an embedded browser, or the in-process
//! [`HeadlessSurface`] used by the CLI and tests.  The session logic only
//! needs five things from it, captured by [`RenderSurface`].
//!
//! Messages posted by the page on a named channel are routed by the surface
//! to the [`ScriptMessageHandler`] registered under that name.  At most one
//! handler is registered per name.
//!
//! [`HeadlessSurface`]: crate::infrastructure::HeadlessSurface

use std::sync::Arc;

use url::Url;
use workflows_core::ScriptMessage;

/// Presentation flags applied to a surface before it loads a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSettings {
    /// Swipe-to-go-back / forward gestures.
    pub back_forward_gestures: bool,
    /// Play video inline instead of full screen.
    pub inline_media_playback: bool,
    /// Require a tap before media starts playing.
    pub media_requires_user_gesture: bool,
}

impl SurfaceSettings {
    /// Settings for an embedded workflow.
    ///
    /// Workflows drive their own navigation, so back/forward gestures are
    /// off.  Identity-verification steps stream camera video, so media plays
    /// inline without waiting for a tap.
    pub fn embedded_workflow() -> Self {
        Self {
            back_forward_gestures: false,
            inline_media_playback: true,
            media_requires_user_gesture: false,
        }
    }
}

/// Receives messages posted by the page on a channel.
///
/// Implementations are called from whatever thread the surface delivers
/// events on and must never panic on malformed input.
pub trait ScriptMessageHandler: Send + Sync {
    fn did_receive(&self, message: ScriptMessage);
}

/// What the session needs from a rendering surface.
#[cfg_attr(test, mockall::automock)]
pub trait RenderSurface: Send + Sync {
    /// Applies presentation flags.
    fn apply_settings(&self, settings: SurfaceSettings);

    /// Installs `handler` for messages posted on `channel`.
    fn add_message_handler(&self, channel: &str, handler: Arc<dyn ScriptMessageHandler>);

    /// Removes whatever handler is installed for `channel`, if any.
    fn remove_message_handler(&self, channel: &str);

    /// The handler currently installed for `channel`.
    fn message_handler(&self, channel: &str) -> Option<Arc<dyn ScriptMessageHandler>>;

    /// Navigates to `url`.
    fn load(&self, url: &Url);
}

/// `true` if both handles point at the same handler instance.
///
/// Compares data pointers only; two `Arc<dyn _>` to the same object can carry
/// different vtable pointers across codegen units.
pub fn same_handler(a: &Arc<dyn ScriptMessageHandler>, b: &Arc<dyn ScriptMessageHandler>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
