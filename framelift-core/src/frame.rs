//! Description of the overlay and iframe a session mounts.
//!
//! A [`FrameSpec`] is the platform-neutral blueprint: the browser surface turns it into
//! DOM nodes, the CLI renders it as markup.

use serde::{Deserialize, Serialize};

use crate::resolver::Strategy;

/// Sandbox tokens granted by [`SandboxPolicy::Permissive`].
pub const PERMISSIVE_SANDBOX: [&str; 9] = [
    "allow-forms",
    "allow-modals",
    "allow-orientation-lock",
    "allow-pointer-lock",
    "allow-popups",
    "allow-popups-to-escape-sandbox",
    "allow-presentation",
    "allow-same-origin",
    "allow-scripts",
];

pub const OVERLAY_INLINE_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100%; height: 100%; z-index: 9999; background: #000;";
pub const FRAME_INLINE_STYLE: &str =
    "width: 100%; height: 100%; border: none; position: absolute; top: 0; left: 0;";
pub const CLOSE_BUTTON_INLINE_STYLE: &str = "position: absolute; top: 10px; right: 10px; z-index: 10000; padding: 8px 16px; background: rgba(0,0,0,0.7); color: white; border: none; border-radius: 4px; cursor: pointer;";
pub const FULLSCREEN_BUTTON_INLINE_STYLE: &str = "position: absolute; top: 10px; right: 90px; z-index: 10000; padding: 8px 16px; background: rgba(0,0,0,0.7); color: white; border: none; border-radius: 4px; cursor: pointer;";
pub const BADGE_INLINE_STYLE: &str = "position: absolute; bottom: 10px; left: 10px; color: rgba(255,255,255,0.5); font-size: 12px;";

pub const DIRECT_BADGE: &str = "Direct CrazyGames Embed";
pub const PROXIED_BADGE: &str = "UV-Style Bypass Active";
pub const COOPERATIVE_PROXY_BADGE: &str = "CrazyGames Proxy Active";

/// Sandbox restrictions placed on the embedded iframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SandboxPolicy {
    /// Forms, modals, orientation and pointer lock, popups (and escaping them),
    /// presentation, same-origin and scripts.
    #[default]
    Permissive,
    /// No `sandbox` attribute at all.
    None,
}

impl SandboxPolicy {
    #[must_use]
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            Self::Permissive => &PERMISSIVE_SANDBOX,
            Self::None => &[],
        }
    }

    /// Value for the iframe `sandbox` attribute, or `None` when it must be omitted.
    #[must_use]
    pub fn attribute(self) -> Option<String> {
        match self {
            Self::Permissive => Some(PERMISSIVE_SANDBOX.join(" ")),
            Self::None => None,
        }
    }
}

/// Whether overlay elements carry inline positioning or rely on page stylesheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayStyle {
    #[default]
    Inline,
    Classes,
}

/// Where a failed embed sends the user instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTarget {
    /// Hand the game back to the host page's ordinary open path.
    Host,
    /// Open the raw URL in a new browsing context.
    NewTab,
}

/// Presentation knobs that vary between the open paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOptions {
    pub sandbox: SandboxPolicy,
    pub style: OverlayStyle,
    pub scrolling: bool,
    pub badge: String,
    pub fallback: NavigationTarget,
}

impl FrameOptions {
    /// Options used by the bypass path for the given strategy.
    #[must_use]
    pub fn for_strategy(strategy: Strategy, sandbox: SandboxPolicy) -> Self {
        match strategy {
            Strategy::Direct => Self {
                sandbox,
                style: OverlayStyle::Inline,
                scrolling: true,
                badge: DIRECT_BADGE.to_string(),
                fallback: NavigationTarget::Host,
            },
            Strategy::Proxied => Self {
                sandbox,
                style: OverlayStyle::Inline,
                scrolling: false,
                badge: PROXIED_BADGE.to_string(),
                fallback: NavigationTarget::Host,
            },
        }
    }

    /// Options used when a cooperative-host game is forced through the proxy.
    #[must_use]
    pub fn cooperative(sandbox: SandboxPolicy) -> Self {
        Self {
            sandbox,
            style: OverlayStyle::Classes,
            scrolling: true,
            badge: COOPERATIVE_PROXY_BADGE.to_string(),
            fallback: NavigationTarget::NewTab,
        }
    }
}

/// Everything a surface needs to build the overlay for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub container_id: String,
    pub iframe_url: String,
    pub sandbox: SandboxPolicy,
    pub style: OverlayStyle,
    pub scrolling: bool,
    pub badge: String,
}

impl FrameSpec {
    #[must_use]
    pub fn new(container_id: &str, iframe_url: String, options: &FrameOptions) -> Self {
        Self {
            container_id: container_id.to_string(),
            iframe_url,
            sandbox: options.sandbox,
            style: options.style,
            scrolling: options.scrolling,
            badge: options.badge.clone(),
        }
    }

    #[must_use]
    pub const fn inline(&self) -> bool {
        matches!(self.style, OverlayStyle::Inline)
    }
}
