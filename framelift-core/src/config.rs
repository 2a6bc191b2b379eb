//! Runtime configuration for the bypass engine.

use serde::{Deserialize, Serialize};

use crate::frame::SandboxPolicy;

pub const DEFAULT_PROXY_BASE: &str = "https://classlinkapps.derekter127.workers.dev";
pub const DEFAULT_COOPERATIVE_HOST: &str = "games.crazygames.com";
pub const DEFAULT_HISTORY_KEY: &str = "bypassGames";
pub const DEFAULT_HISTORY_CAP: usize = 20;
pub const DEFAULT_CONTAINER_ID: &str = "iframe-container";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JSON parsing error: {0}")]
    Json(String),
    #[error("proxy base must not be empty")]
    EmptyProxyBase,
    #[error("proxy base must use http or https: {0}")]
    UnsupportedScheme(String),
    #[error("history cap must be at least 1")]
    ZeroHistoryCap,
    #[error("container id must not be empty")]
    EmptyContainerId,
}

/// Settings shared by every platform build.
///
/// Each field falls back to its default when absent from the JSON source, so a
/// host page only needs to spell out what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BypassConfig {
    pub proxy_base: String,
    pub cooperative_host: String,
    pub history_key: String,
    pub history_cap: usize,
    pub container_id: String,
    pub direct_sandbox: SandboxPolicy,
    pub proxied_sandbox: SandboxPolicy,
    pub cooperative_sandbox: SandboxPolicy,
    pub encode_timeout_ms: Option<u32>,
}

impl Default for BypassConfig {
    fn default() -> Self {
        Self {
            proxy_base: DEFAULT_PROXY_BASE.to_string(),
            cooperative_host: DEFAULT_COOPERATIVE_HOST.to_string(),
            history_key: DEFAULT_HISTORY_KEY.to_string(),
            history_cap: DEFAULT_HISTORY_CAP,
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            direct_sandbox: SandboxPolicy::default(),
            proxied_sandbox: SandboxPolicy::default(),
            cooperative_sandbox: SandboxPolicy::default(),
            encode_timeout_ms: None,
        }
    }
}

impl BypassConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validated()
    }

    /// Normalise the proxy base and check the invariants every consumer relies on.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy base, history cap or container id is unusable.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.proxy_base.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyProxyBase);
        }
        let lower = trimmed.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme(trimmed.to_string()));
        }
        self.proxy_base = trimmed.to_string();
        if self.history_cap == 0 {
            return Err(ConfigError::ZeroHistoryCap);
        }
        if self.container_id.trim().is_empty() {
            return Err(ConfigError::EmptyContainerId);
        }
        Ok(self)
    }

    /// Sandbox per path as the host page historically framed games: permissive for
    /// direct and cooperative embeds, no `sandbox` attribute on the proxied frame.
    #[must_use]
    pub fn with_split_sandboxes(mut self) -> Self {
        self.direct_sandbox = SandboxPolicy::Permissive;
        self.proxied_sandbox = SandboxPolicy::None;
        self.cooperative_sandbox = SandboxPolicy::Permissive;
        self
    }

    #[must_use]
    pub fn with_proxy_base(mut self, proxy_base: impl Into<String>) -> Self {
        self.proxy_base = proxy_base.into();
        self
    }
}
