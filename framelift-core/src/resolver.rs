//! Choosing between direct and proxied embedding.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_COOPERATIVE_HOST;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Embed the raw URL; the host allows framing.
    Direct,
    /// Route through the rewriting proxy.
    Proxied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyResolver {
    cooperative_host: String,
}

impl Default for StrategyResolver {
    fn default() -> Self {
        Self::new(DEFAULT_COOPERATIVE_HOST)
    }
}

impl StrategyResolver {
    #[must_use]
    pub fn new(cooperative_host: impl Into<String>) -> Self {
        Self {
            cooperative_host: cooperative_host.into(),
        }
    }

    #[must_use]
    pub fn cooperative_host(&self) -> &str {
        &self.cooperative_host
    }

    /// Pick a strategy for `url`.
    ///
    /// This is a plain substring test: the identifier matches anywhere in the URL,
    /// including the path and query string.
    #[must_use]
    pub fn resolve(&self, url: &str) -> Strategy {
        if !self.cooperative_host.is_empty() && url.contains(&self.cooperative_host) {
            Strategy::Direct
        } else {
            Strategy::Proxied
        }
    }
}
