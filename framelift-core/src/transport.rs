//! HTTP seam to the remote rewriting proxy.

use async_trait::async_trait;
use serde::Serialize;

/// Failure talking to the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ProxyError {
    #[error("proxy unreachable: {0}")]
    Transport(String),
    #[error("proxy request timed out after {0} ms")]
    Timeout(u32),
    #[error("proxy answered with status {0}")]
    Status(u16),
    #[error("unexpected proxy response body: {0}")]
    MalformedBody(String),
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests on behalf of the codec and the connectivity probe.
///
/// Implementations map every transport-level failure onto [`ProxyError`]; they never
/// interpret status codes themselves.
#[async_trait(?Send)]
pub trait ProxyTransport {
    /// Fetch `url` and read the full body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body cannot be read.
    async fn get(&self, url: &str) -> Result<HttpReply, ProxyError>;

    /// Fetch `url` and report only the status code.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    async fn status(&self, url: &str) -> Result<u16, ProxyError> {
        self.get(url).await.map(|reply| reply.status)
    }
}

/// URLs of the three proxy endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoints {
    base: String,
}

impl ProxyEndpoints {
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `GET {base}/encode?url=<target>` returns `{ "encoded": "<token>" }`.
    #[must_use]
    pub fn encode_url(&self, target: &str) -> String {
        format!("{}/encode?url={}", self.base, urlencoding::encode(target))
    }

    /// `GET {base}/encoded?encoded=<token>` serves the rewritten game document.
    #[must_use]
    pub fn frame_url(&self, token: &str) -> String {
        format!("{}/encoded?encoded={}", self.base, urlencoding::encode(token))
    }

    /// Liveness endpoint.
    #[must_use]
    pub fn root_url(&self) -> String {
        format!("{}/", self.base)
    }
}
