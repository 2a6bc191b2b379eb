//! Game URL ⇄ proxy token conversion.
//!
//! The proxy hands out its own opaque tokens. When it cannot be reached the codec falls
//! back to standard base64 of the URL, which only [`decode`] knows how to reverse.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};

use crate::transport::{ProxyEndpoints, ProxyError, ProxyTransport};

/// Opaque token identifying a game URL to the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedToken(String);

impl EncodedToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EncodedToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("token is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("decoded token is not valid UTF-8")]
    InvalidUtf8,
}

/// Where a token came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "error", rename_all = "snake_case")]
pub enum TokenSource {
    Proxy,
    LocalFallback(ProxyError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeOutcome {
    pub token: EncodedToken,
    #[serde(flatten)]
    pub source: TokenSource,
}

impl EncodeOutcome {
    #[must_use]
    pub const fn used_fallback(&self) -> bool {
        matches!(self.source, TokenSource::LocalFallback(_))
    }
}

#[derive(Deserialize)]
struct EncodeReply {
    encoded: String,
}

/// Local reversible transform used when the proxy cannot encode.
#[must_use]
pub fn local_encode(url: &str) -> EncodedToken {
    EncodedToken(BASE64_STANDARD.encode(url.as_bytes()))
}

/// Reverse [`local_encode`].
///
/// # Errors
///
/// Returns an error if the token is not base64 or does not decode to UTF-8.
pub fn try_local_decode(token: &str) -> Result<String, CodecError> {
    let bytes = BASE64_STANDARD
        .decode(token.trim())
        .map_err(|e| CodecError::InvalidBase64(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
}

/// Reverse [`local_encode`], yielding an empty string for anything it did not produce.
///
/// Tokens minted by the proxy are not supported here.
#[must_use]
pub fn decode(token: &str) -> String {
    try_local_decode(token).unwrap_or_else(|e| {
        log::warn!("Failed to decode URL: {e}");
        String::new()
    })
}

/// Obtains tokens from the proxy's encode endpoint.
#[derive(Debug, Clone)]
pub struct UrlCodec<T> {
    transport: T,
    endpoints: ProxyEndpoints,
}

impl<T: ProxyTransport> UrlCodec<T> {
    pub const fn new(transport: T, endpoints: ProxyEndpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    #[must_use]
    pub const fn endpoints(&self) -> &ProxyEndpoints {
        &self.endpoints
    }

    /// Ask the proxy for a token without any fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy is unreachable, answers with a non-2xx status, or
    /// the body is not `{ "encoded": "<non-empty string>" }`.
    pub async fn request_token(&self, url: &str) -> Result<EncodedToken, ProxyError> {
        let reply = self.transport.get(&self.endpoints.encode_url(url)).await?;
        if !reply.is_success() {
            return Err(ProxyError::Status(reply.status));
        }
        let parsed: EncodeReply = serde_json::from_str(&reply.body)
            .map_err(|e| ProxyError::MalformedBody(e.to_string()))?;
        if parsed.encoded.is_empty() {
            return Err(ProxyError::MalformedBody("empty token".to_string()));
        }
        Ok(EncodedToken(parsed.encoded))
    }

    /// Encode `url`, reporting whether the local fallback was needed.
    pub async fn encode_detailed(&self, url: &str) -> EncodeOutcome {
        match self.request_token(url).await {
            Ok(token) => EncodeOutcome {
                token,
                source: TokenSource::Proxy,
            },
            Err(error) => {
                log::warn!("Failed to encode URL via proxy, using local encoding: {error}");
                EncodeOutcome {
                    token: local_encode(url),
                    source: TokenSource::LocalFallback(error),
                }
            }
        }
    }

    /// Encode `url`; never fails.
    pub async fn encode(&self, url: &str) -> EncodedToken {
        self.encode_detailed(url).await.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_transform_roundtrips() {
        for url in [
            "",
            "https://example.com/game",
            "https://example.com/spiel?name=über&x=1#frag",
            "javascript:alert(1)",
        ] {
            assert_eq!(decode(local_encode(url).as_str()), url);
        }
    }

    #[test]
    fn local_transform_is_standard_base64() {
        assert_eq!(
            local_encode("https://example.com").as_str(),
            "aHR0cHM6Ly9leGFtcGxlLmNvbQ=="
        );
    }

    #[test]
    fn malformed_tokens_decode_to_empty() {
        assert_eq!(decode("%%%not-base64%%%"), "");
        assert!(matches!(
            try_local_decode("%%%"),
            Err(CodecError::InvalidBase64(_))
        ));
        // 0xFF 0xFE is valid base64 but not UTF-8.
        assert_eq!(try_local_decode("//4="), Err(CodecError::InvalidUtf8));
    }
}
