use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use framelift_core::{HttpReply, ProxyError, ProxyTransport};

/// Native proxy transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout_ms: Option<u32>,
}

impl ReqwestTransport {
    pub fn new(timeout_ms: Option<u32>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = timeout_ms {
            builder = builder.timeout(Duration::from_millis(u64::from(ms)));
        }
        let client = builder.build().context("building HTTP client")?;
        Ok(Self { client, timeout_ms })
    }

    fn map_error(&self, error: &reqwest::Error) -> ProxyError {
        match self.timeout_ms {
            Some(ms) if error.is_timeout() => ProxyError::Timeout(ms),
            _ => ProxyError::Transport(error.to_string()),
        }
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, ProxyError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(&e))
    }
}

#[async_trait(?Send)]
impl ProxyTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpReply, ProxyError> {
        let response = self.send(url).await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| match self.map_error(&e) {
            ProxyError::Transport(detail) => ProxyError::MalformedBody(detail),
            other => other,
        })?;
        Ok(HttpReply { status, body })
    }

    async fn status(&self, url: &str) -> Result<u16, ProxyError> {
        self.send(url).await.map(|r| r.status().as_u16())
    }
}
