//! Proxy liveness check.

use serde::Serialize;

use crate::transport::{ProxyEndpoints, ProxyError, ProxyTransport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Reachable { status: u16 },
    Rejected { status: u16 },
    Unreachable { error: ProxyError },
}

impl ProbeOutcome {
    #[must_use]
    pub const fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable { .. })
    }
}

/// Asks the proxy root whether it is up. Callers use this to warn before a proxied
/// open; the session manager never runs it on its own.
#[derive(Debug, Clone)]
pub struct ConnectivityProbe<T> {
    transport: T,
    endpoints: ProxyEndpoints,
}

impl<T: ProxyTransport> ConnectivityProbe<T> {
    pub const fn new(transport: T, endpoints: ProxyEndpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub async fn probe(&self) -> ProbeOutcome {
        match self.transport.status(&self.endpoints.root_url()).await {
            Ok(status) if (200..300).contains(&status) => ProbeOutcome::Reachable { status },
            Ok(status) => {
                log::debug!("Proxy root answered with status {status}");
                ProbeOutcome::Rejected { status }
            }
            Err(error) => {
                log::warn!("Worker connection test failed: {error}");
                ProbeOutcome::Unreachable { error }
            }
        }
    }

    /// `true` only when the proxy root answers 2xx.
    pub async fn check(&self) -> bool {
        self.probe().await.is_reachable()
    }
}
