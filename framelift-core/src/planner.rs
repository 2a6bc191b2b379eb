//! Turning open requests into mountable [`FramePlan`]s.
//!
//! A `Planner` owns clones of everything it needs, so a host can plan without holding
//! a borrow on the session manager across the encode request.

use crate::codec::UrlCodec;
use crate::config::BypassConfig;
use crate::frame::{FrameOptions, SandboxPolicy};
use crate::resolver::{Strategy, StrategyResolver};
use crate::session::{FramePlan, GameRequest};
use crate::title::{TitleError, title_from_url};
use crate::transport::{ProxyEndpoints, ProxyTransport};

#[derive(Debug, Clone)]
pub struct Planner<T> {
    config: BypassConfig,
    codec: UrlCodec<T>,
    resolver: StrategyResolver,
}

impl<T: ProxyTransport> Planner<T> {
    pub fn new(config: BypassConfig, transport: T) -> Self {
        Self {
            codec: UrlCodec::new(transport, ProxyEndpoints::new(&config.proxy_base)),
            resolver: StrategyResolver::new(config.cooperative_host.clone()),
            config,
        }
    }

    pub const fn config(&self) -> &BypassConfig {
        &self.config
    }

    pub const fn codec(&self) -> &UrlCodec<T> {
        &self.codec
    }

    pub const fn resolver(&self) -> &StrategyResolver {
        &self.resolver
    }

    /// Sandbox configured for the bypass path of `strategy`.
    #[must_use]
    pub const fn sandbox_for(&self, strategy: Strategy) -> SandboxPolicy {
        match strategy {
            Strategy::Direct => self.config.direct_sandbox,
            Strategy::Proxied => self.config.proxied_sandbox,
        }
    }

    /// Plan the bypass path for `request` with the configured sandbox for its strategy.
    pub async fn plan_bypass(&self, request: GameRequest) -> FramePlan {
        let strategy = self.resolver.resolve(&request.url);
        self.plan(request, strategy, self.sandbox_for(strategy)).await
    }

    /// Plan the bypass path for `request` with an explicit sandbox policy.
    pub async fn plan_bypass_with(
        &self,
        request: GameRequest,
        sandbox: SandboxPolicy,
    ) -> FramePlan {
        let strategy = self.resolver.resolve(&request.url);
        self.plan(request, strategy, sandbox).await
    }

    async fn plan(
        &self,
        request: GameRequest,
        strategy: Strategy,
        sandbox: SandboxPolicy,
    ) -> FramePlan {
        let options = FrameOptions::for_strategy(strategy, sandbox);
        FramePlan::build(
            &self.codec,
            &self.config.container_id,
            request,
            strategy,
            &options,
        )
        .await
    }

    /// Plan the cooperative-host embed: always proxied, titled from the URL.
    ///
    /// # Errors
    ///
    /// Returns an error if no title can be derived because `url` is not absolute.
    pub async fn plan_cooperative(&self, url: &str) -> Result<FramePlan, TitleError> {
        let title = title_from_url(url)?;
        let options = FrameOptions::cooperative(self.config.cooperative_sandbox);
        Ok(FramePlan::build(
            &self.codec,
            &self.config.container_id,
            GameRequest::new(url, title),
            Strategy::Proxied,
            &options,
        )
        .await)
    }
}
