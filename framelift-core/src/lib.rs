//! Framelift Core
//!
//! Platform-agnostic bypass resolution and embed lifecycle for framing third-party
//! games. Network access, durable storage and the page surface are supplied by the
//! platform crates through the traits re-exported here.

pub mod codec;
pub mod config;
pub mod frame;
pub mod history;
pub mod keys;
pub mod planner;
pub mod probe;
pub mod resolver;
pub mod session;
pub mod title;
pub mod transport;

pub use codec::{
    CodecError, EncodeOutcome, EncodedToken, TokenSource, UrlCodec, decode, local_encode,
    try_local_decode,
};
pub use config::{BypassConfig, ConfigError};
pub use frame::{FrameOptions, FrameSpec, NavigationTarget, OverlayStyle, SandboxPolicy};
pub use history::{
    Clock, HistoryBackend, HistoryError, HistoryStore, MemoryBackend, StoredGameEntry,
};
pub use keys::{GAME_KEYS, is_game_key};
pub use planner::Planner;
pub use probe::{ConnectivityProbe, ProbeOutcome};
pub use resolver::{Strategy, StrategyResolver};
pub use session::{
    EmbedSession, EmbedSessionManager, EmbedSurface, FramePlan, GameRequest, OpenOutcome,
    SurfaceError,
};
pub use title::{DEFAULT_TITLE, TitleError, title_from_url};
pub use transport::{HttpReply, ProxyEndpoints, ProxyError, ProxyTransport};

/// Every public operation behind one value: planning, sessions, history, probe.
pub struct FrameBypass<T, B, C, S>
where
    T: ProxyTransport + Clone,
    B: HistoryBackend,
    C: Clock,
    S: EmbedSurface,
{
    planner: Planner<T>,
    probe: ConnectivityProbe<T>,
    history: HistoryStore<B, C>,
    sessions: EmbedSessionManager<S>,
}

impl<T, B, C, S> FrameBypass<T, B, C, S>
where
    T: ProxyTransport + Clone,
    B: HistoryBackend,
    C: Clock,
    S: EmbedSurface,
{
    pub fn new(config: BypassConfig, transport: T, backend: B, clock: C, surface: S) -> Self {
        Self {
            probe: ConnectivityProbe::new(
                transport.clone(),
                ProxyEndpoints::new(&config.proxy_base),
            ),
            history: HistoryStore::with_limits(
                backend,
                clock,
                config.history_key.clone(),
                config.history_cap,
            ),
            sessions: EmbedSessionManager::new(surface, config.container_id.clone()),
            planner: Planner::new(config, transport),
        }
    }

    pub const fn config(&self) -> &BypassConfig {
        self.planner.config()
    }

    pub const fn planner(&self) -> &Planner<T> {
        &self.planner
    }

    pub const fn codec(&self) -> &UrlCodec<T> {
        self.planner.codec()
    }

    pub const fn connectivity(&self) -> &ConnectivityProbe<T> {
        &self.probe
    }

    pub const fn sessions(&self) -> &EmbedSessionManager<S> {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut EmbedSessionManager<S> {
        &mut self.sessions
    }

    pub const fn history(&self) -> &HistoryStore<B, C> {
        &self.history
    }

    pub async fn encode(&self, url: &str) -> EncodedToken {
        self.planner.codec().encode(url).await
    }

    #[must_use]
    pub fn decode(&self, token: &str) -> String {
        codec::decode(token)
    }

    #[must_use]
    pub fn resolve(&self, url: &str) -> Strategy {
        self.planner.resolver().resolve(url)
    }

    pub async fn plan_bypass(&self, request: GameRequest) -> FramePlan {
        self.planner.plan_bypass(request).await
    }

    pub async fn plan_bypass_with(
        &self,
        request: GameRequest,
        sandbox: SandboxPolicy,
    ) -> FramePlan {
        self.planner.plan_bypass_with(request, sandbox).await
    }

    /// Mount a plan and record proxied embeds in history.
    pub fn commit(&mut self, plan: &FramePlan) -> OpenOutcome {
        let outcome = self.sessions.open_frame(plan);
        if outcome.is_embedded()
            && let Some(token) = plan.token()
        {
            self.history.record(token, &plan.request.title);
        }
        outcome
    }

    /// Mount a cooperative-embed plan, or open `url` in a new tab when planning failed.
    pub fn commit_cooperative(
        &mut self,
        url: &str,
        planned: Result<FramePlan, TitleError>,
    ) -> OpenOutcome {
        match planned {
            Ok(plan) => self.commit(&plan),
            Err(error) => self.sessions.fallback(
                &GameRequest::new(url, DEFAULT_TITLE),
                NavigationTarget::NewTab,
                &error.to_string(),
            ),
        }
    }

    /// Open `request` directly or through the proxy depending on its host.
    pub async fn open_with_bypass(&mut self, request: GameRequest) -> OpenOutcome {
        let plan = self.planner.plan_bypass(request).await;
        self.commit(&plan)
    }

    /// Open a cooperative-host game through the proxy, falling back to a new tab.
    pub async fn open_cooperative_embed(&mut self, url: &str) -> OpenOutcome {
        let planned = self.planner.plan_cooperative(url).await;
        self.commit_cooperative(url, planned)
    }

    pub fn record(&self, token: &EncodedToken, title: &str) -> bool {
        self.history.record(token, title)
    }

    pub fn list(&self) -> Vec<StoredGameEntry> {
        self.history.list()
    }

    pub async fn check(&self) -> bool {
        self.probe.check().await
    }

    pub async fn probe(&self) -> ProbeOutcome {
        self.probe.probe().await
    }

    pub fn close(&mut self) -> bool {
        self.sessions.close()
    }

    /// # Errors
    ///
    /// Returns an error if the surface refuses the fullscreen request.
    pub fn toggle_fullscreen(&mut self) -> Result<bool, SurfaceError> {
        self.sessions.toggle_fullscreen()
    }
}
