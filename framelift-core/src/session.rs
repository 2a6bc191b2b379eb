//! Lifecycle of the single embedded game surface.
//!
//! At most one [`EmbedSession`] is active per manager. Opening a new one tears the old
//! one down first, and the key guard lives on the session so it cannot outlive it.
//!
//! `open` is not serialized internally. Two opens racing on the same page would fight
//! over one container, so callers must finish (or abandon) one open before starting
//! the next. Within Rust, `&mut self` already enforces this for a single manager.

use serde::Serialize;

use crate::codec::{EncodeOutcome, EncodedToken, UrlCodec};
use crate::frame::{FrameOptions, FrameSpec, NavigationTarget};
use crate::resolver::Strategy;
use crate::transport::ProxyTransport;

/// One "open game X" attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRequest {
    pub url: String,
    pub title: String,
}

impl GameRequest {
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("browser environment unavailable: {0}")]
    Unavailable(String),
    #[error("DOM operation failed: {0}")]
    Dom(String),
}

/// Platform operations the manager drives. The browser build backs this with DOM
/// nodes and a `keydown` listener.
pub trait EmbedSurface {
    /// Handle to an installed key-interception listener.
    type KeyGuard;

    /// Create or reuse the overlay container and fill it with the frame and controls.
    ///
    /// # Errors
    ///
    /// Returns an error if the overlay cannot be built.
    fn mount(&mut self, frame: &FrameSpec) -> Result<(), SurfaceError>;

    /// Hide the overlay and destroy the embedded frame. Must tolerate a missing container.
    fn unmount(&mut self, container_id: &str);

    fn set_scroll_lock(&mut self, locked: bool);

    /// Start suppressing default actions for [`crate::keys::GAME_KEYS`].
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be attached.
    fn install_key_guard(&mut self) -> Result<Self::KeyGuard, SurfaceError>;

    fn remove_key_guard(&mut self, guard: Self::KeyGuard);

    /// Enter fullscreen on the container, or leave it if already fullscreen.
    ///
    /// # Errors
    ///
    /// Returns an error if the fullscreen request is refused.
    fn toggle_fullscreen(&mut self, container_id: &str) -> Result<(), SurfaceError>;

    /// Open the game without the bypass overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if navigation is impossible.
    fn navigate(
        &mut self,
        request: &GameRequest,
        target: NavigationTarget,
    ) -> Result<(), SurfaceError>;
}

/// A resolved open request, ready to mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlan {
    pub request: GameRequest,
    pub strategy: Strategy,
    pub frame: FrameSpec,
    pub fallback: NavigationTarget,
    pub encoding: Option<EncodeOutcome>,
}

impl FramePlan {
    /// Work out the iframe URL for `request`, encoding through `codec` when proxied.
    ///
    /// Never fails: a proxy outage yields a plan built on the local fallback token.
    pub async fn build<T: ProxyTransport>(
        codec: &UrlCodec<T>,
        container_id: &str,
        request: GameRequest,
        strategy: Strategy,
        options: &FrameOptions,
    ) -> Self {
        let (iframe_url, encoding) = match strategy {
            Strategy::Direct => (request.url.clone(), None),
            Strategy::Proxied => {
                let outcome = codec.encode_detailed(&request.url).await;
                let url = codec.endpoints().frame_url(outcome.token.as_str());
                (url, Some(outcome))
            }
        };
        Self {
            frame: FrameSpec::new(container_id, iframe_url, options),
            fallback: options.fallback,
            request,
            strategy,
            encoding,
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<&EncodedToken> {
        self.encoding.as_ref().map(|outcome| &outcome.token)
    }
}

#[derive(Debug)]
pub struct EmbedSession<G> {
    strategy: Strategy,
    iframe_url: String,
    container_id: String,
    title: String,
    key_guard: G,
}

impl<G> EmbedSession<G> {
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn iframe_url(&self) -> &str {
        &self.iframe_url
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// What the user ended up seeing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OpenOutcome {
    Embedded {
        strategy: Strategy,
        iframe_url: String,
        token: Option<EncodedToken>,
        used_fallback_token: bool,
    },
    Navigated {
        url: String,
        target: NavigationTarget,
        reason: String,
    },
    Failed {
        url: String,
        reason: String,
    },
}

impl OpenOutcome {
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }

    #[must_use]
    pub fn iframe_url(&self) -> Option<&str> {
        match self {
            Self::Embedded { iframe_url, .. } => Some(iframe_url),
            _ => None,
        }
    }
}

pub struct EmbedSessionManager<S: EmbedSurface> {
    surface: S,
    container_id: String,
    active: Option<EmbedSession<S::KeyGuard>>,
}

impl<S: EmbedSurface> EmbedSessionManager<S> {
    pub fn new(surface: S, container_id: impl Into<String>) -> Self {
        Self {
            surface,
            container_id: container_id.into(),
            active: None,
        }
    }

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub const fn active(&self) -> Option<&EmbedSession<S::KeyGuard>> {
        self.active.as_ref()
    }

    pub const fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Resolve and mount `request` in one step.
    pub async fn open<T: ProxyTransport>(
        &mut self,
        codec: &UrlCodec<T>,
        request: GameRequest,
        strategy: Strategy,
        options: &FrameOptions,
    ) -> OpenOutcome {
        let plan = FramePlan::build(codec, &self.container_id, request, strategy, options).await;
        self.open_frame(&plan)
    }

    /// Replace any active session with `plan`, falling back to plain navigation if the
    /// overlay cannot be installed.
    pub fn open_frame(&mut self, plan: &FramePlan) -> OpenOutcome {
        self.close();
        if let Err(error) = self.install(plan) {
            return self.fallback(&plan.request, plan.fallback, &error.to_string());
        }
        log::info!("Game opened: {}", plan.request.title);
        OpenOutcome::Embedded {
            strategy: plan.strategy,
            iframe_url: plan.frame.iframe_url.clone(),
            token: plan.token().cloned(),
            used_fallback_token: plan
                .encoding
                .as_ref()
                .is_some_and(EncodeOutcome::used_fallback),
        }
    }

    fn install(&mut self, plan: &FramePlan) -> Result<(), SurfaceError> {
        let container_id = plan.frame.container_id.clone();
        if let Err(error) = self.surface.mount(&plan.frame) {
            self.surface.unmount(&container_id);
            return Err(error);
        }
        self.surface.set_scroll_lock(true);
        let key_guard = match self.surface.install_key_guard() {
            Ok(guard) => guard,
            Err(error) => {
                self.surface.set_scroll_lock(false);
                self.surface.unmount(&container_id);
                return Err(error);
            }
        };
        self.active = Some(EmbedSession {
            strategy: plan.strategy,
            iframe_url: plan.frame.iframe_url.clone(),
            container_id,
            title: plan.request.title.clone(),
            key_guard,
        });
        Ok(())
    }

    /// Open `request` through ordinary navigation instead of the overlay.
    pub fn fallback(
        &mut self,
        request: &GameRequest,
        target: NavigationTarget,
        reason: &str,
    ) -> OpenOutcome {
        log::error!("Error in bypass system: {reason}");
        match self.surface.navigate(request, target) {
            Ok(()) => OpenOutcome::Navigated {
                url: request.url.clone(),
                target,
                reason: reason.to_string(),
            },
            Err(error) => {
                log::error!("Fallback navigation failed: {error}");
                OpenOutcome::Failed {
                    url: request.url.clone(),
                    reason: format!("{reason}; {error}"),
                }
            }
        }
    }

    /// Tear down the active session. Returns `false` when nothing was open.
    pub fn close(&mut self) -> bool {
        let Some(session) = self.active.take() else {
            return false;
        };
        self.surface.remove_key_guard(session.key_guard);
        self.surface.set_scroll_lock(false);
        self.surface.unmount(&session.container_id);
        log::info!("Game closed: {}", session.title);
        true
    }

    /// Toggle fullscreen on the active session. Returns `false` when nothing is open.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface refuses the fullscreen request.
    pub fn toggle_fullscreen(&mut self) -> Result<bool, SurfaceError> {
        let Some(session) = self.active.as_ref() else {
            return Ok(false);
        };
        self.surface.toggle_fullscreen(&session.container_id)?;
        Ok(true)
    }
}

impl<S: EmbedSurface> Drop for EmbedSessionManager<S> {
    fn drop(&mut self) {
        self.close();
    }
}
