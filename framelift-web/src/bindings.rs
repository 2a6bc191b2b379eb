//! JavaScript-facing API, exported as `IframeBypass`.
//!
//! Async methods return promises. No `RefCell` borrow is held across an await: plans
//! are built from cloned planner state and only the final mount borrows mutably.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use framelift_core::{BypassConfig, EncodedToken, FrameBypass, GameRequest, Strategy, is_game_key};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::KeyboardEvent;

use crate::storage::{JsClock, LocalStorageBackend};
use crate::surface::{ControlHandler, DomSurface};
use crate::transport::FetchTransport;

pub type WebBypass = FrameBypass<FetchTransport, LocalStorageBackend, JsClock, DomSurface>;

#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("fullscreen failed: {0}")]
    Fullscreen(String),
}

impl From<BindingError> for JsValue {
    fn from(error: BindingError) -> Self {
        JsError::new(&error.to_string()).into()
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, BindingError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| BindingError::Serialization(e.to_string()))
}

/// Accepts `undefined`/`null` for defaults or a partial config object.
pub fn load_config(value: JsValue) -> Result<BypassConfig, BindingError> {
    if value.is_undefined() || value.is_null() {
        return Ok(BypassConfig::default());
    }
    let parsed: BypassConfig = serde_wasm_bindgen::from_value(value)
        .map_err(|e| BindingError::Config(e.to_string()))?;
    parsed
        .validated()
        .map_err(|e| BindingError::Config(e.to_string()))
}

#[wasm_bindgen]
pub struct IframeBypass {
    inner: Rc<RefCell<WebBypass>>,
}

#[wasm_bindgen]
impl IframeBypass {
    /// Build the bypass engine from an optional configuration object.
    ///
    /// # Errors
    /// Returns an error if the configuration object is malformed.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<IframeBypass, JsValue> {
        let config = load_config(config)?;
        let transport = FetchTransport::new(config.encode_timeout_ms);
        let inner = Rc::new(RefCell::new(FrameBypass::new(
            config,
            transport,
            LocalStorageBackend,
            JsClock,
            DomSurface::new(),
        )));
        wire_controls(&inner);
        Ok(Self { inner })
    }

    #[wasm_bindgen(js_name = encodeGameUrl)]
    pub fn encode_game_url(&self, url: String) -> js_sys::Promise {
        let codec = self.inner.borrow().codec().clone();
        future_to_promise(async move {
            let token = codec.encode(&url).await;
            Ok(JsValue::from_str(token.as_str()))
        })
    }

    #[wasm_bindgen(js_name = decodeGameUrl)]
    pub fn decode_game_url(&self, token: &str) -> String {
        self.inner.borrow().decode(token)
    }

    #[wasm_bindgen(js_name = resolveStrategy)]
    pub fn resolve_strategy(&self, url: &str) -> String {
        match self.inner.borrow().resolve(url) {
            Strategy::Direct => "direct".into(),
            Strategy::Proxied => "proxied".into(),
        }
    }

    /// Open a game, embedding directly or through the proxy. Resolves to the outcome.
    ///
    /// Callers must wait for one open to settle before starting another.
    #[wasm_bindgen(js_name = openGameWithBypass)]
    pub fn open_game_with_bypass(&self, url: String, title: String) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        let planner = inner.borrow().planner().clone();
        future_to_promise(async move {
            let plan = planner.plan_bypass(GameRequest::new(url, title)).await;
            let outcome = inner.borrow_mut().commit(&plan);
            Ok(to_js(&outcome)?)
        })
    }

    #[wasm_bindgen(js_name = openCrazyGamesEmbed)]
    pub fn open_crazy_games_embed(&self, url: String) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        let planner = inner.borrow().planner().clone();
        future_to_promise(async move {
            let planned = planner.plan_cooperative(&url).await;
            let outcome = inner.borrow_mut().commit_cooperative(&url, planned);
            Ok(to_js(&outcome)?)
        })
    }

    #[wasm_bindgen(js_name = storeEncodedGame)]
    pub fn store_encoded_game(&self, token: String, title: &str) -> bool {
        self.inner.borrow().record(&EncodedToken::new(token), title)
    }

    /// # Errors
    /// Returns an error if the history cannot be converted to a JavaScript array.
    #[wasm_bindgen(js_name = getStoredEncodedGames)]
    pub fn get_stored_encoded_games(&self) -> Result<JsValue, JsValue> {
        Ok(to_js(&self.inner.borrow().list())?)
    }

    #[wasm_bindgen(js_name = testWorkerConnection)]
    pub fn test_worker_connection(&self) -> js_sys::Promise {
        let probe = self.inner.borrow().connectivity().clone();
        future_to_promise(async move { Ok(JsValue::from_bool(probe.check().await)) })
    }

    #[wasm_bindgen(js_name = closeGame)]
    pub fn close_game(&self) -> bool {
        self.inner.borrow_mut().close()
    }

    /// # Errors
    /// Returns an error if the browser refuses the fullscreen request.
    #[wasm_bindgen(js_name = toggleFullscreen)]
    pub fn toggle_fullscreen(&self) -> Result<bool, JsValue> {
        self.inner
            .borrow_mut()
            .toggle_fullscreen()
            .map_err(|e| BindingError::Fullscreen(e.to_string()).into())
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.inner.borrow().sessions().is_open()
    }
}

/// Suppress page scrolling for arrow, WASD and space key-downs.
#[wasm_bindgen(js_name = preventDefaultForGameKeys)]
pub fn prevent_default_for_game_keys(event: &KeyboardEvent) {
    if is_game_key(&event.key()) {
        event.prevent_default();
    }
}

fn wire_controls(inner: &Rc<RefCell<WebBypass>>) {
    let weak = Rc::downgrade(inner);
    let on_close: ControlHandler = {
        let weak = Weak::clone(&weak);
        Rc::new(move || {
            // Closing drops this button's listener, so defer past the click dispatch.
            let weak = Weak::clone(&weak);
            spawn_local(async move {
                if let Some(inner) = weak.upgrade()
                    && let Ok(mut bypass) = inner.try_borrow_mut()
                {
                    bypass.close();
                }
            });
        })
    };
    let on_fullscreen: ControlHandler = Rc::new(move || {
        if let Some(inner) = weak.upgrade()
            && let Ok(mut bypass) = inner.try_borrow_mut()
            && let Err(e) = bypass.toggle_fullscreen()
        {
            log::warn!("Fullscreen toggle failed: {e}");
        }
    });
    inner
        .borrow_mut()
        .sessions_mut()
        .surface_mut()
        .set_controls(on_close, on_fullscreen);
}
