#![cfg(target_arch = "wasm32")]

use framelift_core::{
    EmbedSessionManager, EmbedSurface, EncodedToken, FrameOptions, FrameSpec, GameRequest,
    HistoryBackend, HistoryStore, ProxyEndpoints, SandboxPolicy, Strategy, UrlCodec,
};
use framelift_web::dom;
use framelift_web::storage::{JsClock, LocalStorageBackend};
use framelift_web::surface::DomSurface;
use framelift_web::transport::FetchTransport;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlElement, KeyboardEvent, KeyboardEventInit};

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

const CONTAINER: &str = "iframe-container";

fn spec(strategy: Strategy, sandbox: SandboxPolicy) -> FrameSpec {
    FrameSpec::new(
        CONTAINER,
        "https://games.crazygames.com/g".to_string(),
        &FrameOptions::for_strategy(strategy, sandbox),
    )
}

/// Dispatch a cancelable key-down; returns `true` if its default was prevented.
fn key_prevented(key: &str) -> bool {
    let init = KeyboardEventInit::new();
    init.set_key(key);
    init.set_cancelable(true);
    let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init)
        .expect("keyboard event");
    let win = dom::window().expect("window");
    !win.dispatch_event(&event).expect("dispatch")
}

fn body_overflow() -> String {
    dom::body()
        .expect("body")
        .style()
        .get_property_value("overflow")
        .unwrap_or_default()
}

#[wasm_bindgen_test]
fn mount_builds_overlay_in_single_container() {
    let mut surface = DomSurface::new();
    surface
        .mount(&spec(Strategy::Direct, SandboxPolicy::Permissive))
        .expect("mount");
    surface
        .mount(&spec(Strategy::Proxied, SandboxPolicy::None))
        .expect("remount");

    let doc = dom::document().expect("document");
    let containers = doc
        .query_selector_all(&format!("#{CONTAINER}"))
        .expect("query");
    assert_eq!(containers.length(), 1);

    let iframe = doc
        .query_selector(&format!("#{CONTAINER} iframe.game-frame"))
        .expect("query iframe")
        .expect("iframe exists");
    assert_eq!(
        iframe.get_attribute("src").as_deref(),
        Some("https://games.crazygames.com/g")
    );
    assert!(iframe.get_attribute("sandbox").is_none());
    assert_eq!(iframe.get_attribute("scrolling").as_deref(), Some("no"));
    let badge = doc
        .query_selector(".bypass-info")
        .expect("query badge")
        .expect("badge exists");
    assert_eq!(badge.text_content().as_deref(), Some("UV-Style Bypass Active"));

    surface.unmount(CONTAINER);
    let container: HtmlElement = doc
        .get_element_by_id(CONTAINER)
        .expect("container kept")
        .dyn_into()
        .expect("html element");
    assert_eq!(container.inner_html(), "");
    assert_eq!(
        container.style().get_property_value("display").unwrap_or_default(),
        "none"
    );
}

#[wasm_bindgen_test]
fn permissive_sandbox_is_applied_to_iframe() {
    let mut surface = DomSurface::new();
    surface
        .mount(&spec(Strategy::Direct, SandboxPolicy::Permissive))
        .expect("mount");
    let iframe = dom::document()
        .expect("document")
        .query_selector(&format!("#{CONTAINER} iframe"))
        .expect("query")
        .expect("iframe");
    let sandbox = iframe.get_attribute("sandbox").unwrap_or_default();
    assert!(sandbox.contains("allow-scripts"));
    assert!(sandbox.contains("allow-popups-to-escape-sandbox"));
    surface.unmount(CONTAINER);
}

#[wasm_bindgen_test]
async fn session_intercepts_game_keys_until_closed() {
    let codec = UrlCodec::new(
        FetchTransport::default(),
        ProxyEndpoints::new("http://127.0.0.1:9"),
    );
    let mut sessions = EmbedSessionManager::new(DomSurface::new(), CONTAINER);
    assert!(!key_prevented("ArrowDown"));

    let outcome = sessions
        .open(
            &codec,
            GameRequest::new("https://games.crazygames.com/g", "Game"),
            Strategy::Direct,
            &FrameOptions::for_strategy(Strategy::Direct, SandboxPolicy::Permissive),
        )
        .await;
    assert!(outcome.is_embedded());
    assert_eq!(body_overflow(), "hidden");
    for key in ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "w", "a", "s", "d", " "] {
        assert!(key_prevented(key), "{key:?} should be suppressed");
    }
    assert!(!key_prevented("Enter"));

    assert!(sessions.close());
    assert!(!sessions.close());
    assert_eq!(body_overflow(), "");
    assert!(!key_prevented("ArrowDown"));
    assert!(!key_prevented(" "));
}

#[wasm_bindgen_test]
fn scroll_lock_restores_page_overflow() {
    let style = dom::body().expect("body").style();
    style.set_property("overflow", "scroll").expect("seed overflow");

    let mut surface = DomSurface::new();
    surface.set_scroll_lock(true);
    assert_eq!(body_overflow(), "hidden");
    surface.set_scroll_lock(true);
    surface.set_scroll_lock(false);
    assert_eq!(body_overflow(), "scroll");

    style.remove_property("overflow").expect("clear overflow");
    surface.set_scroll_lock(true);
    surface.set_scroll_lock(false);
    assert_eq!(body_overflow(), "");
}

#[wasm_bindgen_test]
fn local_storage_history_survives_corruption() {
    let key = "framelift.test.history";
    let backend = LocalStorageBackend;
    backend.store(key, "{broken").expect("write");
    let history = HistoryStore::with_limits(backend, JsClock, key, 20);
    assert!(history.list().is_empty());
    assert!(!history.record(&EncodedToken::new("abc"), "Slope"));

    backend.store(key, "[]").expect("reset");
    assert!(history.record(&EncodedToken::new("abc"), "Slope"));
    let entries = history.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Slope");
    assert!(entries[0].timestamp > 0);
}
