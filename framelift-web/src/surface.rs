//! DOM implementation of the embed surface.

use std::rc::Rc;

use framelift_core::frame::{
    BADGE_INLINE_STYLE, CLOSE_BUTTON_INLINE_STYLE, FRAME_INLINE_STYLE,
    FULLSCREEN_BUTTON_INLINE_STYLE, OVERLAY_INLINE_STYLE,
};
use framelift_core::{
    EmbedSurface, FrameSpec, GameRequest, NavigationTarget, SurfaceError, is_game_key,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent};

use crate::dom;

pub const CONTAINER_CLASS: &str = "iframe-container";

/// Callback invoked by an overlay control button.
pub type ControlHandler = Rc<dyn Fn()>;

/// Installed `keydown` listener; removing it requires the same function reference.
pub struct KeyGuard {
    listener: Closure<dyn FnMut(KeyboardEvent)>,
}

/// Builds the overlay inside the page's single container element.
#[derive(Default)]
pub struct DomSurface {
    on_close: Option<ControlHandler>,
    on_fullscreen: Option<ControlHandler>,
    controls: Vec<Closure<dyn FnMut()>>,
    /// Inline `overflow` of `<body>` before the lock, restored on release.
    saved_overflow: Option<String>,
}

impl DomSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the CLOSE and FULLSCREEN buttons of future overlays.
    pub fn set_controls(&mut self, on_close: ControlHandler, on_fullscreen: ControlHandler) {
        self.on_close = Some(on_close);
        self.on_fullscreen = Some(on_fullscreen);
    }

    fn container(doc: &Document, container_id: &str) -> Result<Element, SurfaceError> {
        if let Some(existing) = doc.get_element_by_id(container_id) {
            return Ok(existing);
        }
        let created = create(doc, "div")?;
        created.set_id(container_id);
        created.set_class_name(CONTAINER_CLASS);
        dom::body()?
            .append_child(&created)
            .map_err(|e| dom::dom_error("append container", &e))?;
        Ok(created)
    }

    fn control(
        &mut self,
        doc: &Document,
        class: &str,
        label: &str,
        inline_style: Option<&str>,
        handler: Option<&ControlHandler>,
    ) -> Result<Element, SurfaceError> {
        let button = create(doc, "button")?;
        button.set_class_name(class);
        button.set_text_content(Some(label));
        if let Some(style) = inline_style {
            set_attr(&button, "style", style)?;
        }
        if let Some(handler) = handler {
            let handler = Rc::clone(handler);
            let click = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
            button
                .add_event_listener_with_callback("click", click.as_ref().unchecked_ref())
                .map_err(|e| dom::dom_error("attach click", &e))?;
            self.controls.push(click);
        }
        Ok(button)
    }
}

fn create(doc: &Document, tag: &str) -> Result<Element, SurfaceError> {
    doc.create_element(tag)
        .map_err(|e| dom::dom_error(&format!("create <{tag}>"), &e))
}

fn set_attr(el: &Element, name: &str, value: &str) -> Result<(), SurfaceError> {
    el.set_attribute(name, value)
        .map_err(|e| dom::dom_error(&format!("set {name}"), &e))
}

fn set_display(el: &Element, value: &str) {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property("display", value);
    }
}

impl EmbedSurface for DomSurface {
    type KeyGuard = KeyGuard;

    fn mount(&mut self, frame: &FrameSpec) -> Result<(), SurfaceError> {
        let doc = dom::document().ok_or_else(|| SurfaceError::Unavailable("document".into()))?;
        let container = Self::container(&doc, &frame.container_id)?;
        container.set_inner_html("");
        self.controls.clear();

        let inline = frame.inline();
        let content = create(&doc, "div")?;
        content.set_class_name("iframe-content");
        if inline {
            set_attr(&content, "style", OVERLAY_INLINE_STYLE)?;
        }

        let iframe = create(&doc, "iframe")?;
        set_attr(&iframe, "src", &frame.iframe_url)?;
        iframe.set_class_name("game-frame");
        set_attr(&iframe, "allowfullscreen", "")?;
        set_attr(&iframe, "frameborder", "0")?;
        if inline {
            set_attr(&iframe, "style", FRAME_INLINE_STYLE)?;
        }
        if let Some(sandbox) = frame.sandbox.attribute() {
            set_attr(&iframe, "sandbox", &sandbox)?;
        }
        if !frame.scrolling {
            set_attr(&iframe, "scrolling", "no")?;
        }

        let on_close = self.on_close.clone();
        let on_fullscreen = self.on_fullscreen.clone();
        let close = self.control(
            &doc,
            "close-button",
            "CLOSE",
            inline.then_some(CLOSE_BUTTON_INLINE_STYLE),
            on_close.as_ref(),
        )?;
        let fullscreen = self.control(
            &doc,
            "fullscreen-button",
            "FULLSCREEN",
            inline.then_some(FULLSCREEN_BUTTON_INLINE_STYLE),
            on_fullscreen.as_ref(),
        )?;

        let badge = create(&doc, "div")?;
        badge.set_class_name("bypass-info");
        badge.set_text_content(Some(&frame.badge));
        if inline {
            set_attr(&badge, "style", BADGE_INLINE_STYLE)?;
        }

        for child in [&iframe, &close, &fullscreen, &badge] {
            content
                .append_child(child)
                .map_err(|e| dom::dom_error("append overlay", &e))?;
        }
        container
            .append_child(&content)
            .map_err(|e| dom::dom_error("append overlay", &e))?;
        set_display(&container, "block");
        Ok(())
    }

    fn unmount(&mut self, container_id: &str) {
        if let Some(container) = dom::document().and_then(|doc| doc.get_element_by_id(container_id))
        {
            container.set_inner_html("");
            set_display(&container, "none");
        }
        self.controls.clear();
    }

    fn set_scroll_lock(&mut self, locked: bool) {
        let Ok(body) = dom::body() else {
            return;
        };
        let style = body.style();
        if locked {
            if self.saved_overflow.is_none() {
                self.saved_overflow =
                    Some(style.get_property_value("overflow").unwrap_or_default());
            }
            let _ = style.set_property("overflow", "hidden");
            return;
        }
        let _ = match self.saved_overflow.take() {
            Some(previous) if !previous.is_empty() => style.set_property("overflow", &previous),
            _ => style.remove_property("overflow").map(|_| ()),
        };
    }

    fn install_key_guard(&mut self) -> Result<KeyGuard, SurfaceError> {
        let win = dom::window().ok_or_else(|| SurfaceError::Unavailable("window".into()))?;
        let listener = Closure::wrap(Box::new(|event: KeyboardEvent| {
            if is_game_key(&event.key()) {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);
        win.add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref())
            .map_err(|e| dom::dom_error("attach keydown", &e))?;
        Ok(KeyGuard { listener })
    }

    fn remove_key_guard(&mut self, guard: KeyGuard) {
        if let Some(win) = dom::window() {
            let _ = win.remove_event_listener_with_callback(
                "keydown",
                guard.listener.as_ref().unchecked_ref(),
            );
        }
    }

    fn toggle_fullscreen(&mut self, container_id: &str) -> Result<(), SurfaceError> {
        let doc = dom::document().ok_or_else(|| SurfaceError::Unavailable("document".into()))?;
        if doc.fullscreen_element().is_some() {
            doc.exit_fullscreen();
            return Ok(());
        }
        let container = doc
            .get_element_by_id(container_id)
            .ok_or_else(|| SurfaceError::Dom(format!("#{container_id} not found")))?;
        container
            .request_fullscreen()
            .map_err(|e| dom::dom_error("requestFullscreen", &e))
    }

    fn navigate(
        &mut self,
        request: &GameRequest,
        target: NavigationTarget,
    ) -> Result<(), SurfaceError> {
        let win = dom::window().ok_or_else(|| SurfaceError::Unavailable("window".into()))?;
        match target {
            NavigationTarget::Host => {
                // Prefer the page's own opener when it defines one.
                let opener = js_sys::Reflect::get(&win, &JsValue::from_str("openGame"))
                    .ok()
                    .and_then(|value| value.dyn_into::<js_sys::Function>().ok());
                if let Some(open_game) = opener {
                    open_game
                        .call2(
                            &JsValue::NULL,
                            &JsValue::from_str(&request.url),
                            &JsValue::from_str(&request.title),
                        )
                        .map(|_| ())
                        .map_err(|e| dom::dom_error("openGame", &e))
                } else {
                    win.location()
                        .set_href(&request.url)
                        .map_err(|e| dom::dom_error("location.href", &e))
                }
            }
            NavigationTarget::NewTab => match win.open_with_url_and_target(&request.url, "_blank")
            {
                Ok(Some(_)) => Ok(()),
                Ok(None) => {
                    log::warn!("Popup blocked while opening {}", request.url);
                    Ok(())
                }
                Err(e) => Err(dom::dom_error("window.open", &e)),
            },
        }
    }
}
