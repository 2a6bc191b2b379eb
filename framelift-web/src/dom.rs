use framelift_core::SurfaceError;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Storage, Window};

/// Retrieve the global `window` object, if running in a browser context.
#[must_use]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Retrieve the document object for DOM interactions.
#[must_use]
pub fn document() -> Option<Document> {
    window().and_then(|win| win.document())
}

/// Retrieve `document.body`.
///
/// # Errors
/// Returns an error when no document or body is available.
pub fn body() -> Result<HtmlElement, SurfaceError> {
    document()
        .and_then(|doc| doc.body())
        .ok_or_else(|| SurfaceError::Unavailable("document.body".into()))
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Map a rejected DOM call onto a surface error.
#[must_use]
pub fn dom_error(context: &str, value: &JsValue) -> SurfaceError {
    SurfaceError::Dom(format!("{context}: {}", js_error_message(value)))
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, JsValue> {
    window()
        .ok_or_else(|| JsValue::from_str("window unavailable"))?
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}
