//! `localStorage` history backend and browser clock.

use framelift_core::{Clock, HistoryBackend};

use crate::dom;

#[derive(Debug, thiserror::Error)]
#[error("Storage error: {0}")]
pub struct WebStorageError(String);

/// History backend over `window.localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageBackend;

impl HistoryBackend for LocalStorageBackend {
    type Error = WebStorageError;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        dom::local_storage()
            .and_then(|storage| storage.get_item(key))
            .map_err(|e| WebStorageError(dom::js_error_message(&e)))
    }

    fn store(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        dom::local_storage()
            .and_then(|storage| storage.set_item(key, value))
            .map_err(|e| WebStorageError(dom::js_error_message(&e)))
    }
}

/// `Date.now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    #[allow(clippy::cast_possible_truncation)] // Date.now() is an integral millisecond count.
    fn now_ms(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}
