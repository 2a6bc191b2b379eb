//! `fetch`-backed proxy transport.

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use framelift_core::{HttpReply, ProxyError, ProxyTransport};
use gloo_net::http::{Request, Response};
use gloo_timers::callback::Timeout;
use web_sys::{AbortController, AbortSignal};

use crate::dom;

/// Abort timer for one request. The request is cancelled when it fires, so the guard
/// must outlive every await on the response, body included.
pub struct Deadline {
    ms: u32,
    controller: AbortController,
    expired: Rc<Cell<bool>>,
    _timer: Timeout,
}

impl Deadline {
    /// Arm a deadline `ms` milliseconds from now.
    ///
    /// # Errors
    /// Returns an error if the browser cannot create an `AbortController`.
    pub fn start(ms: u32) -> Result<Self, ProxyError> {
        let controller =
            AbortController::new().map_err(|e| ProxyError::Transport(dom::js_error_message(&e)))?;
        let expired = Rc::new(Cell::new(false));
        let timer = {
            let controller = controller.clone();
            let expired = Rc::clone(&expired);
            Timeout::new(ms, move || {
                expired.set(true);
                controller.abort();
            })
        };
        Ok(Self {
            ms,
            controller,
            expired,
            _timer: timer,
        })
    }

    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        self.controller.signal()
    }

    #[must_use]
    pub fn expired(&self) -> bool {
        self.expired.get()
    }

    /// `Timeout` when the deadline fired, `error` otherwise.
    #[must_use]
    pub fn classify(&self, error: ProxyError) -> ProxyError {
        if self.expired() {
            ProxyError::Timeout(self.ms)
        } else {
            error
        }
    }
}

fn classify(deadline: Option<&Deadline>, error: ProxyError) -> ProxyError {
    match deadline {
        Some(deadline) => deadline.classify(error),
        None => error,
    }
}

/// Issues proxy requests through the browser's `fetch`, optionally aborting after a
/// deadline that covers both headers and body.
#[derive(Debug, Clone, Default)]
pub struct FetchTransport {
    timeout_ms: Option<u32>,
}

impl FetchTransport {
    #[must_use]
    pub const fn new(timeout_ms: Option<u32>) -> Self {
        Self { timeout_ms }
    }

    async fn send(&self, url: &str) -> Result<(Response, Option<Deadline>), ProxyError> {
        let deadline = self.timeout_ms.map(Deadline::start).transpose()?;
        let signal = deadline.as_ref().map(Deadline::signal);
        let sent = Request::get(url).abort_signal(signal.as_ref()).send().await;
        match sent {
            Ok(response) => Ok((response, deadline)),
            Err(e) => Err(classify(
                deadline.as_ref(),
                ProxyError::Transport(e.to_string()),
            )),
        }
    }
}

#[async_trait(?Send)]
impl ProxyTransport for FetchTransport {
    async fn get(&self, url: &str) -> Result<HttpReply, ProxyError> {
        let (response, deadline) = self.send(url).await?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            classify(deadline.as_ref(), ProxyError::MalformedBody(e.to_string()))
        });
        drop(deadline);
        Ok(HttpReply { status, body: body? })
    }

    async fn status(&self, url: &str) -> Result<u16, ProxyError> {
        self.send(url).await.map(|(response, _)| response.status())
    }
}
