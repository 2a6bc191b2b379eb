#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use framelift_core::{
    EmbedSurface, FrameSpec, GameRequest, HttpReply, NavigationTarget, ProxyError, ProxyTransport,
    SurfaceError, is_game_key,
};

/// Transport answering from a per-path script; unscripted paths are unreachable.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    replies: Rc<RefCell<HashMap<String, VecDeque<Result<HttpReply, ProxyError>>>>>,
    pub requests: Rc<RefCell<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn reply(&self, url_prefix: &str, reply: Result<HttpReply, ProxyError>) -> &Self {
        self.replies
            .borrow_mut()
            .entry(url_prefix.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ProxyTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpReply, ProxyError> {
        self.requests.borrow_mut().push(url.to_string());
        let mut replies = self.replies.borrow_mut();
        let scripted = replies
            .iter_mut()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .and_then(|(_, queue)| queue.pop_front());
        scripted.unwrap_or_else(|| Err(ProxyError::Transport("connection refused".into())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Mount(String),
    Unmount(String),
    ScrollLock(bool),
    InstallKeys(u32),
    RemoveKeys(u32),
    Fullscreen(String),
    Navigate(String, NavigationTarget),
}

/// In-memory page: records every call and simulates key-down handling.
#[derive(Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
    pub mounted: Option<FrameSpec>,
    pub scroll_locked: bool,
    pub listeners: Vec<u32>,
    next_listener: u32,
    pub fail_mount: bool,
    pub fail_keys: bool,
    pub fail_navigate: bool,
}

impl RecordingSurface {
    /// Dispatch a key-down; returns whether its default action was prevented.
    pub fn press(&self, key: &str) -> bool {
        !self.listeners.is_empty() && is_game_key(key)
    }
}

impl EmbedSurface for RecordingSurface {
    type KeyGuard = u32;

    fn mount(&mut self, frame: &FrameSpec) -> Result<(), SurfaceError> {
        if self.fail_mount {
            return Err(SurfaceError::Dom("appendChild refused".into()));
        }
        self.calls.push(SurfaceCall::Mount(frame.iframe_url.clone()));
        self.mounted = Some(frame.clone());
        Ok(())
    }

    fn unmount(&mut self, container_id: &str) {
        self.calls.push(SurfaceCall::Unmount(container_id.to_string()));
        self.mounted = None;
    }

    fn set_scroll_lock(&mut self, locked: bool) {
        self.calls.push(SurfaceCall::ScrollLock(locked));
        self.scroll_locked = locked;
    }

    fn install_key_guard(&mut self) -> Result<u32, SurfaceError> {
        if self.fail_keys {
            return Err(SurfaceError::Dom("addEventListener refused".into()));
        }
        self.next_listener += 1;
        self.listeners.push(self.next_listener);
        self.calls.push(SurfaceCall::InstallKeys(self.next_listener));
        Ok(self.next_listener)
    }

    fn remove_key_guard(&mut self, guard: u32) {
        self.listeners.retain(|id| *id != guard);
        self.calls.push(SurfaceCall::RemoveKeys(guard));
    }

    fn toggle_fullscreen(&mut self, container_id: &str) -> Result<(), SurfaceError> {
        self.calls
            .push(SurfaceCall::Fullscreen(container_id.to_string()));
        Ok(())
    }

    fn navigate(
        &mut self,
        request: &GameRequest,
        target: NavigationTarget,
    ) -> Result<(), SurfaceError> {
        if self.fail_navigate {
            return Err(SurfaceError::Unavailable("no window".into()));
        }
        self.calls
            .push(SurfaceCall::Navigate(request.url.clone(), target));
        Ok(())
    }
}

pub fn encode_reply(token: &str) -> Result<HttpReply, ProxyError> {
    Ok(HttpReply::new(200, format!(r#"{{"encoded":"{token}"}}"#)))
}
