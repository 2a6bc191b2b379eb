//! Headless [`EmbedSurface`] that renders the overlay as HTML text.

use framelift_core::frame::{
    BADGE_INLINE_STYLE, CLOSE_BUTTON_INLINE_STYLE, FRAME_INLINE_STYLE,
    FULLSCREEN_BUTTON_INLINE_STYLE, OVERLAY_INLINE_STYLE,
};
use framelift_core::{EmbedSurface, FrameSpec, GameRequest, NavigationTarget, SurfaceError};

#[derive(Debug, Default)]
pub struct MarkupSurface {
    markup: Option<String>,
    scroll_locked: bool,
    guards: u32,
    navigations: Vec<(String, NavigationTarget)>,
}

impl MarkupSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup of the currently mounted overlay.
    pub fn markup(&self) -> Option<&str> {
        self.markup.as_deref()
    }

    pub const fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub const fn key_guards(&self) -> u32 {
        self.guards
    }

    pub fn navigations(&self) -> &[(String, NavigationTarget)] {
        &self.navigations
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn style_attr(inline: bool, style: &str) -> String {
    if inline {
        format!(" style=\"{}\"", escape(style))
    } else {
        String::new()
    }
}

/// Render `frame` the way the browser surface builds it.
pub fn render(frame: &FrameSpec) -> String {
    let inline = frame.inline();
    let sandbox = frame
        .sandbox
        .attribute()
        .map(|tokens| format!(" sandbox=\"{}\"", escape(&tokens)))
        .unwrap_or_default();
    let scrolling = if frame.scrolling { "" } else { " scrolling=\"no\"" };

    let mut html = String::new();
    html.push_str(&format!(
        "<div id=\"{}\" class=\"iframe-container\" style=\"display: block\">\n",
        escape(&frame.container_id)
    ));
    html.push_str(&format!(
        "  <div class=\"iframe-content\"{}>\n",
        style_attr(inline, OVERLAY_INLINE_STYLE)
    ));
    html.push_str(&format!(
        "    <iframe src=\"{}\" class=\"game-frame\" allowfullscreen frameborder=\"0\"{}{}{}></iframe>\n",
        escape(&frame.iframe_url),
        style_attr(inline, FRAME_INLINE_STYLE),
        sandbox,
        scrolling,
    ));
    html.push_str(&format!(
        "    <button class=\"close-button\"{}>CLOSE</button>\n",
        style_attr(inline, CLOSE_BUTTON_INLINE_STYLE)
    ));
    html.push_str(&format!(
        "    <button class=\"fullscreen-button\"{}>FULLSCREEN</button>\n",
        style_attr(inline, FULLSCREEN_BUTTON_INLINE_STYLE)
    ));
    html.push_str(&format!(
        "    <div class=\"bypass-info\"{}>{}</div>\n",
        style_attr(inline, BADGE_INLINE_STYLE),
        escape(&frame.badge)
    ));
    html.push_str("  </div>\n</div>\n");
    html
}

impl EmbedSurface for MarkupSurface {
    type KeyGuard = ();

    fn mount(&mut self, frame: &FrameSpec) -> Result<(), SurfaceError> {
        self.markup = Some(render(frame));
        Ok(())
    }

    fn unmount(&mut self, _container_id: &str) {
        self.markup = None;
    }

    fn set_scroll_lock(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }

    fn install_key_guard(&mut self) -> Result<(), SurfaceError> {
        self.guards += 1;
        Ok(())
    }

    fn remove_key_guard(&mut self, _guard: ()) {
        self.guards = self.guards.saturating_sub(1);
    }

    fn toggle_fullscreen(&mut self, _container_id: &str) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unavailable("fullscreen needs a browser".into()))
    }

    fn navigate(
        &mut self,
        request: &GameRequest,
        target: NavigationTarget,
    ) -> Result<(), SurfaceError> {
        self.navigations.push((request.url.clone(), target));
        Ok(())
    }
}
