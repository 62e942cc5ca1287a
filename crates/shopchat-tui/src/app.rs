use ratatui::layout::Rect;
use shopchat_core::{
    ChatEndpoint, ChatWidget, EndpointError, HttpEndpoint, Reply, RequestId, SubmitOutcome,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::tui::AppEvent;
use crate::ui;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub widget: ChatWidget,

    // Chat panel scroll
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of message area for scroll calculations
    pub chat_width: u16,  // Width of message area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing dots

    // Areas for mouse hit-testing (updated during render)
    pub toggle_area: Option<Rect>,
    pub close_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    // Endpoint and the channel replies come back on
    pub endpoint: HttpEndpoint,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(widget: ChatWidget, endpoint: HttpEndpoint, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            widget,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            toggle_area: None,
            close_area: None,
            chat_area: None,

            endpoint,
            events,
        }
    }

    pub fn open_chat(&mut self) {
        self.widget.open();
        self.scroll_chat_to_bottom();
    }

    pub fn close_chat(&mut self) {
        self.widget.close();
    }

    /// Submit the input field and, if the widget accepted it, issue the request
    /// in a background task that reports back through the event channel.
    pub fn send_message(&mut self) -> SubmitOutcome {
        let outcome = self.widget.submit();

        if let SubmitOutcome::Sent(request) = &outcome {
            let endpoint = self.endpoint.clone();
            let events = self.events.clone();
            let id = request.id;
            let message = request.message.clone();

            tokio::spawn(async move {
                let inner = tokio::spawn(async move { endpoint.send(&message).await });
                let result = match inner.await {
                    Ok(result) => result,
                    Err(e) => Err(EndpointError::Aborted(e.to_string())),
                };
                if events.send(AppEvent::Reply { id, result }).is_err() {
                    warn!(request = %id, "event loop gone before reply was delivered");
                }
            });
        }

        outcome
    }

    pub fn apply_reply(&mut self, id: RequestId, result: Result<Reply, EndpointError>) {
        self.widget.handle_response(id, result);
        if !self.widget.is_waiting() {
            self.animation_frame = 0;
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.widget.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.total_chat_lines().saturating_sub(self.visible_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
    }

    pub fn half_page(&self) -> u16 {
        (self.visible_height() / 2).max(1)
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Number of wrapped lines the transcript takes up in the message area,
    /// counted on the same paragraph `ui` draws
    pub fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };

        let count = ui::chat_paragraph(self).line_count(wrap_width);
        u16::try_from(count).unwrap_or(u16::MAX)
    }

    /// Scroll chat to bottom so the newest entry is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.total_chat_lines();
        let visible_height = self.visible_height();

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    /// Honour the transcript's scroll request, if the last render made one
    pub fn follow_transcript(&mut self) {
        if self.widget.transcript_mut().take_scroll_request() {
            self.scroll_chat_to_bottom();
        }
    }
}
