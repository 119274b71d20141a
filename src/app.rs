use ratatui::layout::Rect;
use tokio::task::{JoinError, JoinHandle};

use crate::client::ChatClient;
use crate::error::ChatError;

/// Shown in place of a reply whenever the request or its body fails.
pub const CONNECT_ERROR: &str = "Error: Could not connect to the backend";

pub const PLACEHOLDER: &str = "Type your message...";

type ReplyTask = JoinHandle<Result<String, ChatError>>;
type HealthTask = JoinHandle<Result<String, ChatError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    SendButton,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Online(String),
    Offline,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: Focus,

    // Chat state
    pub draft: String,
    pub cursor: usize, // char index into draft
    pub response: String,
    pub in_flight: bool,
    pub reply_task: Option<ReplyTask>,

    // Backend
    pub client: ChatClient,
    pub backend_status: BackendStatus,
    pub health_task: Option<HealthTask>,

    // Layout areas from the last render, for mouse hit-testing
    pub input_area: Option<Rect>,
    pub send_area: Option<Rect>,
    pub response_area: Option<Rect>,

    // Response panel scrolling
    pub response_scroll: u16,
    pub response_height: u16,
    pub response_lines: u16,

    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(client: ChatClient) -> Self {
        Self {
            should_quit: false,
            focus: Focus::Input,
            draft: String::new(),
            cursor: 0,
            response: String::new(),
            in_flight: false,
            reply_task: None,
            client,
            backend_status: BackendStatus::Unknown,
            health_task: None,
            input_area: None,
            send_area: None,
            response_area: None,
            response_scroll: 0,
            response_height: 0,
            response_lines: 0,
            animation_frame: 0,
        }
    }

    /// Input and send button are both disabled while a request is out.
    pub fn input_enabled(&self) -> bool {
        !self.in_flight
    }

    /// Send the draft to the backend.
    ///
    /// Returns false without touching any state when the draft is blank or a
    /// request is already in flight. The draft goes out exactly as typed.
    pub fn submit(&mut self) -> bool {
        if self.in_flight || self.draft.trim().is_empty() {
            return false;
        }

        let message = self.draft.clone();
        let client = self.client.clone();

        tracing::info!(chars = message.chars().count(), "sending message");
        self.in_flight = true;
        self.animation_frame = 0;
        self.reply_task = Some(tokio::spawn(async move { client.send(&message).await }));
        true
    }

    /// Apply the reply if the request task has finished. Never blocks.
    pub async fn poll_reply(&mut self) {
        if self.reply_task.as_ref().is_some_and(|task| task.is_finished()) {
            self.settle().await;
        }
    }

    /// Wait for the in-flight request, if any, and apply its outcome.
    pub async fn settle(&mut self) {
        if let Some(task) = self.reply_task.take() {
            let outcome = task.await;
            self.apply_reply(outcome);
        }
    }

    fn apply_reply(&mut self, outcome: Result<Result<String, ChatError>, JoinError>) {
        self.response = match outcome {
            Ok(Ok(text)) => {
                tracing::info!(chars = text.chars().count(), "reply received");
                text
            }
            Ok(Err(err)) => {
                tracing::warn!(kind = err.kind(), error = %err, "chat request failed");
                CONNECT_ERROR.to_string()
            }
            Err(err) => {
                tracing::error!(error = %err, "chat request task died");
                CONNECT_ERROR.to_string()
            }
        };
        self.response_scroll = 0;
        self.in_flight = false;
    }

    /// Start the one-off `GET /` probe shown in the header.
    pub fn probe_backend(&mut self) {
        let client = self.client.clone();
        self.backend_status = BackendStatus::Unknown;
        self.health_task = Some(tokio::spawn(async move { client.health().await }));
    }

    pub async fn poll_backend(&mut self) {
        if !self.health_task.as_ref().is_some_and(|task| task.is_finished()) {
            return;
        }
        let Some(task) = self.health_task.take() else {
            return;
        };

        self.backend_status = match task.await {
            Ok(Ok(message)) => {
                tracing::info!(%message, "backend is up");
                BackendStatus::Online(message)
            }
            Ok(Err(err)) => {
                tracing::warn!(kind = err.kind(), error = %err, "backend probe failed");
                BackendStatus::Offline
            }
            Err(err) => {
                tracing::error!(error = %err, "backend probe task died");
                BackendStatus::Offline
            }
        };
    }

    // Draft editing. Everything here is a no-op while a request is in flight.

    pub fn insert_char(&mut self, c: char) {
        if !self.input_enabled() {
            return;
        }
        let byte_pos = char_to_byte_index(&self.draft, self.cursor);
        self.draft.insert(byte_pos, c);
        self.cursor += 1;
    }

    /// Insert pasted text at the cursor. The input is single-line, so line
    /// breaks are dropped rather than treated as Enter.
    pub fn insert_str(&mut self, text: &str) {
        if !self.input_enabled() {
            return;
        }
        let cleaned: String = text.chars().filter(|c| *c != '\r' && *c != '\n').collect();
        let byte_pos = char_to_byte_index(&self.draft, self.cursor);
        self.draft.insert_str(byte_pos, &cleaned);
        self.cursor += cleaned.chars().count();
    }

    pub fn backspace(&mut self) {
        if !self.input_enabled() || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(&self.draft, self.cursor);
        self.draft.remove(byte_pos);
    }

    pub fn delete(&mut self) {
        if !self.input_enabled() || self.cursor >= self.draft.chars().count() {
            return;
        }
        let byte_pos = char_to_byte_index(&self.draft, self.cursor);
        self.draft.remove(byte_pos);
    }

    pub fn cursor_left(&mut self) {
        if self.input_enabled() {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    pub fn cursor_right(&mut self) {
        if self.input_enabled() {
            self.cursor = (self.cursor + 1).min(self.draft.chars().count());
        }
    }

    pub fn cursor_home(&mut self) {
        if self.input_enabled() {
            self.cursor = 0;
        }
    }

    pub fn cursor_end(&mut self) {
        if self.input_enabled() {
            self.cursor = self.draft.chars().count();
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::SendButton,
            Focus::SendButton => Focus::Input,
        };
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.in_flight {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn max_response_scroll(&self) -> u16 {
        self.response_lines.saturating_sub(self.response_height)
    }

    pub fn scroll_response_down(&mut self, lines: u16) {
        self.response_scroll = self
            .response_scroll
            .saturating_add(lines)
            .min(self.max_response_scroll());
    }

    pub fn scroll_response_up(&mut self, lines: u16) {
        self.response_scroll = self.response_scroll.saturating_sub(lines);
    }

    pub fn half_page(&self) -> u16 {
        (self.response_height / 2).max(1)
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
