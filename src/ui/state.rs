use std::time::Instant;

use crate::utils::input::sanitize_text_input;

/// Presentation state that lives next to the chat session: the input line,
/// the scroll position, the busy flag and the last error banner.
#[derive(Debug, Clone)]
pub struct UiState {
    pub input: String,
    /// Rows scrolled up from the bottom of the chat pane. Zero keeps the
    /// newest message in view.
    pub scroll_from_bottom: u16,
    pub busy: bool,
    pub busy_since: Instant,
    pub error: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            scroll_from_bottom: 0,
            busy: false,
            busy_since: Instant::now(),
            error: None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Inserts pasted text. Newlines become spaces since the input is a
    /// single line.
    pub fn insert_str(&mut self, text: &str) {
        let sanitized = sanitize_text_input(text).replace('\n', " ");
        self.input.push_str(&sanitized);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Takes the input for submission, leaving the field empty. Blank input
    /// is not submitted and is left in place.
    pub fn take_input(&mut self) -> Option<String> {
        if self.input.trim().is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.input))
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(rows);
    }

    pub fn clamp_scroll(&mut self, max_scroll: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.min(max_scroll);
    }

    pub fn begin_turn(&mut self) {
        self.busy = true;
        self.busy_since = Instant::now();
        self.error = None;
        self.scroll_from_bottom = 0;
    }

    pub fn end_turn(&mut self) {
        self.busy = false;
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn after_clear(&mut self) {
        self.error = None;
        self.scroll_from_bottom = 0;
    }
}
