//! Single-line JSON input sent with a trigger.

use serde_json::Value;

#[derive(Clone, Debug, Default)]
pub struct RunInputState {
    buffer: String,
    /// Byte index into `buffer`, always on a UTF-8 boundary.
    cursor: usize,
    editing: bool,
}

impl RunInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.set_text(String::new());
    }

    pub fn move_left(&mut self) {
        if let Some(previous) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= previous.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.buffer[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn insert_char(&mut self, character: char) {
        self.buffer.insert(self.cursor, character);
        self.cursor += character.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(previous) = self.buffer[..self.cursor].chars().next_back() {
            let start = self.cursor - previous.len_utf8();
            self.buffer.drain(start..self.cursor);
            self.cursor = start;
        }
    }

    /// Parse the buffer as the trigger input. A blank buffer means no input.
    pub fn parsed(&self) -> Result<Option<Value>, String> {
        let trimmed = self.buffer.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|error| format!("Invalid JSON input: {error}"))
    }
}
