//! Editable text fields.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::terminal::{Buffer, Style};
use crate::text::{cursor_window_start, display_width};

/// Result of feeding a key to a [`TextInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    /// The text changed.
    Changed,
    /// The key was consumed without changing the text (cursor moved).
    Handled,
    /// The key is not for this input.
    Ignored,
}

/// Text content and cursor for one input field.
///
/// The cursor is a byte offset that always sits on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    text: String,
    cursor: usize,
    multiline: bool,
}

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self {
            text,
            cursor,
            multiline: false,
        }
    }

    /// A field where Enter inserts a newline and Up/Down move between lines.
    pub fn multiline(text: impl Into<String>) -> Self {
        Self {
            multiline: true,
            ..Self::new(text)
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text, placing the cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    /// Cursor as `(line, column)`, with the column counted in chars.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        (line, before[line_start..].chars().count())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return InputResult::Ignored;
        }

        match key.code {
            KeyCode::Char(c) => {
                self.insert(c);
                InputResult::Changed
            }
            KeyCode::Enter if self.multiline => {
                self.insert('\n');
                InputResult::Changed
            }
            KeyCode::Backspace => match self.prev_boundary() {
                Some(start) => {
                    self.text.replace_range(start..self.cursor, "");
                    self.cursor = start;
                    InputResult::Changed
                }
                None => InputResult::Handled,
            },
            KeyCode::Delete => match self.next_boundary() {
                Some(end) => {
                    self.text.replace_range(self.cursor..end, "");
                    InputResult::Changed
                }
                None => InputResult::Handled,
            },
            KeyCode::Left => {
                if let Some(start) = self.prev_boundary() {
                    self.cursor = start;
                }
                InputResult::Handled
            }
            KeyCode::Right => {
                if let Some(end) = self.next_boundary() {
                    self.cursor = end;
                }
                InputResult::Handled
            }
            KeyCode::Home => {
                self.cursor = self.line_start(self.cursor);
                InputResult::Handled
            }
            KeyCode::End => {
                self.cursor = self.line_end(self.cursor);
                InputResult::Handled
            }
            KeyCode::Up if self.multiline => {
                self.move_vertically(false);
                InputResult::Handled
            }
            KeyCode::Down if self.multiline => {
                self.move_vertically(true);
                InputResult::Handled
            }
            _ => InputResult::Ignored,
        }
    }

    fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().last().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    fn line_start(&self, at: usize) -> usize {
        self.text[..at].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self, at: usize) -> usize {
        self.text[at..]
            .find('\n')
            .map(|i| at + i)
            .unwrap_or(self.text.len())
    }

    fn move_vertically(&mut self, down: bool) {
        let (_, column) = self.cursor_position();
        let start = self.line_start(self.cursor);

        let target_start = if down {
            let end = self.line_end(self.cursor);
            if end == self.text.len() {
                return;
            }
            end + 1
        } else {
            if start == 0 {
                return;
            }
            self.line_start(start - 1)
        };

        let target_end = self.line_end(target_start);
        let line = &self.text[target_start..target_end];
        self.cursor = line
            .char_indices()
            .nth(column)
            .map(|(i, _)| target_start + i)
            .unwrap_or(target_end);
    }
}

/// Draws one line of an input at `(x, y)`, clipped to `width` columns.
///
/// With a `caret` (char index), the line scrolls so the caret cell is on
/// screen and that cell is drawn reversed.
pub fn draw_line(
    buf: &mut Buffer,
    x: u16,
    y: u16,
    width: u16,
    line: &str,
    caret: Option<usize>,
    style: Style,
) {
    let skip = caret
        .map(|caret| cursor_window_start(line, caret, width as usize))
        .unwrap_or(0);
    let visible: String = line.chars().skip(skip).collect();
    buf.put_str(x, y, &visible, width, style);

    if let Some(caret) = caret {
        let before: String = visible.chars().take(caret - skip).collect();
        let caret_x = x + display_width(&before) as u16;
        if let Some(mut cell) = buf.get(caret_x, y).copied() {
            cell.style.reverse = true;
            buf.set(caret_x, y, cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut TextInput, s: &str) {
        for c in s.chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = TextInput::new("");
        type_str(&mut input, "héllo");
        assert_eq!(input.text(), "héllo");

        assert_eq!(input.handle_key(key(KeyCode::Backspace)), InputResult::Changed);
        assert_eq!(input.text(), "héll");
    }

    #[test]
    fn test_cursor_movement_and_insert() {
        let mut input = TextInput::new("ac");
        input.handle_key(key(KeyCode::Left));
        input.handle_key(key(KeyCode::Char('b')));
        assert_eq!(input.text(), "abc");

        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Delete));
        assert_eq!(input.text(), "bc");
    }

    #[test]
    fn test_backspace_at_start_is_handled() {
        let mut input = TextInput::new("x");
        input.handle_key(key(KeyCode::Home));
        assert_eq!(input.handle_key(key(KeyCode::Backspace)), InputResult::Handled);
        assert_eq!(input.text(), "x");
    }

    #[test]
    fn test_control_keys_are_ignored() {
        let mut input = TextInput::new("");
        let ctrl_g = KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL);
        assert_eq!(input.handle_key(ctrl_g), InputResult::Ignored);
        assert_eq!(input.text(), "");
    }

    #[test]
    fn test_enter_only_in_multiline() {
        let mut single = TextInput::new("a");
        assert_eq!(single.handle_key(key(KeyCode::Enter)), InputResult::Ignored);

        let mut multi = TextInput::multiline("a");
        assert_eq!(multi.handle_key(key(KeyCode::Enter)), InputResult::Changed);
        type_str(&mut multi, "bc");
        assert_eq!(multi.text(), "a\nbc");
        assert_eq!(multi.cursor_position(), (1, 2));
    }

    #[test]
    fn test_draw_line_scrolls_to_caret() {
        let mut buf = Buffer::new(6, 1);
        draw_line(&mut buf, 0, 0, 4, "abcdefg", Some(5), Style::new());

        assert_eq!(buf.row_text(0), "cdef  ");
        assert!(buf.get(3, 0).is_some_and(|cell| cell.style.reverse));
        assert!(buf.get(2, 0).is_some_and(|cell| !cell.style.reverse));
    }

    #[test]
    fn test_draw_line_caret_mid_text() {
        let mut buf = Buffer::new(8, 1);
        draw_line(&mut buf, 1, 0, 6, "Alice", Some(2), Style::new());

        assert_eq!(buf.row_text(0), " Alice  ");
        assert!(buf.get(3, 0).is_some_and(|cell| cell.style.reverse));
    }

    #[test]
    fn test_vertical_movement_keeps_column() {
        let mut input = TextInput::multiline("abcd\nxy\nlmnop");
        assert_eq!(input.cursor_position(), (2, 5));

        input.handle_key(key(KeyCode::Up));
        assert_eq!(input.cursor_position(), (1, 2));

        input.handle_key(key(KeyCode::Up));
        assert_eq!(input.cursor_position(), (0, 2));

        input.handle_key(key(KeyCode::Up));
        assert_eq!(input.cursor_position(), (0, 2));

        input.handle_key(key(KeyCode::Down));
        input.handle_key(key(KeyCode::Down));
        assert_eq!(input.cursor_position(), (2, 2));
    }
}
