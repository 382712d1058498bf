//! Terminal rendition of the preview grid.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;
use dummydata_lib::{CellEdit, GridFrame, GridView, TableSnapshot};

use crate::input::{InputResult, TextInput, draw_line};
use crate::terminal::{Buffer, Rect, Style, TextStyle};
use crate::text::{display_width, truncate_to_width};

const MIN_COLUMN_WIDTH: usize = 3;
const MAX_COLUMN_WIDTH: usize = 30;
const HIDDEN_HINT: &str = "Generate a table to see the preview.";

/// What a key did to the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridInput {
    Ignored,
    Handled,
    /// A cell's text changed; the edit must be written to the table.
    Edited(CellEdit),
}

/// A spreadsheet-style grid drawn into a terminal [`Buffer`].
#[derive(Debug, Default)]
pub struct TerminalGrid {
    frame: GridFrame,
    hidden: bool,
    row: usize,
    column: usize,
    editing: Option<TextInput>,
    top: usize,
    left: usize,
    page_rows: usize,
}

impl GridView for TerminalGrid {
    fn render(&mut self, snapshot: &TableSnapshot) {
        self.frame = GridFrame::project(snapshot);
        self.hidden = false;
        self.editing = None;

        self.row = self.row.min(self.frame.row_count().saturating_sub(1));
        self.column = self.column.min(self.frame.column_count().saturating_sub(1));
    }

    fn hide(&mut self) {
        self.hidden = true;
        self.editing = None;
    }
}

impl TerminalGrid {
    /// A grid that stays hidden until the first render.
    pub fn new() -> Self {
        Self {
            hidden: true,
            ..Self::default()
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn stop_editing(&mut self) {
        self.editing = None;
    }

    fn has_cells(&self) -> bool {
        !self.hidden && self.frame.row_count() > 0 && self.frame.column_count() > 0
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> GridInput {
        if !self.has_cells() {
            return GridInput::Ignored;
        }

        if let Some(input) = self.editing.as_mut() {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    self.editing = None;
                    return GridInput::Handled;
                }
                KeyCode::Up | KeyCode::Down => {
                    self.editing = None;
                    return self.move_cursor(key.code);
                }
                _ => {}
            }

            return match input.handle_key(key) {
                InputResult::Changed => {
                    let text = input.text().to_string();
                    self.write_cell(text)
                }
                InputResult::Handled => GridInput::Handled,
                InputResult::Ignored => GridInput::Ignored,
            };
        }

        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return GridInput::Ignored;
        }

        match key.code {
            KeyCode::Enter | KeyCode::F(2) => {
                self.start_editing();
                GridInput::Handled
            }
            KeyCode::Char(_) | KeyCode::Backspace => {
                self.start_editing();
                let Some(input) = self.editing.as_mut() else {
                    return GridInput::Ignored;
                };
                match input.handle_key(key) {
                    InputResult::Changed => {
                        let text = input.text().to_string();
                        self.write_cell(text)
                    }
                    _ => GridInput::Handled,
                }
            }
            KeyCode::Delete => self.write_cell(String::new()),
            code => self.move_cursor(code),
        }
    }

    fn start_editing(&mut self) {
        let current = self.frame.cell(self.row, self.column).unwrap_or_default();
        self.editing = Some(TextInput::new(current));
    }

    fn write_cell(&mut self, text: String) -> GridInput {
        let Some(column) = self.frame.headers().get(self.column).cloned() else {
            return GridInput::Ignored;
        };
        let Some(cell) = self.frame.cell_mut(self.row, self.column) else {
            return GridInput::Ignored;
        };

        if *cell == text {
            return GridInput::Handled;
        }
        cell.clone_from(&text);
        GridInput::Edited(CellEdit::new(self.row, column, text))
    }

    fn move_cursor(&mut self, code: KeyCode) -> GridInput {
        let last_row = self.frame.row_count().saturating_sub(1);
        let last_column = self.frame.column_count().saturating_sub(1);
        let page = self.page_rows.max(1);

        match code {
            KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Down => self.row = (self.row + 1).min(last_row),
            KeyCode::Left => self.column = self.column.saturating_sub(1),
            KeyCode::Right => self.column = (self.column + 1).min(last_column),
            KeyCode::Home => self.column = 0,
            KeyCode::End => self.column = last_column,
            KeyCode::PageUp => self.row = self.row.saturating_sub(page),
            KeyCode::PageDown => self.row = (self.row + page).min(last_row),
            _ => return GridInput::Ignored,
        }
        GridInput::Handled
    }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    fn column_widths(&self) -> Vec<usize> {
        self.frame
            .headers()
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let widest_cell = (0..self.frame.row_count())
                    .filter_map(|row| self.frame.cell(row, index))
                    .map(display_width)
                    .max()
                    .unwrap_or(0);
                display_width(header)
                    .max(widest_cell)
                    .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
            })
            .collect()
    }

    /// Scrolls so the cursor is inside the visible window.
    fn scroll_into_view(&mut self, body_rows: usize, widths: &[usize], available: usize) {
        if self.row < self.top {
            self.top = self.row;
        } else if body_rows > 0 && self.row >= self.top + body_rows {
            self.top = self.row + 1 - body_rows;
        }

        if self.column < self.left {
            self.left = self.column;
        }
        while self.left < self.column {
            let span: usize = widths[self.left..=self.column].iter().map(|w| w + 1).sum();
            if span <= available {
                break;
            }
            self.left += 1;
        }
    }

    pub fn draw(&mut self, buf: &mut Buffer, area: Rect, focused: bool) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let muted = Style::new().fg(Color::DarkGrey).text(TextStyle::new().dim());

        if self.hidden {
            buf.put_str(area.x, area.y, HIDDEN_HINT, area.width, muted);
            return;
        }
        if let GridFrame::Placeholder(text) = &self.frame {
            buf.put_str(area.x, area.y, text, area.width, muted);
            return;
        }

        let mut widths = self.column_widths();
        if self.editing.is_some() {
            // Room for the caret after the last char.
            if let Some(width) = widths.get_mut(self.column) {
                *width += 1;
            }
        }
        let gutter = self.frame.row_count().to_string().len().max(2) + 1;
        let available = (area.width as usize).saturating_sub(gutter);
        let body_rows = (area.height as usize).saturating_sub(1);
        self.page_rows = body_rows;
        self.scroll_into_view(body_rows, &widths, available);

        let header_style = Style::new().text(TextStyle::new().bold().underline());
        let mut x = area.x + gutter as u16;
        let right = area.x + area.width;
        for (index, header) in self.frame.headers().iter().enumerate().skip(self.left) {
            if x >= right {
                break;
            }
            let width = widths[index].min((right - x) as usize);
            let label = truncate_to_width(header, width);
            buf.put_str(x, area.y, &label, width as u16, header_style);
            x += width as u16 + 1;
        }

        for (offset, row) in (self.top..self.frame.row_count()).take(body_rows).enumerate() {
            let y = area.y + 1 + offset as u16;
            if y >= area.bottom() {
                break;
            }

            let number = format!("{:>width$}", row + 1, width = gutter - 1);
            buf.put_str(area.x, y, &number, gutter as u16, muted);

            let mut x = area.x + gutter as u16;
            for (index, width) in widths.iter().enumerate().skip(self.left) {
                if x >= right {
                    break;
                }
                let width = (*width).min((right - x) as usize);
                let selected = row == self.row && index == self.column;

                match (&self.editing, selected) {
                    (Some(input), true) => {
                        let style = Style::new().text(TextStyle::new().underline());
                        let (_, caret) = input.cursor_position();
                        buf.fill(x, y, width as u16, ' ', style);
                        draw_line(buf, x, y, width as u16, input.text(), Some(caret), style);
                    }
                    (None, true) => {
                        let text = if focused {
                            TextStyle::new().reverse()
                        } else {
                            TextStyle::new().underline()
                        };
                        let style = Style::new().text(text);
                        buf.fill(x, y, width as u16, ' ', style);
                        buf.put_str(x, y, &self.cell_text(row, index, width), width as u16, style);
                    }
                    _ => {
                        let text = self.cell_text(row, index, width);
                        buf.put_str(x, y, &text, width as u16, Style::new());
                    }
                }
                x += width as u16 + 1;
            }
        }
    }

    fn cell_text(&self, row: usize, column: usize, width: usize) -> String {
        truncate_to_width(self.frame.cell(row, column).unwrap_or_default(), width)
    }
}
