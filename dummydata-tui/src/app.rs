//! The interactive preview screen.
//!
//! One loop owns all state. Terminal events and completions of background
//! requests are handled one at a time, so the workbench is never touched
//! concurrently.

use std::path::PathBuf;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Color;
use dummydata_lib::api::{ExportKind, GenerationResult, UploadResult};
use dummydata_lib::error::Error;
use dummydata_lib::workbench::RequestId;
use dummydata_lib::{Notice, NoticeLevel, PreviewClient, Workbench};
use futures::StreamExt;
use log::{debug, error, info};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::TuiError;
use crate::grid::{GridInput, TerminalGrid};
use crate::input::{InputResult, TextInput, draw_line};
use crate::terminal::{Buffer, Rect, Style, Terminal, TextStyle};
use crate::text::truncate_to_width;

const LABEL_WIDTH: u16 = 10;
const DDL_HEIGHT: u16 = 6;
const EDITING_HELP: &str = "Enter/Esc finish editing  ↑↓ finish and move";
const HELP: &str = "Tab focus  ^U upload  ^G generate  ^N add row  ^E CSV  ^S INSERT SQL  ^Q quit";

/// Which input receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    DdlPath,
    Ddl,
    Rows,
    Grid,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Self::DdlPath => Self::Ddl,
            Self::Ddl => Self::Rows,
            Self::Rows => Self::Grid,
            Self::Grid => Self::DdlPath,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::DdlPath => Self::Grid,
            Self::Ddl => Self::DdlPath,
            Self::Rows => Self::Ddl,
            Self::Grid => Self::Rows,
        }
    }
}

/// Result of a background request, delivered back to the event loop.
#[derive(Debug)]
pub enum Completion {
    Uploaded(Result<UploadResult, Error>),
    Generated(RequestId, GenerationResult),
    Exported(ExportKind, Result<PathBuf, Error>),
}

enum Step {
    Terminal(Option<std::io::Result<Event>>),
    Completion(Completion),
}

pub struct App {
    workbench: Workbench<TerminalGrid>,
    client: PreviewClient,
    download_dir: PathBuf,
    focus: Focus,
    path_input: TextInput,
    ddl_input: TextInput,
    rows_input: TextInput,
    ddl_top: usize,
    notice: Option<Notice>,
    in_flight: usize,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    quit: bool,
}

impl App {
    pub fn new(config: &Config, client: PreviewClient) -> Self {
        let (completions_tx, completions) = mpsc::unbounded_channel();

        let mut workbench = Workbench::new(TerminalGrid::new());
        workbench.set_row_count(config.rows.clone());

        let focus = if config.ddl_path.is_some() {
            Focus::DdlPath
        } else {
            Focus::Ddl
        };

        Self {
            workbench,
            client,
            download_dir: config.download_dir.clone(),
            focus,
            path_input: TextInput::new(config.ddl_path.clone().unwrap_or_default()),
            ddl_input: TextInput::multiline(""),
            rows_input: TextInput::new(config.rows.clone()),
            ddl_top: 0,
            notice: None,
            in_flight: 0,
            completions_tx,
            completions,
            quit: false,
        }
    }

    /// Runs until the user quits or the terminal event stream ends.
    pub async fn run(&mut self, terminal: &mut Terminal) -> Result<(), TuiError> {
        let mut events = EventStream::new();

        terminal.draw(|buf| self.draw(buf))?;

        while !self.quit {
            let step = tokio::select! {
                event = events.next() => Step::Terminal(event),
                Some(completion) = self.completions.recv() => Step::Completion(completion),
            };

            match step {
                Step::Terminal(None) => {
                    info!("Terminal event stream closed");
                    break;
                }
                Step::Terminal(Some(Err(e))) => {
                    error!("Event stream error: {}", e);
                    return Err(e.into());
                }
                Step::Terminal(Some(Ok(Event::Key(key)))) if key.kind == KeyEventKind::Press => {
                    self.handle_key(key);
                }
                Step::Terminal(Some(Ok(_))) => {}
                Step::Completion(completion) => self.on_completion(completion),
            }

            terminal.draw(|buf| self.draw(buf))?;
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char(c) = key.code {
                match c.to_ascii_lowercase() {
                    'q' | 'c' => self.quit = true,
                    'u' => self.start_upload(),
                    'g' => self.start_generate(),
                    'n' => {
                        let index = self.workbench.add_row();
                        self.notice = Some(Notice::info(format!("Added row {}", index + 1)));
                    }
                    'e' => self.start_export(ExportKind::Csv),
                    's' => self.start_export(ExportKind::InsertSql),
                    _ => {}
                }
                return;
            }
        }

        match key.code {
            KeyCode::Tab => return self.set_focus(self.focus.next()),
            KeyCode::BackTab => return self.set_focus(self.focus.prev()),
            _ => {}
        }

        match self.focus {
            Focus::DdlPath => {
                if key.code == KeyCode::Enter {
                    self.start_upload();
                } else {
                    self.path_input.handle_key(key);
                }
            }
            Focus::Ddl => {
                if self.ddl_input.handle_key(key) == InputResult::Changed {
                    self.workbench.set_ddl(self.ddl_input.text());
                }
            }
            Focus::Rows => {
                if key.code == KeyCode::Enter {
                    self.start_generate();
                } else if self.rows_input.handle_key(key) == InputResult::Changed {
                    self.workbench.set_row_count(self.rows_input.text());
                }
            }
            Focus::Grid => {
                if let GridInput::Edited(edit) = self.workbench.view_mut().handle_key(key) {
                    self.workbench.on_cell_edited(edit);
                }
            }
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        if self.focus == Focus::Grid {
            self.workbench.view_mut().stop_editing();
        }
        self.focus = focus;
    }

    // -------------------------------------------------------------------------
    // Background requests
    // -------------------------------------------------------------------------

    fn spawn_request<F>(&mut self, request: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.completions_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(request.await);
        });
    }

    fn start_upload(&mut self) {
        let path = PathBuf::from(self.path_input.text().trim());
        if path.as_os_str().is_empty() {
            debug!("Upload ignored: no file chosen");
            return;
        }

        self.notice = Some(Notice::info(format!("Uploading {}", path.display())));
        let client = self.client.clone();
        self.spawn_request(async move { Completion::Uploaded(client.upload_sql_file(&path).await) });
    }

    fn start_generate(&mut self) {
        let Some((id, request)) = self.workbench.generation_request() else {
            return;
        };

        self.notice = Some(Notice::info("Generating preview"));
        let client = self.client.clone();
        self.spawn_request(async move { Completion::Generated(id, client.generate(&request).await) });
    }

    fn start_export(&mut self, kind: ExportKind) {
        let request = self.workbench.export_request(kind);
        let dir = self.download_dir.clone();

        self.notice = Some(Notice::info(format!("Exporting {}", kind.label())));
        let client = self.client.clone();
        self.spawn_request(async move {
            Completion::Exported(kind, client.export_to(&request, &dir).await)
        });
    }

    pub fn on_completion(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match completion {
            Completion::Uploaded(outcome) => {
                let notice = self.workbench.apply_upload_outcome(outcome);
                if !notice.is_error() {
                    self.ddl_input.set_text(self.workbench.ddl());
                    self.ddl_top = 0;
                }
                self.notice = Some(notice);
            }
            Completion::Generated(id, result) => {
                if let Some(notice) = self.workbench.apply_generation(id, result) {
                    self.notice = Some(notice);
                }
            }
            Completion::Exported(kind, result) => {
                self.notice = Some(Workbench::<TerminalGrid>::export_outcome(kind, result));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    pub fn draw(&mut self, buf: &mut Buffer) {
        let area = buf.area();
        if area.width == 0 || area.height == 0 {
            return;
        }
        let muted = Style::new().fg(Color::DarkGrey);

        let title_width = buf.put_str(
            0,
            0,
            " dummydata ",
            area.width,
            Style::new().text(TextStyle::new().bold().reverse()),
        );
        let backend = format!(" {}", self.client.base_url());
        buf.put_str(title_width, 0, &backend, area.width - title_width, muted);

        let field_width = area.width.saturating_sub(LABEL_WIDTH);

        self.draw_label(buf, 2, "DDL file", Focus::DdlPath);
        let path_area = Rect::new(LABEL_WIDTH, 2, field_width, 1);
        draw_input(buf, path_area, &self.path_input, self.focus == Focus::DdlPath, &mut 0);

        self.draw_label(buf, 3, "DDL", Focus::Ddl);
        let ddl_area = Rect::new(LABEL_WIDTH, 3, field_width, DDL_HEIGHT);
        draw_input(buf, ddl_area, &self.ddl_input, self.focus == Focus::Ddl, &mut self.ddl_top);

        let rows_y = ddl_area.bottom() + 1;
        self.draw_label(buf, rows_y, "Rows", Focus::Rows);
        let rows_area = Rect::new(LABEL_WIDTH, rows_y, field_width, 1);
        draw_input(buf, rows_area, &self.rows_input, self.focus == Focus::Rows, &mut 0);

        let separator_y = rows_y + 2;
        let separator_style = if self.focus == Focus::Grid {
            Style::new().fg(Color::Cyan)
        } else {
            muted
        };
        buf.fill(0, separator_y, area.width, '─', separator_style);
        buf.put_str(2, separator_y, " Preview ", area.width.saturating_sub(2), separator_style);

        let grid_y = separator_y + 1;
        let grid_height = area.height.saturating_sub(grid_y + 2);
        let grid_area = Rect::new(0, grid_y, area.width, grid_height);
        let grid_focused = self.focus == Focus::Grid;
        self.workbench.view_mut().draw(buf, grid_area, grid_focused);

        let help_y = area.height.saturating_sub(2);
        if help_y > grid_y {
            let help = if grid_focused && self.workbench.view().is_editing() {
                EDITING_HELP
            } else {
                HELP
            };
            buf.put_str(0, help_y, help, area.width, muted);
        }

        let status_y = area.height - 1;
        let mut status = self
            .notice
            .as_ref()
            .map(|notice| notice.message.clone())
            .unwrap_or_default();
        if self.in_flight > 0 {
            status.push_str(" …");
        }
        let status_style = match self.notice.as_ref().map(|notice| notice.level) {
            Some(NoticeLevel::Error) => Style::new().fg(Color::Red),
            Some(NoticeLevel::Warning) => Style::new().fg(Color::Yellow),
            _ => Style::new().fg(Color::Green),
        };
        let status = truncate_to_width(&status, area.width as usize);
        buf.put_str(0, status_y, &status, area.width, status_style);
    }

    fn draw_label(&self, buf: &mut Buffer, y: u16, label: &str, focus: Focus) {
        let style = if self.focus == focus {
            Style::new().fg(Color::Cyan).text(TextStyle::new().bold())
        } else {
            Style::new()
        };
        buf.put_str(0, y, label, LABEL_WIDTH - 1, style);
    }
}

/// Draws a text input into `area`, scrolling so the cursor stays visible.
///
/// `top` is the first visible line and is updated in place.
fn draw_input(buf: &mut Buffer, area: Rect, input: &TextInput, focused: bool, top: &mut usize) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let height = area.height as usize;
    let (cursor_line, cursor_column) = input.cursor_position();

    if cursor_line < *top {
        *top = cursor_line;
    } else if cursor_line >= *top + height {
        *top = cursor_line + 1 - height;
    }

    for (offset, line) in input.text().split('\n').skip(*top).take(height).enumerate() {
        let y = area.y + offset as u16;
        let on_cursor_line = focused && *top + offset == cursor_line;

        let caret = on_cursor_line.then_some(cursor_column);
        draw_line(buf, area.x, y, area.width, line, caret, Style::new());
    }
}
