//! Preview state machine
//!
//! A [`Workbench`] ties together the table state, a grid view, and the DDL
//! and row-count inputs. It is driven by a single event loop: user actions
//! and network completions are applied one at a time, and only the workbench
//! mutates the table.
//!
//! ```text
//! Empty --generate ok--> Populated --edit*--> Populated --generate ok--> Populated(new)
//!   generate failure: no change in either phase
//! ```
//!
//! Network calls are split into a synchronous "build request" step and a
//! synchronous "apply result" step so a caller can run the request on a
//! background task. The `async` helpers chain both for callers that do not
//! need that.

use std::path::Path;
use std::path::PathBuf;

use log::debug;
use log::info;
use log::warn;

use crate::PreviewClient;
use crate::api::ExportKind;
use crate::api::ExportRequest;
use crate::api::GenerateRequest;
use crate::api::GenerationResult;
use crate::api::UploadResult;
use crate::error::Error;
use crate::grid::CellEdit;
use crate::grid::GridView;
use crate::table::TableState;

/// Shown when generation fails without a server message.
pub const GENERATE_FAILED: &str = "Failed to generate data";
/// Shown when the generation request produced no usable response.
pub const GENERATE_SERVER_ERROR: &str = "Server error while generating preview";
/// Shown when generation succeeded but returned no columns.
pub const NO_COLUMNS: &str = "No columns detected";
/// Shown when a DDL upload fails without a server message.
pub const UPLOAD_FAILED: &str = "Failed to upload DDL file";

/// Message shown when an export fails.
pub fn export_failed_message(kind: ExportKind) -> String {
    format!("Failed to generate {}", kind.label())
}

// =============================================================================
// Notices
// =============================================================================

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible message produced by an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

// =============================================================================
// Workbench
// =============================================================================

/// Whether a table is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No columns yet (startup, or the last generation found none).
    Empty,
    /// A generated table with at least one column is loaded.
    Populated,
}

/// Identifies one generation request.
///
/// Ids increase with every request issued by a workbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owner of the preview table and the view that displays it.
#[derive(Debug)]
pub struct Workbench<V> {
    table: TableState,
    view: V,
    ddl: String,
    row_count: String,
    last_issued: u64,
}

impl<V: GridView> Workbench<V> {
    /// Creates an empty workbench drawing into `view`.
    pub fn new(view: V) -> Self {
        Self {
            table: TableState::new(),
            view,
            ddl: String::new(),
            row_count: String::new(),
            last_issued: 0,
        }
    }

    /// The table state.
    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view, for input handling.
    ///
    /// Edits the view produces must come back through
    /// [`on_cell_edited`](Self::on_cell_edited).
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn ddl(&self) -> &str {
        &self.ddl
    }

    pub fn set_ddl(&mut self, ddl: impl Into<String>) {
        self.ddl = ddl.into();
    }

    /// Row count text as typed by the user.
    pub fn row_count(&self) -> &str {
        &self.row_count
    }

    pub fn set_row_count(&mut self, row_count: impl Into<String>) {
        self.row_count = row_count.into();
    }

    pub fn phase(&self) -> Phase {
        if self.table.columns().is_empty() {
            Phase::Empty
        } else {
            Phase::Populated
        }
    }

    /// Writes a grid edit through to the table.
    ///
    /// The view is not re-rendered; it already shows the typed text.
    pub fn on_cell_edited(&mut self, edit: CellEdit) -> bool {
        self.table.apply(edit)
    }

    /// Appends a blank row and re-renders the grid.
    pub fn add_row(&mut self) -> usize {
        let index = self.table.append_row();
        debug!("Added row {}", index);
        self.view.render(self.table.snapshot());
        index
    }

    // -------------------------------------------------------------------------
    // Generation
    // -------------------------------------------------------------------------

    /// Builds the next generation request from the current inputs.
    ///
    /// Returns `None` (and issues no id) when the DDL text is blank.
    pub fn generation_request(&mut self) -> Option<(RequestId, GenerateRequest)> {
        if self.ddl.trim().is_empty() {
            debug!("Generate ignored: no DDL text");
            return None;
        }

        self.last_issued += 1;
        let id = RequestId(self.last_issued);
        info!("Issuing generation request {}", id);
        Some((
            id,
            GenerateRequest::new(self.ddl.clone(), self.row_count.clone()),
        ))
    }

    /// Applies a generation response.
    ///
    /// Responses to anything but the most recently issued request are
    /// discarded and return `None`. A successful response replaces the table
    /// even if it was edited while the request was in flight.
    pub fn apply_generation(&mut self, id: RequestId, result: GenerationResult) -> Option<Notice> {
        if id.0 < self.last_issued {
            info!(
                "Discarding stale generation response {} (latest is #{})",
                id, self.last_issued
            );
            return None;
        }

        let notice = match result {
            GenerationResult::Ok { columns, data } => {
                let no_columns = columns.is_empty();
                let rows = data.len();
                self.table.replace(columns, data);

                if no_columns {
                    self.view.hide();
                    Notice::warning(NO_COLUMNS)
                } else {
                    self.view.render(self.table.snapshot());
                    Notice::info(format!("Generated {} rows", rows))
                }
            }
            GenerationResult::Failed { message } => {
                Notice::error(message.unwrap_or_else(|| GENERATE_FAILED.to_string()))
            }
            GenerationResult::TransportError(e) => {
                warn!("Generation {} failed in transport: {}", id, e);
                Notice::error(GENERATE_SERVER_ERROR)
            }
        };
        Some(notice)
    }

    /// Requests a new table and applies the response.
    pub async fn generate(&mut self, client: &PreviewClient) -> Option<Notice> {
        let (id, request) = self.generation_request()?;
        let result = client.generate(&request).await;
        self.apply_generation(id, result)
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    /// Captures an export request from the current table.
    pub fn export_request(&self, kind: ExportKind) -> ExportRequest {
        match kind {
            ExportKind::Csv => ExportRequest::csv(self.table.snapshot()),
            ExportKind::InsertSql => ExportRequest::insert_sql(&self.ddl, self.table.snapshot()),
        }
    }

    /// Turns the outcome of an export into a notice.
    pub fn export_outcome(kind: ExportKind, result: Result<PathBuf, Error>) -> Notice {
        match result {
            Ok(path) => Notice::info(format!("Saved {}", path.display())),
            Err(e) => {
                warn!("{} export failed: {}", kind.label(), e);
                Notice::error(export_failed_message(kind))
            }
        }
    }

    /// Exports the current table and saves the artifact into `dir`.
    pub async fn export(&self, client: &PreviewClient, kind: ExportKind, dir: &Path) -> Notice {
        let request = self.export_request(kind);
        let result = client.export_to(&request, dir).await;
        Self::export_outcome(kind, result)
    }

    // -------------------------------------------------------------------------
    // Upload
    // -------------------------------------------------------------------------

    /// Applies an upload response, replacing the DDL text on success.
    pub fn apply_upload(&mut self, result: UploadResult) -> Notice {
        match result {
            UploadResult::Ok { ddl } => {
                info!("Loaded DDL ({} bytes)", ddl.len());
                self.ddl = ddl;
                Notice::info("DDL loaded")
            }
            UploadResult::Failed { message } => {
                Notice::error(message.unwrap_or_else(|| UPLOAD_FAILED.to_string()))
            }
            UploadResult::TransportError(e) => {
                warn!("DDL upload failed in transport: {}", e);
                Notice::error(UPLOAD_FAILED)
            }
        }
    }

    /// Uploads a DDL file and applies the response.
    ///
    /// An empty path is ignored.
    pub async fn upload(&mut self, client: &PreviewClient, path: &Path) -> Option<Notice> {
        if path.as_os_str().is_empty() {
            return None;
        }

        let outcome = client.upload_sql_file(path).await;
        Some(self.apply_upload_outcome(outcome))
    }

    /// Applies the outcome of [`PreviewClient::upload_sql_file`].
    pub fn apply_upload_outcome(&mut self, outcome: Result<UploadResult, Error>) -> Notice {
        match outcome {
            Ok(result) => self.apply_upload(result),
            Err(e) => {
                warn!("Could not read DDL file: {}", e);
                Notice::error(UPLOAD_FAILED)
            }
        }
    }
}
