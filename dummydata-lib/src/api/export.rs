//! CSV and INSERT-statement export
//!
//! The payload is captured from the table when the request is built, so a
//! request in flight is unaffected by edits made after it was issued.

use std::path::Path;
use std::path::PathBuf;

use log::debug;
use log::info;
use reqwest::header::CONTENT_DISPOSITION;
use serde::Serialize;

use crate::PreviewClient;
use crate::error::ApiError;
use crate::error::Error;
use crate::table::Row;
use crate::table::TableSnapshot;

/// The artifact formats the backend can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    /// Quoted CSV with a header row.
    Csv,
    /// One `INSERT INTO` statement per row.
    InsertSql,
}

impl ExportKind {
    /// Endpoint path relative to the backend base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::InsertSql => "insert-sql",
        }
    }

    /// File name the artifact is saved under.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Csv => "dummy_data.csv",
            Self::InsertSql => "insert_statements.sql",
        }
    }

    /// Short human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::InsertSql => "INSERT SQL",
        }
    }
}

/// JSON body sent to an export endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPayload {
    /// DDL text; only sent for INSERT export.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddl: Option<String>,
    pub columns: Vec<String>,
    pub data: Vec<Row>,
}

/// A fully captured export request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub kind: ExportKind,
    pub payload: ExportPayload,
}

impl ExportRequest {
    /// Captures a CSV export of `snapshot`.
    pub fn csv(snapshot: &TableSnapshot) -> Self {
        Self {
            kind: ExportKind::Csv,
            payload: ExportPayload {
                ddl: None,
                columns: snapshot.columns().to_vec(),
                data: snapshot.rows().to_vec(),
            },
        }
    }

    /// Captures an INSERT export of `snapshot` for the table described by `ddl`.
    pub fn insert_sql(ddl: impl Into<String>, snapshot: &TableSnapshot) -> Self {
        Self {
            kind: ExportKind::InsertSql,
            payload: ExportPayload {
                ddl: Some(ddl.into()),
                columns: snapshot.columns().to_vec(),
                data: snapshot.rows().to_vec(),
            },
        }
    }
}

/// A rendered export returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    kind: ExportKind,
    bytes: Vec<u8>,
    server_file_name: Option<String>,
}

impl Artifact {
    pub fn kind(&self) -> ExportKind {
        self.kind
    }

    /// File name the artifact is saved under.
    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }

    /// Raw artifact content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File name suggested by the backend's `Content-Disposition`, if any.
    ///
    /// Informational only; artifacts are always saved as [`file_name`](Self::file_name).
    pub fn server_file_name(&self) -> Option<&str> {
        self.server_file_name.as_deref()
    }

    /// Writes the artifact into `dir`, replacing an existing file of the same name.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf, Error> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::io(dir, e))?;

        let path = dir.join(self.file_name());
        tokio::fs::write(&path, &self.bytes)
            .await
            .map_err(|e| Error::io(&path, e))?;

        info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Extracts a plain `filename=` parameter from a `Content-Disposition` value.
fn disposition_file_name(value: &str) -> Option<String> {
    value.split(';').find_map(|part| {
        let name = part.trim().strip_prefix("filename=")?;
        let name = name.trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}

impl PreviewClient {
    /// Asks the backend to render `request` and returns the artifact.
    ///
    /// Any non-success status is an error; the body is never treated as a
    /// partial artifact.
    pub async fn export(&self, request: &ExportRequest) -> Result<Artifact, ApiError> {
        let kind = request.kind;
        let response = self
            .send(self.post(kind.endpoint())?.json(&request.payload))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http(status.as_u16(), body));
        }

        let server_file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_file_name);

        let bytes = response.bytes().await.map_err(|e| self.map_error(e))?;
        debug!("{} export returned {} bytes", kind.label(), bytes.len());

        Ok(Artifact {
            kind,
            bytes: bytes.to_vec(),
            server_file_name,
        })
    }

    /// Renders `request` and saves the artifact into `dir`.
    pub async fn export_to(&self, request: &ExportRequest, dir: &Path) -> Result<PathBuf, Error> {
        let artifact = self.export(request).await?;
        artifact.save(dir).await
    }
}
