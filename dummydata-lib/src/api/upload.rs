//! DDL file upload
//!
//! `POST /upload-sql` takes a multipart form with a `file` field and echoes
//! the file's text back as `{ ddl }`, or `{ message }` on failure.

use std::path::Path;

use log::debug;
use log::warn;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use serde::Deserialize;

use crate::PreviewClient;
use crate::error::ApiError;
use crate::error::Error;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    ddl: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Outcome of a DDL upload.
#[derive(Debug)]
pub enum UploadResult {
    /// The backend returned the file's DDL text (never empty).
    Ok { ddl: String },
    /// The backend answered without DDL text.
    Failed { message: Option<String> },
    /// No usable answer: network error, timeout, or a non-JSON body.
    TransportError(ApiError),
}

impl From<UploadResponse> for UploadResult {
    fn from(response: UploadResponse) -> Self {
        match response.ddl {
            Some(ddl) if !ddl.is_empty() => Self::Ok { ddl },
            _ => Self::Failed {
                message: response.message.filter(|m| !m.is_empty()),
            },
        }
    }
}

impl PreviewClient {
    /// Uploads DDL file contents under the given file name.
    pub async fn upload_sql(&self, file_name: impl Into<String>, contents: Vec<u8>) -> UploadResult {
        let file_name = file_name.into();
        match self.request_upload(file_name, contents).await {
            Ok(response) => response.into(),
            Err(e) => {
                warn!("DDL upload failed: {}", e);
                UploadResult::TransportError(e)
            }
        }
    }

    /// Reads a local DDL file and uploads it.
    ///
    /// Fails only if the file cannot be read.
    pub async fn upload_sql_file(&self, path: &Path) -> Result<UploadResult, Error> {
        let contents = tokio::fs::read(path).await.map_err(|e| Error::io(path, e))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "schema.sql".to_string());

        Ok(self.upload_sql(file_name, contents).await)
    }

    async fn request_upload(
        &self,
        file_name: String,
        contents: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        debug!("Uploading {} ({} bytes)", file_name, contents.len());
        let form = Form::new().part("file", Part::bytes(contents).file_name(file_name));

        let response = self.send(self.post("upload-sql")?.multipart(form)).await?;
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        match serde_json::from_str(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ApiError::parse_with_body(
                format!("Invalid upload response: {}", e),
                body,
            )),
        }
    }
}
