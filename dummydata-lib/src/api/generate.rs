//! Synthetic row generation
//!
//! `POST /generate` takes `{ ddl, rows }` and answers with
//! `{ success, columns?, data?, message? }`. The HTTP status is not
//! inspected: the backend reports rejected DDL as a JSON body with
//! `success: false`, often with a 4xx/5xx status.

use log::debug;
use log::warn;
use serde::Deserialize;
use serde::Serialize;

use crate::PreviewClient;
use crate::error::ApiError;
use crate::table::Row;

/// Requested number of rows, passed through as the user typed it.
///
/// The backend interprets (or rejects) the value; nothing is validated
/// client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RowCount {
    Text(String),
    Number(u64),
}

impl From<&str> for RowCount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RowCount {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for RowCount {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

/// Body of a `POST /generate` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    /// DDL text describing the table.
    pub ddl: String,
    /// Requested row count.
    pub rows: RowCount,
}

impl GenerateRequest {
    pub fn new(ddl: impl Into<String>, rows: impl Into<RowCount>) -> Self {
        Self {
            ddl: ddl.into(),
            rows: rows.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    columns: Option<Vec<String>>,
    #[serde(default)]
    data: Option<Vec<Row>>,
    #[serde(default)]
    message: Option<String>,
}

/// Outcome of a generation request.
#[derive(Debug)]
pub enum GenerationResult {
    /// The backend produced a table. `columns` may be empty.
    Ok { columns: Vec<String>, data: Vec<Row> },
    /// The backend answered but did not succeed.
    ///
    /// `message` is the server's explanation, if it sent a non-empty one.
    Failed { message: Option<String> },
    /// No usable answer: network error, timeout, or a non-JSON body.
    TransportError(ApiError),
}

impl From<GenerateResponse> for GenerationResult {
    fn from(response: GenerateResponse) -> Self {
        if response.success == Some(true) {
            Self::Ok {
                columns: response.columns.unwrap_or_default(),
                data: response.data.unwrap_or_default(),
            }
        } else {
            Self::Failed {
                message: response.message.filter(|m| !m.is_empty()),
            }
        }
    }
}

impl PreviewClient {
    /// Requests synthetic rows for `request.ddl`.
    pub async fn generate(&self, request: &GenerateRequest) -> GenerationResult {
        match self.request_generation(request).await {
            Ok(response) => response.into(),
            Err(e) => {
                warn!("Generation request failed: {}", e);
                GenerationResult::TransportError(e)
            }
        }
    }

    async fn request_generation(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ApiError> {
        let response = self.send(self.post("generate")?.json(request)).await?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_error(e))?;
        debug!("Generate answered {} ({} bytes)", status, body.len());

        match serde_json::from_str(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ApiError::parse_with_body(
                format!("Invalid generate response: {}", e),
                body,
            )),
        }
    }
}
