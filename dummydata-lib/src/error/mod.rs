//! Error types

mod api;

pub use api::*;

use std::path::PathBuf;

/// Top-level error for operations that combine HTTP calls with local I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Reading or writing a local file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File the operation was working on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
