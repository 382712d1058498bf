use thiserror::Error;

use dummydata_lib::error::ApiError;

use crate::config::ConfigError;

/// Errors that end the application.
#[derive(Debug, Error)]
pub enum TuiError {
    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot create backend client: {0}")]
    Client(#[from] ApiError),
}
